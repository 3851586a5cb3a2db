// Copyright 2026 The Trigon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context
//!
//! `VkContext` is the `ash` implementation of [`Gpu`].  It starts with only a loaded entry and
//! grows function tables as the lifecycle creates the instance and the logical device.  There is
//! exactly one of each, so handles passed back for destruction are only checked in debug builds.
//!
//! Calls that need a table which does not exist yet fail with `ERROR_INITIALIZATION_FAILED`, or do
//! nothing when they cannot fail.

use std::ffi::{CStr, CString};

use ash::prelude::VkResult;
use ash::{ext, khr, vk};
use tracing::warn;

use crate::gpu::{Gpu, PresentWindow};
use crate::prelude::*;

pub struct VkContext {
    entry: ash::Entry,
    instance: Option<ash::Instance>,
    /// Used to access surface query and destruction functions
    surface_loader: Option<khr::surface::Instance>,
    debug_loader: Option<ext::debug_utils::Instance>,

    /// Vulkan logical device
    device: Option<ash::Device>,
    swapchain_loader: Option<khr::swapchain::Device>,
}

impl VkContext {
    /// Load the system Vulkan library.  Nothing is created yet.
    pub fn load() -> Result<Self, SetupError> {
        let entry = unsafe { ash::Entry::load() }.at(Stage::Instance)?;
        Ok(Self {
            entry,
            instance: None,
            surface_loader: None,
            debug_loader: None,
            device: None,
            swapchain_loader: None,
        })
    }

    fn instance(&self) -> VkResult<&ash::Instance> {
        self.instance
            .as_ref()
            .ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)
    }

    fn surface_loader(&self) -> VkResult<&khr::surface::Instance> {
        self.surface_loader
            .as_ref()
            .ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)
    }

    fn device(&self) -> VkResult<&ash::Device> {
        self.device
            .as_ref()
            .ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)
    }

    fn swapchain_loader(&self) -> VkResult<&khr::swapchain::Device> {
        self.swapchain_loader
            .as_ref()
            .ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)
    }

    /// Run `f` against the logical device, or log and skip when there is none.
    fn with_device(&self, call: &str, f: impl FnOnce(&ash::Device)) {
        match &self.device {
            Some(device) => f(device),
            None => warn!("{call} skipped: no logical device"),
        }
    }
}

fn owned_names(raw: impl Iterator<Item = *const std::ffi::c_char>) -> Vec<CString> {
    raw.map(|p| unsafe { CStr::from_ptr(p) }.to_owned())
        .collect()
}

impl Gpu for VkContext {
    fn instance_layer_names(&self) -> VkResult<Vec<CString>> {
        let layers = unsafe { self.entry.enumerate_instance_layer_properties()? };
        Ok(owned_names(layers.iter().map(|l| l.layer_name.as_ptr())))
    }

    fn surface_extensions(&self, window: &dyn PresentWindow) -> Result<Vec<CString>, VulkanError> {
        let display = window.display_handle()?;
        let names = ash_window::enumerate_required_extensions(display)?;
        Ok(owned_names(names.iter().copied()))
    }

    fn create_instance(&mut self, info: &vk::InstanceCreateInfo<'_>) -> VkResult<vk::Instance> {
        let instance = unsafe { self.entry.create_instance(info, None)? };
        self.surface_loader = Some(khr::surface::Instance::new(&self.entry, &instance));
        self.debug_loader = Some(ext::debug_utils::Instance::new(&self.entry, &instance));
        let handle = instance.handle();
        self.instance = Some(instance);
        Ok(handle)
    }

    fn create_debug_messenger(
        &mut self,
        info: &vk::DebugUtilsMessengerCreateInfoEXT<'_>,
    ) -> VkResult<vk::DebugUtilsMessengerEXT> {
        let loader = self
            .debug_loader
            .as_ref()
            .ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)?;
        unsafe { loader.create_debug_utils_messenger(info, None) }
    }

    fn create_surface(&mut self, window: &dyn PresentWindow) -> Result<vk::SurfaceKHR, VulkanError> {
        let instance = self.instance()?;
        let display = window.display_handle()?;
        let handle = window.window_handle()?;
        let surface =
            unsafe { ash_window::create_surface(&self.entry, instance, display, handle, None)? };
        Ok(surface)
    }

    fn physical_devices(&self) -> VkResult<Vec<vk::PhysicalDevice>> {
        unsafe { self.instance()?.enumerate_physical_devices() }
    }

    fn device_name(&self, physical_device: vk::PhysicalDevice) -> String {
        match self.instance() {
            Ok(instance) => {
                let props = unsafe { instance.get_physical_device_properties(physical_device) };
                unsafe { CStr::from_ptr(props.device_name.as_ptr()) }
                    .to_string_lossy()
                    .into_owned()
            }
            Err(_) => String::from("<unknown>"),
        }
    }

    fn device_extension_names(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> VkResult<Vec<CString>> {
        let exts = unsafe {
            self.instance()?
                .enumerate_device_extension_properties(physical_device)?
        };
        Ok(owned_names(exts.iter().map(|e| e.extension_name.as_ptr())))
    }

    fn queue_family_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> Vec<vk::QueueFamilyProperties> {
        self.instance()
            .map(|i| unsafe { i.get_physical_device_queue_family_properties(physical_device) })
            .unwrap_or_default()
    }

    fn surface_support(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
        surface: vk::SurfaceKHR,
    ) -> VkResult<bool> {
        unsafe {
            self.surface_loader()?.get_physical_device_surface_support(
                physical_device,
                queue_family_index,
                surface,
            )
        }
    }

    fn surface_capabilities(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR> {
        unsafe {
            self.surface_loader()?
                .get_physical_device_surface_capabilities(physical_device, surface)
        }
    }

    fn surface_formats(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::SurfaceFormatKHR>> {
        unsafe {
            self.surface_loader()?
                .get_physical_device_surface_formats(physical_device, surface)
        }
    }

    fn surface_present_modes(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::PresentModeKHR>> {
        unsafe {
            self.surface_loader()?
                .get_physical_device_surface_present_modes(physical_device, surface)
        }
    }

    fn create_device(
        &mut self,
        physical_device: vk::PhysicalDevice,
        info: &vk::DeviceCreateInfo<'_>,
    ) -> VkResult<vk::Device> {
        let instance = self.instance()?;
        let device = unsafe { instance.create_device(physical_device, info, None)? };
        let swapchain_loader = khr::swapchain::Device::new(instance, &device);
        let handle = device.handle();
        self.swapchain_loader = Some(swapchain_loader);
        self.device = Some(device);
        Ok(handle)
    }

    fn device_queue(&self, queue_family_index: u32, queue_index: u32) -> vk::Queue {
        // NOTE device owns queues.  Just hand out handles.
        self.device
            .as_ref()
            .map(|d| unsafe { d.get_device_queue(queue_family_index, queue_index) })
            .unwrap_or_default()
    }

    fn device_wait_idle(&self) -> VkResult<()> {
        unsafe { self.device()?.device_wait_idle() }
    }

    fn create_swapchain(
        &mut self,
        info: &vk::SwapchainCreateInfoKHR<'_>,
    ) -> VkResult<vk::SwapchainKHR> {
        unsafe { self.swapchain_loader()?.create_swapchain(info, None) }
    }

    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>> {
        unsafe { self.swapchain_loader()?.get_swapchain_images(swapchain) }
    }

    fn create_image_view(&mut self, info: &vk::ImageViewCreateInfo<'_>) -> VkResult<vk::ImageView> {
        unsafe { self.device()?.create_image_view(info, None) }
    }

    fn create_render_pass(
        &mut self,
        info: &vk::RenderPassCreateInfo<'_>,
    ) -> VkResult<vk::RenderPass> {
        unsafe { self.device()?.create_render_pass(info, None) }
    }

    fn create_shader_module(
        &mut self,
        info: &vk::ShaderModuleCreateInfo<'_>,
    ) -> VkResult<vk::ShaderModule> {
        unsafe { self.device()?.create_shader_module(info, None) }
    }

    fn create_pipeline_layout(
        &mut self,
        info: &vk::PipelineLayoutCreateInfo<'_>,
    ) -> VkResult<vk::PipelineLayout> {
        unsafe { self.device()?.create_pipeline_layout(info, None) }
    }

    fn create_graphics_pipeline(
        &mut self,
        info: &vk::GraphicsPipelineCreateInfo<'_>,
    ) -> VkResult<vk::Pipeline> {
        let device = self.device()?;
        let pipelines = unsafe {
            device.create_graphics_pipelines(
                vk::PipelineCache::null(),
                std::slice::from_ref(info),
                None,
            )
        }
        .map_err(|(_, e)| e)?;
        pipelines
            .into_iter()
            .next()
            .ok_or(vk::Result::ERROR_UNKNOWN)
    }

    fn create_framebuffer(
        &mut self,
        info: &vk::FramebufferCreateInfo<'_>,
    ) -> VkResult<vk::Framebuffer> {
        unsafe { self.device()?.create_framebuffer(info, None) }
    }

    fn create_command_pool(
        &mut self,
        info: &vk::CommandPoolCreateInfo<'_>,
    ) -> VkResult<vk::CommandPool> {
        unsafe { self.device()?.create_command_pool(info, None) }
    }

    fn allocate_command_buffers(
        &mut self,
        info: &vk::CommandBufferAllocateInfo<'_>,
    ) -> VkResult<Vec<vk::CommandBuffer>> {
        unsafe { self.device()?.allocate_command_buffers(info) }
    }

    fn begin_command_buffer(
        &mut self,
        command_buffer: vk::CommandBuffer,
        info: &vk::CommandBufferBeginInfo<'_>,
    ) -> VkResult<()> {
        unsafe { self.device()?.begin_command_buffer(command_buffer, info) }
    }

    fn cmd_begin_render_pass(
        &mut self,
        command_buffer: vk::CommandBuffer,
        info: &vk::RenderPassBeginInfo<'_>,
    ) {
        self.with_device("cmd_begin_render_pass", |d| unsafe {
            d.cmd_begin_render_pass(command_buffer, info, vk::SubpassContents::INLINE)
        });
    }

    fn cmd_bind_pipeline(&mut self, command_buffer: vk::CommandBuffer, pipeline: vk::Pipeline) {
        self.with_device("cmd_bind_pipeline", |d| unsafe {
            d.cmd_bind_pipeline(command_buffer, vk::PipelineBindPoint::GRAPHICS, pipeline)
        });
    }

    fn cmd_draw(
        &mut self,
        command_buffer: vk::CommandBuffer,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    ) {
        self.with_device("cmd_draw", |d| unsafe {
            d.cmd_draw(
                command_buffer,
                vertex_count,
                instance_count,
                first_vertex,
                first_instance,
            )
        });
    }

    fn cmd_end_render_pass(&mut self, command_buffer: vk::CommandBuffer) {
        self.with_device("cmd_end_render_pass", |d| unsafe {
            d.cmd_end_render_pass(command_buffer)
        });
    }

    fn end_command_buffer(&mut self, command_buffer: vk::CommandBuffer) -> VkResult<()> {
        unsafe { self.device()?.end_command_buffer(command_buffer) }
    }

    fn destroy_command_pool(&mut self, pool: vk::CommandPool) {
        // Command buffers allocated from the pool go with it.
        self.with_device("destroy_command_pool", |d| unsafe {
            d.destroy_command_pool(pool, None)
        });
    }

    fn destroy_framebuffer(&mut self, framebuffer: vk::Framebuffer) {
        self.with_device("destroy_framebuffer", |d| unsafe {
            d.destroy_framebuffer(framebuffer, None)
        });
    }

    fn destroy_pipeline(&mut self, pipeline: vk::Pipeline) {
        self.with_device("destroy_pipeline", |d| unsafe {
            d.destroy_pipeline(pipeline, None)
        });
    }

    fn destroy_pipeline_layout(&mut self, layout: vk::PipelineLayout) {
        self.with_device("destroy_pipeline_layout", |d| unsafe {
            d.destroy_pipeline_layout(layout, None)
        });
    }

    fn destroy_render_pass(&mut self, render_pass: vk::RenderPass) {
        self.with_device("destroy_render_pass", |d| unsafe {
            d.destroy_render_pass(render_pass, None)
        });
    }

    fn destroy_shader_module(&mut self, module: vk::ShaderModule) {
        self.with_device("destroy_shader_module", |d| unsafe {
            d.destroy_shader_module(module, None)
        });
    }

    fn destroy_image_view(&mut self, view: vk::ImageView) {
        self.with_device("destroy_image_view", |d| unsafe {
            d.destroy_image_view(view, None)
        });
    }

    fn destroy_swapchain(&mut self, swapchain: vk::SwapchainKHR) {
        match &self.swapchain_loader {
            Some(loader) => unsafe { loader.destroy_swapchain(swapchain, None) },
            None => warn!("destroy_swapchain skipped: no logical device"),
        }
    }

    fn destroy_device(&mut self, handle: vk::Device) {
        self.swapchain_loader = None;
        if let Some(device) = self.device.take() {
            debug_assert_eq!(device.handle(), handle);
            unsafe { device.destroy_device(None) };
        }
    }

    fn destroy_surface(&mut self, surface: vk::SurfaceKHR) {
        match &self.surface_loader {
            Some(loader) => unsafe { loader.destroy_surface(surface, None) },
            None => warn!("destroy_surface skipped: no instance"),
        }
    }

    fn destroy_debug_messenger(&mut self, messenger: vk::DebugUtilsMessengerEXT) {
        match &self.debug_loader {
            Some(loader) => unsafe { loader.destroy_debug_utils_messenger(messenger, None) },
            None => warn!("destroy_debug_messenger skipped: no instance"),
        }
    }

    fn destroy_instance(&mut self, handle: vk::Instance) {
        self.surface_loader = None;
        self.debug_loader = None;
        if let Some(instance) = self.instance.take() {
            debug_assert_eq!(instance.handle(), handle);
            unsafe { instance.destroy_instance(None) };
        }
    }
}
