// Copyright 2026 The Trigon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A recording [`Gpu`] for tests.  Every create and destroy is logged in order.  Failures can be
//! injected at the nth creation of any resource kind.

use std::cell::RefCell;
use std::ffi::{CStr, CString};

use ash::prelude::VkResult;
use ash::vk::{self, Handle};
use raw_window_handle::{HandleError, RawDisplayHandle, RawWindowHandle};

use crate::gpu::{Gpu, PresentWindow};
use crate::VulkanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Instance,
    DebugMessenger,
    Surface,
    Device,
    Swapchain,
    ImageView,
    RenderPass,
    ShaderModule,
    PipelineLayout,
    Pipeline,
    Framebuffer,
    CommandPool,
    CommandBuffer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(Kind, u64),
    Destroy(Kind, u64),
    Begin(u64),
    BeginPass {
        command_buffer: u64,
        framebuffer: u64,
        clear: [f32; 4],
        extent: (u32, u32),
    },
    Bind {
        command_buffer: u64,
        pipeline: u64,
    },
    Draw {
        command_buffer: u64,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    },
    EndPass(u64),
    End(u64),
}

#[derive(Debug, Clone)]
pub struct FakeDevice {
    pub name: String,
    /// Queue flags and surface support per family.
    pub families: Vec<(vk::QueueFlags, bool)>,
    pub extensions: Vec<CString>,
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl FakeDevice {
    /// One family doing everything, swapchain support, and a fixed 800x600 surface.
    pub fn capable(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            families: vec![(vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE, true)],
            extensions: vec![vk::KHR_SWAPCHAIN_NAME.to_owned()],
            capabilities: vk::SurfaceCapabilitiesKHR {
                min_image_count: 2,
                max_image_count: 8,
                current_extent: vk::Extent2D {
                    width: 800,
                    height: 600,
                },
                min_image_extent: vk::Extent2D {
                    width: 1,
                    height: 1,
                },
                max_image_extent: vk::Extent2D {
                    width: 4096,
                    height: 4096,
                },
                current_transform: vk::SurfaceTransformFlagsKHR::IDENTITY,
                supported_composite_alpha: vk::CompositeAlphaFlagsKHR::OPAQUE,
                ..Default::default()
            },
            formats: vec![vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_SRGB,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            }],
            present_modes: vec![vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX],
        }
    }
}

#[derive(Debug, Clone)]
pub struct InstanceRequest {
    pub layers: Vec<CString>,
    pub extensions: Vec<CString>,
    pub chained_messenger: bool,
    pub app_name: CString,
}

#[derive(Debug, Clone)]
pub struct DeviceRequest {
    pub physical_device: usize,
    pub queue_families: Vec<u32>,
    pub extensions: Vec<CString>,
}

#[derive(Debug, Clone)]
pub struct SwapchainRequest {
    pub min_image_count: u32,
    pub format: vk::Format,
    pub extent: vk::Extent2D,
    pub present_mode: vk::PresentModeKHR,
    pub sharing_mode: vk::SharingMode,
    pub queue_family_indices: Vec<u32>,
    pub composite_alpha: vk::CompositeAlphaFlagsKHR,
}

#[derive(Debug, Clone)]
pub struct FramebufferRequest {
    pub render_pass: u64,
    pub attachments: Vec<u64>,
    pub width: u32,
    pub height: u32,
}

pub struct FakeWindow {
    pub size: vk::Extent2D,
    pub close: bool,
}

impl FakeWindow {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: vk::Extent2D { width, height },
            close: false,
        }
    }
}

impl PresentWindow for FakeWindow {
    fn display_handle(&self) -> Result<RawDisplayHandle, HandleError> {
        Err(HandleError::Unavailable)
    }

    fn window_handle(&self) -> Result<RawWindowHandle, HandleError> {
        Err(HandleError::Unavailable)
    }

    fn framebuffer_size(&self) -> vk::Extent2D {
        self.size
    }

    fn should_close(&self) -> bool {
        self.close
    }
}

#[derive(Default)]
pub struct FakeGpu {
    pub layers: Vec<CString>,
    pub devices: Vec<FakeDevice>,
    /// Fail the nth (0-based) creation of this kind.
    pub fail_at: Option<(Kind, usize)>,
    /// Images handed out per swapchain; defaults to the requested minimum.
    pub image_count: Option<u32>,

    pub calls: Vec<Call>,
    pub instance_requests: Vec<InstanceRequest>,
    pub device_requests: Vec<DeviceRequest>,
    pub swapchain_requests: Vec<SwapchainRequest>,
    pub framebuffer_requests: Vec<FramebufferRequest>,
    pub shader_sizes: Vec<usize>,
    /// (device, family) pairs queried for surface support, in order.
    pub support_queries: RefCell<Vec<(usize, u32)>>,
    /// Position in `calls` at which each idle wait happened.
    pub idle_waits: RefCell<Vec<usize>>,

    next_handle: u64,
}

fn names(count: u32, ptr: *const *const std::ffi::c_char) -> Vec<CString> {
    if count == 0 || ptr.is_null() {
        return Vec::new();
    }
    unsafe { std::slice::from_raw_parts(ptr, count as usize) }
        .iter()
        .map(|p| unsafe { CStr::from_ptr(*p) }.to_owned())
        .collect()
}

impl FakeGpu {
    pub fn new(devices: Vec<FakeDevice>) -> Self {
        Self {
            layers: vec![crate::config::VALIDATION_LAYER.to_owned()],
            devices,
            next_handle: 0x1000,
            ..Default::default()
        }
    }

    pub fn failing_at(mut self, kind: Kind, nth: usize) -> Self {
        self.fail_at = Some((kind, nth));
        self
    }

    pub fn created(&self, kind: Kind) -> Vec<u64> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Create(k, h) if *k == kind => Some(*h),
                _ => None,
            })
            .collect()
    }

    pub fn destroyed(&self, kind: Kind) -> Vec<u64> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Destroy(k, h) if *k == kind => Some(*h),
                _ => None,
            })
            .collect()
    }

    /// Index of the destruction of `handle` in the call log.
    pub fn destroy_position(&self, kind: Kind, handle: u64) -> Option<usize> {
        self.calls
            .iter()
            .position(|c| *c == Call::Destroy(kind, handle))
    }

    fn create<H: Handle>(&mut self, kind: Kind) -> VkResult<H> {
        let nth = self.created(kind).len();
        if self.fail_at == Some((kind, nth)) {
            // Fail once.
            self.fail_at = None;
            return Err(vk::Result::ERROR_INITIALIZATION_FAILED);
        }
        self.next_handle += 1;
        let raw = self.next_handle;
        self.calls.push(Call::Create(kind, raw));
        Ok(H::from_raw(raw))
    }

    fn destroy<H: Handle>(&mut self, kind: Kind, handle: H) {
        self.calls.push(Call::Destroy(kind, handle.as_raw()));
    }

    fn device(&self, physical_device: vk::PhysicalDevice) -> Option<&FakeDevice> {
        (physical_device.as_raw() as usize)
            .checked_sub(1)
            .and_then(|i| self.devices.get(i))
    }
}

impl Gpu for FakeGpu {
    fn instance_layer_names(&self) -> VkResult<Vec<CString>> {
        Ok(self.layers.clone())
    }

    fn surface_extensions(&self, _window: &dyn PresentWindow) -> Result<Vec<CString>, VulkanError> {
        Ok(vec![vk::KHR_SURFACE_NAME.to_owned()])
    }

    fn create_instance(&mut self, info: &vk::InstanceCreateInfo<'_>) -> VkResult<vk::Instance> {
        let app_name = if info.p_application_info.is_null() {
            CString::default()
        } else {
            let app = unsafe { &*info.p_application_info };
            unsafe { CStr::from_ptr(app.p_application_name) }.to_owned()
        };
        self.instance_requests.push(InstanceRequest {
            layers: names(info.enabled_layer_count, info.pp_enabled_layer_names),
            extensions: names(info.enabled_extension_count, info.pp_enabled_extension_names),
            chained_messenger: !info.p_next.is_null(),
            app_name,
        });
        self.create(Kind::Instance)
    }

    fn create_debug_messenger(
        &mut self,
        _info: &vk::DebugUtilsMessengerCreateInfoEXT<'_>,
    ) -> VkResult<vk::DebugUtilsMessengerEXT> {
        self.create(Kind::DebugMessenger)
    }

    fn create_surface(&mut self, _window: &dyn PresentWindow) -> Result<vk::SurfaceKHR, VulkanError> {
        Ok(self.create(Kind::Surface)?)
    }

    fn physical_devices(&self) -> VkResult<Vec<vk::PhysicalDevice>> {
        Ok((1..=self.devices.len() as u64)
            .map(vk::PhysicalDevice::from_raw)
            .collect())
    }

    fn device_name(&self, physical_device: vk::PhysicalDevice) -> String {
        self.device(physical_device)
            .map(|d| d.name.clone())
            .unwrap_or_default()
    }

    fn device_extension_names(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> VkResult<Vec<CString>> {
        self.device(physical_device)
            .map(|d| d.extensions.clone())
            .ok_or(vk::Result::ERROR_DEVICE_LOST)
    }

    fn queue_family_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> Vec<vk::QueueFamilyProperties> {
        self.device(physical_device)
            .map(|d| {
                d.families
                    .iter()
                    .map(|(flags, _)| vk::QueueFamilyProperties {
                        queue_flags: *flags,
                        queue_count: 1,
                        ..Default::default()
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn surface_support(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
        _surface: vk::SurfaceKHR,
    ) -> VkResult<bool> {
        self.support_queries
            .borrow_mut()
            .push((physical_device.as_raw() as usize - 1, queue_family_index));
        self.device(physical_device)
            .and_then(|d| d.families.get(queue_family_index as usize))
            .map(|(_, present)| *present)
            .ok_or(vk::Result::ERROR_SURFACE_LOST_KHR)
    }

    fn surface_capabilities(
        &self,
        physical_device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR> {
        self.device(physical_device)
            .map(|d| d.capabilities)
            .ok_or(vk::Result::ERROR_SURFACE_LOST_KHR)
    }

    fn surface_formats(
        &self,
        physical_device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::SurfaceFormatKHR>> {
        self.device(physical_device)
            .map(|d| d.formats.clone())
            .ok_or(vk::Result::ERROR_SURFACE_LOST_KHR)
    }

    fn surface_present_modes(
        &self,
        physical_device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::PresentModeKHR>> {
        self.device(physical_device)
            .map(|d| d.present_modes.clone())
            .ok_or(vk::Result::ERROR_SURFACE_LOST_KHR)
    }

    fn create_device(
        &mut self,
        physical_device: vk::PhysicalDevice,
        info: &vk::DeviceCreateInfo<'_>,
    ) -> VkResult<vk::Device> {
        let queue_infos = if info.queue_create_info_count == 0 {
            &[][..]
        } else {
            unsafe {
                std::slice::from_raw_parts(
                    info.p_queue_create_infos,
                    info.queue_create_info_count as usize,
                )
            }
        };
        self.device_requests.push(DeviceRequest {
            physical_device: physical_device.as_raw() as usize - 1,
            queue_families: queue_infos.iter().map(|q| q.queue_family_index).collect(),
            extensions: names(
                info.enabled_extension_count,
                info.pp_enabled_extension_names,
            ),
        });
        self.create(Kind::Device)
    }

    fn device_queue(&self, queue_family_index: u32, _queue_index: u32) -> vk::Queue {
        vk::Queue::from_raw(0x100 + queue_family_index as u64)
    }

    fn device_wait_idle(&self) -> VkResult<()> {
        self.idle_waits.borrow_mut().push(self.calls.len());
        Ok(())
    }

    fn create_swapchain(
        &mut self,
        info: &vk::SwapchainCreateInfoKHR<'_>,
    ) -> VkResult<vk::SwapchainKHR> {
        let queue_family_indices = if info.queue_family_index_count == 0 {
            Vec::new()
        } else {
            unsafe {
                std::slice::from_raw_parts(
                    info.p_queue_family_indices,
                    info.queue_family_index_count as usize,
                )
            }
            .to_vec()
        };
        self.swapchain_requests.push(SwapchainRequest {
            min_image_count: info.min_image_count,
            format: info.image_format,
            extent: info.image_extent,
            present_mode: info.present_mode,
            sharing_mode: info.image_sharing_mode,
            queue_family_indices,
            composite_alpha: info.composite_alpha,
        });
        self.create(Kind::Swapchain)
    }

    fn swapchain_images(&self, _swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>> {
        let count = self.image_count.unwrap_or_else(|| {
            self.swapchain_requests
                .last()
                .map(|r| r.min_image_count)
                .unwrap_or(0)
        });
        Ok((0..count as u64)
            .map(|i| vk::Image::from_raw(0x10_0000 + i))
            .collect())
    }

    fn create_image_view(&mut self, _info: &vk::ImageViewCreateInfo<'_>) -> VkResult<vk::ImageView> {
        self.create(Kind::ImageView)
    }

    fn create_render_pass(
        &mut self,
        _info: &vk::RenderPassCreateInfo<'_>,
    ) -> VkResult<vk::RenderPass> {
        self.create(Kind::RenderPass)
    }

    fn create_shader_module(
        &mut self,
        info: &vk::ShaderModuleCreateInfo<'_>,
    ) -> VkResult<vk::ShaderModule> {
        self.shader_sizes.push(info.code_size);
        self.create(Kind::ShaderModule)
    }

    fn create_pipeline_layout(
        &mut self,
        _info: &vk::PipelineLayoutCreateInfo<'_>,
    ) -> VkResult<vk::PipelineLayout> {
        self.create(Kind::PipelineLayout)
    }

    fn create_graphics_pipeline(
        &mut self,
        _info: &vk::GraphicsPipelineCreateInfo<'_>,
    ) -> VkResult<vk::Pipeline> {
        self.create(Kind::Pipeline)
    }

    fn create_framebuffer(
        &mut self,
        info: &vk::FramebufferCreateInfo<'_>,
    ) -> VkResult<vk::Framebuffer> {
        let attachments = if info.attachment_count == 0 {
            Vec::new()
        } else {
            unsafe {
                std::slice::from_raw_parts(info.p_attachments, info.attachment_count as usize)
            }
            .iter()
            .map(|v| v.as_raw())
            .collect()
        };
        self.framebuffer_requests.push(FramebufferRequest {
            render_pass: info.render_pass.as_raw(),
            attachments,
            width: info.width,
            height: info.height,
        });
        self.create(Kind::Framebuffer)
    }

    fn create_command_pool(
        &mut self,
        _info: &vk::CommandPoolCreateInfo<'_>,
    ) -> VkResult<vk::CommandPool> {
        self.create(Kind::CommandPool)
    }

    fn allocate_command_buffers(
        &mut self,
        info: &vk::CommandBufferAllocateInfo<'_>,
    ) -> VkResult<Vec<vk::CommandBuffer>> {
        (0..info.command_buffer_count)
            .map(|_| self.create(Kind::CommandBuffer))
            .collect()
    }

    fn begin_command_buffer(
        &mut self,
        command_buffer: vk::CommandBuffer,
        _info: &vk::CommandBufferBeginInfo<'_>,
    ) -> VkResult<()> {
        self.calls.push(Call::Begin(command_buffer.as_raw()));
        Ok(())
    }

    fn cmd_begin_render_pass(
        &mut self,
        command_buffer: vk::CommandBuffer,
        info: &vk::RenderPassBeginInfo<'_>,
    ) {
        let clear = if info.clear_value_count == 0 {
            [f32::NAN; 4]
        } else {
            unsafe { (*info.p_clear_values).color.float32 }
        };
        self.calls.push(Call::BeginPass {
            command_buffer: command_buffer.as_raw(),
            framebuffer: info.framebuffer.as_raw(),
            clear,
            extent: (info.render_area.extent.width, info.render_area.extent.height),
        });
    }

    fn cmd_bind_pipeline(&mut self, command_buffer: vk::CommandBuffer, pipeline: vk::Pipeline) {
        self.calls.push(Call::Bind {
            command_buffer: command_buffer.as_raw(),
            pipeline: pipeline.as_raw(),
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
        self.calls.push(Call::Draw {
            command_buffer: command_buffer.as_raw(),
            vertex_count,
            instance_count,
            first_vertex,
            first_instance,
        });
    }

    fn cmd_end_render_pass(&mut self, command_buffer: vk::CommandBuffer) {
        self.calls.push(Call::EndPass(command_buffer.as_raw()));
    }

    fn end_command_buffer(&mut self, command_buffer: vk::CommandBuffer) -> VkResult<()> {
        self.calls.push(Call::End(command_buffer.as_raw()));
        Ok(())
    }

    fn destroy_command_pool(&mut self, pool: vk::CommandPool) {
        self.destroy(Kind::CommandPool, pool);
    }

    fn destroy_framebuffer(&mut self, framebuffer: vk::Framebuffer) {
        self.destroy(Kind::Framebuffer, framebuffer);
    }

    fn destroy_pipeline(&mut self, pipeline: vk::Pipeline) {
        self.destroy(Kind::Pipeline, pipeline);
    }

    fn destroy_pipeline_layout(&mut self, layout: vk::PipelineLayout) {
        self.destroy(Kind::PipelineLayout, layout);
    }

    fn destroy_render_pass(&mut self, render_pass: vk::RenderPass) {
        self.destroy(Kind::RenderPass, render_pass);
    }

    fn destroy_shader_module(&mut self, module: vk::ShaderModule) {
        self.destroy(Kind::ShaderModule, module);
    }

    fn destroy_image_view(&mut self, view: vk::ImageView) {
        self.destroy(Kind::ImageView, view);
    }

    fn destroy_swapchain(&mut self, swapchain: vk::SwapchainKHR) {
        self.destroy(Kind::Swapchain, swapchain);
    }

    fn destroy_device(&mut self, device: vk::Device) {
        self.destroy(Kind::Device, device);
    }

    fn destroy_surface(&mut self, surface: vk::SurfaceKHR) {
        self.destroy(Kind::Surface, surface);
    }

    fn destroy_debug_messenger(&mut self, messenger: vk::DebugUtilsMessengerEXT) {
        self.destroy(Kind::DebugMessenger, messenger);
    }

    fn destroy_instance(&mut self, instance: vk::Instance) {
        self.destroy(Kind::Instance, instance);
    }
}
