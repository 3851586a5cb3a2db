// Copyright 2026 The Trigon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Gpu
//!
//! The capability interface the rest of the crate drives.  Methods mirror the `ash` calls they
//! stand in for and take the same create-info structs, so the code that builds those structs is
//! the code that decides behavior.  Implementations hold whatever function tables they need;
//! returned handles are identities the lifecycle ledger hands back at destruction time.
//!
//! Queries return raw results.  Interpreting a failed query as "unsupported" is the job of
//! [`crate::probe`].

use std::ffi::CString;

use ash::prelude::VkResult;
use ash::vk;
use raw_window_handle::{HandleError, RawDisplayHandle, RawWindowHandle};

use crate::VulkanError;

/// The windowing collaborator.  Owned outside this crate; it must outlive every surface made from
/// it.
pub trait PresentWindow {
    fn display_handle(&self) -> Result<RawDisplayHandle, HandleError>;
    fn window_handle(&self) -> Result<RawWindowHandle, HandleError>;
    /// Drawable size in physical pixels.
    fn framebuffer_size(&self) -> vk::Extent2D;
    fn should_close(&self) -> bool;
}

pub trait Gpu {
    // Instance level queries
    fn instance_layer_names(&self) -> VkResult<Vec<CString>>;
    fn surface_extensions(&self, window: &dyn PresentWindow) -> Result<Vec<CString>, VulkanError>;

    fn create_instance(&mut self, info: &vk::InstanceCreateInfo<'_>) -> VkResult<vk::Instance>;
    fn create_debug_messenger(
        &mut self,
        info: &vk::DebugUtilsMessengerCreateInfoEXT<'_>,
    ) -> VkResult<vk::DebugUtilsMessengerEXT>;
    fn create_surface(&mut self, window: &dyn PresentWindow) -> Result<vk::SurfaceKHR, VulkanError>;

    // Physical device queries
    fn physical_devices(&self) -> VkResult<Vec<vk::PhysicalDevice>>;
    fn device_name(&self, physical_device: vk::PhysicalDevice) -> String;
    fn device_extension_names(&self, physical_device: vk::PhysicalDevice)
    -> VkResult<Vec<CString>>;
    fn queue_family_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> Vec<vk::QueueFamilyProperties>;
    fn surface_support(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
        surface: vk::SurfaceKHR,
    ) -> VkResult<bool>;
    fn surface_capabilities(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR>;
    fn surface_formats(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::SurfaceFormatKHR>>;
    fn surface_present_modes(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<Vec<vk::PresentModeKHR>>;

    // Logical device
    fn create_device(
        &mut self,
        physical_device: vk::PhysicalDevice,
        info: &vk::DeviceCreateInfo<'_>,
    ) -> VkResult<vk::Device>;
    fn device_queue(&self, queue_family_index: u32, queue_index: u32) -> vk::Queue;
    fn device_wait_idle(&self) -> VkResult<()>;

    fn create_swapchain(
        &mut self,
        info: &vk::SwapchainCreateInfoKHR<'_>,
    ) -> VkResult<vk::SwapchainKHR>;
    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>>;
    fn create_image_view(&mut self, info: &vk::ImageViewCreateInfo<'_>) -> VkResult<vk::ImageView>;
    fn create_render_pass(
        &mut self,
        info: &vk::RenderPassCreateInfo<'_>,
    ) -> VkResult<vk::RenderPass>;
    fn create_shader_module(
        &mut self,
        info: &vk::ShaderModuleCreateInfo<'_>,
    ) -> VkResult<vk::ShaderModule>;
    fn create_pipeline_layout(
        &mut self,
        info: &vk::PipelineLayoutCreateInfo<'_>,
    ) -> VkResult<vk::PipelineLayout>;
    fn create_graphics_pipeline(
        &mut self,
        info: &vk::GraphicsPipelineCreateInfo<'_>,
    ) -> VkResult<vk::Pipeline>;
    fn create_framebuffer(
        &mut self,
        info: &vk::FramebufferCreateInfo<'_>,
    ) -> VkResult<vk::Framebuffer>;
    fn create_command_pool(
        &mut self,
        info: &vk::CommandPoolCreateInfo<'_>,
    ) -> VkResult<vk::CommandPool>;
    fn allocate_command_buffers(
        &mut self,
        info: &vk::CommandBufferAllocateInfo<'_>,
    ) -> VkResult<Vec<vk::CommandBuffer>>;

    // Recording
    fn begin_command_buffer(
        &mut self,
        command_buffer: vk::CommandBuffer,
        info: &vk::CommandBufferBeginInfo<'_>,
    ) -> VkResult<()>;
    fn cmd_begin_render_pass(
        &mut self,
        command_buffer: vk::CommandBuffer,
        info: &vk::RenderPassBeginInfo<'_>,
    );
    fn cmd_bind_pipeline(&mut self, command_buffer: vk::CommandBuffer, pipeline: vk::Pipeline);
    fn cmd_draw(
        &mut self,
        command_buffer: vk::CommandBuffer,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    );
    fn cmd_end_render_pass(&mut self, command_buffer: vk::CommandBuffer);
    fn end_command_buffer(&mut self, command_buffer: vk::CommandBuffer) -> VkResult<()>;

    // Destruction
    fn destroy_command_pool(&mut self, pool: vk::CommandPool);
    fn destroy_framebuffer(&mut self, framebuffer: vk::Framebuffer);
    fn destroy_pipeline(&mut self, pipeline: vk::Pipeline);
    fn destroy_pipeline_layout(&mut self, layout: vk::PipelineLayout);
    fn destroy_render_pass(&mut self, render_pass: vk::RenderPass);
    fn destroy_shader_module(&mut self, module: vk::ShaderModule);
    fn destroy_image_view(&mut self, view: vk::ImageView);
    fn destroy_swapchain(&mut self, swapchain: vk::SwapchainKHR);
    fn destroy_device(&mut self, device: vk::Device);
    fn destroy_surface(&mut self, surface: vk::SurfaceKHR);
    fn destroy_debug_messenger(&mut self, messenger: vk::DebugUtilsMessengerEXT);
    fn destroy_instance(&mut self, instance: vk::Instance);
}
