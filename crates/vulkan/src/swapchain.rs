// Copyright 2026 The Trigon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

// A swapchain exists when we are presenting to a Surface.  Negotiation turns the ranges a surface
// reports into one concrete configuration; creation then makes the chain and one view per image.

use ash::vk;
use tracing::{debug, info};

use crate::gpu::Gpu;
use crate::lifecycle::{Ledger, Owned};
use crate::prelude::*;
use crate::queue::QueueFamilyIndices;

/// What a surface accepts from one physical device.  Queried fresh per device, never cached.
#[derive(Debug, Clone, Default)]
pub struct SwapchainSupport {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl SwapchainSupport {
    pub fn is_adequate(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapchainConfiguration {
    pub format: vk::SurfaceFormatKHR,
    pub present_mode: vk::PresentModeKHR,
    pub extent: vk::Extent2D,
    pub image_count: u32,
    pub transform: vk::SurfaceTransformFlagsKHR,
    pub composite_alpha: vk::CompositeAlphaFlagsKHR,
}

impl SwapchainConfiguration {
    /// Resolve `support` into one configuration.  `framebuffer_size` is only consulted when the
    /// surface leaves the extent to the window.
    pub fn negotiate(
        support: &SwapchainSupport,
        framebuffer_size: impl FnOnce() -> vk::Extent2D,
    ) -> Result<Self, VulkanError> {
        let caps = &support.capabilities;
        Ok(Self {
            format: choose_format(&support.formats).ok_or(VulkanError::UnsupportedSurface)?,
            present_mode: choose_present_mode(&support.present_modes),
            extent: choose_extent(caps, framebuffer_size),
            image_count: choose_image_count(caps),
            transform: caps.current_transform,
            composite_alpha: pick_alpha(caps),
        })
    }
}

/// 8-bit BGRA in nonlinear sRGB, or else whatever the surface lists first.
pub fn choose_format(formats: &[vk::SurfaceFormatKHR]) -> Option<vk::SurfaceFormatKHR> {
    formats
        .iter()
        .find(|f| {
            f.format == vk::Format::B8G8R8A8_SRGB
                && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .or_else(|| formats.first())
        .copied()
}

/// MAILBOX when offered.  FIFO is always supported, so it is the only fallback.
pub fn choose_present_mode(modes: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    if modes.contains(&vk::PresentModeKHR::MAILBOX) {
        vk::PresentModeKHR::MAILBOX
    } else {
        vk::PresentModeKHR::FIFO
    }
}

pub fn choose_extent(
    caps: &vk::SurfaceCapabilitiesKHR,
    framebuffer_size: impl FnOnce() -> vk::Extent2D,
) -> vk::Extent2D {
    // u32::MAX width means the extent follows the window.
    if caps.current_extent.width != u32::MAX {
        return caps.current_extent;
    }
    let size = framebuffer_size();
    vk::Extent2D {
        // Minimum wins when the range is inverted.
        width: size
            .width
            .min(caps.max_image_extent.width)
            .max(caps.min_image_extent.width),
        height: size
            .height
            .min(caps.max_image_extent.height)
            .max(caps.min_image_extent.height),
    }
}

/// One more than the minimum, then bounded by the maximum.  A maximum of zero is unbounded.
pub fn choose_image_count(caps: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let count = caps.min_image_count.saturating_add(1);
    if caps.max_image_count > 0 && count > caps.max_image_count {
        caps.max_image_count
    } else {
        count
    }
}

/// Concurrent across exactly the two families when they differ.
pub fn sharing(indices: &QueueFamilyIndices) -> (vk::SharingMode, Vec<u32>) {
    if indices.is_shared() {
        (vk::SharingMode::EXCLUSIVE, Vec::new())
    } else {
        (
            vk::SharingMode::CONCURRENT,
            vec![indices.graphics, indices.present],
        )
    }
}

fn pick_alpha(surface_caps: &vk::SurfaceCapabilitiesKHR) -> vk::CompositeAlphaFlagsKHR {
    [
        vk::CompositeAlphaFlagsKHR::OPAQUE,
        vk::CompositeAlphaFlagsKHR::PRE_MULTIPLIED,
        vk::CompositeAlphaFlagsKHR::POST_MULTIPLIED,
    ]
    .into_iter()
    .find(|alpha| surface_caps.supported_composite_alpha.contains(*alpha))
    .unwrap_or(vk::CompositeAlphaFlagsKHR::INHERIT)
}

/// The swapchain, its images in driver order, and one view per image.
#[derive(Debug, Clone)]
pub struct PresentationChain {
    pub swapchain: vk::SwapchainKHR,
    pub images: Vec<vk::Image>,
    pub views: Vec<vk::ImageView>,
    pub format: vk::Format,
    pub extent: vk::Extent2D,
}

impl PresentationChain {
    /// Every handle is recorded in `ledger` as soon as it exists, so a failure part way through
    /// leaves nothing untracked.
    pub fn new(
        gpu: &mut impl Gpu,
        ledger: &mut Ledger,
        surface: vk::SurfaceKHR,
        indices: &QueueFamilyIndices,
        config: &SwapchainConfiguration,
    ) -> Result<Self, SetupError> {
        let (sharing_mode, family_indices) = sharing(indices);
        let swapchain_info = vk::SwapchainCreateInfoKHR::default()
            .surface(surface)
            .min_image_count(config.image_count)
            .image_format(config.format.format)
            .image_color_space(config.format.color_space)
            .image_extent(config.extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(sharing_mode)
            .queue_family_indices(&family_indices)
            .pre_transform(config.transform)
            .composite_alpha(config.composite_alpha)
            .present_mode(config.present_mode)
            .clipped(true);

        let swapchain = gpu
            .create_swapchain(&swapchain_info)
            .at(Stage::Swapchain)?;
        ledger.push(Owned::Swapchain(swapchain));

        // The driver may hand back more images than requested.
        let images = gpu.swapchain_images(swapchain).at(Stage::Swapchain)?;
        if images.is_empty() {
            return Err(SetupError::new(
                Stage::Swapchain,
                VulkanError::NoSwapchainImages,
            ));
        }
        debug!(
            "swapchain has {} images, {} requested",
            images.len(),
            config.image_count
        );

        let mut views = Vec::with_capacity(images.len());
        for &image in &images {
            let view_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(config.format.format)
                .components(vk::ComponentMapping::default())
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                });
            let view = gpu.create_image_view(&view_info).at(Stage::ImageViews)?;
            ledger.push(Owned::ImageView(view));
            views.push(view);
        }

        info!(
            "presentation chain: {:?} {:?} {}x{} with {} images",
            config.format.format,
            config.present_mode,
            config.extent.width,
            config.extent.height,
            images.len()
        );

        Ok(Self {
            swapchain,
            images,
            views,
            format: config.format.format,
            extent: config.extent,
        })
    }
}
