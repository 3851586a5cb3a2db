// Copyright 2026 The Trigon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Probe
//!
//! Read-only capability queries.  A failed query reads as "nothing supported" and callers decide
//! what emptiness means.  Layers and extensions must be probed before the instance or device that
//! requests them is created.

use std::ffi::CString;

use ash::vk;
use tracing::debug;

use crate::gpu::Gpu;
use crate::swapchain::SwapchainSupport;

/// Names from `wanted` that are absent from `available`, in `wanted` order.
fn missing(available: &[CString], wanted: &[CString]) -> Vec<CString> {
    wanted
        .iter()
        .filter(|w| !available.contains(w))
        .cloned()
        .collect()
}

/// Validation layers in `wanted` that the loader does not offer.
pub fn missing_layers(gpu: &impl Gpu, wanted: &[CString]) -> Vec<CString> {
    let available = gpu.instance_layer_names().unwrap_or_else(|e| {
        debug!("layer enumeration failed: {e}");
        Vec::new()
    });
    missing(&available, wanted)
}

/// Device extensions in `wanted` that `physical_device` does not offer.
pub fn missing_extensions(
    gpu: &impl Gpu,
    physical_device: vk::PhysicalDevice,
    wanted: &[CString],
) -> Vec<CString> {
    let available = gpu
        .device_extension_names(physical_device)
        .unwrap_or_else(|e| {
            debug!("extension enumeration failed: {e}");
            Vec::new()
        });
    missing(&available, wanted)
}

pub fn queue_families(
    gpu: &impl Gpu,
    physical_device: vk::PhysicalDevice,
) -> Vec<vk::QueueFamilyProperties> {
    gpu.queue_family_properties(physical_device)
}

/// Whether queue family `index` can present to `surface`.
pub fn presents(
    gpu: &impl Gpu,
    physical_device: vk::PhysicalDevice,
    index: u32,
    surface: vk::SurfaceKHR,
) -> bool {
    gpu.surface_support(physical_device, index, surface)
        .unwrap_or(false)
}

/// Snapshot of what `surface` accepts from `physical_device`.
pub fn swapchain_support(
    gpu: &impl Gpu,
    physical_device: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
) -> SwapchainSupport {
    SwapchainSupport {
        capabilities: gpu
            .surface_capabilities(physical_device, surface)
            .unwrap_or_default(),
        formats: gpu
            .surface_formats(physical_device, surface)
            .unwrap_or_default(),
        present_modes: gpu
            .surface_present_modes(physical_device, surface)
            .unwrap_or_default(),
    }
}
