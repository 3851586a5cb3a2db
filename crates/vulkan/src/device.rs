// Copyright 2026 The Trigon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Device
//!
//! Pick the first physical device that can draw, present to the surface, supports every required
//! extension, and offers at least one surface format and present mode.  There is no scoring, so
//! enumeration order decides between equally capable devices.

use std::ffi::{c_char, CString};

use ash::vk;
use tracing::{debug, info};

use crate::gpu::Gpu;
use crate::lifecycle::{Ledger, Owned};
use crate::prelude::*;
use crate::probe;
use crate::queue::{QueueFamilyIndices, QueueFamilyRequirement, Queues};
use crate::swapchain::SwapchainSupport;

/// A device that passed every check.  Physical devices are never destroyed, so this owns nothing.
#[derive(Debug, Clone)]
pub struct DeviceCandidate {
    pub physical_device: vk::PhysicalDevice,
    pub name: String,
    pub families: QueueFamilyIndices,
    pub support: SwapchainSupport,
}

/// Check one device, returning why it was rejected on failure.
pub fn evaluate(
    gpu: &impl Gpu,
    physical_device: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
    required_extensions: &[CString],
) -> Result<DeviceCandidate, &'static str> {
    let families = QueueFamilyRequirement::resolve(
        &probe::queue_families(gpu, physical_device),
        |index| probe::presents(gpu, physical_device, index, surface),
    );
    let families = match families.indices() {
        Some(indices) => indices,
        None if families.graphics.is_none() => return Err("no graphics queue family"),
        None => return Err("no queue family presents to the surface"),
    };

    if !probe::missing_extensions(gpu, physical_device, required_extensions).is_empty() {
        return Err("missing device extensions");
    }

    // Only meaningful once the swapchain extension is known to exist.
    let support = probe::swapchain_support(gpu, physical_device, surface);
    if !support.is_adequate() {
        return Err("no surface formats or present modes");
    }

    Ok(DeviceCandidate {
        physical_device,
        name: gpu.device_name(physical_device),
        families,
        support,
    })
}

/// First match in enumeration order.
pub fn select_device(
    gpu: &impl Gpu,
    surface: vk::SurfaceKHR,
    required_extensions: &[CString],
) -> Result<DeviceCandidate, VulkanError> {
    let devices = gpu.physical_devices().unwrap_or_default();
    for &physical_device in &devices {
        match evaluate(gpu, physical_device, surface, required_extensions) {
            Ok(candidate) => {
                info!(
                    "selected device {:?}, graphics family {}, present family {}",
                    candidate.name, candidate.families.graphics, candidate.families.present
                );
                return Ok(candidate);
            }
            Err(reason) => debug!(
                "skipping device {:?}: {reason}",
                gpu.device_name(physical_device)
            ),
        }
    }
    Err(VulkanError::NoSuitableDevice(devices.len()))
}

#[derive(Debug, Clone, Copy)]
pub struct LogicalDevice {
    pub device: vk::Device,
    pub queues: Queues,
}

/// Open the chosen device with one queue per unique family and no optional features.
pub fn create_logical_device(
    gpu: &mut impl Gpu,
    ledger: &mut Ledger,
    candidate: &DeviceCandidate,
    extensions: &[CString],
) -> Result<LogicalDevice, SetupError> {
    let priorities = [1.0];
    let queue_cis = candidate.families.queue_cis(&priorities);
    let extension_names: Vec<*const c_char> = extensions.iter().map(|e| e.as_ptr()).collect();
    let features = vk::PhysicalDeviceFeatures::default();

    let device_ci = vk::DeviceCreateInfo::default()
        .queue_create_infos(&queue_cis)
        .enabled_extension_names(&extension_names)
        .enabled_features(&features);

    let device = gpu
        .create_device(candidate.physical_device, &device_ci)
        .at(Stage::LogicalDevice)?;
    ledger.push(Owned::Device(device));

    let queues = Queues {
        graphics: gpu.device_queue(candidate.families.graphics, 0),
        present: gpu.device_queue(candidate.families.present, 0),
    };
    info!("logical device ready with {} queue families", queue_cis.len());
    Ok(LogicalDevice { device, queues })
}
