// Copyright 2026 The Trigon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Vulkan
//!
//! One-shot bootstrap of a presentation pipeline that draws a single triangle.
//!
//! Control flows leaf-first through:
//!
//! - `probe` asks the driver what it supports
//! - `device` picks the first usable physical device and opens a logical device
//! - `swapchain` turns surface capability ranges into one concrete chain
//! - `pipeline` builds the render pass and fixed-function graphics pipeline
//! - `frames` builds framebuffers and pre-records one draw per swapchain image
//! - `lifecycle` sequences all of the above and owns teardown
//!
//! Every Vulkan call goes through the [`gpu::Gpu`] trait.  [`context::VkContext`] is the real,
//! `ash` backed implementation.

pub mod config;
pub mod context;
pub mod device;
pub mod diagnostics;
pub mod frames;
pub mod gpu;
pub mod lifecycle;
pub mod pipeline;
pub mod probe;
pub mod queue;
pub mod swapchain;

#[cfg(test)]
pub(crate) mod fake;

use std::ffi::CString;
use std::fmt;

use ash::vk;

pub mod prelude {
    pub use super::{FailureClass, SetupError, Stage, StageExt, VulkanError};
    pub use crate::config::SetupConfig;
    pub use crate::context::VkContext;
    pub use crate::gpu::{Gpu, PresentWindow};
    pub use crate::lifecycle::{Lifecycle, LifecycleState};
}

#[derive(thiserror::Error, Debug)]
pub enum VulkanError {
    #[error("validation layers unavailable: {0:?}")]
    MissingLayers(Vec<CString>),

    #[error("device extensions unavailable: {0:?}")]
    MissingExtensions(Vec<CString>),

    #[error("no suitable device among {0} candidates")]
    NoSuitableDevice(usize),

    #[error("surface reports no formats or present modes")]
    UnsupportedSurface,

    #[error("swapchain was created without images")]
    NoSwapchainImages,

    #[error("Ash: {0}")]
    Ash(#[from] vk::Result),

    #[error("loading Vulkan library: {0}")]
    Loading(#[from] ash::LoadingError),

    #[error("window handle: {0}")]
    WindowHandle(#[from] raw_window_handle::HandleError),

    #[error("invalid shader binary: {0}")]
    InvalidShader(String),

    #[error("lifecycle is {0:?}, expected Uninitialized")]
    InvalidState(lifecycle::LifecycleState),
}

/// Coarse failure taxonomy.  Every class is fatal; the class only decides the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The machine lacks something: a layer, an extension, a device, a surface format.
    Environment,
    /// The driver refused to create something whose preconditions were met.
    Rejected,
    /// An external file could not be read or is malformed.
    Resource,
}

impl FailureClass {
    pub fn exit_code(self) -> u8 {
        match self {
            FailureClass::Environment => 2,
            FailureClass::Rejected => 3,
            FailureClass::Resource => 4,
        }
    }
}

impl VulkanError {
    pub fn class(&self) -> FailureClass {
        match self {
            VulkanError::MissingLayers(_)
            | VulkanError::MissingExtensions(_)
            | VulkanError::NoSuitableDevice(_)
            | VulkanError::UnsupportedSurface
            | VulkanError::Loading(_)
            | VulkanError::WindowHandle(_) => FailureClass::Environment,
            VulkanError::Ash(_)
            | VulkanError::NoSwapchainImages
            | VulkanError::InvalidState(_) => FailureClass::Rejected,
            VulkanError::InvalidShader(_) => FailureClass::Resource,
        }
    }
}

/// Construction steps, in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Instance,
    Diagnostics,
    Surface,
    DeviceSelection,
    LogicalDevice,
    Swapchain,
    ImageViews,
    RenderPass,
    Shaders,
    PipelineLayout,
    Pipeline,
    Framebuffers,
    CommandPool,
    CommandBuffers,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Instance => "instance creation",
            Stage::Diagnostics => "debug messenger creation",
            Stage::Surface => "surface creation",
            Stage::DeviceSelection => "physical device selection",
            Stage::LogicalDevice => "logical device creation",
            Stage::Swapchain => "swapchain creation",
            Stage::ImageViews => "image view creation",
            Stage::RenderPass => "render pass creation",
            Stage::Shaders => "shader module creation",
            Stage::PipelineLayout => "pipeline layout creation",
            Stage::Pipeline => "graphics pipeline creation",
            Stage::Framebuffers => "framebuffer creation",
            Stage::CommandPool => "command pool creation",
            Stage::CommandBuffers => "command buffer recording",
        };
        f.write_str(name)
    }
}

/// A fatal setup failure, tagged with the step that produced it.
#[derive(thiserror::Error, Debug)]
#[error("{stage} failed: {source}")]
pub struct SetupError {
    pub stage: Stage,
    #[source]
    pub source: VulkanError,
}

impl SetupError {
    pub fn new(stage: Stage, source: impl Into<VulkanError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }

    pub fn class(&self) -> FailureClass {
        self.source.class()
    }

    pub fn exit_code(&self) -> u8 {
        self.class().exit_code()
    }
}

/// Attach a [`Stage`] to any result whose error converts into [`VulkanError`].
pub trait StageExt<T> {
    fn at(self, stage: Stage) -> Result<T, SetupError>;
}

impl<T, E: Into<VulkanError>> StageExt<T> for Result<T, E> {
    fn at(self, stage: Stage) -> Result<T, SetupError> {
        self.map_err(|e| SetupError::new(stage, e))
    }
}
