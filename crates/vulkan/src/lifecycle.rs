// Copyright 2026 The Trigon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Lifecycle
//!
//! Sequences setup and owns every handle it creates.  Handles go into a [`Ledger`] the moment
//! they exist, and the ledger is unwound last-in first-out.  Because creation order already puts
//! every dependency before its dependents, popping the ledger is exactly the reverse order
//! teardown requires, whether setup finished or stopped half way.

use std::ffi::c_char;

use ash::vk;
use tracing::{debug, error, info, warn};

use crate::device::{self, DeviceCandidate, LogicalDevice};
use crate::diagnostics;
use crate::frames::FrameResources;
use crate::gpu::{Gpu, PresentWindow};
use crate::pipeline::{RenderPipelineState, ShaderBlobs};
use crate::prelude::*;
use crate::probe;
use crate::swapchain::{PresentationChain, SwapchainConfiguration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    Uninitialized,
    /// Instance, diagnostics when enabled, and the window surface exist.
    WindowReady,
    DeviceReady,
    ChainReady,
    PipelineReady,
    FrameResourcesReady,
    /// Waiting for the window to close.  No per-frame work.
    Running,
    TornDown,
}

/// Anything this crate must destroy.  Physical devices, queues, swapchain images and command
/// buffers are owned by something else in this list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owned {
    Instance(vk::Instance),
    DebugMessenger(vk::DebugUtilsMessengerEXT),
    Surface(vk::SurfaceKHR),
    Device(vk::Device),
    Swapchain(vk::SwapchainKHR),
    ImageView(vk::ImageView),
    RenderPass(vk::RenderPass),
    PipelineLayout(vk::PipelineLayout),
    Pipeline(vk::Pipeline),
    Framebuffer(vk::Framebuffer),
    CommandPool(vk::CommandPool),
}

impl Owned {
    fn destroy(self, gpu: &mut impl Gpu) {
        match self {
            Owned::Instance(h) => gpu.destroy_instance(h),
            Owned::DebugMessenger(h) => gpu.destroy_debug_messenger(h),
            Owned::Surface(h) => gpu.destroy_surface(h),
            Owned::Device(h) => gpu.destroy_device(h),
            Owned::Swapchain(h) => gpu.destroy_swapchain(h),
            Owned::ImageView(h) => gpu.destroy_image_view(h),
            Owned::RenderPass(h) => gpu.destroy_render_pass(h),
            Owned::PipelineLayout(h) => gpu.destroy_pipeline_layout(h),
            Owned::Pipeline(h) => gpu.destroy_pipeline(h),
            Owned::Framebuffer(h) => gpu.destroy_framebuffer(h),
            Owned::CommandPool(h) => gpu.destroy_command_pool(h),
        }
    }
}

/// Creation-ordered record of owned handles.
#[derive(Debug, Default)]
pub struct Ledger {
    owned: Vec<Owned>,
}

impl Ledger {
    pub fn push(&mut self, owned: Owned) {
        self.owned.push(owned);
    }

    pub fn len(&self) -> usize {
        self.owned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owned.is_empty()
    }

    pub fn has_device(&self) -> bool {
        self.owned.iter().any(|o| matches!(o, Owned::Device(_)))
    }

    /// Destroy everything, newest first.  Leaves the ledger empty.
    pub fn unwind(&mut self, gpu: &mut impl Gpu) {
        while let Some(owned) = self.owned.pop() {
            debug!("destroying {owned:?}");
            owned.destroy(gpu);
        }
    }
}

pub struct Lifecycle<G: Gpu> {
    gpu: G,
    config: SetupConfig,
    state: LifecycleState,
    ledger: Ledger,

    device: Option<DeviceCandidate>,
    logical_device: Option<LogicalDevice>,
    chain: Option<PresentationChain>,
    pipeline: Option<RenderPipelineState>,
    frames: Option<FrameResources>,
}

impl<G: Gpu> Lifecycle<G> {
    pub fn new(gpu: G, config: SetupConfig) -> Self {
        Self {
            gpu,
            config,
            state: LifecycleState::Uninitialized,
            ledger: Ledger::default(),
            device: None,
            logical_device: None,
            chain: None,
            pipeline: None,
            frames: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn gpu(&self) -> &G {
        &self.gpu
    }

    pub fn config(&self) -> &SetupConfig {
        &self.config
    }

    pub fn device(&self) -> Option<&DeviceCandidate> {
        self.device.as_ref()
    }

    pub fn logical_device(&self) -> Option<&LogicalDevice> {
        self.logical_device.as_ref()
    }

    pub fn chain(&self) -> Option<&PresentationChain> {
        self.chain.as_ref()
    }

    pub fn pipeline(&self) -> Option<&RenderPipelineState> {
        self.pipeline.as_ref()
    }

    pub fn frames(&self) -> Option<&FrameResources> {
        self.frames.as_ref()
    }

    /// Run every construction step in order and enter `Running`.  On failure everything created
    /// so far is destroyed before the error is returned, and the lifecycle is `TornDown`.
    pub fn setup(
        &mut self,
        window: &dyn PresentWindow,
        shaders: &ShaderBlobs,
    ) -> Result<(), SetupError> {
        if self.state != LifecycleState::Uninitialized {
            return Err(SetupError::new(
                Stage::Instance,
                VulkanError::InvalidState(self.state),
            ));
        }
        match self.build(window, shaders) {
            Ok(()) => {
                self.state = LifecycleState::Running;
                info!("setup complete, running");
                Ok(())
            }
            Err(e) => {
                error!(
                    "{e}; unwinding {} resources from {:?}",
                    self.ledger.len(),
                    self.state
                );
                self.release();
                Err(e)
            }
        }
    }

    fn build(&mut self, window: &dyn PresentWindow, shaders: &ShaderBlobs) -> Result<(), SetupError> {
        let instance = self.create_instance(window)?;
        self.ledger.push(Owned::Instance(instance));
        info!("instance created");

        if self.config.diagnostics {
            let messenger = self
                .gpu
                .create_debug_messenger(&diagnostics::messenger_info())
                .at(Stage::Diagnostics)?;
            self.ledger.push(Owned::DebugMessenger(messenger));
            info!("debug messenger installed");
        }

        let surface = self.gpu.create_surface(window).at(Stage::Surface)?;
        self.ledger.push(Owned::Surface(surface));
        info!("surface created");
        self.state = LifecycleState::WindowReady;

        let candidate = device::select_device(&self.gpu, surface, &self.config.device_extensions)
            .at(Stage::DeviceSelection)?;
        let logical_device = device::create_logical_device(
            &mut self.gpu,
            &mut self.ledger,
            &candidate,
            &self.config.device_extensions,
        )?;
        self.state = LifecycleState::DeviceReady;

        let swapchain_config =
            SwapchainConfiguration::negotiate(&candidate.support, || window.framebuffer_size())
                .at(Stage::Swapchain)?;
        debug!("negotiated {swapchain_config:?}");
        let chain = PresentationChain::new(
            &mut self.gpu,
            &mut self.ledger,
            surface,
            &candidate.families,
            &swapchain_config,
        )?;
        self.state = LifecycleState::ChainReady;

        let pipeline = RenderPipelineState::new(
            &mut self.gpu,
            &mut self.ledger,
            chain.format,
            chain.extent,
            shaders,
        )?;
        self.state = LifecycleState::PipelineReady;

        let frames = FrameResources::new(
            &mut self.gpu,
            &mut self.ledger,
            &chain,
            &pipeline,
            candidate.families.graphics,
        )?;
        self.state = LifecycleState::FrameResourcesReady;

        self.device = Some(candidate);
        self.logical_device = Some(logical_device);
        self.chain = Some(chain);
        self.pipeline = Some(pipeline);
        self.frames = Some(frames);
        Ok(())
    }

    fn create_instance(&mut self, window: &dyn PresentWindow) -> Result<vk::Instance, SetupError> {
        let config = &self.config;
        let layers: &[_] = if config.diagnostics {
            let missing = probe::missing_layers(&self.gpu, &config.validation_layers);
            if !missing.is_empty() {
                return Err(SetupError::new(
                    Stage::Instance,
                    VulkanError::MissingLayers(missing),
                ));
            }
            &config.validation_layers
        } else {
            &[]
        };

        let mut extensions = self.gpu.surface_extensions(window).at(Stage::Instance)?;
        if config.diagnostics {
            extensions.push(ash::ext::debug_utils::NAME.to_owned());
        }
        debug!("instance extensions {extensions:?}, layers {layers:?}");

        let layer_names: Vec<*const c_char> = layers.iter().map(|l| l.as_ptr()).collect();
        let extension_names: Vec<*const c_char> =
            extensions.iter().map(|e| e.as_ptr()).collect();

        let app_info = vk::ApplicationInfo::default()
            .application_name(&config.app_name)
            .application_version(vk::make_api_version(0, 1, 0, 0))
            .engine_name(c"No Engine")
            .engine_version(vk::make_api_version(0, 0, 0, 0))
            .api_version(config.api_version);

        // Chained so that instance creation and destruction are reported too.
        let mut messenger_ci = diagnostics::messenger_info();
        let mut instance_ci = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_layer_names(&layer_names)
            .enabled_extension_names(&extension_names);
        if config.diagnostics {
            instance_ci = instance_ci.push_next(&mut messenger_ci);
        }

        self.gpu.create_instance(&instance_ci).at(Stage::Instance)
    }

    /// Tear down once the window asks to close.  Returns the state after polling.
    pub fn poll(&mut self, window: &dyn PresentWindow) -> LifecycleState {
        if self.state == LifecycleState::Running && window.should_close() {
            info!("window closed");
            self.teardown();
        }
        self.state
    }

    /// Destroy everything in reverse creation order.  Calling it again does nothing.
    pub fn teardown(&mut self) {
        if self.state == LifecycleState::TornDown {
            return;
        }
        self.release();
        info!("teardown complete");
    }

    fn release(&mut self) {
        if self.ledger.has_device() {
            if let Err(e) = self.gpu.device_wait_idle() {
                warn!("device_wait_idle failed before teardown: {e}");
            }
        }
        self.ledger.unwind(&mut self.gpu);
        self.device = None;
        self.logical_device = None;
        self.chain = None;
        self.pipeline = None;
        self.frames = None;
        self.state = LifecycleState::TornDown;
    }
}

impl<G: Gpu> Drop for Lifecycle<G> {
    fn drop(&mut self) {
        self.teardown();
    }
}
