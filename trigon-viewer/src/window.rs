// Copyright 2026 The Trigon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The winit side of presentation.  Fixed size, not resizable, closed only by the user.

use ash::vk;
use raw_window_handle::{
    HandleError, HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle,
};
use winit::{
    dpi::PhysicalSize,
    error::OsError,
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

use trigon_vulkan::gpu::PresentWindow;

pub struct ViewerWindow {
    window: Window,
    close_requested: bool,
}

impl ViewerWindow {
    pub fn new(
        event_loop: &ActiveEventLoop,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<Self, OsError> {
        let attributes = Window::default_attributes()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(width, height))
            .with_resizable(false);
        let window = event_loop.create_window(attributes)?;
        Ok(Self {
            window,
            close_requested: false,
        })
    }

    pub fn id(&self) -> WindowId {
        self.window.id()
    }

    pub fn request_close(&mut self) {
        self.close_requested = true;
    }
}

impl PresentWindow for ViewerWindow {
    fn display_handle(&self) -> Result<RawDisplayHandle, HandleError> {
        Ok(self.window.display_handle()?.as_raw())
    }

    fn window_handle(&self) -> Result<RawWindowHandle, HandleError> {
        Ok(self.window.window_handle()?.as_raw())
    }

    fn framebuffer_size(&self) -> vk::Extent2D {
        let size = self.window.inner_size();
        vk::Extent2D {
            width: size.width,
            height: size.height,
        }
    }

    fn should_close(&self) -> bool {
        self.close_requested
    }
}
