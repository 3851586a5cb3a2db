// Copyright 2026 The Trigon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Requirement tables and switches that shape setup.  Tests substitute their own.

use std::ffi::CString;

use ash::vk;

pub const VALIDATION_LAYER: &std::ffi::CStr = c"VK_LAYER_KHRONOS_validation";

#[derive(Debug, Clone)]
pub struct SetupConfig {
    /// Reported to the driver as the application name.
    pub app_name: CString,
    /// Instance layers required when `diagnostics` is on.
    pub validation_layers: Vec<CString>,
    /// Every selected device must support all of these.
    pub device_extensions: Vec<CString>,
    /// Enable validation layers and forward driver messages to the log.
    pub diagnostics: bool,
    pub api_version: u32,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            app_name: CString::from(c"trigon"),
            validation_layers: vec![VALIDATION_LAYER.to_owned()],
            device_extensions: vec![vk::KHR_SWAPCHAIN_NAME.to_owned()],
            diagnostics: cfg!(debug_assertions),
            api_version: vk::API_VERSION_1_2,
        }
    }
}

impl SetupConfig {
    pub fn with_app_name(mut self, name: &str) -> Self {
        // Interior nul bytes would truncate the name anyway.
        let name: String = name.chars().filter(|c| *c != '\0').collect();
        if let Ok(name) = CString::new(name) {
            self.app_name = name;
        }
        self
    }

    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }
}
