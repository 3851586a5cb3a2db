// Copyright 2026 The Trigon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Diagnostics
//!
//! Driver and validation-layer messages are forwarded to `tracing` under the `vulkan` target.
//! Nothing here acts on a message.

use std::ffi::{c_void, CStr};

use ash::vk;

/// Describe the messenger.  The same description is chained into instance creation so that
/// instance create and destroy are also covered.
pub fn messenger_info() -> vk::DebugUtilsMessengerCreateInfoEXT<'static> {
    vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(forward_message))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

fn level(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> Level {
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        Level::Error
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        Level::Warn
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        Level::Info
    } else {
        Level::Debug
    }
}

unsafe extern "system" fn forward_message(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut c_void,
) -> vk::Bool32 {
    let message = if callback_data.is_null() {
        std::borrow::Cow::Borrowed("<no callback data>")
    } else {
        let data = unsafe { &*callback_data };
        if data.p_message.is_null() {
            std::borrow::Cow::Borrowed("<empty message>")
        } else {
            unsafe { CStr::from_ptr(data.p_message) }.to_string_lossy()
        }
    };

    match level(severity) {
        Level::Error => tracing::error!(target: "vulkan", "{message_type:?}: {message}"),
        Level::Warn => tracing::warn!(target: "vulkan", "{message_type:?}: {message}"),
        Level::Info => tracing::info!(target: "vulkan", "{message_type:?}: {message}"),
        Level::Debug => tracing::debug!(target: "vulkan", "{message_type:?}: {message}"),
    }

    // Returning true would abort the call that triggered the message.
    vk::FALSE
}
