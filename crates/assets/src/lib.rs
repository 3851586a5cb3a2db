// Copyright 2026 The Trigon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Assets
//!
//! Shaders are compiled ahead of time and loaded by name.  The build feature is for build scripts
//! that compile shader sources and record the packaged asset directory.  The runtime feature finds
//! and reads the compiled files.  Use the build feature in build-dependencies and the runtime
//! feature in normal dependencies.

#[cfg(feature = "runtime")]
pub mod assets;
#[cfg(feature = "build")]
pub mod build;
#[cfg(feature = "runtime")]
pub use assets::*;

use std::ffi::OsStr;

#[cfg(feature = "runtime")]
mod prelude {
    pub use super::AssetError;
    pub use super::AssetKind;
}

/// Overrides every other search path at run time.
pub const ASSETS_DIR_VAR: &str = "TRIGON_ASSETS_DIR";
/// Set by the build script from `package.metadata.trigon.asset_dir`.
pub const BUILD_ASSETS_DIR_VAR: &str = "TRIGON_BUILD_ASSETS_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Shader,
}

impl AssetKind {
    fn ext(&self) -> &'static OsStr {
        match self {
            AssetKind::Shader => OsStr::new("spv"),
        }
    }

    fn subdir(&self) -> &'static OsStr {
        match self {
            AssetKind::Shader => OsStr::new("shaders"),
        }
    }

    /// Path of `name` below an assets root, e.g. `shaders/triangle/vertex.spv`.
    pub fn relative_path(&self, name: &str) -> std::path::PathBuf {
        let mut file = std::path::PathBuf::from(self.subdir()).join(name);
        file.set_extension(self.ext());
        file
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("read failed: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("asset not found: {0}")]
    NotFound(String),
}
