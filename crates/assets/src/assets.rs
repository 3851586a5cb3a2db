// Copyright 2026 The Trigon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Assets
//!
//! Lookups vary between development and installed use.  `AssetDirs` is the set of existing
//! directories a lookup searches, checked once when it is built.
//!
//! ## Precedence Rules
//!
//! - On **debug builds**:
//!
//!   1. `TRIGON_ASSETS_DIR`
//!   2. The `assets` folder under `CARGO_MANIFEST_DIR`, as set by `cargo run`.
//!
//! - On **release builds**:
//!
//!   1. `TRIGON_ASSETS_DIR`
//!   2. The user's local data directory
//!   3. The packaging directory from `TRIGON_BUILD_ASSETS_DIR` or
//!      `package.metadata.trigon.asset_dir` in the Cargo.toml.
//!   4. The system data directory.
//!
//! Every one of these points at an assets root, a folder containing a `shaders` directory.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::prelude::*;
use crate::{ASSETS_DIR_VAR, BUILD_ASSETS_DIR_VAR};

/// Checked search roots, in precedence order.
#[derive(Debug, Clone)]
pub struct AssetDirs {
    search_paths: Vec<PathBuf>,
}

/// Only consulted by release builds.
const DEFAULT_ASSET_DIR: Option<&str> = option_env!("TRIGON_BUILD_ASSETS_DIR");

fn as_assets_root(p: PathBuf) -> Option<PathBuf> {
    p.canonicalize().ok().filter(|p| p.is_dir())
}

// Treat the given path as a parent containing an `assets/` subdir.
fn with_assets_subdir(p: PathBuf) -> Option<PathBuf> {
    as_assets_root(p.join("assets"))
}

impl Default for AssetDirs {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetDirs {
    pub fn new() -> Self {
        let mut search_paths = Vec::with_capacity(4);

        if let Ok(raw) = std::env::var(ASSETS_DIR_VAR) {
            match as_assets_root(PathBuf::from(&raw)) {
                Some(path) => search_paths.push(path),
                None => warn!("ignoring {ASSETS_DIR_VAR}, not a directory: {raw}"),
            }
        }

        if cfg!(debug_assertions) {
            search_paths.extend(
                std::env::var("CARGO_MANIFEST_DIR")
                    .ok()
                    .map(PathBuf::from)
                    .and_then(with_assets_subdir),
            );
        } else {
            search_paths.extend(
                dirs::data_local_dir().and_then(|d| with_assets_subdir(d.join("trigon"))),
            );
            search_paths.extend(DEFAULT_ASSET_DIR.map(PathBuf::from).and_then(as_assets_root));
            search_paths.extend(dirs::data_dir().and_then(|d| with_assets_subdir(d.join("trigon"))));
        }
        debug!(
            "asset search paths ({BUILD_ASSETS_DIR_VAR}={DEFAULT_ASSET_DIR:?}): {search_paths:?}"
        );

        AssetDirs { search_paths }
    }

    /// Search exactly `roots`, skipping any that do not exist.
    pub fn with_roots(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        AssetDirs {
            search_paths: roots.into_iter().filter_map(as_assets_root).collect(),
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// First existing file for `name` across the search roots.
    pub fn find(&self, name: &str, kind: AssetKind) -> Option<PathBuf> {
        let file = kind.relative_path(name);
        let found = self
            .search_paths
            .iter()
            .map(|root| root.join(&file))
            .find(|candidate| candidate.is_file());

        if found.is_none() {
            warn!("{kind:?} {name} not found");
            for root in &self.search_paths {
                debug!("  checked: {:?}", root.join(&file));
            }
        }
        found
    }

    pub fn find_bytes(&self, name: &str, kind: AssetKind) -> Result<Vec<u8>, AssetError> {
        let found = self
            .find(name, kind)
            .ok_or_else(|| AssetError::NotFound(name.to_owned()))?;
        Ok(std::fs::read(found)?)
    }
}
