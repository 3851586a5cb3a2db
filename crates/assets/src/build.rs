// Copyright 2026 The Trigon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Build Support
//!
//! Helpers for build scripts.  Output goes through `cargo:` directives.

use std::{ffi::OsStr, fs, io, path::Path, process};

use crate::BUILD_ASSETS_DIR_VAR;

const SHADER_EXTS: [&str; 2] = ["vert", "frag"];

/// Compile every `.vert` and `.frag` under `shaders/` into `assets/shaders/`, mirroring the
/// directory layout.  The stage comes from the extension, the asset name from the file stem, so
/// `shaders/triangle/vertex.vert` becomes the `triangle/vertex` shader.
///
/// Without `glslc` on the path this only warns; already compiled assets are left in place.
pub fn build_shaders() -> io::Result<()> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").map_err(io::Error::other)?;
    let crate_root = Path::new(&manifest_dir);

    let src_root = crate_root.join("shaders");
    let dest_root = crate_root.join("assets/shaders");

    println!("cargo:rerun-if-changed=shaders");

    if process::Command::new("glslc").arg("--version").output().is_err() {
        println!("cargo:warning=glslc not found, shaders were not compiled");
        return Ok(());
    }

    if src_root.is_dir() {
        compile_dir(&src_root, &src_root, &dest_root)?;
    }
    Ok(())
}

fn compile_dir(dir: &Path, src_root: &Path, dest_root: &Path) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            compile_dir(&path, src_root, dest_root)?;
            continue;
        }
        let is_shader = path
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| SHADER_EXTS.contains(&ext));
        if !is_shader {
            continue;
        }

        let stem = path.strip_prefix(src_root).map_err(io::Error::other)?;
        let out = dest_root.join(stem).with_extension("spv");
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }

        // `glslc --target-env=vulkan1.2 -O <input> -o <output>`
        let status = process::Command::new("glslc")
            .arg("--target-env=vulkan1.2")
            .arg("-O")
            .arg(path.as_os_str())
            .arg("-o")
            .arg(out.as_os_str())
            .status()?;

        if !status.success() {
            return Err(io::Error::other(format!("glslc failed for {path:?}")));
        }
    }
    Ok(())
}

/// Read `package.metadata.trigon.asset_dir` from the calling crate's manifest and bake it into
/// the binary as the release asset directory.  Packagers, see the viewer's Cargo.toml.
pub fn set_asset_default_dir() -> io::Result<()> {
    println!("cargo:rerun-if-env-changed={BUILD_ASSETS_DIR_VAR}");
    // An explicit environment setting wins over the manifest.
    if let Ok(dir) = std::env::var(BUILD_ASSETS_DIR_VAR) {
        println!("cargo:rustc-env={BUILD_ASSETS_DIR_VAR}={dir}");
        return Ok(());
    }

    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").map_err(io::Error::other)?;
    let cargo = fs::read_to_string(Path::new(&manifest_dir).join("Cargo.toml"))?;
    let dir = asset_dir_from_manifest(&cargo).map_err(io::Error::other)?;
    println!("cargo:rustc-env={BUILD_ASSETS_DIR_VAR}={dir}");
    Ok(())
}

/// `package.metadata.trigon.asset_dir`, or `assets` when unset.
pub fn asset_dir_from_manifest(manifest: &str) -> Result<String, toml::de::Error> {
    let parsed: toml::Table = toml::from_str(manifest)?;
    let dir = parsed
        .get("package")
        .and_then(|p| p.get("metadata"))
        .and_then(|m| m.get("trigon"))
        .and_then(|t| t.get("asset_dir"))
        .and_then(|d| d.as_str())
        .unwrap_or("assets");
    Ok(dir.to_owned())
}
