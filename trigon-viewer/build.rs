// Copyright 2026 The Trigon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use trigon_assets::build;

fn main() -> std::io::Result<()> {
    build::set_asset_default_dir()?;
    build::build_shaders()
}
