// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Plate Recognition Node

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Capabilities exposed by this build
pub const FEATURES: &[&str] = &["plate-candidates", "paddleocr", "multipart-upload"];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Plate Recognition Node {}", VERSION_NUMBER)
}
