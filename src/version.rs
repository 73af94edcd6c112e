// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Shop Status Detector

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "zero-shot-detection",
    "keyword-policy",
    "multipart-upload",
    "cuda-fallback",
    "hf-hub-download",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Shop Status Detector {}", VERSION_NUMBER)
}
