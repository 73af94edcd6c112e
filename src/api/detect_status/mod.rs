// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shop status API endpoint module
//!
//! Provides POST /api/detect-status for classifying storefront photos.

pub mod handler;
pub mod request;

pub use handler::detect_status_handler;
pub use request::{read_upload, ImageUpload, INVALID_FILE_TYPE, UPLOAD_FIELD};
