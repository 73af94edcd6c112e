// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module
//!
//! This module provides:
//! - Upload validation and image decoding
//! - OWL-ViT zero-shot detection via ONNX Runtime
//! - Model file resolution (local directory or HuggingFace Hub)

pub mod image_utils;
pub mod model_manager;
pub mod owlvit;

pub use image_utils::{decode_image_bytes, detect_format, is_image_content_type, ImageError, ImageInfo};
pub use model_manager::{load_owlvit, resolve_model_files, ModelFiles, ModelSource};
pub use owlvit::{
    decode_detections, encode_queries, preprocess_image, OwlVitModel, OwlVitOptions,
    OWLVIT_INPUT_SIZE,
};
