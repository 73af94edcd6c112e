// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OWL-ViT integration for open-vocabulary object detection
//!
//! Components:
//! - `preprocessing` - Image normalization and query tokenization
//! - `postprocessing` - Logits/boxes to detections
//! - `model` - ONNX Runtime session implementing the inference provider

pub mod model;
pub mod postprocessing;
pub mod preprocessing;

pub use model::{OwlVitModel, OwlVitOptions};
pub use postprocessing::decode_detections;
pub use preprocessing::{encode_queries, preprocess_image, OWLVIT_INPUT_SIZE};
