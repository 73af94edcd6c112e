// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Storefront open/closed detection
//!
//! This module provides:
//! - The fixed text queries sent to the zero-shot model
//! - The decision policy mapping the best detection to a status
//! - The inference provider seam and the detector service tying them together

pub mod phrases;
pub mod policy;
pub mod provider;
pub mod service;

pub use phrases::STOREFRONT_PHRASES;
pub use policy::{
    status_for_phrase, Classification, ClassificationError, DecisionPolicy, PhraseEntry,
    ShopStatus,
};
pub use provider::{BoundingBox, Detection, InferenceProvider};
pub use service::ShopStatusDetector;
