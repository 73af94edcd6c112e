// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Inference provider seam
//!
//! The detector never talks to a model directly. Anything that can score a
//! list of text phrases against an image implements [`InferenceProvider`],
//! which lets the decision logic run against stubs in tests.

use anyhow::Result;
use image::DynamicImage;

/// Pixel-space box of a detection (top-left / bottom-right corners)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }
}

/// One candidate detection: a score for the phrase at `label`
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Detection score (0.0-1.0)
    pub score: f32,
    /// Index into the phrase list passed to the provider
    pub label: usize,
    /// Region the score refers to, when the provider reports one
    pub bounding_box: Option<BoundingBox>,
}

impl Detection {
    pub fn new(score: f32, label: usize) -> Self {
        Self {
            score,
            label,
            bounding_box: None,
        }
    }

    pub fn with_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }
}

/// Zero-shot detector: scores free-text phrases against an image
///
/// Implementations are loaded once and shared across requests, so they must
/// be safe to call from several blocking threads at once.
pub trait InferenceProvider: Send + Sync {
    /// Run detection for `phrases` on `image`.
    ///
    /// Every returned [`Detection::label`] is meant to index into `phrases`;
    /// the caller treats anything else as malformed output.
    fn detect(&self, image: &DynamicImage, phrases: &[String]) -> Result<Vec<Detection>>;

    /// Execution device, e.g. "cpu" or "cuda"
    fn device(&self) -> &str;

    /// Model identifier for logs and health output
    fn model_name(&self) -> &str;
}
