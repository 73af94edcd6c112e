// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Storefront status detector: provider + decision policy

use std::sync::Arc;
use std::time::Instant;

use image::DynamicImage;
use tracing::{debug, error, info};

use super::phrases::STOREFRONT_PHRASES;
use super::policy::{Classification, DecisionPolicy};
use super::provider::InferenceProvider;

/// Classifies storefront images as open or closed
///
/// Holds an injected [`InferenceProvider`] so the same detector runs against
/// the ONNX model in production and against stubs in tests.
pub struct ShopStatusDetector {
    provider: Arc<dyn InferenceProvider>,
    policy: DecisionPolicy,
}

impl std::fmt::Debug for ShopStatusDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopStatusDetector")
            .field("model", &self.provider.model_name())
            .field("device", &self.provider.device())
            .field("policy", &self.policy)
            .finish()
    }
}

impl ShopStatusDetector {
    /// Detector using the built-in storefront phrases
    pub fn new(provider: Arc<dyn InferenceProvider>) -> Self {
        Self::with_phrases(provider, &STOREFRONT_PHRASES)
    }

    pub fn with_phrases<S: AsRef<str>>(provider: Arc<dyn InferenceProvider>, phrases: &[S]) -> Self {
        Self {
            provider,
            policy: DecisionPolicy::new(phrases),
        }
    }

    /// Classify one image.
    ///
    /// Provider failures are reported as an `unknown` classification rather
    /// than an error. This call blocks for the duration of inference.
    pub fn classify(&self, image: &DynamicImage) -> Classification {
        let start = Instant::now();
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());

        let classification = match self.provider.detect(&rgb, self.policy.phrases()) {
            Ok(detections) => {
                debug!("{} returned {} detections", self.provider.model_name(), detections.len());
                self.policy.decide(&detections)
            }
            Err(e) => {
                error!("Classification error: {:#}", e);
                Classification::failure(format!("{:#}", e))
            }
        };

        info!(
            "Classified {}x{} image: {} ({:.4}, {:?}) in {}ms",
            image.width(),
            image.height(),
            classification.status,
            classification.confidence,
            classification.detected_label,
            start.elapsed().as_millis()
        );

        classification
    }

    pub fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }

    pub fn device(&self) -> &str {
        self.provider.device()
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }
}
