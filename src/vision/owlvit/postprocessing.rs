// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OWL-ViT output decoding
//!
//! The model emits one box per image patch with a logit for every text
//! query. Each patch becomes one [`Detection`] labelled with its best query.

use anyhow::Result;
use ndarray::ArrayView3;

use crate::detector::{BoundingBox, Detection};

pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Convert raw outputs into detections
///
/// # Arguments
/// - `logits`: `[1, num_patches, num_queries]` class logits
/// - `pred_boxes`: `[1, num_patches, 4]` boxes as normalized (cx, cy, w, h)
/// - `image_size`: `(width, height)` of the original image, used to scale boxes
/// - `threshold`: detections must score strictly above this value
///
/// Labels are the first query holding the maximum logit for each patch.
pub fn decode_detections(
    logits: ArrayView3<f32>,
    pred_boxes: ArrayView3<f32>,
    image_size: (u32, u32),
    threshold: f32,
) -> Result<Vec<Detection>> {
    let (batch, num_patches, num_queries) = logits.dim();
    if batch != 1 {
        anyhow::bail!("Expected batch size 1, got {}", batch);
    }
    if num_queries == 0 {
        anyhow::bail!("Model returned no query logits");
    }
    if pred_boxes.dim() != (1, num_patches, 4) {
        anyhow::bail!(
            "Box output shape {:?} does not match {} patches",
            pred_boxes.shape(),
            num_patches
        );
    }

    let (width, height) = (image_size.0 as f32, image_size.1 as f32);
    let mut detections = Vec::new();

    for patch in 0..num_patches {
        let mut label = 0;
        let mut best = logits[[0, patch, 0]];
        for query in 1..num_queries {
            let logit = logits[[0, patch, query]];
            if logit > best {
                best = logit;
                label = query;
            }
        }

        let score = sigmoid(best);
        if score <= threshold {
            continue;
        }

        let cx = pred_boxes[[0, patch, 0]];
        let cy = pred_boxes[[0, patch, 1]];
        let w = pred_boxes[[0, patch, 2]];
        let h = pred_boxes[[0, patch, 3]];

        let bbox = BoundingBox {
            x0: ((cx - w / 2.0) * width).clamp(0.0, width),
            y0: ((cy - h / 2.0) * height).clamp(0.0, height),
            x1: ((cx + w / 2.0) * width).clamp(0.0, width),
            y1: ((cy + h / 2.0) * height).clamp(0.0, height),
        };

        detections.push(Detection::new(score, label).with_box(bbox));
    }

    Ok(detections)
}
