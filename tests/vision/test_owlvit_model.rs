// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! OWL-ViT pipeline tests
//!
//! Pre/post-processing run without weights. Tests marked `#[ignore]` need a
//! local export pointed to by `OWLVIT_MODEL_DIR` (containing
//! `onnx/model.onnx` and `tokenizer.json`).

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use ndarray::Array3;
use shop_status_detector::{
    config::ModelConfig,
    detector::{InferenceProvider, ShopStatus, ShopStatusDetector, STOREFRONT_PHRASES},
    vision::{
        decode_detections, decode_image_bytes, load_owlvit, preprocess_image, ModelFiles,
        OwlVitModel, OwlVitOptions, OWLVIT_INPUT_SIZE,
    },
};
use std::io::Cursor;
use std::sync::Arc;

fn storefront_jpeg() -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_fn(320, 240, |x, y| {
        if y > 120 {
            Rgb([90, 90, 95])
        } else {
            Rgb([(x % 255) as u8, 140, 60])
        }
    });
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Jpeg).unwrap();
    buffer.into_inner()
}

fn model_dir() -> Option<String> {
    std::env::var("OWLVIT_MODEL_DIR").ok()
}

#[cfg(test)]
mod pipeline_tests {
    use super::*;

    #[test]
    fn test_uploaded_jpeg_preprocessed_to_model_input() {
        let (image, info) = decode_image_bytes(&storefront_jpeg()).unwrap();
        assert_eq!((info.width, info.height), (320, 240));

        let pixels = preprocess_image(&image);
        let size = OWLVIT_INPUT_SIZE as usize;
        assert_eq!(pixels.shape(), &[1, 3, size, size]);
        assert!(pixels.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_decoded_detections_feed_policy() {
        // Three patches over the six storefront phrases
        let mut logits = Array3::<f32>::from_elem((1, 3, STOREFRONT_PHRASES.len()), -8.0);
        logits[[0, 0, 0]] = -1.0;
        logits[[0, 1, 3]] = 2.0;
        logits[[0, 2, 5]] = 0.5;
        let boxes = Array3::<f32>::from_elem((1, 3, 4), 0.25);

        let detections = decode_detections(logits.view(), boxes.view(), (320, 240), 0.0).unwrap();
        assert_eq!(detections.len(), 3);

        let policy = shop_status_detector::detector::DecisionPolicy::new(&STOREFRONT_PHRASES);
        let result = policy.decide(&detections);
        assert_eq!(result.status, ShopStatus::Closed);
        assert_eq!(result.detected_label, "shop shutter closed");
        // sigmoid(2.0)
        assert_eq!(result.confidence, 0.8808);
    }

    #[test]
    fn test_threshold_filters_weak_patches() {
        let mut logits = Array3::<f32>::from_elem((1, 2, 2), -6.0);
        logits[[0, 1, 1]] = 1.0;
        let boxes = Array3::<f32>::from_elem((1, 2, 4), 0.5);

        let detections = decode_detections(logits.view(), boxes.view(), (100, 100), 0.5).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].label, 1);
    }
}

#[cfg(test)]
mod model_loading_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_files_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let files = ModelFiles::in_dir(dir.path(), &ModelConfig::default());

        let result = OwlVitModel::new(
            "owlvit",
            &files.model_path,
            &files.tokenizer_path,
            OwlVitOptions::default(),
        )
        .await;

        let err = result.unwrap_err().to_string();
        assert!(err.contains("not found"), "unexpected error: {}", err);
    }

    #[tokio::test]
    #[ignore] // Requires OWLVIT_MODEL_DIR
    async fn test_real_model_classifies_image() {
        let Some(dir) = model_dir() else {
            eprintln!("OWLVIT_MODEL_DIR not set, skipping");
            return;
        };
        let config = ModelConfig {
            model_dir: Some(dir),
            use_cuda: false,
            ..ModelConfig::default()
        };

        let model = load_owlvit(&config).await.expect("Failed to load OWL-ViT");
        assert_eq!(model.device(), "cpu");

        let detector = ShopStatusDetector::new(Arc::new(model));
        let (image, _) = decode_image_bytes(&storefront_jpeg()).unwrap();
        let result = detector.classify(&DynamicImage::from(image.to_rgb8()));

        assert_ne!(result.status, ShopStatus::Unknown, "{}", result.message);
        assert!(result.confidence >= 0.01 && result.confidence <= 1.0);
    }
}
