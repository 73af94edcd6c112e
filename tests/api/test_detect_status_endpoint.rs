// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Detect-status endpoint tests for POST /api/detect-status
//!
//! Runs the full router with a stub inference provider, so no model weights
//! are needed.

use anyhow::Result;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use serde_json::Value;
use shop_status_detector::{
    api::{build_router, AppState},
    config::ServerConfig,
    detector::{Detection, InferenceProvider, ShopStatusDetector},
};
use std::io::Cursor;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

const BOUNDARY: &str = "shop-status-test-boundary";

/// Replays fixed detections for every image
struct StubProvider {
    detections: Vec<Detection>,
}

impl InferenceProvider for StubProvider {
    fn detect(&self, _image: &DynamicImage, _phrases: &[String]) -> Result<Vec<Detection>> {
        Ok(self.detections.clone())
    }

    fn device(&self) -> &str {
        "cpu"
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

struct BrokenProvider;

impl InferenceProvider for BrokenProvider {
    fn detect(&self, _image: &DynamicImage, _phrases: &[String]) -> Result<Vec<Detection>> {
        anyhow::bail!("session run failed")
    }

    fn device(&self) -> &str {
        "cuda"
    }

    fn model_name(&self) -> &str {
        "broken"
    }
}

fn app_with(provider: Option<Arc<dyn InferenceProvider>>) -> Router {
    let state = match provider {
        Some(provider) => AppState::with_detector(Arc::new(ShopStatusDetector::new(provider))),
        None => AppState::new(),
    };
    build_router(state, &ServerConfig::default())
}

fn app_with_detections(detections: Vec<Detection>) -> Router {
    let provider: Arc<dyn InferenceProvider> = Arc::new(StubProvider { detections });
    app_with(Some(provider))
}

/// 64x48 gray PNG
fn png_bytes() -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_fn(64, 48, |_, _| Rgb([128u8, 128u8, 128u8]));
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

/// Single-part multipart/form-data body
fn multipart_body(field: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"shop.png\"\r\n",
            field
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/detect-status")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[cfg(test)]
mod detect_status_tests {
    use super::*;

    #[tokio::test]
    async fn test_closed_shutter_detected() {
        let app = app_with_detections(vec![
            Detection::new(0.42, 0),
            Detection::new(0.91, 1),
            Detection::new(0.10, 3),
        ]);

        let response = app
            .oneshot(upload_request(multipart_body("file", "image/png", &png_bytes())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["status"], "closed");
        assert_eq!(json["confidence"], 0.91);
        assert_eq!(
            json["detected_label"],
            "a closed shop with metal shutter pulled down"
        );
        assert_eq!(json["message"], "Shop is Closed");
    }

    #[tokio::test]
    async fn test_no_detections_defaults_to_open() {
        let app = app_with_detections(vec![]);

        let response = app
            .oneshot(upload_request(multipart_body("file", "image/png", &png_bytes())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["status"], "open");
        assert_eq!(json["confidence"], 0.5);
        assert_eq!(json["detected_label"], "none");
        assert_eq!(
            json["message"],
            "Shop is Open (default - no strong indicators)"
        );
    }

    #[tokio::test]
    async fn test_low_score_floored() {
        let app = app_with_detections(vec![Detection::new(0.003, 2)]);

        let response = app
            .oneshot(upload_request(multipart_body("file", "image/png", &png_bytes())))
            .await
            .unwrap();

        let json = json_body(response).await;
        assert_eq!(json["status"], "open");
        assert_eq!(json["confidence"], 0.01);
        assert_eq!(json["detected_label"], "shop door open");
    }

    #[tokio::test]
    async fn test_provider_failure_reported_as_unknown() {
        let provider: Arc<dyn InferenceProvider> = Arc::new(BrokenProvider);
        let app = app_with(Some(provider));

        let response = app
            .oneshot(upload_request(multipart_body("file", "image/png", &png_bytes())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["status"], "unknown");
        assert_eq!(json["confidence"], 0.0);
        assert_eq!(json["detected_label"], "error");
        assert!(json["message"]
            .as_str()
            .unwrap()
            .starts_with("Error: session run failed"));
    }

    #[tokio::test]
    async fn test_non_image_upload_rejected() {
        let app = app_with_detections(vec![]);

        let response = app
            .oneshot(upload_request(multipart_body(
                "file",
                "text/plain",
                b"not an image",
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = json_body(response).await;
        assert_eq!(json["detail"], "Invalid file type. Please upload an image.");
    }

    #[tokio::test]
    async fn test_missing_file_field_rejected() {
        let app = app_with_detections(vec![]);

        let response = app
            .oneshot(upload_request(multipart_body("photo", "image/png", &png_bytes())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_model_not_loaded() {
        let app = app_with(None);

        let response = app
            .oneshot(upload_request(multipart_body("file", "image/png", &png_bytes())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let json = json_body(response).await;
        assert!(json["detail"].is_string());
    }

    #[tokio::test]
    async fn test_corrupted_image_is_server_error() {
        let app = app_with_detections(vec![]);
        let mut data = png_bytes();
        data.truncate(40);

        let response = app
            .oneshot(upload_request(multipart_body("file", "image/png", &data)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = json_body(response).await;
        assert!(json["detail"].is_string());
    }

    #[tokio::test]
    async fn test_get_not_allowed() {
        let app = app_with_detections(vec![]);

        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/detect-status")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
