// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Health check and static frontend routes

use anyhow::Result;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use image::DynamicImage;
use shop_status_detector::{
    api::{build_router, AppState, HealthResponse},
    config::ServerConfig,
    detector::{Detection, InferenceProvider, ShopStatusDetector},
};
use std::sync::Arc;
use tower::util::ServiceExt;

struct GpuStub;

impl InferenceProvider for GpuStub {
    fn detect(&self, _image: &DynamicImage, _phrases: &[String]) -> Result<Vec<Detection>> {
        Ok(vec![])
    }

    fn device(&self) -> &str {
        "cuda"
    }

    fn model_name(&self) -> &str {
        "gpu-stub"
    }
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

#[cfg(test)]
mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_without_model() {
        let app = build_router(AppState::new(), &ServerConfig::default());

        let (status, body) = get(app, "/api/health").await;
        assert_eq!(status, StatusCode::OK);

        let health: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            health,
            HealthResponse {
                status: "healthy".to_string(),
                device: "cpu".to_string(),
                model_loaded: false,
            }
        );
    }

    #[tokio::test]
    async fn test_health_reports_model_device() {
        let state = AppState::new();
        state
            .set_detector(Arc::new(ShopStatusDetector::new(Arc::new(GpuStub))))
            .await;
        let app = build_router(state, &ServerConfig::default());

        let (status, body) = get(app, "/api/health").await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["device"], "cuda");
        assert_eq!(json["model_loaded"], true);
    }
}

#[cfg(test)]
mod static_file_tests {
    use super::*;
    use std::fs;

    fn config_for(dir: &std::path::Path) -> ServerConfig {
        ServerConfig {
            public_dir: dir.to_string_lossy().to_string(),
            ..ServerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_index_served_at_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>Shop Status</h1>").unwrap();

        let app = build_router(AppState::new(), &config_for(dir.path()));
        let (status, body) = get(app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"<h1>Shop Status</h1>");
    }

    #[tokio::test]
    async fn test_static_assets_served() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.js"), "console.log('ok');").unwrap();

        let app = build_router(AppState::new(), &config_for(dir.path()));
        let (status, body) = get(app, "/static/app.js").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"console.log('ok');");
    }

    #[tokio::test]
    async fn test_missing_static_asset() {
        let dir = tempfile::tempdir().unwrap();

        let app = build_router(AppState::new(), &config_for(dir.path()));
        let (status, _) = get(app, "/static/missing.css").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
