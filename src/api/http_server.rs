// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, path::Path, sync::Arc};
use tokio::sync::RwLock;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{info, warn};

use super::detect_status::detect_status_handler;
use super::health::health_handler;
use crate::config::ServerConfig;
use crate::detector::ShopStatusDetector;
use crate::vision::image_utils::MAX_IMAGE_SIZE;

/// Request body limit: the image limit plus room for multipart framing
pub const MAX_UPLOAD_BYTES: usize = MAX_IMAGE_SIZE + 1024 * 1024;

/// Shared handler state
///
/// The detector is injected after startup; until then endpoints that need it
/// answer 503 and the health check reports `model_loaded: false`.
#[derive(Clone, Default)]
pub struct AppState {
    pub detector: Arc<RwLock<Option<Arc<ShopStatusDetector>>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_detector(detector: Arc<ShopStatusDetector>) -> Self {
        Self {
            detector: Arc::new(RwLock::new(Some(detector))),
        }
    }

    pub async fn set_detector(&self, detector: Arc<ShopStatusDetector>) {
        *self.detector.write().await = Some(detector);
    }

    pub async fn get_detector(&self) -> Option<Arc<ShopStatusDetector>> {
        self.detector.read().await.clone()
    }
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.cors_allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

/// Build the application router
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let public_dir = Path::new(&config.public_dir);

    Router::new()
        .route("/api/detect-status", post(detect_status_handler))
        .route("/api/health", get(health_handler))
        .route_service("/", ServeFile::new(public_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(public_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Bind and serve until Ctrl-C
pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<()> {
    let addr: SocketAddr = config
        .listen_addr()
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.listen_addr()))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("API server listening on {}", listener.local_addr()?);

    let app = build_router(state, config);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    Ok(())
}
