// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Health check endpoint

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::http_server::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    /// Execution device of the loaded model, "cpu" if none
    pub device: String,
    pub model_loaded: bool,
}

/// GET /api/health - Service health check
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let detector = state.get_detector().await;

    Json(HealthResponse {
        status: "healthy".to_string(),
        device: detector
            .as_ref()
            .map(|d| d.device().to_string())
            .unwrap_or_else(|| "cpu".to_string()),
        model_loaded: detector.is_some(),
    })
}
