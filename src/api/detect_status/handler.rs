// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detect-status endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use tracing::{debug, error, info, warn};

use super::request::read_upload;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::detector::Classification;
use crate::vision::decode_image_bytes;

/// POST /api/detect-status - Classify a storefront photo as open or closed
///
/// # Request
/// Multipart form with an image in the `file` field.
///
/// # Response
/// - `status`: "open", "closed" or "unknown"
/// - `message`: Human-readable summary
/// - `confidence`: Score of the winning detection (0.0-1.0)
/// - `detected_label`: Phrase that won, "none" or "error"
///
/// # Errors
/// - 400 Bad Request: Missing `file` field or non-image content type
/// - 503 Service Unavailable: Detection model not loaded
/// - 500 Internal Server Error: Image could not be decoded
pub async fn detect_status_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Classification>, ApiError> {
    // 1. Read and validate the upload
    let upload = read_upload(multipart).await.map_err(|e| {
        warn!("Rejected upload: {}", e);
        e
    })?;
    upload.validate().map_err(|e| {
        warn!(
            "Rejected upload {:?} with content type {:?}",
            upload.file_name, upload.content_type
        );
        e
    })?;

    // 2. Get detector from state
    let detector = state.get_detector().await.ok_or_else(|| {
        warn!("Detection model not loaded");
        ApiError::ServiceUnavailable("Model not loaded".to_string())
    })?;

    // 3. Decode image
    let (image, image_info) = decode_image_bytes(&upload.data).map_err(|e| {
        error!("API Error: {}", e);
        ApiError::InternalError(e.to_string())
    })?;

    debug!(
        "Decoded image: {}x{}, {:?}, {} bytes",
        image_info.width, image_info.height, image_info.format, image_info.size_bytes
    );

    // 4. Run inference off the async runtime
    let classification = tokio::task::spawn_blocking(move || detector.classify(&image))
        .await
        .map_err(|e| {
            error!("Classification task failed: {}", e);
            ApiError::InternalError(format!("Classification task failed: {}", e))
        })?;

    info!(
        "Shop status: {} ({:.4}, {})",
        classification.status, classification.confidence, classification.detected_label
    );

    Ok(Json(classification))
}
