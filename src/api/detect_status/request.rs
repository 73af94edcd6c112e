// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart upload extraction for the detect-status endpoint

use axum::body::Bytes;
use axum_extra::extract::Multipart;

use crate::api::errors::ApiError;
use crate::vision::is_image_content_type;

/// Name of the multipart field carrying the image
pub const UPLOAD_FIELD: &str = "file";

pub const INVALID_FILE_TYPE: &str = "Invalid file type. Please upload an image.";

/// An uploaded storefront image, not yet decoded
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl ImageUpload {
    /// Reject uploads whose declared type is not `image/*`
    pub fn validate(&self) -> Result<(), ApiError> {
        if !is_image_content_type(self.content_type.as_deref()) {
            return Err(ApiError::InvalidRequest(INVALID_FILE_TYPE.to_string()));
        }
        Ok(())
    }
}

/// Pull the `file` field out of a multipart body, skipping any other fields
pub async fn read_upload(mut multipart: Multipart) -> Result<ImageUpload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to read upload: {}", e)))?;

        return Ok(ImageUpload {
            file_name,
            content_type,
            data,
        });
    }

    Err(ApiError::InvalidRequest(format!(
        "Missing multipart field '{}'",
        UPLOAD_FIELD
    )))
}
