// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod detect_status;
pub mod errors;
pub mod health;
pub mod http_server;

pub use detect_status::{detect_status_handler, ImageUpload};
pub use errors::{ApiError, ErrorResponse};
pub use health::{health_handler, HealthResponse};
pub use http_server::{build_router, start_server, AppState, MAX_UPLOAD_BYTES};
