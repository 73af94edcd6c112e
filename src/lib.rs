// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod detector;
pub mod version;
pub mod vision;

pub use api::{build_router, start_server, ApiError, AppState};
pub use config::{AppConfig, ConfigError, ModelConfig, ServerConfig};
pub use detector::{
    Classification, DecisionPolicy, Detection, InferenceProvider, ShopStatus, ShopStatusDetector,
    STOREFRONT_PHRASES,
};
pub use vision::{load_owlvit, OwlVitModel, OwlVitOptions};
