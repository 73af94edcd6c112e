// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use shop_status_detector::{
    api::{start_server, AppState},
    cli::Cli,
    detector::{InferenceProvider, ShopStatusDetector},
    version,
    vision::load_owlvit,
};
use std::{env, sync::Arc};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = cli.load_config()?;

    info!("{}", version::get_version_string());
    info!("Starting up: Loading model...");

    let model = load_owlvit(&config.model)
        .await
        .context("Failed to load detection model")?;
    info!("Model {} ready on {}", model.model_name(), model.device());

    let detector = ShopStatusDetector::new(Arc::new(model));
    let state = AppState::new();
    state.set_detector(Arc::new(detector)).await;

    start_server(&config.server, state).await?;

    info!("Shutting down");
    Ok(())
}
