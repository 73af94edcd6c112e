// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::config::AppConfig;

/// Shop Status Detector HTTP service
///
/// Flags override values from the config file.
#[derive(Parser, Debug, Default)]
#[command(name = "shop-status-detector")]
#[command(version)]
#[command(about = "Detect whether a shop is open or closed from a storefront photo", long_about = None)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, short, env = "DETECTOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "DETECTOR_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Local directory containing the ONNX export and tokenizer
    #[arg(long, env = "MODEL_DIR")]
    pub model_dir: Option<String>,

    /// HuggingFace Hub repository to fetch the model from
    #[arg(long, env = "HF_MODEL_REPO")]
    pub hf_repo: Option<String>,

    /// Minimum detection score (exclusive)
    #[arg(long, env = "DETECTION_THRESHOLD")]
    pub threshold: Option<f32>,

    /// Directory served at / and /static
    #[arg(long, env = "PUBLIC_DIR")]
    pub public_dir: Option<String>,

    /// Try CUDA before falling back to CPU
    #[arg(long, env = "USE_CUDA")]
    pub cuda: Option<bool>,
}

impl Cli {
    /// Build the effective configuration: defaults, then file, then flags
    pub fn load_config(&self) -> Result<AppConfig> {
        let mut config = match self.config {
            Some(ref path) => AppConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => AppConfig::default(),
        };

        if let Some(ref host) = self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(ref public_dir) = self.public_dir {
            config.server.public_dir = public_dir.clone();
        }
        if let Some(ref model_dir) = self.model_dir {
            config.model.model_dir = Some(model_dir.clone());
        }
        if let Some(ref hf_repo) = self.hf_repo {
            config.model.hf_repo = hf_repo.clone();
        }
        if let Some(threshold) = self.threshold {
            config.model.threshold = threshold;
        }
        if let Some(cuda) = self.cuda {
            config.model.use_cuda = cuda;
        }

        config.validate()?;
        Ok(config)
    }
}
