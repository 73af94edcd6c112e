// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration
//!
//! Loaded from an optional TOML file with `[server]` and `[model]` sections.
//! Every field has a default, so an empty file (or no file) is valid.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::vision::OwlVitOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding index.html and static assets
    pub public_dir: String,
    /// Allowed CORS origins; "*" allows any
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            public_dir: "public".to_string(),
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Detection model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Local directory with the ONNX export; downloaded from `hf_repo` if unset or incomplete
    pub model_dir: Option<String>,
    /// HuggingFace Hub repository holding the ONNX export
    pub hf_repo: String,
    /// ONNX graph path, relative to the model directory or repository
    pub onnx_file: String,
    /// Tokenizer path, relative to the model directory or repository
    pub tokenizer_file: String,
    /// HuggingFace cache directory override
    pub cache_dir: Option<String>,
    /// Minimum detection score (exclusive)
    pub threshold: f32,
    pub intra_threads: usize,
    pub use_cuda: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let defaults = OwlVitOptions::default();
        Self {
            model_dir: None,
            hf_repo: "Xenova/owlvit-base-patch32".to_string(),
            onnx_file: "onnx/model.onnx".to_string(),
            tokenizer_file: "tokenizer.json".to_string(),
            cache_dir: None,
            threshold: defaults.threshold,
            intra_threads: defaults.intra_threads,
            use_cuda: defaults.use_cuda,
        }
    }
}

impl ModelConfig {
    pub fn owlvit_options(&self) -> OwlVitOptions {
        OwlVitOptions {
            threshold: self.threshold,
            intra_threads: self.intra_threads,
            use_cuda: self.use_cuda,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.model.threshold) {
            return Err(ConfigError::Invalid(format!(
                "model.threshold must be within [0, 1], got {}",
                self.model.threshold
            )));
        }
        if self.model.intra_threads == 0 {
            return Err(ConfigError::Invalid(
                "model.intra_threads must be at least 1".to_string(),
            ));
        }
        if self.model.hf_repo.trim().is_empty() && self.model.model_dir.is_none() {
            return Err(ConfigError::Invalid(
                "either model.model_dir or model.hf_repo must be set".to_string(),
            ));
        }
        Ok(())
    }
}
