// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Locating and loading the OWL-ViT model files
//!
//! A configured local directory wins when it holds both files. Otherwise the
//! export is fetched from the HuggingFace Hub and served from its cache.

use anyhow::{Context, Result};
use hf_hub::api::tokio::ApiBuilder;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::owlvit::OwlVitModel;
use crate::config::ModelConfig;

/// Where a model's files came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSource {
    LocalDir,
    HuggingFaceHub,
}

/// Paths to the ONNX graph and tokenizer of one model
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
    pub source: ModelSource,
}

impl ModelFiles {
    /// Expected file locations inside a local model directory
    pub fn in_dir(dir: impl AsRef<Path>, config: &ModelConfig) -> Self {
        let dir = dir.as_ref();
        Self {
            model_path: dir.join(&config.onnx_file),
            tokenizer_path: dir.join(&config.tokenizer_file),
            source: ModelSource::LocalDir,
        }
    }

    pub fn exist(&self) -> bool {
        self.model_path.is_file() && self.tokenizer_path.is_file()
    }
}

/// Find the model files, downloading them if no usable local copy exists
pub async fn resolve_model_files(config: &ModelConfig) -> Result<ModelFiles> {
    if let Some(ref dir) = config.model_dir {
        let files = ModelFiles::in_dir(dir, config);
        if files.exist() {
            info!("Using local model files from {}", dir);
            return Ok(files);
        }
        warn!(
            "⚠️ Model directory {} is missing {} or {}, falling back to {}",
            dir, config.onnx_file, config.tokenizer_file, config.hf_repo
        );
    }

    let mut builder = ApiBuilder::new().with_progress(false);
    if let Some(ref cache_dir) = config.cache_dir {
        builder = builder.with_cache_dir(PathBuf::from(cache_dir));
    }
    let api = builder.build().context("Failed to create HuggingFace Hub client")?;
    let repo = api.model(config.hf_repo.clone());

    info!("Fetching {} from {}", config.onnx_file, config.hf_repo);
    let model_path = repo
        .get(&config.onnx_file)
        .await
        .with_context(|| format!("Failed to fetch {} from {}", config.onnx_file, config.hf_repo))?;

    let tokenizer_path = repo
        .get(&config.tokenizer_file)
        .await
        .with_context(|| format!("Failed to fetch {} from {}", config.tokenizer_file, config.hf_repo))?;

    Ok(ModelFiles {
        model_path,
        tokenizer_path,
        source: ModelSource::HuggingFaceHub,
    })
}

/// Resolve and load the configured OWL-ViT model
pub async fn load_owlvit(config: &ModelConfig) -> Result<OwlVitModel> {
    let files = resolve_model_files(config).await?;
    OwlVitModel::new(
        config.hf_repo.clone(),
        &files.model_path,
        &files.tokenizer_path,
        config.owlvit_options(),
    )
    .await
}
