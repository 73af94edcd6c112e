// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OWL-ViT zero-shot detection model (ONNX Runtime)

use anyhow::{Context, Result};
use image::DynamicImage;
use ndarray::Ix3;
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider, ExecutionProvider};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use super::postprocessing::decode_detections;
use super::preprocessing::{encode_queries, preprocess_image};
use crate::detector::{Detection, InferenceProvider};

/// Graph input carrying the tokenized queries
pub const INPUT_IDS: &str = "input_ids";
/// Graph input carrying the normalized image
pub const PIXEL_VALUES: &str = "pixel_values";
/// Graph input carrying the query padding mask
pub const ATTENTION_MASK: &str = "attention_mask";
/// Graph output with per-patch, per-query logits
pub const LOGITS: &str = "logits";
/// Graph output with per-patch boxes
pub const PRED_BOXES: &str = "pred_boxes";

/// Runtime options for the OWL-ViT session
#[derive(Debug, Clone)]
pub struct OwlVitOptions {
    /// Detections must score strictly above this value
    pub threshold: f32,
    /// Intra-op thread count for ONNX Runtime
    pub intra_threads: usize,
    /// Try the CUDA execution provider before falling back to CPU
    pub use_cuda: bool,
}

impl Default for OwlVitOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            intra_threads: 4,
            use_cuda: true,
        }
    }
}

/// OWL-ViT open-vocabulary detector
///
/// # Thread Safety
/// The session sits behind a `Mutex` because ONNX Runtime needs exclusive
/// access to run; the tokenizer is shared read-only.
#[derive(Clone)]
pub struct OwlVitModel {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    model_name: String,
    device: &'static str,
    threshold: f32,
}

impl std::fmt::Debug for OwlVitModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwlVitModel")
            .field("model_name", &self.model_name)
            .field("device", &self.device)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

fn build_session(model_path: &Path, options: &OwlVitOptions, cuda: bool) -> Result<Session> {
    let builder = Session::builder().context("Failed to create session builder")?;
    let builder = if cuda {
        builder
            .with_execution_providers([CUDAExecutionProvider::default().build()])
            .context("Failed to set CUDA execution provider")?
    } else {
        builder
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
    };

    builder
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(options.intra_threads)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path)
        .context(format!("Failed to load OWL-ViT model from {}", model_path.display()))
}

impl OwlVitModel {
    /// Load the detector from an ONNX export and its tokenizer
    ///
    /// # Errors
    /// Returns error if:
    /// - Model or tokenizer file not found
    /// - ONNX Runtime initialization fails
    /// - The graph lacks the expected inputs/outputs
    pub async fn new<P: AsRef<Path>>(
        model_name: impl Into<String>,
        model_path: P,
        tokenizer_path: P,
        options: OwlVitOptions,
    ) -> Result<Self> {
        let model_name = model_name.into();
        let model_path = model_path.as_ref();
        let tokenizer_path = tokenizer_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", model_path.display());
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }

        info!("Loading OWL-ViT model '{}' from {}", model_name, model_path.display());

        let cuda_available = options.use_cuda
            && CUDAExecutionProvider::default()
                .is_available()
                .unwrap_or(false);
        if options.use_cuda && !cuda_available {
            info!("CUDA execution provider not available, using CPU");
        }

        let (session, device) = if cuda_available {
            match build_session(model_path, &options, true) {
                Ok(s) => {
                    info!("✅ CUDA execution provider initialized");
                    (s, "cuda")
                }
                Err(e) => {
                    warn!("⚠️  CUDA execution provider failed: {:#}", e);
                    warn!("   Falling back to CPU execution provider");
                    (build_session(model_path, &options, false)?, "cpu")
                }
            }
        } else {
            (build_session(model_path, &options, false)?, "cpu")
        };

        for name in [INPUT_IDS, PIXEL_VALUES, ATTENTION_MASK] {
            if !session.inputs.iter().any(|input| input.name == name) {
                anyhow::bail!("Model is missing required input '{}'", name);
            }
        }
        for name in [LOGITS, PRED_BOXES] {
            if !session.outputs.iter().any(|output| output.name == name) {
                anyhow::bail!("Model is missing required output '{}'", name);
            }
        }
        debug!(
            "OWL-ViT inputs: {:?}",
            session.inputs.iter().map(|i| &i.name).collect::<Vec<_>>()
        );

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        info!("✅ OWL-ViT model loaded on {}", device);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_name,
            device,
            threshold: options.threshold.clamp(0.0, 1.0),
        })
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Run the detection graph for one image and a set of text queries
    pub fn run(&self, image: &DynamicImage, phrases: &[String]) -> Result<Vec<Detection>> {
        let start = Instant::now();

        let (input_ids, attention_mask) = encode_queries(&self.tokenizer, phrases)?;
        let pixel_values = preprocess_image(image);

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("OWL-ViT session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![
                INPUT_IDS => Value::from_array(input_ids)?,
                PIXEL_VALUES => Value::from_array(pixel_values)?,
                ATTENTION_MASK => Value::from_array(attention_mask)?
            ])
            .context("OWL-ViT inference failed")?;

        let logits = outputs[LOGITS]
            .try_extract_array::<f32>()
            .context("Failed to extract logits tensor")?
            .into_dimensionality::<Ix3>()
            .context("Unexpected logits rank")?;
        let pred_boxes = outputs[PRED_BOXES]
            .try_extract_array::<f32>()
            .context("Failed to extract pred_boxes tensor")?
            .into_dimensionality::<Ix3>()
            .context("Unexpected pred_boxes rank")?;

        if logits.dim().2 != phrases.len() {
            anyhow::bail!(
                "Model returned logits for {} queries, expected {}",
                logits.dim().2,
                phrases.len()
            );
        }

        let detections = decode_detections(
            logits,
            pred_boxes,
            (image.width(), image.height()),
            self.threshold,
        )?;

        debug!(
            "OWL-ViT produced {} detections in {}ms",
            detections.len(),
            start.elapsed().as_millis()
        );

        Ok(detections)
    }
}

impl InferenceProvider for OwlVitModel {
    fn detect(&self, image: &DynamicImage, phrases: &[String]) -> Result<Vec<Detection>> {
        self.run(image, phrases)
    }

    fn device(&self) -> &str {
        self.device
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
