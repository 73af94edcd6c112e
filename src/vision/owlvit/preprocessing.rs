// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image and text preprocessing for OWL-ViT

use anyhow::{Context, Result};
use image::DynamicImage;
use ndarray::{Array2, Array4};
use tokenizers::Tokenizer;

/// Square input resolution of owlvit-base-patch32
pub const OWLVIT_INPUT_SIZE: u32 = 768;

/// Fixed text query length (CLIP context used by the OWL-ViT processor)
pub const MAX_QUERY_TOKENS: usize = 16;

/// Token id used for padding query sequences
pub const PAD_TOKEN_ID: i64 = 0;

/// Mean values for normalization (CLIP)
pub const MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];

/// Std values for normalization (CLIP)
pub const STD: [f32; 3] = [0.268_629_54, 0.261_302_58, 0.275_777_11];

/// Preprocess an image for OWL-ViT
///
/// Steps:
/// 1. Resize (bicubic) to OWLVIT_INPUT_SIZE x OWLVIT_INPUT_SIZE, ignoring aspect
///    ratio so predicted boxes stay normalized to the original frame
/// 2. Convert to RGB
/// 3. Normalize with CLIP mean/std: (pixel/255 - mean) / std
/// 4. Convert to NCHW tensor format [1, 3, H, W]
pub fn preprocess_image(image: &DynamicImage) -> Array4<f32> {
    let size = OWLVIT_INPUT_SIZE as usize;
    let resized = image.resize_exact(
        OWLVIT_INPUT_SIZE,
        OWLVIT_INPUT_SIZE,
        image::imageops::FilterType::CatmullRom,
    );
    let rgb = resized.to_rgb8();

    let mut tensor = Array4::zeros((1, 3, size, size));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] =
                (pixel[c] as f32 / 255.0 - MEAN[c]) / STD[c];
        }
    }

    tensor
}

/// Pad or truncate a token sequence to `max_len`
///
/// Returns `(input_ids, attention_mask)`.
pub fn pad_tokens(ids: &[u32], max_len: usize) -> (Vec<i64>, Vec<i64>) {
    let kept = ids.len().min(max_len);
    let mut input_ids: Vec<i64> = ids[..kept].iter().map(|&id| id as i64).collect();
    let mut attention_mask = vec![1i64; kept];

    input_ids.resize(max_len, PAD_TOKEN_ID);
    attention_mask.resize(max_len, 0);

    (input_ids, attention_mask)
}

/// Tokenize text queries into `[num_queries, MAX_QUERY_TOKENS]` tensors
///
/// Returns `(input_ids, attention_mask)`.
pub fn encode_queries(tokenizer: &Tokenizer, phrases: &[String]) -> Result<(Array2<i64>, Array2<i64>)> {
    if phrases.is_empty() {
        anyhow::bail!("At least one text query is required");
    }

    let mut ids = Vec::with_capacity(phrases.len() * MAX_QUERY_TOKENS);
    let mut mask = Vec::with_capacity(phrases.len() * MAX_QUERY_TOKENS);

    for phrase in phrases {
        let encoding = tokenizer
            .encode(phrase.as_str(), true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed for {:?}: {}", phrase, e))?;

        if encoding.get_ids().len() > MAX_QUERY_TOKENS {
            tracing::warn!(
                "Query {:?} has {} tokens, truncating to {}",
                phrase,
                encoding.get_ids().len(),
                MAX_QUERY_TOKENS
            );
        }

        let (phrase_ids, phrase_mask) = pad_tokens(encoding.get_ids(), MAX_QUERY_TOKENS);
        ids.extend(phrase_ids);
        mask.extend(phrase_mask);
    }

    let input_ids = Array2::from_shape_vec((phrases.len(), MAX_QUERY_TOKENS), ids)
        .context("Failed to create input_ids array")?;
    let attention_mask = Array2::from_shape_vec((phrases.len(), MAX_QUERY_TOKENS), mask)
        .context("Failed to create attention_mask array")?;

    Ok((input_ids, attention_mask))
}
