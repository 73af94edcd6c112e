// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decision policy: best-scoring phrase to open/closed status
//!
//! The phrase list is fixed, so the keyword rule is evaluated once per phrase
//! when the policy is built. Deciding a request is then a max-selection plus
//! a table lookup.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use super::provider::Detection;

/// Substrings that mark a phrase as describing a closed storefront
pub const CLOSED_KEYWORDS: &[&str] = &["closed", "shutter", "down", "pulled down"];

/// Substrings that mark a phrase as describing an open storefront
pub const OPEN_KEYWORDS: &[&str] = &["open", "entrance", "visible", "door"];

/// Confidence reported when the model produced no detections
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Lowest confidence reported for a real detection
pub const MIN_CONFIDENCE: f64 = 0.01;

/// `detected_label` when there were no detections
pub const NO_LABEL: &str = "none";

/// `detected_label` when classification failed
pub const ERROR_LABEL: &str = "error";

/// Storefront state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShopStatus {
    Open,
    Closed,
    Unknown,
}

impl ShopStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShopStatus::Open => "open",
            ShopStatus::Closed => "closed",
            ShopStatus::Unknown => "unknown",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ShopStatus::Open => "Shop is Open",
            ShopStatus::Closed => "Shop is Closed",
            ShopStatus::Unknown => "Shop status is unknown",
        }
    }
}

impl std::fmt::Display for ShopStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification returned to API clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub status: ShopStatus,
    /// Human-readable summary
    pub message: String,
    /// Confidence score (0.0-1.0), four decimal places
    pub confidence: f64,
    /// Phrase that drove the decision, or "none" / "error"
    pub detected_label: String,
}

impl Classification {
    /// Result used when the model reported nothing at all
    pub fn no_indicator() -> Self {
        Self {
            status: ShopStatus::Open,
            message: "Shop is Open (default - no strong indicators)".to_string(),
            confidence: DEFAULT_CONFIDENCE,
            detected_label: NO_LABEL.to_string(),
        }
    }

    /// Result used when classification failed
    pub fn failure(reason: impl std::fmt::Display) -> Self {
        Self {
            status: ShopStatus::Unknown,
            message: format!("Error: {}", reason),
            confidence: 0.0,
            detected_label: ERROR_LABEL.to_string(),
        }
    }
}

/// Malformed provider output
#[derive(Debug, Error, PartialEq)]
pub enum ClassificationError {
    #[error("label index {index} out of range for {count} phrases")]
    LabelOutOfRange { index: usize, count: usize },

    #[error("detection score {0} is not a probability")]
    InvalidScore(f32),
}

/// Keyword rule for a single phrase.
///
/// Closed only when a closed keyword matches and no open keyword does, so any
/// ambiguous phrase resolves to open.
pub fn status_for_phrase(phrase: &str) -> ShopStatus {
    let lower = phrase.to_lowercase();
    let has_closed = CLOSED_KEYWORDS.iter().any(|kw| lower.contains(kw));
    let has_open = OPEN_KEYWORDS.iter().any(|kw| lower.contains(kw));

    if has_closed && !has_open {
        ShopStatus::Closed
    } else {
        ShopStatus::Open
    }
}

/// Floor a raw score at [`MIN_CONFIDENCE`] and round to four decimals
pub fn round_confidence(score: f32) -> f64 {
    let floored = f64::from(score).max(MIN_CONFIDENCE);
    (floored * 10_000.0).round() / 10_000.0
}

/// First detection holding the maximum score
fn best_detection(detections: &[Detection]) -> Option<&Detection> {
    let mut iter = detections.iter();
    let mut best = iter.next()?;
    for detection in iter {
        if detection.score > best.score {
            best = detection;
        }
    }
    Some(best)
}

/// A phrase and the status the keyword rule assigns it
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseEntry {
    pub phrase: String,
    pub status: ShopStatus,
}

/// Maps provider detections to a [`Classification`]
#[derive(Debug, Clone)]
pub struct DecisionPolicy {
    phrases: Vec<String>,
    table: Vec<PhraseEntry>,
}

impl DecisionPolicy {
    /// Build the policy and its phrase -> status table
    pub fn new<S: AsRef<str>>(phrases: &[S]) -> Self {
        let table: Vec<PhraseEntry> = phrases
            .iter()
            .map(|p| PhraseEntry {
                phrase: p.as_ref().to_string(),
                status: status_for_phrase(p.as_ref()),
            })
            .collect();

        for entry in &table {
            debug!("phrase table: {:?} -> {}", entry.phrase, entry.status);
        }

        Self {
            phrases: table.iter().map(|e| e.phrase.clone()).collect(),
            table,
        }
    }

    /// Phrases in label-index order
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// The precomputed phrase -> status table
    pub fn table(&self) -> &[PhraseEntry] {
        &self.table
    }

    /// Decide the storefront status for one image's detections.
    ///
    /// Never fails: malformed detections yield an `unknown` result.
    pub fn decide(&self, detections: &[Detection]) -> Classification {
        match self.try_decide(detections) {
            Ok(classification) => classification,
            Err(e) => {
                error!("Classification error: {}", e);
                Classification::failure(&e)
            }
        }
    }

    /// Like [`decide`](Self::decide) but surfaces malformed input as an error
    pub fn try_decide(&self, detections: &[Detection]) -> Result<Classification, ClassificationError> {
        let Some(best) = best_detection(detections) else {
            return Ok(Classification::no_indicator());
        };

        if !(0.0..=1.0).contains(&best.score) {
            return Err(ClassificationError::InvalidScore(best.score));
        }

        let entry = self
            .table
            .get(best.label)
            .ok_or(ClassificationError::LabelOutOfRange {
                index: best.label,
                count: self.table.len(),
            })?;

        debug!(
            "best of {} detections: {:.4} for {:?}",
            detections.len(),
            best.score,
            entry.phrase
        );

        Ok(Classification {
            status: entry.status,
            message: entry.status.message().to_string(),
            confidence: round_confidence(best.score),
            detected_label: entry.phrase.clone(),
        })
    }
}
