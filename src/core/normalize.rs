//! Tag name and score normalization.
//!
//! Every provider reports tags in its own shape: free-form label strings,
//! numeric confidences, or categorical likelihood enums. This module
//! converts all of them into canonical `(tag, score)` pairs.

use serde::Deserialize;

/// Scores below this are dropped rather than recorded as tags.
const MIN_SCORE: f64 = 0.001;

/// Normalize a raw tag name: lowercase, trim, spaces to hyphens.
///
/// Total and idempotent.
pub fn normalize_tag(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "-")
}

/// Round a confidence score to 3 decimals.
///
/// Returns `None` for negligible scores, meaning the tag should not be
/// emitted at all.
pub fn normalize_score(raw: f64) -> Option<f64> {
    if raw < MIN_SCORE {
        return None;
    }
    Some((raw * 1000.0).round() / 1000.0)
}

/// Likelihood ordinals used by safe-search style detections.
///
/// The numeric ladder is a tuning constant, not an external contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Likelihood {
    VeryUnlikely,
    Unlikely,
    Possible,
    Likely,
    VeryLikely,
    #[serde(other)]
    Unknown,
}

impl Likelihood {
    /// Map the ordinal to a numeric confidence score.
    pub fn score(self) -> f64 {
        match self {
            Likelihood::VeryUnlikely => 0.0,
            Likelihood::Unlikely => 0.21,
            Likelihood::Possible => 0.51,
            Likelihood::Likely => 0.71,
            Likelihood::VeryLikely => 0.91,
            Likelihood::Unknown => 0.0,
        }
    }
}
