//! # Store Module
//!
//! Persists the accumulated image results as JSON.
//!
//! The saved file is both the deliverable of a normal run and the
//! input of a dry run. Store failures are logged and non-fatal: the
//! run still reports its in-memory results.

use crate::core::normalize::normalize_score;
use crate::core::ImageResult;
use crate::error::StoreError;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Serialize results to `path`, overwriting any previous file.
///
/// Tag scores are re-expressed through the normalizer at save time so
/// the persisted file always carries 3-decimal scores with negligible
/// tags dropped.
pub fn save(results: &[ImageResult], path: &Path) -> Result<(), StoreError> {
    let normalized: Vec<ImageResult> = results
        .iter()
        .map(|result| {
            let mut result = result.clone();
            result.tags = result
                .tags
                .iter()
                .filter_map(|(tag, score)| {
                    normalize_score(*score).map(|s| (tag.clone(), s))
                })
                .collect();
            result
        })
        .collect();

    let json = serde_json::to_string_pretty(&normalized).map_err(|e| StoreError::WriteFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    fs::write(path, json).map_err(|e| StoreError::WriteFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    info!(path = %path.display(), count = results.len(), "Saved results");
    Ok(())
}

/// Load previously saved results.
///
/// Any read or parse failure yields an empty list with a warning, so a
/// dry run over a bad file degrades to a no-op instead of aborting.
pub fn load(path: &Path) -> Vec<ImageResult> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read results file");
            return Vec::new();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(results) => results,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not parse results file");
            Vec::new()
        }
    }
}
