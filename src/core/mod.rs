//! # Core Module
//!
//! The scan-and-classify engine: folder scanning, provider detection,
//! categorization, filtering and result persistence.

pub mod actions;
pub mod categorizer;
pub mod config;
pub mod detector;
pub mod filter;
pub mod metadata;
pub mod normalize;
pub mod pipeline;
pub mod scanner;
pub mod store;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Normalized tag name mapped to a confidence score in `[0, 1]`.
pub type TagMap = BTreeMap<String, f64>;

/// Auxiliary, provider-independent details for a scanned image.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImageDetails {
    /// File size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Modification or EXIF capture date, ISO-8601
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Camera make from EXIF (e.g. "Apple")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_make: Option<String>,
    /// Camera model from EXIF (e.g. "iPhone 15 Pro")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_model: Option<String>,
}

impl ImageDetails {
    /// Check if anything was extracted
    pub fn has_data(&self) -> bool {
        self.size.is_some()
            || self.date.is_some()
            || self.camera_make.is_some()
            || self.camera_model.is_some()
    }
}

/// One scanned image with its merged tags.
///
/// Created empty at the start of a file's processing, filled by each
/// detector and the categorizer, then appended to the run's results and
/// never mutated again.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageResult {
    /// Path to the image file
    pub file: PathBuf,
    /// Normalized tag names with confidence scores
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: TagMap,
    /// Auxiliary file details (size, dates, camera)
    #[serde(default, skip_serializing_if = "details_is_empty")]
    pub details: ImageDetails,
    /// Provider failures recorded for this file, if any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error: Vec<String>,
}

fn details_is_empty(details: &ImageDetails) -> bool {
    !details.has_data()
}

impl ImageResult {
    /// Create an empty result for a file about to be scanned
    pub fn new(file: PathBuf) -> Self {
        Self {
            file,
            tags: TagMap::new(),
            details: ImageDetails::default(),
            error: Vec::new(),
        }
    }

    /// Merge tags from one detector, last writer wins on duplicate keys
    pub fn merge_tags(&mut self, tags: TagMap) {
        self.tags.extend(tags);
    }

    /// Score for a tag, with missing treated as 0
    pub fn tag_score(&self, tag: &str) -> f64 {
        self.tags.get(tag).copied().unwrap_or(0.0)
    }
}
