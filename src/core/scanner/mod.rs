//! # Scanner Module
//!
//! Enumerates candidate image files under the configured root folders.
//!
//! Scanning is extension-driven only: no image bytes are inspected
//! locally, all recognition is delegated to the detection providers.

mod filter;
mod walker;

pub use filter::ExtensionFilter;
pub use walker::{ScanOptions, WalkDirScanner};

use crate::error::ScanError;
use crate::events::EventSender;
use std::path::PathBuf;
use std::time::SystemTime;

/// A discovered candidate image file
#[derive(Debug, Clone)]
pub struct FoundImage {
    /// Path to the file
    pub path: PathBuf,
    /// File size in bytes, when stat succeeded
    pub size: Option<u64>,
    /// Last modified time, when stat succeeded
    pub modified: Option<SystemTime>,
}

/// Result of enumerating the configured folders
#[derive(Debug)]
pub struct ScanResult {
    /// Candidate files in discovery order
    pub images: Vec<FoundImage>,
    /// Non-fatal errors hit along the way
    pub errors: Vec<ScanError>,
}

/// Trait for folder scanners
///
/// Implement this to supply files from another source (e.g. tests).
pub trait FolderScanner: Send + Sync {
    /// Enumerate candidate files under the given roots
    fn scan(&self, folders: &[PathBuf]) -> ScanResult;

    /// Enumerate with progress reporting via events
    fn scan_with_events(&self, folders: &[PathBuf], events: &EventSender) -> ScanResult;
}
