//! # Error Module
//!
//! Error types for the image tagging pipeline.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, providers, what went wrong
//! - **Isolate boundaries** - per-file and per-provider failures are
//!   recorded on the result, only configuration errors abort a run

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error.
///
/// Detection failures never appear here: they are recorded per file on
/// the image result, in the persisted output format.
#[derive(Error, Debug)]
pub enum ImgtagError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Action error: {0}")]
    Action(#[from] ActionError),

    #[error("Result store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors found while validating or loading the configuration.
///
/// These are the only errors that abort a run before it starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No folders to scan were given")]
    NoFolders,

    #[error("Invalid value for {field}: {value} (must be >= 1)")]
    InvalidLimit { field: &'static str, value: i64 },

    #[error("The {action} action requires a non-empty filter")]
    ActionWithoutFilter { action: &'static str },

    #[error("Failed to read config file {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },
}

/// Errors that occur while enumerating image files
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Folder not found: {path}")]
    FolderNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    ReadEntry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors returned by a detection provider for a single file.
///
/// Distinguishable from "zero tags found": an empty tag map is a
/// successful detection.
#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Failed to read image {path}: {source}")]
    ReadImage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Transport error calling {provider}: {reason}")]
    Transport { provider: String, reason: String },

    #[error("{provider} rejected the request: {reason}")]
    Api { provider: String, reason: String },

    #[error("Failed to parse {provider} response: {reason}")]
    Parse { provider: String, reason: String },
}

/// Errors that occur while moving or deleting selected images
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Failed to create target folder {path}: {source}")]
    CreateFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {path}: {reason}")]
    MoveFailed { path: PathBuf, reason: String },

    #[error("Failed to delete {path}: {source}")]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from reading or writing the persisted results file
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to write results to {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("Failed to read results from {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, ImgtagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::FolderNotFound {
            path: PathBuf::from("/photos/vacation"),
        };
        assert!(error.to_string().contains("/photos/vacation"));
    }

    #[test]
    fn detect_error_includes_provider() {
        let error = DetectError::Api {
            provider: "google-vision".to_string(),
            reason: "quota exceeded".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("google-vision"));
        assert!(message.contains("quota exceeded"));
    }

    #[test]
    fn config_error_names_action() {
        let error = ConfigError::ActionWithoutFilter { action: "delete" };
        assert!(error.to_string().contains("delete"));
    }
}
