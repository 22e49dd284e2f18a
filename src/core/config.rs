//! Resolved run configuration.
//!
//! The CLI (or an embedding application) resolves arguments, environment
//! and the optional `imgtag.options.json` file into a single immutable
//! [`Config`] before the pipeline receives control. No component mutates
//! it afterwards.

use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default allowed file extensions
pub const DEFAULT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "raw", "webp"];

/// Default per-provider API call limit
pub const DEFAULT_LIMIT: usize = 1000;

/// Default number of files scanned in parallel
pub const DEFAULT_PARALLEL: usize = 5;

/// Default results file name
pub const DEFAULT_OUTPUT: &str = "imgtag.results.json";

/// Which detection features are enabled for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Features {
    pub objects: bool,
    pub labels: bool,
    pub landmarks: bool,
    pub logos: bool,
    pub unsafe_content: bool,
}

impl Features {
    /// Everything on, the `--all` shortcut
    pub fn all() -> Self {
        Self {
            objects: true,
            labels: true,
            landmarks: true,
            logos: true,
            unsafe_content: true,
        }
    }

    pub fn any(&self) -> bool {
        self.objects || self.labels || self.landmarks || self.logos || self.unsafe_content
    }
}

/// Provider credentials. Presence of a key enables that provider.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Google Vision API key
    pub google_key: Option<String>,
    /// Clarifai API key
    pub clarifai_key: Option<String>,
    /// Sightengine API user
    pub sightengine_user: Option<String>,
    /// Sightengine API secret
    pub sightengine_secret: Option<String>,
}

/// Fully resolved, immutable program options
#[derive(Debug, Clone)]
pub struct Config {
    /// Folders to be scanned
    pub folders: Vec<PathBuf>,
    /// Allowed file extensions, lowercase without the leading dot
    pub extensions: Vec<String>,
    /// Also scan subfolders
    pub recursive: bool,
    /// Per-provider API call limit for the run
    pub limit: usize,
    /// How many files are processed in parallel
    pub parallel: usize,
    /// Enabled detection features
    pub features: Features,
    /// Provider credentials
    pub credentials: Credentials,
    /// Path of the results JSON file
    pub output: PathBuf,
    /// Replay a previously saved results file instead of scanning
    pub dry_run: bool,
    /// Filter expression selecting images for move/delete
    pub filter: Option<String>,
    /// Move selected images under this folder
    pub move_to: Option<PathBuf>,
    /// Delete selected images
    pub delete: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            folders: Vec::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            recursive: false,
            limit: DEFAULT_LIMIT,
            parallel: DEFAULT_PARALLEL,
            features: Features::default(),
            credentials: Credentials::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            dry_run: false,
            filter: None,
            move_to: None,
            delete: false,
        }
    }
}

impl Config {
    /// Validate the configuration before a run starts.
    ///
    /// This is the only place where errors abort the run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limit < 1 {
            return Err(ConfigError::InvalidLimit {
                field: "limit",
                value: self.limit as i64,
            });
        }
        if self.parallel < 1 {
            return Err(ConfigError::InvalidLimit {
                field: "parallel",
                value: self.parallel as i64,
            });
        }

        let filter_empty = self
            .filter
            .as_deref()
            .map(|f| f.trim().is_empty())
            .unwrap_or(true);
        if self.move_to.is_some() && filter_empty {
            return Err(ConfigError::ActionWithoutFilter { action: "move" });
        }
        if self.delete && filter_empty {
            return Err(ConfigError::ActionWithoutFilter { action: "delete" });
        }

        if !self.dry_run && self.folders.is_empty() {
            return Err(ConfigError::NoFolders);
        }

        Ok(())
    }

    /// Normalize the extension list: lowercase, strip dots, dedupe
    pub fn normalized_extensions(&self) -> Vec<String> {
        let mut extensions: Vec<String> = self
            .extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();
        extensions.sort();
        extensions.dedup();
        extensions
    }
}

/// Subset of options accepted from an `imgtag.options.json` file.
///
/// All fields optional so a partial file can override just a few defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileOptions {
    pub folders: Option<Vec<PathBuf>>,
    pub extensions: Option<Vec<String>>,
    pub recursive: Option<bool>,
    pub limit: Option<usize>,
    pub parallel: Option<usize>,
    pub objects: Option<bool>,
    pub labels: Option<bool>,
    pub landmarks: Option<bool>,
    pub logos: Option<bool>,
    #[serde(rename = "unsafe")]
    pub unsafe_content: Option<bool>,
    pub all: Option<bool>,
    pub google_key: Option<String>,
    pub clarifai_key: Option<String>,
    pub sightengine_user: Option<String>,
    pub sightengine_secret: Option<String>,
    pub output: Option<PathBuf>,
    pub dry_run: Option<bool>,
    pub filter: Option<String>,
    #[serde(rename = "move")]
    pub move_to: Option<PathBuf>,
    pub delete: Option<bool>,
}

/// Config file name looked up in the current and home directories
pub const OPTIONS_FILE: &str = "imgtag.options.json";

/// Load options from the first `imgtag.options.json` found.
///
/// Looks in the current directory, then the home directory. A missing
/// file is a normal outcome; a present but unreadable file is an error.
pub fn load_file_options() -> Result<FileOptions, ConfigError> {
    let mut candidates = vec![PathBuf::from(OPTIONS_FILE)];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(OPTIONS_FILE));
    }

    for path in candidates {
        if path.exists() {
            return load_file_options_from(&path);
        }
    }

    Ok(FileOptions::default())
}

/// Load options from a specific JSON file
pub fn load_file_options_from(path: &Path) -> Result<FileOptions, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let options: FileOptions =
        serde_json::from_str(&contents).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    info!(path = %path.display(), "Loaded options file");
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn default_config_fails_without_folders() {
        let config = Config::default();
        assert!(matches!(config.validate(), Err(ConfigError::NoFolders)));
    }

    #[test]
    fn dry_run_does_not_need_folders() {
        let config = Config {
            dry_run: true,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_parallel_is_rejected() {
        let config = Config {
            dry_run: true,
            parallel: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLimit { field: "parallel", .. })
        ));
    }

    #[test]
    fn delete_requires_filter() {
        let config = Config {
            dry_run: true,
            delete: true,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ActionWithoutFilter { action: "delete" })
        ));

        let config = Config {
            dry_run: true,
            delete: true,
            filter: Some("is-porn".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn move_with_blank_filter_is_rejected() {
        let config = Config {
            dry_run: true,
            move_to: Some(PathBuf::from("/trash")),
            filter: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ActionWithoutFilter { action: "move" })
        ));
    }

    #[test]
    fn extensions_are_normalized_and_deduped() {
        let config = Config {
            extensions: vec![
                ".JPG".to_string(),
                "jpg".to_string(),
                "Png".to_string(),
            ],
            ..Default::default()
        };
        assert_eq!(config.normalized_extensions(), vec!["jpg", "png"]);
    }

    #[test]
    fn file_options_parse_partial_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(OPTIONS_FILE);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"limit": 50, "unsafe": true, "filter": "is-bloat"}}"#
        )
        .unwrap();

        let options = load_file_options_from(&path).unwrap();
        assert_eq!(options.limit, Some(50));
        assert_eq!(options.unsafe_content, Some(true));
        assert_eq!(options.filter.as_deref(), Some("is-bloat"));
        assert!(options.folders.is_none());
    }

    #[test]
    fn malformed_options_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(OPTIONS_FILE);
        std::fs::write(&path, "not json").unwrap();

        assert!(load_file_options_from(&path).is_err());
    }
}
