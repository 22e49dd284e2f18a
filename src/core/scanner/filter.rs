//! Extension-based file filtering.

use std::collections::HashSet;
use std::path::Path;

/// Filters candidate files by allowed extension
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    extensions: HashSet<String>,
}

impl ExtensionFilter {
    /// Build a filter from the configured extension list.
    ///
    /// Entries are lowercased and stripped of a leading dot.
    pub fn new(extensions: &[String]) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Check if a file path matches the allowed extensions
    pub fn matches(&self, path: &Path) -> bool {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions.contains(&ext.to_lowercase()),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_filter() -> ExtensionFilter {
        ExtensionFilter::new(&[
            "jpg".to_string(),
            "jpeg".to_string(),
            "png".to_string(),
            "gif".to_string(),
        ])
    }

    #[test]
    fn matches_configured_extensions() {
        let filter = default_filter();
        assert!(filter.matches(Path::new("/photos/image.jpg")));
        assert!(filter.matches(Path::new("/photos/image.png")));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let filter = default_filter();
        assert!(filter.matches(Path::new("/photos/IMAGE.JPG")));
        assert!(filter.matches(Path::new("/photos/image.Jpeg")));
    }

    #[test]
    fn rejects_other_extensions() {
        let filter = default_filter();
        assert!(!filter.matches(Path::new("/photos/document.pdf")));
        assert!(!filter.matches(Path::new("/photos/video.mp4")));
    }

    #[test]
    fn rejects_files_without_extension() {
        let filter = default_filter();
        assert!(!filter.matches(Path::new("/photos/no_extension")));
    }

    #[test]
    fn dotted_config_entries_still_match() {
        let filter = ExtensionFilter::new(&[".webp".to_string()]);
        assert!(filter.matches(Path::new("/photos/image.webp")));
    }
}
