//! Directory walking implementation using walkdir.

use super::{ExtensionFilter, FolderScanner, FoundImage, ScanResult};
use crate::error::ScanError;
use crate::events::{null_sender, Event, EventSender, ScanEvent};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Configuration for the folder walker
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Also descend into subfolders
    pub recursive: bool,
    /// Allowed file extensions
    pub extensions: Vec<String>,
}

/// Scanner implementation using the walkdir crate
pub struct WalkDirScanner {
    recursive: bool,
    filter: ExtensionFilter,
}

impl WalkDirScanner {
    /// Create a new scanner with the given options
    pub fn new(options: ScanOptions) -> Self {
        Self {
            recursive: options.recursive,
            filter: ExtensionFilter::new(&options.extensions),
        }
    }

    fn scan_folder(
        &self,
        root: &PathBuf,
        events: &EventSender,
        images: &mut Vec<FoundImage>,
        errors: &mut Vec<ScanError>,
    ) {
        if !root.is_dir() {
            errors.push(ScanError::FolderNotFound { path: root.clone() });
            return;
        }

        let mut walker = WalkDir::new(root);
        if !self.recursive {
            walker = walker.max_depth(1);
        }

        for entry_result in walker {
            match entry_result {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_dir() || !self.filter.matches(path) {
                        continue;
                    }

                    // Stat failure is missing metadata, not a lost file.
                    let (size, modified) = match fs::metadata(path) {
                        Ok(meta) => (Some(meta.len()), meta.modified().ok()),
                        Err(e) => {
                            warn!(path = %path.display(), error = %e, "Could not stat file");
                            errors.push(ScanError::ReadEntry {
                                path: path.to_path_buf(),
                                source: e,
                            });
                            (None, None)
                        }
                    };

                    debug!(path = %path.display(), "Added to scanning queue");
                    events.send(Event::Scan(ScanEvent::ImageFound {
                        path: path.to_path_buf(),
                    }));

                    images.push(FoundImage {
                        path: path.to_path_buf(),
                        size,
                        modified,
                    });
                }
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    let error = if e.io_error().map(|io| io.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path: path.clone() }
                    } else {
                        ScanError::ReadEntry {
                            path: path.clone(),
                            source: std::io::Error::other(e.to_string()),
                        }
                    };

                    events.send(Event::Scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    }));
                    errors.push(error);
                }
            }
        }
    }
}

impl FolderScanner for WalkDirScanner {
    fn scan(&self, folders: &[PathBuf]) -> ScanResult {
        self.scan_with_events(folders, &null_sender())
    }

    fn scan_with_events(&self, folders: &[PathBuf], events: &EventSender) -> ScanResult {
        events.send(Event::Scan(ScanEvent::Started {
            folders: folders.to_vec(),
        }));

        let mut images = Vec::new();
        let mut errors = Vec::new();

        for folder in folders {
            self.scan_folder(folder, events, &mut images, &mut errors);
        }

        events.send(Event::Scan(ScanEvent::Completed {
            total_images: images.len(),
        }));

        ScanResult { images, errors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn options() -> ScanOptions {
        ScanOptions {
            recursive: false,
            extensions: vec!["jpg".to_string(), "png".to_string()],
        }
    }

    fn create_image(dir: &std::path::Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
        path
    }

    #[test]
    fn scan_empty_folder_finds_nothing() {
        let temp = TempDir::new().unwrap();
        let scanner = WalkDirScanner::new(options());

        let result = scanner.scan(&[temp.path().to_path_buf()]);

        assert!(result.images.is_empty());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn scan_finds_images_with_sizes() {
        let temp = TempDir::new().unwrap();
        create_image(temp.path(), "photo.jpg");

        let scanner = WalkDirScanner::new(options());
        let result = scanner.scan(&[temp.path().to_path_buf()]);

        assert_eq!(result.images.len(), 1);
        assert!(result.images[0].path.ends_with("photo.jpg"));
        assert_eq!(result.images[0].size, Some(4));
        assert!(result.images[0].modified.is_some());
    }

    #[test]
    fn scan_skips_disallowed_extensions() {
        let temp = TempDir::new().unwrap();
        create_image(temp.path(), "photo.jpg");
        File::create(temp.path().join("notes.txt")).unwrap();

        let scanner = WalkDirScanner::new(options());
        let result = scanner.scan(&[temp.path().to_path_buf()]);

        assert_eq!(result.images.len(), 1);
    }

    #[test]
    fn non_recursive_scan_stays_at_top_level() {
        let temp = TempDir::new().unwrap();
        let sub = temp.path().join("nested");
        fs::create_dir(&sub).unwrap();
        create_image(temp.path(), "top.jpg");
        create_image(&sub, "deep.jpg");

        let scanner = WalkDirScanner::new(options());
        let result = scanner.scan(&[temp.path().to_path_buf()]);

        assert_eq!(result.images.len(), 1);
        assert!(result.images[0].path.ends_with("top.jpg"));
    }

    #[test]
    fn recursive_scan_descends() {
        let temp = TempDir::new().unwrap();
        let sub = temp.path().join("nested");
        fs::create_dir(&sub).unwrap();
        create_image(temp.path(), "top.jpg");
        create_image(&sub, "deep.jpg");

        let scanner = WalkDirScanner::new(ScanOptions {
            recursive: true,
            ..options()
        });
        let result = scanner.scan(&[temp.path().to_path_buf()]);

        assert_eq!(result.images.len(), 2);
    }

    #[test]
    fn missing_folder_records_error_and_continues() {
        let temp = TempDir::new().unwrap();
        create_image(temp.path(), "photo.jpg");

        let scanner = WalkDirScanner::new(options());
        let result = scanner.scan(&[
            PathBuf::from("/nonexistent/path/12345"),
            temp.path().to_path_buf(),
        ]);

        assert_eq!(result.images.len(), 1);
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(result.errors[0], ScanError::FolderNotFound { .. }));
    }
}
