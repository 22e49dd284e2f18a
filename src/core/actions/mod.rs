//! # Actions Module
//!
//! Executes move/delete actions on images selected by the filter.
//!
//! Errors are isolated per item: one failed file never stops the rest,
//! and a move never loses the source when the destination cannot be
//! prepared or written.

use crate::core::ImageResult;
use crate::error::ActionError;
use crate::events::{ActionEvent, Event, EventSender};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of one action batch
#[derive(Debug, Default)]
pub struct ActionOutcome {
    /// Files moved
    pub moved: usize,
    /// Files deleted
    pub deleted: usize,
    /// Per-item failures
    pub errors: Vec<ActionError>,
}

/// Move selected images under `target`, preserving their path relative
/// to the scan root they came from.
///
/// Results loaded from a foreign run may not sit under any root; those
/// fall back to their bare file name.
pub fn move_images(
    images: &[&ImageResult],
    roots: &[PathBuf],
    target: &Path,
    events: &EventSender,
) -> ActionOutcome {
    let mut outcome = ActionOutcome::default();
    let mut created_dirs: HashSet<PathBuf> = HashSet::new();

    debug!(count = images.len(), target = %target.display(), "Moving selected images");

    for image in images {
        let source = image.file.as_path();

        if !source.exists() {
            debug!(path = %source.display(), "Does not exist, will not move");
            continue;
        }

        let relative = roots
            .iter()
            .find_map(|root| source.strip_prefix(root).ok().map(Path::to_path_buf))
            .or_else(|| source.file_name().map(PathBuf::from));
        let Some(relative) = relative else {
            outcome.errors.push(ActionError::MoveFailed {
                path: source.to_path_buf(),
                reason: "no usable file name".to_string(),
            });
            continue;
        };

        let destination = target.join(relative);

        if let Some(parent) = destination.parent() {
            if !created_dirs.contains(parent) {
                if let Err(e) = fs::create_dir_all(parent) {
                    let error = ActionError::CreateFolder {
                        path: parent.to_path_buf(),
                        source: e,
                    };
                    warn!(path = %source.display(), "{error}");
                    events.send(Event::Action(ActionEvent::Error {
                        path: source.to_path_buf(),
                        message: error.to_string(),
                    }));
                    outcome.errors.push(error);
                    continue;
                }
                created_dirs.insert(parent.to_path_buf());
            }
        }

        match move_file(source, &destination) {
            Ok(()) => {
                info!(from = %source.display(), to = %destination.display(), "Moved");
                events.send(Event::Action(ActionEvent::Moved {
                    from: source.to_path_buf(),
                    to: destination,
                }));
                outcome.moved += 1;
            }
            Err(e) => {
                let error = ActionError::MoveFailed {
                    path: source.to_path_buf(),
                    reason: e.to_string(),
                };
                warn!("{error}");
                events.send(Event::Action(ActionEvent::Error {
                    path: source.to_path_buf(),
                    message: error.to_string(),
                }));
                outcome.errors.push(error);
            }
        }
    }

    outcome
}

/// Rename with a verified copy+delete fallback for cross-device moves.
///
/// The source is only removed after the destination size matches.
fn move_file(source: &Path, destination: &Path) -> std::io::Result<()> {
    fs::rename(source, destination).or_else(|_| {
        let source_size = fs::metadata(source)?.len();
        fs::copy(source, destination)?;

        let dest_size = fs::metadata(destination)?.len();
        if dest_size != source_size {
            let _ = fs::remove_file(destination);
            return Err(std::io::Error::other(format!(
                "copy verification failed: source {} bytes, dest {} bytes",
                source_size, dest_size
            )));
        }

        fs::remove_file(source)
    })
}

/// Delete selected images from disk.
///
/// An already-missing file counts as satisfied, not as an error.
pub fn delete_images(images: &[&ImageResult], events: &EventSender) -> ActionOutcome {
    let mut outcome = ActionOutcome::default();

    for image in images {
        let path = image.file.as_path();

        if !path.exists() {
            debug!(path = %path.display(), "Already gone, nothing to delete");
            continue;
        }

        match fs::remove_file(path) {
            Ok(()) => {
                info!(path = %path.display(), "Deleted");
                events.send(Event::Action(ActionEvent::Deleted {
                    path: path.to_path_buf(),
                }));
                outcome.deleted += 1;
            }
            Err(e) => {
                let error = ActionError::DeleteFailed {
                    path: path.to_path_buf(),
                    source: e,
                };
                warn!("{error}");
                events.send(Event::Action(ActionEvent::Error {
                    path: path.to_path_buf(),
                    message: error.to_string(),
                }));
                outcome.errors.push(error);
            }
        }
    }

    outcome
}
