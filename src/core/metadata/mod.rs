//! # Metadata Module
//!
//! Extracts EXIF details from image files.
//!
//! EXIF is only attempted for JPEG files, matching the formats where it
//! is reliably present. "No EXIF data" is a normal outcome, not an
//! error, and always yields an empty update.

use crate::core::ImageDetails;
use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Check if EXIF extraction should be attempted for this path
pub fn supports_exif(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref(),
        Some("jpg") | Some("jpeg")
    )
}

/// Extract EXIF fields into image details.
///
/// Fills only the fields found; existing values in `details` are kept
/// unless EXIF provides a better one (the capture date wins over the
/// filesystem date).
pub fn extract_exif(path: &Path, details: &mut ImageDetails) {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return,
    };

    let mut bufreader = BufReader::new(&file);
    let exif_reader = match Reader::new().read_from_container(&mut bufreader) {
        Ok(r) => r,
        Err(_) => return,
    };

    if let Some(field) = exif_reader.get_field(Tag::DateTimeOriginal, In::PRIMARY) {
        if let Some(s) = get_string_value(&field.value) {
            // EXIF date format: "YYYY:MM:DD HH:MM:SS"
            if let Ok(naive) = NaiveDateTime::parse_from_str(&s, "%Y:%m:%d %H:%M:%S") {
                details.date = Some(naive.format("%Y-%m-%dT%H:%M:%S").to_string());
            }
        }
    }

    if let Some(field) = exif_reader.get_field(Tag::Make, In::PRIMARY) {
        details.camera_make = get_string_value(&field.value);
    }

    if let Some(field) = exif_reader.get_field(Tag::Model, In::PRIMARY) {
        details.camera_model = get_string_value(&field.value);
    }
}

/// Helper to extract a trimmed string from an EXIF ASCII value
fn get_string_value(value: &Value) -> Option<String> {
    if let Value::Ascii(ref vec) = value {
        if let Some(bytes) = vec.first() {
            if let Ok(s) = std::str::from_utf8(bytes) {
                let trimmed = s.trim_end_matches('\0').trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}
