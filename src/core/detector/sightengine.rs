//! Sightengine moderation checks.
//!
//! Posts the image as multipart form data to the check endpoint. The
//! model list grows when unsafe detection is enabled; the nudity raw
//! score is surfaced as the `nude` tag.

use super::{Detector, Provider};
use crate::core::normalize::{normalize_score, normalize_tag};
use crate::core::TagMap;
use crate::error::DetectError;
use reqwest::blocking::multipart::Form;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

const CHECK_URL: &str = "https://api.sightengine.com/1.0/check.json";

/// Moderation detection against the Sightengine API
pub struct SightengineDetector {
    user: String,
    secret: String,
    unsafe_content: bool,
    client: reqwest::blocking::Client,
}

impl SightengineDetector {
    pub fn new(user: String, secret: String, unsafe_content: bool) -> Self {
        Self {
            user,
            secret,
            unsafe_content,
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Models requested from the API for this run
    fn models(&self) -> String {
        let mut models = vec!["properties", "text"];
        if self.unsafe_content {
            models.extend(["offensive", "scam", "nudity", "wad"]);
        }
        models.join(",")
    }
}

impl Detector for SightengineDetector {
    fn name(&self) -> &str {
        "sightengine"
    }

    fn provider(&self) -> Provider {
        Provider::Sightengine
    }

    fn detect(&self, path: &Path) -> Result<TagMap, DetectError> {
        let form = Form::new()
            .text("api_user", self.user.clone())
            .text("api_secret", self.secret.clone())
            .text("models", self.models())
            .file("media", path)
            .map_err(|e| DetectError::ReadImage {
                path: path.to_path_buf(),
                source: e,
            })?;

        let response = self
            .client
            .post(CHECK_URL)
            .multipart(form)
            .send()
            .map_err(|e| DetectError::Transport {
                provider: self.provider().as_str().to_string(),
                reason: e.to_string(),
            })?;

        let payload: CheckResponse = response.json().map_err(|e| DetectError::Parse {
            provider: self.provider().as_str().to_string(),
            reason: e.to_string(),
        })?;

        if payload.status.as_deref() != Some("success") {
            let reason = payload
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| "request failed".to_string());
            return Err(DetectError::Api {
                provider: self.provider().as_str().to_string(),
                reason,
            });
        }

        let mut tags = TagMap::new();
        if let Some(nudity) = payload.nudity {
            if let Some(score) = normalize_score(nudity.raw) {
                tags.insert(normalize_tag("nude"), score);
            }
        }

        debug!(path = %path.display(), tags = tags.len(), "Sightengine detection done");
        Ok(tags)
    }
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    status: Option<String>,
    error: Option<ApiError>,
    nudity: Option<Nudity>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct Nudity {
    #[serde(default)]
    raw: f64,
}
