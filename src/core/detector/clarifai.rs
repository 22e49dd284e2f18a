//! Clarifai general-model concept detection.
//!
//! Posts the image as a base64 payload to the public general model and
//! turns the returned concepts into normalized tags.

use super::{Detector, Provider};
use crate::core::normalize::{normalize_score, normalize_tag};
use crate::core::TagMap;
use crate::error::DetectError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Clarifai's public "general" model
const GENERAL_MODEL_URL: &str =
    "https://api.clarifai.com/v2/models/aaa03c23b3724a16a56b629203edc62c/outputs";

/// Status code Clarifai uses for success
const STATUS_OK: u32 = 10000;

/// Generic concept detection against the Clarifai API
pub struct ClarifaiDetector {
    key: String,
    client: reqwest::blocking::Client,
}

impl ClarifaiDetector {
    pub fn new(key: String) -> Self {
        Self {
            key,
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Detector for ClarifaiDetector {
    fn name(&self) -> &str {
        "clarifai"
    }

    fn provider(&self) -> Provider {
        Provider::Clarifai
    }

    fn detect(&self, path: &Path) -> Result<TagMap, DetectError> {
        let bytes = fs::read(path).map_err(|e| DetectError::ReadImage {
            path: path.to_path_buf(),
            source: e,
        })?;

        let body = json!({
            "inputs": [{ "data": { "image": { "base64": BASE64.encode(&bytes) } } }]
        });

        let response = self
            .client
            .post(GENERAL_MODEL_URL)
            .header("Authorization", format!("Key {}", self.key))
            .json(&body)
            .send()
            .map_err(|e| DetectError::Transport {
                provider: self.provider().as_str().to_string(),
                reason: e.to_string(),
            })?;

        let payload: OutputsResponse = response.json().map_err(|e| DetectError::Parse {
            provider: self.provider().as_str().to_string(),
            reason: e.to_string(),
        })?;

        match &payload.status {
            Some(status) if status.code == STATUS_OK => {}
            Some(status) => {
                return Err(DetectError::Api {
                    provider: self.provider().as_str().to_string(),
                    reason: status.description.clone(),
                })
            }
            None => {
                return Err(DetectError::Parse {
                    provider: self.provider().as_str().to_string(),
                    reason: "response has no status".to_string(),
                })
            }
        }

        let mut tags = TagMap::new();
        for output in payload.outputs {
            for concept in output.data.concepts {
                if let Some(score) = normalize_score(concept.value) {
                    tags.insert(normalize_tag(&concept.name), score);
                }
            }
        }

        debug!(path = %path.display(), tags = tags.len(), "Clarifai detection done");
        Ok(tags)
    }
}

#[derive(Debug, Deserialize)]
struct OutputsResponse {
    status: Option<Status>,
    #[serde(default)]
    outputs: Vec<Output>,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct Output {
    #[serde(default)]
    data: OutputData,
}

#[derive(Debug, Default, Deserialize)]
struct OutputData {
    #[serde(default)]
    concepts: Vec<Concept>,
}

#[derive(Debug, Deserialize)]
struct Concept {
    #[serde(default)]
    name: String,
    #[serde(default)]
    value: f64,
}
