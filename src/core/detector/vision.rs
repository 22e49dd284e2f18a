//! Google Vision detectors, one per annotate feature.
//!
//! Talks to the `images:annotate` REST endpoint with an API key. Logo
//! tags are prefixed with `logo-` and safe-search properties with
//! `explicit-` so downstream rules can target them without colliding
//! with plain labels.

use super::{Detector, Provider};
use crate::core::normalize::{normalize_score, normalize_tag, Likelihood};
use crate::core::TagMap;
use crate::error::DetectError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;
use std::fs;
use std::path::Path;
use tracing::debug;

const ANNOTATE_URL: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Google Vision annotate features supported by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisionFeature {
    Objects,
    Labels,
    Landmarks,
    Logos,
    SafeSearch,
}

impl VisionFeature {
    /// Feature type literal used in the annotate request
    fn request_type(&self) -> &'static str {
        match self {
            VisionFeature::Objects => "OBJECT_LOCALIZATION",
            VisionFeature::Labels => "LABEL_DETECTION",
            VisionFeature::Landmarks => "LANDMARK_DETECTION",
            VisionFeature::Logos => "LOGO_DETECTION",
            VisionFeature::SafeSearch => "SAFE_SEARCH_DETECTION",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            VisionFeature::Objects => "google-vision-objects",
            VisionFeature::Labels => "google-vision-labels",
            VisionFeature::Landmarks => "google-vision-landmarks",
            VisionFeature::Logos => "google-vision-logos",
            VisionFeature::SafeSearch => "google-vision-unsafe",
        }
    }
}

/// One Google Vision feature detection capability
pub struct GoogleVisionDetector {
    key: String,
    feature: VisionFeature,
    client: reqwest::blocking::Client,
}

impl GoogleVisionDetector {
    pub fn new(key: String, feature: VisionFeature) -> Self {
        Self {
            key,
            feature,
            client: reqwest::blocking::Client::new(),
        }
    }

    fn transport(&self, reason: impl ToString) -> DetectError {
        DetectError::Transport {
            provider: Provider::GoogleVision.as_str().to_string(),
            reason: reason.to_string(),
        }
    }

    fn collect_tags(&self, response: AnnotateResult) -> TagMap {
        let mut tags = TagMap::new();

        let mut insert = |raw_name: &str, raw_score: f64| {
            if let Some(score) = normalize_score(raw_score) {
                tags.insert(normalize_tag(raw_name), score);
            }
        };

        match self.feature {
            VisionFeature::Objects => {
                for obj in response.localized_object_annotations {
                    insert(&obj.name, obj.score);
                }
            }
            VisionFeature::Labels => {
                for label in response.label_annotations {
                    insert(&label.description, label.score);
                }
            }
            VisionFeature::Landmarks => {
                for landmark in response.landmark_annotations {
                    insert(&landmark.description, landmark.score);
                }
            }
            VisionFeature::Logos => {
                for logo in response.logo_annotations {
                    insert(&format!("logo-{}", logo.description), logo.score);
                }
            }
            VisionFeature::SafeSearch => {
                if let Some(safe) = response.safe_search_annotation {
                    for (name, likelihood) in [
                        ("explicit-adult", safe.adult),
                        ("explicit-spoof", safe.spoof),
                        ("explicit-medical", safe.medical),
                        ("explicit-violence", safe.violence),
                        ("explicit-racy", safe.racy),
                    ] {
                        insert(name, likelihood.score());
                    }
                }
            }
        }

        tags
    }
}

impl Detector for GoogleVisionDetector {
    fn name(&self) -> &str {
        self.feature.name()
    }

    fn provider(&self) -> Provider {
        Provider::GoogleVision
    }

    fn detect(&self, path: &Path) -> Result<TagMap, DetectError> {
        let bytes = fs::read(path).map_err(|e| DetectError::ReadImage {
            path: path.to_path_buf(),
            source: e,
        })?;

        let body = json!({
            "requests": [{
                "image": { "content": BASE64.encode(&bytes) },
                "features": [{ "type": self.feature.request_type(), "maxResults": 100 }]
            }]
        });

        let response = self
            .client
            .post(format!("{}?key={}", ANNOTATE_URL, self.key))
            .json(&body)
            .send()
            .map_err(|e| self.transport(e))?;

        let status = response.status();
        let payload: AnnotateResponse = response.json().map_err(|e| DetectError::Parse {
            provider: Provider::GoogleVision.as_str().to_string(),
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(DetectError::Api {
                provider: Provider::GoogleVision.as_str().to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        let result = payload.responses.into_iter().next().unwrap_or_default();
        if let Some(error) = result.error {
            return Err(DetectError::Api {
                provider: Provider::GoogleVision.as_str().to_string(),
                reason: error.message,
            });
        }

        let tags = self.collect_tags(result);
        debug!(path = %path.display(), detector = self.name(), tags = tags.len(), "Detection done");
        Ok(tags)
    }
}

#[derive(Debug, Default, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateResult {
    #[serde(default)]
    label_annotations: Vec<Annotation>,
    #[serde(default)]
    landmark_annotations: Vec<Annotation>,
    #[serde(default)]
    logo_annotations: Vec<Annotation>,
    #[serde(default)]
    localized_object_annotations: Vec<ObjectAnnotation>,
    safe_search_annotation: Option<SafeSearchAnnotation>,
    error: Option<ApiStatus>,
}

#[derive(Debug, Default, Deserialize)]
struct Annotation {
    #[serde(default)]
    description: String,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Default, Deserialize)]
struct ObjectAnnotation {
    #[serde(default)]
    name: String,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Deserialize)]
struct SafeSearchAnnotation {
    #[serde(default = "unknown")]
    adult: Likelihood,
    #[serde(default = "unknown")]
    spoof: Likelihood,
    #[serde(default = "unknown")]
    medical: Likelihood,
    #[serde(default = "unknown")]
    violence: Likelihood,
    #[serde(default = "unknown")]
    racy: Likelihood,
}

fn unknown() -> Likelihood {
    Likelihood::Unknown
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector(feature: VisionFeature) -> GoogleVisionDetector {
        GoogleVisionDetector::new("test-key".to_string(), feature)
    }

    #[test]
    fn labels_become_normalized_tags() {
        let result: AnnotateResult = serde_json::from_value(json!({
            "labelAnnotations": [
                { "description": "Photo Caption", "score": 0.934 },
                { "description": "Screenshot", "score": 0.87123 }
            ]
        }))
        .unwrap();

        let tags = detector(VisionFeature::Labels).collect_tags(result);
        assert_eq!(tags.get("photo-caption"), Some(&0.934));
        assert_eq!(tags.get("screenshot"), Some(&0.871));
    }

    #[test]
    fn logos_are_prefixed() {
        let result: AnnotateResult = serde_json::from_value(json!({
            "logoAnnotations": [{ "description": "Facebook", "score": 0.9 }]
        }))
        .unwrap();

        let tags = detector(VisionFeature::Logos).collect_tags(result);
        assert_eq!(tags.get("logo-facebook"), Some(&0.9));
    }

    #[test]
    fn safe_search_maps_likelihoods() {
        let result: AnnotateResult = serde_json::from_value(json!({
            "safeSearchAnnotation": {
                "adult": "VERY_LIKELY",
                "spoof": "UNLIKELY",
                "medical": "VERY_UNLIKELY",
                "violence": "POSSIBLE",
                "racy": "LIKELY"
            }
        }))
        .unwrap();

        let tags = detector(VisionFeature::SafeSearch).collect_tags(result);
        assert_eq!(tags.get("explicit-adult"), Some(&0.91));
        assert_eq!(tags.get("explicit-spoof"), Some(&0.21));
        // VERY_UNLIKELY scores 0 and is dropped entirely
        assert!(!tags.contains_key("explicit-medical"));
        assert_eq!(tags.get("explicit-violence"), Some(&0.51));
        assert_eq!(tags.get("explicit-racy"), Some(&0.71));
    }

    #[test]
    fn unknown_likelihood_literal_is_dropped() {
        let result: AnnotateResult = serde_json::from_value(json!({
            "safeSearchAnnotation": { "adult": "SOMETHING_NEW" }
        }))
        .unwrap();

        let tags = detector(VisionFeature::SafeSearch).collect_tags(result);
        assert!(tags.is_empty());
    }

    #[test]
    fn objects_use_name_field() {
        let result: AnnotateResult = serde_json::from_value(json!({
            "localizedObjectAnnotations": [{ "name": "Dog", "score": 0.77 }]
        }))
        .unwrap();

        let tags = detector(VisionFeature::Objects).collect_tags(result);
        assert_eq!(tags.get("dog"), Some(&0.77));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let error = detector(VisionFeature::Labels)
            .detect(Path::new("/nonexistent/image.jpg"))
            .unwrap_err();
        assert!(matches!(error, DetectError::ReadImage { .. }));
    }
}
