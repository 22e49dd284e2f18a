//! # Detector Module
//!
//! Polymorphic detection capabilities, one per provider-feature pair.
//!
//! Each detector takes an image file path and returns a normalized tag
//! map, or a typed failure. Failures are isolated per provider per
//! file: the pipeline logs them and records them on the image result,
//! and scanning continues.

mod clarifai;
mod quota;
mod sightengine;
mod vision;

pub use clarifai::ClarifaiDetector;
pub use quota::{QuotaTracker, TryAcquire};
pub use sightengine::SightengineDetector;
pub use vision::{GoogleVisionDetector, VisionFeature};

use crate::core::config::Config;
use crate::core::TagMap;
use crate::error::DetectError;
use std::path::Path;

/// External image-recognition services consulted during a run.
///
/// Call quotas are enforced per provider, not per detector: all five
/// Google Vision feature detectors share one counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    GoogleVision,
    Clarifai,
    Sightengine,
}

impl Provider {
    pub const ALL: [Provider; 3] = [
        Provider::GoogleVision,
        Provider::Clarifai,
        Provider::Sightengine,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::GoogleVision => "google-vision",
            Provider::Clarifai => "clarifai",
            Provider::Sightengine => "sightengine",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Provider::GoogleVision => 0,
            Provider::Clarifai => 1,
            Provider::Sightengine => 2,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single detection capability.
///
/// Implementations must be cheap to call concurrently; the pipeline
/// fans detectors out in parallel for each file.
pub trait Detector: Send + Sync {
    /// Identifier used in logs and error records,
    /// e.g. "google-vision-labels"
    fn name(&self) -> &str;

    /// The provider this detector counts against for quota purposes
    fn provider(&self) -> Provider;

    /// Detect tags for the given image file.
    ///
    /// An empty tag map is a successful "nothing found" outcome and is
    /// distinct from an error.
    fn detect(&self, path: &Path) -> Result<TagMap, DetectError>;
}

/// Build the ordered detector set for a run.
///
/// A provider participates when its credentials are present; Google
/// Vision contributes one detector per enabled feature.
pub fn build_detectors(config: &Config) -> Vec<Box<dyn Detector>> {
    let mut detectors: Vec<Box<dyn Detector>> = Vec::new();
    let features = &config.features;
    let creds = &config.credentials;

    if let Some(key) = &creds.google_key {
        let enabled = [
            (features.objects, VisionFeature::Objects),
            (features.labels, VisionFeature::Labels),
            (features.landmarks, VisionFeature::Landmarks),
            (features.logos, VisionFeature::Logos),
            (features.unsafe_content, VisionFeature::SafeSearch),
        ];
        for (on, feature) in enabled {
            if on {
                detectors.push(Box::new(GoogleVisionDetector::new(key.clone(), feature)));
            }
        }
    }

    if let Some(key) = &creds.clarifai_key {
        detectors.push(Box::new(ClarifaiDetector::new(key.clone())));
    }

    if let (Some(user), Some(secret)) = (&creds.sightengine_user, &creds.sightengine_secret) {
        detectors.push(Box::new(SightengineDetector::new(
            user.clone(),
            secret.clone(),
            features.unsafe_content,
        )));
    }

    detectors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Credentials, Features};

    fn config_with(credentials: Credentials, features: Features) -> Config {
        Config {
            credentials,
            features,
            ..Default::default()
        }
    }

    #[test]
    fn no_credentials_no_detectors() {
        let config = config_with(Credentials::default(), Features::all());
        assert!(build_detectors(&config).is_empty());
    }

    #[test]
    fn google_key_enables_one_detector_per_feature() {
        let credentials = Credentials {
            google_key: Some("key".to_string()),
            ..Default::default()
        };
        let config = config_with(credentials, Features::all());
        let detectors = build_detectors(&config);

        assert_eq!(detectors.len(), 5);
        assert!(detectors
            .iter()
            .all(|d| d.provider() == Provider::GoogleVision));
    }

    #[test]
    fn sightengine_needs_both_user_and_secret() {
        let credentials = Credentials {
            sightengine_user: Some("user".to_string()),
            ..Default::default()
        };
        let config = config_with(credentials, Features::all());
        assert!(build_detectors(&config).is_empty());

        let credentials = Credentials {
            sightengine_user: Some("user".to_string()),
            sightengine_secret: Some("secret".to_string()),
            ..Default::default()
        };
        let config = config_with(credentials, Features::all());
        let detectors = build_detectors(&config);
        assert_eq!(detectors.len(), 1);
        assert_eq!(detectors[0].provider(), Provider::Sightengine);
    }

    #[test]
    fn detector_order_is_stable() {
        let credentials = Credentials {
            google_key: Some("g".to_string()),
            clarifai_key: Some("c".to_string()),
            ..Default::default()
        };
        let features = Features {
            labels: true,
            logos: true,
            ..Default::default()
        };
        let config = config_with(credentials, features);
        let detectors = build_detectors(&config);

        let names: Vec<&str> = detectors.iter().map(|d| d.name()).collect();
        assert_eq!(
            names,
            vec!["google-vision-labels", "google-vision-logos", "clarifai"]
        );
    }
}
