//! # Categorizer Module
//!
//! Derives `is-` prefixed boolean tags from an image's merged tag map
//! using threshold rules over weighted scores.
//!
//! The built-in rules flag low-value "bloat" images (memes,
//! screenshots, ads) and pornographic images. Rules are plain data;
//! the numeric thresholds are tuned constants, not contracts.

use crate::core::{ImageDetails, TagMap};
use std::path::Path;
use tracing::info;

/// Files smaller than this are flagged as bloat regardless of tags
const BLOAT_SIZE_BYTES: u64 = 40_000;

/// A derived-tag rule evaluated against an image's tag map.
///
/// All scores compare against the same thresholds: a rule fires when
/// primary tags show one strong hit backed by enough corroboration,
/// or when the combined qualifying score clears the total threshold.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    /// Derived tag name, without the `is-` prefix
    pub name: &'static str,
    /// Tags that directly indicate the category
    pub primary_tags: &'static [&'static str],
    /// Tags that only support a primary hit
    pub supporting_tags: &'static [&'static str],
    /// Score a primary tag needs to count as a strong hit
    pub high_score: f64,
    /// Minimum score for a tag to count at all
    pub min_score: f64,
    /// Combined qualifying score that fires the rule on its own
    pub total_score: f64,
    /// File-size shortcut: below this many bytes the rule fires
    /// without looking at tags
    pub max_size_shortcut: Option<u64>,
}

/// Rule for low-value images: memes, screenshots, ads, web content
pub const BLOAT_RULE: CategoryRule = CategoryRule {
    name: "bloat",
    primary_tags: &[
        "meme",
        "photo-caption",
        "screenshot",
        "website",
        "world-wide-web",
        "explicit-spoof",
        "template",
    ],
    supporting_tags: &[
        "picture-frame",
        "advertising",
        "document",
        "text",
        "logo-facebook",
        "logo-twitter",
        "logo-instagram",
        "logo-whatsapp",
    ],
    high_score: 0.91,
    min_score: 0.71,
    total_score: 3.55,
    max_size_shortcut: Some(BLOAT_SIZE_BYTES),
};

/// Rule for pornographic and erotic images
pub const PORN_RULE: CategoryRule = CategoryRule {
    name: "porn",
    primary_tags: &["explicit-adult", "nude", "erotic", "porn", "sexual"],
    supporting_tags: &["explicit-medical", "sexual", "organ", "adult"],
    high_score: 0.91,
    min_score: 0.71,
    total_score: 2.84,
    max_size_shortcut: None,
};

/// The built-in rule set, applied to every scanned image
pub const BUILTIN_RULES: &[&CategoryRule] = &[&BLOAT_RULE, &PORN_RULE];

impl CategoryRule {
    /// Evaluate the rule against a tag map and file details.
    ///
    /// Missing tags count as score 0. Returns the reason the rule
    /// fired, or `None`.
    pub fn evaluate(&self, tags: &TagMap, details: &ImageDetails) -> Option<&'static str> {
        if let (Some(max_size), Some(size)) = (self.max_size_shortcut, details.size) {
            if size < max_size {
                return Some("small file size");
            }
        }

        let score_of = |tag: &str| tags.get(tag).copied().unwrap_or(0.0);

        let has_high = self
            .primary_tags
            .iter()
            .any(|t| score_of(t) >= self.high_score);
        let primaries: Vec<f64> = self
            .primary_tags
            .iter()
            .map(|t| score_of(t))
            .filter(|s| *s >= self.min_score)
            .collect();
        let supporting: Vec<f64> = self
            .supporting_tags
            .iter()
            .map(|t| score_of(t))
            .filter(|s| *s >= self.min_score)
            .collect();

        if has_high && primaries.len() >= 2 {
            return Some("at least 2 primary tags found");
        }

        if has_high && !primaries.is_empty() && supporting.len() >= 2 {
            return Some("primary tag with supporting tags found");
        }

        let total: f64 = primaries.iter().sum::<f64>() + supporting.iter().sum::<f64>();
        if total >= self.total_score {
            return Some("combined tag score is high");
        }

        None
    }
}

/// Run every rule against the image, returning the derived tags.
///
/// Rules are independent; an image can carry several `is-` tags.
pub fn categorize(file: &Path, tags: &TagMap, details: &ImageDetails) -> TagMap {
    let mut derived = TagMap::new();

    for rule in BUILTIN_RULES {
        if let Some(reason) = rule.evaluate(tags, details) {
            info!(file = %file.display(), category = rule.name, reason, "Image categorized");
            derived.insert(format!("is-{}", rule.name), 1.0);
        }
    }

    derived
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn tags_from(pairs: &[(&str, f64)]) -> TagMap {
        pairs
            .iter()
            .map(|(name, score)| (name.to_string(), *score))
            .collect()
    }

    fn run(tags: TagMap, details: ImageDetails) -> TagMap {
        categorize(&PathBuf::from("/photos/test.jpg"), &tags, &details)
    }

    #[test]
    fn empty_image_gets_no_categories() {
        let derived = run(TagMap::new(), ImageDetails::default());
        assert!(derived.is_empty());
    }

    #[test]
    fn small_file_is_always_bloat() {
        let details = ImageDetails {
            size: Some(39_999),
            ..Default::default()
        };
        let derived = run(TagMap::new(), details);
        assert_eq!(derived.get("is-bloat"), Some(&1.0));
    }

    #[test]
    fn size_shortcut_boundary_is_exclusive() {
        let details = ImageDetails {
            size: Some(40_000),
            ..Default::default()
        };
        let derived = run(TagMap::new(), details);
        assert!(!derived.contains_key("is-bloat"));
    }

    #[test]
    fn two_strong_primaries_fire_bloat() {
        let tags = tags_from(&[("meme", 0.95), ("screenshot", 0.92)]);
        let derived = run(tags, ImageDetails::default());
        assert_eq!(derived.get("is-bloat"), Some(&1.0));
    }

    #[test]
    fn one_primary_with_supporting_tags_fires_bloat() {
        let tags = tags_from(&[
            ("screenshot", 0.93),
            ("text", 0.75),
            ("advertising", 0.8),
        ]);
        let derived = run(tags, ImageDetails::default());
        assert_eq!(derived.get("is-bloat"), Some(&1.0));
    }

    #[test]
    fn total_score_alone_can_fire_bloat() {
        // No tag reaches the high score, but the qualifying sum does.
        let tags = tags_from(&[
            ("meme", 0.9),
            ("screenshot", 0.9),
            ("website", 0.9),
            ("text", 0.9),
        ]);
        let derived = run(tags, ImageDetails::default());
        assert_eq!(derived.get("is-bloat"), Some(&1.0));
    }

    #[test]
    fn single_explicit_adult_is_not_porn() {
        // One strong primary with no corroboration and a total far
        // below the 2.84 threshold must not fire.
        let tags = tags_from(&[("explicit-adult", 0.95)]);
        let derived = run(tags, ImageDetails::default());
        assert!(!derived.contains_key("is-porn"));
    }

    #[test]
    fn corroborated_explicit_adult_is_porn() {
        let tags = tags_from(&[("explicit-adult", 0.95), ("nude", 0.85)]);
        let derived = run(tags, ImageDetails::default());
        assert_eq!(derived.get("is-porn"), Some(&1.0));
    }

    #[test]
    fn image_can_be_both_bloat_and_porn() {
        let tags = tags_from(&[
            ("meme", 0.95),
            ("screenshot", 0.92),
            ("explicit-adult", 0.95),
            ("nude", 0.85),
        ]);
        let derived = run(tags, ImageDetails::default());
        assert_eq!(derived.get("is-bloat"), Some(&1.0));
        assert_eq!(derived.get("is-porn"), Some(&1.0));
    }

    #[test]
    fn weak_tags_below_min_score_are_ignored() {
        let tags = tags_from(&[
            ("meme", 0.7),
            ("screenshot", 0.7),
            ("website", 0.7),
            ("text", 0.7),
            ("document", 0.7),
        ]);
        let derived = run(tags, ImageDetails::default());
        assert!(derived.is_empty());
    }
}
