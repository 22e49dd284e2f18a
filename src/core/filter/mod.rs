//! # Filter Module
//!
//! The small expression language selecting images for actions.
//!
//! A filter is a comma-separated list of clauses with OR semantics:
//! an image matching any clause is selected. Clause forms:
//!
//! - `tag>0.8` - score greater than
//! - `tag<0.5` - score less than (negative thresholds clamp to 0)
//! - `tag=1`   - score equals
//! - `!tag`    - tag absent or zero
//! - `tag`     - tag present and non-zero
//!
//! A malformed clause is logged and skipped; it never aborts the run.

use crate::core::ImageResult;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::warn;

/// Comparison applied by a clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    GreaterThan,
    LessThan,
    Equals,
    Absent,
    Present,
}

/// One parsed filter clause
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub tag: String,
    pub comparator: Comparator,
    pub threshold: f64,
}

impl Clause {
    /// Parse a single clause, `None` when malformed
    fn parse(raw: &str) -> Option<Clause> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Some(tag) = raw.strip_prefix('!') {
            let tag = tag.trim();
            if tag.is_empty() {
                return None;
            }
            return Some(Clause {
                tag: tag.to_string(),
                comparator: Comparator::Absent,
                threshold: 0.0,
            });
        }

        for (symbol, comparator) in [
            ('>', Comparator::GreaterThan),
            ('<', Comparator::LessThan),
            ('=', Comparator::Equals),
        ] {
            if let Some((tag, value)) = raw.split_once(symbol) {
                let tag = tag.trim();
                let threshold: f64 = value.trim().parse().ok()?;
                if tag.is_empty() {
                    return None;
                }
                // Scores never go below zero, clamp the threshold too.
                return Some(Clause {
                    tag: tag.to_string(),
                    comparator,
                    threshold: threshold.max(0.0),
                });
            }
        }

        Some(Clause {
            tag: raw.to_string(),
            comparator: Comparator::Present,
            threshold: 0.0,
        })
    }

    /// Check one image against the clause
    pub fn matches(&self, image: &ImageResult) -> bool {
        let score = image.tags.get(&self.tag).copied();
        match self.comparator {
            Comparator::GreaterThan => score.is_some_and(|s| s > self.threshold),
            Comparator::LessThan => score.is_some_and(|s| s < self.threshold),
            Comparator::Equals => score.is_some_and(|s| s == self.threshold),
            Comparator::Absent => score.unwrap_or(0.0) == 0.0,
            Comparator::Present => score.unwrap_or(0.0) != 0.0,
        }
    }
}

/// Parse a full filter expression into its valid clauses.
///
/// Malformed clauses are dropped with a warning.
pub fn parse_filter(expression: &str) -> Vec<Clause> {
    expression
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .filter_map(|part| match Clause::parse(part) {
            Some(clause) => Some(clause),
            None => {
                warn!(clause = part.trim(), "Skipping malformed filter clause");
                None
            }
        })
        .collect()
}

/// Select the images matching any clause, deduplicated by file path.
///
/// Returns indices into `results` in their original order.
pub fn select<'a>(results: &'a [ImageResult], clauses: &[Clause]) -> Vec<&'a ImageResult> {
    let mut seen: HashSet<&PathBuf> = HashSet::new();
    results
        .iter()
        .filter(|image| clauses.iter().any(|clause| clause.matches(image)))
        .filter(|image| seen.insert(&image.file))
        .collect()
}
