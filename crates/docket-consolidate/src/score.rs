//! Similarity primitives.
//!
//! Every score is in `[0.0, 1.0]`. Text and tag similarity are Jaccard
//! coefficients over sets; schedule compatibility comes from the injected
//! [`ScheduleTable`](crate::rules::ScheduleTable).

use std::collections::BTreeSet;

use docket_core::model::WorkItem;

use crate::normalize::normalize;
use crate::rules::Rules;

/// Jaccard similarity `|A ∩ B| / |A ∪ B|`. Returns `0.0` when both sets are
/// empty.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union_size = a.union(b).count() as f64;
    intersection / union_size
}

/// Jaccard similarity of the normalized token sets of two texts.
///
/// Returns `0.0` if either text is empty.
#[must_use]
pub fn text_similarity(a: &str, b: &str, rules: &Rules) -> f64 {
    if a.trim().is_empty() || b.trim().is_empty() {
        return 0.0;
    }
    let min_len = rules.config.min_token_len;
    jaccard(
        &normalize(a, &rules.stop_words, min_len),
        &normalize(b, &rules.stop_words, min_len),
    )
}

/// Lowercased, trimmed tag set. Blank tags are ignored.
#[must_use]
pub fn tag_set<S: AsRef<str>>(tags: &[S]) -> BTreeSet<String> {
    tags.iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Case-insensitive Jaccard similarity of two tag lists.
///
/// Two untagged items count as a perfect match; one untagged item against a
/// tagged one scores `0.0`.
#[must_use]
pub fn tag_similarity<S: AsRef<str>>(a: &[S], b: &[S]) -> f64 {
    tag_set_similarity(&tag_set(a), &tag_set(b))
}

fn tag_set_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        (false, false) => jaccard(a, b),
    }
}

// ---------------------------------------------------------------------------
// TokenProfile
// ---------------------------------------------------------------------------

/// Pre-computed token sets for one item, so a batch of comparisons
/// tokenizes each item once instead of once per pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenProfile {
    pub summary: BTreeSet<String>,
    pub content: BTreeSet<String>,
    pub tags: BTreeSet<String>,
}

impl TokenProfile {
    #[must_use]
    pub fn build(item: &WorkItem, rules: &Rules) -> Self {
        let min_len = rules.config.min_token_len;
        Self {
            summary: normalize(&item.summary, &rules.stop_words, min_len),
            content: normalize(&item.content, &rules.stop_words, min_len),
            tags: tag_set(&item.technical_tags),
        }
    }

    /// Same result as [`text_similarity`] on the summaries.
    #[must_use]
    pub fn summary_similarity(&self, other: &Self) -> f64 {
        jaccard(&self.summary, &other.summary)
    }

    /// Same result as [`text_similarity`] on the contents.
    #[must_use]
    pub fn content_similarity(&self, other: &Self) -> f64 {
        jaccard(&self.content, &other.content)
    }

    /// Same result as [`tag_similarity`].
    #[must_use]
    pub fn tag_similarity(&self, other: &Self) -> f64 {
        tag_set_similarity(&self.tags, &other.tags)
    }
}
