//! Exhaustive pairwise search for consolidation candidates.

use std::cmp::Ordering;

use docket_core::model::WorkItem;
use tracing::{debug, trace};

use crate::analyze::analyze_profiles;
use crate::candidate::ConsolidationCandidate;
use crate::rules::Rules;
use crate::score::TokenProfile;

/// Compare every unordered pair of eligible items of the same type and
/// return those scoring strictly above the acceptance threshold.
///
/// Within a pair the earlier item in `items` is the primary. Results are
/// sorted by descending score; ties are ordered by the pair's ids so the
/// output is fully deterministic.
#[must_use]
pub fn find_candidates(items: &[WorkItem], rules: &Rules) -> Vec<ConsolidationCandidate> {
    let threshold = rules.config.acceptance_threshold;
    let profiles: Vec<Option<TokenProfile>> = items
        .iter()
        .map(|item| {
            item.is_consolidation_eligible()
                .then(|| TokenProfile::build(item, rules))
        })
        .collect();

    let mut candidates = Vec::new();
    for (i, item1) in items.iter().enumerate() {
        let Some(p1) = &profiles[i] else {
            trace!(id = %item1.id, status = %item1.status, "skipping ineligible item");
            continue;
        };
        for (j, item2) in items.iter().enumerate().skip(i + 1) {
            let Some(p2) = &profiles[j] else {
                continue;
            };
            if item1.item_type != item2.item_type {
                continue;
            }

            let candidate = analyze_profiles(item1, p1, item2, p2, rules);
            if candidate.score > threshold {
                debug!(
                    item1 = %item1.id,
                    item2 = %item2.id,
                    score = candidate.score,
                    strategy = %candidate.strategy,
                    "consolidation candidate"
                );
                candidates.push(candidate);
            } else {
                trace!(
                    item1 = %item1.id,
                    item2 = %item2.id,
                    score = candidate.score,
                    "below acceptance threshold"
                );
            }
        }
    }

    sort_candidates(&mut candidates);
    debug!(
        items = items.len(),
        candidates = candidates.len(),
        "candidate search complete"
    );
    candidates
}

/// Descending score, then ascending `(item1.id, item2.id)`.
pub fn sort_candidates(candidates: &mut [ConsolidationCandidate]) {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.item1.id.cmp(&b.item1.id))
            .then_with(|| a.item2.id.cmp(&b.item2.id))
    });
}
