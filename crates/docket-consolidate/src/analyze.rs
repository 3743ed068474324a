//! Pairwise analysis: sub-scores, composite score, reason and strategy.

use docket_core::model::WorkItem;

use crate::candidate::{ConsolidationCandidate, MergeStrategy, SubScores};
use crate::rules::Rules;
use crate::score::TokenProfile;

/// Score two items and classify the pair.
///
/// `item1` becomes the candidate's primary. Type and eligibility filtering
/// is the finder's job; this function scores whatever it is given.
#[must_use]
pub fn analyze(item1: &WorkItem, item2: &WorkItem, rules: &Rules) -> ConsolidationCandidate {
    let p1 = TokenProfile::build(item1, rules);
    let p2 = TokenProfile::build(item2, rules);
    analyze_profiles(item1, &p1, item2, &p2, rules)
}

/// [`analyze`] with the token sets already computed.
#[must_use]
pub fn analyze_profiles(
    item1: &WorkItem,
    p1: &TokenProfile,
    item2: &WorkItem,
    p2: &TokenProfile,
    rules: &Rules,
) -> ConsolidationCandidate {
    let breakdown = SubScores {
        summary: p1.summary_similarity(p2),
        tags: p1.tag_similarity(p2),
        content: p1.content_similarity(p2),
        schedule: rules.schedule.compatibility(item1.schedule, item2.schedule),
    };
    let score = breakdown.composite(&rules.config.weights);

    ConsolidationCandidate {
        item1: item1.clone(),
        item2: item2.clone(),
        score,
        reason: explain(&breakdown, item1, item2, rules),
        strategy: MergeStrategy::classify(score, &rules.config.strategy),
        breakdown,
    }
}

/// Build the comma-separated reason string from the sub-scores that clear
/// their disclosure thresholds.
fn explain(scores: &SubScores, item1: &WorkItem, item2: &WorkItem, rules: &Rules) -> String {
    let limits = &rules.config.disclosure;
    let mut reasons = Vec::with_capacity(4);

    if scores.summary > limits.summary {
        reasons.push(format!("Similar summaries ({})", percent(scores.summary)));
    }
    if scores.tags > limits.tags {
        reasons.push(format!("Shared technical tags ({})", percent(scores.tags)));
    }
    if scores.content > limits.content {
        reasons.push(format!("Similar content ({})", percent(scores.content)));
    }
    if scores.schedule > limits.schedule {
        reasons.push(format!(
            "Compatible schedules ({}/{})",
            item1.schedule, item2.schedule
        ));
    }

    reasons.join(", ")
}

fn percent(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::model::{ItemType, Schedule};

    fn item(id: &str, summary: &str, content: &str, tags: &[&str], schedule: Schedule) -> WorkItem {
        let mut item = WorkItem::new(id, ItemType::Plan, summary, schedule);
        item.content = content.into();
        item.technical_tags = tags.iter().map(ToString::to_string).collect();
        item
    }

    #[test]
    fn near_duplicates_merge() {
        let rules = Rules::default();
        let a = item(
            "a",
            "Add caching layer",
            "Introduce a redis caching layer in front of the user service to reduce latency",
            &["redis", "cache"],
            Schedule::Now,
        );
        let b = item(
            "b",
            "Add caching layer",
            "Introduce a redis caching layer in front of the user service to cut latency",
            &["Cache", "Redis"],
            Schedule::Now,
        );

        let candidate = analyze(&a, &b, &rules);
        // 0.40 + 0.25 + 0.25 * 8/10 + 0.10
        assert!((candidate.score - 0.95).abs() < 1e-9, "{}", candidate.score);
        assert_eq!(candidate.strategy, MergeStrategy::MergeContent);
        assert_eq!(
            candidate.reason,
            "Similar summaries (100.0%), Shared technical tags (100.0%), \
             Similar content (80.0%), Compatible schedules (now/now)"
        );
        assert_eq!(candidate.item1.id, "a");
        assert_eq!(candidate.item2.id, "b");
    }

    #[test]
    fn unrelated_items_have_empty_reason() {
        let rules = Rules::default();
        let a = item("a", "Write quarterly report", "numbers", &["finance"], Schedule::Now);
        let b = item("b", "Fix login redirect", "oauth", &["auth"], Schedule::Later);

        let candidate = analyze(&a, &b, &rules);
        // only now/later schedule compatibility contributes
        assert!((candidate.score - 0.03).abs() < 1e-9, "{}", candidate.score);
        assert_eq!(candidate.reason, "");
        assert_eq!(candidate.strategy, MergeStrategy::ReferenceOnly);
    }

    #[test]
    fn summary_needs_to_beat_its_own_threshold() {
        let rules = Rules::default();
        // {add, caching, layer} vs {add, caching, service}: 0.5, below 0.7
        let a = item("a", "Add caching layer", "", &[], Schedule::Now);
        let b = item("b", "Add caching service", "", &[], Schedule::Next);

        let candidate = analyze(&a, &b, &rules);
        assert!((candidate.breakdown.summary - 0.5).abs() < 1e-9);
        assert!((candidate.breakdown.tags - 1.0).abs() < 1e-9);
        assert!(candidate.breakdown.content.abs() < 1e-9);
        assert_eq!(
            candidate.reason,
            "Shared technical tags (100.0%), Compatible schedules (now/next)"
        );
    }

    #[test]
    fn percentages_use_one_decimal() {
        assert_eq!(percent(0.8234), "82.3%");
        assert_eq!(percent(1.0), "100.0%");
        assert_eq!(percent(2.0 / 3.0), "66.7%");
    }

    #[test]
    fn inputs_are_not_mutated() {
        let rules = Rules::default();
        let a = item("a", "Add caching layer", "x", &["Redis"], Schedule::Now);
        let b = item("b", "Add caching layer", "y", &["redis"], Schedule::Next);
        let (a0, b0) = (a.clone(), b.clone());
        let _ = analyze(&a, &b, &rules);
        assert_eq!(a, a0);
        assert_eq!(b, b0);
    }
}
