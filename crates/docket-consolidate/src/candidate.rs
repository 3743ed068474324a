//! Candidate pairs and the strategies that can be applied to them.

use std::fmt;
use std::str::FromStr;

use docket_core::config::{StrategyThresholds, Weights};
use docket_core::model::WorkItem;
use serde::{Deserialize, Serialize};

use crate::error::ConsolidationError;

// ---------------------------------------------------------------------------
// MergeStrategy
// ---------------------------------------------------------------------------

/// How a candidate pair should be consolidated, chosen from its score band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Near-duplicates: fold the secondary into the primary.
    MergeContent,
    /// Strong overlap: merged the same way as `MergeContent`.
    CombineDetailed,
    /// Moderate overlap: keep both and cross-reference them.
    CombineSummary,
    /// Weakly related: cross-reference only.
    ReferenceOnly,
}

/// The two behaviours the executor actually implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeAction {
    Merge,
    Link,
}

impl MergeStrategy {
    pub const ALL: [Self; 4] = [
        Self::MergeContent,
        Self::CombineDetailed,
        Self::CombineSummary,
        Self::ReferenceOnly,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MergeContent => "merge_content",
            Self::CombineDetailed => "combine_detailed",
            Self::CombineSummary => "combine_summary",
            Self::ReferenceOnly => "reference_only",
        }
    }

    #[must_use]
    pub const fn action(self) -> MergeAction {
        match self {
            Self::MergeContent | Self::CombineDetailed => MergeAction::Merge,
            Self::CombineSummary | Self::ReferenceOnly => MergeAction::Link,
        }
    }

    /// Pick the strategy for a composite `score`. Bounds are exclusive:
    /// a score exactly on a threshold falls into the lower band.
    #[must_use]
    pub fn classify(score: f64, thresholds: &StrategyThresholds) -> Self {
        if score > thresholds.merge_content {
            Self::MergeContent
        } else if score > thresholds.combine_detailed {
            Self::CombineDetailed
        } else if score > thresholds.combine_summary {
            Self::CombineSummary
        } else {
            Self::ReferenceOnly
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeStrategy {
    type Err = ConsolidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == normalized)
            .ok_or_else(|| ConsolidationError::UnknownStrategy(s.to_string()))
    }
}

impl fmt::Display for MergeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Merge => "merge",
            Self::Link => "link",
        })
    }
}

// ---------------------------------------------------------------------------
// SubScores
// ---------------------------------------------------------------------------

/// The four per-dimension similarities behind a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub summary: f64,
    pub tags: f64,
    pub content: f64,
    pub schedule: f64,
}

impl SubScores {
    /// Weighted sum, clamped into `[0, 1]` against float drift.
    #[must_use]
    pub fn composite(&self, weights: &Weights) -> f64 {
        let raw = weights.content.mul_add(
            self.content,
            weights.schedule.mul_add(
                self.schedule,
                weights.summary.mul_add(self.summary, weights.tags * self.tags),
            ),
        );
        raw.clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// ConsolidationCandidate
// ---------------------------------------------------------------------------

/// A scored pair of items proposed for consolidation.
///
/// `item1` is the primary: it survives a merge and absorbs `item2`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidationCandidate {
    pub item1: WorkItem,
    pub item2: WorkItem,
    pub score: f64,
    /// Human-readable explanation; empty when no sub-score stood out.
    pub reason: String,
    pub strategy: MergeStrategy,
    pub breakdown: SubScores,
}

impl ConsolidationCandidate {
    #[must_use]
    pub const fn action(&self) -> MergeAction {
        self.strategy.action()
    }

    /// Whether either side of the pair has the given id.
    #[must_use]
    pub fn involves(&self, id: &str) -> bool {
        self.item1.id == id || self.item2.id == id
    }

    /// Whether both sides are the same stored item.
    #[must_use]
    pub fn is_self_pair(&self) -> bool {
        same_item(&self.item1, &self.item2)
    }
}

/// Two values describe the same stored item when they were read from the
/// same file. Items without a file are compared by id.
#[must_use]
pub fn same_item(a: &WorkItem, b: &WorkItem) -> bool {
    if a.path.as_os_str().is_empty() && b.path.as_os_str().is_empty() {
        a.id == b.id
    } else {
        a.path == b.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_uses_exclusive_bounds() {
        let t = StrategyThresholds::default();
        assert_eq!(MergeStrategy::classify(0.95, &t), MergeStrategy::MergeContent);
        assert_eq!(MergeStrategy::classify(0.9, &t), MergeStrategy::CombineDetailed);
        assert_eq!(MergeStrategy::classify(0.85, &t), MergeStrategy::CombineDetailed);
        assert_eq!(MergeStrategy::classify(0.8, &t), MergeStrategy::CombineSummary);
        assert_eq!(MergeStrategy::classify(0.75, &t), MergeStrategy::CombineSummary);
        assert_eq!(MergeStrategy::classify(0.7, &t), MergeStrategy::ReferenceOnly);
        assert_eq!(MergeStrategy::classify(0.0, &t), MergeStrategy::ReferenceOnly);
    }

    #[test]
    fn strategies_map_onto_two_actions() {
        assert_eq!(MergeStrategy::MergeContent.action(), MergeAction::Merge);
        assert_eq!(MergeStrategy::CombineDetailed.action(), MergeAction::Merge);
        assert_eq!(MergeStrategy::CombineSummary.action(), MergeAction::Link);
        assert_eq!(MergeStrategy::ReferenceOnly.action(), MergeAction::Link);
    }

    #[test]
    fn strategy_names_roundtrip() {
        for strategy in MergeStrategy::ALL {
            assert_eq!(
                strategy.to_string().parse::<MergeStrategy>().unwrap(),
                strategy
            );
            let json = serde_json::to_string(&strategy).unwrap();
            assert_eq!(json, format!("\"{strategy}\""));
        }
        assert_eq!(
            "Combine-Summary".parse::<MergeStrategy>().unwrap(),
            MergeStrategy::CombineSummary
        );
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let err = "squash".parse::<MergeStrategy>().unwrap_err();
        assert!(matches!(err, ConsolidationError::UnknownStrategy(ref s) if s == "squash"));
    }

    #[test]
    fn composite_is_weighted_sum() {
        let scores = SubScores {
            summary: 1.0,
            tags: 1.0,
            content: 0.0,
            schedule: 1.0,
        };
        assert!((scores.composite(&Weights::default()) - 0.75).abs() < 1e-9);

        let perfect = SubScores {
            summary: 1.0,
            tags: 1.0,
            content: 1.0,
            schedule: 1.0,
        };
        assert!(perfect.composite(&Weights::default()) <= 1.0);
        assert!((perfect.composite(&Weights::default()) - 1.0).abs() < 1e-9);
    }
}
