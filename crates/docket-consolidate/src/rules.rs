//! Immutable rule tables consumed by the scorer and analyzer.
//!
//! Everything tunable lives here and is built once per run from
//! [`ConsolidationConfig`]; nothing in the engine reads global state.

use std::collections::{BTreeMap, HashSet};

use docket_core::config::ConsolidationConfig;
use docket_core::model::Schedule;

/// Built-in English stop words removed during normalization.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should", "may", "might", "must", "can", "this", "that", "these", "those",
    "i", "you", "he", "she", "it", "we", "they",
];

// ---------------------------------------------------------------------------
// StopWords
// ---------------------------------------------------------------------------

/// Lowercased stop-word set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopWords(HashSet<String>);

impl StopWords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        )
    }

    #[must_use]
    pub fn empty() -> Self {
        Self(HashSet::new())
    }

    /// `token` is expected to be lowercase already.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::new(DEFAULT_STOP_WORDS)
    }
}

// ---------------------------------------------------------------------------
// ScheduleTable
// ---------------------------------------------------------------------------

/// Symmetric compatibility scores between distinct schedule buckets.
///
/// Equal schedules always score `1.0`; pairs missing from the table score
/// `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleTable {
    pairs: BTreeMap<(Schedule, Schedule), f64>,
}

impl ScheduleTable {
    /// Build a table from `(a, b, score)` entries. Order within a pair does
    /// not matter; a later entry for the same pair wins.
    pub fn new(entries: impl IntoIterator<Item = (Schedule, Schedule, f64)>) -> Self {
        let pairs = entries
            .into_iter()
            .map(|(a, b, score)| (ordered(a, b), score.clamp(0.0, 1.0)))
            .collect();
        Self { pairs }
    }

    #[must_use]
    pub fn compatibility(&self, a: Schedule, b: Schedule) -> f64 {
        if a == b {
            return 1.0;
        }
        self.pairs.get(&ordered(a, b)).copied().unwrap_or(0.0)
    }
}

impl Default for ScheduleTable {
    fn default() -> Self {
        Self::new([
            (Schedule::Now, Schedule::Next, 0.7),
            (Schedule::Next, Schedule::Later, 0.8),
            (Schedule::Now, Schedule::Later, 0.3),
        ])
    }
}

fn ordered(a: Schedule, b: Schedule) -> (Schedule, Schedule) {
    if a <= b { (a, b) } else { (b, a) }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Everything the engine needs to score and classify a pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Rules {
    pub config: ConsolidationConfig,
    pub stop_words: StopWords,
    pub schedule: ScheduleTable,
}

impl Rules {
    /// Built-in stop words plus `config.extra_stop_words`, default schedule
    /// table.
    #[must_use]
    pub fn new(config: ConsolidationConfig) -> Self {
        let stop_words = StopWords::new(
            DEFAULT_STOP_WORDS
                .iter()
                .copied()
                .chain(config.extra_stop_words.iter().map(String::as_str)),
        );
        Self {
            config,
            stop_words,
            schedule: ScheduleTable::default(),
        }
    }

    #[must_use]
    pub fn with_schedule_table(mut self, schedule: ScheduleTable) -> Self {
        self.schedule = schedule;
        self
    }

    #[must_use]
    pub fn with_stop_words(mut self, stop_words: StopWords) -> Self {
        self.stop_words = stop_words;
        self
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new(ConsolidationConfig::default())
    }
}
