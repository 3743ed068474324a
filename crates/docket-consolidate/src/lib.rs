#![forbid(unsafe_code)]
//! docket consolidation engine.
//!
//! Items flow storage -> [`finder`] -> [`analyze`] -> ranked
//! [`ConsolidationCandidate`]s -> approval -> [`executor`] -> storage.
//!
//! # Conventions
//!
//! - **Errors**: [`ConsolidationError`] for everything that touches storage;
//!   scoring is infallible.
//! - **Logging**: `tracing` macros (`debug!` per pair decision, `info!` per
//!   applied consolidation).

pub mod analyze;
pub mod candidate;
pub mod error;
pub mod executor;
pub mod finder;
pub mod normalize;
pub mod rules;
pub mod score;

pub use analyze::analyze;
pub use candidate::{ConsolidationCandidate, MergeAction, MergeStrategy, SubScores};
pub use error::ConsolidationError;
pub use executor::{Consolidator, Outcome};
pub use finder::find_candidates;
pub use rules::{Rules, ScheduleTable, StopWords};
