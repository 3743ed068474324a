//! `dk interactive`: walk the ranked candidates and apply approved ones.

use super::{Answer, CandidateOutput, open_consolidator, prompt, write_candidate};
use crate::output::{CliError, OutputMode, fail, render};
use docket_consolidate::{ConsolidationCandidate, ConsolidationError, Consolidator, Outcome};
use docket_core::storage::ItemStore;
use serde::Serialize;
use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::warn;

#[derive(Debug, Default, Serialize)]
pub struct ReviewSummary {
    pub applied: Vec<AppliedOutput>,
    pub declined: usize,
    /// Candidates dropped because an item they name was merged away, no
    /// longer scores above the threshold, or now resolves to the same item
    /// on both sides.
    pub stale: usize,
    pub failed: Vec<CliError>,
    /// Candidates never shown because the user chose to skip the rest.
    pub remaining: usize,
}

#[derive(Debug, Serialize)]
pub struct AppliedOutput {
    pub item1: String,
    pub item2: String,
    pub strategy: docket_consolidate::MergeStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<String>,
}

pub fn run_interactive(output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let consolidator = open_consolidator(output, project_root, None)?;
    let candidates = consolidator
        .find_candidates()
        .map_err(|err| fail(output, err))?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let summary = if output.is_json() {
        review(&consolidator, &candidates, &mut input, &mut io::stderr())?
    } else {
        review(&consolidator, &candidates, &mut input, &mut io::stdout())?
    };

    render(output, &summary, render_human)
}

/// Prompt for each candidate in order and apply the approved ones.
///
/// A failed consolidation is reported and the review moves on. Candidates
/// naming an item merged away earlier in the session are dropped; those
/// naming an item modified earlier are re-scored from storage first.
pub fn review<S: ItemStore, R: BufRead + ?Sized>(
    consolidator: &Consolidator<S>,
    candidates: &[ConsolidationCandidate],
    input: &mut R,
    out: &mut dyn Write,
) -> io::Result<ReviewSummary> {
    let mut summary = ReviewSummary::default();
    let mut archived: HashSet<String> = HashSet::new();
    let mut modified: HashSet<String> = HashSet::new();
    let threshold = consolidator.rules().config.acceptance_threshold;

    if candidates.is_empty() {
        writeln!(out, "No consolidation candidates found.")?;
        return Ok(summary);
    }

    for (i, original) in candidates.iter().enumerate() {
        if archived.contains(&original.item1.id) || archived.contains(&original.item2.id) {
            summary.stale += 1;
            continue;
        }

        let refreshed;
        let candidate = if modified.contains(&original.item1.id)
            || modified.contains(&original.item2.id)
        {
            match consolidator.lookup(&original.item1.id, &original.item2.id) {
                Ok(fresh) if fresh.score > threshold => {
                    refreshed = fresh;
                    &refreshed
                }
                Ok(_) | Err(ConsolidationError::SameItem(_)) => {
                    summary.stale += 1;
                    continue;
                }
                Err(err) => {
                    warn!("could not refresh candidate: {err}");
                    summary.failed.push(CliError::from(&err));
                    continue;
                }
            }
        } else {
            original
        };

        writeln!(out)?;
        write_candidate(out, Some(i + 1), &CandidateOutput::from(candidate))?;
        match prompt(input, out, "Consolidate?", true)? {
            Answer::Yes => {}
            Answer::No => {
                summary.declined += 1;
                continue;
            }
            Answer::Quit => {
                summary.remaining = candidates.len() - i;
                break;
            }
        }

        match consolidator.perform_consolidation(candidate, true) {
            Ok(outcome) => {
                writeln!(out, "   {}", describe(&outcome))?;
                modified.insert(candidate.item1.id.clone());
                modified.insert(candidate.item2.id.clone());
                if let Some(id) = outcome.archived_id() {
                    archived.insert(id.to_string());
                }
                summary.applied.push(AppliedOutput {
                    item1: candidate.item1.id.clone(),
                    item2: candidate.item2.id.clone(),
                    strategy: candidate.strategy,
                    archived: outcome.archived_id().map(str::to_string),
                });
            }
            Err(err) => {
                writeln!(out, "   failed: {err}")?;
                summary.failed.push(CliError::from(&err));
            }
        }
    }

    Ok(summary)
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Merged {
            primary,
            archived,
            archive_path,
        } => format!(
            "merged {archived} into {primary} (archived at {})",
            archive_path.display()
        ),
        Outcome::Linked { item1, item2 } => format!("linked {item1} <-> {item2}"),
    }
}

fn render_human(summary: &ReviewSummary, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w)?;
    writeln!(
        w,
        "{} applied, {} declined, {} stale, {} failed, {} not reviewed",
        summary.applied.len(),
        summary.declined,
        summary.stale,
        summary.failed.len(),
        summary.remaining
    )
}
