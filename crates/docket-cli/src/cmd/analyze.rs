//! `dk analyze`: ranked consolidation candidates, read-only.

use super::{CandidateOutput, open_consolidator, write_candidate};
use crate::output::{OutputMode, fail, render};
use clap::Args;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Maximum number of candidates to report.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Only report pairs scoring strictly above this value
    /// (defaults to `acceptance_threshold` from config).
    #[arg(long, value_name = "SCORE")]
    pub min_score: Option<f64>,
}

pub fn run_analyze(
    args: &AnalyzeArgs,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let consolidator = open_consolidator(output, project_root, args.min_score)?;
    let mut candidates = consolidator
        .find_candidates()
        .map_err(|err| fail(output, err))?;

    if let Some(limit) = args.limit {
        candidates.truncate(limit);
    }
    tracing::info!(count = candidates.len(), "analysis complete");

    let rendered: Vec<CandidateOutput> = candidates.iter().map(CandidateOutput::from).collect();
    render(output, &rendered, render_human)
}

fn render_human(candidates: &Vec<CandidateOutput>, w: &mut dyn Write) -> std::io::Result<()> {
    if candidates.is_empty() {
        writeln!(w, "No consolidation candidates found.")?;
        return Ok(());
    }

    writeln!(w, "{} consolidation candidate(s):", candidates.len())?;
    for (i, candidate) in candidates.iter().enumerate() {
        writeln!(w)?;
        write_candidate(w, Some(i + 1), candidate)?;
    }
    Ok(())
}
