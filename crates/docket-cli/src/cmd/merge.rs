//! `dk merge <id1> <id2>`: consolidate one explicitly named pair.

use super::{Answer, CandidateOutput, open_consolidator, prompt, write_candidate};
use crate::output::{CliError, OutputMode, fail, kv, render, render_error, rule};
use clap::Args;
use docket_consolidate::{ConsolidationError, MergeStrategy, Outcome};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Primary item: survives a merge and absorbs the other.
    pub id1: String,

    /// Secondary item.
    pub id2: String,

    /// Override the strategy picked from the score
    /// (merge_content, combine_detailed, combine_summary, reference_only).
    #[arg(long)]
    pub strategy: Option<String>,

    /// Apply without asking for confirmation.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Debug, Serialize)]
pub struct MergeOutput {
    pub candidate: CandidateOutput,
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_path: Option<String>,
}

pub fn run_merge(args: &MergeArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let strategy = args
        .strategy
        .as_deref()
        .map(str::parse::<MergeStrategy>)
        .transpose()
        .map_err(|err| fail(output, err))?;

    let consolidator = open_consolidator(output, project_root, None)?;
    let mut candidate = consolidator
        .lookup(&args.id1, &args.id2)
        .map_err(|err| fail(output, err))?;

    for item in [&candidate.item1, &candidate.item2] {
        if !item.is_consolidation_eligible() {
            render_error(
                output,
                &CliError::new(format!(
                    "item '{}' is {} and cannot be consolidated",
                    item.id, item.status
                )),
            )?;
            anyhow::bail!("item {} is not eligible for consolidation", item.id);
        }
    }
    if let Some(strategy) = strategy {
        candidate.strategy = strategy;
    }

    let approved = if args.yes {
        true
    } else {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut prompt_out: Box<dyn Write> = if output.is_json() {
            Box::new(io::stderr())
        } else {
            Box::new(io::stdout())
        };
        write_candidate(&mut *prompt_out, None, &CandidateOutput::from(&candidate))?;
        let question = format!("Apply {}?", candidate.strategy);
        prompt(&mut input, &mut *prompt_out, &question, false)? == Answer::Yes
    };

    let (applied, archived_path) = match consolidator.perform_consolidation(&candidate, approved) {
        Ok(Outcome::Merged { archive_path, .. }) => {
            (true, Some(archive_path.display().to_string()))
        }
        Ok(Outcome::Linked { .. }) => (true, None),
        Err(ConsolidationError::ApprovalDenied { .. }) => (false, None),
        Err(err) => return Err(fail(output, err)),
    };

    let result = MergeOutput {
        candidate: CandidateOutput::from(&candidate),
        applied,
        archived_path,
    };
    render(output, &result, render_human)
}

fn render_human(result: &MergeOutput, w: &mut dyn Write) -> io::Result<()> {
    let c = &result.candidate;
    rule(w)?;
    kv(w, "primary", format!("{}  {}", c.item1.id, c.item1.summary))?;
    kv(w, "secondary", format!("{}  {}", c.item2.id, c.item2.summary))?;
    kv(w, "score", format!("{:.2}", c.score))?;
    kv(w, "strategy", format!("{} ({})", c.strategy, c.action))?;
    if !c.reason.is_empty() {
        kv(w, "reason", &c.reason)?;
    }
    rule(w)?;
    if !result.applied {
        return writeln!(w, "Not applied.");
    }
    match &result.archived_path {
        Some(path) => writeln!(
            w,
            "Merged {} into {} (archived at {path}).",
            c.item2.id, c.item1.id
        ),
        None => writeln!(w, "Linked {} and {}.", c.item1.id, c.item2.id),
    }
}
