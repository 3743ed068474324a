pub mod analyze;
pub mod completions;
pub mod interactive;
pub mod merge;

use crate::output::{CliError, OutputMode, render_error};
use docket_consolidate::{ConsolidationCandidate, Consolidator, Rules};
use docket_core::config::{ProjectConfig, load_project_config};
use docket_core::error::ErrorCode;
use docket_core::model::{ItemType, Schedule, WorkItem};
use docket_core::storage::MarkdownStore;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Load `.docket/config.toml`, reporting parse/validation failures with
/// their error code.
pub fn load_config(output: OutputMode, project_root: &Path) -> anyhow::Result<ProjectConfig> {
    load_project_config(project_root).map_err(|err| {
        let code = ErrorCode::ConfigParseError;
        let _ = render_error(
            output,
            &CliError {
                message: format!("{err:#}"),
                suggestion: code.hint().map(str::to_string),
                error_code: Some(code.code().to_string()),
            },
        );
        err
    })
}

/// Open the markdown store under `project_root` with rules from config.
pub fn open_consolidator(
    output: OutputMode,
    project_root: &Path,
    min_score: Option<f64>,
) -> anyhow::Result<Consolidator<MarkdownStore>> {
    let config = load_config(output, project_root)?;
    let store = MarkdownStore::open(project_root, &config.storage).map_err(|err| {
        let code = err.code();
        let _ = render_error(
            output,
            &CliError {
                message: err.to_string(),
                suggestion: code.hint().map(str::to_string),
                error_code: Some(code.code().to_string()),
            },
        );
        anyhow::Error::new(err)
    })?;

    let mut consolidation = config.consolidation;
    if let Some(min_score) = min_score {
        consolidation.acceptance_threshold = min_score.clamp(0.0, 1.0);
    }
    Ok(Consolidator::new(store, Rules::new(consolidation)))
}

// ---------------------------------------------------------------------------
// Shared JSON shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ItemRef {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub summary: String,
    pub schedule: Schedule,
    pub path: String,
}

impl From<&WorkItem> for ItemRef {
    fn from(item: &WorkItem) -> Self {
        Self {
            id: item.id.clone(),
            item_type: item.item_type,
            summary: item.summary.clone(),
            schedule: item.schedule,
            path: item.path.display().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateOutput {
    pub item1: ItemRef,
    pub item2: ItemRef,
    pub score: f64,
    pub strategy: docket_consolidate::MergeStrategy,
    pub action: docket_consolidate::MergeAction,
    pub reason: String,
    pub breakdown: docket_consolidate::SubScores,
}

impl From<&ConsolidationCandidate> for CandidateOutput {
    fn from(candidate: &ConsolidationCandidate) -> Self {
        Self {
            item1: ItemRef::from(&candidate.item1),
            item2: ItemRef::from(&candidate.item2),
            score: candidate.score,
            strategy: candidate.strategy,
            action: candidate.action(),
            reason: candidate.reason.clone(),
            breakdown: candidate.breakdown,
        }
    }
}

/// Multi-line human description of one candidate.
pub fn write_candidate(
    w: &mut dyn Write,
    index: Option<usize>,
    candidate: &CandidateOutput,
) -> io::Result<()> {
    let prefix = index.map(|i| format!("{i}. ")).unwrap_or_default();
    writeln!(
        w,
        "{prefix}{} <-> {}  score {:.2}  {} ({})",
        candidate.item1.id,
        candidate.item2.id,
        candidate.score,
        candidate.strategy,
        candidate.action
    )?;
    writeln!(
        w,
        "   [{}] {}",
        candidate.item1.schedule, candidate.item1.summary
    )?;
    writeln!(
        w,
        "   [{}] {}",
        candidate.item2.schedule, candidate.item2.summary
    )?;
    if !candidate.reason.is_empty() {
        writeln!(w, "   {}", candidate.reason)?;
    }
    Ok(())
}

/// Answer to a consolidation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Quit,
}

/// Ask `question` until a recognizable answer arrives. End of input counts
/// as `Quit`.
pub fn prompt<R: BufRead + ?Sized>(
    input: &mut R,
    out: &mut dyn Write,
    question: &str,
    allow_quit: bool,
) -> io::Result<Answer> {
    let choices = if allow_quit {
        "[y]es / [n]o / [s]kip all"
    } else {
        "[y/N]"
    };
    loop {
        write!(out, "{question} {choices} ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(if allow_quit { Answer::Quit } else { Answer::No });
        }
        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(Answer::Yes),
            "n" | "no" => return Ok(Answer::No),
            "" if !allow_quit => return Ok(Answer::No),
            "s" | "skip" | "q" | "quit" if allow_quit => return Ok(Answer::Quit),
            other => writeln!(out, "unrecognized answer '{other}'")?,
        }
    }
}
