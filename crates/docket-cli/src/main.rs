#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "docket: markdown work tracker with similarity-driven consolidation",
    long_about = None
)]
struct Cli {
    /// Enable debug logging for docket crates (overridden by DOCKET_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Tracker root containing the items directory (default: current directory).
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    const fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "List consolidation candidates",
        long_about = "Compare every pair of open items of the same type and list the pairs \
                      scoring above the acceptance threshold, best first. Nothing is modified.",
        after_help = "EXAMPLES:\n    # Show all candidates\n    dk analyze\n\n    # Top five only\n    dk analyze --limit 5\n\n    # Include weaker matches\n    dk analyze --min-score 0.4\n\n    # Emit machine-readable output\n    dk analyze --json"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        about = "Review candidates one at a time",
        long_about = "Walk the ranked candidates and ask for each whether to consolidate it. \
                      Answer y to apply, n to leave the pair alone, s to stop reviewing.",
        after_help = "EXAMPLES:\n    # Review candidates\n    dk interactive\n\n    # Review with a JSON summary on stdout (prompts go to stderr)\n    dk interactive --json"
    )]
    Interactive,

    #[command(
        about = "Consolidate two specific items",
        long_about = "Score the named pair directly and apply the resulting strategy. \
                      IDs may be given as unique prefixes.",
        after_help = "EXAMPLES:\n    # Merge or link, asking first\n    dk merge add-cache cache-layer\n\n    # Force a reference link without prompting\n    dk merge add-cache cache-layer --strategy reference_only --yes"
    )]
    Merge(cmd::merge::MergeArgs),

    #[command(
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    dk completions bash\n\n    # Generate zsh completions\n    dk completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("DOCKET_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "docket=debug,dk=debug,info"
        } else {
            "docket=info,dk=info,warn"
        })
    });

    let format = env::var("DOCKET_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project_root = match cli.root.clone() {
        Some(root) => root,
        None => env::current_dir()?,
    };
    let output = cli.output_mode();
    debug!(root = %project_root.display(), "starting");

    match cli.command {
        Commands::Analyze(ref args) => cmd::analyze::run_analyze(args, output, &project_root),
        Commands::Interactive => cmd::interactive::run_interactive(output, &project_root),
        Commands::Merge(ref args) => cmd::merge::run_merge(args, output, &project_root),
        Commands::Completions(ref args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}
