//! Stackcraft: tailored configuration for AI coding tools.
//!
//! Given a snapshot of a project's technology stack, Stackcraft recommends the
//! specialist agents and coding rules worth having, renders them in the native
//! file layout of each supported tool, and audits the configuration files a
//! project already has.
//!
//! # Pipeline
//!
//! 1. **Recommend** ([`plugins::recommend`]): score agent and rule templates
//!    against the snapshot; keep what clears the confidence threshold.
//! 2. **Serialize** ([`plugins::adapters`]): lay recommendations out per
//!    destination and enforce that destination's size contract.
//! 3. **Analyze**: structural validation ([`core::validate`]), agent conflicts
//!    ([`plugins::fixer`]), and stale artifacts ([`plugins::prune`]).
//!
//! Every stage is a pure function of its inputs; the CLI in this file is the only
//! place that reads the project tree or writes files.
//!
//! # Examples
//!
//! ```bash
//! # What would be recommended for this project?
//! stackcraft recommend --snapshot snapshot.json
//!
//! # Render Cursor and Codex files and write them out
//! stackcraft generate --snapshot snapshot.json --tool cursor --tool codex --write
//!
//! # Audit what is already checked in
//! stackcraft validate
//! stackcraft fix
//! stackcraft prune
//! ```

pub mod core;
pub mod plugins;

use core::config;
use core::contract::DestinationTool;
use core::error::StackError;
use core::globs::ProjectFiles;
use core::reporter::{Diagnostic, DiagnosticLevel, Reporter};
use core::snapshot::{self, ExistingArtifact};
use core::{output, validate, workspace};
use plugins::{adapters, fixer, prune, recommend};

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Set to `1` to print trace diagnostics (templates below threshold and similar).
pub const TRACE_ENV: &str = "STACKCRAFT_TRACE";

#[derive(Parser, Debug)]
#[clap(
    name = "stackcraft",
    version = env!("CARGO_PKG_VERSION"),
    about = "Recommend, generate, and audit AI coding tool configuration"
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct ProjectArgs {
    /// Project root (defaults to current working directory).
    #[clap(short, long)]
    dir: Option<PathBuf>,
    /// Output format: 'text' or 'json'.
    #[clap(long, default_value = "text")]
    format: String,
}

#[derive(clap::Args, Debug)]
struct AuditCli {
    #[clap(flatten)]
    project: ProjectArgs,
    /// Read existing artifacts from this snapshot instead of scanning the project.
    #[clap(long)]
    snapshot: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct RecommendCli {
    #[clap(flatten)]
    project: ProjectArgs,
    /// Tech stack snapshot (JSON).
    #[clap(long)]
    snapshot: PathBuf,
}

#[derive(clap::Args, Debug)]
struct GenerateCli {
    #[clap(flatten)]
    project: ProjectArgs,
    /// Tech stack snapshot (JSON).
    #[clap(long)]
    snapshot: PathBuf,
    /// Destination tool key; repeat for several. Defaults to every destination.
    #[clap(long = "tool")]
    tools: Vec<String>,
    /// Write artifacts under the project root.
    #[clap(long)]
    write: bool,
    /// Overwrite files that already exist.
    #[clap(long)]
    force: bool,
    /// Show what would be written without writing.
    #[clap(long)]
    dry_run: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score agents and rules for a snapshot
    Recommend(RecommendCli),
    /// Render recommendations into destination files
    Generate(GenerateCli),
    /// Check existing artifacts against their destination contract
    Validate(AuditCli),
    /// Find overlapping, vague, or duplicated agent definitions
    Fix(AuditCli),
    /// List artifacts that are empty or only target missing files
    Prune(AuditCli),
    /// List supported destinations and their size limits
    Destinations {
        /// Output format: 'text' or 'json'.
        #[clap(long, default_value = "text")]
        format: String,
    },
    /// Print version
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

fn parse_format(raw: &str) -> Result<Format, StackError> {
    match raw {
        "text" => Ok(Format::Text),
        "json" => Ok(Format::Json),
        other => Err(StackError::ConfigError(format!(
            "unsupported format '{}': expected 'text' or 'json'",
            other
        ))),
    }
}

fn emit<T: Serialize>(format: Format, value: &T, text: impl FnOnce() -> String) -> Result<(), StackError> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(value)?),
        Format::Text => print!("{}", text()),
    }
    Ok(())
}

/// Prints warnings to stderr; traces only when `STACKCRAFT_TRACE=1`.
struct ConsoleReporter {
    trace: bool,
}

impl ConsoleReporter {
    fn from_env() -> Self {
        Self {
            trace: std::env::var(TRACE_ENV).ok().as_deref() == Some("1"),
        }
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic.level {
            DiagnosticLevel::Warning => eprintln!(
                "{} {}: {}",
                "⚠".bright_yellow(),
                diagnostic.source.bright_white(),
                diagnostic.message
            ),
            DiagnosticLevel::Trace if self.trace => {
                eprintln!("trace: {}: {}", diagnostic.source, diagnostic.message)
            }
            DiagnosticLevel::Trace => {}
        }
    }
}

fn project_root(dir: Option<PathBuf>) -> Result<PathBuf, StackError> {
    let root = match dir {
        Some(d) => d,
        None => std::env::current_dir()?,
    };
    if !root.is_dir() {
        return Err(StackError::NotFound(format!(
            "project directory {}",
            root.display()
        )));
    }
    Ok(root)
}

fn load_artifacts(
    root: &Path,
    files: &ProjectFiles,
    snapshot_path: Option<&Path>,
) -> Result<Vec<ExistingArtifact>, StackError> {
    match snapshot_path {
        Some(path) => Ok(snapshot::load_snapshot(path)?.existing_artifacts),
        None => workspace::discover_artifacts(root, files),
    }
}

fn selected_tools(keys: &[String]) -> Result<Vec<DestinationTool>, StackError> {
    if keys.is_empty() {
        return Ok(DestinationTool::ALL.to_vec());
    }
    let mut tools = Vec::new();
    for key in keys {
        let tool = DestinationTool::from_key(key)?;
        if !tools.contains(&tool) {
            tools.push(tool);
        }
    }
    Ok(tools)
}

fn run_recommend(cli: RecommendCli) -> Result<(), StackError> {
    let format = parse_format(&cli.project.format)?;
    let root = project_root(cli.project.dir)?;
    let policy = config::load_policy(&root)?;
    let snapshot = snapshot::load_snapshot(&cli.snapshot)?;
    let recs = recommend::recommend(&snapshot, &policy, &ConsoleReporter::from_env());
    emit(format, &recs, || output::render_recommendations(&recs))
}

fn run_generate(cli: GenerateCli) -> Result<(), StackError> {
    let format = parse_format(&cli.project.format)?;
    let root = project_root(cli.project.dir)?;
    let policy = config::load_policy(&root)?;
    let snapshot = snapshot::load_snapshot(&cli.snapshot)?;
    let tools = selected_tools(&cli.tools)?;
    let recs = recommend::recommend(&snapshot, &policy, &ConsoleReporter::from_env());

    let outputs: Vec<adapters::SerializationOutput> = tools
        .into_iter()
        .map(|tool| adapters::serialize_for(tool, &snapshot, &recs))
        .collect();
    emit(format, &outputs, || output::render_serialization(&outputs))?;

    if cli.write || cli.dry_run {
        let opts = workspace::WriteOptions {
            target_dir: root,
            force: cli.force,
            dry_run: cli.dry_run,
        };
        for out in &outputs {
            for outcome in workspace::write_artifacts(&opts, &out.artifacts)? {
                let label = match outcome.action {
                    workspace::WriteAction::Wrote => "wrote".bright_green(),
                    workspace::WriteAction::WouldWrite => "would-write".bright_cyan(),
                    workspace::WriteAction::Skipped => "skipped (exists; pass --force)".bright_yellow(),
                };
                eprintln!("  {}: {}", label, outcome.relative_path);
            }
        }
    }
    Ok(())
}

fn run_validate(cli: AuditCli) -> Result<(), StackError> {
    let format = parse_format(&cli.project.format)?;
    let root = project_root(cli.project.dir)?;
    let files = ProjectFiles::from_root(&root)?;
    let artifacts = load_artifacts(&root, &files, cli.snapshot.as_deref())?;
    let report = validate::validate(&artifacts, &files);
    emit(format, &report, || output::render_validation(&report))?;
    if report.is_clean() {
        Ok(())
    } else {
        Err(StackError::ValidationError(format!(
            "{} of {} artifacts failed validation",
            report.found - report.valid,
            report.found
        )))
    }
}

fn run_fix(cli: AuditCli) -> Result<(), StackError> {
    let format = parse_format(&cli.project.format)?;
    let root = project_root(cli.project.dir)?;
    let policy = config::load_policy(&root)?;
    let files = ProjectFiles::from_root(&root)?;
    let artifacts = load_artifacts(&root, &files, cli.snapshot.as_deref())?;
    let report = fixer::analyze(&artifacts, &policy);
    emit(format, &report, || output::render_conflicts(&report))
}

fn run_prune(cli: AuditCli) -> Result<(), StackError> {
    let format = parse_format(&cli.project.format)?;
    let root = project_root(cli.project.dir)?;
    let policy = config::load_policy(&root)?;
    let files = ProjectFiles::from_root(&root)?;
    let artifacts = load_artifacts(&root, &files, cli.snapshot.as_deref())?;
    let report = prune::find_candidates(&artifacts, &files, &policy);
    emit(format, &report, || output::render_prune(&report))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DestinationInfo {
    key: &'static str,
    label: &'static str,
    size_unit: core::contract::SizeUnit,
    max_size: Option<usize>,
}

fn run_destinations(format: &str) -> Result<(), StackError> {
    let format = parse_format(format)?;
    let infos: Vec<DestinationInfo> = adapters::ADAPTERS
        .iter()
        .map(|a| {
            let contract = a.tool.contract();
            DestinationInfo {
                key: a.tool.key(),
                label: a.label,
                size_unit: contract.size_unit,
                max_size: contract.max_size,
            }
        })
        .collect();
    emit(format, &infos, || {
        infos
            .iter()
            .map(|i| match i.max_size {
                Some(max) => format!("{:<10} {} (max {} {})\n", i.key, i.label, max, i.size_unit),
                None => format!("{:<10} {}\n", i.key, i.label),
            })
            .collect()
    })
}

/// Parse the command line and run one command.
pub fn run() -> Result<(), StackError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Version => {
            println!("v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::Recommend(c) => run_recommend(c),
        Command::Generate(c) => run_generate(c),
        Command::Validate(c) => run_validate(c),
        Command::Fix(c) => run_fix(c),
        Command::Prune(c) => run_prune(c),
        Command::Destinations { format } => run_destinations(&format),
    }
}
