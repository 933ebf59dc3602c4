//! tagprune CLI - translation tag audit and pruning for SQL dumps.
//!
//! Features:
//! - Audit: unused tag constants and missing translations, written as JSON and Markdown
//! - Prune: rewrites the dump keeping only referenced tags and their translations
//! - Optional tagprune.toml for dump location, report directory and scan rules
//! - Rayon-powered parallel source scanning

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use tagprune_core::{
    init_structured_logging, log_error, print_json, print_plain, PruneOutcome, Tagprune,
    TagpruneError,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Translation tag audit and prune tool for SQL dumps")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report unused constants and missing translations
    Audit {
        #[command(flatten)]
        project: ProjectArgs,

        /// Output the report in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Remove unused constants and their translations from the dump
    Prune {
        #[command(flatten)]
        project: ProjectArgs,

        /// Show what would be removed without touching the dump
        #[arg(long)]
        dry_run: bool,

        /// Output the prune summary in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct ProjectArgs {
    /// Project root containing the dump and the source tree
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Explicit config file instead of <root>/tagprune.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Dump file, overriding the config (relative to the root)
    #[arg(long, value_name = "FILE")]
    dump: Option<PathBuf>,
}

impl ProjectArgs {
    fn session(&self) -> Result<Tagprune> {
        let session = match &self.config {
            Some(path) => Tagprune::with_config_file(&self.root, path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => Tagprune::discover(&self.root)
                .with_context(|| format!("Failed to load config from: {}", self.root.display()))?,
        };
        Ok(match &self.dump {
            Some(dump) => session.dump(dump),
            None => session,
        })
    }
}

fn run_audit(project: &ProjectArgs, json: bool) -> Result<()> {
    let session = project.session()?;
    let audit = session
        .audit()
        .with_context(|| format!("Audit failed for: {}", session.dump_path().display()))?;
    let paths = session
        .write_reports(&audit.report)
        .context("Failed to write audit reports")?;

    if json {
        print_json(&audit.report);
        return Ok(());
    }

    print_plain(&audit.report);
    for stats in audit.parse_stats.iter().filter(|s| s.skipped > 0) {
        println!(
            "\n[WARN] {}: skipped {} unreadable row(s)",
            stats.table, stats.skipped
        );
    }
    println!("\nFiles scanned: {}", audit.files_scanned);
    println!("JSON report:     {}", paths.json.display());
    println!("Markdown report: {}", paths.markdown.display());
    Ok(())
}

fn print_prune_summary(outcome: &PruneOutcome) {
    println!("=== Translation Prune ===\n");
    println!("Dump: {}", outcome.dump_path.display());
    println!(
        "Used tags: {} of {}",
        outcome.used_tags, outcome.total_tags
    );

    for table in &outcome.result.tables {
        println!(
            "- {}: kept {}, dropped {}, skipped {}{}",
            table.table,
            table.kept,
            table.dropped,
            table.skipped,
            if table.rewritten { "" } else { " (unchanged)" }
        );
    }

    if !outcome.result.changed {
        println!("\nNothing to prune.");
    } else if outcome.dry_run {
        println!("\n[DRY RUN] Dump left untouched.");
    } else {
        println!("\nDump rewritten.");
    }
    println!("sha256 before: {}", outcome.result.input_sha256);
    println!("sha256 after:  {}", outcome.result.output_sha256);
}

fn run_prune(project: &ProjectArgs, dry_run: bool, json: bool) -> Result<()> {
    let session = project.session()?.dry_run(dry_run);
    let outcome = session
        .prune()
        .with_context(|| format!("Prune failed for: {}", session.dump_path().display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_prune_summary(&outcome);
    }
    Ok(())
}

/// Extra guidance for failures the user can act on.
fn failure_hint(err: &anyhow::Error) -> Option<String> {
    let err = err.downcast_ref::<TagpruneError>()?;
    if err.is_dump_structure() {
        return Some("The dump was left untouched. Check that it is a complete export.".into());
    }
    err.path()
        .map(|path| format!("Check that {} exists and is readable.", path.display()))
}

fn main() -> Result<()> {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] tagprune internal error: {}", info);
        eprintln!("[PANIC] The process will exit with a non-zero status.");
    }));

    // JSON to stderr, respects RUST_LOG
    init_structured_logging();

    let cli = Cli::parse();
    let result = match &cli.command {
        Command::Audit { project, json } => run_audit(project, *json),
        Command::Prune {
            project,
            dry_run,
            json,
        } => run_prune(project, *dry_run, *json),
    };
    if let Err(e) = &result {
        log_error(&format!("{:#}", e));
        if let Some(hint) = failure_hint(e) {
            eprintln!("[HINT] {}", hint);
        }
    }
    result
}
