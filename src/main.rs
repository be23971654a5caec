use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result};
use tracing::{info, warn};

use svnchurn_core::ChurnConfig;
use svnchurn_diffstat::{parse_diffstat, DiffOutcome, DiffStat};
use svnchurn_store::{pending_revisions, persist_revision, Catalog};

#[derive(Parser)]
#[command(
    name = "svnchurn",
    version,
    about = "Per-revision line-delta extraction for mined SVN repositories",
    long_about = "svnchurn reads a catalog database produced by an upstream SVN mining tool,\n\
                  runs `svn diff | diffstat` for every revision not yet processed, and records\n\
                  one line-delta fact per changed file per commit.\n\n\
                  Examples:\n  \
                    svnchurn project.db               Process all pending revisions\n  \
                    svnchurn project.db 1500          Reprocess from revision 1500 onward\n  \
                    svnchurn project.db --format json Machine-readable run summary"
)]
struct Cli {
    /// Catalog database file (populated by the mining tool)
    database: PathBuf,

    /// Resume checkpoint: reprocess revisions committed at or after this
    /// revision's commit time
    checkpoint: Option<i64>,

    /// Path to configuration file (default: .svnchurn.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format for the run summary
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable summary
    Text,
    /// Machine-readable JSON with camelCase keys
    Json,
}

/// Counts accumulated over one run of the pipeline.
#[derive(Debug, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct RunSummary {
    revisions_processed: u64,
    revisions_timed_out: u64,
    facts_written: u64,
    records_skipped: u64,
}

/// The sequential pipeline: one revision at a time, in chronological order.
///
/// A timeout skips the revision for this run (the selector will re-offer it
/// next time, since no fact was written); a parse error aborts the whole
/// run, because it means the diffstat output contract changed.
async fn run_pipeline(
    catalog: &Catalog,
    config: &ChurnConfig,
    checkpoint: Option<i64>,
) -> Result<RunSummary, svnchurn_core::ChurnError> {
    let uri = catalog.repository_uri()?;
    let pending = pending_revisions(catalog, checkpoint, config.selector.max_files)?;
    info!(revisions = pending.len(), uri = %uri, "starting delta extraction");

    let diffstat = DiffStat::new(&config.diff, &uri);

    let progress = if std::io::stderr().is_terminal() {
        let pb = indicatif::ProgressBar::new(pending.len() as u64);
        pb.set_style(
            indicatif::ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} r{msg}")
                .unwrap(),
        );
        pb
    } else {
        indicatif::ProgressBar::hidden()
    };

    let mut summary = RunSummary::default();
    for revision in pending {
        progress.set_message(revision.rev.to_string());

        match diffstat.diff(revision.rev - 1, revision.rev).await? {
            DiffOutcome::TimedOut => {
                warn!(rev = revision.rev, "diff timed out; revision skipped for this run");
                summary.revisions_timed_out += 1;
            }
            DiffOutcome::Completed(stdout) => {
                let records = parse_diffstat(&stdout)?;
                info!(rev = revision.rev, files = records.len(), "parsed diffstat output");

                let stats = persist_revision(catalog, revision.rev, revision.commit_id, records)?;
                summary.facts_written += stats.facts_written;
                summary.records_skipped += stats.records_skipped;
                summary.revisions_processed += 1;
            }
        }

        progress.inc(1);
    }
    progress.finish_and_clear();

    Ok(summary)
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .init();
    }

    let config = match &cli.config {
        Some(path) => ChurnConfig::from_file(path).into_diagnostic()?,
        None => {
            let default_path = std::path::Path::new(".svnchurn.toml");
            if default_path.exists() {
                ChurnConfig::from_file(default_path).into_diagnostic()?
            } else {
                ChurnConfig::default()
            }
        }
    };

    // The catalog handle is owned here and dropped on every exit path.
    let catalog = Catalog::open(&cli.database).into_diagnostic()?;
    let summary = run_pipeline(&catalog, &config, cli.checkpoint)
        .await
        .into_diagnostic()?;

    match cli.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).into_diagnostic()?
            );
        }
        OutputFormat::Text => {
            println!(
                "Processed {} revisions ({} timed out)",
                summary.revisions_processed, summary.revisions_timed_out,
            );
            println!(
                "Facts written: {} ({} records skipped)",
                summary.facts_written, summary.records_skipped,
            );
        }
    }

    Ok(())
}
