use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use crosscheck::{check_folder, first_file, DirectorySource, TokenSet, DEFAULT_BATCH_SIZE};

#[derive(Parser)]
#[command(name = "crosscheck")]
#[command(about = "Extract the zip archives that contain any of a set of search strings")]
#[command(version)]
struct Cli {
    /// Folder holding the search-string file (its first file is used)
    search_folder: PathBuf,

    /// Folder of single-entry zip archives to check
    input_folder: PathBuf,

    /// Folder receiving extracted files
    output_folder: PathBuf,

    /// Archives handled per task
    #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Worker threads (defaults to 20 times the batch size)
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// Report file for archives without a match
    #[arg(short, long, default_value = crosscheck::DEFAULT_REPORT_FILE)]
    report: PathBuf,

    /// Give up waiting for tasks after this many seconds
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();
    crosscheck::logging::init(cli.verbose).context("Failed to initialize logging")?;
    tracing::info!(started_at = %chrono::Local::now(), "job started");

    for folder in [&cli.input_folder, &cli.search_folder, &cli.output_folder] {
        check_folder(folder)?;
    }

    let token_file = first_file(&cli.search_folder)?;
    let tokens = TokenSet::load(&token_file)
        .with_context(|| format!("Failed to load search strings from {}", token_file.display()))?;
    tracing::info!(file = %token_file.display(), tokens = tokens.len(), "search strings loaded");

    let mut builder = crosscheck::crosscheck()
        .tokens(tokens)
        .source(DirectorySource::new(&cli.input_folder))
        .output_dir(&cli.output_folder)
        .report_path(&cli.report)
        .batch_size(cli.batch_size);
    if let Some(workers) = cli.workers {
        builder = builder.workers(workers);
    }
    if let Some(secs) = cli.deadline_secs {
        builder = builder.deadline(Duration::from_secs(secs));
    }

    let summary = builder.run().context("Cross check failed")?;

    tracing::info!(
        archives = summary.archives,
        matched = summary.matched,
        missed = summary.unmatched,
        failed = summary.failed,
        run_ms = summary.duration.as_millis() as u64,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "job finished"
    );
    Ok(())
}
