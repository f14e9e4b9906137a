use anyhow::{bail, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

mod config;
mod error;
mod logging;
mod models;
mod services;

use error::AppError;
use services::excel;
use services::pipeline;

/// Reconciles a roster of public-body records against a reference chart of
/// canonical names and policy recommendation codes.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Input roster workbook (.xls, .xlsx, .xlsm); first sheet is used.
    input: PathBuf,

    /// Reference chart workbook with code, public_body and recommendation
    /// columns.
    chart: PathBuf,

    /// Where to write the result workbook; `.xlsx` is appended if missing.
    #[arg(short, long)]
    out: PathBuf,

    /// Match strategy override: fuzzy | exact.
    #[arg(long)]
    strategy: Option<String>,

    /// Fuzzy score (0-100) at or above which a row counts as MATCH.
    #[arg(long)]
    threshold: Option<u32>,

    /// Also write the run summary as JSON to this path.
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Suppress the progress bar.
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    logging::init_logging()?;

    let args = Args::parse();

    // Load configuration, then apply CLI overrides
    let mut config = config::Config::new()?;
    if let Some(strategy) = &args.strategy {
        config.match_strategy = strategy.parse().map_err(AppError::Config)?;
    }
    if let Some(threshold) = args.threshold {
        if threshold > 100 {
            bail!("--threshold must be in 0..=100, got {}", threshold);
        }
        config.match_threshold = threshold;
    }

    // Both files must exist before a run starts.
    for path in [&args.input, &args.chart] {
        if !path.is_file() {
            bail!("file not found: {}", path.display());
        }
    }

    let bar = if args.quiet {
        None
    } else {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.cyan/blue}] {pos}% {msg}")
                .unwrap()
                .progress_chars("=> "),
        );
        Some(bar)
    };

    let result = pipeline::run(&args.input, &args.chart, &config, |stage, pct| {
        tracing::debug!("{} ({}%)", stage.label(), pct);
        if let Some(bar) = &bar {
            bar.set_position(pct as u64);
            bar.set_message(stage.label());
        }
    });

    let outcome = match result {
        Ok(outcome) => {
            if let Some(bar) = &bar {
                bar.finish_with_message("done");
            }
            outcome
        }
        Err(e) => {
            // Reset the indicator to its initial state before surfacing.
            if let Some(bar) = &bar {
                bar.reset();
                bar.abandon_with_message("failed");
            }
            tracing::error!("processing failed: {}", e);
            return Err(e.into());
        }
    };

    let written = excel::write_xlsx(&outcome.table, &args.out)?;
    tracing::info!(
        "saved {} ({} rows, {} matched, {} for review)",
        written.display(),
        outcome.summary.rows_out,
        outcome.summary.matched,
        outcome.summary.review
    );

    if let Some(path) = &args.summary_json {
        std::fs::write(path, serde_json::to_string_pretty(&outcome.summary)?)?;
        tracing::info!("wrote run summary to {}", path.display());
    }

    Ok(())
}
