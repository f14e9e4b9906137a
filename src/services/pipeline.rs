use polars::prelude::*;
use std::path::Path;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{ProgressStage, RunSummary};
use crate::services::excel::{loader, BODY_COLUMN};
use crate::services::html_cleaner::{clean_html, CleanOptions};
use crate::services::matcher::MATCH_COLUMN;
use crate::services::{filter, matcher, resolver};

#[derive(Debug)]
pub struct ReconOutcome {
    pub table: DataFrame,
    pub summary: RunSummary,
}

/// Runs the whole reconciliation as one sequential unit of work. Progress is
/// reported at coarse milestones; any stage error aborts the run and nothing
/// is handed to the writer.
pub fn run(
    input_path: &Path,
    chart_path: &Path,
    config: &Config,
    mut progress: impl FnMut(ProgressStage, u8),
) -> Result<ReconOutcome, AppError> {
    progress(ProgressStage::LoadInput, 5);
    tracing::info!("loading input roster from {}", input_path.display());
    let mut input = loader::load_input(input_path, config)?;
    let rows_in = input.height();
    progress(ProgressStage::NormalizeSchema, 35);

    tracing::info!("loading reference chart from {}", chart_path.display());
    let mut reference = loader::load_reference(chart_path, config)?;

    let clean_options = CleanOptions { strip_semicolons: config.strip_semicolons };
    clean_body_column(&mut input, clean_options)?;
    clean_body_column(&mut reference, clean_options)?;
    progress(ProgressStage::LoadReference, 50);

    let input = filter::filter_and_clean(input, config)?;
    progress(ProgressStage::FilterSentinels, 65);

    let input = matcher::annotate_matches(input, &reference, config)?;
    progress(ProgressStage::Match, 80);

    let table = resolver::resolve(input, &reference)?;
    progress(ProgressStage::Resolve, 95);

    let summary = summarize(&table, rows_in)?;
    tracing::info!(
        "reconciled {} rows ({} matched, {} for review, {} dropped)",
        summary.rows_out,
        summary.matched,
        summary.review,
        summary.rows_dropped
    );
    progress(ProgressStage::Done, 100);

    Ok(ReconOutcome { table, summary })
}

fn clean_body_column(df: &mut DataFrame, options: CleanOptions) -> Result<(), AppError> {
    let cleaned: Vec<String> = df
        .column(BODY_COLUMN)?
        .str()?
        .into_iter()
        .map(|value| clean_html(value.unwrap_or(""), options))
        .collect();
    df.replace(BODY_COLUMN, Series::new(BODY_COLUMN, cleaned))?;
    Ok(())
}

fn summarize(table: &DataFrame, rows_in: usize) -> Result<RunSummary, AppError> {
    let rows_out = table.height();
    let matched = table
        .column(MATCH_COLUMN)?
        .str()?
        .into_iter()
        .filter(|value| value.map_or(false, |v| v.starts_with("MATCH")))
        .count();

    Ok(RunSummary {
        rows_in,
        rows_out,
        rows_dropped: rows_in - rows_out,
        matched,
        review: rows_out - matched,
    })
}
