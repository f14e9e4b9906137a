use polars::prelude::*;
use rayon::prelude::*;
use std::collections::HashMap;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{MatchStatus, MatchStrategy};
use crate::services::excel::{BODY_COLUMN, CODE_COLUMN};

pub const MATCH_COLUMN: &str = "body match (%)";

/// Annotates every input row with a match classification against the
/// reference chart. The comparison is the O(n x m) hot spot, so rows fan out
/// across the rayon pool.
pub fn annotate_matches(
    mut df: DataFrame,
    reference: &DataFrame,
    config: &Config,
) -> Result<DataFrame, AppError> {
    if reference.height() == 0 {
        return Err(AppError::EmptyReference);
    }

    let input_names = string_column(&df, BODY_COLUMN)?;

    let annotations = match config.match_strategy {
        MatchStrategy::Fuzzy => {
            let reference_names: Vec<String> = string_column(reference, BODY_COLUMN)?
                .iter()
                .map(|name| normalize_name(name))
                .collect();

            input_names
                .par_iter()
                .map(|name| {
                    let name = normalize_name(name);
                    let best = reference_names
                        .iter()
                        .map(|reference_name| similarity(&name, reference_name))
                        .max()
                        .unwrap_or(0);
                    format!("{} ({}%)", classify(best, config.match_threshold), best)
                })
                .collect::<Vec<String>>()
        }
        MatchStrategy::ExactByCode => {
            let reference_codes = string_column(reference, CODE_COLUMN)?;
            let reference_names = string_column(reference, BODY_COLUMN)?;

            let mut by_code: HashMap<&str, Vec<String>> = HashMap::new();
            for (code, name) in reference_codes.iter().zip(reference_names.iter()) {
                by_code.entry(code.as_str()).or_default().push(normalize_name(name));
            }

            let input_codes = string_column(&df, CODE_COLUMN)?;
            input_codes
                .par_iter()
                .zip(input_names.par_iter())
                .map(|(code, name)| {
                    let name = normalize_name(name);
                    let matched = by_code
                        .get(code.as_str())
                        .map_or(false, |names| names.iter().any(|candidate| candidate == &name));
                    let status = if matched { MatchStatus::Match } else { MatchStatus::Review };
                    status.to_string()
                })
                .collect::<Vec<String>>()
        }
    };

    df.with_column(Series::new(MATCH_COLUMN, annotations))?;
    Ok(df)
}

/// Normalized-Levenshtein similarity scaled to [0,100]; 100 means identical
/// after normalization.
fn similarity(a: &str, b: &str) -> u32 {
    (strsim::normalized_levenshtein(a, b) * 100.0).round() as u32
}

fn classify(score: u32, threshold: u32) -> MatchStatus {
    if score >= threshold {
        MatchStatus::Match
    } else {
        MatchStatus::Review
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<String>, AppError> {
    let column = df
        .column(name)
        .map_err(|_| AppError::MissingColumn(name.to_string()))?;
    Ok(column
        .str()?
        .into_iter()
        .map(|value| value.unwrap_or("").to_string())
        .collect())
}
