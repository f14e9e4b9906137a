use polars::prelude::*;
use std::collections::HashMap;

use crate::error::AppError;
use crate::services::excel::{CODE_COLUMN, RECOMMENDATION_COLUMN};

/// Fallback recommendation for codes absent from the reference chart.
pub const DEFAULT_RECOMMENDATION: &str = "REVIEW";

/// Appends the recommendation column by looking each row's code up in the
/// reference chart. Duplicate reference codes resolve last-write-wins; rows
/// whose code is unknown get the default. Runs last so the column reflects
/// the exact row set being output.
pub fn resolve(mut df: DataFrame, reference: &DataFrame) -> Result<DataFrame, AppError> {
    let codes = reference
        .column(CODE_COLUMN)
        .map_err(|_| AppError::MissingColumn(CODE_COLUMN.to_string()))?
        .str()?;
    let recommendations = reference
        .column(RECOMMENDATION_COLUMN)
        .map_err(|_| AppError::MissingColumn(RECOMMENDATION_COLUMN.to_string()))?
        .str()?;

    let mut lookup: HashMap<String, String> = HashMap::new();
    for (code, recommendation) in codes.into_iter().zip(recommendations.into_iter()) {
        if let Some(code) = code {
            lookup.insert(code.to_string(), recommendation.unwrap_or("").to_string());
        }
    }

    let resolved: Vec<String> = df
        .column(CODE_COLUMN)
        .map_err(|_| AppError::MissingColumn(CODE_COLUMN.to_string()))?
        .str()?
        .into_iter()
        .map(|code| {
            code.and_then(|code| lookup.get(code))
                .cloned()
                .unwrap_or_else(|| DEFAULT_RECOMMENDATION.to_string())
        })
        .collect();

    df.with_column(Series::new(RECOMMENDATION_COLUMN, resolved))?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(codes: &[&str], recommendations: &[&str]) -> DataFrame {
        DataFrame::new(vec![
            Series::new(CODE_COLUMN, codes.to_vec()),
            Series::new(RECOMMENDATION_COLUMN, recommendations.to_vec()),
        ])
        .unwrap()
    }

    fn input(codes: &[&str]) -> DataFrame {
        DataFrame::new(vec![Series::new(CODE_COLUMN, codes.to_vec())]).unwrap()
    }

    fn recommendations(df: &DataFrame) -> Vec<String> {
        df.column(RECOMMENDATION_COLUMN)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap().to_string())
            .collect()
    }

    #[test]
    fn known_codes_resolve_from_the_chart() {
        let df = resolve(input(&["310"]), &reference(&["310"], &["Adopt policy 310"])).unwrap();
        assert_eq!(recommendations(&df), vec!["Adopt policy 310"]);
    }

    #[test]
    fn unknown_codes_default_to_review() {
        let df = resolve(input(&["999"]), &reference(&["310"], &["Adopt policy 310"])).unwrap();
        assert_eq!(recommendations(&df), vec![DEFAULT_RECOMMENDATION]);
    }

    #[test]
    fn duplicate_codes_are_last_write_wins() {
        let df = resolve(
            input(&["310"]),
            &reference(&["310", "310"], &["first", "second"]),
        )
        .unwrap();
        assert_eq!(recommendations(&df), vec!["second"]);
    }

    #[test]
    fn no_row_is_left_without_a_recommendation() {
        let df = resolve(
            input(&["310", "999", ""]),
            &reference(&["310"], &["Adopt policy 310"]),
        )
        .unwrap();
        for value in recommendations(&df) {
            assert!(!value.is_empty());
        }
    }
}
