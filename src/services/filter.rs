use polars::prelude::*;

use crate::config::Config;
use crate::error::AppError;

/// Removes rows where every sentinel column holds the sentinel value, then
/// blanks the sentinel cells of the surviving rows. The removal mask is
/// computed from the original values; clearing first would change which rows
/// get dropped.
pub fn filter_and_clean(df: DataFrame, config: &Config) -> Result<DataFrame, AppError> {
    if config.sentinel_columns.is_empty() {
        return Ok(df);
    }

    let mut sentinel_values: Vec<Vec<String>> = Vec::with_capacity(config.sentinel_columns.len());
    for name in &config.sentinel_columns {
        let column = df
            .column(name)
            .map_err(|_| AppError::MissingColumn(name.clone()))?;
        sentinel_values.push(
            column
                .str()?
                .into_iter()
                .map(|value| value.unwrap_or("").to_string())
                .collect(),
        );
    }

    let keep: Vec<bool> = (0..df.height())
        .map(|row| {
            !sentinel_values
                .iter()
                .all(|column| column[row] == config.sentinel_value)
        })
        .collect();

    let mask = BooleanChunked::from_slice("keep", &keep);
    let mut filtered = df.filter(&mask)?;
    let dropped = df.height() - filtered.height();
    if dropped > 0 {
        tracing::info!("dropped {} all-sentinel rows", dropped);
    }

    for name in &config.sentinel_columns {
        let cleared: Vec<String> = filtered
            .column(name)?
            .str()?
            .into_iter()
            .map(|value| match value {
                Some(value) if value == config.sentinel_value => String::new(),
                Some(value) => value.to_string(),
                None => String::new(),
            })
            .collect();
        filtered.replace(name, Series::new(name, cleared))?;
    }

    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        let mut config = Config::default();
        config.sentinel_columns = vec![
            "department of education".to_string(),
            "state board".to_string(),
            "state superintendent".to_string(),
            "superintendent of public instruction".to_string(),
        ];
        config
    }

    fn frame(rows: &[[&str; 4]]) -> DataFrame {
        let columns = config().sentinel_columns;
        DataFrame::new(
            columns
                .iter()
                .enumerate()
                .map(|(idx, name)| {
                    Series::new(name, rows.iter().map(|row| row[idx]).collect::<Vec<_>>())
                })
                .collect(),
        )
        .unwrap()
    }

    fn cell(df: &DataFrame, name: &str, row: usize) -> String {
        df.column(name).unwrap().str().unwrap().get(row).unwrap().to_string()
    }

    #[test]
    fn all_sentinel_rows_are_removed() {
        let df = frame(&[["N", "N", "N", "N"], ["N", "Board kept", "N", "N"]]);
        let filtered = filter_and_clean(df, &config()).unwrap();
        assert_eq!(filtered.height(), 1);
        assert_eq!(cell(&filtered, "state board", 0), "Board kept");
    }

    #[test]
    fn partial_sentinel_cells_are_cleared_not_dropped() {
        let df = frame(&[["N", "N", "N", "Dr. Smith"]]);
        let filtered = filter_and_clean(df, &config()).unwrap();
        assert_eq!(filtered.height(), 1);
        assert_eq!(cell(&filtered, "department of education", 0), "");
        assert_eq!(cell(&filtered, "state board", 0), "");
        assert_eq!(cell(&filtered, "state superintendent", 0), "");
        assert_eq!(cell(&filtered, "superintendent of public instruction", 0), "Dr. Smith");
    }

    #[test]
    fn comparison_is_case_sensitive_and_exact() {
        let df = frame(&[["n", "N", "N", "N"], ["No", "N", "N", "N"]]);
        let filtered = filter_and_clean(df, &config()).unwrap();
        // Neither row is all-sentinel: "n" and "No" are not the marker.
        assert_eq!(filtered.height(), 2);
        assert_eq!(cell(&filtered, "department of education", 0), "n");
        assert_eq!(cell(&filtered, "department of education", 1), "No");
    }

    #[test]
    fn is_idempotent() {
        let df = frame(&[
            ["N", "N", "N", "N"],
            ["N", "Board", "N", "N"],
            ["a", "b", "c", "d"],
        ]);
        let once = filter_and_clean(df, &config()).unwrap();
        let twice = filter_and_clean(once.clone(), &config()).unwrap();
        assert!(once.equals(&twice));
    }

    #[test]
    fn filtering_sees_original_values_not_cleared_ones() {
        // If clearing ran first, no row would ever be all-sentinel and this
        // row would survive.
        let df = frame(&[["N", "N", "N", "N"]]);
        let filtered = filter_and_clean(df, &config()).unwrap();
        assert_eq!(filtered.height(), 0);
    }

    #[test]
    fn missing_sentinel_column_fails_hard() {
        let df = DataFrame::new(vec![Series::new("state board", vec!["N"])]).unwrap();
        let err = filter_and_clean(df, &config()).unwrap_err();
        assert!(matches!(err, AppError::MissingColumn(_)));
    }
}
