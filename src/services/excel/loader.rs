use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;
use std::collections::HashSet;
use std::path::Path;

use super::utils::{canonical_code, cell_is_empty, coerce_cell, is_numeric_column, normalize_header};
use crate::config::Config;
use crate::error::AppError;
use crate::models::TextPolicy;

pub const CODE_COLUMN: &str = "code";
pub const BODY_COLUMN: &str = "public_body";
pub const RECOMMENDATION_COLUMN: &str = "recommendation";

/// Legacy exports carry the code under this name.
const CODE_ALIAS: &str = "number";

/// Loads the input roster: header row auto-detected, names lower-cased, junk
/// columns dropped, the `number` alias resolved to `code`. Fails hard when a
/// structurally required column is absent.
pub fn load_input(path: &Path, config: &Config) -> Result<DataFrame, AppError> {
    let rows = read_first_sheet(path)?;
    let header_idx = detect_header_row(&rows).ok_or_else(|| {
        AppError::FileProcessing(format!("{}: sheet has no non-empty rows", path.display()))
    })?;
    tracing::debug!("header row detected at index {}", header_idx);

    let mut df = build_dataframe(&rows[header_idx..], &config.sentinel_columns, config.text_policy)?;
    df = drop_junk_columns(&df, &config.drop_columns)?;
    df = resolve_code_alias(df)?;

    let mut required: Vec<&str> = vec![CODE_COLUMN, BODY_COLUMN];
    required.extend(config.sentinel_columns.iter().map(|s| s.as_str()));
    ensure_columns(&df, &required)?;

    tracing::info!("loaded input table: {} rows x {} columns", df.height(), df.width());
    Ok(df)
}

/// Loads the reference chart. The header sits in the first row; the same
/// detection scan is used for uniformity and skips nothing on a well-formed
/// chart.
pub fn load_reference(path: &Path, config: &Config) -> Result<DataFrame, AppError> {
    let rows = read_first_sheet(path)?;
    let header_idx = detect_header_row(&rows).ok_or_else(|| {
        AppError::FileProcessing(format!("{}: sheet has no non-empty rows", path.display()))
    })?;

    let df = build_dataframe(&rows[header_idx..], &[], config.text_policy)?;
    ensure_columns(&df, &[CODE_COLUMN, BODY_COLUMN, RECOMMENDATION_COLUMN])?;

    tracing::info!("loaded reference chart: {} rows", df.height());
    Ok(df)
}

fn read_first_sheet(path: &Path) -> Result<Vec<Vec<Data>>, AppError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        AppError::FileProcessing(format!("Failed to open workbook {}: {}", path.display(), e))
    })?;

    let sheet_names = workbook.sheet_names().to_vec();
    let sheet_name = sheet_names.first().ok_or_else(|| {
        AppError::FileProcessing(format!("{}: workbook has no sheets", path.display()))
    })?;

    let range = workbook.worksheet_range(sheet_name).map_err(|e| {
        AppError::FileProcessing(format!("Failed to read worksheet {}: {}", sheet_name, e))
    })?;

    Ok(range.rows().map(|row| row.to_vec()).collect())
}

/// Index of the first row containing at least one non-empty cell.
fn detect_header_row(rows: &[Vec<Data>]) -> Option<usize> {
    rows.iter()
        .position(|row| row.iter().any(|cell| !cell_is_empty(cell)))
}

/// Builds named string/float series from the header row and the rows below
/// it. `code` (and its alias) is canonicalized; the organization-name column
/// and the sentinel columns are forced to strings so downstream comparisons
/// stay textual.
fn build_dataframe(
    rows: &[Vec<Data>],
    sentinel_columns: &[String],
    text_policy: TextPolicy,
) -> Result<DataFrame, AppError> {
    let header_row = rows.first().ok_or_else(|| {
        AppError::FileProcessing("Empty data or headers".to_string())
    })?;

    let mut existing_names = HashSet::new();
    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(idx, cell)| normalize_header(cell, idx, &mut existing_names))
        .collect();

    let mut columns = Vec::new();

    for (col_idx, header) in headers.iter().enumerate() {
        let values: Vec<Data> = rows
            .iter()
            .skip(1) // Skip header row
            .map(|row| row.get(col_idx).cloned().unwrap_or(Data::Empty))
            .collect();

        let series = if header == CODE_COLUMN || header == CODE_ALIAS {
            let codes: Vec<String> = values.iter().map(canonical_code).collect();
            Series::new(header, codes)
        } else if header == BODY_COLUMN {
            let names = values
                .iter()
                .map(|cell| coerce_cell(cell, text_policy))
                .collect::<Result<Vec<String>, AppError>>()?;
            Series::new(header, names)
        } else if sentinel_columns.iter().any(|col| col == header) {
            let cells = values
                .iter()
                .map(|cell| coerce_cell(cell, TextPolicy::Coerce))
                .collect::<Result<Vec<String>, AppError>>()?;
            Series::new(header, cells)
        } else if is_numeric_column(&values) {
            let nums: Vec<Option<f64>> = values
                .iter()
                .map(|v| match v {
                    Data::Float(f) => Some(*f),
                    Data::Int(i) => Some(*i as f64),
                    _ => None,
                })
                .collect();
            Series::new(header, nums)
        } else {
            let strings: Vec<String> = values
                .iter()
                .map(|cell| coerce_cell(cell, TextPolicy::Coerce))
                .collect::<Result<Vec<String>, AppError>>()?;
            Series::new(header, strings)
        };

        columns.push(series);
    }

    Ok(DataFrame::new(columns)?)
}

/// Drop is a no-op for absent names.
fn drop_junk_columns(df: &DataFrame, drop_columns: &[String]) -> Result<DataFrame, AppError> {
    let kept: Vec<&str> = df
        .get_column_names()
        .into_iter()
        .filter(|name| !drop_columns.iter().any(|junk| junk == name))
        .collect();

    Ok(df.select(kept)?)
}

/// Exactly one column must own the `code` name: rename the alias when `code`
/// is absent, drop it when `code` is already present.
fn resolve_code_alias(mut df: DataFrame) -> Result<DataFrame, AppError> {
    let names: Vec<String> = df.get_column_names().iter().map(|&s| s.to_string()).collect();
    let has_alias = names.iter().any(|n| n == CODE_ALIAS);
    let has_code = names.iter().any(|n| n == CODE_COLUMN);

    if has_alias {
        if has_code {
            tracing::warn!("both `{}` and `{}` present, keeping `{}`", CODE_ALIAS, CODE_COLUMN, CODE_COLUMN);
            let kept: Vec<&str> = df
                .get_column_names()
                .into_iter()
                .filter(|&name| name != CODE_ALIAS)
                .collect();
            df = df.select(kept)?;
        } else {
            df.rename(CODE_ALIAS, CODE_COLUMN)?;
        }
    }

    Ok(df)
}

fn ensure_columns(df: &DataFrame, required: &[&str]) -> Result<(), AppError> {
    for name in required {
        if df.column(name).is_err() {
            return Err(AppError::MissingColumn((*name).to_string()));
        }
    }
    Ok(())
}
