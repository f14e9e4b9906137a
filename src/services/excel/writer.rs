use polars::prelude::*;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Writes the finished table as a single-sheet workbook: bold header row,
/// data rows below, no index column. Appends `.xlsx` when the chosen name
/// has no extension. Returns the path actually written.
pub fn write_xlsx(df: &DataFrame, path: &Path) -> Result<PathBuf, AppError> {
    let path = if path.extension().is_none() {
        path.with_extension("xlsx")
    } else {
        path.to_path_buf()
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header_format = Format::new().set_bold();

    for (col_idx, name) in df.get_column_names().iter().enumerate() {
        worksheet
            .write_string_with_format(0, col_idx as u16, *name, &header_format)
            .map_err(write_error)?;
    }

    for (col_idx, series) in df.get_columns().iter().enumerate() {
        match series.dtype() {
            DataType::Float64 => {
                let values = series.f64()?;
                for (row_idx, value) in values.into_iter().enumerate() {
                    if let Some(value) = value {
                        worksheet
                            .write_number(row_idx as u32 + 1, col_idx as u16, value)
                            .map_err(write_error)?;
                    }
                }
            }
            _ => {
                let values = series.cast(&DataType::String)?;
                let values = values.str()?;
                for (row_idx, value) in values.into_iter().enumerate() {
                    match value {
                        Some(value) if !value.is_empty() => {
                            worksheet
                                .write_string(row_idx as u32 + 1, col_idx as u16, value)
                                .map_err(write_error)?;
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    workbook.save(&path).map_err(write_error)?;
    tracing::info!("wrote {} rows to {}", df.height(), path.display());
    Ok(path)
}

fn write_error(e: XlsxError) -> AppError {
    AppError::FileProcessing(format!("Failed to write workbook: {}", e))
}
