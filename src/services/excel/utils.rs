use calamine::Data;
use std::collections::HashSet;

use crate::error::AppError;
use crate::models::TextPolicy;

/// Lower-cases and trims a header cell. Blank header cells get the
/// spreadsheet-export artifact name `unnamed: {index}`; literal duplicates
/// get a numeric suffix so every column owns a unique name.
pub fn normalize_header(cell: &Data, col_idx: usize, existing_names: &mut HashSet<String>) -> String {
    let base_name = cell.to_string().trim().to_lowercase();

    let mut cleaned = if base_name.is_empty() {
        format!("unnamed: {}", col_idx)
    } else {
        base_name
    };

    // If the name already exists, add a numeric suffix
    let mut counter = 1;
    let original_name = cleaned.clone();
    while !existing_names.insert(cleaned.clone()) {
        cleaned = format!("{}_{}", original_name, counter);
        counter += 1;
    }

    cleaned
}

pub fn cell_is_empty(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Renders a cell under the configured coercion policy. `Coerce` mirrors the
/// spreadsheet's own display form; `Strict` only accepts text cells.
pub fn coerce_cell(cell: &Data, policy: TextPolicy) -> Result<String, AppError> {
    match (cell, policy) {
        (Data::String(s), _) => Ok(s.clone()),
        (Data::Empty, TextPolicy::Coerce) => Ok(String::new()),
        (_, TextPolicy::Coerce) => Ok(cell.to_string()),
        (_, TextPolicy::Strict) => Err(AppError::InvalidInput(format!(
            "expected a text cell, got: {:?}",
            cell
        ))),
    }
}

/// Canonical string form of a `code` cell. Integral floats render without a
/// trailing `.0` so codes key identically across both tables.
pub fn canonical_code(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Int(i) => i.to_string(),
        _ => cell.to_string().trim().to_string(),
    }
}

pub fn is_numeric_column(values: &[Data]) -> bool {
    let mut numeric_count = 0;
    let mut total_count = 0;

    for value in values.iter().filter(|v| !matches!(v, Data::Empty)) {
        total_count += 1;
        if matches!(value, Data::Float(_) | Data::Int(_)) {
            numeric_count += 1;
        }
    }

    total_count > 0 && numeric_count as f64 / total_count as f64 > 0.5
}
