//! CSV loader for batch filer input.
//!
//! ## CSV Format
//!
//! Headers are matched by name, so column order does not matter.
//!
//! | Column       | Required | Notes |
//! |--------------|----------|-------|
//! | `income`     | yes      | May use thousands commas, e.g. `50,000` |
//! | `deductions` | no       | Itemized deductions; empty means `0` |
//! | `exemptions` | no       | Personal exemptions; empty means `1` |
//! | `tax_year`   | no       | Empty means the default year |
//!
//! ### Example
//!
//! ```csv
//! income,deductions,exemptions,tax_year
//! "50,000",0,1,2014
//! 200000,20000,1,
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tax_core::{FilerInput, InputErrors};

// ---------------------------------------------------------------------------
// Serde-compatible row that mirrors the CSV layout exactly
// ---------------------------------------------------------------------------

/// Cells stay as text so they go through the same validation as the
/// command line.
#[derive(Debug, Deserialize)]
struct CsvRow {
    income: String,
    #[serde(default)]
    deductions: String,
    #[serde(default)]
    exemptions: String,
    #[serde(default)]
    tax_year: String,
}

// ---------------------------------------------------------------------------
// Public error type
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or converting CSV data.
#[derive(Debug, thiserror::Error)]
pub enum CsvLoadError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The underlying CSV deserialisation failed (bad structure, missing
    /// `income` column, etc.).
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// A row parsed but its values failed validation. `row` is 1-based
    /// (header = row 0).
    #[error("row {row}: {errors}")]
    InvalidRow { row: usize, errors: InputErrors },
}

// ---------------------------------------------------------------------------
// Core loader
// ---------------------------------------------------------------------------

fn convert_row(
    row: CsvRow,
    row_number: usize,
    default_year: i32,
) -> Result<FilerInput, CsvLoadError> {
    FilerInput::parse_with_year(
        &row.income,
        &row.deductions,
        &row.exemptions,
        &row.tax_year,
        default_year,
    )
    .map_err(|errors| CsvLoadError::InvalidRow {
        row: row_number,
        errors,
    })
}

/// Parse CSV text and return one [`FilerInput`] per row, in file order.
///
/// Rows without a `tax_year` use `default_year`.
///
/// # Errors
///
/// * [`CsvLoadError::Parse`] if the CSV is structurally invalid.
/// * [`CsvLoadError::InvalidRow`] for the first row whose values are invalid.
pub fn load_from_str(
    input: &str,
    default_year: i32,
) -> Result<Vec<FilerInput>, CsvLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            convert_row(row, idx + 1, default_year)
        })
        .collect()
}

/// Read a file from disk and delegate to [`load_from_str`].
pub fn load_from_file(
    path: &Path,
    default_year: i32,
) -> Result<Vec<FilerInput>, CsvLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CsvLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents, default_year)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
