//! Reads a bank's CSV transaction export into the normalized transaction
//! list. Column positions, delimiter and date format differ per bank, so they
//! live in the configuration.

use crate::model::{Amount, Transaction};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// The layout of a bank's CSV export. Stored in `config.json` so one
/// installation follows one bank's format.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CsvImportOptions {
    /// Field delimiter, e.g. ',' or ';'.
    pub delimiter: char,
    /// chrono format string for the date column, e.g. `%Y-%m-%d`.
    pub date_format: String,
    pub date_column: usize,
    pub name_column: usize,
    pub amount_column: usize,
    /// Whether the export starts with a header row to skip.
    pub has_header: bool,
}

impl Default for CsvImportOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            date_format: "%Y-%m-%d".to_string(),
            date_column: 0,
            name_column: 1,
            amount_column: 2,
            has_header: true,
        }
    }
}

/// Errors from parsing a bank export. Any malformed row fails the whole
/// parse; a partially imported batch would silently corrupt the totals.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Unable to read the bank export: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed bank export row: {0}")]
    Csv(#[from] csv::Error),
    #[error("Row {row}: missing column {column}")]
    MissingColumn { row: usize, column: usize },
    #[error("Row {row}: '{value}' is not a valid transaction date")]
    InvalidDate { row: usize, value: String },
    #[error("Row {row}: '{value}' is not a valid amount")]
    InvalidAmount { row: usize, value: String },
}

/// Parses the export file at `path` into transactions.
pub fn read_transactions(
    path: &Path,
    options: &CsvImportOptions,
) -> Result<Vec<Transaction>, ImportError> {
    let file = std::fs::File::open(path)?;
    parse_transactions(file, options)
}

/// Parses CSV export data from any reader.
pub fn parse_transactions<R: Read>(
    reader: R,
    options: &CsvImportOptions,
) -> Result<Vec<Transaction>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(options.has_header)
        .delimiter(options.delimiter as u8)
        .flexible(true)
        .from_reader(reader);

    let mut transactions = Vec::new();
    for (ix, result) in csv_reader.records().enumerate() {
        let record = result?;
        // 1-based row number as it appears in the file.
        let row = ix + 1 + usize::from(options.has_header);

        let field = |column: usize| {
            record
                .get(column)
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .ok_or(ImportError::MissingColumn { row, column })
        };

        let date_field = field(options.date_column)?;
        let date =
            NaiveDate::parse_from_str(date_field, &options.date_format).map_err(|_| {
                ImportError::InvalidDate {
                    row,
                    value: date_field.to_string(),
                }
            })?;

        let name = field(options.name_column)?.to_string();

        let amount_field = field(options.amount_column)?;
        let amount = Amount::from_str(amount_field).map_err(|_| ImportError::InvalidAmount {
            row,
            value: amount_field.to_string(),
        })?;

        transactions.push(Transaction::new(date, name, amount));
    }
    Ok(transactions)
}
