//! Renders the aggregation matrix into spreadsheet-presentable rows.
//!
//! The renderer addresses the matrix purely through `(row, column)` integer
//! indices and emits rows of strings; it knows nothing about any binary
//! spreadsheet format.

use crate::matrix::{AggregationMatrix, MONTH_ROWS};
use crate::model::PayeeFilter;
use crate::Result;
use anyhow::Context;

const MONTH: &str = "Month";
const TOTAL: &str = "Total";
const AVERAGE: &str = "Average";
const GRAND_TOTAL: &str = "Grand Total";

const MONTH_LABELS: [&str; MONTH_ROWS] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Lays the matrix out as rows: a header row of aliases, twelve month rows,
/// then the Average and Grand Total summary rows. Month cells the engine
/// never wrote render empty; summary cells and monthly totals always render
/// with two decimals.
pub fn to_rows(matrix: &AggregationMatrix, filters: &[PayeeFilter]) -> Vec<Vec<String>> {
    let columns = matrix.columns();
    let mut rows = Vec::with_capacity(MONTH_ROWS + 3);

    let mut header = Vec::with_capacity(columns + 1);
    header.push(MONTH.to_string());
    header.extend(filters.iter().map(|filter| filter.alias().to_string()));
    header.push(TOTAL.to_string());
    rows.push(header);

    for (month0, label) in MONTH_LABELS.iter().enumerate() {
        let month = month0 as u32 + 1;
        let mut row = Vec::with_capacity(columns + 1);
        row.push(label.to_string());
        for column in 0..columns {
            row.push(match matrix.written_cell(month, column) {
                Some(value) => format!("{value:.2}"),
                None => String::new(),
            });
        }
        rows.push(row);
    }

    let mut average_row = Vec::with_capacity(columns + 1);
    average_row.push(AVERAGE.to_string());
    average_row.extend((0..columns).map(|column| format!("{:.2}", matrix.average(column))));
    rows.push(average_row);

    let mut total_row = Vec::with_capacity(columns + 1);
    total_row.push(GRAND_TOTAL.to_string());
    total_row.extend((0..columns).map(|column| format!("{:.2}", matrix.total(column))));
    rows.push(total_row);

    rows
}

/// Writes rows as CSV text, for the local spreadsheet file and the copy kept
/// in the store.
pub fn to_csv_string(rows: &[Vec<String>]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer
            .write_record(row)
            .context("Unable to write a spreadsheet row")?;
    }
    let bytes = writer
        .into_inner()
        .context("Unable to finish writing the spreadsheet")?;
    String::from_utf8(bytes).context("The rendered spreadsheet was not valid UTF-8")
}
