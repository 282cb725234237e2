//! The month-by-payee aggregation grid and its derived statistics.
//!
//! The matrix is rebuilt from the persisted transaction list on every run and
//! is never stored itself; only the transaction list is persisted.

use crate::matcher;
use crate::model::{PayeeFilter, Transaction};
use rust_decimal::{Decimal, RoundingStrategy};

/// Number of month rows. The grid always carries all twelve regardless of
/// which months actually contain transactions.
pub const MONTH_ROWS: usize = 12;

const ROUND_DP: u32 = 2;

/// A 12-row grid of accumulated absolute transaction amounts with one column
/// per payee filter plus a trailing total column, and derived per-column
/// averages and totals.
///
/// Cells a matched transaction never touched stay empty and read as zero. The
/// total column is written for every month row. A payee column's average is
/// taken over the months that actually received a value; the grand average is
/// taken over all twelve monthly totals. Derived values round the raw sum or
/// mean once, to two decimals, half away from zero (cells are absolute
/// values, so halves round up).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AggregationMatrix {
    /// `MONTH_ROWS` rows of `columns()` cells, `None` where nothing was
    /// written. The last column holds the monthly totals across all payees.
    cells: Vec<Vec<Option<Decimal>>>,
    /// Rounded per-column averages; the last entry is the grand average.
    averages: Vec<Decimal>,
    /// Rounded per-column totals; the last entry is the grand total.
    totals: Vec<Decimal>,
}

impl AggregationMatrix {
    /// Builds the matrix for one run. Matching and accumulation are additive:
    /// every `(transaction, filter)` pairing adds the transaction's absolute
    /// display-scale amount into its `(month, filter)` cell.
    pub fn build(transactions: &[Transaction], filters: &[PayeeFilter]) -> Self {
        let columns = filters.len() + 1;
        let mut cells = vec![vec![None; columns]; MONTH_ROWS];

        for (transaction, filter_ix) in matcher::match_transactions(transactions, filters) {
            let cell = &mut cells[transaction.month_index()][filter_ix];
            let accumulated = cell.unwrap_or(Decimal::ZERO);
            *cell = Some(accumulated + transaction.amount().display_value().abs());
        }

        // The total column is written for every month, even an empty one.
        let total_column = columns - 1;
        for row in cells.iter_mut() {
            let monthly: Decimal = row[..total_column].iter().flatten().copied().sum();
            row[total_column] = Some(monthly);
        }

        let mut averages = Vec::with_capacity(columns);
        let mut totals = Vec::with_capacity(columns);
        for col in 0..columns {
            let written: Vec<Decimal> = cells.iter().filter_map(|row| row[col]).collect();
            let sum: Decimal = written.iter().copied().sum();
            let average = if written.is_empty() {
                Decimal::ZERO
            } else {
                round(sum / Decimal::from(written.len() as i64))
            };
            averages.push(average);
            totals.push(round(sum));
        }

        Self {
            cells,
            averages,
            totals,
        }
    }

    /// Total number of columns: one per payee filter plus the total column.
    pub fn columns(&self) -> usize {
        self.averages.len()
    }

    /// Number of payee columns, excluding the total column.
    pub fn payee_columns(&self) -> usize {
        self.columns() - 1
    }

    pub fn month_rows(&self) -> usize {
        MONTH_ROWS
    }

    /// The accumulated value at `(month 1-12, column)`, zero when the cell was
    /// never written.
    ///
    /// # Panics
    /// Panics if `month` is outside 1-12 or `column` is out of range.
    pub fn cell(&self, month: u32, column: usize) -> Decimal {
        self.written_cell(month, column).unwrap_or(Decimal::ZERO)
    }

    /// The cell at `(month 1-12, column)` if anything was written there.
    pub fn written_cell(&self, month: u32, column: usize) -> Option<Decimal> {
        self.cells[month as usize - 1][column]
    }

    /// The total across all payee columns for `month` (1-12).
    pub fn monthly_total(&self, month: u32) -> Decimal {
        self.cell(month, self.columns() - 1)
    }

    /// The rounded average of `column` over its written month cells.
    pub fn average(&self, column: usize) -> Decimal {
        self.averages[column]
    }

    /// The rounded total of `column` over the twelve month rows.
    pub fn total(&self, column: usize) -> Decimal {
        self.totals[column]
    }

    /// The rounded average of the monthly totals over all twelve months.
    pub fn grand_average(&self) -> Decimal {
        self.averages[self.columns() - 1]
    }

    /// The rounded sum of the monthly totals.
    pub fn grand_total(&self) -> Decimal {
        self.totals[self.columns() - 1]
    }
}

fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(ROUND_DP, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Amount;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn transaction(date: &str, name: &str, minor_units: i64) -> Transaction {
        Transaction::new(
            NaiveDate::from_str(date).unwrap(),
            name,
            Amount::from_minor_units(minor_units),
        )
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_dimensions_are_fixed_regardless_of_data() {
        let filters = vec![
            PayeeFilter::new("ICA", "Groceries"),
            PayeeFilter::new("SL", "Transit"),
        ];
        let matrix = AggregationMatrix::build(&[], &filters);
        assert_eq!(matrix.month_rows(), 12);
        assert_eq!(matrix.columns(), 3);
        assert_eq!(matrix.payee_columns(), 2);
    }

    #[test]
    fn test_zero_filters_leaves_only_the_total_column() {
        let transactions = vec![transaction("2024-01-15", "ICA SUPERMARKET", -12050)];
        let matrix = AggregationMatrix::build(&transactions, &[]);
        assert_eq!(matrix.columns(), 1);
        assert_eq!(matrix.grand_total(), Decimal::ZERO);
    }

    #[test]
    fn test_zero_transactions_builds_an_all_zero_matrix() {
        let filters = vec![PayeeFilter::new("ICA", "Groceries")];
        let matrix = AggregationMatrix::build(&[], &filters);
        for month in 1..=12 {
            assert_eq!(matrix.cell(month, 0), Decimal::ZERO);
            assert!(matrix.written_cell(month, 0).is_none());
        }
        assert_eq!(matrix.average(0), Decimal::ZERO);
        assert_eq!(matrix.total(0), Decimal::ZERO);
        assert_eq!(matrix.grand_average(), Decimal::ZERO);
        assert_eq!(matrix.grand_total(), Decimal::ZERO);
    }

    #[test]
    fn test_monthly_aggregation_scenario() {
        let transactions = vec![
            transaction("2024-01-15", "ICA SUPERMARKET", -12050),
            transaction("2024-02-03", "ICA SUPERMARKET", -8000),
        ];
        let filters = vec![PayeeFilter::new("ICA", "Groceries")];
        let matrix = AggregationMatrix::build(&transactions, &filters);

        assert_eq!(matrix.cell(1, 0), dec("120.50"));
        assert_eq!(matrix.cell(2, 0), dec("80.00"));
        assert_eq!(matrix.average(0), dec("100.25"));
        assert_eq!(matrix.total(0), dec("200.50"));
        assert_eq!(matrix.monthly_total(1), dec("120.50"));
        assert_eq!(matrix.grand_total(), dec("200.50"));
    }

    #[test]
    fn test_repeated_matches_accumulate_in_the_same_cell() {
        let transactions = vec![
            transaction("2024-03-01", "ICA SUPERMARKET", -12050),
            transaction("2024-03-20", "ICA KVANTUM", -7950),
        ];
        let filters = vec![PayeeFilter::new("ICA", "Groceries")];
        let matrix = AggregationMatrix::build(&transactions, &filters);
        assert_eq!(matrix.cell(3, 0), dec("200.00"));
    }

    #[test]
    fn test_absolute_value_is_used() {
        // A refund and a charge both count toward the payee's monthly volume.
        let transactions = vec![
            transaction("2024-05-02", "ICA SUPERMARKET", -10000),
            transaction("2024-05-09", "ICA SUPERMARKET", 2500),
        ];
        let filters = vec![PayeeFilter::new("ICA", "Groceries")];
        let matrix = AggregationMatrix::build(&transactions, &filters);
        assert_eq!(matrix.cell(5, 0), dec("125.00"));
    }

    #[test]
    fn test_transaction_matching_two_filters_contributes_to_both_columns() {
        let transactions = vec![transaction("2024-01-15", "ICA SUPERMARKET", -12050)];
        let filters = vec![
            PayeeFilter::new("ICA", "Groceries"),
            PayeeFilter::new("SUPERMARKET", "Stores"),
        ];
        let matrix = AggregationMatrix::build(&transactions, &filters);
        assert_eq!(matrix.cell(1, 0), dec("120.50"));
        assert_eq!(matrix.cell(1, 1), dec("120.50"));
        assert_eq!(matrix.monthly_total(1), dec("241.00"));
    }

    #[test]
    fn test_column_total_equals_rounded_sum_of_month_cells() {
        let transactions = vec![
            transaction("2024-01-10", "SL-RESA", -3150),
            transaction("2024-04-11", "SL-RESA", -3150),
            transaction("2024-04-28", "SL-RESA", -990),
            transaction("2024-11-02", "SL-RESA", -3150),
        ];
        let filters = vec![PayeeFilter::new("SL", "Transit")];
        let matrix = AggregationMatrix::build(&transactions, &filters);

        let summed: Decimal = (1..=12).map(|m| matrix.cell(m, 0)).sum();
        assert_eq!(matrix.total(0), summed.round_dp(2));
    }

    #[test]
    fn test_grand_total_equals_rounded_sum_of_monthly_totals() {
        let transactions = vec![
            transaction("2024-01-10", "SL-RESA", -3150),
            transaction("2024-01-15", "ICA SUPERMARKET", -12050),
            transaction("2024-07-15", "ICA NARA", -4400),
        ];
        let filters = vec![
            PayeeFilter::new("ICA", "Groceries"),
            PayeeFilter::new("SL", "Transit"),
        ];
        let matrix = AggregationMatrix::build(&transactions, &filters);

        let summed: Decimal = (1..=12).map(|m| matrix.monthly_total(m)).sum();
        assert_eq!(matrix.grand_total(), summed.round_dp(2));
    }

    #[test]
    fn test_grand_average_is_over_all_twelve_months() {
        // One 120.00 entry in January; the other eleven monthly totals are
        // zero, so the grand average divides by twelve.
        let transactions = vec![transaction("2024-01-15", "ICA SUPERMARKET", -12000)];
        let filters = vec![PayeeFilter::new("ICA", "Groceries")];
        let matrix = AggregationMatrix::build(&transactions, &filters);
        assert_eq!(matrix.grand_average(), dec("10.00"));
        // The payee average only sees the single written month.
        assert_eq!(matrix.average(0), dec("120.00"));
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        // 10.01 + 10.02 over two written months: mean 10.015 rounds up.
        let transactions = vec![
            transaction("2024-01-05", "ICA SUPERMARKET", -1001),
            transaction("2024-02-05", "ICA SUPERMARKET", -1002),
        ];
        let filters = vec![PayeeFilter::new("ICA", "Groceries")];
        let matrix = AggregationMatrix::build(&transactions, &filters);
        assert_eq!(matrix.average(0), dec("10.02"));
    }

    #[test]
    fn test_unmatched_transactions_do_not_reach_the_matrix() {
        let transactions = vec![
            transaction("2024-01-15", "ICA SUPERMARKET", -12050),
            transaction("2024-01-20", "UNKNOWN PAYEE", -99999),
        ];
        let filters = vec![PayeeFilter::new("ICA", "Groceries")];
        let matrix = AggregationMatrix::build(&transactions, &filters);
        assert_eq!(matrix.grand_total(), dec("120.50"));
    }
}
