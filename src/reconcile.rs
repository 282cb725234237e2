//! Merges a freshly imported transaction batch with the previously persisted
//! batch so that repeated imports of overlapping export windows never
//! duplicate an already-recorded transaction and never drop a distinct one.

use crate::model::Transaction;
use std::collections::HashSet;

/// Returns the union of both batches, deduplicated by the `(date, name,
/// amount)` identity tuple, in persisted-then-new order so the output is
/// deterministic across runs.
///
/// `None` for `persisted` means a first run or an explicit reset; the import
/// is returned unchanged. Re-merging an already-merged list with the same
/// persisted batch is a no-op, which makes repeated identical runs idempotent.
pub fn merge_transactions(
    imported: Vec<Transaction>,
    persisted: Option<Vec<Transaction>>,
) -> Vec<Transaction> {
    let Some(persisted) = persisted else {
        return imported;
    };

    let mut seen: HashSet<Transaction> =
        HashSet::with_capacity(persisted.len() + imported.len());
    let mut merged = Vec::with_capacity(persisted.len() + imported.len());
    for transaction in persisted.into_iter().chain(imported) {
        if seen.insert(transaction.clone()) {
            merged.push(transaction);
        }
    }
    merged
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

    fn sample_persisted() -> Vec<Transaction> {
        vec![
            transaction("2024-01-15", "ICA SUPERMARKET", -12050),
            transaction("2024-01-28", "HYRA JANUARI", -800000),
        ]
    }

    #[test]
    fn test_first_run_returns_import_unchanged() {
        let imported = sample_persisted();
        let merged = merge_transactions(imported.clone(), None);
        assert_eq!(merged, imported);
    }

    #[test]
    fn test_empty_import_returns_persisted() {
        let merged = merge_transactions(Vec::new(), Some(sample_persisted()));
        assert_eq!(merged, sample_persisted());
    }

    #[test]
    fn test_overlapping_import_adds_only_new_entries() {
        let imported = vec![
            transaction("2024-01-28", "HYRA JANUARI", -800000),
            transaction("2024-02-03", "ICA SUPERMARKET", -8000),
        ];
        let merged = merge_transactions(imported, Some(sample_persisted()));
        assert_eq!(
            merged,
            vec![
                transaction("2024-01-15", "ICA SUPERMARKET", -12050),
                transaction("2024-01-28", "HYRA JANUARI", -800000),
                transaction("2024-02-03", "ICA SUPERMARKET", -8000),
            ]
        );
    }

    #[test]
    fn test_distinct_transactions_with_shared_fields_all_survive() {
        // Same payee and amount on different dates are different events.
        let imported = vec![
            transaction("2024-02-01", "ICA SUPERMARKET", -8000),
            transaction("2024-02-08", "ICA SUPERMARKET", -8000),
        ];
        let merged = merge_transactions(imported, Some(Vec::new()));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_remerge_is_idempotent() {
        let imported = vec![
            transaction("2024-01-15", "ICA SUPERMARKET", -12050),
            transaction("2024-02-03", "ICA SUPERMARKET", -8000),
        ];
        let persisted = sample_persisted();

        let merged = merge_transactions(imported.clone(), Some(persisted.clone()));
        let remerged = merge_transactions(merged.clone(), Some(persisted));
        assert_eq!(remerged, merged);
    }

    #[test]
    fn test_persisted_order_comes_first() {
        let imported = vec![transaction("2023-12-30", "EARLIER ENTRY", -100)];
        let merged = merge_transactions(imported, Some(sample_persisted()));
        assert_eq!(merged[0], transaction("2024-01-15", "ICA SUPERMARKET", -12050));
        assert_eq!(merged[2], transaction("2023-12-30", "EARLIER ENTRY", -100));
    }
}
