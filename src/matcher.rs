//! Pairs transactions with the payee filters whose match key occurs in the
//! transaction's counterpart name.

use crate::model::{PayeeFilter, Transaction};

/// Produces every `(transaction, filter_index)` pairing where the filter's
/// match key is a substring of the transaction name, in filter order within
/// each transaction.
///
/// There is no precedence: a transaction matching several filters yields one
/// pair per filter, and each pair contributes independently to the matrix. A
/// transaction matching no filter yields nothing and is thereby excluded from
/// aggregation entirely.
pub fn match_transactions<'a>(
    transactions: &'a [Transaction],
    filters: &[PayeeFilter],
) -> Vec<(&'a Transaction, usize)> {
    let mut pairs = Vec::new();
    for transaction in transactions {
        for (filter_ix, filter) in filters.iter().enumerate() {
            if filter.matches(transaction.name()) {
                pairs.push((transaction, filter_ix));
            }
        }
    }
    pairs
}
