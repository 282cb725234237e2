use crate::model::Amount;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single account transaction from a bank export.
///
/// Immutable once created. The derived `Eq` and `Hash` make the whole struct
/// the `(date, name, amount)` identity tuple: two transactions with the same
/// date, counterpart name and amount are the same economic event, which is the
/// contract the reconciliation merge relies on.
///
/// The serialized form matches the persisted JSON history, e.g.
/// `{"date":"2024-01-15","name":"ICA SUPERMARKET","amount":-12050}`.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Transaction {
    date: NaiveDate,
    name: String,
    amount: Amount,
}

impl Transaction {
    pub fn new(date: NaiveDate, name: impl Into<String>, amount: Amount) -> Self {
        Self {
            date,
            name: name.into(),
            amount,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The raw counterpart name as the bank exported it.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// Zero-based month row index (January = 0). Always in `0..12` because a
    /// `NaiveDate` cannot hold anything else.
    pub(crate) fn month_index(&self) -> usize {
        self.date.month0() as usize
    }
}
