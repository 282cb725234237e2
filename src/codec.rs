//! Serializes transaction lists to and from the JSON text kept in the store.
//!
//! The wire form keeps amounts as plain integers of minor units, so a list
//! round-trips exactly: `decode(encode(x)) == x`.

use crate::model::Transaction;
use crate::Result;
use anyhow::Context;

/// Encodes a transaction list as the persisted JSON text.
pub fn encode(transactions: &[Transaction]) -> Result<String> {
    serde_json::to_string_pretty(transactions)
        .context("Unable to serialize the transaction list")
}

/// Decodes persisted JSON text into a transaction list. Fails on any
/// malformed entry; there is no partial result.
pub fn decode(text: &str) -> Result<Vec<Transaction>> {
    serde_json::from_str(text).context("Unable to parse the persisted transaction list")
}
