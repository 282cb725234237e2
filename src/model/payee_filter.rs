use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A rule mapping a substring of a transaction's counterpart name to the
/// display alias (and thereby the spreadsheet column) it aggregates under.
///
/// Identity is the full `{payeeName, alias}` pair: two filters with the same
/// match key but different aliases are distinct rules and both apply. The
/// serde field names match the `payeeFilters.json` payload kept locally and in
/// the drive folder.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayeeFilter {
    payee_name: String,
    alias: String,
}

impl PayeeFilter {
    pub fn new(payee_name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            payee_name: payee_name.into(),
            alias: alias.into(),
        }
    }

    /// The substring matched against transaction names.
    pub fn payee_name(&self) -> &str {
        &self.payee_name
    }

    /// The label shown as the column header.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Case-preserving substring test against a raw transaction name.
    pub fn matches(&self, transaction_name: &str) -> bool {
        transaction_name.contains(&self.payee_name)
    }
}

/// Parses a JSON payee filter payload from either source (local file or the
/// store object). A payload missing a required field fails the whole parse.
pub fn parse_filters(payload: &str) -> Result<Vec<PayeeFilter>> {
    serde_json::from_str(payload).context("Could not parse the payee filter payload")
}

/// Combines filters from the local configuration and the store into one
/// ordered list: local filters first, then remote, with structural duplicates
/// removed while preserving the order of first occurrence. Filter order is
/// what fixes the column order of the spreadsheet, so it must be stable.
pub fn merge_filters(local: Vec<PayeeFilter>, remote: Vec<PayeeFilter>) -> Vec<PayeeFilter> {
    let mut seen = HashSet::new();
    local
        .into_iter()
        .chain(remote)
        .filter(|filter| seen.insert(filter.clone()))
        .collect()
}
