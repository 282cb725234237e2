//! Types that represent the core data model: `Transaction`, `Amount` and
//! `PayeeFilter`.

mod amount;
pub mod payee_filter;
mod transaction;

pub use amount::{Amount, AmountError};
pub use payee_filter::PayeeFilter;
pub use transaction::Transaction;
