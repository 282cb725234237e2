//! Amount type for monetary values in minor currency units.
//!
//! Amounts are stored as signed integers (cents / öre) so that accumulation
//! never drifts. The fixed scale factor of 100 is applied exactly once, when a
//! value is converted for display or aggregation, never while accumulating.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A monetary amount in minor currency units.
///
/// Equality and hashing are on the integer value, which is what makes the
/// `(date, name, amount)` transaction identity exact. Serialized as a plain
/// JSON integer, so a persisted list round-trips without any floating-point
/// coercion.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Amount(i64);

impl Amount {
    /// Creates an amount from minor currency units, e.g. `-12050` for -120.50.
    pub const fn from_minor_units(minor_units: i64) -> Self {
        Self(minor_units)
    }

    /// The raw signed minor-unit value.
    pub fn minor_units(&self) -> i64 {
        self.0
    }

    /// The amount at display scale, e.g. `-120.50` for `-12050` minor units.
    pub fn display_value(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

/// An error that can occur when parsing a bank-export string into an `Amount`.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("Invalid amount '{0}'")]
pub struct AmountError(String);

impl FromStr for Amount {
    type Err = AmountError;

    /// Parses bank-export amount strings.
    ///
    /// Both `.` and `,` are accepted as the decimal separator: the last one in
    /// the string is the decimal separator when one or two digits follow it,
    /// otherwise all of them are grouping separators. Spaces (including
    /// non-breaking spaces) are ignored.
    ///
    /// ```
    /// # use econostats::model::Amount;
    /// # use std::str::FromStr;
    /// assert_eq!(Amount::from_str("-120.50").unwrap().minor_units(), -12050);
    /// assert_eq!(Amount::from_str("-120,50").unwrap().minor_units(), -12050);
    /// assert_eq!(Amount::from_str("1.234,56").unwrap().minor_units(), 123456);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || AmountError(s.to_string());

        let compact: String = s
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
            .collect();
        let (negative, body) = match compact.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, compact.as_str()),
        };
        if body.is_empty() {
            return Err(err());
        }

        // The last '.' or ',' is the decimal separator when followed by one or
        // two digits; everything else is grouping and is dropped.
        let (whole_part, frac_part) = match body.rfind(['.', ',']) {
            Some(ix) if (1..=2).contains(&(body.len() - ix - 1)) => {
                (&body[..ix], &body[ix + 1..])
            }
            _ => (body, ""),
        };

        let whole_digits: String = whole_part
            .chars()
            .filter(|c| *c != '.' && *c != ',')
            .collect();
        if whole_digits.is_empty() && frac_part.is_empty() {
            return Err(err());
        }
        if !whole_digits.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(err());
        }

        let whole: i64 = if whole_digits.is_empty() {
            0
        } else {
            whole_digits.parse().map_err(|_| err())?
        };
        let frac: i64 = match frac_part.len() {
            0 => 0,
            1 => frac_part.parse::<i64>().map_err(|_| err())? * 10,
            _ => frac_part.parse().map_err(|_| err())?,
        };

        let minor_units = whole * 100 + frac;
        Ok(Amount(if negative { -minor_units } else { minor_units }))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let minor_units = i64::deserialize(deserializer)?;
        Ok(Amount(minor_units))
    }
}
