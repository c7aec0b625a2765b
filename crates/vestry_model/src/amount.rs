//! Money amounts in integer minor units.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of minor units per major unit (cents per whole currency unit).
const MINOR_PER_MAJOR: i64 = 100;

/// A currency amount stored as integer minor units.
///
/// Balance arithmetic never uses floating point, so repeated
/// apply/revert cycles cannot accumulate drift. Transaction amounts
/// are non-negative magnitudes; account balances may go negative.
///
/// # Example
///
/// ```
/// use vestry_model::Amount;
///
/// let price: Amount = "12.34".parse().unwrap();
/// assert_eq!(price.minor(), 1234);
/// assert_eq!(price.to_string(), "12.34");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(0);

    /// Creates an amount from minor units (cents).
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Creates an amount from whole major units.
    ///
    /// Returns `None` if the value overflows.
    #[must_use]
    pub const fn from_major(major: i64) -> Option<Self> {
        match major.checked_mul(MINOR_PER_MAJOR) {
            Some(minor) => Some(Self(minor)),
            None => None,
        }
    }

    /// Returns the amount in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Returns true if the amount is strictly negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition of two amounts.
    #[must_use]
    pub const fn checked_add(self, other: Amount) -> Option<Amount> {
        match self.0.checked_add(other.0) {
            Some(minor) => Some(Amount(minor)),
            None => None,
        }
    }

    /// Checked subtraction of two amounts.
    #[must_use]
    pub const fn checked_sub(self, other: Amount) -> Option<Amount> {
        match self.0.checked_sub(other.0) {
            Some(minor) => Some(Amount(minor)),
            None => None,
        }
    }

    /// Checked addition of a signed minor-unit delta.
    ///
    /// This is the entry point the ledger uses to apply balance
    /// effects.
    #[must_use]
    pub const fn checked_add_minor(self, delta: i64) -> Option<Amount> {
        match self.0.checked_add(delta) {
            Some(minor) => Some(Amount(minor)),
            None => None,
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.0.unsigned_abs();
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{sign}{}.{:02}",
            abs / MINOR_PER_MAJOR as u64,
            abs % MINOR_PER_MAJOR as u64
        )
    }
}

/// Errors produced when parsing a decimal amount string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountParseError {
    /// The input is not a decimal number.
    #[error("malformed amount: {0:?}")]
    Malformed(String),

    /// More than two decimal places were supplied.
    #[error("amount {0:?} has more than two decimal places")]
    TooPrecise(String),

    /// The value does not fit in 64-bit minor units.
    #[error("amount {0:?} is out of range")]
    OutOfRange(String),
}

impl FromStr for Amount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let (negative, rest) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input),
        };

        let (whole, frac) = match rest.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (rest, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(AmountParseError::Malformed(s.to_string()));
        }
        if frac.len() > 2 {
            return Err(AmountParseError::TooPrecise(s.to_string()));
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(AmountParseError::Malformed(s.to_string()));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| AmountParseError::OutOfRange(s.to_string()))?
        };

        let mut minor_part: i64 = if frac.is_empty() {
            0
        } else {
            frac.parse()
                .map_err(|_| AmountParseError::Malformed(s.to_string()))?
        };
        if frac.len() == 1 {
            minor_part *= 10;
        }

        let minor = whole
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|m| m.checked_add(minor_part))
            .ok_or_else(|| AmountParseError::OutOfRange(s.to_string()))?;

        Ok(Amount(if negative { -minor } else { minor }))
    }
}
