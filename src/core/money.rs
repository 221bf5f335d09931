//! Fixed-point money type.
//!
//! Amounts are stored as an integer count of minor units (two decimal places) so
//! that ledger arithmetic is exact. User input is parsed through
//! [`rust_decimal::Decimal`] and rejected before it reaches the ledger if it is
//! malformed or carries more precision than the currency allows.

use crate::errors::{Error, Result};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Number of fractional digits carried by every amount.
pub const SCALE: u32 = 2;

/// A currency amount in minor units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Builds an amount from minor units (e.g. `50_000` is `500.00`).
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Raw minor units, as stored in the database.
    #[must_use]
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// The amount as an exact decimal with two fractional digits.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, SCALE)
    }

    /// Converts an exact decimal into money, rejecting sub-minor-unit precision.
    pub fn from_decimal(value: Decimal) -> Result<Self> {
        let normalized = value.normalize();
        if normalized.scale() > SCALE {
            return Err(Error::validation(format!(
                "amount {value} has more than {SCALE} decimal places"
            )));
        }
        normalized
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|minor| minor.to_i64())
            .map(Self)
            .ok_or_else(|| Error::validation(format!("amount {value} is out of range")))
    }

    /// Parses user input such as `"500"`, `"500.5"` or `"500.50"`.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::validation("amount is required"));
        }
        let value = Decimal::from_str_exact(trimmed)
            .map_err(|e| Error::validation(format!("'{trimmed}' is not a valid amount: {e}")))?;
        Self::from_decimal(value)
    }

    /// Parses user input and additionally requires the amount to be greater than zero.
    pub fn parse_positive(input: &str) -> Result<Self> {
        let amount = Self::parse(input)?;
        ensure_positive(amount)?;
        Ok(amount)
    }
}

/// Rejects zero and negative amounts with a validation error.
pub fn ensure_positive(amount: Money) -> Result<()> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "amount must be greater than zero, got {amount}"
        )))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl FromStr for Money {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
