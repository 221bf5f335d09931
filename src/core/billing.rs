//! Session pricing.
//!
//! Sessions start with a free introduction. After it, time is billed per second
//! at the lawyer's per-minute rate, rounded half away from zero to the minor unit.

use crate::{
    core::money::Money,
    errors::{Error, Result},
};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

/// Seconds of a session that are actually charged.
#[must_use]
pub const fn billable_seconds(duration_seconds: u32, free_intro_seconds: u32) -> u32 {
    duration_seconds.saturating_sub(free_intro_seconds)
}

/// Fee for a session of `duration_seconds` at `rate_per_minute`.
///
/// Returns [`Money::ZERO`] for sessions that end within the free introduction.
pub fn session_fee(
    rate_per_minute: Money,
    duration_seconds: u32,
    free_intro_seconds: u32,
) -> Result<Money> {
    if rate_per_minute.is_negative() {
        return Err(Error::validation("rate per minute cannot be negative"));
    }

    let billable = billable_seconds(duration_seconds, free_intro_seconds);
    let minor = Decimal::from(rate_per_minute.minor_units()) * Decimal::from(billable)
        / Decimal::from(60);
    minor
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .map(Money::from_minor)
        .ok_or_else(|| Error::validation("session fee is out of range"))
}
