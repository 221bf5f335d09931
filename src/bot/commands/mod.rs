//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

use crate::{bot::BotData, errors::Error};

/// Registration, profile and lawyer directory commands
pub mod account;

/// Consultation request, room and settlement commands
pub mod consultation;

/// General utility commands
pub mod general;

/// Post-session rating commands
pub mod rating;

/// Wallet balance and deposit commands
pub mod wallet;

// Export commands
pub use account::*;
pub use consultation::*;
pub use general::*;
pub use rating::*;
pub use wallet::*;

/// Every command the bot registers.
#[must_use]
pub fn all() -> Vec<poise::Command<BotData, Error>> {
    vec![
        ping(),
        help(),
        register(),
        register_lawyer(),
        profile(),
        lawyers(),
        availability(),
        wallet(),
        deposit(),
        request_consultation(),
        consultations(),
        accept(),
        reject(),
        join(),
        end_session(),
        end_session_timed(),
        rate(),
    ]
}
