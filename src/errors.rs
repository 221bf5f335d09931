//! Unified error type for the marketplace.
//!
//! Business conditions (validation, missing records, authorization, state machine
//! guards, insufficient funds) are kept as distinct variants so the bot layer can
//! render a useful message. Everything else is infrastructure and is reported
//! opaquely.

use crate::{core::money::Money, entities::consultation::ConsultationStatus};
use thiserror::Error;

/// All errors produced by the marketplace core and its adapters.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input: non-positive amount, out-of-range score, missing field.
    #[error("Invalid input: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// A referenced record does not exist.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Kind of record that was looked up
        entity: &'static str,
        /// Key used for the lookup
        key: String,
    },

    /// The caller lacks the role or ownership for the action.
    #[error("Not allowed: {message}")]
    Unauthorized {
        /// Why the caller was refused
        message: String,
    },

    /// A consultation state machine guard was violated.
    #[error("Cannot {action} a consultation that is {from}")]
    InvalidTransition {
        /// Status observed when the transition was attempted
        from: ConsultationStatus,
        /// The attempted action (accept, reject, settle, rate)
        action: &'static str,
    },

    /// A debit exceeded the wallet balance.
    #[error("Insufficient funds: balance is {balance}, {required} required")]
    InsufficientFunds {
        /// Balance at the time of the attempt
        balance: Money,
        /// Amount the debit asked for
        required: Money,
    },

    /// Missing or malformed configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong with the configuration
        message: String,
    },

    /// Database driver or query failure.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required environment variable is missing or not unicode.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Transport failure talking to the video provider.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The video provider answered but refused the request.
    #[error("Video provider error: {message}")]
    VideoProvider {
        /// Status and body returned by the provider
        message: String,
    },

    /// Failure while building a message.
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Discord client or framework failure.
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl Error {
    /// Shorthand for [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::NotFound`].
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// True for the caller-recoverable conditions that are safe to show to users.
    #[must_use]
    pub const fn is_business(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::NotFound { .. }
                | Self::Unauthorized { .. }
                | Self::InvalidTransition { .. }
                | Self::InsufficientFunds { .. }
        )
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
