//! Core business logic - Framework-agnostic marketplace operations.
//!
//! Nothing here knows about Discord. Callers are identified by their
//! registered [`crate::entities::user::Model`] and every operation returns a
//! [`crate::errors::Result`].

/// Session pricing from duration and rate
pub mod billing;
/// Consultation request lifecycle
pub mod consultation;
/// Fixed-point money amounts
pub mod money;
/// Client ratings and per-lawyer averages
pub mod rating;
/// Atomic end-of-session payment
pub mod settlement;
/// Registration, lookup and role checks
pub mod user;
/// Video room provisioning
pub mod video;
/// Wallet balances and ledger history
pub mod wallet;
