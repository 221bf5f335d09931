//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions such as autocomplete.

/// Autocomplete handlers for lawyer names, categories and statuses
pub mod autocomplete;
