//! Marketplace configuration loading from config.toml
//!
//! This module provides the billing and video settings plus the list of users to
//! seed on start-up. Seeded users go through the same registration path as users
//! who sign up through the bot, so each of them gets a wallet.

use crate::entities::Role;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "COUNSEL_DESK_CONFIG";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default)]
pub struct MarketplaceConfig {
    /// Session billing settings
    #[serde(default)]
    pub billing: BillingConfig,
    /// Video room provider settings
    #[serde(default)]
    pub video: VideoConfig,
    /// Users to register on start-up if missing
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

/// How sessions are priced.
#[derive(Debug, Deserialize, Clone)]
pub struct BillingConfig {
    /// Length of the free introduction at the start of every session
    #[serde(default = "default_free_intro_seconds")]
    pub free_intro_seconds: u32,
    /// Symbol shown in front of amounts
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            free_intro_seconds: default_free_intro_seconds(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

const fn default_free_intro_seconds() -> u32 {
    120
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

/// Which video room backend to use.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VideoProviderKind {
    /// Daily REST API, needs `DAILY_API_KEY`
    Daily,
    /// Builds join URLs without calling out
    #[default]
    Static,
}

/// Video room provider settings.
#[derive(Debug, Deserialize, Clone)]
pub struct VideoConfig {
    #[serde(default)]
    pub provider: VideoProviderKind,
    /// Domain that join URLs live under (e.g. `counsel.daily.co`)
    #[serde(default = "default_video_domain")]
    pub domain: String,
    /// REST endpoint for room management
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Request timeout for the provider
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            provider: VideoProviderKind::default(),
            domain: default_video_domain(),
            api_base: default_api_base(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_video_domain() -> String {
    "counsel-desk.daily.co".to_string()
}

fn default_api_base() -> String {
    "https://api.daily.co/v1".to_string()
}

const fn default_timeout_seconds() -> u64 {
    10
}

/// A user to register on start-up.
#[derive(Debug, Deserialize, Clone)]
pub struct SeedUser {
    /// Discord user id
    pub discord_id: String,
    pub username: String,
    pub role: Role,
    /// Deposited into the wallet right after registration, e.g. `"500.00"`
    #[serde(default)]
    pub opening_balance: Option<String>,
    /// Lawyers only
    #[serde(default)]
    pub experience_years: Option<i32>,
    /// Lawyers only, e.g. `"20.00"`
    #[serde(default)]
    pub rate_per_minute: Option<String>,
}

/// Loads marketplace configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<MarketplaceConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<MarketplaceConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from `$COUNSEL_DESK_CONFIG`, or `./config.toml` when unset.
///
/// A missing default file is not an error: the marketplace runs with defaults and
/// no seed users.
pub fn load_default_config() -> Result<MarketplaceConfig> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return load_config(path);
    }

    let default_path = Path::new("config.toml");
    if default_path.exists() {
        load_config(default_path)
    } else {
        tracing::warn!("No config.toml found, using defaults");
        Ok(MarketplaceConfig::default())
    }
}
