/// Database configuration and connection management
pub mod database;

/// Marketplace settings and seed users loaded from config.toml
pub mod marketplace;

pub use marketplace::{BillingConfig, MarketplaceConfig, SeedUser, VideoConfig, VideoProviderKind};
