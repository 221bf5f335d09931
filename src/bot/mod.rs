//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the CounselDesk marketplace,
//! including all slash commands, autocomplete handlers, and bot context management.
//! The Discord author id is the caller's identity; it is resolved to a registered
//! user before any core operation runs.

/// Discord command implementations (account, wallet, consultation, rating, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::MarketplaceConfig,
    core::{user, video::VideoRoomProvider},
    entities,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Shared data available to all bot commands.
/// This structure holds the database connection, the video room provider and
/// the marketplace configuration.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Provisions rooms when a party joins a session
    pub video: Arc<dyn VideoRoomProvider>,
    /// Billing and display settings
    pub config: Arc<MarketplaceConfig>,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub fn new(
        database: DatabaseConnection,
        video: Arc<dyn VideoRoomProvider>,
        config: Arc<MarketplaceConfig>,
    ) -> Self {
        Self {
            database,
            video,
            config,
        }
    }

    /// Formats an amount with the configured currency symbol.
    #[must_use]
    pub fn display_amount(&self, amount: crate::core::money::Money) -> String {
        format!("{}{amount}", self.config.billing.currency_symbol)
    }
}

/// Resolves the command author to a registered user.
pub async fn caller(ctx: poise::Context<'_, BotData, Error>) -> Result<entities::user::Model> {
    let discord_id = ctx.author().id.to_string();
    user::get_user_by_discord_id(&ctx.data().database, &discord_id)
        .await?
        .ok_or_else(|| Error::unauthorized("you are not registered yet, use `/register` first"))
}

/// Text shown to the caller for a failed command.
///
/// Business errors are safe to show verbatim; anything else is reported generically.
#[must_use]
pub fn user_facing_message(error: &Error) -> String {
    if error.is_business() {
        format!("❌ {error}")
    } else {
        "❌ Something went wrong on our side. Please try again later.".to_string()
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            if error.is_business() {
                warn!("Command `{}` refused: {error}", ctx.command().name);
            } else {
                error!("Error in command `{}`: {error:?}", ctx.command().name);
            }
            if let Err(e) = ctx.say(user_facing_message(&error)).await {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Starts the Discord client and blocks until it stops.
#[instrument(skip_all)]
pub async fn run_bot(
    token: String,
    database: DatabaseConnection,
    video: Arc<dyn VideoRoomProvider>,
    config: Arc<MarketplaceConfig>,
) -> std::result::Result<(), serenity::Error> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(BotData::new(database, video, config))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e:?}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e:?}"))
}
