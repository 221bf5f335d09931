//! General Discord commands - ping, help, and other utility commands.
//! This module contains simple commands that don't require database operations
//! and provide basic bot functionality and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let free_minutes = ctx.data().config.billing.free_intro_seconds / 60;
        let help_text = format!(
            "**CounselDesk Help**\n\
        Book paid video consultations with verified lawyers.\n\n\
        **Account**\n\
        • `/register` - Register as a client.\n\
        • `/register_lawyer <experience_years> <rate_per_minute>` - Register as a lawyer.\n\
        • `/profile` - Shows your role, wallet and rating.\n\
        • `/lawyers` - Lists lawyers taking requests.\n\
        • `/availability <available>` - Lawyers: pause or resume new requests.\n\n\
        **Wallet**\n\
        • `/wallet` - Shows your balance and recent activity.\n\
        • `/deposit <amount>` - Tops up your wallet.\n\n\
        **Consultations**\n\
        • `/request_consultation <lawyer> <category> <subject> [description]` - Asks a lawyer for a session.\n\
        • `/consultations [status]` - Lists your consultations.\n\
        • `/accept <id>` / `/reject <id>` - Lawyers: respond to a request.\n\
        • `/join <id>` - Gets the video room link.\n\
        • `/end_session <room_id> <amount>` - Clients: pay and close the session.\n\
        • `/end_session_timed <room_id> <seconds>` - Clients: pay by session length (first {free_minutes} minutes free).\n\
        • `/rate <id> <score> [review]` - Clients: rate a completed session from 1 to 5.\n\n\
        **Utility**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message."
        );

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
