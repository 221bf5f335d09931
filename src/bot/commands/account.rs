//! Account Discord commands - registration, profile and the lawyer directory.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, caller},
        core::{
            money::Money,
            rating,
            user::{self, LawyerDetails},
            wallet as ledger,
        },
        entities::Role,
        errors::{Error, Result},
    };
    use std::fmt::Write;

    fn describe_rating(average: Option<f64>, count: i32) -> String {
        average.map_or_else(
            || "not rated yet".to_string(),
            |avg| format!("⭐ {avg:.1} ({count} ratings)"),
        )
    }

    /// Registers you as a client with an empty wallet.
    #[poise::command(slash_command, prefix_command)]
    pub async fn register(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let discord_id = ctx.author().id.to_string();
        let client = user::register_client(db, &discord_id, &ctx.author().name).await?;

        ctx.say(format!(
            "✅ Welcome, {}! You are registered as a client. Use `/deposit` to top up your wallet.",
            client.username
        ))
        .await?;
        Ok(())
    }

    /// Registers you as a lawyer.
    #[poise::command(slash_command, prefix_command)]
    pub async fn register_lawyer(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Years in practice"] experience_years: i32,
        #[description = "Your rate per minute, e.g. 20.00"] rate_per_minute: String,
    ) -> Result<()> {
        let details = LawyerDetails {
            experience_years,
            rate_per_minute: Money::parse_positive(&rate_per_minute)?,
        };
        let db = &ctx.data().database;
        let discord_id = ctx.author().id.to_string();
        let lawyer = user::register_lawyer(db, &discord_id, &ctx.author().name, details).await?;

        ctx.say(format!(
            "✅ Welcome, {}! You are listed at {} per minute.",
            lawyer.username,
            ctx.data().display_amount(details.rate_per_minute)
        ))
        .await?;
        Ok(())
    }

    /// Shows your role, wallet balance and, for lawyers, your rating.
    #[poise::command(slash_command, prefix_command)]
    pub async fn profile(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let me = caller(ctx).await?;
        let db = &ctx.data().database;
        let balance = ledger::get_balance(db, me.id).await?;

        let mut response = format!(
            "**{}** ({})\nWallet: {}\n",
            me.username,
            me.role,
            ctx.data().display_amount(balance)
        );
        if me.role == Role::Lawyer {
            let profile = user::get_lawyer_profile(db, me.id).await?;
            let average = rating::average_for(db, me.id).await?;
            writeln!(
                response,
                "Experience: {} years\nRate: {} per minute\nRating: {}\nTaking requests: {}",
                profile.experience_years,
                ctx.data().display_amount(profile.rate_per_minute()),
                describe_rating(average, profile.rating_count),
                if profile.is_available { "yes" } else { "no" }
            )?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Lists lawyers who are currently taking consultation requests.
    #[poise::command(slash_command, prefix_command)]
    pub async fn lawyers(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let listings = user::list_available_lawyers(&ctx.data().database).await?;
        if listings.is_empty() {
            ctx.say("No lawyers are taking requests right now.").await?;
            return Ok(());
        }

        let mut response = String::from("**Available lawyers**\n");
        for listing in listings {
            writeln!(
                response,
                "• **{}** - {} years, {} per minute, {}{}",
                listing.user.username,
                listing.profile.experience_years,
                ctx.data().display_amount(listing.profile.rate_per_minute()),
                describe_rating(listing.profile.average_rating, listing.profile.rating_count),
                if listing.profile.is_verified { " ✔️" } else { "" }
            )?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Pauses or resumes new consultation requests (lawyers only).
    #[poise::command(slash_command, prefix_command)]
    pub async fn availability(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Whether you are taking new requests"] available: bool,
    ) -> Result<()> {
        let me = caller(ctx).await?;
        user::set_availability(&ctx.data().database, &me, available).await?;

        let message = if available {
            "✅ You are now taking new consultation requests."
        } else {
            "⏸️ You are no longer listed for new consultation requests."
        };
        ctx.say(message).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
