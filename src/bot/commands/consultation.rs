//! Consultation Discord commands - requests, responses, rooms and settlement.
//!
//! Lawyers are addressed by username and consultations by id; sessions are
//! closed by room id, which both parties receive when the request is accepted.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, caller, handlers::autocomplete},
        core::{
            consultation::{self, NewConsultation},
            money::Money,
            settlement::{self, SettlementReceipt},
            user,
        },
        entities::ConsultationStatus,
        errors::{Error, Result},
    };
    use std::fmt::Write;

    fn settlement_message(data: &BotData, receipt: &SettlementReceipt) -> String {
        format!(
            "✅ Session `{}` closed. Paid {} for consultation #{}. Your balance: {}\n\
            Use `/rate {} <score>` to rate the session.",
            receipt.room_id,
            data.display_amount(receipt.amount),
            receipt.consultation_id,
            data.display_amount(receipt.client_balance),
            receipt.consultation_id
        )
    }

    /// Asks a lawyer for a consultation.
    #[poise::command(slash_command, prefix_command)]
    pub async fn request_consultation(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Lawyer to consult"]
        #[autocomplete = "autocomplete::autocomplete_lawyer_name"]
        lawyer: String,
        #[description = "Area of law"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: String,
        #[description = "One-line summary of your matter"] subject: String,
        #[description = "Optional details for the lawyer"] description: Option<String>,
    ) -> Result<()> {
        let me = caller(ctx).await?;
        let db = &ctx.data().database;
        let lawyer = user::get_lawyer_by_username(db, &lawyer).await?;

        let request = consultation::create_request(
            db,
            &me,
            NewConsultation {
                lawyer_id: lawyer.id,
                category,
                subject,
                description: description.unwrap_or_default(),
            },
        )
        .await?;

        ctx.say(format!(
            "✅ Consultation #{} requested from **{}**. You will be able to join once it is accepted.",
            request.id, lawyer.username
        ))
        .await?;
        Ok(())
    }

    /// Lists your consultations, optionally filtered by status.
    #[poise::command(slash_command, prefix_command)]
    pub async fn consultations(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "pending, accepted, rejected or completed"]
        #[autocomplete = "autocomplete::autocomplete_status"]
        status: Option<String>,
    ) -> Result<()> {
        let status = status
            .map(|name| {
                ConsultationStatus::from_name(&name)
                    .ok_or_else(|| Error::validation(format!("unknown status '{name}'")))
            })
            .transpose()?;
        let me = caller(ctx).await?;
        let list = consultation::list_for_user(&ctx.data().database, &me, status).await?;

        if list.is_empty() {
            ctx.say("No consultations found.").await?;
            return Ok(());
        }

        let mut response = String::from("**Your consultations**\n");
        for item in list {
            write!(
                response,
                "• #{} [{}] {} - {}",
                item.id, item.status, item.category, item.subject
            )?;
            if let (ConsultationStatus::Accepted, Some(room_id)) = (item.status, &item.room_id) {
                write!(response, " (room `{room_id}`)")?;
            }
            if let Some(paid) = item.amount_paid {
                write!(response, " paid {}", ctx.data().display_amount(Money::from_minor(paid)))?;
            }
            response.push('\n');
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Accepts a pending consultation request (assigned lawyer only).
    #[poise::command(slash_command, prefix_command)]
    pub async fn accept(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Consultation id"] id: i64,
    ) -> Result<()> {
        let me = caller(ctx).await?;
        let accepted = consultation::accept(&ctx.data().database, &me, id).await?;

        ctx.say(format!(
            "✅ Consultation #{} accepted. Room: `{}`. Use `/join {}` to get the link.",
            accepted.id,
            accepted.room_id.unwrap_or_default(),
            accepted.id
        ))
        .await?;
        Ok(())
    }

    /// Rejects a pending consultation request (assigned lawyer only).
    #[poise::command(slash_command, prefix_command)]
    pub async fn reject(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Consultation id"] id: i64,
    ) -> Result<()> {
        let me = caller(ctx).await?;
        let rejected = consultation::reject(&ctx.data().database, &me, id).await?;

        ctx.say(format!("Consultation #{} rejected.", rejected.id))
            .await?;
        Ok(())
    }

    /// Gets the video room link for an accepted consultation.
    #[poise::command(slash_command, prefix_command, ephemeral)]
    pub async fn join(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Consultation id"] id: i64,
    ) -> Result<()> {
        let me = caller(ctx).await?;
        let data = ctx.data();
        let info = consultation::join_room(&data.database, &me, id, data.video.as_ref()).await?;

        let message = match info.join_url {
            Some(url) => format!("🎥 Room `{}`: {url}", info.room_id),
            None => format!(
                "⚠️ Room `{}` could not be reached right now. Please try `/join {}` again shortly.",
                info.room_id, info.consultation_id
            ),
        };
        ctx.say(message).await?;
        Ok(())
    }

    /// Ends a session and pays the lawyer a fixed amount (client only).
    #[poise::command(slash_command, prefix_command)]
    pub async fn end_session(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Room id of the session"] room_id: String,
        #[description = "Amount to pay, e.g. 300.00"] amount: String,
    ) -> Result<()> {
        let amount = Money::parse_positive(&amount)?;
        let me = caller(ctx).await?;
        let receipt = settlement::settle(&ctx.data().database, &me, &room_id, amount).await?;

        ctx.say(settlement_message(ctx.data(), &receipt)).await?;
        Ok(())
    }

    /// Ends a session and pays the lawyer by session length (client only).
    #[poise::command(slash_command, prefix_command)]
    pub async fn end_session_timed(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Room id of the session"] room_id: String,
        #[description = "Session length in seconds"] seconds: u32,
    ) -> Result<()> {
        let me = caller(ctx).await?;
        let data = ctx.data();
        let receipt = settlement::settle_by_duration(
            &data.database,
            &me,
            &room_id,
            seconds,
            &data.config.billing,
        )
        .await?;

        ctx.say(settlement_message(data, &receipt)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
