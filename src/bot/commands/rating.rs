//! Rating Discord command - `rate`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, caller},
        core::rating,
        errors::{Error, Result},
    };

    /// Rates a completed consultation from 1 to 5 (client only).
    #[poise::command(slash_command, prefix_command)]
    pub async fn rate(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Consultation id"] consultation_id: i64,
        #[description = "Score from 1 to 5"] score: i32,
        #[description = "Optional review"] review: Option<String>,
    ) -> Result<()> {
        let me = caller(ctx).await?;
        let db = &ctx.data().database;
        let created = rating::submit(
            db,
            &me,
            consultation_id,
            score,
            review.as_deref().unwrap_or_default(),
        )
        .await?;
        let average = rating::average_for(db, created.lawyer_id).await?;

        ctx.say(format!(
            "⭐ Thanks! You rated consultation #{consultation_id} {score}/5. The lawyer's average is now {:.1}.",
            average.unwrap_or_default()
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
