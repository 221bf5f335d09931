//! Wallet Discord commands - `wallet` and `deposit`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, caller},
        core::{money::Money, wallet as ledger},
        entities::TransactionKind,
        errors::{Error, Result},
    };
    use std::fmt::Write;

    const RECENT_ENTRIES: u64 = 10;

    /// Shows your balance and most recent wallet activity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn wallet(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let me = caller(ctx).await?;
        let db = &ctx.data().database;
        let wallet = ledger::get_wallet_for_user(db, me.id).await?;
        let entries = ledger::list_transactions(db, wallet.id, Some(RECENT_ENTRIES)).await?;

        let mut response = format!(
            "💰 **Balance:** {}\n",
            ctx.data().display_amount(wallet.balance())
        );
        if entries.is_empty() {
            response.push_str("No wallet activity yet.");
        } else {
            response.push_str("**Recent activity**\n");
            for entry in entries {
                let sign = match entry.kind {
                    TransactionKind::Credit => '+',
                    TransactionKind::Debit => '-',
                };
                writeln!(
                    response,
                    "`{}` {sign}{} {}",
                    entry.created_at.format("%Y-%m-%d %H:%M"),
                    ctx.data().display_amount(Money::from_minor(entry.amount)),
                    entry.description
                )?;
            }
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Adds funds to your wallet.
    #[poise::command(slash_command, prefix_command)]
    pub async fn deposit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Amount to add, e.g. 500.00"] amount: String,
    ) -> Result<()> {
        let amount = Money::parse_positive(&amount)?;
        let me = caller(ctx).await?;
        let wallet = ledger::deposit(&ctx.data().database, &me, amount).await?;

        ctx.say(format!(
            "✅ Deposited {}. New balance: {}",
            ctx.data().display_amount(amount),
            ctx.data().display_amount(wallet.balance())
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
