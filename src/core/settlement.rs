//! Settlement coordinator - Pays the lawyer and closes the consultation.
//!
//! When a client ends a session, the client's wallet is debited, the lawyer's
//! wallet is credited and the consultation moves to `completed`, all inside one
//! database transaction. Any failure before commit (insufficient funds, a
//! concurrent settlement, the database going away) rolls back every part, so no
//! reader ever sees a debit without the matching credit.

use crate::{
    config::BillingConfig,
    core::{
        billing,
        consultation::{get_by_room_id, mark_completed},
        money::{Money, ensure_positive},
        user::get_lawyer_profile,
        wallet,
    },
    entities::{ConsultationStatus, consultation, user},
    errors::{Error, Result},
};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{info, instrument, warn};

/// Ledger description on the client's side.
pub const FEE_DESCRIPTION: &str = "consultation fee";
/// Ledger description on the lawyer's side.
pub const EARNINGS_DESCRIPTION: &str = "consultation earnings";

/// Outcome of a successful settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementReceipt {
    /// The consultation that was completed
    pub consultation_id: i64,
    /// Room the session ran in
    pub room_id: String,
    /// Amount moved from client to lawyer
    pub amount: Money,
    /// Client balance after the debit
    pub client_balance: Money,
    /// Lawyer balance after the credit
    pub lawyer_balance: Money,
}

/// Only the client may settle, and only an accepted consultation.
fn authorize(consultation: &consultation::Model, caller: &user::Model) -> Result<()> {
    if consultation.client_id != caller.id {
        return Err(Error::unauthorized(
            "only the client on this consultation can end the session",
        ));
    }
    if consultation.status != ConsultationStatus::Accepted {
        return Err(Error::InvalidTransition {
            from: consultation.status,
            action: "settle",
        });
    }
    Ok(())
}

async fn settle_in(
    txn: &DatabaseTransaction,
    consultation: &consultation::Model,
    room_id: &str,
    amount: Money,
) -> Result<SettlementReceipt> {
    // Flip the status first: a concurrent settlement fails here before touching any wallet
    mark_completed(txn, consultation.id, amount).await?;

    let client_wallet = wallet::get_wallet_for_user(txn, consultation.client_id).await?;
    let lawyer_wallet = wallet::get_wallet_for_user(txn, consultation.lawyer_id).await?;

    if amount.is_positive() {
        wallet::debit(txn, client_wallet.id, amount, FEE_DESCRIPTION).await?;
        wallet::credit(txn, lawyer_wallet.id, amount, EARNINGS_DESCRIPTION).await?;
    }

    Ok(SettlementReceipt {
        consultation_id: consultation.id,
        room_id: room_id.to_string(),
        amount,
        client_balance: wallet::get_wallet(txn, client_wallet.id).await?.balance(),
        lawyer_balance: wallet::get_wallet(txn, lawyer_wallet.id).await?.balance(),
    })
}

/// Settles the session in `room_id` for `amount`.
///
/// Fails with [`Error::NotFound`] for an unknown room, [`Error::Unauthorized`]
/// unless `caller` is the consultation's client, [`Error::InvalidTransition`]
/// unless the consultation is accepted, [`Error::Validation`] for a non-positive
/// amount and [`Error::InsufficientFunds`] when the client cannot pay. On any
/// failure nothing is written and the consultation stays accepted.
#[instrument(skip(db, caller), fields(caller_id = caller.id))]
pub async fn settle(
    db: &DatabaseConnection,
    caller: &user::Model,
    room_id: &str,
    amount: Money,
) -> Result<SettlementReceipt> {
    let txn = db.begin().await?;

    let consultation = get_by_room_id(&txn, room_id).await?;
    authorize(&consultation, caller)?;
    ensure_positive(amount)?;

    let receipt = match settle_in(&txn, &consultation, room_id, amount).await {
        Ok(receipt) => receipt,
        Err(e) => {
            warn!(consultation_id = consultation.id, "settlement rolled back: {e}");
            return Err(e);
        }
    };
    txn.commit().await?;

    info!(
        consultation_id = receipt.consultation_id,
        amount = %receipt.amount,
        client_balance = %receipt.client_balance,
        "consultation settled"
    );
    Ok(receipt)
}

/// Settles the session in `room_id`, pricing it from its duration.
///
/// The fee is the lawyer's per-minute rate applied to the time after the free
/// introduction. A session that ends inside the introduction completes with a
/// zero fee and no ledger entries.
#[instrument(skip(db, caller, billing_config), fields(caller_id = caller.id))]
pub async fn settle_by_duration(
    db: &DatabaseConnection,
    caller: &user::Model,
    room_id: &str,
    duration_seconds: u32,
    billing_config: &BillingConfig,
) -> Result<SettlementReceipt> {
    let txn = db.begin().await?;

    let consultation = get_by_room_id(&txn, room_id).await?;
    authorize(&consultation, caller)?;

    let profile = get_lawyer_profile(&txn, consultation.lawyer_id).await?;
    let amount = billing::session_fee(
        profile.rate_per_minute(),
        duration_seconds,
        billing_config.free_intro_seconds,
    )?;

    let receipt = match settle_in(&txn, &consultation, room_id, amount).await {
        Ok(receipt) => receipt,
        Err(e) => {
            warn!(consultation_id = consultation.id, "settlement rolled back: {e}");
            return Err(e);
        }
    };
    txn.commit().await?;

    info!(
        consultation_id = receipt.consultation_id,
        duration_seconds,
        amount = %receipt.amount,
        "consultation settled by duration"
    );
    Ok(receipt)
}
