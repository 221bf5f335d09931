//! Wallet ledger - Balance changes and their append-only history.
//!
//! Every balance change goes through [`credit`] or [`debit`], which update the
//! wallet row and insert the matching ledger entry inside one database
//! transaction. The balance update is a single guarded `UPDATE` statement, so
//! two concurrent debits can never both succeed against a stale balance:
//! `UPDATE wallets SET balance = balance - ? WHERE id = ? AND balance >= ?`
//!
//! Both functions accept any connection that can open a transaction. Called with
//! a [`DatabaseConnection`] they commit on their own; called with an open
//! [`sea_orm::DatabaseTransaction`] they nest as a savepoint and only become
//! durable when the outer transaction commits.

use crate::{
    core::money::{Money, ensure_positive},
    entities::{TransactionKind, UserModel, Wallet, WalletTransaction, wallet, wallet_transaction},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{debug, info, instrument};

/// Description recorded for user top-ups.
pub const DEPOSIT_DESCRIPTION: &str = "wallet deposit";

/// Result of comparing a wallet's stored balance with its ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerCheck {
    /// Balance column as stored
    pub stored: Money,
    /// `sum(credits) - sum(debits)` over the wallet's entries
    pub recomputed: Money,
    /// Number of ledger entries
    pub entries: usize,
}

impl LedgerCheck {
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.stored == self.recomputed
    }
}

/// Creates an empty wallet for a freshly registered user.
pub(crate) async fn open_wallet<C>(db: &C, user_id: i64) -> Result<wallet::Model>
where
    C: ConnectionTrait,
{
    let wallet = wallet::ActiveModel {
        user_id: Set(user_id),
        balance: Set(0),
        updated_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    Ok(wallet.insert(db).await?)
}

/// Finds a wallet by id.
pub async fn get_wallet<C>(db: &C, wallet_id: i64) -> Result<wallet::Model>
where
    C: ConnectionTrait,
{
    Wallet::find_by_id(wallet_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Wallet", wallet_id))
}

/// Finds the wallet owned by a user.
pub async fn get_wallet_for_user<C>(db: &C, user_id: i64) -> Result<wallet::Model>
where
    C: ConnectionTrait,
{
    Wallet::find()
        .filter(wallet::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Wallet for user", user_id))
}

/// Current balance of a user's wallet.
pub async fn get_balance<C>(db: &C, user_id: i64) -> Result<Money>
where
    C: ConnectionTrait,
{
    Ok(get_wallet_for_user(db, user_id).await?.balance())
}

async fn append_entry<C>(
    db: &C,
    wallet_id: i64,
    amount: Money,
    kind: TransactionKind,
    description: &str,
) -> Result<wallet_transaction::Model>
where
    C: ConnectionTrait,
{
    let entry = wallet_transaction::ActiveModel {
        wallet_id: Set(wallet_id),
        amount: Set(amount.minor_units()),
        kind: Set(kind),
        description: Set(description.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    Ok(entry.insert(db).await?)
}

/// Adds `amount` to a wallet and records a credit entry.
///
/// `amount` must be greater than zero. There is no upper bound.
#[instrument(skip(db))]
pub async fn credit<C>(
    db: &C,
    wallet_id: i64,
    amount: Money,
    description: &str,
) -> Result<wallet_transaction::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    ensure_positive(amount)?;

    let txn = db.begin().await?;

    let result = Wallet::update_many()
        .col_expr(
            wallet::Column::Balance,
            Expr::col(wallet::Column::Balance).add(amount.minor_units()),
        )
        .col_expr(wallet::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(wallet::Column::Id.eq(wallet_id))
        .exec(&txn)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::not_found("Wallet", wallet_id));
    }

    let entry = append_entry(&txn, wallet_id, amount, TransactionKind::Credit, description).await?;
    txn.commit().await?;

    debug!(wallet_id, %amount, entry_id = entry.id, "credited wallet");
    Ok(entry)
}

/// Removes `amount` from a wallet and records a debit entry.
///
/// Fails with [`Error::InsufficientFunds`] when the balance is lower than
/// `amount`; in that case neither the balance nor the history changes.
#[instrument(skip(db))]
pub async fn debit<C>(
    db: &C,
    wallet_id: i64,
    amount: Money,
    description: &str,
) -> Result<wallet_transaction::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    ensure_positive(amount)?;

    let txn = db.begin().await?;

    let result = Wallet::update_many()
        .col_expr(
            wallet::Column::Balance,
            Expr::col(wallet::Column::Balance).sub(amount.minor_units()),
        )
        .col_expr(wallet::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(wallet::Column::Id.eq(wallet_id))
        .filter(wallet::Column::Balance.gte(amount.minor_units()))
        .exec(&txn)
        .await?;

    if result.rows_affected == 0 {
        // Either the wallet is missing or the guard refused the debit
        let wallet = get_wallet(&txn, wallet_id).await?;
        return Err(Error::InsufficientFunds {
            balance: wallet.balance(),
            required: amount,
        });
    }

    let entry = append_entry(&txn, wallet_id, amount, TransactionKind::Debit, description).await?;
    txn.commit().await?;

    debug!(wallet_id, %amount, entry_id = entry.id, "debited wallet");
    Ok(entry)
}

/// Tops up the caller's own wallet.
pub async fn deposit(
    db: &DatabaseConnection,
    user: &UserModel,
    amount: Money,
) -> Result<wallet::Model> {
    ensure_positive(amount)?;
    let wallet = get_wallet_for_user(db, user.id).await?;
    credit(db, wallet.id, amount, DEPOSIT_DESCRIPTION).await?;
    info!(user_id = user.id, %amount, "wallet deposit");
    get_wallet(db, wallet.id).await
}

/// Ledger entries for a wallet, newest first.
pub async fn list_transactions<C>(
    db: &C,
    wallet_id: i64,
    limit: Option<u64>,
) -> Result<Vec<wallet_transaction::Model>>
where
    C: ConnectionTrait,
{
    WalletTransaction::find()
        .filter(wallet_transaction::Column::WalletId.eq(wallet_id))
        .order_by_desc(wallet_transaction::Column::CreatedAt)
        .order_by_desc(wallet_transaction::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Recomputes a wallet's balance from its ledger entries.
pub async fn ledger_balance<C>(db: &C, wallet_id: i64) -> Result<Money>
where
    C: ConnectionTrait,
{
    let entries = list_transactions(db, wallet_id, None).await?;
    sum_entries(&entries)
}

fn sum_entries(entries: &[wallet_transaction::Model]) -> Result<Money> {
    entries.iter().try_fold(Money::ZERO, |total, entry| {
        total
            .checked_add(entry.signed_amount())
            .ok_or_else(|| Error::validation("ledger total overflowed"))
    })
}

/// Compares the stored balance with the ledger history.
pub async fn verify_wallet<C>(db: &C, wallet_id: i64) -> Result<LedgerCheck>
where
    C: ConnectionTrait,
{
    let wallet = get_wallet(db, wallet_id).await?;
    let entries = list_transactions(db, wallet_id, None).await?;
    Ok(LedgerCheck {
        stored: wallet.balance(),
        recomputed: sum_entries(&entries)?,
        entries: entries.len(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_non_positive_amounts_are_rejected_before_any_query() -> Result<()> {
        // No query results configured: any database access would fail the test
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        for amount in [Money::ZERO, Money::from_minor(-100)] {
            let result = credit(&db, 1, amount, "test").await;
            assert!(matches!(result, Err(Error::Validation { .. })));
            let result = debit(&db, 1, amount, "test").await;
            assert!(matches!(result, Err(Error::Validation { .. })));
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_credit_increases_balance_and_records_entry() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_client(&db, "asha").await?;
        let wallet = get_wallet_for_user(&db, client.id).await?;

        let entry = credit(&db, wallet.id, money("125.50"), "top up").await?;

        assert_eq!(entry.kind, TransactionKind::Credit);
        assert_eq!(entry.amount, 12_550);
        assert_eq!(entry.description, "top up");
        assert_eq!(get_balance(&db, client.id).await?, money("125.50"));
        Ok(())
    }

    #[tokio::test]
    async fn test_credit_unknown_wallet_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result = credit(&db, 999, money("1.00"), "top up").await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        assert!(list_transactions(&db, 999, None).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_debit_beyond_balance_changes_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_client(&db, "asha").await?;
        let wallet = fund_wallet(&db, &client, "500.00").await?;
        let entries_before = list_transactions(&db, wallet.id, None).await?.len();

        let result = debit(&db, wallet.id, money("700.00"), "fee").await;

        match result {
            Err(Error::InsufficientFunds { balance, required }) => {
                assert_eq!(balance, money("500.00"));
                assert_eq!(required, money("700.00"));
            }
            other => panic!("expected InsufficientFunds, got {other:?}"),
        }
        assert_eq!(get_balance(&db, client.id).await?, money("500.00"));
        assert_eq!(
            list_transactions(&db, wallet.id, None).await?.len(),
            entries_before
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_debit_of_exact_balance_empties_wallet() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_client(&db, "asha").await?;
        let wallet = fund_wallet(&db, &client, "42.10").await?;

        let entry = debit(&db, wallet.id, money("42.10"), "fee").await?;

        assert_eq!(entry.kind, TransactionKind::Debit);
        assert_eq!(get_balance(&db, client.id).await?, Money::ZERO);
        Ok(())
    }

    #[tokio::test]
    async fn test_debit_unknown_wallet_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result = debit(&db, 999, money("1.00"), "fee").await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_debits_cannot_both_spend_the_same_funds() -> Result<()> {
        let (db, _dir) = setup_file_test_db().await?;
        let shared = std::sync::Arc::new(db);
        let db = &*shared;
        let client = create_test_client(&db, "asha").await?;
        let wallet = fund_wallet(&db, &client, "500.00").await?;

        let tasks: Vec<_> = ["fee one", "fee two"]
            .into_iter()
            .map(|description| {
                let db = std::sync::Arc::clone(&shared);
                tokio::spawn(async move { debit(&*db, wallet.id, money("300.00"), description).await })
            })
            .collect();
        let mut results = Vec::new();
        for task in tasks {
            results.push(task.await.unwrap());
        }

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(Error::InsufficientFunds { .. })))
        );
        assert_eq!(get_balance(db, client.id).await?, money("200.00"));
        assert!(verify_wallet(db, wallet.id).await?.is_consistent());
        Ok(())
    }

    #[tokio::test]
    async fn test_balance_always_matches_ledger() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_client(&db, "asha").await?;
        let wallet = get_wallet_for_user(&db, client.id).await?;

        let check = verify_wallet(&db, wallet.id).await?;
        assert!(check.is_consistent());
        assert_eq!(check.entries, 0);

        credit(&db, wallet.id, money("100.00"), "a").await?;
        debit(&db, wallet.id, money("0.30"), "b").await?;
        let _ = debit(&db, wallet.id, money("1000.00"), "refused").await;
        credit(&db, wallet.id, money("0.05"), "c").await?;
        debit(&db, wallet.id, money("50.00"), "d").await?;

        let check = verify_wallet(&db, wallet.id).await?;
        assert!(check.is_consistent());
        assert_eq!(check.entries, 4);
        assert_eq!(check.stored, money("49.75"));
        assert_eq!(ledger_balance(&db, wallet.id).await?, money("49.75"));
        Ok(())
    }

    #[tokio::test]
    async fn test_deposit_credits_own_wallet() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_client(&db, "asha").await?;

        let wallet = deposit(&db, &client, money("250.00")).await?;

        assert_eq!(wallet.balance(), money("250.00"));
        let history = list_transactions(&db, wallet.id, None).await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].description, DEPOSIT_DESCRIPTION);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_transactions_newest_first_with_limit() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_client(&db, "asha").await?;
        let wallet = get_wallet_for_user(&db, client.id).await?;

        let first = credit(&db, wallet.id, money("1.00"), "first").await?;
        let second = credit(&db, wallet.id, money("2.00"), "second").await?;
        let third = credit(&db, wallet.id, money("3.00"), "third").await?;

        let all = list_transactions(&db, wallet.id, None).await?;
        assert_eq!(all, vec![third.clone(), second.clone(), first]);

        let recent = list_transactions(&db, wallet.id, Some(2)).await?;
        assert_eq!(recent, vec![third, second]);
        Ok(())
    }
}
