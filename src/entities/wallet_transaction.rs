//! Wallet transaction entity - Append-only ledger entries.
//!
//! Each entry records a positive `amount` and whether it was a credit or a
//! debit. Entries are only ever inserted as a byproduct of a ledger operation.
use crate::core::money::Money;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money in
    #[sea_orm(string_value = "credit")]
    Credit,
    /// Money out
    #[sea_orm(string_value = "debit")]
    Debit,
}

/// Wallet transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallet_transactions")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Wallet this entry belongs to
    pub wallet_id: i64,
    /// Positive magnitude in minor units
    pub amount: i64,
    /// `credit` or `debit`
    pub kind: TransactionKind,
    /// Human-readable description of the entry
    pub description: String,
    /// When the entry was recorded
    pub created_at: DateTimeUtc,
}

impl Model {
    /// The entry's effect on the balance: positive for credits, negative for debits.
    #[must_use]
    pub const fn signed_amount(&self) -> Money {
        match self.kind {
            TransactionKind::Credit => Money::from_minor(self.amount),
            TransactionKind::Debit => Money::from_minor(-self.amount),
        }
    }
}

/// Defines relationships between WalletTransaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one wallet
    #[sea_orm(
        belongs_to = "super::wallet::Entity",
        from = "Column::WalletId",
        to = "super::wallet::Column::Id",
        on_delete = "Cascade"
    )]
    Wallet,
}

impl Related<super::wallet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
