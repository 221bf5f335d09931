//! Wallet entity - One balance per user.
//!
//! The balance is kept in minor currency units and must always equal the signed
//! sum of the wallet's transactions. It is only changed through the ledger
//! functions in `core::wallet`.

use crate::core::money::Money;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Wallet database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    /// Unique identifier for the wallet
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user, one wallet per user
    #[sea_orm(unique)]
    pub user_id: i64,
    /// Current balance in minor units, never negative
    pub balance: i64,
    /// Last time the balance changed
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// The balance as a [`Money`] value.
    #[must_use]
    pub const fn balance(&self) -> Money {
        Money::from_minor(self.balance)
    }
}

/// Defines relationships between Wallet and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each wallet belongs to one user and goes away with it
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    /// One wallet has many ledger entries
    #[sea_orm(has_many = "super::wallet_transaction::Entity")]
    Transactions,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::wallet_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
