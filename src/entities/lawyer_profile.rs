//! Lawyer profile entity - Public details and cached rating aggregate.
//!
//! `average_rating` and `rating_count` are a cache over the `ratings` table,
//! refreshed in the same transaction as every rating insert.

use crate::core::money::Money;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lawyer profile database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lawyer_profiles")]
pub struct Model {
    /// The lawyer's user id
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    /// Years in practice
    pub experience_years: i32,
    /// Session rate per minute, in minor units
    pub rate_per_minute: i64,
    /// Whether new consultation requests are accepted
    pub is_available: bool,
    /// Set by an administrator once credentials are checked
    pub is_verified: bool,
    /// Cached mean of all rating scores, `None` until the first rating
    pub average_rating: Option<f64>,
    /// Cached number of ratings
    pub rating_count: i32,
}

impl Model {
    #[must_use]
    pub const fn rate_per_minute(&self) -> Money {
        Money::from_minor(self.rate_per_minute)
    }
}

/// Defines relationships between LawyerProfile and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each profile belongs to one lawyer
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
