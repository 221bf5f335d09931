//! User entity - A registered marketplace participant.
//!
//! Users are identified by their Discord user id and carry a role that never
//! changes after registration. Each user owns exactly one wallet.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marketplace role, fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Requests and pays for consultations
    #[sea_orm(string_value = "client")]
    Client,
    /// Accepts consultations and earns from them
    #[sea_orm(string_value = "lawyer")]
    Lawyer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Client => "client",
            Self::Lawyer => "lawyer",
        })
    }
}

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord user id supplied by the identity layer
    #[sea_orm(unique)]
    pub discord_id: String,
    /// Display name, unique so lawyers can be picked by name
    #[sea_orm(unique)]
    pub username: String,
    /// Client or lawyer
    pub role: Role,
    /// When the user registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has one wallet
    #[sea_orm(has_one = "super::wallet::Entity")]
    Wallet,
    /// A lawyer has one profile
    #[sea_orm(has_one = "super::lawyer_profile::Entity")]
    LawyerProfile,
}

impl Related<super::wallet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl Related<super::lawyer_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LawyerProfile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
