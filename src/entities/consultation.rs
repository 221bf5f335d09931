//! Consultation request entity - One client/lawyer engagement.
//!
//! The status column follows a one-way state machine:
//! `pending -> accepted | rejected`, `accepted -> completed`.
//! `room_id` is set on acceptance and `amount_paid` on completion.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a consultation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum ConsultationStatus {
    /// Waiting for the lawyer
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Accepted, room minted, session may run
    #[sea_orm(string_value = "accepted")]
    Accepted,
    /// Declined by the lawyer (terminal)
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// Settled (terminal)
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl ConsultationStatus {
    /// Whether the state machine permits moving from `self` to `to`.
    #[must_use]
    pub const fn can_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Accepted | Self::Rejected) | (Self::Accepted, Self::Completed)
        )
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Completed)
    }

    /// Parses a status name as typed by a user.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for ConsultationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        })
    }
}

/// Consultation request database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "consultation_requests")]
pub struct Model {
    /// Unique identifier for the request
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Requesting client
    pub client_id: i64,
    /// Assigned lawyer
    pub lawyer_id: i64,
    /// Area of law (e.g. "Family", "Property")
    pub category: String,
    /// One-line summary from the client
    pub subject: String,
    /// Longer description, may be empty
    pub description: String,
    /// Current lifecycle state
    pub status: ConsultationStatus,
    /// Video room token, minted on acceptance
    #[sea_orm(unique)]
    pub room_id: Option<String>,
    /// Fee settled on completion, in minor units
    pub amount_paid: Option<i64>,
    /// When the client created the request
    pub created_at: DateTimeUtc,
    /// Last status change
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Whether `user_id` is the client or the lawyer on this request.
    #[must_use]
    pub const fn is_party(&self, user_id: i64) -> bool {
        self.client_id == user_id || self.lawyer_id == user_id
    }
}

/// Defines relationships between ConsultationRequest and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The requesting client
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ClientId",
        to = "super::user::Column::Id"
    )]
    Client,
    /// The assigned lawyer
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::LawyerId",
        to = "super::user::Column::Id"
    )]
    Lawyer,
    /// At most one rating per settled consultation
    #[sea_orm(has_one = "super::rating::Entity")]
    Rating,
}

impl Related<super::rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rating.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
