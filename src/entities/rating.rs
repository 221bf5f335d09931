//! Rating entity - Post-session feedback from a client about a lawyer.
//!
//! One rating per settled consultation; immutable once written.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Rating database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ratings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// The consultation being rated
    #[sea_orm(unique)]
    pub consultation_id: i64,
    pub client_id: i64,
    pub lawyer_id: i64,
    /// Integer score from 1 to 5
    pub score: i32,
    /// Free-text review, may be empty
    pub review: String,
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Rating and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The consultation this feedback is about
    #[sea_orm(
        belongs_to = "super::consultation::Entity",
        from = "Column::ConsultationId",
        to = "super::consultation::Column::Id"
    )]
    Consultation,
}

impl Related<super::consultation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Consultation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
