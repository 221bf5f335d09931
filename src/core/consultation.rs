//! Consultation business logic - Request lifecycle and party access checks.
//!
//! Status changes are applied with a conditional `UPDATE ... WHERE status = ?`
//! and confirmed through the affected row count. When two callers race on the
//! same request only one update matches; the other observes the new status and
//! fails with [`Error::InvalidTransition`].
//!
//! Reads and writes are only served to the request's client or lawyer; that
//! check runs before any state machine guard so a third party learns nothing
//! about the request's state.

use crate::{
    core::{
        money::Money,
        user::{get_lawyer_profile, get_user_by_id, require_role},
        video::VideoRoomProvider,
    },
    entities::{Consultation, ConsultationStatus, Role, consultation, user},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument, warn};

/// What a client supplies when asking a lawyer for a consultation.
#[derive(Debug, Clone)]
pub struct NewConsultation {
    /// The lawyer being asked
    pub lawyer_id: i64,
    /// Area of law
    pub category: String,
    /// One-line summary
    pub subject: String,
    /// Free-text details, may be empty
    pub description: String,
}

/// Where a party can join an accepted consultation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinInfo {
    /// The consultation being joined
    pub consultation_id: i64,
    /// Room token minted on acceptance
    pub room_id: String,
    /// `None` when the video provider could not be reached; joining may be retried
    pub join_url: Option<String>,
}

/// Mints a room token for a consultation.
///
/// The consultation id namespaces the token, and a random 32-bit suffix keeps it
/// unguessable.
#[must_use]
pub fn mint_room_id(consultation_id: i64) -> String {
    format!("consult-{consultation_id}-{:08x}", rand::random::<u32>())
}

/// Creates a pending consultation request from a client to a lawyer.
#[instrument(skip(db, request), fields(lawyer_id = request.lawyer_id))]
pub async fn create_request(
    db: &DatabaseConnection,
    caller: &user::Model,
    request: NewConsultation,
) -> Result<consultation::Model> {
    require_role(caller, Role::Client)?;

    let category = request.category.trim();
    let subject = request.subject.trim();
    if category.is_empty() {
        return Err(Error::validation("category cannot be empty"));
    }
    if subject.is_empty() {
        return Err(Error::validation("subject cannot be empty"));
    }
    if request.lawyer_id == caller.id {
        return Err(Error::validation("you cannot request a consultation with yourself"));
    }

    let lawyer = get_user_by_id(db, request.lawyer_id).await?;
    if lawyer.role != Role::Lawyer {
        return Err(Error::validation(format!("{} is not a lawyer", lawyer.username)));
    }
    let profile = get_lawyer_profile(db, lawyer.id).await?;
    if !profile.is_available {
        return Err(Error::validation(format!(
            "{} is not taking new consultations right now",
            lawyer.username
        )));
    }

    let now = chrono::Utc::now();
    let model = consultation::ActiveModel {
        client_id: Set(caller.id),
        lawyer_id: Set(lawyer.id),
        category: Set(category.to_string()),
        subject: Set(subject.to_string()),
        description: Set(request.description.trim().to_string()),
        status: Set(ConsultationStatus::Pending),
        room_id: Set(None),
        amount_paid: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = model.insert(db).await?;

    info!(consultation_id = created.id, client_id = caller.id, "consultation requested");
    Ok(created)
}

/// Loads a consultation by id without any access check.
pub(crate) async fn get_consultation<C>(db: &C, consultation_id: i64) -> Result<consultation::Model>
where
    C: ConnectionTrait,
{
    Consultation::find_by_id(consultation_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Consultation", consultation_id))
}

/// Fails with [`Error::Unauthorized`] unless `caller` is the client or lawyer on `consultation`.
pub fn require_party(consultation: &consultation::Model, caller: &user::Model) -> Result<()> {
    if consultation.is_party(caller.id) {
        Ok(())
    } else {
        Err(Error::unauthorized(format!(
            "you are not a party to consultation #{}",
            consultation.id
        )))
    }
}

/// Loads a consultation on behalf of one of its parties.
pub async fn get_for_party<C>(
    db: &C,
    caller: &user::Model,
    consultation_id: i64,
) -> Result<consultation::Model>
where
    C: ConnectionTrait,
{
    let consultation = get_consultation(db, consultation_id).await?;
    require_party(&consultation, caller)?;
    Ok(consultation)
}

/// Finds a consultation by its room token.
pub async fn get_by_room_id<C>(db: &C, room_id: &str) -> Result<consultation::Model>
where
    C: ConnectionTrait,
{
    Consultation::find()
        .filter(consultation::Column::RoomId.eq(room_id.trim()))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Consultation room", room_id.trim()))
}

fn require_assigned_lawyer(consultation: &consultation::Model, caller: &user::Model) -> Result<()> {
    require_party(consultation, caller)?;
    if consultation.lawyer_id == caller.id {
        Ok(())
    } else {
        Err(Error::unauthorized(
            "only the assigned lawyer can respond to this request",
        ))
    }
}

/// Applies `from -> to` if the row is still in `from`.
///
/// Returns the number of rows changed: 0 means another writer got there first
/// or the request was never in `from`.
async fn guarded_transition<C>(
    db: &C,
    consultation_id: i64,
    from: ConsultationStatus,
    changes: consultation::ActiveModel,
) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = Consultation::update_many()
        .set(changes)
        .filter(consultation::Column::Id.eq(consultation_id))
        .filter(consultation::Column::Status.eq(from))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

async fn respond<C>(
    db: &C,
    caller: &user::Model,
    consultation_id: i64,
    to: ConsultationStatus,
    action: &'static str,
) -> Result<consultation::Model>
where
    C: ConnectionTrait,
{
    let consultation = get_consultation(db, consultation_id).await?;
    require_assigned_lawyer(&consultation, caller)?;
    if !consultation.status.can_transition(to) {
        return Err(Error::InvalidTransition {
            from: consultation.status,
            action,
        });
    }

    let room_id = (to == ConsultationStatus::Accepted).then(|| mint_room_id(consultation_id));
    let changes = consultation::ActiveModel {
        status: Set(to),
        room_id: Set(room_id),
        updated_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    if guarded_transition(db, consultation_id, ConsultationStatus::Pending, changes).await? == 0 {
        let current = get_consultation(db, consultation_id).await?;
        return Err(Error::InvalidTransition {
            from: current.status,
            action,
        });
    }

    let updated = get_consultation(db, consultation_id).await?;
    info!(consultation_id, status = %updated.status, room_id = ?updated.room_id, "consultation {action}ed");
    Ok(updated)
}

/// Accepts a pending request and mints its room id. Assigned lawyer only.
#[instrument(skip(db, caller), fields(caller_id = caller.id))]
pub async fn accept(
    db: &DatabaseConnection,
    caller: &user::Model,
    consultation_id: i64,
) -> Result<consultation::Model> {
    respond(db, caller, consultation_id, ConsultationStatus::Accepted, "accept").await
}

/// Rejects a pending request. Assigned lawyer only.
#[instrument(skip(db, caller), fields(caller_id = caller.id))]
pub async fn reject(
    db: &DatabaseConnection,
    caller: &user::Model,
    consultation_id: i64,
) -> Result<consultation::Model> {
    respond(db, caller, consultation_id, ConsultationStatus::Rejected, "reject").await
}

/// Moves an accepted consultation to completed and records the fee.
///
/// Only the settlement coordinator calls this, inside its transaction.
pub(crate) async fn mark_completed<C>(db: &C, consultation_id: i64, amount: Money) -> Result<()>
where
    C: ConnectionTrait,
{
    let changes = consultation::ActiveModel {
        status: Set(ConsultationStatus::Completed),
        amount_paid: Set(Some(amount.minor_units())),
        updated_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    if guarded_transition(db, consultation_id, ConsultationStatus::Accepted, changes).await? == 0 {
        let current = get_consultation(db, consultation_id).await?;
        return Err(Error::InvalidTransition {
            from: current.status,
            action: "settle",
        });
    }
    Ok(())
}

/// Consultations a client has requested, newest first.
pub async fn list_for_client(
    db: &DatabaseConnection,
    client: &user::Model,
) -> Result<Vec<consultation::Model>> {
    require_role(client, Role::Client)?;
    Consultation::find()
        .filter(consultation::Column::ClientId.eq(client.id))
        .order_by_desc(consultation::Column::CreatedAt)
        .order_by_desc(consultation::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Consultations assigned to a lawyer, optionally filtered by status, newest first.
pub async fn list_for_lawyer(
    db: &DatabaseConnection,
    lawyer: &user::Model,
    status: Option<ConsultationStatus>,
) -> Result<Vec<consultation::Model>> {
    require_role(lawyer, Role::Lawyer)?;
    let mut query = Consultation::find().filter(consultation::Column::LawyerId.eq(lawyer.id));
    if let Some(status) = status {
        query = query.filter(consultation::Column::Status.eq(status));
    }
    query
        .order_by_desc(consultation::Column::CreatedAt)
        .order_by_desc(consultation::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The caller's consultations from whichever side their role puts them on.
pub async fn list_for_user(
    db: &DatabaseConnection,
    user: &user::Model,
    status: Option<ConsultationStatus>,
) -> Result<Vec<consultation::Model>> {
    match user.role {
        Role::Client => {
            let mut all = list_for_client(db, user).await?;
            if let Some(status) = status {
                all.retain(|c| c.status == status);
            }
            Ok(all)
        }
        Role::Lawyer => list_for_lawyer(db, user, status).await,
    }
}

/// Resolves the join URL for an accepted consultation.
///
/// The provider is asked to make sure the room exists. If it fails, the error is
/// logged and the returned [`JoinInfo`] carries no URL; consultation state is
/// never affected by the provider.
pub async fn join_room(
    db: &DatabaseConnection,
    caller: &user::Model,
    consultation_id: i64,
    provider: &dyn VideoRoomProvider,
) -> Result<JoinInfo> {
    let consultation = get_for_party(db, caller, consultation_id).await?;
    let room_id = match (consultation.status, consultation.room_id) {
        (ConsultationStatus::Accepted, Some(room_id)) => room_id,
        (status, _) => {
            return Err(Error::InvalidTransition {
                from: status,
                action: "join",
            });
        }
    };

    let join_url = match provider.ensure_room(&room_id).await {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(consultation_id, %room_id, "video room provisioning failed: {e}");
            None
        }
    };

    Ok(JoinInfo {
        consultation_id,
        room_id,
        join_url,
    })
}
