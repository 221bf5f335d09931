//! Rating aggregator - Client feedback on settled consultations.
//!
//! A lawyer's average is always derivable from the raw `ratings` rows. The
//! profile also carries a cached average and count for listings; the cache is
//! rewritten in the same transaction as the rating insert so the two never
//! disagree after a commit.

use crate::{
    core::consultation::get_consultation,
    entities::{ConsultationStatus, LawyerProfile, Rating, lawyer_profile, rating, user},
    errors::{Error, Result},
};
use sea_orm::{
    QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait, prelude::*, sea_query::Expr,
};
use tracing::{info, instrument};

/// Lowest accepted score.
pub const MIN_SCORE: i32 = 1;
/// Highest accepted score.
pub const MAX_SCORE: i32 = 5;

fn validate_score(score: i32) -> Result<()> {
    if (MIN_SCORE..=MAX_SCORE).contains(&score) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "score must be between {MIN_SCORE} and {MAX_SCORE}, got {score}"
        )))
    }
}

/// Sum and count of a lawyer's scores.
async fn score_totals<C>(db: &C, lawyer_id: i64) -> Result<(i64, i64)>
where
    C: ConnectionTrait,
{
    let totals = Rating::find()
        .select_only()
        .column_as(Expr::col(rating::Column::Score).sum(), "total")
        .column_as(Expr::col(rating::Column::Id).count(), "count")
        .filter(rating::Column::LawyerId.eq(lawyer_id))
        .into_tuple::<(Option<i64>, i64)>()
        .one(db)
        .await?;

    Ok(match totals {
        Some((total, count)) => (total.unwrap_or(0), count),
        None => (0, 0),
    })
}

#[allow(clippy::cast_precision_loss)]
fn mean(total: i64, count: i64) -> Option<f64> {
    (count > 0).then(|| total as f64 / count as f64)
}

/// Mean score of a lawyer, recomputed from the ratings table.
///
/// `None` when the lawyer has not been rated yet.
pub async fn average_for<C>(db: &C, lawyer_id: i64) -> Result<Option<f64>>
where
    C: ConnectionTrait,
{
    let (total, count) = score_totals(db, lawyer_id).await?;
    Ok(mean(total, count))
}

async fn refresh_profile_cache<C>(db: &C, lawyer_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let (total, count) = score_totals(db, lawyer_id).await?;
    let changes = lawyer_profile::ActiveModel {
        average_rating: Set(mean(total, count)),
        rating_count: Set(i32::try_from(count).unwrap_or(i32::MAX)),
        ..Default::default()
    };
    LawyerProfile::update_many()
        .set(changes)
        .filter(lawyer_profile::Column::UserId.eq(lawyer_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Records the client's rating of a completed consultation.
///
/// The score is checked before anything is read. The consultation must exist,
/// `caller` must be its client, it must be completed and not yet rated.
#[instrument(skip(db, caller, review), fields(caller_id = caller.id))]
pub async fn submit(
    db: &DatabaseConnection,
    caller: &user::Model,
    consultation_id: i64,
    score: i32,
    review: &str,
) -> Result<rating::Model> {
    validate_score(score)?;

    let txn = db.begin().await?;

    let consultation = get_consultation(&txn, consultation_id).await?;
    if consultation.client_id != caller.id {
        return Err(Error::unauthorized(
            "only the client on this consultation can rate it",
        ));
    }
    if consultation.status != ConsultationStatus::Completed {
        return Err(Error::InvalidTransition {
            from: consultation.status,
            action: "rate",
        });
    }

    let already_rated = Rating::find()
        .filter(rating::Column::ConsultationId.eq(consultation_id))
        .one(&txn)
        .await?
        .is_some();
    if already_rated {
        return Err(Error::validation(format!(
            "consultation #{consultation_id} has already been rated"
        )));
    }

    let model = rating::ActiveModel {
        consultation_id: Set(consultation_id),
        client_id: Set(consultation.client_id),
        lawyer_id: Set(consultation.lawyer_id),
        score: Set(score),
        review: Set(review.trim().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let created = model.insert(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Error::validation(format!(
            "consultation #{consultation_id} has already been rated"
        )),
        _ => Error::Database(e),
    })?;

    refresh_profile_cache(&txn, consultation.lawyer_id).await?;
    txn.commit().await?;

    info!(
        consultation_id,
        lawyer_id = consultation.lawyer_id,
        score,
        "consultation rated"
    );
    Ok(created)
}

/// Ratings a lawyer has received, newest first.
pub async fn list_for_lawyer<C>(db: &C, lawyer_id: i64) -> Result<Vec<rating::Model>>
where
    C: ConnectionTrait,
{
    Rating::find()
        .filter(rating::Column::LawyerId.eq(lawyer_id))
        .order_by_desc(rating::Column::CreatedAt)
        .order_by_desc(rating::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
