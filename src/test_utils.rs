//! Shared test utilities for `CounselDesk`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating users, wallets and consultations with sensible defaults.

use crate::{
    core::{
        consultation::{self, NewConsultation},
        money::Money,
        user::{self, LawyerDetails},
        wallet,
    },
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a file-backed `SQLite` database in a fresh temporary directory.
///
/// Unlike the in-memory database, this one is served by a pool of several
/// connections, so concurrent callers really do race. Keep the returned
/// [`tempfile::TempDir`] alive for as long as the connection is used.
pub async fn setup_file_test_db() -> Result<(DatabaseConnection, tempfile::TempDir)> {
    let dir = tempfile::tempdir()?;
    let url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("counsel_desk.sqlite").display()
    );
    let db = sea_orm::Database::connect(&url).await?;
    crate::config::database::create_tables(&db).await?;
    Ok((db, dir))
}

/// Routes `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Parses a decimal amount such as `"500.00"`.
///
/// # Panics
/// If `amount` is not a valid amount; test inputs are literals.
#[allow(clippy::unwrap_used)]
pub fn money(amount: &str) -> Money {
    Money::parse(amount).unwrap()
}

/// Registers a client whose Discord id is derived from `name`.
pub async fn create_test_client(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::user::Model> {
    user::register_client(db, &format!("discord-{name}"), name).await
}

/// Registers a lawyer with `rate` per minute.
///
/// # Defaults
/// * `experience_years`: 5
pub async fn create_test_lawyer(
    db: &DatabaseConnection,
    name: &str,
    rate: &str,
) -> Result<entities::user::Model> {
    let details = LawyerDetails {
        experience_years: 5,
        rate_per_minute: money(rate),
    };
    user::register_lawyer(db, &format!("discord-{name}"), name, details).await
}

/// Deposits `amount` into the user's wallet and returns the updated wallet.
pub async fn fund_wallet(
    db: &DatabaseConnection,
    owner: &entities::user::Model,
    amount: &str,
) -> Result<entities::wallet::Model> {
    wallet::deposit(db, owner, money(amount)).await
}

/// A request body addressed to `lawyer_id`.
pub fn new_request(lawyer_id: i64) -> NewConsultation {
    NewConsultation {
        lawyer_id,
        category: "Property".to_string(),
        subject: "Tenancy deposit dispute".to_string(),
        description: "Landlord is withholding the full deposit.".to_string(),
    }
}

/// Sets up a database with client "asha" and lawyer "mehta" (20.00 per minute).
/// Returns (db, client, lawyer).
pub async fn setup_client_and_lawyer() -> Result<(
    DatabaseConnection,
    entities::user::Model,
    entities::user::Model,
)> {
    let db = setup_test_db().await?;
    let (client, lawyer) = create_client_and_lawyer(&db).await?;
    Ok((db, client, lawyer))
}

/// Registers client "asha" and lawyer "mehta" (20.00 per minute) in `db`.
pub async fn create_client_and_lawyer(
    db: &DatabaseConnection,
) -> Result<(entities::user::Model, entities::user::Model)> {
    let client = create_test_client(db, "asha").await?;
    let lawyer = create_test_lawyer(db, "mehta", "20.00").await?;
    Ok((client, lawyer))
}

/// Everything needed to exercise settlement.
pub struct AcceptedConsultation {
    pub db: DatabaseConnection,
    pub client: entities::user::Model,
    pub lawyer: entities::user::Model,
    pub consultation: entities::consultation::Model,
    pub room_id: String,
}

/// Sets up an accepted consultation whose client holds `client_balance`.
pub async fn setup_accepted_consultation(client_balance: &str) -> Result<AcceptedConsultation> {
    accepted_consultation_in(setup_test_db().await?, client_balance).await
}

/// Same as [`setup_accepted_consultation`], on an existing empty database.
#[allow(clippy::unwrap_used)]
pub async fn accepted_consultation_in(
    db: DatabaseConnection,
    client_balance: &str,
) -> Result<AcceptedConsultation> {
    let (client, lawyer) = create_client_and_lawyer(&db).await?;
    if money(client_balance).is_positive() {
        fund_wallet(&db, &client, client_balance).await?;
    }
    let request = consultation::create_request(&db, &client, new_request(lawyer.id)).await?;
    let accepted = consultation::accept(&db, &lawyer, request.id).await?;
    let room_id = accepted.room_id.clone().unwrap();
    Ok(AcceptedConsultation {
        db,
        client,
        lawyer,
        consultation: accepted,
        room_id,
    })
}
