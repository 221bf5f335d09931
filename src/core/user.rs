//! User business logic - Registration, lookup and role checks.
//!
//! Registration always creates the user's wallet in the same transaction, and a
//! lawyer's profile alongside it. Role checks live here so the consultation,
//! settlement and rating modules share a single capability check instead of
//! comparing roles ad hoc.

use crate::{
    config::SeedUser,
    core::{
        money::{Money, ensure_positive},
        wallet,
    },
    entities::{LawyerProfile, Role, User, lawyer_profile, user},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

/// Public details a lawyer supplies when registering.
#[derive(Debug, Clone, Copy)]
pub struct LawyerDetails {
    /// Years in practice, not negative
    pub experience_years: i32,
    /// Session rate, greater than zero
    pub rate_per_minute: Money,
}

/// A lawyer together with their profile, as listed to clients.
#[derive(Debug, Clone)]
pub struct LawyerListing {
    /// The lawyer's account
    pub user: user::Model,
    /// Public details and cached rating
    pub profile: lawyer_profile::Model,
}

/// Fails with [`Error::Unauthorized`] unless `user` has `role`.
pub fn require_role(user: &user::Model, role: Role) -> Result<()> {
    if user.role == role {
        Ok(())
    } else {
        Err(Error::unauthorized(format!(
            "this action is only available to {role}s, you are registered as a {}",
            user.role
        )))
    }
}

fn validate_identity(discord_id: &str, username: &str) -> Result<()> {
    if discord_id.trim().is_empty() {
        return Err(Error::validation("discord id cannot be empty"));
    }
    if username.trim().is_empty() {
        return Err(Error::validation("username cannot be empty"));
    }
    Ok(())
}

async fn insert_user<C>(db: &C, discord_id: &str, username: &str, role: Role) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let existing = User::find()
        .filter(
            user::Column::DiscordId
                .eq(discord_id)
                .or(user::Column::Username.eq(username.trim())),
        )
        .one(db)
        .await?;
    if let Some(existing) = existing {
        return Err(Error::validation(if existing.discord_id == discord_id {
            "you are already registered".to_string()
        } else {
            format!("username '{}' is taken", username.trim())
        }));
    }

    let user = user::ActiveModel {
        discord_id: Set(discord_id.to_string()),
        username: Set(username.trim().to_string()),
        role: Set(role),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let user = user.insert(db).await?;
    wallet::open_wallet(db, user.id).await?;
    Ok(user)
}

/// Registers a client and opens an empty wallet for them.
#[instrument(skip(db))]
pub async fn register_client(
    db: &DatabaseConnection,
    discord_id: &str,
    username: &str,
) -> Result<user::Model> {
    validate_identity(discord_id, username)?;

    let txn = db.begin().await?;
    let user = insert_user(&txn, discord_id, username, Role::Client).await?;
    txn.commit().await?;

    info!(user_id = user.id, "registered client");
    Ok(user)
}

fn validate_lawyer_details(details: LawyerDetails) -> Result<()> {
    if details.experience_years < 0 {
        return Err(Error::validation("experience cannot be negative"));
    }
    ensure_positive(details.rate_per_minute)
}

async fn insert_lawyer<C>(
    db: &C,
    discord_id: &str,
    username: &str,
    details: LawyerDetails,
) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let user = insert_user(db, discord_id, username, Role::Lawyer).await?;
    let profile = lawyer_profile::ActiveModel {
        user_id: Set(user.id),
        experience_years: Set(details.experience_years),
        rate_per_minute: Set(details.rate_per_minute.minor_units()),
        is_available: Set(true),
        is_verified: Set(false),
        average_rating: Set(None),
        rating_count: Set(0),
    };
    profile.insert(db).await?;
    Ok(user)
}

/// Registers a lawyer with their profile and an empty wallet.
#[instrument(skip(db))]
pub async fn register_lawyer(
    db: &DatabaseConnection,
    discord_id: &str,
    username: &str,
    details: LawyerDetails,
) -> Result<user::Model> {
    validate_identity(discord_id, username)?;
    validate_lawyer_details(details)?;

    let txn = db.begin().await?;
    let user = insert_lawyer(&txn, discord_id, username, details).await?;
    txn.commit().await?;

    info!(user_id = user.id, "registered lawyer");
    Ok(user)
}

/// Finds a user by Discord id.
pub async fn get_user_by_discord_id<C>(db: &C, discord_id: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::DiscordId.eq(discord_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a user by Discord id, failing with [`Error::NotFound`] if unregistered.
pub async fn require_user_by_discord_id<C>(db: &C, discord_id: &str) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    get_user_by_discord_id(db, discord_id)
        .await?
        .ok_or_else(|| Error::not_found("Registered user", discord_id))
}

/// Finds a user by primary key.
pub async fn get_user_by_id<C>(db: &C, user_id: i64) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("User", user_id))
}

/// Finds a lawyer by username.
pub async fn get_lawyer_by_username<C>(db: &C, username: &str) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::Username.eq(username.trim()))
        .filter(user::Column::Role.eq(Role::Lawyer))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Lawyer", username.trim()))
}

/// Loads a lawyer's profile.
pub async fn get_lawyer_profile<C>(db: &C, lawyer_id: i64) -> Result<lawyer_profile::Model>
where
    C: ConnectionTrait,
{
    LawyerProfile::find_by_id(lawyer_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Lawyer profile", lawyer_id))
}

/// Lawyers currently taking requests, best rated first.
pub async fn list_available_lawyers(db: &DatabaseConnection) -> Result<Vec<LawyerListing>> {
    let rows = LawyerProfile::find()
        .filter(lawyer_profile::Column::IsAvailable.eq(true))
        .find_also_related(User)
        .order_by_desc(lawyer_profile::Column::AverageRating)
        .order_by_asc(user::Column::Username)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(profile, user)| user.map(|user| LawyerListing { user, profile }))
        .collect())
}

/// Lets a lawyer stop or resume taking new requests.
pub async fn set_availability(
    db: &DatabaseConnection,
    caller: &user::Model,
    available: bool,
) -> Result<lawyer_profile::Model> {
    require_role(caller, Role::Lawyer)?;
    let mut profile: lawyer_profile::ActiveModel =
        get_lawyer_profile(db, caller.id).await?.into();
    profile.is_available = Set(available);
    let profile = profile.update(db).await?;
    info!(user_id = caller.id, available, "lawyer availability changed");
    Ok(profile)
}

/// Lawyer details of a seed entry, `None` for clients.
fn seed_lawyer_details(seed: &SeedUser) -> Result<Option<LawyerDetails>> {
    if seed.role != Role::Lawyer {
        return Ok(None);
    }
    let rate = seed.rate_per_minute.as_deref().ok_or_else(|| Error::Config {
        message: format!("lawyer '{}' has no rate_per_minute", seed.username),
    })?;
    let details = LawyerDetails {
        experience_years: seed.experience_years.unwrap_or(0),
        rate_per_minute: Money::parse_positive(rate)?,
    };
    validate_lawyer_details(details)?;
    Ok(Some(details))
}

/// Opening deposit of a seed entry, `None` when absent or not positive.
fn seed_opening_balance(seed: &SeedUser) -> Result<Option<Money>> {
    let Some(opening) = seed.opening_balance.as_deref() else {
        return Ok(None);
    };
    let amount = Money::parse(opening)?;
    if amount.is_positive() {
        Ok(Some(amount))
    } else {
        warn!(username = %seed.username, "ignoring non-positive opening balance");
        Ok(None)
    }
}

/// Registers the configured users that are not in the database yet.
///
/// Users already registered (by Discord id) are left untouched, so this is safe
/// to run on every start-up. Each user is registered and funded in one
/// transaction: a seed entry that fails leaves nothing behind and is retried on
/// the next start-up.
pub async fn seed_users(db: &DatabaseConnection, seeds: &[SeedUser]) -> Result<usize> {
    let mut created = 0;
    for seed in seeds {
        if get_user_by_discord_id(db, &seed.discord_id).await?.is_some() {
            continue;
        }

        validate_identity(&seed.discord_id, &seed.username)?;
        let details = seed_lawyer_details(seed)?;
        let opening = seed_opening_balance(seed)?;

        let txn = db.begin().await?;
        let user = match details {
            Some(details) => insert_lawyer(&txn, &seed.discord_id, &seed.username, details).await?,
            None => insert_user(&txn, &seed.discord_id, &seed.username, Role::Client).await?,
        };
        if let Some(amount) = opening {
            let wallet = wallet::get_wallet_for_user(&txn, user.id).await?;
            wallet::credit(&txn, wallet.id, amount, wallet::DEPOSIT_DESCRIPTION).await?;
        }
        txn.commit().await?;

        info!(user_id = user.id, role = %user.role, "seeded user");
        created += 1;
    }

    info!("Seeded {created} users from configuration");
    Ok(created)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_register_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = register_client(&db, "", "asha").await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = register_client(&db, "1001", "   ").await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let details = LawyerDetails {
            experience_years: 3,
            rate_per_minute: Money::ZERO,
        };
        let result = register_lawyer(&db, "2002", "mehta", details).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_register_client_opens_empty_wallet() -> Result<()> {
        let db = setup_test_db().await?;

        let client = register_client(&db, "1001", " asha ").await?;

        assert_eq!(client.role, Role::Client);
        assert_eq!(client.username, "asha");
        let wallet = wallet::get_wallet_for_user(&db, client.id).await?;
        assert_eq!(wallet.balance(), Money::ZERO);
        assert!(LawyerProfile::find_by_id(client.id).one(&db).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_register_lawyer_creates_profile() -> Result<()> {
        let db = setup_test_db().await?;

        let lawyer = create_test_lawyer(&db, "mehta", "20.00").await?;

        assert_eq!(lawyer.role, Role::Lawyer);
        let profile = get_lawyer_profile(&db, lawyer.id).await?;
        assert_eq!(profile.rate_per_minute(), money("20.00"));
        assert!(profile.is_available);
        assert_eq!(profile.average_rating, None);
        assert_eq!(profile.rating_count, 0);
        wallet::get_wallet_for_user(&db, lawyer.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        register_client(&db, "1001", "asha").await?;

        let same_id = register_client(&db, "1001", "someone_else").await;
        assert!(matches!(same_id, Err(Error::Validation { .. })));

        let same_name = register_client(&db, "1002", "asha").await;
        assert!(matches!(same_name, Err(Error::Validation { .. })));

        assert!(get_user_by_discord_id(&db, "1002").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_require_role() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_client(&db, "asha").await?;
        let lawyer = create_test_lawyer(&db, "mehta", "20.00").await?;

        assert!(require_role(&client, Role::Client).is_ok());
        assert!(matches!(
            require_role(&client, Role::Lawyer),
            Err(Error::Unauthorized { .. })
        ));
        assert!(require_role(&lawyer, Role::Lawyer).is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn test_lookup_by_discord_id() -> Result<()> {
        let db = setup_test_db().await?;
        let client = register_client(&db, "1001", "asha").await?;

        assert_eq!(require_user_by_discord_id(&db, "1001").await?, client);
        assert!(matches!(
            require_user_by_discord_id(&db, "9999").await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_lawyer_by_username_ignores_clients() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_client(&db, "asha").await?;
        let lawyer = create_test_lawyer(&db, "mehta", "20.00").await?;

        assert_eq!(get_lawyer_by_username(&db, "mehta").await?.id, lawyer.id);
        assert!(matches!(
            get_lawyer_by_username(&db, "asha").await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_availability_controls_listing() -> Result<()> {
        let db = setup_test_db().await?;
        let client = create_test_client(&db, "asha").await?;
        let mehta = create_test_lawyer(&db, "mehta", "20.00").await?;
        let rao = create_test_lawyer(&db, "rao", "15.00").await?;

        let listed = list_available_lawyers(&db).await?;
        assert_eq!(listed.len(), 2);

        let profile = set_availability(&db, &mehta, false).await?;
        assert!(!profile.is_available);

        let listed = list_available_lawyers(&db).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].user.id, rao.id);

        let result = set_availability(&db, &client, false).await;
        assert!(matches!(result, Err(Error::Unauthorized { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_users_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let seeds = vec![
            SeedUser {
                discord_id: "1001".to_string(),
                username: "asha".to_string(),
                role: Role::Client,
                opening_balance: Some("500.00".to_string()),
                experience_years: None,
                rate_per_minute: None,
            },
            SeedUser {
                discord_id: "2002".to_string(),
                username: "mehta".to_string(),
                role: Role::Lawyer,
                opening_balance: None,
                experience_years: Some(12),
                rate_per_minute: Some("20.00".to_string()),
            },
        ];

        assert_eq!(seed_users(&db, &seeds).await?, 2);
        assert_eq!(seed_users(&db, &seeds).await?, 0);

        let asha = require_user_by_discord_id(&db, "1001").await?;
        assert_eq!(wallet::get_balance(&db, asha.id).await?, money("500.00"));
        let mehta = require_user_by_discord_id(&db, "2002").await?;
        assert_eq!(get_lawyer_profile(&db, mehta.id).await?.experience_years, 12);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_seed_leaves_no_partial_user() -> Result<()> {
        let db = setup_test_db().await?;
        let mut seed = SeedUser {
            discord_id: "1001".to_string(),
            username: "asha".to_string(),
            role: Role::Client,
            opening_balance: Some("12.345".to_string()),
            experience_years: None,
            rate_per_minute: None,
        };

        let result = seed_users(&db, std::slice::from_ref(&seed)).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(get_user_by_discord_id(&db, "1001").await?.is_none());

        // Once the entry is corrected the next start-up seeds it in full
        seed.opening_balance = Some("12.34".to_string());
        assert_eq!(seed_users(&db, &[seed]).await?, 1);
        let asha = require_user_by_discord_id(&db, "1001").await?;
        assert_eq!(wallet::get_balance(&db, asha.id).await?, money("12.34"));
        let wallet = wallet::get_wallet_for_user(&db, asha.id).await?;
        assert!(wallet::verify_wallet(&db, wallet.id).await?.is_consistent());
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_lawyer_without_rate_is_config_error() -> Result<()> {
        let db = setup_test_db().await?;
        let seeds = vec![SeedUser {
            discord_id: "2002".to_string(),
            username: "mehta".to_string(),
            role: Role::Lawyer,
            opening_balance: None,
            experience_years: None,
            rate_per_minute: None,
        }];

        assert!(matches!(
            seed_users(&db, &seeds).await,
            Err(Error::Config { .. })
        ));
        Ok(())
    }
}
