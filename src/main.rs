use counsel_desk::{
    bot,
    config::{self, database},
    core::{user, video},
    errors::{Error, Result},
};
use dotenvy::dotenv;
use std::{env, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the marketplace configuration
    let app_config = config::marketplace::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {e}"))?;
    let app_config = Arc::new(app_config);

    // 4. Initialize database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {e}"))?;

    // 5. Seed configured users
    user::seed_users(&db, &app_config.users)
        .await
        .inspect_err(|e| error!("Failed to seed users: {e}"))?;

    // 6. Video provider
    let video = video::provider_from_config(&app_config.video)
        .inspect_err(|e| error!("Failed to set up video provider: {e}"))?;

    // 7. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, db, video, app_config).await?;

    Ok(())
}
