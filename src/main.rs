use color_eyre::eyre::{Result, WrapErr};
use dotenv::dotenv;
use rollcall_db::{create_pool, schema::initialize_database};
use rollcall_discord_bot::config::BotConfig;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Rollcall Discord bot");

    // Load configuration
    let config = BotConfig::from_env()?;

    // Create database connection pool
    let db_pool = create_pool(&config.database_url)
        .await
        .wrap_err("Failed to connect to the database")?;

    // Initialize database schema
    initialize_database(&db_pool).await?;

    // Start the Discord bot
    if let Err(e) = rollcall_discord_bot::start_bot(config, db_pool).await {
        error!("Discord bot error: {}", e);
        return Err(e);
    }

    info!("Discord bot shut down gracefully");
    Ok(())
}
