use std::sync::Arc;

use eyre::{Result, WrapErr};
use rollcall_core::orchestrator::Orchestrator;
use rollcall_db::{DbPool, PgStore};
use serenity::{Client, http::Http, prelude::GatewayIntents};
use tracing::info;

pub mod config;
pub mod handlers;
pub mod platform;

use crate::platform::DiscordPlatform;

/// Gateway events the bot reacts to. Message content and the member list
/// are privileged and must be enabled for the application.
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS
}

/// Start the Discord bot with the provided configuration and database connection.
///
/// Templates are loaded and validated before connecting. Runs until the
/// gateway connection ends or fails.
pub async fn start_bot(config: config::BotConfig, db_pool: DbPool) -> Result<()> {
    info!("Starting Discord bot");

    let templates = config.load_templates()?;
    info!(templates = templates.len(), timezone = %config.timezone, "loaded recurring events");

    let store = Arc::new(PgStore::new(db_pool));
    let platform = Arc::new(DiscordPlatform::new(Arc::new(Http::new(&config.token))));
    let orchestrator = Arc::new(Orchestrator::new(store, platform, config.settings(templates)));

    let handler = handlers::Handler::new(orchestrator, config.tick_period());

    let mut client = Client::builder(&config.token, intents())
        .event_handler(handler)
        .await
        .wrap_err("Failed to create Discord client")?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C, shutting down");
            shard_manager.lock().await.shutdown_all().await;
        }
    });

    info!("Connecting to Discord...");
    client.start().await?;

    Ok(())
}
