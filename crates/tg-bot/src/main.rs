//! Telegram command bot - main entry point.

use anyhow::Context;
use message_store::MessageStore;
use std::sync::Arc;
use telegram_client::TelegramClient;
use tg_bot::commands::{builtin_handlers, Dependencies, Registry};
use tg_bot::config::Config;
use tg_bot::{AppResult, Bot, Dispatcher, TelegramTransport, Transport};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.bot.log_level);

    info!("Starting Telegram bot...");

    // Initialize store and transport
    let store = Arc::new(MessageStore::open(&config.store.path)?);
    if !store.health_check().await {
        error!("Message store at {} is not answering", config.store.path.display());
        return Err(anyhow::anyhow!("Message store unavailable").into());
    }
    info!(
        "Message store ready at {} ({} messages)",
        config.store.path.display(),
        store.message_count().await?
    );

    let client = TelegramClient::new(
        &config.telegram.api_url,
        &config.telegram.token,
        config.telegram.updates_timeout,
    )?;

    // Health checks
    if client.health_check().await {
        info!("Telegram API healthy");
    } else {
        warn!("Telegram API health check failed - will retry while polling");
    }

    let transport: Arc<dyn Transport> = Arc::new(TelegramTransport::new(
        client,
        config.telegram.max_reply_length,
    ));

    // Build command handlers; a broken plugin stops startup here
    let deps = Dependencies::new()
        .with_store(store.clone())
        .with_sender(transport.clone());
    let registry = Registry::build(&builtin_handlers(), &deps)?;
    if registry.is_empty() {
        warn!("No command handlers registered - messages will only be stored");
    }
    info!("Handlers: {}", registry.names().join(", "));

    let mut bot = Bot::new(
        transport,
        store,
        Dispatcher::new(registry),
        config.telegram.timing(),
    );

    tokio::select! {
        _ = bot.run() => {}
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    info!("Shutting down...");
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
