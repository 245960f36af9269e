//! Application configuration loaded from environment variables.

use crate::bot::PollTiming;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Telegram configuration
    pub telegram: TelegramConfig,

    /// Message store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Bot configuration
    #[serde(default)]
    pub bot: BotConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token
    pub token: String,

    /// Bot API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Long-poll timeout for getUpdates, in seconds
    #[serde(default = "default_updates_timeout")]
    pub updates_timeout: u64,

    /// Idle time between polls
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Wait after a failed poll
    #[serde(default = "default_retry_delay", with = "humantime_serde")]
    pub retry_delay: Duration,

    /// Longer text replies are cut and suffixed with "..."
    #[serde(default = "default_max_reply_length")]
    pub max_reply_length: usize,
}

impl TelegramConfig {
    pub fn timing(&self) -> PollTiming {
        PollTiming {
            poll_interval: self.poll_interval,
            retry_delay: self.retry_delay,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// SQLite database path
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.telegram.org".into()
}

fn default_updates_timeout() -> u64 {
    20
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_retry_delay() -> Duration {
    Duration::from_secs(5)
}

fn default_max_reply_length() -> usize {
    4000
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./messages.db")
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_env(config::Environment::default())
    }

    fn from_env(source: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(
                source
                    .separator("__")
                    // Tokens look like "123456:ABC..." and must stay strings
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
