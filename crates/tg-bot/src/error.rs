//! Application error types.

use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Telegram error: {0}")]
    Telegram(#[from] telegram_client::TelegramError),

    #[error("Store error: {0}")]
    Store(#[from] message_store::StoreError),

    #[error("Handler '{handler}' requires unknown dependency '{dependency}'")]
    MisconfiguredHandler { handler: String, dependency: String },
}

/// Result type alias for application errors.
pub type AppResult<T> = Result<T, AppError>;
