//! Telegram command bot: handler registry, dispatcher and update loop.

pub mod action;
pub mod bot;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod transport;

pub use action::BotAction;
pub use bot::{Bot, PollTiming};
pub use dispatcher::Dispatcher;
pub use error::{AppError, AppResult};
pub use transport::{TelegramTransport, Transport};
