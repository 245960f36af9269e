//! Durable message history for the bot.
//!
//! Every observed or bot-sent message is kept in a SQLite table keyed by
//! `(chat_id, message_id)`. Text can be edited in place and reply links can
//! be resolved back to the referenced message.

mod error;
mod store;
mod types;

pub use error::StoreError;
pub use store::MessageStore;
pub use types::*;
