//! Message store errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Message {id} in chat {chat_id} is already stored")]
    Duplicate { chat_id: i64, id: i64 },
}
