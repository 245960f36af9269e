//! SQLite-backed message store.

use crate::error::StoreError;
use crate::types::*;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS messages (
    chat_id INTEGER NOT NULL,
    message_id INTEGER NOT NULL,
    sender_name TEXT NOT NULL,
    sender_username TEXT,
    sender_id INTEGER NOT NULL,
    text TEXT,
    reply_id INTEGER,
    file_id TEXT,
    file_type TEXT,
    PRIMARY KEY (chat_id, message_id)
);
";

const SELECT_COLUMNS: &str = "message_id, sender_name, sender_username, sender_id, chat_id, \
                              text, reply_id, file_id, file_type";

/// Durable record of every observed message, keyed by `(chat_id, id)`.
///
/// A single connection sits behind an async mutex, so every write is
/// visible to the next read.
#[derive(Clone)]
pub struct MessageStore {
    conn: Arc<Mutex<Connection>>,
}

impl MessageStore {
    /// Open or create the database at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        // journal_mode returns the resulting mode, so it has to go through query_row
        let _: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        conn.execute_batch(SCHEMA)?;

        info!("Message store opened at {}", path.display());
        Ok(Self::from_connection(conn))
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Store a new message.
    ///
    /// Fails with [`StoreError::Duplicate`] when the `(chat_id, id)` pair is
    /// already present; the stored row is left untouched.
    #[instrument(skip(self, message), fields(chat_id = message.chat_id, id = message.id))]
    pub async fn insert(&self, message: &Message) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO messages
                (message_id, sender_name, sender_username, sender_id, chat_id,
                 text, reply_id, file_id, file_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                message.id,
                &message.sender_name,
                &message.sender_username,
                message.sender_id,
                message.chat_id,
                &message.text,
                message.reply_id,
                &message.file_id,
                message.file_type.as_column(),
            ],
        )?;

        if inserted == 0 {
            return Err(StoreError::Duplicate {
                chat_id: message.chat_id,
                id: message.id,
            });
        }

        debug!("Stored message");
        Ok(())
    }

    /// Replace the text of a stored message.
    ///
    /// Returns `false` when the message is not tracked. No row is created in
    /// that case.
    #[instrument(skip(self, text))]
    pub async fn edit(&self, chat_id: i64, id: i64, text: &str) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let updated = conn.execute(
            "UPDATE messages SET text = ?1 WHERE chat_id = ?2 AND message_id = ?3",
            params![text, chat_id, id],
        )?;

        Ok(updated > 0)
    }

    /// Look up a message by key.
    pub async fn get(&self, chat_id: i64, id: i64) -> Result<Option<Message>, StoreError> {
        let conn = self.conn.lock().await;
        let message = conn
            .query_row(
                &format!(
                    "SELECT {} FROM messages WHERE chat_id = ?1 AND message_id = ?2",
                    SELECT_COLUMNS
                ),
                params![chat_id, id],
                row_to_message,
            )
            .optional()?;

        Ok(message)
    }

    /// Resolve the message that `message` replies to.
    ///
    /// `None` when the message is not a reply, or when the referenced message
    /// was never stored (e.g. it predates the bot).
    pub async fn resolve_reply(&self, message: &Message) -> Result<Option<Message>, StoreError> {
        match message.reply_id {
            Some(reply_id) => self.get(message.chat_id, reply_id).await,
            None => Ok(None),
        }
    }

    /// Total number of stored messages.
    pub async fn message_count(&self) -> Result<usize, StoreError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Check that the database answers queries.
    pub async fn health_check(&self) -> bool {
        let conn = self.conn.lock().await;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .is_ok()
    }
}

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<Message> {
    let file_type: Option<String> = row.get(8)?;
    Ok(Message {
        id: row.get(0)?,
        sender_name: row.get(1)?,
        sender_username: row.get(2)?,
        sender_id: row.get(3)?,
        chat_id: row.get(4)?,
        text: row.get(5)?,
        reply_id: row.get(6)?,
        file_id: row.get(7)?,
        file_type: FileType::from_column(file_type.as_deref()),
    })
}
