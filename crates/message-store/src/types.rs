//! Stored message types.

use serde::{Deserialize, Serialize};

/// Kind of attachment carried by a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    #[default]
    None,
    Photo,
    Video,
}

impl FileType {
    /// Column encoding. `None` is stored as SQL NULL.
    pub fn as_column(&self) -> Option<&'static str> {
        match self {
            FileType::None => None,
            FileType::Photo => Some("photo"),
            FileType::Video => Some("video"),
        }
    }

    pub fn from_column(value: Option<&str>) -> Self {
        match value {
            Some("photo") => FileType::Photo,
            Some("video") => FileType::Video,
            _ => FileType::None,
        }
    }
}

/// A message observed in a chat or sent by the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Remote message id, unique within `chat_id`.
    pub id: i64,
    pub sender_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_username: Option<String>,
    pub sender_id: i64,
    pub chat_id: i64,
    /// Current text (or caption). Edits overwrite it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Id of the message this one replies to, in the same chat.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(default)]
    pub file_type: FileType,
}

impl Message {
    pub fn new(id: i64, chat_id: i64, sender_id: i64, sender_name: impl Into<String>) -> Self {
        Self {
            id,
            sender_name: sender_name.into(),
            sender_username: None,
            sender_id,
            chat_id,
            text: None,
            reply_id: None,
            file_id: None,
            file_type: FileType::None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.sender_username = Some(username.into());
        self
    }

    pub fn replying_to(mut self, reply_id: i64) -> Self {
        self.reply_id = Some(reply_id);
        self
    }

    pub fn with_file(mut self, file_id: impl Into<String>, file_type: FileType) -> Self {
        self.file_id = Some(file_id.into());
        self.file_type = file_type;
        self
    }

    /// Text content, or an empty string when the message has none.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Display name for the sender: `@username` when known, else the first name.
    pub fn sender_display(&self) -> String {
        match &self.sender_username {
            Some(username) => format!("@{}", username),
            None => self.sender_name.clone(),
        }
    }
}
