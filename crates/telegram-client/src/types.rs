//! Telegram Bot API types.

use serde::{Deserialize, Serialize};

/// Envelope wrapping every Bot API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

/// One unit of activity returned by `getUpdates`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<TgMessage>,
    pub edited_message: Option<TgMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub chat_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    pub file_id: String,
}

/// A message as delivered by Telegram (inbound or the result of a send).
#[derive(Debug, Clone, Deserialize)]
pub struct TgMessage {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub date: i64,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub reply_to_message: Option<Box<TgMessage>>,
    pub photo: Option<Vec<PhotoSize>>,
    pub video: Option<Video>,
    pub new_chat_members: Option<Vec<User>>,
}

impl TgMessage {
    /// Id of the largest photo size, if this message carries a photo.
    pub fn largest_photo(&self) -> Option<&str> {
        self.photo
            .as_ref()
            .and_then(|sizes| sizes.iter().max_by_key(|p| p.width * p.height))
            .map(|p| p.file_id.as_str())
    }

    /// Text for text messages, caption for media messages.
    pub fn text_or_caption(&self) -> Option<&str> {
        self.text.as_deref().or(self.caption.as_deref())
    }
}

/// Result of `getFile`.
#[derive(Debug, Clone, Deserialize)]
pub struct File {
    pub file_id: String,
    pub file_path: Option<String>,
}

/// Text formatting mode understood by the Bot API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    Markdown,
    MarkdownV2,
    #[serde(rename = "HTML")]
    Html,
}

impl ParseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Markdown => "Markdown",
            ParseMode::MarkdownV2 => "MarkdownV2",
            ParseMode::Html => "HTML",
        }
    }
}

/// `sendMessage` request body.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
}

/// Binary payload kinds and the multipart field / API method each uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Audio,
    Video,
    Document,
    Voice,
}

impl MediaKind {
    pub fn method(&self) -> &'static str {
        match self {
            MediaKind::Photo => "sendPhoto",
            MediaKind::Audio => "sendAudio",
            MediaKind::Video => "sendVideo",
            MediaKind::Document => "sendDocument",
            MediaKind::Voice => "sendVoice",
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
            MediaKind::Document => "document",
            MediaKind::Voice => "voice",
        }
    }

    fn default_file_name(&self) -> &'static str {
        match self {
            MediaKind::Photo => "image.png",
            MediaKind::Audio => "audio.mp3",
            MediaKind::Video => "video.mp4",
            MediaKind::Document => "file",
            MediaKind::Voice => "voice.ogg",
        }
    }
}

/// Outgoing binary upload.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub kind: MediaKind,
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
    pub caption: Option<String>,
    pub parse_mode: Option<ParseMode>,
    pub spoiler: bool,
}

impl MediaUpload {
    pub fn new(kind: MediaKind, bytes: Vec<u8>) -> Self {
        Self {
            kind,
            bytes,
            file_name: None,
            caption: None,
            parse_mode: None,
            spoiler: false,
        }
    }

    pub fn file_name(&self) -> String {
        self.file_name
            .clone()
            .unwrap_or_else(|| self.kind.default_file_name().to_string())
    }
}
