//! Actions produced by command handlers.

use telegram_client::ParseMode;

/// A handler's declared intent, consumed by the transport right after dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotAction {
    ReplyText {
        text: String,
        parse_mode: Option<ParseMode>,
    },
    ReplyImage {
        image: Vec<u8>,
        caption: Option<String>,
        parse_mode: Option<ParseMode>,
        spoiler: bool,
    },
    ReplyAudio {
        audio: Vec<u8>,
        caption: Option<String>,
    },
    ReplyVideo {
        video: Vec<u8>,
        caption: Option<String>,
        parse_mode: Option<ParseMode>,
        spoiler: bool,
    },
    ReplyFile {
        file: Vec<u8>,
        file_name: Option<String>,
    },
    ReplyVoice {
        voice: Vec<u8>,
    },
    DeleteMessage {
        message_id: i64,
    },
    KickUser {
        user_id: i64,
    },
    None,
}

impl BotAction {
    /// Plain text reply.
    pub fn text(text: impl Into<String>) -> Self {
        BotAction::ReplyText {
            text: text.into(),
            parse_mode: None,
        }
    }

    /// Text reply rendered with `parse_mode`.
    pub fn formatted(text: impl Into<String>, parse_mode: ParseMode) -> Self {
        BotAction::ReplyText {
            text: text.into(),
            parse_mode: Some(parse_mode),
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BotAction::ReplyText { .. } => "text",
            BotAction::ReplyImage { .. } => "image",
            BotAction::ReplyAudio { .. } => "audio",
            BotAction::ReplyVideo { .. } => "video",
            BotAction::ReplyFile { .. } => "file",
            BotAction::ReplyVoice { .. } => "voice",
            BotAction::DeleteMessage { .. } => "delete",
            BotAction::KickUser { .. } => "kick",
            BotAction::None => "none",
        }
    }
}
