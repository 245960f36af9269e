//! Outbound seam between the bot core and the Telegram API.

use crate::action::BotAction;
use async_trait::async_trait;
use telegram_client::{MediaKind, MediaUpload, TelegramClient, TelegramError, TgMessage, Update};
use tracing::debug;

/// Remote operations the update loop and handlers rely on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the next batch of updates, starting at `offset`.
    async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, TelegramError>;

    /// Perform `action` in `chat_id`.
    ///
    /// Returns the message Telegram created, or `None` for actions that do
    /// not create one (deletes, kicks, skipped empty replies).
    async fn send(&self, chat_id: i64, action: &BotAction)
        -> Result<Option<TgMessage>, TelegramError>;

    /// Download the content of a previously seen attachment.
    async fn fetch_file(&self, file_id: &str) -> Result<Vec<u8>, TelegramError>;
}

/// [`Transport`] backed by the Bot API client.
pub struct TelegramTransport {
    client: TelegramClient,
    max_reply_length: usize,
}

impl TelegramTransport {
    pub fn new(client: TelegramClient, max_reply_length: usize) -> Self {
        Self {
            client,
            max_reply_length,
        }
    }
}

/// Cut `text` to `max_chars` characters, marking the cut with `...`.
pub fn truncate_reply(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

fn media_upload(
    kind: MediaKind,
    bytes: &[u8],
    caption: &Option<String>,
    parse_mode: Option<telegram_client::ParseMode>,
    spoiler: bool,
) -> MediaUpload {
    let mut upload = MediaUpload::new(kind, bytes.to_vec());
    upload.caption = caption.clone();
    upload.parse_mode = parse_mode;
    upload.spoiler = spoiler;
    upload
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, TelegramError> {
        self.client.get_updates(offset).await
    }

    async fn send(
        &self,
        chat_id: i64,
        action: &BotAction,
    ) -> Result<Option<TgMessage>, TelegramError> {
        let sent = match action {
            BotAction::ReplyText { text, parse_mode } => {
                if text.is_empty() {
                    debug!("Skipping empty text reply to {}", chat_id);
                    return Ok(None);
                }
                let text = truncate_reply(text, self.max_reply_length);
                self.client.send_message(chat_id, &text, *parse_mode).await?
            }
            BotAction::ReplyImage {
                image,
                caption,
                parse_mode,
                spoiler,
            } => {
                let upload = media_upload(MediaKind::Photo, image, caption, *parse_mode, *spoiler);
                self.client.send_media(chat_id, upload).await?
            }
            BotAction::ReplyAudio { audio, caption } => {
                let upload = media_upload(MediaKind::Audio, audio, caption, None, false);
                self.client.send_media(chat_id, upload).await?
            }
            BotAction::ReplyVideo {
                video,
                caption,
                parse_mode,
                spoiler,
            } => {
                let upload = media_upload(MediaKind::Video, video, caption, *parse_mode, *spoiler);
                self.client.send_media(chat_id, upload).await?
            }
            BotAction::ReplyFile { file, file_name } => {
                let mut upload = media_upload(MediaKind::Document, file, &None, None, false);
                upload.file_name = file_name.clone();
                self.client.send_media(chat_id, upload).await?
            }
            BotAction::ReplyVoice { voice } => {
                let upload = media_upload(MediaKind::Voice, voice, &None, None, false);
                self.client.send_media(chat_id, upload).await?
            }
            BotAction::DeleteMessage { message_id } => {
                self.client.delete_message(chat_id, *message_id).await?;
                return Ok(None);
            }
            BotAction::KickUser { user_id } => {
                self.client.ban_chat_member(chat_id, *user_id).await?;
                return Ok(None);
            }
            BotAction::None => return Ok(None),
        };

        Ok(Some(sent))
    }

    async fn fetch_file(&self, file_id: &str) -> Result<Vec<u8>, TelegramError> {
        self.client.download_file(file_id).await
    }
}
