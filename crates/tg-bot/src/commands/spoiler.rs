//! Spoiler command - re-posts the replied message behind a spoiler.

use crate::action::BotAction;
use crate::commands::{CommandHandler, Dependencies, HandlerSpec};
use crate::error::AppResult;
use crate::transport::Transport;
use async_trait::async_trait;
use message_store::{FileType, Message, MessageStore};
use std::sync::Arc;
use telegram_client::ParseMode;
use tracing::{info, instrument, warn};

pub struct SpoilerHandler {
    sender: Arc<dyn Transport>,
    store: Arc<MessageStore>,
}

impl SpoilerHandler {
    pub fn new(sender: Arc<dyn Transport>, store: Arc<MessageStore>) -> Self {
        Self { sender, store }
    }

    pub fn spec() -> HandlerSpec {
        HandlerSpec {
            name: "spoiler",
            requires: &["store", "sender"],
            build: Self::build,
        }
    }

    pub fn build(deps: &Dependencies) -> AppResult<Box<dyn CommandHandler>> {
        Ok(Box::new(Self::new(
            deps.sender("spoiler")?,
            deps.store("spoiler")?,
        )))
    }

    fn caption(original: &Message) -> String {
        let mut caption = format!("Sender: {}", escape_html(&original.sender_display()));
        if let Some(text) = original.text.as_deref().filter(|t| !t.is_empty()) {
            caption.push_str(&format!(
                "\n<span class=\"tg-spoiler\">{}</span>",
                escape_html(text)
            ));
        }
        caption
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[async_trait]
impl CommandHandler for SpoilerHandler {
    fn name(&self) -> &str {
        "spoiler"
    }

    fn pattern(&self) -> &str {
        r"(\.|!|/)([sS])(.*)"
    }

    #[instrument(skip(self, message), fields(chat_id = message.chat_id, reply_id = ?message.reply_id))]
    async fn get_reply(&self, message: &Message) -> Option<Vec<BotAction>> {
        message.reply_id?;

        let original = match self.store.resolve_reply(message).await {
            Ok(Some(original)) => original,
            Ok(None) => {
                info!("Replied message is not tracked, nothing to spoiler");
                return None;
            }
            Err(e) => {
                warn!("Failed to resolve replied message: {}", e);
                return None;
            }
        };

        let caption = Self::caption(&original);
        let action = match (original.file_type, original.file_id.as_deref()) {
            (FileType::Photo | FileType::Video, Some(file_id)) => {
                let bytes = match self.sender.fetch_file(file_id).await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!("Failed to fetch attachment {}: {}", file_id, e);
                        return None;
                    }
                };
                if original.file_type == FileType::Photo {
                    BotAction::ReplyImage {
                        image: bytes,
                        caption: Some(caption),
                        parse_mode: Some(ParseMode::Html),
                        spoiler: true,
                    }
                } else {
                    BotAction::ReplyVideo {
                        video: bytes,
                        caption: Some(caption),
                        parse_mode: Some(ParseMode::Html),
                        spoiler: true,
                    }
                }
            }
            _ => BotAction::formatted(caption, ParseMode::Html),
        };

        Some(vec![
            BotAction::DeleteMessage {
                message_id: original.id,
            },
            action,
        ])
    }
}
