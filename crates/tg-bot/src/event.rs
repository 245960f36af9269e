//! Normalization of raw Telegram updates into bot events.

use crate::commands::HandlerKind;
use message_store::{FileType, Message};
use telegram_client::{TgMessage, Update, User};

/// A classified update.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Message with text; goes through the dispatcher.
    Text(Message),
    /// Attachment without text. The caption becomes the text, but the
    /// message is only stored, never dispatched.
    Caption(Message),
    /// Users joined a chat.
    NewChatMembers { chat_id: i64, user_ids: Vec<i64> },
    /// Text of an existing message changed.
    Edited { chat_id: i64, id: i64, text: String },
    /// Nothing the bot tracks.
    Ignored,
}

impl Event {
    pub fn classify(update: &Update) -> Self {
        if let Some(message) = &update.message {
            if message.text.as_deref().is_some_and(|t| !t.is_empty()) {
                return Event::Text(normalize(message));
            }
            if let Some(members) = &message.new_chat_members {
                return Event::NewChatMembers {
                    chat_id: message.chat.id,
                    user_ids: members.iter().map(|u| u.id).collect(),
                };
            }
            if message.photo.is_some() || message.video.is_some() {
                return Event::Caption(normalize(message));
            }
            return Event::Ignored;
        }

        if let Some(edited) = &update.edited_message {
            if let Some(text) = edited.text_or_caption() {
                return Event::Edited {
                    chat_id: edited.chat.id,
                    id: edited.message_id,
                    text: text.to_string(),
                };
            }
        }

        Event::Ignored
    }
}

/// Event handed to the dispatcher.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub kind: HandlerKind,
    pub message: Message,
}

impl InboundEvent {
    /// Plain text message event.
    pub fn message(message: Message) -> Self {
        Self {
            kind: HandlerKind::Message,
            message,
        }
    }

    pub fn text(&self) -> &str {
        self.message.text_or_empty()
    }
}

/// Convert a Telegram message into the stored shape.
pub fn normalize(message: &TgMessage) -> Message {
    let (sender_id, sender_name, sender_username) = match &message.from {
        Some(User {
            id,
            first_name,
            username,
            ..
        }) => (*id, first_name.clone(), username.clone()),
        None => (message.chat.id, String::new(), None),
    };

    let mut normalized = Message::new(message.message_id, message.chat.id, sender_id, sender_name);
    normalized.sender_username = sender_username;
    normalized.text = message.text_or_caption().map(String::from);
    normalized.reply_id = message.reply_to_message.as_ref().map(|r| r.message_id);

    if let Some(file_id) = message.largest_photo() {
        normalized = normalized.with_file(file_id, FileType::Photo);
    } else if let Some(video) = &message.video {
        normalized = normalized.with_file(video.file_id.clone(), FileType::Video);
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(value: serde_json::Value) -> Update {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_classify_text_message() {
        let update = update(serde_json::json!({
            "update_id": 1,
            "message": {
                "message_id": 10,
                "from": { "id": 7, "first_name": "Alice", "username": "alice" },
                "chat": { "id": -5 },
                "text": "!s",
                "reply_to_message": { "message_id": 9, "chat": { "id": -5 } }
            }
        }));

        match Event::classify(&update) {
            Event::Text(msg) => {
                assert_eq!(msg.id, 10);
                assert_eq!(msg.chat_id, -5);
                assert_eq!(msg.sender_id, 7);
                assert_eq!(msg.sender_username.as_deref(), Some("alice"));
                assert_eq!(msg.text.as_deref(), Some("!s"));
                assert_eq!(msg.reply_id, Some(9));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_classify_photo_with_caption() {
        let update = update(serde_json::json!({
            "update_id": 2,
            "message": {
                "message_id": 11,
                "from": { "id": 7, "first_name": "Alice" },
                "chat": { "id": -5 },
                "caption": "!s look at this",
                "photo": [
                    { "file_id": "thumb", "width": 90, "height": 90 },
                    { "file_id": "full", "width": 800, "height": 600 }
                ]
            }
        }));

        match Event::classify(&update) {
            Event::Caption(msg) => {
                assert_eq!(msg.text.as_deref(), Some("!s look at this"));
                assert_eq!(msg.file_id.as_deref(), Some("full"));
                assert_eq!(msg.file_type, FileType::Photo);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_classify_video_without_caption() {
        let update = update(serde_json::json!({
            "update_id": 3,
            "message": {
                "message_id": 12,
                "from": { "id": 7, "first_name": "Alice" },
                "chat": { "id": -5 },
                "video": { "file_id": "vid" }
            }
        }));

        match Event::classify(&update) {
            Event::Caption(msg) => {
                assert!(msg.text.is_none());
                assert_eq!(msg.file_type, FileType::Video);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_classify_new_chat_members() {
        let update = update(serde_json::json!({
            "update_id": 4,
            "message": {
                "message_id": 13,
                "from": { "id": 7, "first_name": "Alice" },
                "chat": { "id": -5 },
                "new_chat_members": [
                    { "id": 8, "first_name": "Bob" },
                    { "id": 9, "first_name": "Carol" }
                ]
            }
        }));

        assert_eq!(
            Event::classify(&update),
            Event::NewChatMembers {
                chat_id: -5,
                user_ids: vec![8, 9]
            }
        );
    }

    #[test]
    fn test_classify_edit() {
        let update = update(serde_json::json!({
            "update_id": 5,
            "edited_message": {
                "message_id": 10,
                "from": { "id": 7, "first_name": "Alice" },
                "chat": { "id": -5 },
                "text": "edited"
            }
        }));

        assert_eq!(
            Event::classify(&update),
            Event::Edited {
                chat_id: -5,
                id: 10,
                text: "edited".into()
            }
        );
    }

    #[test]
    fn test_classify_unknown_update() {
        assert_eq!(Event::classify(&Update::default()), Event::Ignored);

        let sticker = update(serde_json::json!({
            "update_id": 6,
            "message": {
                "message_id": 14,
                "from": { "id": 7, "first_name": "Alice" },
                "chat": { "id": -5 }
            }
        }));
        assert_eq!(Event::classify(&sticker), Event::Ignored);
    }
}
