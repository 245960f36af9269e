//! Common test utilities for integration tests.

use message_store::MessageStore;
use std::sync::Arc;
use std::time::Duration;
use telegram_client::TelegramClient;
use tg_bot::commands::{builtin_handlers, Dependencies, Registry};
use tg_bot::{Bot, Dispatcher, PollTiming, TelegramTransport, Transport};
use wiremock::MockServer;

pub const TOKEN: &str = "42:test-token";

/// Path of a Bot API method on the mock server.
pub fn api_path(method: &str) -> String {
    format!("/bot{}/{}", TOKEN, method)
}

/// Build a bot with the built-in handlers, talking to a mock Telegram server.
pub fn test_bot(mock_server: &MockServer, store: Arc<MessageStore>) -> Bot {
    let client = TelegramClient::new(mock_server.uri(), TOKEN, 0).unwrap();
    let transport: Arc<dyn Transport> = Arc::new(TelegramTransport::new(client, 4000));
    let deps = Dependencies::new()
        .with_store(store.clone())
        .with_sender(transport.clone());
    let registry = Registry::build(&builtin_handlers(), &deps).unwrap();

    Bot::new(
        transport,
        store,
        Dispatcher::new(registry),
        PollTiming {
            poll_interval: Duration::from_millis(1),
            retry_delay: Duration::from_millis(1),
        },
    )
}

/// A `{ok, result}` wrapped bot message.
pub fn sent(message_id: i64, chat_id: i64, text: &str) -> serde_json::Value {
    serde_json::json!({
        "ok": true,
        "result": {
            "message_id": message_id,
            "from": { "id": 1, "is_bot": true, "first_name": "Bot", "username": "test_bot" },
            "chat": { "id": chat_id },
            "date": 1677652288,
            "text": text
        }
    })
}
