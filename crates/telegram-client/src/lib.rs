//! Telegram Bot API client.

mod client;
mod error;
mod types;

pub use client::TelegramClient;
pub use error::TelegramError;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "123:abc";

    fn create_test_client(mock_server: &MockServer) -> TelegramClient {
        TelegramClient::new(mock_server.uri(), TOKEN, 0).unwrap()
    }

    fn sent_message(id: i64, chat_id: i64, text: &str) -> serde_json::Value {
        serde_json::json!({
            "ok": true,
            "result": {
                "message_id": id,
                "from": { "id": 1, "is_bot": true, "first_name": "Bot", "username": "the_bot" },
                "chat": { "id": chat_id, "type": "group" },
                "date": 1677652288,
                "text": text
            }
        })
    }

    #[tokio::test]
    async fn test_health_check_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/bot{}/getMe", TOKEN)))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": { "id": 1, "is_bot": true, "first_name": "Bot" }
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn test_health_check_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/bot{}/getMe", TOKEN)))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 401,
                "description": "Unauthorized"
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        assert!(!client.health_check().await);
    }

    #[tokio::test]
    async fn test_get_updates_with_offset() {
        let mock_server = MockServer::start().await;

        let updates = serde_json::json!({
            "ok": true,
            "result": [
                {
                    "update_id": 10,
                    "message": {
                        "message_id": 5,
                        "from": { "id": 77, "is_bot": false, "first_name": "Alice", "username": "alice" },
                        "chat": { "id": -100, "type": "supergroup" },
                        "date": 1677652288,
                        "text": "!help",
                        "reply_to_message": {
                            "message_id": 4,
                            "chat": { "id": -100, "type": "supergroup" },
                            "date": 1677652200,
                            "text": "earlier"
                        }
                    }
                },
                {
                    "update_id": 11,
                    "edited_message": {
                        "message_id": 3,
                        "from": { "id": 77, "is_bot": false, "first_name": "Alice" },
                        "chat": { "id": -100, "type": "supergroup" },
                        "date": 1677652100,
                        "text": "fixed typo"
                    }
                }
            ]
        });

        Mock::given(method("GET"))
            .and(path(format!("/bot{}/getUpdates", TOKEN)))
            .and(query_param("offset", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&updates))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.get_updates(Some(10)).await.unwrap();

        assert_eq!(result.len(), 2);
        let first = result[0].message.as_ref().unwrap();
        assert_eq!(first.text.as_deref(), Some("!help"));
        assert_eq!(first.from.as_ref().unwrap().username.as_deref(), Some("alice"));
        assert_eq!(first.reply_to_message.as_ref().unwrap().message_id, 4);
        assert!(result[1].message.is_none());
        assert_eq!(result[1].edited_message.as_ref().unwrap().message_id, 3);
    }

    #[tokio::test]
    async fn test_get_updates_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/bot{}/getUpdates", TOKEN)))
            .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 409,
                "description": "Conflict: terminated by other getUpdates request"
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.get_updates(None).await;

        assert!(matches!(result, Err(TelegramError::Api { code: 409, .. })));
    }

    #[tokio::test]
    async fn test_get_updates_keeps_id_of_malformed_update() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/bot{}/getUpdates", TOKEN)))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": [
                    {
                        "update_id": 5,
                        "message": {
                            "message_id": 1,
                            "chat": { "id": -100 },
                            "photo": [{ "file_id": "x" }]
                        }
                    },
                    { "message": "no id at all" },
                    {
                        "update_id": 6,
                        "message": {
                            "message_id": 2,
                            "chat": { "id": -100 },
                            "text": "hi"
                        }
                    }
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.get_updates(None).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].update_id, 5);
        assert!(result[0].message.is_none());
        assert_eq!(result[1].update_id, 6);
        assert_eq!(result[1].message.as_ref().unwrap().text.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn test_non_json_error_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/bot{}/getUpdates", TOKEN)))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.get_updates(None).await;

        match result {
            Err(TelegramError::Api { code, description }) => {
                assert_eq!(code, 502);
                assert_eq!(description, "Bad Gateway");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/bot{}/sendMessage", TOKEN)))
            .and(body_json(serde_json::json!({
                "chat_id": -100,
                "text": "*hi*",
                "parse_mode": "Markdown"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(sent_message(900, -100, "hi")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let sent = client
            .send_message(-100, "*hi*", Some(ParseMode::Markdown))
            .await
            .unwrap();

        assert_eq!(sent.message_id, 900);
        assert_eq!(sent.from.unwrap().first_name, "Bot");
    }

    #[tokio::test]
    async fn test_send_message_without_parse_mode() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/bot{}/sendMessage", TOKEN)))
            .and(body_json(serde_json::json!({ "chat_id": 5, "text": "plain" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(sent_message(1, 5, "plain")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        assert!(client.send_message(5, "plain", None).await.is_ok());
    }

    #[tokio::test]
    async fn test_send_photo_with_spoiler() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/bot{}/sendPhoto", TOKEN)))
            .and(body_string_contains("has_spoiler"))
            .and(body_string_contains("Sender: Alice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sent_message(901, 5, "")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let mut upload = MediaUpload::new(MediaKind::Photo, vec![0x89, 0x50, 0x4e, 0x47]);
        upload.caption = Some("Sender: Alice".into());
        upload.parse_mode = Some(ParseMode::Html);
        upload.spoiler = true;

        let sent = client.send_media(5, upload).await.unwrap();
        assert_eq!(sent.message_id, 901);
    }

    #[tokio::test]
    async fn test_send_voice_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/bot{}/sendVoice", TOKEN)))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client
            .send_media(5, MediaUpload::new(MediaKind::Voice, vec![1, 2, 3]))
            .await;

        assert!(matches!(result, Err(TelegramError::Api { code: 400, .. })));
    }

    #[tokio::test]
    async fn test_delete_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/bot{}/deleteMessage", TOKEN)))
            .and(body_json(serde_json::json!({ "chat_id": 5, "message_id": 42 })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "ok": true, "result": true })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        assert!(client.delete_message(5, 42).await.is_ok());
    }

    #[tokio::test]
    async fn test_download_file() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/bot{}/getFile", TOKEN)))
            .and(query_param("file_id", "photo-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": { "file_id": "photo-1", "file_path": "photos/file_0.jpg" }
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/file/bot{}/photos/file_0.jpg", TOKEN)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3, 4]))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let bytes = client.download_file("photo-1").await.unwrap();

        assert_eq!(bytes, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_download_file_without_path() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/bot{}/getFile", TOKEN)))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": { "file_id": "big" }
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.download_file("big").await;

        assert!(matches!(result, Err(TelegramError::MissingFilePath(_))));
    }

    #[test]
    fn test_largest_photo() {
        let msg: TgMessage = serde_json::from_value(serde_json::json!({
            "message_id": 1,
            "chat": { "id": 1 },
            "caption": "look",
            "photo": [
                { "file_id": "small", "width": 90, "height": 90 },
                { "file_id": "large", "width": 1280, "height": 960 },
                { "file_id": "medium", "width": 320, "height": 240 }
            ]
        }))
        .unwrap();

        assert_eq!(msg.largest_photo(), Some("large"));
        assert_eq!(msg.text_or_caption(), Some("look"));
    }

    #[test]
    fn test_parse_mode_serialization() {
        assert_eq!(serde_json::to_string(&ParseMode::Html).unwrap(), "\"HTML\"");
        assert_eq!(ParseMode::MarkdownV2.as_str(), "MarkdownV2");
    }
}
