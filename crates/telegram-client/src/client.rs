//! Telegram Bot API HTTP client.

use crate::error::TelegramError;
use crate::types::*;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Telegram Bot API client.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    api_url: String,
    token: String,
    updates_timeout: u64,
}

impl TelegramClient {
    /// Create a new client.
    ///
    /// `updates_timeout` is the long-poll timeout in seconds passed to
    /// `getUpdates`; the HTTP timeout is padded on top of it.
    pub fn new(
        api_url: impl Into<String>,
        token: impl Into<String>,
        updates_timeout: u64,
    ) -> Result<Self, TelegramError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(updates_timeout + 30))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            updates_timeout,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.api_url, self.token, file_path)
    }

    /// Check that the token is accepted by the API.
    pub async fn health_check(&self) -> bool {
        self.get_me().await.is_ok()
    }

    /// Get the bot's own user.
    #[instrument(skip(self))]
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        let response = self.client.get(self.method_url("getMe")).send().await?;
        parse_response(response).await
    }

    /// Fetch pending updates starting at `offset`.
    ///
    /// Each update is decoded on its own. One that does not decode is
    /// returned with only its `update_id` set, so the caller still moves
    /// past it.
    #[instrument(skip(self))]
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, TelegramError> {
        let mut request = self
            .client
            .get(self.method_url("getUpdates"))
            .query(&[("timeout", self.updates_timeout)]);
        if let Some(offset) = offset {
            request = request.query(&[("offset", offset)]);
        }

        let raw: Vec<serde_json::Value> = parse_response(request.send().await?).await?;
        let updates: Vec<Update> = raw.into_iter().filter_map(decode_update).collect();
        debug!("Received {} updates", updates.len());
        Ok(updates)
    }

    /// Send a text message.
    #[instrument(skip(self, text))]
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<TgMessage, TelegramError> {
        let request = SendMessageRequest {
            chat_id,
            text: text.to_string(),
            parse_mode,
        };

        let message: TgMessage = self.post_json("sendMessage", &request).await?;
        debug!("Sent message {} to {}", message.message_id, chat_id);
        Ok(message)
    }

    /// Upload a photo, audio, video, document or voice note.
    #[instrument(skip(self, upload), fields(kind = ?upload.kind, bytes = upload.bytes.len()))]
    pub async fn send_media(
        &self,
        chat_id: i64,
        upload: MediaUpload,
    ) -> Result<TgMessage, TelegramError> {
        let file_name = upload.file_name();
        let mut form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part(
                upload.kind.field(),
                Part::bytes(upload.bytes).file_name(file_name),
            );

        if let Some(caption) = upload.caption {
            form = form.text("caption", caption);
        }
        if let Some(mode) = upload.parse_mode {
            form = form.text("parse_mode", mode.as_str());
        }
        if upload.spoiler && matches!(upload.kind, MediaKind::Photo | MediaKind::Video) {
            form = form.text("has_spoiler", "true");
        }

        let response = self
            .client
            .post(self.method_url(upload.kind.method()))
            .multipart(form)
            .send()
            .await?;

        let message: TgMessage = parse_response(response).await?;
        debug!("Sent {:?} {} to {}", upload.kind, message.message_id, chat_id);
        Ok(message)
    }

    /// Delete a message.
    #[instrument(skip(self))]
    pub async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), TelegramError> {
        let body = serde_json::json!({ "chat_id": chat_id, "message_id": message_id });
        let _: bool = self.post_json("deleteMessage", &body).await?;
        Ok(())
    }

    /// Remove a user from a chat.
    #[instrument(skip(self))]
    pub async fn ban_chat_member(&self, chat_id: i64, user_id: i64) -> Result<(), TelegramError> {
        let body = serde_json::json!({ "chat_id": chat_id, "user_id": user_id });
        let _: bool = self.post_json("banChatMember", &body).await?;
        Ok(())
    }

    /// Resolve a file id to its metadata.
    #[instrument(skip(self))]
    pub async fn get_file(&self, file_id: &str) -> Result<File, TelegramError> {
        let response = self
            .client
            .get(self.method_url("getFile"))
            .query(&[("file_id", file_id)])
            .send()
            .await?;
        parse_response(response).await
    }

    /// Download the content of a previously sent file.
    #[instrument(skip(self))]
    pub async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, TelegramError> {
        let file = self.get_file(file_id).await?;
        let path = file
            .file_path
            .ok_or_else(|| TelegramError::MissingFilePath(file_id.to_string()))?;

        let response = self.client.get(self.file_url(&path)).send().await?;
        if !response.status().is_success() {
            return Err(TelegramError::Api {
                code: response.status().as_u16() as i64,
                description: format!("File download failed for {}", file_id),
            });
        }

        let bytes = response.bytes().await?;
        debug!("Downloaded {} bytes for {}", bytes.len(), file_id);
        Ok(bytes.to_vec())
    }

    async fn post_json<B, T>(&self, method: &str, body: &B) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;
        parse_response(response).await
    }
}

fn decode_update(value: serde_json::Value) -> Option<Update> {
    let update_id = value.get("update_id").and_then(serde_json::Value::as_i64);
    match serde_json::from_value::<Update>(value) {
        Ok(update) => Some(update),
        Err(e) => match update_id {
            Some(update_id) => {
                warn!("Skipping malformed update {}: {}", update_id, e);
                Some(Update {
                    update_id,
                    ..Default::default()
                })
            }
            None => {
                warn!("Dropping update without update_id: {}", e);
                None
            }
        },
    }
}

/// Unwrap the `{ok, result, description}` envelope.
async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, TelegramError> {
    let status = response.status();
    let body = response.text().await?;

    let parsed: ApiResponse<T> = match serde_json::from_str(&body) {
        Ok(parsed) => parsed,
        Err(_) if !status.is_success() => {
            warn!("Telegram request failed with {}: {}", status, body);
            return Err(TelegramError::Api {
                code: status.as_u16() as i64,
                description: body,
            });
        }
        Err(e) => return Err(e.into()),
    };

    if !parsed.ok {
        let description = parsed.description.unwrap_or_default();
        warn!("Telegram request failed: {}", description);
        return Err(TelegramError::Api {
            code: parsed.error_code.unwrap_or(status.as_u16() as i64),
            description,
        });
    }

    parsed.result.ok_or_else(|| TelegramError::Api {
        code: status.as_u16() as i64,
        description: "Response has no result".into(),
    })
}
