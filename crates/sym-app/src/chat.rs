use std::sync::Arc;
use log::info;
use reqwest::Method;
use serde_json::Value;
use sym_core::{ChatReply, ClientError, HttpError};
use crate::gateway::Gateway;

/// Reply fields checked in order; the first non-empty string wins.
const REPLY_FIELDS: [&str; 4] = ["reply", "assistant", "message", "text"];

#[derive(Clone)]
pub struct ChatClient {
    gateway: Arc<dyn Gateway>,
}

impl ChatClient {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn send(&self, message: &str) -> Result<ChatReply, ClientError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ClientError::Validation("Message must not be empty".into()));
        }

        info!("Sending chat message ({} chars)", message.chars().count());

        let path = format!("/chat?prompt={}", urlencoding::encode(message));
        let data = self.gateway.request(Method::POST, &path, None).await?;
        if data.is_null() {
            return Err(HttpError::Decode("empty chat response".into()).into());
        }

        Ok(ChatReply::new(reply_text(&data)))
    }
}

/// Picks the reply text out of a chat response. When none of the known
/// fields is there the whole body is shown instead of dropping it.
pub fn reply_text(data: &Value) -> String {
    REPLY_FIELDS
        .iter()
        .filter_map(|field| data.get(*field).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| data.to_string())
}
