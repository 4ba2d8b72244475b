//! Minimal Telegram Bot API client: long polling and plain-text replies

use runcoach_core::{ChatId, ChatKind, Error, InboundMessage, Result, UserId};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Slack on top of the long-poll timeout before the HTTP request gives up.
const POLL_GRACE_SECS: u64 = 10;
const SEND_TIMEOUT_SECS: u64 = 30;

pub struct TelegramClient {
    client: Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: "https://api.telegram.org".to_string(),
            token: token.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    /// Remove any webhook so getUpdates is allowed.
    pub async fn delete_webhook(&self, drop_pending_updates: bool) -> Result<bool> {
        self.call(
            "deleteWebhook",
            &serde_json::json!({ "drop_pending_updates": drop_pending_updates }),
            Duration::from_secs(SEND_TIMEOUT_SECS),
        )
        .await
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        let body = GetUpdates {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message"],
        };
        self.call(
            "getUpdates",
            &body,
            Duration::from_secs(timeout_secs + POLL_GRACE_SECS),
        )
        .await
    }

    pub async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<()> {
        let _: serde_json::Value = self
            .call(
                "sendMessage",
                &serde_json::json!({ "chat_id": chat_id, "text": text }),
                Duration::from_secs(SEND_TIMEOUT_SECS),
            )
            .await?;
        Ok(())
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &impl Serialize,
        timeout: Duration,
    ) -> Result<T> {
        debug!("Telegram {}", method);
        let response = self
            .client
            .post(self.method_url(method))
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::transport(format!("{}: {}", method, without_token(&e.to_string(), &self.token))))?;

        let api: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| Error::transport(format!("{}: invalid response: {}", method, e)))?;
        api.into_result(method)
    }
}

// reqwest errors echo the URL, which carries the bot token.
fn without_token(message: &str, token: &str) -> String {
    if token.is_empty() {
        message.to_string()
    } else {
        message.replace(token, "<token>")
    }
}

#[derive(Serialize)]
struct GetUpdates<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

/// Envelope every Bot API method answers with
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i32>,
}

impl<T> ApiResponse<T> {
    pub fn into_result(self, method: &str) -> Result<T> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(Error::transport(format!("{}: ok without result", method))),
            (false, _) => Err(Error::transport(format!(
                "{}: {} {}",
                method,
                self.error_code.map(|c| c.to_string()).unwrap_or_default(),
                self.description.unwrap_or_default()
            ))),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    #[serde(rename = "type")]
    pub kind: ChatKind,
}

impl Update {
    /// Text messages with a known sender; everything else is dropped.
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let message = self.message?;
        let from = message.from?;
        let text = message.text?;
        Some(InboundMessage {
            chat_id: message.chat.id,
            user_id: UserId::from(from.id),
            chat_kind: message.chat.kind,
            text,
            first_name: Some(from.first_name),
        })
    }
}
