use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::updates::Update;
use crate::config::TransportConfig;
use crate::workflows::intake::{ChatId, ChatTransport, DocumentHandle, TransportError};

/// Extra time granted to the HTTP client on top of the long-poll timeout.
const REQUEST_GRACE: Duration = Duration::from_secs(10);

/// Thin Bot API client. The token only ever appears inside `endpoint`.
pub struct TelegramClient {
    http: reqwest::Client,
    endpoint: String,
    poll_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
}

#[derive(Debug, Serialize)]
struct GetUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: [&'static str; 1],
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct SendDocument<'a> {
    chat_id: i64,
    document: &'a str,
}

impl TelegramClient {
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.poll_timeout + REQUEST_GRACE)
            .build()?;
        Ok(Self {
            http,
            endpoint: format!("{}/bot{}", config.api_url, config.api_key),
            poll_timeout: config.poll_timeout,
        })
    }

    /// Long-polls for updates after `offset`. Returns an empty batch when the poll times out.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, TransportError> {
        let request = GetUpdates {
            offset,
            timeout: self.poll_timeout.as_secs(),
            allowed_updates: ["message"],
        };
        self.call("getUpdates", &request).await
    }

    async fn call<P, R>(&self, method: &'static str, payload: &P) -> Result<R, TransportError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        trace!(method, "bot api call");
        let response = self
            .http
            .post(format!("{}/{}", self.endpoint, method))
            .json(payload)
            .send()
            .await
            .map_err(redact)?;
        let body: ApiResponse<R> = response.json().await.map_err(redact)?;

        match body {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse {
                description,
                error_code,
                ..
            } => Err(TransportError::Api {
                code: error_code,
                description: description.unwrap_or_else(|| format!("{method} returned no result")),
            }),
        }
    }
}

/// Request URLs embed the bot token, so they are stripped before errors reach the logs.
fn redact(err: reqwest::Error) -> TransportError {
    TransportError::Http(err.without_url())
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("poll_timeout", &self.poll_timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), TransportError> {
        let _: serde_json::Value = self
            .call(
                "sendMessage",
                &SendMessage {
                    chat_id: chat.0,
                    text,
                },
            )
            .await?;
        Ok(())
    }

    async fn send_document(
        &self,
        chat: ChatId,
        handle: &DocumentHandle,
    ) -> Result<(), TransportError> {
        let _: serde_json::Value = self
            .call(
                "sendDocument",
                &SendDocument {
                    chat_id: chat.0,
                    document: &handle.0,
                },
            )
            .await?;
        Ok(())
    }
}
