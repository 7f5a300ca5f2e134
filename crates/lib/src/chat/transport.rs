//! Network operations against the conversational server.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ChatError;
use crate::{
    config::{ChatConfig, ConnectionConfig},
    fetch::{
        ApiOptions, FetchError, HttpExecutor, ReqwestExecutor, RequestOptions, attempt_once,
        execute_with_retry,
    },
};

/// One item of a webhook reply. Only `text` is used; other fields (buttons, images,
/// custom payloads) are kept for callers that want them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl BotItem {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            extra: serde_json::Map::new(),
        }
    }
}

/// The conversational server's answer to one message.
#[derive(Debug, Clone, PartialEq)]
pub enum BotReply {
    /// No items, or no body at all.
    Empty,
    /// A non-empty, server-ordered list of items.
    Items(Vec<BotItem>),
}

impl BotReply {
    pub fn from_items(items: Vec<BotItem>) -> Self {
        if items.is_empty() {
            BotReply::Empty
        } else {
            BotReply::Items(items)
        }
    }

    /// Decode a webhook body.
    ///
    /// Anything but an array counts as no reply. Array elements that are not item
    /// objects are skipped.
    pub fn from_json(value: Value) -> Self {
        let Value::Array(elements) = value else {
            return BotReply::Empty;
        };
        let items = elements
            .into_iter()
            .filter_map(|element| match serde_json::from_value::<BotItem>(element) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping malformed reply item");
                    None
                }
            })
            .collect();
        Self::from_items(items)
    }

    /// Texts of the items that carry one, in server order.
    pub fn texts(&self) -> Vec<&str> {
        match self {
            BotReply::Empty => Vec::new(),
            BotReply::Items(items) => items
                .iter()
                .filter_map(|item| item.text.as_deref())
                .filter(|text| !text.is_empty())
                .collect(),
        }
    }
}

/// Wire body of a webhook request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookRequest {
    pub message: String,
    pub sender: String,
}

/// The two operations the chat needs from its server.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Health probe. `Ok` on any 2xx.
    async fn probe(&self) -> Result<(), ChatError>;

    /// Deliver `message` on behalf of `session_id` and return the server's reply.
    async fn send(&self, message: &str, session_id: &str) -> Result<BotReply, ChatError>;
}

/// [`ChatTransport`] for the Rasa REST channel.
///
/// The probe is a single attempt bounded by the connection timeout. Message delivery
/// retries transient failures with exponential backoff per [`ConnectionConfig`].
pub struct HttpChatTransport {
    executor: Box<dyn HttpExecutor>,
    status_url: String,
    webhook_url: String,
    connection: ConnectionConfig,
}

impl HttpChatTransport {
    pub fn new(config: &ChatConfig) -> Self {
        Self::with_executor(config, Box::new(ReqwestExecutor::default()))
    }

    pub fn with_executor(config: &ChatConfig, executor: Box<dyn HttpExecutor>) -> Self {
        Self {
            executor,
            status_url: config.status_url(),
            webhook_url: config.webhook_url(),
            connection: config.connection,
        }
    }

    fn send_policy(&self) -> ApiOptions {
        ApiOptions {
            retries: self.connection.retry_attempts,
            retry_delay: self.connection.retry_delay,
            timeout: self.connection.timeout,
        }
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn probe(&self) -> Result<(), ChatError> {
        // Rasa's /status body is not needed; any JSON value (or none) is accepted.
        match attempt_once::<Value>(
            self.executor.as_ref(),
            &self.status_url,
            &RequestOptions::get(),
            self.connection.timeout,
        )
        .await
        {
            Ok(_) | Err(FetchError::Decode(_)) => Ok(()),
            Err(e) => Err(ChatError::request(&self.status_url, e)),
        }
    }

    async fn send(&self, message: &str, session_id: &str) -> Result<BotReply, ChatError> {
        let body = WebhookRequest {
            message: message.to_string(),
            sender: session_id.to_string(),
        };
        let options = RequestOptions::post_json(
            serde_json::to_value(&body).map_err(|e| ChatError::InvalidReply(e.to_string()))?,
        );

        let value: Value = execute_with_retry(
            self.executor.as_ref(),
            &self.webhook_url,
            &options,
            &self.send_policy(),
        )
        .await
        .map_err(|e| ChatError::request(&self.webhook_url, e))?;

        Ok(BotReply::from_json(value))
    }
}
