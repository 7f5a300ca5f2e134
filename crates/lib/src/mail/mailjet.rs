//! Mailjet REST API client.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{EmailMessage, EmailProvider, ProviderError};

/// Public Mailjet API endpoint.
pub const MAILJET_API_URL: &str = "https://api.mailjet.com";

/// [`EmailProvider`] backed by the Mailjet v3 and v3.1 REST APIs.
#[derive(Debug, Clone)]
pub struct MailjetProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

impl MailjetProvider {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self::with_base_url(MAILJET_API_URL, api_key, api_secret)
    }

    /// Point the client at another host (a proxy, or a local fake in tests).
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        let provider = Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        };
        if !provider.is_configured() {
            tracing::warn!("Mailjet keys are not set; newsletter and contact requests will fail");
        }
        provider
    }

    /// POST `body` to `path` (relative to the API root) with basic auth.
    async fn post(&self, path: &str, body: &Value) -> Result<Value, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::NotConfigured(
                "Mailjet API key and secret are required".to_string(),
            ));
        }

        let url = format!("{}/{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::debug!(url, status = status.as_u16(), "Mailjet request rejected");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| ProviderError::Network(e.to_string()))
    }
}

#[async_trait]
impl EmailProvider for MailjetProvider {
    fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }

    async fn upsert_contact(&self, email: &str) -> Result<(), ProviderError> {
        self.post("v3/REST/contact", &json!({ "Email": email }))
            .await
            .map(|_| ())
    }

    async fn add_to_list(&self, email: &str, list_id: u64) -> Result<(), ProviderError> {
        self.post(
            "v3/REST/listrecipient",
            &json!({ "Action": "addforce", "Email": email, "ListID": list_id }),
        )
        .await
        .map(|_| ())
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), ProviderError> {
        let to: Vec<Value> = message.to.iter().map(|e| json!({ "Email": e })).collect();
        self.post(
            "v3.1/send",
            &json!({
                "Messages": [{
                    "From": { "Email": message.from },
                    "To": to,
                    "Subject": message.subject,
                    "TextPart": message.text,
                }]
            }),
        )
        .await
        .map(|_| ())
    }
}
