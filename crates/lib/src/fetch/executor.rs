//! The request executor seam behind [`super::ApiClient`].

use async_trait::async_trait;
use reqwest::Method;

use super::FetchError;

/// Method, headers and body of a request.
///
/// Every request carries `Content-Type: application/json` unless a header of the
/// same name is supplied.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post_json(body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            headers: Vec::new(),
            body: Some(body),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Headers as sent, with the JSON content type filled in.
    pub fn effective_headers(&self) -> Vec<(String, String)> {
        let mut headers = self.headers.clone();
        if !headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("content-type"))
        {
            headers.insert(
                0,
                ("Content-Type".to_string(), "application/json".to_string()),
            );
        }
        headers
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

/// A response whose body has been read fully.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub status_text: String,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one request attempt. Timeouts and retries are applied by the caller.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn execute(&self, url: &str, options: &RequestOptions)
    -> Result<FetchResponse, FetchError>;
}

/// [`HttpExecutor`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestExecutor {
    client: reqwest::Client,
}

impl ReqwestExecutor {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    async fn execute(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<FetchResponse, FetchError> {
        let mut request = self.client.request(options.method.clone(), url);
        for (name, value) in options.effective_headers() {
            request = request.header(name, value);
        }
        if let Some(body) = &options.body {
            request = request.body(serde_json::to_vec(body).map_err(|e| {
                FetchError::Network(format!("Failed to encode request body: {e}"))
            })?);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        Ok(FetchResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body: body.to_vec(),
        })
    }
}
