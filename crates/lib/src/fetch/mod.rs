//! Retry-aware request execution.
//!
//! [`ApiClient`] runs one idempotent request with a per-attempt timeout and
//! exponential backoff between attempts, tracking the outcome in an [`ApiState`].
//! It never returns an error: failures end up in `ApiState::error` and the call
//! yields `None`.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use serde::de::DeserializeOwned;

use crate::config::ConnectionConfig;

mod errors;
mod executor;

pub use errors::FetchError;
pub use executor::{FetchResponse, HttpExecutor, ReqwestExecutor, RequestOptions};

/// Call state of an [`ApiClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ApiState<T> {
    /// Last successful result.
    pub data: Option<T>,
    /// True exactly while an attempt sequence is outstanding.
    pub loading: bool,
    /// Message of the last failure, cleared when a new call starts.
    pub error: Option<String>,
}

impl<T> Default for ApiState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

/// Retry and timeout settings for an [`ApiClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiOptions {
    /// Retries after the first attempt.
    pub retries: u32,
    /// Base backoff delay; attempt `n` waits `retry_delay * 2^n` before the next.
    pub retry_delay: Duration,
    /// Per-attempt timeout.
    pub timeout: Duration,
}

impl ApiOptions {
    /// Default retry policy with the timeout taken from the shared connection settings.
    pub fn with_connection(connection: &ConnectionConfig) -> Self {
        Self {
            timeout: connection.timeout,
            ..Self::default()
        }
    }
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_delay: Duration::from_millis(1000),
            timeout: ConnectionConfig::default().timeout,
        }
    }
}

/// Delay before the attempt following attempt `attempt` (zero-based).
pub fn backoff_delay(retry_delay: Duration, attempt: u32) -> Duration {
    retry_delay.saturating_mul(1u32 << attempt.min(31))
}

/// Executes JSON requests with timeout and exponential-backoff retry.
pub struct ApiClient<T> {
    executor: Arc<dyn HttpExecutor>,
    options: ApiOptions,
    default_url: Option<String>,
    state: Mutex<ApiState<T>>,
}

impl<T> ApiClient<T>
where
    T: DeserializeOwned + Clone + Send,
{
    pub fn new(executor: Arc<dyn HttpExecutor>, options: ApiOptions) -> Self {
        Self {
            executor,
            options,
            default_url: None,
            state: Mutex::new(ApiState::default()),
        }
    }

    /// Set the URL used by [`ApiClient::fetch`].
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.default_url = Some(url.into());
        self
    }

    pub fn options(&self) -> &ApiOptions {
        &self.options
    }

    /// Snapshot of the current call state.
    pub fn state(&self) -> ApiState<T> {
        self.lock_state().clone()
    }

    /// Restore the initial state without making a request.
    pub fn reset(&self) {
        *self.lock_state() = ApiState::default();
    }

    /// Execute against the URL given to [`ApiClient::with_url`].
    pub async fn fetch(&self, options: &RequestOptions) -> Option<T> {
        let url = self.default_url.clone().unwrap_or_default();
        self.execute(&url, options).await
    }

    /// Execute a request, retrying up to `retries` times.
    ///
    /// Returns the decoded body of the first successful attempt, or `None` once every
    /// attempt has failed (the last failure is recorded in [`ApiState::error`]).
    pub async fn execute(&self, url: &str, options: &RequestOptions) -> Option<T> {
        if url.is_empty() {
            self.lock_state().error = Some(FetchError::NoUrl.to_string());
            return None;
        }

        {
            let mut state = self.lock_state();
            state.loading = true;
            state.error = None;
        }

        match execute_with_retry::<T>(self.executor.as_ref(), url, options, &self.options).await {
            Ok(data) => {
                *self.lock_state() = ApiState {
                    data: Some(data.clone()),
                    loading: false,
                    error: None,
                };
                Some(data)
            }
            Err(e) => {
                let mut state = self.lock_state();
                state.loading = false;
                state.error = Some(e.to_string());
                None
            }
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ApiState<T>> {
        // State updates are plain assignments; a poisoned lock still holds a usable value.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Run `url` through `executor` with the retry policy in `policy`.
///
/// Makes up to `policy.retries + 1` attempts, sleeping `backoff_delay(retry_delay, n)`
/// after failed attempt `n` unless it was the last. Returns the last attempt's error
/// when every attempt fails.
pub async fn execute_with_retry<T: DeserializeOwned>(
    executor: &dyn HttpExecutor,
    url: &str,
    options: &RequestOptions,
    policy: &ApiOptions,
) -> Result<T, FetchError> {
    if url.is_empty() {
        return Err(FetchError::NoUrl);
    }

    let retries = policy.retries;
    let mut attempt = 0;
    loop {
        match attempt_once(executor, url, options, policy.timeout).await {
            Ok(data) => {
                tracing::info!(url, attempt = attempt + 1, "API call successful");
                return Ok(data);
            }
            Err(e) => {
                tracing::warn!(url, attempt = attempt + 1, retries, error = %e, "API call failed");
                if attempt >= retries {
                    return Err(e);
                }
            }
        }

        tokio::time::sleep(backoff_delay(policy.retry_delay, attempt)).await;
        attempt += 1;
    }
}

/// One attempt bounded by `timeout`. Dropping the future on expiry aborts the request.
pub async fn attempt_once<T: DeserializeOwned>(
    executor: &dyn HttpExecutor,
    url: &str,
    options: &RequestOptions,
    timeout: Duration,
) -> Result<T, FetchError> {
    let response = tokio::time::timeout(timeout, executor.execute(url, options))
        .await
        .map_err(|_| FetchError::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        })??;

    if !response.is_success() {
        return Err(FetchError::Status {
            status: response.status,
            status_text: response.status_text,
        });
    }

    serde_json::from_slice(&response.body).map_err(|e| FetchError::Decode(e.to_string()))
}
