//! Error types for the fetch module.

use thiserror::Error;

/// Failure of a single request attempt.
///
/// The `Display` text of the last attempt's error becomes the user-visible
/// `error` of [`super::ApiState`] once retries are exhausted.
#[non_exhaustive]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// `execute` was called without a URL.
    #[error("{}", crate::constants::ERROR_NO_URL)]
    NoUrl,

    /// The attempt did not finish before the per-attempt timeout.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {status_text}")]
    Status { status: u16, status_text: String },

    /// The request could not be sent or the response body could not be read.
    #[error("{0}")]
    Network(String),

    /// The response body was not the expected JSON shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Check if this is a transport-level failure (timeout or network).
    pub fn is_network_error(&self) -> bool {
        matches!(self, FetchError::Timeout { .. } | FetchError::Network(_))
    }

    /// Check if this is a non-success HTTP status.
    pub fn is_status_error(&self) -> bool {
        matches!(self, FetchError::Status { .. })
    }

    /// Get the HTTP status code, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}

impl From<FetchError> for crate::Error {
    fn from(err: FetchError) -> Self {
        crate::Error::Fetch(err)
    }
}
