//! Error types for the mail module.

use thiserror::Error;

/// Errors from an [`super::EmailProvider`].
#[non_exhaustive]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Credentials or another required setting are missing.
    #[error("Email provider not configured: {0}")]
    NotConfigured(String),

    /// The provider answered with a non-success status.
    #[error("Email provider returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The provider could not be reached.
    #[error("Email provider request failed: {0}")]
    Network(String),
}

impl ProviderError {
    /// Check if the provider rejected the request because the resource already exists.
    ///
    /// The provider signals duplicate contacts with a plain 400, so every 400 counts.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ProviderError::Status { status: 400, .. })
    }

    pub fn is_network_error(&self) -> bool {
        matches!(self, ProviderError::Network(_))
    }

    /// Check if the failure is caused by missing or rejected credentials.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ProviderError::NotConfigured(_) | ProviderError::Status { status: 401, .. }
        )
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Network(err.to_string())
    }
}

impl From<ProviderError> for crate::Error {
    fn from(err: ProviderError) -> Self {
        crate::Error::Provider(err)
    }
}
