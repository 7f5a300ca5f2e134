//! Error types for the chat module.
//!
//! None of these ever reach a caller of [`super::ChatStateMachine`]; they are
//! produced by transports and storage backends and absorbed into chat state.

use thiserror::Error;

use crate::fetch::FetchError;

/// Errors from a [`super::ChatTransport`].
#[non_exhaustive]
#[derive(Debug, Clone, Error)]
pub enum ChatError {
    /// The request failed after its retries were exhausted.
    #[error("Chat request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: FetchError,
    },

    /// A message body could not be encoded for the conversational server.
    #[error("Invalid chat payload: {0}")]
    InvalidReply(String),
}

impl ChatError {
    pub(crate) fn request(url: &str, source: FetchError) -> Self {
        ChatError::Request {
            url: url.to_string(),
            source,
        }
    }

    /// Check if the server could not be reached or did not answer in time.
    pub fn is_network_error(&self) -> bool {
        match self {
            ChatError::Request { source, .. } => source.is_network_error(),
            ChatError::InvalidReply(_) => false,
        }
    }

    /// Check if the server answered with a non-success status.
    pub fn is_status_error(&self) -> bool {
        match self {
            ChatError::Request { source, .. } => source.is_status_error(),
            ChatError::InvalidReply(_) => false,
        }
    }
}

impl From<ChatError> for crate::Error {
    fn from(err: ChatError) -> Self {
        crate::Error::Chat(err)
    }
}

/// Errors from a [`super::Storage`] backend.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing file could not be read or written.
    #[error("Storage I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A stored value could not be encoded or decoded.
    #[error("Failed to (de)serialize stored value for '{key}': {reason}")]
    Serialization { key: String, reason: String },
}

impl StorageError {
    pub fn is_io_error(&self) -> bool {
        matches!(self, StorageError::Io { .. })
    }

    /// Get the storage key, if this error is about a specific value.
    pub fn key(&self) -> Option<&str> {
        match self {
            StorageError::Serialization { key, .. } => Some(key),
            StorageError::Io { .. } => None,
        }
    }
}

impl From<StorageError> for crate::Error {
    fn from(err: StorageError) -> Self {
        crate::Error::Storage(err)
    }
}
