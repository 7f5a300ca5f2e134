//!
//! Ecofusion: the chat session, contact form and newsletter backend of the Eco Fusion website.
//!
//! ## Core Concepts
//!
//! * **Chat (`chat::ChatStateMachine`)**: The single source of truth for a conversation with the
//!   external conversational server. Owns the message list, connection status, loading flag and
//!   error string, and persists history through a pluggable [`chat::Storage`].
//! * **Transport (`chat::ChatTransport`)**: Health probe and message exchange against the
//!   conversational server (`chat::HttpChatTransport` for the Rasa REST channel).
//! * **Fetch (`fetch::ApiClient`)**: A generic request executor with timeout and
//!   exponential-backoff retry that never raises past its own boundary.
//! * **Sanitize (`sanitize`)**: HTML escaping, the markdown-lite message renderer and the
//!   plain-text form field sanitizer.
//! * **Validation (`validation`)**: Pure validators and typed decoders for the contact and
//!   newsletter forms.
//! * **Server (`server`)**: The axum router exposing `/api/newsletter`, `/api/contact` and
//!   `/api/health`, forwarding to an [`mail::EmailProvider`].

pub mod chat;
pub mod clock;
pub mod config;
pub mod constants;
pub mod fetch;
pub mod mail;
pub mod sanitize;
pub mod server;
pub mod validation;

#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use clock::{Clock, SystemClock};
pub use config::{ChatConfig, ConnectionConfig, ServerConfig};

/// Result type used throughout the Ecofusion library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Ecofusion library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured chat errors from the chat module
    #[error(transparent)]
    Chat(chat::ChatError),

    /// Structured storage errors from the chat storage layer
    #[error(transparent)]
    Storage(chat::StorageError),

    /// Structured request errors from the fetch module
    #[error(transparent)]
    Fetch(fetch::FetchError),

    /// Structured provider errors from the mail module
    #[error(transparent)]
    Provider(mail::ProviderError),

    /// Structured server errors from the server module
    #[error(transparent)]
    Server(server::ServerError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Chat(_) => "chat",
            Error::Storage(_) => "storage",
            Error::Fetch(_) => "fetch",
            Error::Provider(_) => "mail",
            Error::Server(_) => "server",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates an upstream conflict (already exists).
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Provider(provider_err) => provider_err.is_conflict(),
            _ => false,
        }
    }

    /// Check if this error is a network or timeout failure.
    pub fn is_network_error(&self) -> bool {
        match self {
            Error::Chat(chat_err) => chat_err.is_network_error(),
            Error::Fetch(fetch_err) => fetch_err.is_network_error(),
            Error::Provider(provider_err) => provider_err.is_network_error(),
            _ => false,
        }
    }

    /// Check if this error is caused by missing or invalid configuration.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Error::Server(server_err) => server_err.is_configuration_error(),
            Error::Provider(provider_err) => provider_err.is_configuration_error(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Storage(storage_err) => storage_err.is_io_error(),
            _ => false,
        }
    }
}
