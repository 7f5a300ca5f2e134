//! Explicitly constructed configuration objects.
//!
//! Nothing in the library reads the process environment. The binary maps its
//! `clap` arguments (which may come from environment variables) into these
//! structs and passes them to the components at construction time.

use std::time::Duration;

use crate::constants::{RASA_STATUS_PATH, RASA_WEBHOOK_PATH};

/// Timeout and retry settings shared by the chat transport and the fetch helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Number of retries after the first attempt.
    pub retry_attempts: u32,
    /// Base delay for exponential backoff.
    pub retry_delay: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(10_000),
            retry_attempts: 3,
            retry_delay: Duration::from_millis(2_000),
        }
    }
}

/// Settings for the chat client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Base URL of the conversational server, without a trailing slash.
    pub server_url: String,
    /// Inject the welcome message when the widget opens on an empty history.
    pub show_welcome_message: bool,
    /// Open the widget on first visit.
    pub auto_open: bool,
    pub connection: ConnectionConfig,
}

impl ChatConfig {
    /// Create a config pointing at `server_url` with default UI and connection settings.
    pub fn new(server_url: impl Into<String>) -> Self {
        let server_url = server_url.into();
        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// URL of the health probe endpoint.
    pub fn status_url(&self) -> String {
        format!("{}{RASA_STATUS_PATH}", self.server_url)
    }

    /// URL of the REST channel webhook.
    pub fn webhook_url(&self) -> String {
        format!("{}{RASA_WEBHOOK_PATH}", self.server_url)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5005".to_string(),
            show_welcome_message: true,
            auto_open: false,
            connection: ConnectionConfig::default(),
        }
    }
}

/// Fixed-window rate limit: at most `max_requests` per `window` per client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub window: Duration,
    pub max_requests: u32,
}

impl RateLimit {
    pub fn per_minute(max_requests: u32) -> Self {
        Self {
            window: Duration::from_secs(60),
            max_requests,
        }
    }
}

/// Settings for the backend HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Deployment environment name (`development`, `production`, ...).
    pub environment: String,
    /// Verified sender address for outgoing mail.
    pub sender_email: Option<String>,
    /// Recipient of contact form submissions. Defaults to the sender.
    pub contact_to_email: Option<String>,
    /// Newsletter list id at the email provider.
    pub list_id: Option<u64>,
    pub newsletter_limit: RateLimit,
    pub contact_limit: RateLimit,
}

impl ServerConfig {
    /// Effective contact recipient: the explicit recipient, or the sender.
    pub fn contact_recipient(&self) -> Option<&str> {
        self.contact_to_email
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.sender())
    }

    /// Sender address, ignoring empty values.
    pub fn sender(&self) -> Option<&str> {
        self.sender_email.as_deref().filter(|s| !s.is_empty())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            sender_email: None,
            contact_to_email: None,
            list_id: None,
            newsletter_limit: RateLimit::per_minute(10),
            contact_limit: RateLimit::per_minute(3),
        }
    }
}
