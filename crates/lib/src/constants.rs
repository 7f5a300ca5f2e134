//! Constants used throughout the Ecofusion library.
//!
//! Storage keys, fixed user-facing strings and the endpoint paths of the
//! conversational server live here so the chat, widget and server modules agree on them.

/// Storage key for the persisted chat history.
pub const STORAGE_MESSAGES: &str = "ecofusion_chat_messages";

/// Storage key for the persisted chat session id.
pub const STORAGE_SESSION_ID: &str = "ecofusion_chat_session_id";

/// Storage key for the persisted "chat open" flag.
pub const STORAGE_IS_OPEN: &str = "ecofusion_chat_is_open";

/// Storage key for the persisted "chat minimized" flag.
pub const STORAGE_IS_MINIMIZED: &str = "ecofusion_chat_is_minimized";

/// Health probe path on the conversational server.
pub const RASA_STATUS_PATH: &str = "/status";

/// REST channel webhook path on the conversational server.
pub const RASA_WEBHOOK_PATH: &str = "/webhooks/rest/webhook";

/// Id of the injected welcome message.
pub const WELCOME_MESSAGE_ID: &str = "welcome";

/// Text of the injected welcome message.
pub const WELCOME_MESSAGE: &str = "Hi! I'm Eco Fusion's AI assistant. I can help you with:\n\n\
• AI & Automation solutions\n\
• IoT development\n\
• Full-stack development\n\
• Project consultation\n\
• Pricing information\n\n\
How can I assist you today?";

/// Bot message appended when the conversational server replies with nothing.
pub const FALLBACK_REPLY: &str = "I'm sorry, I'm having trouble processing your request right now. Please try again or contact our team directly for immediate assistance.";

/// Bot message appended when a send fails.
pub const ERROR_REPLY: &str = "I'm experiencing technical difficulties. Please try again in a moment or contact us directly for immediate assistance.";

/// Error banner text after a failed send.
pub const ERROR_SEND_FAILED: &str = "Failed to send message. Please try again.";

/// Error banner text when the health probe returns a non-success status.
pub const ERROR_CONNECT_FAILED: &str = "Unable to connect to chat server";

/// Error banner text when the health probe cannot reach the server at all.
pub const ERROR_UNAVAILABLE: &str = "Chat server is currently unavailable";

/// Error recorded by the fetch helper when called without a URL.
pub const ERROR_NO_URL: &str = "No URL provided";

/// Default maximum length for sanitized form fields.
pub const DEFAULT_MAX_INPUT_LENGTH: usize = 1000;
