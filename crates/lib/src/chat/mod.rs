//! The chatbot client.
//!
//! - [`ChatStateMachine`] owns the conversation and publishes [`ChatSnapshot`]s.
//! - [`ChatTransport`] talks to the conversational server; [`HttpChatTransport`] is
//!   the REST implementation.
//! - [`SessionStore`] persists history, session id and window flags through a
//!   [`Storage`] backend.
//! - [`ChatWidget`] tracks whether the chat window is open or minimized.

mod errors;
mod machine;
pub mod message;
mod storage;
mod transport;
mod widget;

pub use errors::{ChatError, StorageError};
pub use machine::{ChatSnapshot, ChatStateMachine};
pub use message::{ChatMessage, Sender};
pub use storage::{FileStorage, MemoryStorage, SessionStore, Storage};
pub use transport::{BotItem, BotReply, ChatTransport, HttpChatTransport, WebhookRequest};
pub use widget::ChatWidget;
