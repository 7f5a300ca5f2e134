//! The chat state machine.
//!
//! [`ChatStateMachine`] owns the conversation: the ordered message list, the
//! connection status, the loading flag and the last error. Every change is written
//! through the [`SessionStore`] and published to subscribers as a [`ChatSnapshot`].
//!
//! Nothing here returns an error. Transport failures become state (an error string
//! and a bot message) and storage failures are logged by the store.

use std::sync::{
    Arc, Mutex, MutexGuard,
    atomic::{AtomicBool, Ordering},
};

use tokio::sync::watch;

use super::{BotReply, ChatMessage, ChatTransport, SessionStore, Storage, message};
use crate::{
    clock::{Clock, SystemClock},
    constants::{
        ERROR_CONNECT_FAILED, ERROR_REPLY, ERROR_SEND_FAILED, ERROR_UNAVAILABLE, FALLBACK_REPLY,
    },
};

/// Everything a renderer needs to draw the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSnapshot {
    pub messages: Vec<ChatMessage>,
    pub is_connected: bool,
    pub is_loading: bool,
    pub error: Option<String>,
    pub session_id: String,
}

impl ChatSnapshot {
    /// The loading placeholder, if a send is outstanding.
    pub fn placeholder(&self) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.is_loading)
    }
}

/// Which persisted keys an update touches.
#[derive(Debug, Clone, Copy, Default)]
struct Persist {
    messages: bool,
    session_id: bool,
}

impl Persist {
    const NONE: Persist = Persist {
        messages: false,
        session_id: false,
    };
    const MESSAGES: Persist = Persist {
        messages: true,
        session_id: false,
    };
    const ALL: Persist = Persist {
        messages: true,
        session_id: true,
    };
}

/// Conversation state shared between a renderer and the network.
///
/// At most one send is outstanding at a time; a second `send_message` while one is
/// in flight is dropped. The internal lock is never held across an await.
pub struct ChatStateMachine {
    transport: Arc<dyn ChatTransport>,
    store: SessionStore,
    clock: Arc<dyn Clock>,
    in_flight: AtomicBool,
    state: Mutex<ChatSnapshot>,
    updates: watch::Sender<ChatSnapshot>,
}

impl ChatStateMachine {
    /// Create a machine backed by `storage`, rehydrating history and session id.
    pub fn new(transport: Arc<dyn ChatTransport>, storage: Arc<dyn Storage>) -> Self {
        Self::with_clock(transport, storage, Arc::new(SystemClock))
    }

    pub fn with_clock(
        transport: Arc<dyn ChatTransport>,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let store = SessionStore::new(storage);
        let messages = store.load_messages();
        let session_id = store.load_or_create_session_id(clock.as_ref());
        tracing::debug!(
            session_id = %session_id,
            messages = messages.len(),
            "Chat state loaded"
        );

        let snapshot = ChatSnapshot {
            messages,
            is_connected: false,
            is_loading: false,
            error: None,
            session_id,
        };
        let (updates, _) = watch::channel(snapshot.clone());

        Self {
            transport,
            store,
            clock,
            in_flight: AtomicBool::new(false),
            state: Mutex::new(snapshot),
            updates,
        }
    }

    /// Probe the server once. Call after construction.
    pub async fn initialize(&self) {
        self.test_connection().await;
    }

    /// Receive a snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<ChatSnapshot> {
        self.updates.subscribe()
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        self.lock_state().clone()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock_state().messages.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.lock_state().is_connected
    }

    pub fn is_loading(&self) -> bool {
        self.lock_state().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.lock_state().error.clone()
    }

    pub fn session_id(&self) -> String {
        self.lock_state().session_id.clone()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Send `text` and append the server's reply.
    ///
    /// Blank input, and input arriving while another send is outstanding, is ignored.
    pub async fn send_message(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let Some(guard) = InFlight::acquire(self) else {
            tracing::debug!("Send already in flight, dropping message");
            return;
        };

        let user = ChatMessage::user(text, self.clock());
        let placeholder = ChatMessage::loading(self.clock());
        let session_id = self.apply(Persist::MESSAGES, |state| {
            state.messages.push(user);
            state.messages.push(placeholder);
            state.is_loading = true;
            state.error = None;
            state.session_id.clone()
        });

        let result = self.transport.send(text, &session_id).await;

        let replies: Vec<ChatMessage> = match &result {
            Ok(BotReply::Empty) => vec![ChatMessage::bot(FALLBACK_REPLY, self.clock())],
            Ok(reply) => reply
                .texts()
                .into_iter()
                .map(|text| ChatMessage::bot(text, self.clock()))
                .collect(),
            Err(e) => {
                tracing::error!(session_id = %session_id, error = %e, "Error sending message");
                vec![ChatMessage::error(ERROR_REPLY, self.clock())]
            }
        };

        self.apply(Persist::MESSAGES, |state| {
            state.messages.retain(|m| !m.is_loading);
            state.messages.extend(replies);
            if result.is_err() {
                state.error = Some(ERROR_SEND_FAILED.to_string());
            }
            state.is_loading = false;
        });
        guard.complete();
    }

    /// Probe the server and record whether it is reachable.
    pub async fn test_connection(&self) {
        let result = self.transport.probe().await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "Connection test failed");
        }

        self.apply(Persist::NONE, |state| match result {
            Ok(()) => {
                state.is_connected = true;
                state.error = None;
            }
            Err(e) => {
                state.is_connected = false;
                state.error = Some(if e.is_status_error() {
                    ERROR_CONNECT_FAILED.to_string()
                } else {
                    ERROR_UNAVAILABLE.to_string()
                });
            }
        });
    }

    /// Discard the history and start a new session. Connection status is kept.
    pub fn clear_chat(&self) {
        let session_id = message::generate_session_id(self.clock());
        tracing::info!(session_id = %session_id, "Chat cleared");
        self.apply(Persist::ALL, |state| {
            state.messages.clear();
            state.session_id = session_id;
        });
    }

    /// Append `message` verbatim.
    pub fn add_message(&self, message: ChatMessage) {
        self.apply(Persist::MESSAGES, |state| state.messages.push(message));
    }

    /// Mutate the state, persist what changed and notify subscribers.
    ///
    /// Persistence and publishing happen under the lock so stored and published
    /// snapshots follow mutation order.
    fn apply<R>(&self, persist: Persist, f: impl FnOnce(&mut ChatSnapshot) -> R) -> R {
        let mut state = self.lock_state();
        let result = f(&mut state);

        if persist.messages {
            self.store.save_messages(&state.messages);
        }
        if persist.session_id {
            self.store.save_session_id(&state.session_id);
        }
        self.updates.send_replace(state.clone());
        result
    }

    fn lock_state(&self) -> MutexGuard<'_, ChatSnapshot> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Holds the in-flight flag for one send.
///
/// If the send is abandoned before completing (its future dropped mid-request), the
/// placeholder is removed and loading cleared so the machine accepts new sends.
struct InFlight<'a> {
    machine: &'a ChatStateMachine,
    completed: bool,
}

impl<'a> InFlight<'a> {
    fn acquire(machine: &'a ChatStateMachine) -> Option<Self> {
        machine
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                machine,
                completed: false,
            })
    }

    fn complete(mut self) {
        self.completed = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.completed {
            tracing::warn!("Send abandoned before completion");
            self.machine.apply(Persist::MESSAGES, |state| {
                state.messages.retain(|m| !m.is_loading);
                state.is_loading = false;
            });
        }
        self.machine.in_flight.store(false, Ordering::Release);
    }
}
