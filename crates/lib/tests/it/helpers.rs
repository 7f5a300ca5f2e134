use std::{
    collections::VecDeque,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum::Router;
use ecofusion::{
    FixedClock,
    chat::{BotReply, ChatError, ChatStateMachine, ChatTransport, MemoryStorage},
    fetch::{FetchError, FetchResponse, HttpExecutor, RequestOptions},
    mail::{EmailMessage, EmailProvider, ProviderError},
};
use serde_json::Value;
use tokio::{net::TcpListener, sync::Semaphore, time::Instant};

// Re-export tokio test macro for convenience
pub use tokio;

// ==========================
// SERVERS
// ==========================

/// Serve `router` on an ephemeral local port with connection info enabled.
pub async fn spawn_router(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to get local address");
    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Test server failed");
    });
    addr
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    listener.local_addr().expect("Failed to get local address")
}

// ==========================
// HTTP EXECUTOR
// ==========================

/// Outcome of one scripted request.
#[derive(Debug, Clone)]
pub enum Step {
    Respond { status: u16, body: Value },
    Fail(FetchError),
    /// Never completes; only a timeout ends the attempt.
    Hang,
}

impl Step {
    pub fn ok(body: Value) -> Self {
        Step::Respond { status: 200, body }
    }

    pub fn status(status: u16) -> Self {
        Step::Respond {
            status,
            body: Value::Null,
        }
    }
}

/// A request seen by a [`ScriptedExecutor`].
#[derive(Debug, Clone)]
pub struct Call {
    pub url: String,
    pub method: String,
    pub body: Option<Value>,
    pub at: Instant,
}

/// [`HttpExecutor`] that replays scripted steps, then repeats `fallback` forever.
pub struct ScriptedExecutor {
    script: Mutex<VecDeque<Step>>,
    fallback: Step,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedExecutor {
    pub fn new(script: Vec<Step>, fallback: Step) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn always(step: Step) -> Arc<Self> {
        Self::new(Vec::new(), step)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

fn reason(status: u16) -> String {
    axum::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl HttpExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<FetchResponse, FetchError> {
        self.calls.lock().unwrap().push(Call {
            url: url.to_string(),
            method: options.method.to_string(),
            body: options.body.clone(),
            at: Instant::now(),
        });
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match step {
            Step::Respond { status, body } => Ok(FetchResponse {
                status,
                status_text: reason(status),
                body: serde_json::to_vec(&body).unwrap(),
            }),
            Step::Fail(err) => Err(err),
            Step::Hang => std::future::pending().await,
        }
    }
}

/// Forwards to a shared [`ScriptedExecutor`] so the test keeps a handle to it.
pub struct SharedExecutor(pub Arc<ScriptedExecutor>);

#[async_trait]
impl HttpExecutor for SharedExecutor {
    async fn execute(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<FetchResponse, FetchError> {
        self.0.execute(url, options).await
    }
}

// ==========================
// CHAT TRANSPORT
// ==========================

/// [`ChatTransport`] whose sends block until [`GatedTransport::release`] is called.
pub struct GatedTransport {
    gate: Semaphore,
    reply: Mutex<Result<BotReply, ChatError>>,
    probe: Mutex<Result<(), ChatError>>,
    sent: Mutex<Vec<(String, String)>>,
}

impl GatedTransport {
    pub fn new(reply: Result<BotReply, ChatError>) -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(0),
            reply: Mutex::new(reply),
            probe: Mutex::new(Ok(())),
            sent: Mutex::new(Vec::new()),
        })
    }

    /// Let one pending (or future) send complete.
    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn set_reply(&self, reply: Result<BotReply, ChatError>) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn set_probe(&self, probe: Result<(), ChatError>) {
        *self.probe.lock().unwrap() = probe;
    }

    /// `(message, session_id)` pairs in send order.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for GatedTransport {
    async fn probe(&self) -> Result<(), ChatError> {
        self.probe.lock().unwrap().clone()
    }

    async fn send(&self, message: &str, session_id: &str) -> Result<BotReply, ChatError> {
        self.sent
            .lock()
            .unwrap()
            .push((message.to_string(), session_id.to_string()));
        self.gate
            .acquire()
            .await
            .expect("Gate closed")
            .forget();
        self.reply.lock().unwrap().clone()
    }
}

/// A state machine over `transport`, fresh memory storage and a fixed clock.
pub fn chat_machine(transport: Arc<dyn ChatTransport>) -> (Arc<MemoryStorage>, Arc<ChatStateMachine>) {
    let storage = Arc::new(MemoryStorage::new());
    let machine = ChatStateMachine::with_clock(
        transport,
        storage.clone(),
        Arc::new(FixedClock::default()),
    );
    (storage, Arc::new(machine))
}

// ==========================
// EMAIL PROVIDER
// ==========================

/// A call made to a [`RecordingProvider`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCall {
    UpsertContact(String),
    AddToList(String, u64),
    Send(EmailMessage),
}

/// [`EmailProvider`] that records calls and fails on demand.
#[derive(Default)]
pub struct RecordingProvider {
    calls: Mutex<Vec<ProviderCall>>,
    upsert_error: Mutex<Option<ProviderError>>,
    send_error: Mutex<Option<ProviderError>>,
    unconfigured: bool,
}

impl RecordingProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn unconfigured() -> Arc<Self> {
        Arc::new(Self {
            unconfigured: true,
            ..Self::default()
        })
    }

    pub fn fail_upsert(&self, err: ProviderError) {
        *self.upsert_error.lock().unwrap() = Some(err);
    }

    pub fn fail_send(&self, err: ProviderError) {
        *self.send_error.lock().unwrap() = Some(err);
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailProvider for RecordingProvider {
    fn is_configured(&self) -> bool {
        !self.unconfigured
    }

    async fn upsert_contact(&self, email: &str) -> Result<(), ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push(ProviderCall::UpsertContact(email.to_string()));
        match self.upsert_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn add_to_list(&self, email: &str, list_id: u64) -> Result<(), ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push(ProviderCall::AddToList(email.to_string(), list_id));
        Ok(())
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push(ProviderCall::Send(message.clone()));
        match self.send_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
