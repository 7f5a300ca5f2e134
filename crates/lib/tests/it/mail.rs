//! Mail integration tests
//!
//! Runs the Mailjet client against a local server that records what it receives.

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
};
use ecofusion::mail::{EmailMessage, EmailProvider, MailjetProvider};
use serde_json::{Value, json};

use crate::helpers::{closed_addr, spawn_router};

#[derive(Debug, Clone)]
struct Received {
    path: String,
    authorization: Option<String>,
    body: Value,
}

#[derive(Clone, Default)]
struct FakeMailjet {
    received: Arc<Mutex<Vec<Received>>>,
    /// Status returned for contact creation.
    contact_status: Option<StatusCode>,
}

async fn handle_any(
    State(fake): State<FakeMailjet>,
    Path((version, resource)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let path = format!("{version}/{resource}");
    fake.received.lock().unwrap().push(Received {
        path: path.clone(),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    match (path.as_str(), fake.contact_status) {
        ("v3/contact", Some(status)) => (
            status,
            Json(json!({"ErrorMessage": "MJ18 A Contact resource with value already exists"})),
        ),
        _ => (StatusCode::CREATED, Json(json!({"Count": 1, "Data": []}))),
    }
}

async fn spawn(fake: &FakeMailjet) -> MailjetProvider {
    let router = Router::new()
        .route("/{version}/REST/{resource}", post(handle_any))
        .route("/{version}/{resource}", post(handle_any))
        .with_state(fake.clone());
    let addr = spawn_router(router).await;
    MailjetProvider::with_base_url(format!("http://{addr}"), "key", "secret")
}

#[tokio::test]
async fn test_newsletter_calls_contact_then_list() {
    let fake = FakeMailjet::default();
    let provider = spawn(&fake).await;

    provider.upsert_contact("ada@example.com").await.unwrap();
    provider.add_to_list("ada@example.com", 42).await.unwrap();

    let received = fake.received.lock().unwrap().clone();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].path, "v3/contact");
    assert_eq!(received[0].body, json!({"Email": "ada@example.com"}));
    assert_eq!(received[1].path, "v3/listrecipient");
    assert_eq!(
        received[1].body,
        json!({"Action": "addforce", "Email": "ada@example.com", "ListID": 42})
    );
    // "key:secret" in base64.
    assert_eq!(received[0].authorization.as_deref(), Some("Basic a2V5OnNlY3JldA=="));
}

#[tokio::test]
async fn test_duplicate_contact_is_a_conflict() {
    let fake = FakeMailjet {
        contact_status: Some(StatusCode::BAD_REQUEST),
        ..FakeMailjet::default()
    };
    let provider = spawn(&fake).await;

    let err = provider.upsert_contact("ada@example.com").await.unwrap_err();
    assert!(err.is_conflict());
    assert!(err.to_string().contains("already exists"));
}

#[tokio::test]
async fn test_send_uses_v31_message_layout() {
    let fake = FakeMailjet::default();
    let provider = spawn(&fake).await;

    let message = EmailMessage {
        from: "noreply@ecofusion.dev".to_string(),
        to: vec!["team@ecofusion.dev".to_string()],
        subject: "Eco Fusion contact: Ada Lovelace (IoT)".to_string(),
        text: "Name: Ada Lovelace".to_string(),
    };
    provider.send(&message).await.unwrap();

    let received = fake.received.lock().unwrap().clone();
    assert_eq!(received[0].path, "v3.1/send");
    assert_eq!(
        received[0].body,
        json!({
            "Messages": [{
                "From": {"Email": "noreply@ecofusion.dev"},
                "To": [{"Email": "team@ecofusion.dev"}],
                "Subject": "Eco Fusion contact: Ada Lovelace (IoT)",
                "TextPart": "Name: Ada Lovelace"
            }]
        })
    );
}

#[tokio::test]
async fn test_unreachable_provider_is_a_network_error() {
    let provider =
        MailjetProvider::with_base_url(format!("http://{}", closed_addr().await), "key", "secret");
    let err = provider.upsert_contact("ada@example.com").await.unwrap_err();
    assert!(err.is_network_error());
    assert!(!err.is_conflict());
}
