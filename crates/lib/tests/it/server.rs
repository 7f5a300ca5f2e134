//! Server integration tests
//!
//! Each test serves the router on an ephemeral port and talks to it over HTTP.

use std::{net::SocketAddr, sync::Arc};

use ecofusion::{
    ServerConfig,
    config::RateLimit,
    mail::ProviderError,
    server::{self, ApiResponse, AppState, HealthResponse},
    validation::{ERR_EMAIL, ERR_FIRST_NAME, ERR_MESSAGE},
};
use reqwest::StatusCode;
use serde_json::{Value, json};

use crate::helpers::{ProviderCall, RecordingProvider, spawn_router};

fn configured() -> ServerConfig {
    ServerConfig {
        environment: "test".to_string(),
        sender_email: Some("noreply@ecofusion.dev".to_string()),
        contact_to_email: Some("team@ecofusion.dev".to_string()),
        list_id: Some(42),
        ..ServerConfig::default()
    }
}

async fn spawn(config: ServerConfig, provider: Arc<RecordingProvider>) -> SocketAddr {
    spawn_router(server::router(AppState::new(config, provider))).await
}

async fn post(addr: SocketAddr, path: &str, body: Value) -> (StatusCode, ApiResponse) {
    let response = reqwest::Client::new()
        .post(format!("http://{addr}{path}"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

fn valid_contact() -> Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.com",
        "company": "Analytical <Engines>",
        "projectType": "IoT development",
        "message": "We need a sensor <dashboard> for our farm."
    })
}

#[tokio::test]
async fn test_newsletter_signup() {
    let provider = RecordingProvider::new();
    let addr = spawn(configured(), provider.clone()).await;

    let (status, body) = post(addr, "/api/newsletter", json!({"email": "ada@example.com"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ApiResponse::success());
    assert_eq!(
        provider.calls(),
        vec![
            ProviderCall::UpsertContact("ada@example.com".to_string()),
            ProviderCall::AddToList("ada@example.com".to_string(), 42),
        ]
    );
}

#[tokio::test]
async fn test_newsletter_rejects_invalid_email() {
    let provider = RecordingProvider::new();
    let addr = spawn(configured(), provider.clone()).await;

    let (status, body) = post(addr, "/api/newsletter", json!({"email": "not an email"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body.ok);
    assert_eq!(body.details, vec![ERR_EMAIL.to_string()]);
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_newsletter_without_list_is_a_server_error() {
    let provider = RecordingProvider::new();
    let config = ServerConfig {
        list_id: None,
        ..configured()
    };
    let addr = spawn(config, provider.clone()).await;

    let (status, body) = post(addr, "/api/newsletter", json!({"email": "ada@example.com"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body.error.as_deref(), Some("Newsletter list not configured"));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_newsletter_duplicate_is_a_conflict() {
    let provider = RecordingProvider::new();
    provider.fail_upsert(ProviderError::Status {
        status: 400,
        message: "already exists".to_string(),
    });
    let addr = spawn(configured(), provider.clone()).await;

    let (status, body) = post(addr, "/api/newsletter", json!({"email": "ada@example.com"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body.error.as_deref(), Some("Already subscribed"));
    // The list step is skipped.
    assert_eq!(provider.calls().len(), 1);
}

#[tokio::test]
async fn test_newsletter_provider_failure_is_generic() {
    let provider = RecordingProvider::new();
    provider.fail_upsert(ProviderError::Status {
        status: 503,
        message: "internal detail".to_string(),
    });
    let addr = spawn(configured(), provider).await;

    let (status, body) = post(addr, "/api/newsletter", json!({"email": "ada@example.com"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body.error.as_deref(), Some("Server error"));
}

#[tokio::test]
async fn test_contact_sends_sanitized_email() {
    let provider = RecordingProvider::new();
    let addr = spawn(configured(), provider.clone()).await;

    let (status, body) = post(addr, "/api/contact", valid_contact()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.ok);

    let calls = provider.calls();
    let [ProviderCall::Send(email)] = calls.as_slice() else {
        panic!("expected one email, got {calls:?}");
    };
    assert_eq!(email.from, "noreply@ecofusion.dev");
    assert_eq!(email.to, vec!["team@ecofusion.dev".to_string()]);
    assert_eq!(email.subject, "Eco Fusion contact: Ada Lovelace (IoT development)");
    assert_eq!(
        email.text,
        "Name: Ada Lovelace\nEmail: ada@example.com\nCompany: Analytical Engines\n\
         Project: IoT development\n\nMessage:\nWe need a sensor dashboard for our farm."
    );
}

#[tokio::test]
async fn test_contact_reports_every_violation() {
    let provider = RecordingProvider::new();
    let addr = spawn(configured(), provider.clone()).await;

    let (status, body) = post(
        addr,
        "/api/contact",
        json!({
            "firstName": "A",
            "lastName": "Smith",
            "email": "a@b.co",
            "projectType": "Web",
            "message": "short"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body.details,
        vec![ERR_FIRST_NAME.to_string(), ERR_MESSAGE.to_string()]
    );
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_contact_without_sender_is_a_server_error() {
    let provider = RecordingProvider::new();
    let config = ServerConfig {
        sender_email: None,
        contact_to_email: None,
        ..configured()
    };
    let addr = spawn(config, provider.clone()).await;

    let (status, body) = post(addr, "/api/contact", valid_contact()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body.error.as_deref(), Some("Email sender/recipient not configured"));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_contact_provider_400_is_not_a_conflict() {
    let provider = RecordingProvider::new();
    provider.fail_send(ProviderError::Status {
        status: 400,
        message: "bad request".to_string(),
    });
    let addr = spawn(configured(), provider).await;

    let (status, _) = post(addr, "/api/contact", valid_contact()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_malformed_body_is_a_validation_error() {
    let addr = spawn(configured(), RecordingProvider::new()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/newsletter"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ApiResponse = response.json().await.unwrap();
    assert_eq!(body.details, vec![ERR_EMAIL.to_string()]);
}

#[tokio::test]
async fn test_rate_limits_are_per_endpoint() {
    let provider = RecordingProvider::new();
    let config = ServerConfig {
        contact_limit: RateLimit::per_minute(2),
        ..configured()
    };
    let addr = spawn(config, provider).await;

    for _ in 0..2 {
        let (status, _) = post(addr, "/api/contact", valid_contact()).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = post(addr, "/api/contact", valid_contact()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body.error.as_deref(), Some("Too many requests"));

    // Each endpoint has its own limiter.
    let (status, _) = post(addr, "/api/newsletter", json!({"email": "ada@example.com"})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_reports_configuration() {
    let addr = spawn(configured(), RecordingProvider::new()).await;
    let health: HealthResponse = reqwest::get(format!("http://{addr}/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        health,
        HealthResponse {
            ok: true,
            environment: "test".to_string(),
            mail_configured: true,
            newsletter_configured: true,
        }
    );

    let addr = spawn(ServerConfig::default(), RecordingProvider::unconfigured()).await;
    let health: Value = reqwest::get(format!("http://{addr}/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        health,
        json!({
            "ok": true,
            "environment": "development",
            "mail_configured": false,
            "newsletter_configured": false
        })
    );
}
