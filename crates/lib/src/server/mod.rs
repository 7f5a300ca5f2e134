//! The backend HTTP surface.
//!
//! Exposes three JSON endpoints:
//!
//! - `POST /api/newsletter` subscribes an email to the newsletter list.
//! - `POST /api/contact` forwards a contact form to the team by email.
//! - `GET /api/health` reports which features are configured.
//!
//! Both POST endpoints are rate limited per client IP, so the router must be served
//! with connection info (see [`serve`]).

use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{ConnectInfo, State, rejection::JsonRejection},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;

use crate::{
    config::ServerConfig,
    mail::{EmailMessage, EmailProvider},
    validation::{ContactForm, NewsletterForm},
};

mod errors;
mod rate_limit;

pub use errors::ServerError;
pub use rate_limit::RateLimiter;

/// Body of every POST response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl ApiResponse {
    pub fn success() -> Self {
        Self {
            ok: true,
            error: None,
            details: Vec::new(),
        }
    }
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub environment: String,
    pub mail_configured: bool,
    pub newsletter_configured: bool,
}

/// Shared state of the request handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
    provider: Arc<dyn EmailProvider>,
    newsletter_limiter: RateLimiter,
    contact_limiter: RateLimiter,
}

impl AppState {
    pub fn new(config: ServerConfig, provider: Arc<dyn EmailProvider>) -> Self {
        Self {
            newsletter_limiter: RateLimiter::new(config.newsletter_limit),
            contact_limiter: RateLimiter::new(config.contact_limit),
            config: Arc::new(config),
            provider,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    fn health(&self) -> HealthResponse {
        let provider_ready = self.provider.is_configured();
        HealthResponse {
            ok: true,
            environment: self.config.environment.clone(),
            mail_configured: provider_ready
                && self.config.sender().is_some()
                && self.config.contact_recipient().is_some(),
            newsletter_configured: provider_ready && self.config.list_id.is_some(),
        }
    }
}

/// Build the router. Serve it with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/newsletter", post(handle_newsletter))
        .route("/api/contact", post(handle_contact))
        .route("/api/health", get(handle_health))
        .with_state(state)
}

/// Serve the router on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}

/// An unparseable body is validated like an empty one.
fn body_or_null(body: Result<Json<Value>, JsonRejection>) -> Value {
    match body {
        Ok(Json(value)) => value,
        Err(rejection) => {
            tracing::debug!("Rejected request body: {rejection}");
            Value::Null
        }
    }
}

/// Handler for POST /api/newsletter
async fn handle_newsletter(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse>, ServerError> {
    if !state.newsletter_limiter.check(addr.ip()).await {
        return Err(ServerError::RateLimited);
    }

    let form = NewsletterForm::decode(&body_or_null(body)).map_err(ServerError::Validation)?;
    let list_id = state
        .config
        .list_id
        .ok_or(ServerError::NotConfigured("Newsletter list not configured"))?;

    let subscribe = async {
        state.provider.upsert_contact(&form.email).await?;
        state.provider.add_to_list(&form.email, list_id).await
    };
    match subscribe.await {
        Ok(()) => {
            tracing::info!(list_id, "Newsletter subscription added");
            Ok(Json(ApiResponse::success()))
        }
        Err(e) if e.is_conflict() => {
            tracing::debug!("Newsletter subscription already exists");
            Err(ServerError::AlreadySubscribed)
        }
        Err(e) => {
            tracing::error!(error = %e, "Newsletter subscription failed");
            Err(e.into())
        }
    }
}

/// Handler for POST /api/contact
async fn handle_contact(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse>, ServerError> {
    if !state.contact_limiter.check(addr.ip()).await {
        return Err(ServerError::RateLimited);
    }

    let form = ContactForm::decode(&body_or_null(body)).map_err(ServerError::Validation)?;
    let (Some(from), Some(to)) = (state.config.sender(), state.config.contact_recipient()) else {
        return Err(ServerError::NotConfigured(
            "Email sender/recipient not configured",
        ));
    };

    let email = EmailMessage::contact(&form.sanitized(), from, to);
    if let Err(e) = state.provider.send(&email).await {
        tracing::error!(error = %e, "Contact email failed");
        return Err(e.into());
    }

    tracing::info!(project_type = %form.project_type, "Contact email sent");
    Ok(Json(ApiResponse::success()))
}

/// Handler for GET /api/health
async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(state.health())
}
