//! Error types for the server module.
//!
//! Every [`ServerError`] maps to one HTTP status and a JSON body of the form
//! `{ "ok": false, "error": ..., "details": [...] }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::ApiResponse;
use crate::{mail::ProviderError, validation::ValidationResult};

/// Errors returned by the request handlers.
#[non_exhaustive]
#[derive(Debug, Clone, Error)]
pub enum ServerError {
    /// The request body failed validation.
    #[error("Validation failed: {}", .0.errors.join("; "))]
    Validation(ValidationResult),

    /// A setting the endpoint depends on is missing.
    #[error("{0}")]
    NotConfigured(&'static str),

    /// The email is already on the newsletter list.
    #[error("Already subscribed")]
    AlreadySubscribed,

    /// The client exceeded the endpoint's rate limit.
    #[error("Too many requests")]
    RateLimited,

    /// The email provider failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::NotConfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::AlreadySubscribed => StatusCode::CONFLICT,
            ServerError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ServerError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if the server is missing a setting the endpoint needs.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            ServerError::NotConfigured(_) => true,
            ServerError::Provider(provider_err) => provider_err.is_configuration_error(),
            _ => false,
        }
    }

    /// Message shown to the client. Provider failures are not exposed.
    fn public_message(&self) -> String {
        match self {
            ServerError::Validation(_) => "Validation failed".to_string(),
            ServerError::Provider(_) => "Server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let details = match &self {
            ServerError::Validation(result) => result.errors.clone(),
            _ => Vec::new(),
        };
        let body = ApiResponse {
            ok: false,
            error: Some(self.public_message()),
            details,
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<ServerError> for crate::Error {
    fn from(err: ServerError) -> Self {
        crate::Error::Server(err)
    }
}
