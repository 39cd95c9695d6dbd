//! Error types for the issuance service.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use roomkey_token::TokenError;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Request was rejected before any issuance work.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Token issuance failed.
    #[error("failed to generate token: {0}")]
    IssuanceFailed(String),
}

impl From<TokenError> for ServerError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidInput(msg) => ServerError::InvalidRequest(msg),
            other => ServerError::IssuanceFailed(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::IssuanceFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "token request failed");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
