//! Request handlers for the issuance service.

use crate::error::ServerError;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use roomkey_token::IssuedToken;
use serde::Deserialize;
use serde_json::json;

/// Body of a token issuance request.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    /// User the token should authorize.
    #[serde(rename = "userId")]
    pub user_id: Option<String>,

    /// Room to scope the token to, if any.
    #[serde(rename = "roomId")]
    pub room_id: Option<String>,
}

/// Handle POST /token.
///
/// Missing or empty `userId` is rejected with 400 before any sealing work.
pub async fn issue_token(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<IssuedToken>, ServerError> {
    let user_id = request
        .user_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ServerError::InvalidRequest("userId is required (string)".to_string()))?;

    let issued = state.issuer().issue(&user_id, request.room_id.as_deref())?;

    tracing::info!(
        user_id = %issued.user_id,
        room_id = %issued.room_id,
        token_len = issued.token.len(),
        expires_in = issued.expires_in,
        "token issued"
    );

    Ok(Json(issued))
}

/// Handle GET /healthz.
pub async fn healthz() -> Json<serde_json::Value> {
    Json(json!({
        "ok": true,
        "service": "roomkey-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
