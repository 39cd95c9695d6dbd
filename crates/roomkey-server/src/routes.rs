//! Route definitions for the issuance service.

use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::http::{HeaderName, Method, header};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the service router.
///
/// The allowed-header list is what browser clients of the issuance
/// endpoint already send; changing it breaks their preflights.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ]);

    Router::new()
        .route("/token", post(handlers::issue_token))
        .route("/healthz", get(handlers::healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
