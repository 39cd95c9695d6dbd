//! Shared application state.

use roomkey_token::TokenIssuer;
use std::sync::Arc;

/// Shared state for the issuance service.
///
/// The issuer is immutable once built, so handlers share it lock-free.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    issuer: TokenIssuer,
}

impl AppState {
    /// Create state around a configured issuer.
    pub fn new(issuer: TokenIssuer) -> Self {
        Self {
            inner: Arc::new(AppStateInner { issuer }),
        }
    }

    /// The configured token issuer.
    pub fn issuer(&self) -> &TokenIssuer {
        &self.inner.issuer
    }
}
