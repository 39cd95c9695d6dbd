//! Error types for token issuance and inspection.

use thiserror::Error;

/// Errors that can occur during token operations.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Caller-supplied input was rejected before any cryptographic work.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The provisioned secret does not match the shape the scheme requires.
    #[error("invalid secret format: {0}")]
    InvalidSecretFormat(String),

    /// The cipher or MAC primitive rejected the operation.
    #[error("cryptographic operation failed: {0}")]
    CryptoFailure(String),

    /// Claims could not be serialized to wire bytes.
    #[error("failed to encode token: {0}")]
    EncodingFailure(String),

    /// A token string could not be decoded back into a frame.
    #[error("failed to parse token: {0}")]
    ParseFailed(String),

    /// Authentication tag or signature did not match.
    #[error("token verification failed: {0}")]
    VerificationFailed(String),
}
