//! # roomkey-token
//!
//! Construction of short-lived room access tokens in the "04" wire format
//! consumed by the external media-routing verifier.
//!
//! This crate provides functionality for:
//! - Building claims records (user, room, privileges, timing) with
//!   CSPRNG-backed nonces
//! - Sealing claims with AES-256-GCM into a fixed binary frame
//! - Signing claims with HMAC-SHA256 into a compact JOSE-like frame
//! - Encoding, decoding and verifying the resulting token strings
//!
//! ## Two Wire Formats
//!
//! The external verifier is a third party with a frozen format, so the
//! byte layout matters bit-for-bit. Which format is live depends on the
//! deployment, so both are first-class behind an explicit selector:
//!
//! | Scheme | Sealing | Frame |
//! |--------|---------|-------|
//! | **Sealed** | AES-256-GCM, fresh 12-byte IV per token | binary `expire/iv/ciphertext/mode` frame, standard base64 |
//! | **Signed** | HMAC-SHA256 over `header.payload` | three base64url segments, outer URL-safe base64 |
//!
//! Both yield a token string starting with the literal version tag `"04"`.

pub mod claims;
pub mod error;
pub mod frame;
pub mod issuer;
pub mod sealed;
pub mod secret;
pub mod signed;

pub use claims::{Issuance, RoomAccess, TokenClaims};
pub use error::TokenError;
pub use frame::TokenFrame;
pub use issuer::{IssuedToken, TokenIssuer, TokenScheme};
pub use sealed::SealedIssuer;
pub use secret::{ServerSecret, SigningSecret};
pub use signed::{SignedIssuer, decode_unverified};

/// Two-character literal prefixing every token; the only version
/// negotiation mechanism the verifier understands.
pub const VERSION_TAG: &str = "04";

/// Fixed validity window for every issued token, in seconds.
pub const TOKEN_TTL_SECS: i64 = 86_400;
