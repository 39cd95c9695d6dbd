//! Signed token issuance: HMAC-SHA256 over a compact JOSE-like frame.
//!
//! Header and payload are base64url-encoded without padding and joined as
//! `header.payload.signature`; the MAC covers the UTF-8 bytes of
//! `header.payload`. The three-part string gets one outer URL-safe base64
//! layer (no padding) and the version tag prefix.

use crate::claims::{Issuance, SIGNED_HEADER_JSON, TokenClaims};
use crate::error::TokenError;
use crate::secret::SigningSecret;
use crate::{TOKEN_TTL_SECS, VERSION_TAG};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Issues signed tokens for one application.
///
/// Holds the raw signing secret; cheap to clone and safe to share across
/// concurrent requests.
#[derive(Clone)]
pub struct SignedIssuer {
    app_id: u64,
    secret: SigningSecret,
}

impl SignedIssuer {
    /// Build an issuer from a validated secret.
    pub fn new(app_id: u64, secret: SigningSecret) -> Self {
        Self { app_id, secret }
    }

    /// Application id this issuer mints for.
    pub fn app_id(&self) -> u64 {
        self.app_id
    }

    /// Mint a token for a user, optionally scoped to a room.
    pub fn issue(&self, user_id: &str, room_id: Option<&str>) -> Result<String, TokenError> {
        let claims = TokenClaims::issue(
            self.app_id,
            user_id,
            room_id,
            Issuance::now(),
            TOKEN_TTL_SECS,
        )?;
        self.sign(&claims)
    }

    /// Sign an already-built claims record into a wire token.
    pub fn sign(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        let header_b64 = URL_SAFE_NO_PAD.encode(SIGNED_HEADER_JSON.as_bytes());
        let payload_b64 = URL_SAFE_NO_PAD.encode(claims.to_signed_json()?);

        let signing_input = format!("{header_b64}.{payload_b64}");
        let signature = self.mac(signing_input.as_bytes())?;
        let sig_b64 = URL_SAFE_NO_PAD.encode(signature);

        let compact = format!("{signing_input}.{sig_b64}");
        Ok(format!(
            "{VERSION_TAG}{}",
            URL_SAFE_NO_PAD.encode(compact.as_bytes())
        ))
    }

    /// Verify a signed token and recover its claims.
    ///
    /// The signature is checked in constant time before any claim parsing.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let (header_b64, payload_b64, sig_b64) = split_compact(token)?;

        let signing_input = format!("{header_b64}.{payload_b64}");
        let expected = self.mac(signing_input.as_bytes())?;
        let provided = URL_SAFE_NO_PAD
            .decode(&sig_b64)
            .map_err(|e| TokenError::ParseFailed(format!("invalid signature base64: {e}")))?;
        let signature_ok: bool = expected.ct_eq(&provided).into();
        if !signature_ok {
            return Err(TokenError::VerificationFailed(
                "signature mismatch".to_string(),
            ));
        }

        let header_bytes = URL_SAFE_NO_PAD
            .decode(&header_b64)
            .map_err(|e| TokenError::ParseFailed(format!("invalid header base64: {e}")))?;
        let header: serde_json::Value = serde_json::from_slice(&header_bytes)
            .map_err(|e| TokenError::ParseFailed(format!("invalid header json: {e}")))?;
        if header.get("alg").and_then(|v| v.as_str()) != Some("HS256") {
            return Err(TokenError::VerificationFailed(
                "unexpected signature algorithm".to_string(),
            ));
        }

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(&payload_b64)
            .map_err(|e| TokenError::ParseFailed(format!("invalid payload base64: {e}")))?;
        TokenClaims::from_signed_json(&payload_bytes)
    }

    fn mac(&self, data: &[u8]) -> Result<Vec<u8>, TokenError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.key_bytes())
            .map_err(|e| TokenError::CryptoFailure(format!("failed to key mac: {e}")))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

/// Decode a signed token's claims without checking the signature (for debugging).
pub fn decode_unverified(token: &str) -> Result<TokenClaims, TokenError> {
    let (_, payload_b64, _) = split_compact(token)?;
    let payload_bytes = URL_SAFE_NO_PAD
        .decode(&payload_b64)
        .map_err(|e| TokenError::ParseFailed(format!("invalid payload base64: {e}")))?;
    TokenClaims::from_signed_json(&payload_bytes)
}

/// Unwrap the outer base64 layer and split the compact form into its three
/// still-encoded segments: header, payload, signature.
fn split_compact(token: &str) -> Result<(String, String, String), TokenError> {
    let body = token.strip_prefix(VERSION_TAG).ok_or_else(|| {
        TokenError::ParseFailed(format!(
            "token does not start with version tag {VERSION_TAG:?}"
        ))
    })?;

    let compact_bytes = URL_SAFE_NO_PAD
        .decode(body)
        .map_err(|e| TokenError::ParseFailed(format!("invalid outer base64: {e}")))?;
    let compact = String::from_utf8(compact_bytes)
        .map_err(|_| TokenError::ParseFailed("token body is not utf-8".to_string()))?;

    let mut parts = compact.split('.');
    let (Some(header), Some(payload), Some(sig), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::ParseFailed(
            "expected three dot-separated segments".to_string(),
        ));
    };
    Ok((header.to_string(), payload.to_string(), sig.to_string()))
}
