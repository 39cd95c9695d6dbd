//! Sealed token issuance: AES-256-GCM over serialized claims.

use crate::TOKEN_TTL_SECS;
use crate::claims::{Issuance, TokenClaims};
use crate::error::TokenError;
use crate::frame::TokenFrame;
use crate::secret::ServerSecret;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce, aead::Aead};
use rand::RngCore;

/// Length of the per-token initialization vector.
pub const IV_LEN: usize = 12;

/// Issues sealed tokens for one application.
///
/// Holds the cipher built from the provisioned secret. Cheap to clone and
/// safe to share across concurrent requests; issuance takes `&self`.
#[derive(Clone)]
pub struct SealedIssuer {
    app_id: u64,
    cipher: Aes256Gcm,
}

impl SealedIssuer {
    /// Build an issuer from a validated secret.
    pub fn new(app_id: u64, secret: &ServerSecret) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(secret.key_bytes());
        Self {
            app_id,
            cipher: Aes256Gcm::new(key),
        }
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
        self.seal(&claims)
    }

    /// Seal an already-built claims record into a wire token.
    pub fn seal(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        let plaintext = claims.to_sealed_json()?;

        // Fresh IV per token; reuse under the same key is never acceptable.
        let mut iv = [0u8; IV_LEN];
        rand::rng().fill_bytes(&mut iv);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&iv), plaintext.as_slice())
            .map_err(|_| TokenError::CryptoFailure("aead encryption rejected".to_string()))?;

        let frame = TokenFrame {
            expire: claims.expire,
            iv: iv.to_vec(),
            ciphertext,
        };
        frame.encode()
    }

    /// Open a sealed token and recover its claims.
    ///
    /// Authentication failure (wrong key, altered IV or ciphertext) is an
    /// error, never a silent success.
    pub fn open(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let frame = TokenFrame::decode(token)?;
        if frame.iv.len() != IV_LEN {
            return Err(TokenError::ParseFailed(format!(
                "unexpected iv length {}",
                frame.iv.len()
            )));
        }

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&frame.iv), frame.ciphertext.as_slice())
            .map_err(|_| {
                TokenError::VerificationFailed("authentication tag mismatch".to_string())
            })?;
        TokenClaims::from_sealed_json(&plaintext)
    }
}
