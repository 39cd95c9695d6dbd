//! Provisioned secrets, validated once at construction.

use crate::error::TokenError;
use rand::RngCore;

/// The 32-byte sealing key, provisioned as a 64-character hex string.
///
/// Validation happens here, at construction, so issuers never re-check the
/// secret on the request path.
#[derive(Clone, Debug)]
pub struct ServerSecret {
    key: [u8; 32],
}

impl ServerSecret {
    /// Parse a secret from its 64-character hexadecimal form (either case).
    pub fn from_hex(hex_str: &str) -> Result<Self, TokenError> {
        if hex_str.len() != 64 {
            return Err(TokenError::InvalidSecretFormat(format!(
                "expected 64 hex characters, got {}",
                hex_str.len()
            )));
        }
        let bytes = hex::decode(hex_str).map_err(|_| {
            TokenError::InvalidSecretFormat("secret contains non-hex characters".to_string())
        })?;
        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes);
        Ok(Self { key })
    }

    /// Generate a fresh random secret.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let mut key = [0u8; 32];
        rng.fill_bytes(&mut key);
        Self { key }
    }

    /// Raw 32-byte key material.
    pub fn key_bytes(&self) -> &[u8; 32] {
        &self.key
    }

    /// Hex form of the secret.
    pub fn to_hex(&self) -> String {
        hex::encode(self.key)
    }
}

/// Raw signing secret for the keyed-hash variant.
///
/// Used byte-for-byte as the MAC key, no hex decoding.
#[derive(Clone, Debug)]
pub struct SigningSecret {
    bytes: Vec<u8>,
}

impl SigningSecret {
    /// Wrap a raw secret string. Fails when empty.
    pub fn new(secret: impl Into<String>) -> Result<Self, TokenError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(TokenError::InvalidSecretFormat(
                "signing secret must not be empty".to_string(),
            ));
        }
        Ok(Self {
            bytes: secret.into_bytes(),
        })
    }

    /// Raw key bytes.
    pub fn key_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_hex_roundtrip() {
        let secret = ServerSecret::generate();
        let hex = secret.to_hex();
        assert_eq!(hex.len(), 64);

        let parsed = ServerSecret::from_hex(&hex).unwrap();
        assert_eq!(parsed.key_bytes(), secret.key_bytes());
    }

    #[test]
    fn test_secret_accepts_either_case() {
        let lower = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
        let upper = lower.to_uppercase();

        let a = ServerSecret::from_hex(lower).unwrap();
        let b = ServerSecret::from_hex(&upper).unwrap();
        assert_eq!(a.key_bytes(), b.key_bytes());
    }

    #[test]
    fn test_secret_rejects_wrong_length() {
        let short = "a".repeat(63);
        let err = ServerSecret::from_hex(&short).unwrap_err();
        assert!(matches!(err, TokenError::InvalidSecretFormat(_)));
    }

    #[test]
    fn test_secret_rejects_non_hex() {
        let bad = "g".repeat(64);
        let err = ServerSecret::from_hex(&bad).unwrap_err();
        assert!(matches!(err, TokenError::InvalidSecretFormat(_)));
    }

    #[test]
    fn test_generated_secrets_differ() {
        let a = ServerSecret::generate();
        let b = ServerSecret::generate();
        assert_ne!(a.key_bytes(), b.key_bytes());
    }

    #[test]
    fn test_signing_secret_rejects_empty() {
        let err = SigningSecret::new("").unwrap_err();
        assert!(matches!(err, TokenError::InvalidSecretFormat(_)));
    }

    #[test]
    fn test_signing_secret_keeps_raw_bytes() {
        let secret = SigningSecret::new("raw-secret-value").unwrap();
        assert_eq!(secret.key_bytes(), b"raw-secret-value");
    }
}
