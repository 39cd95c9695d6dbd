//! Binary frame and text encoding for the sealed token variant.
//!
//! Wire layout, big-endian throughout:
//!
//! ```text
//! [ expire:8 | iv_len:2 | iv:N | cipher_len:2 | ciphertext+tag:M | mode:1 ]
//! ```
//!
//! The packed frame is base64-encoded (standard alphabet, padded) and
//! prefixed with the two-character version tag: token = "04" + base64(frame).

use crate::VERSION_TAG;
use crate::error::TokenError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Mode byte marking AEAD framing. The only mode the verifier accepts.
pub const MODE_AEAD: u8 = 1;

const EXPIRE_LEN: usize = 8;
const LEN_FIELD: usize = 2;
const MODE_LEN: usize = 1;

/// The sealed-variant binary frame: expiry, IV and ciphertext with tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenFrame {
    /// Unix seconds after which the token is invalid.
    pub expire: i64,

    /// Per-token initialization vector.
    pub iv: Vec<u8>,

    /// Ciphertext with the 16-byte authentication tag appended.
    pub ciphertext: Vec<u8>,
}

impl TokenFrame {
    /// Pack the frame into its fixed byte layout.
    pub fn pack(&self) -> Result<Vec<u8>, TokenError> {
        if self.iv.len() > u16::MAX as usize {
            return Err(TokenError::EncodingFailure(format!(
                "iv length {} exceeds the 16-bit length field",
                self.iv.len()
            )));
        }
        if self.ciphertext.len() > u16::MAX as usize {
            return Err(TokenError::EncodingFailure(format!(
                "ciphertext length {} exceeds the 16-bit length field",
                self.ciphertext.len()
            )));
        }

        let total =
            EXPIRE_LEN + LEN_FIELD + self.iv.len() + LEN_FIELD + self.ciphertext.len() + MODE_LEN;
        let mut buf = Vec::with_capacity(total);

        buf.extend_from_slice(&(self.expire as u64).to_be_bytes());
        buf.extend_from_slice(&(self.iv.len() as u16).to_be_bytes());
        buf.extend_from_slice(&self.iv);
        buf.extend_from_slice(&(self.ciphertext.len() as u16).to_be_bytes());
        buf.extend_from_slice(&self.ciphertext);
        buf.push(MODE_AEAD);

        debug_assert_eq!(buf.len(), total);
        Ok(buf)
    }

    /// Parse a frame from its byte layout.
    ///
    /// Rejects truncated input, trailing bytes and unknown mode bytes.
    pub fn unpack(data: &[u8]) -> Result<Self, TokenError> {
        let min = EXPIRE_LEN + LEN_FIELD + LEN_FIELD + MODE_LEN;
        if data.len() < min {
            return Err(TokenError::ParseFailed(format!(
                "frame too short: {} bytes, need at least {min}",
                data.len()
            )));
        }

        let mut pos = 0;

        let mut expire_bytes = [0u8; EXPIRE_LEN];
        expire_bytes.copy_from_slice(&data[pos..pos + EXPIRE_LEN]);
        let expire = u64::from_be_bytes(expire_bytes) as i64;
        pos += EXPIRE_LEN;

        let iv_len = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
        pos += LEN_FIELD;
        if data.len() < pos + iv_len + LEN_FIELD {
            return Err(TokenError::ParseFailed(
                "frame truncated inside iv".to_string(),
            ));
        }
        let iv = data[pos..pos + iv_len].to_vec();
        pos += iv_len;

        let cipher_len = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
        pos += LEN_FIELD;
        if data.len() < pos + cipher_len + MODE_LEN {
            return Err(TokenError::ParseFailed(
                "frame truncated inside ciphertext".to_string(),
            ));
        }
        let ciphertext = data[pos..pos + cipher_len].to_vec();
        pos += cipher_len;

        let mode = data[pos];
        if mode != MODE_AEAD {
            return Err(TokenError::ParseFailed(format!(
                "unsupported mode byte {mode}"
            )));
        }
        pos += MODE_LEN;

        if pos != data.len() {
            return Err(TokenError::ParseFailed(format!(
                "{} trailing bytes after frame",
                data.len() - pos
            )));
        }

        Ok(Self {
            expire,
            iv,
            ciphertext,
        })
    }

    /// Encode the frame as the final wire token string.
    pub fn encode(&self) -> Result<String, TokenError> {
        let packed = self.pack()?;
        Ok(format!("{VERSION_TAG}{}", STANDARD.encode(packed)))
    }

    /// Decode a wire token string back into its frame.
    pub fn decode(token: &str) -> Result<Self, TokenError> {
        let body = token.strip_prefix(VERSION_TAG).ok_or_else(|| {
            TokenError::ParseFailed(format!(
                "token does not start with version tag {VERSION_TAG:?}"
            ))
        })?;
        let bytes = STANDARD
            .decode(body)
            .map_err(|e| TokenError::ParseFailed(format!("invalid base64: {e}")))?;
        Self::unpack(&bytes)
    }
}
