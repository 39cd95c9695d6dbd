//! Claims carried by a room access token.

use crate::error::TokenError;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Privilege id granting entry to the room.
pub const PRIVILEGE_LOGIN_ROOM: u16 = 1;

/// Privilege id granting stream publishing.
pub const PRIVILEGE_PUBLISH_STREAM: u16 = 2;

/// Privilege value meaning "allowed".
pub const PRIVILEGE_ALLOW: u8 = 1;

/// Room-scoped privileges attached to a token.
///
/// Field names and the numeric-keyed privilege map are fixed by the
/// external verifier's wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomAccess {
    /// Room the token grants access to.
    pub room_id: String,

    /// Privilege map keyed by privilege id (1 = enter room, 2 = publish).
    pub privilege: BTreeMap<u16, u8>,

    /// Streams the holder may publish; `None` means unrestricted.
    pub stream_id_list: Option<Vec<String>>,
}

impl RoomAccess {
    /// Grant entry and publish privileges for a room, unrestricted streams.
    pub fn allow_all(room_id: impl Into<String>) -> Self {
        let mut privilege = BTreeMap::new();
        privilege.insert(PRIVILEGE_LOGIN_ROOM, PRIVILEGE_ALLOW);
        privilege.insert(PRIVILEGE_PUBLISH_STREAM, PRIVILEGE_ALLOW);
        Self {
            room_id: room_id.into(),
            privilege,
            stream_id_list: None,
        }
    }
}

/// Fresh issuance material: a random nonce and the current wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Issuance {
    /// Random value drawn uniformly over the full signed 32-bit range.
    pub nonce: i32,

    /// Unix time at issuance, whole seconds.
    pub ctime: i64,
}

impl Issuance {
    /// Draw a nonce from the CSPRNG and read the clock.
    pub fn now() -> Self {
        let mut rng = rand::rng();
        Self {
            nonce: rng.random::<i32>(),
            ctime: Utc::now().timestamp(),
        }
    }

    /// Fixed issuance material, for deterministic construction in tests.
    pub fn at(nonce: i32, ctime: i64) -> Self {
        Self { nonce, ctime }
    }
}

/// The facts a token attests to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// Application the token is issued for.
    pub app_id: u64,

    /// User the token authorizes.
    pub user_id: String,

    /// Room-scoped privileges; `None` issues an identity-only token.
    pub room: Option<RoomAccess>,

    /// Per-token random value.
    pub nonce: i32,

    /// Unix seconds at issuance.
    pub ctime: i64,

    /// Unix seconds after which the token is invalid.
    pub expire: i64,
}

/// Sealed-variant wire record. The room payload travels as a
/// pre-stringified JSON string, `""` when no room is scoped.
#[derive(Debug, Serialize, Deserialize)]
struct SealedRecord {
    app_id: u64,
    user_id: String,
    nonce: i32,
    ctime: i64,
    expire: i64,
    payload: String,
}

/// Signed-variant wire record. Room fields are always present; an empty
/// `room_id` with an empty privilege map means no room-scoped privilege.
#[derive(Debug, Serialize, Deserialize)]
struct SignedRecord {
    app_id: u64,
    user_id: String,
    room_id: String,
    privilege: BTreeMap<u16, u8>,
    stream_id_list: Option<Vec<String>>,
    nonce: i32,
    ctime: i64,
    expire: i64,
}

/// Fixed header for the signed wire variant.
pub(crate) const SIGNED_HEADER_JSON: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

impl TokenClaims {
    /// Assemble claims for a user, optionally scoped to a room.
    ///
    /// A blank or absent `room_id` normalizes to no room access. Fails
    /// with `InvalidInput` when the user id is empty, the app id is zero,
    /// or the TTL is not positive.
    pub fn issue(
        app_id: u64,
        user_id: impl Into<String>,
        room_id: Option<&str>,
        issuance: Issuance,
        ttl_secs: i64,
    ) -> Result<Self, TokenError> {
        let user_id = user_id.into();
        if user_id.is_empty() {
            return Err(TokenError::InvalidInput(
                "user id must not be empty".to_string(),
            ));
        }
        if app_id == 0 {
            return Err(TokenError::InvalidInput(
                "app id must be non-zero".to_string(),
            ));
        }
        if ttl_secs <= 0 {
            return Err(TokenError::InvalidInput(format!(
                "ttl must be positive, got {ttl_secs}"
            )));
        }

        let room = match room_id {
            Some(id) if !id.trim().is_empty() => Some(RoomAccess::allow_all(id)),
            _ => None,
        };

        Ok(Self {
            app_id,
            user_id,
            room,
            nonce: issuance.nonce,
            ctime: issuance.ctime,
            expire: issuance.ctime + ttl_secs,
        })
    }

    /// Room id the token is scoped to, empty when identity-only.
    pub fn room_id(&self) -> &str {
        self.room.as_ref().map(|r| r.room_id.as_str()).unwrap_or("")
    }

    /// Seconds of validity remaining at issuance.
    pub fn expires_in(&self) -> i64 {
        self.expire - self.ctime
    }

    /// Canonical JSON bytes for the sealed (AEAD) wire variant.
    pub fn to_sealed_json(&self) -> Result<Vec<u8>, TokenError> {
        let payload = match &self.room {
            Some(room) => serde_json::to_string(room)
                .map_err(|e| TokenError::EncodingFailure(e.to_string()))?,
            None => String::new(),
        };
        let record = SealedRecord {
            app_id: self.app_id,
            user_id: self.user_id.clone(),
            nonce: self.nonce,
            ctime: self.ctime,
            expire: self.expire,
            payload,
        };
        serde_json::to_vec(&record).map_err(|e| TokenError::EncodingFailure(e.to_string()))
    }

    /// Parse claims back out of sealed-variant JSON bytes.
    pub fn from_sealed_json(bytes: &[u8]) -> Result<Self, TokenError> {
        let record: SealedRecord =
            serde_json::from_slice(bytes).map_err(|e| TokenError::ParseFailed(e.to_string()))?;
        let room = if record.payload.is_empty() {
            None
        } else {
            Some(
                serde_json::from_str(&record.payload)
                    .map_err(|e| TokenError::ParseFailed(e.to_string()))?,
            )
        };
        Ok(Self {
            app_id: record.app_id,
            user_id: record.user_id,
            room,
            nonce: record.nonce,
            ctime: record.ctime,
            expire: record.expire,
        })
    }

    /// Canonical JSON bytes of the signed-variant payload segment.
    pub fn to_signed_json(&self) -> Result<Vec<u8>, TokenError> {
        let (room_id, privilege, stream_id_list) = match &self.room {
            Some(room) => (
                room.room_id.clone(),
                room.privilege.clone(),
                room.stream_id_list.clone(),
            ),
            None => (String::new(), BTreeMap::new(), None),
        };
        let record = SignedRecord {
            app_id: self.app_id,
            user_id: self.user_id.clone(),
            room_id,
            privilege,
            stream_id_list,
            nonce: self.nonce,
            ctime: self.ctime,
            expire: self.expire,
        };
        serde_json::to_vec(&record).map_err(|e| TokenError::EncodingFailure(e.to_string()))
    }

    /// Parse claims back out of signed-variant payload JSON bytes.
    pub fn from_signed_json(bytes: &[u8]) -> Result<Self, TokenError> {
        let record: SignedRecord =
            serde_json::from_slice(bytes).map_err(|e| TokenError::ParseFailed(e.to_string()))?;
        let room = if record.room_id.is_empty() {
            None
        } else {
            Some(RoomAccess {
                room_id: record.room_id,
                privilege: record.privilege,
                stream_id_list: record.stream_id_list,
            })
        };
        Ok(Self {
            app_id: record.app_id,
            user_id: record.user_id,
            room,
            nonce: record.nonce,
            ctime: record.ctime,
            expire: record.expire,
        })
    }
}
