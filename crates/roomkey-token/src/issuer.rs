//! Wire-format selection and the unified issuance facade.

use crate::TOKEN_TTL_SECS;
use crate::claims::{Issuance, TokenClaims};
use crate::error::TokenError;
use crate::sealed::SealedIssuer;
use crate::secret::{ServerSecret, SigningSecret};
use crate::signed::SignedIssuer;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Which wire format an issuer produces.
///
/// The two framings share no code path past the claims record; a verifier
/// keyed to one rejects tokens of the other. Selection happens once, at
/// configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenScheme {
    /// AES-256-GCM sealed binary frame.
    Sealed,

    /// HMAC-SHA256 signed compact frame.
    Signed,
}

impl TokenScheme {
    /// The configuration name of the scheme.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenScheme::Sealed => "sealed",
            TokenScheme::Signed => "signed",
        }
    }
}

impl fmt::Display for TokenScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenScheme {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sealed" => Ok(TokenScheme::Sealed),
            "signed" => Ok(TokenScheme::Signed),
            other => Err(TokenError::InvalidInput(format!(
                "unknown token scheme {other:?}, expected \"sealed\" or \"signed\""
            ))),
        }
    }
}

/// A minted token plus the echoes callers report alongside it.
///
/// The serialized field names match what clients of the issuance endpoint
/// already expect.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    /// The opaque wire token.
    pub token: String,

    /// Application id echo.
    #[serde(rename = "appID")]
    pub app_id: u64,

    /// User echo.
    #[serde(rename = "userId")]
    pub user_id: String,

    /// Room echo, empty when the token is identity-only.
    #[serde(rename = "roomId")]
    pub room_id: String,

    /// Validity window in seconds.
    #[serde(rename = "expiresIn")]
    pub expires_in: i64,
}

/// A configured issuer for one of the two wire formats.
#[derive(Clone)]
pub enum TokenIssuer {
    /// Sealed-variant issuer.
    Sealed(SealedIssuer),

    /// Signed-variant issuer.
    Signed(SignedIssuer),
}

impl fmt::Debug for TokenIssuer {
    // Manual impl: the sealed variant's cipher has no `Debug`, so the
    // derive does not compile; key material stays out of the output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("scheme", &self.scheme())
            .field("app_id", &self.app_id())
            .finish()
    }
}

impl TokenIssuer {
    /// Build an issuer, interpreting the secret per the chosen scheme.
    ///
    /// Secret-format errors surface here, once, rather than per request.
    pub fn new(scheme: TokenScheme, app_id: u64, secret: &str) -> Result<Self, TokenError> {
        if app_id == 0 {
            return Err(TokenError::InvalidInput(
                "app id must be non-zero".to_string(),
            ));
        }
        match scheme {
            TokenScheme::Sealed => {
                let secret = ServerSecret::from_hex(secret)?;
                Ok(TokenIssuer::Sealed(SealedIssuer::new(app_id, &secret)))
            }
            TokenScheme::Signed => {
                let secret = SigningSecret::new(secret)?;
                Ok(TokenIssuer::Signed(SignedIssuer::new(app_id, secret)))
            }
        }
    }

    /// The wire format this issuer produces.
    pub fn scheme(&self) -> TokenScheme {
        match self {
            TokenIssuer::Sealed(_) => TokenScheme::Sealed,
            TokenIssuer::Signed(_) => TokenScheme::Signed,
        }
    }

    /// Application id this issuer mints for.
    pub fn app_id(&self) -> u64 {
        match self {
            TokenIssuer::Sealed(issuer) => issuer.app_id(),
            TokenIssuer::Signed(issuer) => issuer.app_id(),
        }
    }

    /// Mint a token for a user, optionally scoped to a room.
    ///
    /// The validity window is the fixed system TTL.
    pub fn issue(&self, user_id: &str, room_id: Option<&str>) -> Result<IssuedToken, TokenError> {
        let claims = TokenClaims::issue(
            self.app_id(),
            user_id,
            room_id,
            Issuance::now(),
            TOKEN_TTL_SECS,
        )?;

        let token = match self {
            TokenIssuer::Sealed(issuer) => issuer.seal(&claims)?,
            TokenIssuer::Signed(issuer) => issuer.sign(&claims)?,
        };

        tracing::debug!(
            user_id = %claims.user_id,
            room_id = %claims.room_id(),
            token_len = token.len(),
            "minted token"
        );

        let room_id = claims.room_id().to_string();
        let expires_in = claims.expires_in();
        Ok(IssuedToken {
            token,
            app_id: claims.app_id,
            user_id: claims.user_id,
            room_id,
            expires_in,
        })
    }

    /// Authenticate a token minted by this issuer and recover its claims.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        match self {
            TokenIssuer::Sealed(issuer) => issuer.open(token),
            TokenIssuer::Signed(issuer) => issuer.verify(token),
        }
    }
}
