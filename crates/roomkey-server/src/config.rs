//! Environment configuration for the issuance service.

use anyhow::{Context, Result};
use roomkey_token::TokenScheme;

/// Runtime configuration, resolved once at startup.
///
/// Bad values fail loudly here instead of surfacing per request.
#[derive(Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub bind: String,

    /// Application id tokens are minted for.
    pub app_id: u64,

    /// Provisioned secret; shape depends on the scheme.
    pub secret: String,

    /// Which wire format to issue.
    pub scheme: TokenScheme,
}

impl ServerConfig {
    /// Resolve configuration from the environment.
    ///
    /// `ROOMKEY_APP_ID` and `ROOMKEY_SERVER_SECRET` are required.
    /// `ROOMKEY_TOKEN_SCHEME` defaults to `sealed` and `ROOMKEY_BIND` to
    /// `0.0.0.0:8080`.
    pub fn from_env() -> Result<Self> {
        let app_id: u64 = std::env::var("ROOMKEY_APP_ID")
            .context("ROOMKEY_APP_ID is not set")?
            .parse()
            .context("ROOMKEY_APP_ID must be an integer")?;

        let secret =
            std::env::var("ROOMKEY_SERVER_SECRET").context("ROOMKEY_SERVER_SECRET is not set")?;

        let scheme: TokenScheme = std::env::var("ROOMKEY_TOKEN_SCHEME")
            .unwrap_or_else(|_| "sealed".to_string())
            .parse()?;

        let bind = std::env::var("ROOMKEY_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        Ok(Self {
            bind,
            app_id,
            secret,
            scheme,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the process-wide environment is mutated in one place.
    #[test]
    fn test_config_from_env() {
        // SAFETY: We're in a test and controlling the environment
        unsafe {
            std::env::set_var("ROOMKEY_APP_ID", "424135686");
            std::env::set_var(
                "ROOMKEY_SERVER_SECRET",
                "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef",
            );
            std::env::remove_var("ROOMKEY_TOKEN_SCHEME");
            std::env::remove_var("ROOMKEY_BIND");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.app_id, 424135686);
        assert_eq!(config.scheme, TokenScheme::Sealed);
        assert_eq!(config.bind, "0.0.0.0:8080");

        unsafe {
            std::env::set_var("ROOMKEY_TOKEN_SCHEME", "signed");
            std::env::set_var("ROOMKEY_BIND", "127.0.0.1:9000");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.scheme, TokenScheme::Signed);
        assert_eq!(config.bind, "127.0.0.1:9000");

        unsafe {
            std::env::set_var("ROOMKEY_TOKEN_SCHEME", "bogus");
        }
        assert!(ServerConfig::from_env().is_err());

        unsafe {
            std::env::remove_var("ROOMKEY_TOKEN_SCHEME");
            std::env::set_var("ROOMKEY_APP_ID", "not-a-number");
        }
        assert!(ServerConfig::from_env().is_err());
    }
}
