//! Token commands.
//!
//! `roomkey mint` - Mint a token for a user, optionally scoped to a room.
//! `roomkey inspect` - Show what can be read from a token without the secret.
//! `roomkey verify` - Verify a token with the secret and print its claims.

use anyhow::Context;
use roomkey_token::{TokenClaims, TokenFrame, TokenIssuer, TokenScheme, decode_unverified};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolve a server secret from either a file path or the literal value.
///
/// The string can be:
/// - A path to a file containing the secret
/// - The secret itself (e.g., from ROOMKEY_SERVER_SECRET env var)
fn resolve_secret(secret: &str) -> anyhow::Result<String> {
    let path = Path::new(secret);
    if path.exists() {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read secret from file: {}", path.display()))?;
        return Ok(contents.trim().to_string());
    }

    // Otherwise, treat it as the secret itself
    Ok(secret.trim().to_string())
}

/// Resolve a token from either a file path or the literal string.
fn resolve_token(token: &str) -> anyhow::Result<String> {
    let path = Path::new(token);
    if path.exists() {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read token from file: {}", path.display()))?;
        return Ok(contents.trim().to_string());
    }
    Ok(token.trim().to_string())
}

fn build_issuer(scheme: &str, app_id: u64, secret: &str) -> anyhow::Result<TokenIssuer> {
    let scheme: TokenScheme = scheme.parse()?;
    let secret = resolve_secret(secret)?;
    let issuer = TokenIssuer::new(scheme, app_id, &secret)?;
    Ok(issuer)
}

/// Mint a new token.
pub fn mint(
    scheme: String,
    app_id: u64,
    secret: String,
    user_id: String,
    room_id: Option<String>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let issuer = build_issuer(&scheme, app_id, &secret)?;
    let issued = issuer.issue(&user_id, room_id.as_deref())?;

    // Output the token
    if let Some(output_path) = output {
        fs::write(&output_path, &issued.token)
            .with_context(|| format!("Failed to write token to: {}", output_path.display()))?;
        println!("✔ Token written to: {}", output_path.display());
        println!("  App id: {}", issued.app_id);
        println!("  User: {}", issued.user_id);
        if issued.room_id.is_empty() {
            println!("  Room: (none - identity only)");
        } else {
            println!("  Room: {}", issued.room_id);
        }
        println!("  Expires in: {}s", issued.expires_in);
    } else {
        // Print to stdout
        println!("{}", issued.token);
    }

    Ok(())
}

/// Inspect a token without the secret.
///
/// Sealed tokens only reveal their frame layout; signed tokens carry
/// readable claims, printed here without any signature check.
pub fn inspect(token: String) -> anyhow::Result<()> {
    let token_str = resolve_token(&token)?;

    // Sealed tokens parse as a binary frame
    if let Ok(frame) = TokenFrame::decode(&token_str) {
        println!("Token Information:");
        println!("  Format: sealed (AES-256-GCM)");
        println!("  Expire: {} (unix seconds)", frame.expire);
        println!("  IV: {} bytes", frame.iv.len());
        println!("  Ciphertext: {} bytes", frame.ciphertext.len());
        println!();
        println!("Claims are encrypted; run `roomkey verify` with the secret to read them.");
        return Ok(());
    }

    let claims = decode_unverified(&token_str)
        .context("Token is neither a sealed frame nor a signed compact token")?;
    println!("Token Information:");
    println!("  Format: signed (HMAC-SHA256, signature not checked)");
    print_claims(&claims);

    Ok(())
}

/// Verify a token is valid.
pub fn verify(token: String, scheme: String, app_id: u64, secret: String) -> anyhow::Result<()> {
    let issuer = build_issuer(&scheme, app_id, &secret)?;
    let token_str = resolve_token(&token)?;

    match issuer.verify(&token_str) {
        Ok(claims) => {
            println!("✔ Token is valid");
            println!();
            println!("Token Details:");
            print_claims(&claims);
        }
        Err(e) => {
            println!("✖ Token verification failed: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_claims(claims: &TokenClaims) {
    println!("  App id: {}", claims.app_id);
    println!("  User: {}", claims.user_id);
    match &claims.room {
        Some(room) => {
            println!("  Room: {}", room.room_id);
            let privileges: Vec<String> = room
                .privilege
                .iter()
                .map(|(privilege, allow)| format!("{privilege}={allow}"))
                .collect();
            println!("  Privileges: {}", privileges.join(", "));
        }
        None => println!("  Room: (none - identity only)"),
    }
    println!("  Nonce: {}", claims.nonce);
    println!("  Created: {} (unix seconds)", claims.ctime);
    println!("  Expires: {} (unix seconds)", claims.expire);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const HEX_SECRET: &str = "8d745b5b198d4eb3a88e1d84325a60b1c423a7f5c78f48a692e24c9ae07f32bb";

    #[test]
    fn test_resolve_secret_from_file() {
        let dir = tempdir().unwrap();
        let secret_path = dir.path().join("server.secret");
        fs::write(&secret_path, format!("{HEX_SECRET}\n")).unwrap();

        let resolved = resolve_secret(secret_path.to_str().unwrap()).unwrap();
        assert_eq!(resolved, HEX_SECRET);
    }

    #[test]
    fn test_resolve_secret_from_literal() {
        let resolved = resolve_secret(HEX_SECRET).unwrap();
        assert_eq!(resolved, HEX_SECRET);
    }

    #[test]
    fn test_unknown_scheme_is_rejected() {
        assert!(build_issuer("stamped", 1, HEX_SECRET).is_err());
    }

    #[test]
    fn test_mint_sealed_token_to_file() {
        let dir = tempdir().unwrap();
        let token_path = dir.path().join("room.token");

        mint(
            "sealed".to_string(),
            424135686,
            HEX_SECRET.to_string(),
            "cli-user".to_string(),
            Some("cli-room".to_string()),
            Some(token_path.clone()),
        )
        .unwrap();

        assert!(token_path.exists());
        let token = fs::read_to_string(&token_path).unwrap();
        assert!(token.starts_with("04"));
    }

    #[test]
    fn test_mint_with_secret_file() {
        let dir = tempdir().unwrap();
        let secret_path = dir.path().join("server.secret");
        let token_path = dir.path().join("room.token");
        fs::write(&secret_path, HEX_SECRET).unwrap();

        mint(
            "sealed".to_string(),
            424135686,
            secret_path.to_string_lossy().to_string(),
            "cli-user".to_string(),
            None,
            Some(token_path.clone()),
        )
        .unwrap();

        assert!(token_path.exists());
    }

    #[test]
    fn test_verify_accepts_minted_token_from_file() {
        let dir = tempdir().unwrap();
        let token_path = dir.path().join("room.token");

        mint(
            "signed".to_string(),
            424135686,
            "cli-signing-secret".to_string(),
            "cli-user".to_string(),
            Some("cli-room".to_string()),
            Some(token_path.clone()),
        )
        .unwrap();

        verify(
            token_path.to_string_lossy().to_string(),
            "signed".to_string(),
            424135686,
            "cli-signing-secret".to_string(),
        )
        .unwrap();
    }

    #[test]
    fn test_inspect_reads_both_formats() {
        let dir = tempdir().unwrap();

        let sealed_path = dir.path().join("sealed.token");
        mint(
            "sealed".to_string(),
            424135686,
            HEX_SECRET.to_string(),
            "cli-user".to_string(),
            Some("cli-room".to_string()),
            Some(sealed_path.clone()),
        )
        .unwrap();
        inspect(sealed_path.to_string_lossy().to_string()).unwrap();

        let signed_path = dir.path().join("signed.token");
        mint(
            "signed".to_string(),
            424135686,
            "cli-signing-secret".to_string(),
            "cli-user".to_string(),
            None,
            Some(signed_path.clone()),
        )
        .unwrap();
        inspect(signed_path.to_string_lossy().to_string()).unwrap();
    }

    #[test]
    fn test_inspect_rejects_garbage() {
        assert!(inspect("not-a-token".to_string()).is_err());
    }
}
