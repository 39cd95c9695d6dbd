//! Integration tests for the "04" token wire formats.
//!
//! These exercise the public issuance API end to end against the frozen
//! verifier contract: version tag, frame byte layout, authenticated
//! round-trips and tamper rejection.
//!
//! Run with: cargo test --package roomkey-token --test token_format

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use chrono::Utc;
use roomkey_token::{
    SealedIssuer, ServerSecret, SignedIssuer, SigningSecret, TOKEN_TTL_SECS, TokenClaims,
    TokenError, TokenFrame, TokenIssuer, TokenScheme,
};

const APP_ID: u64 = 424135686;
const HEX_SECRET: &str = "9a3bf1c2d4e5f60718293a4b5c6d7e8f9a3bf1c2d4e5f60718293a4b5c6d7e8f";

fn sealed_issuer() -> SealedIssuer {
    let secret = ServerSecret::from_hex(HEX_SECRET).unwrap();
    SealedIssuer::new(APP_ID, &secret)
}

fn signed_issuer() -> SignedIssuer {
    SignedIssuer::new(APP_ID, SigningSecret::new("integration-secret").unwrap())
}

/// Test that sealed tokens carry the version tag over plain standard base64.
#[test]
fn test_sealed_token_is_tagged_standard_base64() {
    let token = sealed_issuer().issue("test-user-1", Some("room-42")).unwrap();
    assert!(token.starts_with("04"));
    assert!(STANDARD.decode(&token[2..]).is_ok());
}

/// Test that signed tokens carry the version tag over URL-safe base64.
#[test]
fn test_signed_token_is_tagged_url_safe_base64() {
    let token = signed_issuer().issue("test-user-1", Some("room-42")).unwrap();
    assert!(token.starts_with("04"));
    assert!(URL_SAFE_NO_PAD.decode(&token[2..]).is_ok());
}

/// Test that the frame's leading 8 bytes are the big-endian expiry,
/// a full TTL ahead of the clock captured before issuance.
#[test]
fn test_sealed_frame_expiry_window() {
    let before = Utc::now().timestamp();
    let token = sealed_issuer().issue("test-user-1", None).unwrap();

    let frame_bytes = STANDARD.decode(&token[2..]).unwrap();
    let mut expire_bytes = [0u8; 8];
    expire_bytes.copy_from_slice(&frame_bytes[..8]);
    let expire = u64::from_be_bytes(expire_bytes) as i64;

    let expected = before + TOKEN_TTL_SECS;
    assert!(
        (expected..=expected + 2).contains(&expire),
        "expire {expire} outside [{expected}, {}]",
        expected + 2
    );
}

/// Test that expiry is strictly after creation for every issuance.
#[test]
fn test_expiry_strictly_after_creation() {
    let issuer = sealed_issuer();
    for _ in 0..8 {
        let token = issuer.issue("u", Some("r")).unwrap();
        let claims = issuer.open(&token).unwrap();
        assert!(claims.expire > claims.ctime);
        assert_eq!(claims.expire - claims.ctime, TOKEN_TTL_SECS);
    }
}

/// Test that opening a sealed token recovers the exact claims JSON that
/// was sealed, byte for byte.
#[test]
fn test_sealed_roundtrip_recovers_exact_claims_json() {
    let issuer = sealed_issuer();
    let token = issuer.issue("test-user-1", Some("room-42")).unwrap();
    let claims = issuer.open(&token).unwrap();

    // Re-sealing the recovered claims must serialize to identical bytes.
    let json = claims.to_sealed_json().unwrap();
    let reparsed = TokenClaims::from_sealed_json(&json).unwrap();
    assert_eq!(reparsed, claims);

    let text = String::from_utf8(json).unwrap();
    assert!(text.contains(r#""user_id":"test-user-1""#));
    assert!(text.contains(r#"\"room_id\":\"room-42\""#));
    assert!(text.contains(r#"\"privilege\":{\"1\":1,\"2\":1}"#));
    assert!(text.contains(r#"\"stream_id_list\":null"#));
}

/// Test that a wrong key or a flipped frame bit never opens silently.
#[test]
fn test_sealed_token_rejects_wrong_key_and_bit_flips() {
    let issuer = sealed_issuer();
    let token = issuer.issue("u", Some("r")).unwrap();

    let other_secret =
        ServerSecret::from_hex("00000000000000000000000000000000000000000000000000000000000000ff")
            .unwrap();
    let other = SealedIssuer::new(APP_ID, &other_secret);
    assert!(matches!(
        other.open(&token),
        Err(TokenError::VerificationFailed(_))
    ));

    let mut frame = TokenFrame::decode(&token).unwrap();
    frame.iv[5] ^= 0x04;
    assert!(issuer.open(&frame.encode().unwrap()).is_err());

    let mut frame = TokenFrame::decode(&token).unwrap();
    let mid = frame.ciphertext.len() / 2;
    frame.ciphertext[mid] ^= 0x40;
    assert!(issuer.open(&frame.encode().unwrap()).is_err());
}

/// Test that the embedded signature equals an HMAC recomputed from the
/// first two segments, and that single-bit mutations break verification.
#[test]
fn test_signed_token_signature_and_tampering() {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let issuer = signed_issuer();
    let token = issuer.issue("test-user-1", Some("room-42")).unwrap();

    let compact =
        String::from_utf8(URL_SAFE_NO_PAD.decode(&token[2..]).unwrap()).unwrap();
    let parts: Vec<&str> = compact.split('.').collect();
    assert_eq!(parts.len(), 3);

    let mut mac = Hmac::<Sha256>::new_from_slice(b"integration-secret").unwrap();
    mac.update(format!("{}.{}", parts[0], parts[1]).as_bytes());
    let expected = mac.finalize().into_bytes().to_vec();
    assert_eq!(URL_SAFE_NO_PAD.decode(parts[2]).unwrap(), expected);

    for idx in 0..3 {
        let mut bytes = URL_SAFE_NO_PAD.decode(parts[idx]).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x02;

        let mut segments: Vec<String> = parts.iter().map(|s| s.to_string()).collect();
        segments[idx] = URL_SAFE_NO_PAD.encode(&bytes);
        let tampered = format!(
            "04{}",
            URL_SAFE_NO_PAD.encode(segments.join(".").as_bytes())
        );
        assert!(
            issuer.verify(&tampered).is_err(),
            "mutated segment {idx} must not verify"
        );
    }
}

/// Test that nonces recovered from many tokens cover both signs.
#[test]
fn test_nonces_cover_full_signed_range() {
    let issuer = sealed_issuer();
    let mut seen_negative = false;
    let mut seen_positive = false;

    for _ in 0..128 {
        let token = issuer.issue("u", None).unwrap();
        let claims = issuer.open(&token).unwrap();
        if claims.nonce < 0 {
            seen_negative = true;
        }
        if claims.nonce > 0 {
            seen_positive = true;
        }
        if seen_negative && seen_positive {
            return;
        }
    }
    panic!("128 tokens never produced both negative and positive nonces");
}

/// Test that identical inputs never produce identical tokens.
#[test]
fn test_issuance_is_never_idempotent() {
    for scheme in [TokenScheme::Sealed, TokenScheme::Signed] {
        let secret = match scheme {
            TokenScheme::Sealed => HEX_SECRET,
            TokenScheme::Signed => "integration-secret",
        };
        let issuer = TokenIssuer::new(scheme, APP_ID, secret).unwrap();
        let a = issuer.issue("same-user", Some("same-room")).unwrap();
        let b = issuer.issue("same-user", Some("same-room")).unwrap();
        assert_ne!(a.token, b.token, "{scheme} tokens must differ per call");
    }
}

/// Test that an empty user id is rejected before any sealing happens.
#[test]
fn test_empty_user_rejected_without_crypto() {
    assert!(matches!(
        sealed_issuer().issue("", Some("room-42")),
        Err(TokenError::InvalidInput(_))
    ));
    assert!(matches!(
        signed_issuer().issue("", None),
        Err(TokenError::InvalidInput(_))
    ));
}

/// Test that malformed hex secrets fail fast with the format error.
#[test]
fn test_malformed_secrets_fail_fast() {
    let sixty_three = &HEX_SECRET[..63];
    assert!(matches!(
        ServerSecret::from_hex(sixty_three),
        Err(TokenError::InvalidSecretFormat(_))
    ));

    let non_hex = format!("{}zz", &HEX_SECRET[..62]);
    assert!(matches!(
        ServerSecret::from_hex(&non_hex),
        Err(TokenError::InvalidSecretFormat(_))
    ));
}

/// Test the worked example: known user, room and app id produce a token
/// whose recovered claims carry the exact ids and a full-day window.
#[test]
fn test_example_scenario() {
    let issuer = TokenIssuer::new(TokenScheme::Sealed, APP_ID, HEX_SECRET).unwrap();
    let issued = issuer.issue("test-user-1", Some("room-42")).unwrap();

    assert!(issued.token.starts_with("04"));
    assert_eq!(issued.app_id, 424135686);
    assert_eq!(issued.user_id, "test-user-1");
    assert_eq!(issued.room_id, "room-42");
    assert_eq!(issued.expires_in, 86_400);

    let claims = issuer.verify(&issued.token).unwrap();
    assert_eq!(claims.app_id, 424135686);
    assert_eq!(claims.user_id, "test-user-1");
    assert_eq!(claims.room_id(), "room-42");
    assert_eq!(claims.expire - claims.ctime, 86_400);
}
