//! Tokens minted from either key container verify against the public key

use std::collections::HashSet;
use std::time::Duration;

use jsonwebtoken::{Algorithm, Validation, decode};
use proptest::prelude::*;
use serde_json::{Value, json};
use vonage_auth_core::{APPLICATION_ID_CLAIM, AuthError, Claims, TokenMinter, parse_private_key};

const PKCS1: &str = include_str!("fixtures/rsa_pkcs1.pem");
const PKCS8: &str = include_str!("fixtures/rsa_pkcs8.pem");
const APP_ID: &str = "4a4b4c4d-1111-2222-3333-444455556666";

fn verify(minter_pem: &str, verifier_pem: &str) -> serde_json::Map<String, Value> {
    let key = parse_private_key(minter_pem).unwrap();
    let minter = TokenMinter::new(APP_ID, Some(key));
    let token = minter.mint_api_token().unwrap();

    let verifier = parse_private_key(verifier_pem).unwrap();
    let decoded = decode::<serde_json::Map<String, Value>>(
        token.as_str(),
        &verifier.decoding_key().unwrap(),
        &Validation::new(Algorithm::RS256),
    )
    .unwrap();

    assert_eq!(decoded.header.alg, Algorithm::RS256);
    decoded.claims
}

#[test]
fn test_pkcs1_key_produces_verifiable_token() {
    let claims = verify(PKCS1, PKCS1);
    assert_eq!(claims[APPLICATION_ID_CLAIM], json!(APP_ID));
}

#[test]
fn test_pkcs8_key_produces_verifiable_token() {
    // Same key in the other container verifies too
    let claims = verify(PKCS8, PKCS1);
    assert!(claims.contains_key("jti"));
    assert!(claims.contains_key("iat"));
}

#[test]
fn test_tampered_token_is_rejected() {
    let key = parse_private_key(PKCS1).unwrap();
    let minter = TokenMinter::new(APP_ID, Some(key.clone()));
    let token = minter.mint_api_token().unwrap().into_string();

    let mut parts: Vec<&str> = token.split('.').collect();
    let forged_payload = base64_url(r#"{"application_id":"someone-else","exp":4102444800}"#);
    parts[1] = &forged_payload;
    let forged = parts.join(".");

    let result = decode::<Value>(&forged, &key.decoding_key().unwrap(), &Validation::new(Algorithm::RS256));
    assert!(result.is_err());
}

#[test]
fn test_markers_unique_across_many_mints() {
    let minter = TokenMinter::new(APP_ID, Some(parse_private_key(PKCS1).unwrap()));
    let mut seen = HashSet::new();
    for _ in 0..50 {
        let token = minter.mint(Duration::from_secs(30), Claims::new()).unwrap();
        assert!(seen.insert(token.jti.clone()), "duplicate jti {}", token.jti);
    }
}

#[test]
fn test_minter_without_key() {
    let minter = TokenMinter::new(APP_ID, None);
    assert!(matches!(minter.mint_api_token(), Err(AuthError::SigningKeyMissing)));
}

fn base64_url(text: &str) -> String {
    use base64::Engine;
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(text)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_expiry_is_issued_at_plus_ttl(ttl_secs in 1u64..=86_400, tag in "[a-z]{0,12}") {
        let minter = TokenMinter::new(APP_ID, Some(parse_private_key(PKCS1).unwrap()));
        let mut extra = Claims::new();
        extra.insert("tag".to_string(), json!(tag));

        let token = minter.mint(Duration::from_secs(ttl_secs), extra).unwrap();

        let iat = token.claims["iat"].as_i64().unwrap();
        let exp = token.claims["exp"].as_i64().unwrap();
        prop_assert_eq!(exp - iat, ttl_secs as i64);
        prop_assert_eq!(token.expires_at.timestamp(), exp);
        prop_assert!(token.expires_at > token.issued_at);
        prop_assert_eq!(&token.claims["tag"], &json!(tag));
    }
}
