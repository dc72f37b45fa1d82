//! JWT minting for Vonage application authentication

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{Algorithm, Header, encode};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::key::SigningKey;
use crate::{AuthError, Result};

/// Lifetime of tokens used to authorize REST calls
pub const API_TOKEN_TTL: Duration = Duration::from_secs(5 * 60);

/// Claim carrying the application identity
pub const APPLICATION_ID_CLAIM: &str = "application_id";

/// Free-form claim set merged into a token
pub type Claims = Map<String, Value>;

/// A signed, time-bounded assertion.
///
/// Tokens are minted per outbound request and never reused.
#[derive(Clone)]
pub struct Token {
    value: String,
    pub jti: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub claims: Claims,
}

impl Token {
    /// The compact JWS string
    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }

    /// Value for an `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.value)
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("jti", &self.jti)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Mints RS256 tokens for one application
#[derive(Clone)]
pub struct TokenMinter {
    application_id: String,
    signing_key: Option<SigningKey>,
    header: Header,
}

impl TokenMinter {
    pub fn new(application_id: impl Into<String>, signing_key: Option<SigningKey>) -> Self {
        Self {
            application_id: application_id.into(),
            signing_key,
            header: Header::new(Algorithm::RS256),
        }
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    pub fn has_signing_key(&self) -> bool {
        self.signing_key.is_some()
    }

    /// Mint a token valid for `ttl`.
    ///
    /// The standard claims (`iat`, `exp`, `jti`, `application_id`) are
    /// written first and `extra_claims` are merged on top. Callers that pass
    /// `iat` or `exp` override the computed values; the returned
    /// [`Token`] reports whatever was actually signed.
    pub fn mint(&self, ttl: Duration, extra_claims: Claims) -> Result<Token> {
        let key = self.signing_key.as_ref().ok_or(AuthError::SigningKeyMissing)?;

        if ttl.is_zero() {
            return Err(AuthError::InvalidTtl("ttl must be positive".to_string()));
        }
        // `exp` has second resolution, partial seconds round up
        let ttl_secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
        let ttl_secs = i64::try_from(ttl_secs)
            .map_err(|_| AuthError::InvalidTtl(format!("ttl too large: {:?}", ttl)))?;

        let iat = Utc::now().timestamp();
        let exp = iat
            .checked_add(ttl_secs)
            .ok_or_else(|| AuthError::InvalidTtl(format!("ttl too large: {:?}", ttl)))?;
        let jti = Uuid::new_v4().to_string();

        let mut claims = Claims::new();
        claims.insert("iat".to_string(), Value::from(iat));
        claims.insert("exp".to_string(), Value::from(exp));
        claims.insert("jti".to_string(), Value::from(jti.clone()));
        claims.insert(
            APPLICATION_ID_CLAIM.to_string(),
            Value::from(self.application_id.clone()),
        );
        claims.extend(extra_claims);

        let value = encode(&self.header, &claims, key.encoding_key())
            .map_err(|e| AuthError::Signing(e.to_string()))?;

        let issued_at = claim_time(&claims, "iat").unwrap_or_else(|| seconds_to_time(iat));
        let expires_at = claim_time(&claims, "exp").unwrap_or_else(|| seconds_to_time(exp));
        let jti = claims
            .get("jti")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or(jti);

        debug!(
            application_id = %self.application_id,
            jti = %jti,
            ttl_secs,
            "Minted application token"
        );

        Ok(Token {
            value,
            jti,
            issued_at,
            expires_at,
            claims,
        })
    }

    /// Short-lived token for REST API authorization
    pub fn mint_api_token(&self) -> Result<Token> {
        self.mint(API_TOKEN_TTL, Claims::new())
    }
}

impl fmt::Debug for TokenMinter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenMinter")
            .field("application_id", &self.application_id)
            .field("has_signing_key", &self.has_signing_key())
            .finish()
    }
}

fn claim_time(claims: &Claims, name: &str) -> Option<DateTime<Utc>> {
    claims
        .get(name)
        .and_then(Value::as_i64)
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
}

fn seconds_to_time(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::parse_private_key;
    use serde_json::json;

    const PKCS1: &str = include_str!("../tests/fixtures/rsa_pkcs1.pem");

    fn minter() -> TokenMinter {
        TokenMinter::new("aaaaaaaa-bbbb-cccc-dddd-0123456789ab", Some(parse_private_key(PKCS1).unwrap()))
    }

    #[test]
    fn test_missing_key_fails_before_anything_else() {
        let minter = TokenMinter::new("app", None);
        // Zero ttl would be rejected too; the key check must win
        let err = minter.mint(Duration::ZERO, Claims::new()).unwrap_err();
        assert!(matches!(err, AuthError::SigningKeyMissing));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let err = minter().mint(Duration::ZERO, Claims::new()).unwrap_err();
        assert!(matches!(err, AuthError::InvalidTtl(_)));
    }

    #[test]
    fn test_sub_second_ttl_rounds_up() {
        let token = minter().mint(Duration::from_millis(500), Claims::new()).unwrap();
        assert_eq!(token.expires_at - token.issued_at, chrono::Duration::seconds(1));

        let token = minter().mint(Duration::from_millis(1500), Claims::new()).unwrap();
        assert_eq!(token.expires_at - token.issued_at, chrono::Duration::seconds(2));
    }

    #[test]
    fn test_standard_claims_present() {
        let token = minter().mint_api_token().unwrap();

        assert_eq!(token.as_str().split('.').count(), 3);
        assert_eq!(
            token.claims[APPLICATION_ID_CLAIM],
            json!("aaaaaaaa-bbbb-cccc-dddd-0123456789ab")
        );
        assert_eq!(token.expires_at - token.issued_at, chrono::Duration::minutes(5));
        assert!(Uuid::parse_str(&token.jti).is_ok());
        assert!(token.bearer().starts_with("Bearer ey"));
        assert!(!token.is_expired());
    }

    #[test]
    fn test_extra_claims_merge_and_override() {
        let mut extra = Claims::new();
        extra.insert("scope".to_string(), json!("session.connect"));
        extra.insert("exp".to_string(), json!(4_102_444_800_i64));

        let token = minter().mint(Duration::from_secs(60), extra).unwrap();

        assert_eq!(token.claims["scope"], json!("session.connect"));
        assert_eq!(token.expires_at.timestamp(), 4_102_444_800);
    }

    #[test]
    fn test_identical_inputs_yield_distinct_tokens() {
        let minter = minter();
        let a = minter.mint_api_token().unwrap();
        let b = minter.mint_api_token().unwrap();

        assert_ne!(a.jti, b.jti);
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_debug_hides_signed_value() {
        let token = minter().mint_api_token().unwrap();
        assert!(!format!("{:?}", token).contains(token.as_str()));
    }
}
