//! Resolved API identity
//!
//! A [`Credentials`] value is assembled once at startup and shared read-only
//! by every client. It carries an application identity (id + private key),
//! an account key pair (key + secret), or both.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::key::{SigningKey, parse_private_key};
use crate::token::TokenMinter;
use crate::{AuthError, Result};

#[derive(Clone, Default)]
pub struct Credentials {
    application_id: Option<String>,
    signing_key: Option<SigningKey>,
    api_key: Option<String>,
    api_secret: Option<String>,
    phone_number: Option<String>,
}

impl Credentials {
    pub fn builder() -> CredentialsBuilder {
        CredentialsBuilder::default()
    }

    pub fn application_id(&self) -> Option<&str> {
        self.application_id.as_deref()
    }

    pub fn signing_key(&self) -> Option<&SigningKey> {
        self.signing_key.as_ref()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Default sender number for calls and SMS
    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }

    /// Application id and private key are both present
    pub fn has_application(&self) -> bool {
        self.application_id.as_deref().is_some_and(|id| !id.is_empty()) && self.signing_key.is_some()
    }

    /// API key and secret are both present
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
            && self.api_secret.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Fails unless at least one complete identity is configured
    pub fn ensure_configured(&self) -> Result<()> {
        if self.has_application() || self.has_api_key() {
            Ok(())
        } else {
            Err(AuthError::NotConfigured(
                "set an application id and private key, or an API key and secret".to_string(),
            ))
        }
    }

    /// Minter bound to the application identity
    pub fn token_minter(&self) -> Result<TokenMinter> {
        if !self.has_application() {
            return Err(AuthError::NotConfigured(
                "application id and private key are required for token auth".to_string(),
            ));
        }
        Ok(TokenMinter::new(
            self.application_id.clone().unwrap_or_default(),
            self.signing_key.clone(),
        ))
    }

    /// `Authorization` header value for key/secret authenticated endpoints
    pub fn basic_auth_header(&self) -> Result<String> {
        match (&self.api_key, &self.api_secret) {
            (Some(key), Some(secret)) if self.has_api_key() => {
                let encoded = STANDARD.encode(format!("{}:{}", key, secret));
                Ok(format!("Basic {}", encoded))
            }
            _ => Err(AuthError::NotConfigured(
                "API key and secret are required for basic auth".to_string(),
            )),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("application_id", &self.application_id)
            .field("signing_key", &self.signing_key)
            .field("api_key", &self.api_key)
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<redacted>"))
            .field("phone_number", &self.phone_number)
            .finish()
    }
}

/// Builder for [`Credentials`]
#[derive(Default)]
pub struct CredentialsBuilder {
    inner: Credentials,
}

impl CredentialsBuilder {
    /// Application id plus PEM private key. An empty PEM sets only the id.
    pub fn with_application(mut self, application_id: impl Into<String>, private_key_pem: &str) -> Result<Self> {
        self.inner.application_id = Some(application_id.into());
        if !private_key_pem.trim().is_empty() {
            self.inner.signing_key = Some(parse_private_key(private_key_pem)?);
        }
        Ok(self)
    }

    pub fn with_application_id(mut self, application_id: impl Into<String>) -> Self {
        self.inner.application_id = Some(application_id.into());
        self
    }

    pub fn with_signing_key(mut self, key: SigningKey) -> Self {
        self.inner.signing_key = Some(key);
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        self.inner.api_key = Some(api_key.into());
        self.inner.api_secret = Some(api_secret.into());
        self
    }

    pub fn with_phone_number(mut self, number: impl Into<String>) -> Self {
        self.inner.phone_number = Some(number.into());
        self
    }

    pub fn build(self) -> Credentials {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PKCS8: &str = include_str!("../tests/fixtures/rsa_pkcs8.pem");

    #[test]
    fn test_empty_credentials_are_a_configuration_error() {
        let creds = Credentials::default();
        assert!(!creds.has_application());
        assert!(!creds.has_api_key());
        assert!(matches!(creds.ensure_configured(), Err(AuthError::NotConfigured(_))));
        assert!(matches!(creds.token_minter(), Err(AuthError::NotConfigured(_))));
        assert!(matches!(creds.basic_auth_header(), Err(AuthError::NotConfigured(_))));
    }

    #[test]
    fn test_application_credentials() {
        let creds = Credentials::builder()
            .with_application("app-123", PKCS8)
            .unwrap()
            .with_phone_number("81501234567")
            .build();

        assert!(creds.has_application());
        assert!(creds.ensure_configured().is_ok());
        assert_eq!(creds.phone_number(), Some("81501234567"));

        let minter = creds.token_minter().unwrap();
        assert_eq!(minter.application_id(), "app-123");
        assert!(minter.has_signing_key());
    }

    #[test]
    fn test_empty_pem_sets_only_the_id() {
        let creds = Credentials::builder().with_application("app-123", "  ").unwrap().build();
        assert_eq!(creds.application_id(), Some("app-123"));
        assert!(!creds.has_application());
    }

    #[test]
    fn test_bad_pem_propagates() {
        let result = Credentials::builder().with_application("app-123", "garbage");
        assert!(matches!(result, Err(AuthError::KeyFormat(_))));
    }

    #[test]
    fn test_basic_auth_header() {
        let creds = Credentials::builder().with_api_key("abcd1234", "s3cret").build();
        assert!(creds.ensure_configured().is_ok());
        // base64("abcd1234:s3cret")
        assert_eq!(creds.basic_auth_header().unwrap(), "Basic YWJjZDEyMzQ6czNjcmV0");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials::builder().with_api_key("abcd1234", "s3cret").build();
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("abcd1234"));
        assert!(!rendered.contains("s3cret"));
    }
}
