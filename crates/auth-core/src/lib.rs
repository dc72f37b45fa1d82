//! # Auth-Core - Credentials and tokens for Vonage APIs
//!
//! This crate turns externally supplied credentials into the artifacts the
//! API clients need:
//!
//! - [`parse_private_key`]: PEM (PKCS#1 or PKCS#8) to an RS256 [`SigningKey`]
//! - [`TokenMinter`]: short-lived application JWTs with per-call `jti`
//! - [`Credentials`]: the immutable identity shared by every client
//!
//! Everything here is synchronous and free of shared mutable state.

pub mod credentials;
pub mod error;
pub mod key;
pub mod token;

pub use credentials::{Credentials, CredentialsBuilder};
pub use error::{AuthError, Result};
pub use key::{SigningKey, parse_private_key};
pub use token::{API_TOKEN_TTL, APPLICATION_ID_CLAIM, Claims, Token, TokenMinter};
