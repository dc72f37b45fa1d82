//! Error types for authentication operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// The key text is not a PEM block, or its payload is not a parseable key
    #[error("Invalid private key format: {0}")]
    KeyFormat(String),

    /// The PKCS#8 payload holds a key of another algorithm
    #[error("Unsupported private key type: {0}")]
    KeyType(String),

    #[error("Private key not configured")]
    SigningKeyMissing,

    #[error("Failed to sign token: {0}")]
    Signing(String),

    #[error("Invalid token lifetime: {0}")]
    InvalidTtl(String),

    #[error("Credentials not configured: {0}")]
    NotConfigured(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;
