//! Error types for video session operations

use thiserror::Error;
use vonage_auth_core::AuthError;
use vonage_infra_common::ApiError;

#[derive(Debug, Error)]
pub enum SessionError {
    /// No record was ever cached under this id
    #[error("Session not found: {0}")]
    NotFound(String),

    /// A record existed but is past its expiry; create a new one
    #[error("Session expired: {0}")]
    Expired(String),

    #[error("Video API not configured: {0}")]
    NotConfigured(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Video API request failed: {0}")]
    Transport(String),

    #[error("Failed to decode video API response: {0}")]
    Decode(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
