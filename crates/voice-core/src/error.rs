//! Error types for Voice API operations

use thiserror::Error;
use vonage_auth_core::AuthError;
use vonage_infra_common::ApiError;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Voice API request failed: {0}")]
    Transport(String),

    #[error("Failed to decode voice API response: {0}")]
    Decode(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The request cannot be sent as given, e.g. no caller number is known
    #[error("Invalid call request: {0}")]
    InvalidRequest(String),
}

pub type Result<T> = std::result::Result<T, VoiceError>;
