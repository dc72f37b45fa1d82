//! Error types for messaging operations

use thiserror::Error;
use vonage_auth_core::AuthError;
use vonage_infra_common::ApiError;

#[derive(Debug, Error)]
pub enum MessagesError {
    /// No known inbound format accepted the payload
    #[error("Unrecognized inbound message format")]
    UnrecognizedFormat,

    #[error("Failed to decode payload: {0}")]
    Decode(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Messages API request failed: {0}")]
    Transport(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The message cannot be sent as given, e.g. no sender is known
    #[error("Invalid message: {0}")]
    InvalidRequest(String),
}

pub type Result<T> = std::result::Result<T, MessagesError>;
