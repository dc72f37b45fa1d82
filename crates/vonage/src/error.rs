//! Error type for the aggregate client

use thiserror::Error;
use vonage_auth_core::AuthError;
use vonage_messages_core::MessagesError;
use vonage_video_core::SessionError;
use vonage_voice_core::VoiceError;

#[derive(Debug, Error)]
pub enum Error {
    /// Unreadable file, malformed value or inconsistent settings
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Voice(#[from] VoiceError),

    #[error(transparent)]
    Messages(#[from] MessagesError),

    #[error(transparent)]
    Infra(#[from] vonage_infra_common::Error),
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
