//! Error types shared across the workspace

pub mod api;

pub use api::ApiError;

use thiserror::Error;

/// Errors raised by infrastructure helpers
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    /// A global `tracing` subscriber is already installed
    #[error("Failed to install subscriber: {0}")]
    Subscriber(String),
}

pub type Result<T> = std::result::Result<T, Error>;
