//! # Infra-Common
//!
//! Shared plumbing for the Vonage client crates:
//!
//! - [`logging`]: `tracing-subscriber` setup used by binaries and tests
//! - [`errors`]: the provider HTTP error type

pub mod errors;
pub mod logging;

pub use errors::{ApiError, Error, Result};
pub use logging::{LoggingConfig, setup_logging};
