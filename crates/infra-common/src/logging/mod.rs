//! Logging setup built on `tracing-subscriber`

pub mod setup;

pub use setup::{LoggingConfig, LoggingSettings, parse_log_level, setup_logging};
