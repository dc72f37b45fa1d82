//! Configuration loading
//!
//! Settings come from an optional TOML file overlaid with `VONAGE_*`
//! environment variables. Nested sections use a double underscore, so
//! `[video] session_ttl_secs` is `VONAGE_VIDEO__SESSION_TTL_SECS`.
//!
//! ```toml
//! application_id = "aaaaaaaa-bbbb-cccc-dddd-0123456789ab"
//! private_key_path = "/etc/vonage/private.key"
//! phone_number = "815012345678"
//!
//! [video]
//! session_ttl_secs = 3600
//! fallback = "fail_fast"
//!
//! [http]
//! timeout_secs = 10
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::debug;
use vonage_auth_core::{Credentials, SigningKey};
use vonage_infra_common::logging::{LoggingSettings, setup_logging};
use vonage_video_core::{FallbackPolicy, RegistryConfig};

use crate::{Error, Result};

/// Prefix of the environment variables read by [`VonageConfig::load`]
pub const ENV_PREFIX: &str = "VONAGE";

/// Upper bound for `video.session_ttl_secs`, one year
pub const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Main configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VonageConfig {
    pub application_id: Option<String>,
    /// Inline PEM, takes precedence over `private_key_path`
    pub private_key: Option<String>,
    pub private_key_path: Option<PathBuf>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    /// Default sender for calls and messages
    pub phone_number: Option<String>,
    pub video: VideoSettings,
    pub http: HttpSettings,
    pub logging: LoggingSettings,
}

/// Video session cache settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    pub session_ttl_secs: u64,
    pub fallback: FallbackPolicy,
}

/// HTTP client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub rest_base_url: String,
    pub video_base_url: String,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            session_ttl_secs: 24 * 60 * 60,
            fallback: FallbackPolicy::Synthetic,
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            rest_base_url: vonage_voice_core::REST_BASE_URL.to_string(),
            video_base_url: vonage_video_core::VIDEO_BASE_URL.to_string(),
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl VonageConfig {
    /// Load from `path` (if given) and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            debug!(path = %path.display(), "Loading Vonage configuration file");
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        let config: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Load from the environment only
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_SESSION_TTL_SECS).contains(&self.video.session_ttl_secs) {
            return Err(Error::Config(format!(
                "video.session_ttl_secs must be between 1 and {}",
                MAX_SESSION_TTL_SECS
            )));
        }
        if self.http.timeout_secs == 0 {
            return Err(Error::Config("http.timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Resolve the configured identity, reading the key file if needed.
    ///
    /// A private key without an application id is rejected. Nothing
    /// configured at all yields empty credentials.
    pub fn credentials(&self) -> Result<Credentials> {
        let mut builder = Credentials::builder();

        let application_id = self.application_id.as_deref().filter(|id| !id.is_empty());
        let inline_key = self.private_key.as_deref().filter(|pem| !pem.trim().is_empty());

        match (application_id, inline_key, &self.private_key_path) {
            (Some(id), Some(pem), _) => builder = builder.with_application(id, pem)?,
            (Some(id), None, Some(path)) => {
                builder = builder
                    .with_application_id(id)
                    .with_signing_key(SigningKey::from_file(path)?)
            }
            (Some(id), None, None) => builder = builder.with_application_id(id),
            (None, Some(_), _) | (None, None, Some(_)) => {
                return Err(Error::Config(
                    "a private key is configured without an application id".to_string(),
                ));
            }
            (None, None, None) => {}
        }

        if let (Some(key), Some(secret)) = (&self.api_key, &self.api_secret) {
            builder = builder.with_api_key(key.clone(), secret.clone());
        }
        if let Some(number) = self.phone_number.as_deref().filter(|n| !n.is_empty()) {
            builder = builder.with_phone_number(number);
        }

        Ok(builder.build())
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            application_id: self.application_id.clone().unwrap_or_default(),
            session_ttl: chrono::Duration::seconds(
                self.video.session_ttl_secs.min(MAX_SESSION_TTL_SECS) as i64,
            ),
            fallback: self.video.fallback,
        }
    }

    /// Install the global `tracing` subscriber from `[logging]`
    pub fn init_logging(&self, app_name: &str) -> Result<()> {
        setup_logging(self.logging.to_config(app_name)?)?;
        Ok(())
    }
}
