//! Aggregate client

use std::sync::Arc;

use tracing::{info, warn};
use vonage_auth_core::Credentials;
use vonage_messages_core::MessagesClient;
use vonage_video_core::{
    RestSessionCreator, SessionCreator, SessionRegistry, VideoClient, VideoTokenGenerator,
};
use vonage_voice_core::VoiceClient;

use crate::config::VonageConfig;
use crate::{Error, Result};

/// Voice, Messages and Video clients sharing one identity and HTTP pool.
///
/// Voice and Messages need an application identity. Video always exists
/// and falls back to synthetic sessions and mock tokens without one.
pub struct Client {
    credentials: Credentials,
    voice: Option<VoiceClient>,
    messages: Option<MessagesClient>,
    video: VideoClient,
}

impl Client {
    pub fn from_config(config: &VonageConfig) -> Result<Self> {
        config.validate()?;
        let credentials = config.credentials()?;

        let http = reqwest::Client::builder()
            .timeout(config.http.timeout())
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        let registry = SessionRegistry::new(config.registry_config());
        let application_id = credentials.application_id().unwrap_or_default().to_string();

        if !credentials.has_application() {
            warn!("Vonage application credentials missing, voice and messages disabled");
            let video = VideoClient::new(registry, None, VideoTokenGenerator::new(application_id, None));
            return Ok(Self {
                credentials,
                voice: None,
                messages: None,
                video,
            });
        }

        let minter = credentials.token_minter()?;

        let mut voice = VoiceClient::new(minter.clone(), http.clone()).with_base_url(&config.http.rest_base_url);
        let mut messages = MessagesClient::new(minter.clone(), http.clone()).with_base_url(&config.http.rest_base_url);
        if let Some(number) = credentials.phone_number() {
            voice = voice.with_phone_number(number);
            messages = messages.with_phone_number(number);
        }

        let creator: Arc<dyn SessionCreator> = Arc::new(RestSessionCreator::new(
            &config.http.video_base_url,
            http,
            minter.clone(),
        ));
        let video = VideoClient::new(
            registry,
            Some(creator),
            VideoTokenGenerator::new(application_id.clone(), Some(minter)),
        );

        info!(application_id = %application_id, "Vonage client configured");
        Ok(Self {
            credentials,
            voice: Some(voice),
            messages: Some(messages),
            video,
        })
    }

    /// Load configuration from the environment and build the client
    pub fn from_env() -> Result<Self> {
        Self::from_config(&VonageConfig::from_env()?)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Whether an application identity is configured
    pub fn is_configured(&self) -> bool {
        self.credentials.has_application()
    }

    pub fn voice(&self) -> Result<&VoiceClient> {
        self.voice.as_ref().ok_or(Error::NotConfigured("Voice API"))
    }

    pub fn messages(&self) -> Result<&MessagesClient> {
        self.messages.as_ref().ok_or(Error::NotConfigured("Messages API"))
    }

    pub fn video(&self) -> &VideoClient {
        &self.video
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vonage_video_core::{CreateSessionOptions, FallbackPolicy, SessionError};

    #[tokio::test]
    async fn test_unconfigured_client_runs_video_synthetic() {
        let client = Client::from_config(&VonageConfig::default()).unwrap();
        assert!(!client.is_configured());
        assert!(matches!(client.voice(), Err(Error::NotConfigured(_))));
        assert!(matches!(client.messages(), Err(Error::NotConfigured(_))));

        let record = client
            .video()
            .session_for_topic("spot-1", &CreateSessionOptions::default())
            .await
            .unwrap();
        assert!(record.is_synthetic);
        assert_eq!(client.video().cached_session_count(), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_fail_fast_surfaces_error() {
        let mut config = VonageConfig::default();
        config.video.fallback = FallbackPolicy::FailFast;
        let client = Client::from_config(&config).unwrap();

        let err = client
            .video()
            .create_session(&CreateSessionOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::NotConfigured(_)));
    }
}
