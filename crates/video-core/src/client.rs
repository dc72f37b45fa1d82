//! Video API client

use std::sync::Arc;

use tracing::warn;

use crate::creator::SessionCreator;
use crate::registry::{FallbackPolicy, SessionRegistry};
use crate::token::VideoTokenGenerator;
use crate::types::{CreateSessionOptions, SessionRecord, TokenOptions, VideoToken};
use crate::{Result, SessionError};

/// Session cache plus an optional remote creator.
///
/// Without a creator the client runs unconfigured: sessions are synthetic
/// (unless the registry is fail-fast) and tokens are mocks.
pub struct VideoClient {
    registry: SessionRegistry,
    creator: Option<Arc<dyn SessionCreator>>,
    tokens: VideoTokenGenerator,
}

impl VideoClient {
    pub fn new(
        registry: SessionRegistry,
        creator: Option<Arc<dyn SessionCreator>>,
        tokens: VideoTokenGenerator,
    ) -> Self {
        Self {
            registry,
            creator,
            tokens,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.creator.is_some()
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn tokens(&self) -> &VideoTokenGenerator {
        &self.tokens
    }

    pub async fn create_session(&self, options: &CreateSessionOptions) -> Result<SessionRecord> {
        match &self.creator {
            Some(creator) => self.registry.create(creator.as_ref(), options).await,
            None => self.unconfigured(None),
        }
    }

    /// Cached session for `topic_key`, created on a miss
    pub async fn session_for_topic(&self, topic_key: &str, options: &CreateSessionOptions) -> Result<SessionRecord> {
        match &self.creator {
            Some(creator) => {
                self.registry
                    .create_for_topic(topic_key, creator.as_ref(), options)
                    .await
            }
            None => match self.registry.find_by_topic(topic_key) {
                Some(record) => Ok(record),
                None => self.unconfigured(Some(topic_key)),
            },
        }
    }

    pub fn get_session(&self, session_id: &str) -> Result<SessionRecord> {
        self.registry.get(session_id)
    }

    pub fn generate_token(&self, session_id: &str, user_id: &str, options: TokenOptions) -> Result<VideoToken> {
        self.tokens.generate(session_id, user_id, options)
    }

    pub fn cleanup_expired_sessions(&self) -> usize {
        self.registry.sweep()
    }

    pub fn cached_session_count(&self) -> usize {
        self.registry.size()
    }

    fn unconfigured(&self, topic_key: Option<&str>) -> Result<SessionRecord> {
        match self.registry.config().fallback {
            FallbackPolicy::Synthetic => {
                warn!("Vonage Video API not configured, using synthetic session");
                Ok(self.registry.create_synthetic(topic_key))
            }
            FallbackPolicy::FailFast => Err(SessionError::NotConfigured(
                "application id and private key are required".to_string(),
            )),
        }
    }
}
