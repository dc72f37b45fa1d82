//! Session-join tokens
//!
//! Clients joining a video session present a JWT scoped to that session and
//! carrying their role. Without a signing identity a clearly marked mock
//! token is produced instead so development setups keep working.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};
use tracing::debug;
use vonage_auth_core::{AuthError, Claims, TokenMinter};

use crate::Result;
use crate::types::{Role, TokenOptions, VideoToken};

/// Lifetime of a join token when no expiry is given
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

const MOCK_TOKEN_PREFIX: &str = "mock_";
const MOCK_API_KEY: &str = "mock_api_key";

#[derive(Debug, Clone)]
pub struct VideoTokenGenerator {
    application_id: String,
    minter: Option<TokenMinter>,
}

impl VideoTokenGenerator {
    pub fn new(application_id: impl Into<String>, minter: Option<TokenMinter>) -> Self {
        Self {
            application_id: application_id.into(),
            minter,
        }
    }

    /// Issues real signed tokens
    pub fn is_configured(&self) -> bool {
        self.minter.as_ref().is_some_and(TokenMinter::has_signing_key)
    }

    /// Token for `user_id` to join `session_id`
    pub fn generate(&self, session_id: &str, user_id: &str, options: TokenOptions) -> Result<VideoToken> {
        let now = Utc::now();
        let expire_time = options
            .expire_time
            .unwrap_or_else(|| now + Duration::hours(DEFAULT_TOKEN_TTL_HOURS));

        let Some(minter) = self.minter.as_ref() else {
            return Ok(self.generate_mock(session_id, user_id, options.role, expire_time));
        };

        let ttl = (expire_time - now)
            .to_std()
            .map_err(|_| AuthError::InvalidTtl(format!("token expiry {} is in the past", expire_time)))?;

        let mut claims = Claims::new();
        claims.insert("scope".to_string(), json!("session.connect"));
        claims.insert("session_id".to_string(), json!(session_id));
        claims.insert("role".to_string(), json!(options.role.as_str()));
        if let Some(data) = options.data.filter(|d| !d.is_empty()) {
            claims.insert("data".to_string(), Value::from(data));
        }
        if !options.initial_layout_class_list.is_empty() {
            claims.insert(
                "initial_layout_class_list".to_string(),
                json!(options.initial_layout_class_list),
            );
        }

        let token = minter.mint(ttl, claims)?;

        debug!(
            session_id = %session_id,
            user_id = %user_id,
            role = %options.role,
            "Generated Vonage Video token"
        );

        Ok(VideoToken {
            token: token.as_str().to_string(),
            session_id: session_id.to_string(),
            api_key: self.application_id.clone(),
            expires_at: token.expires_at.timestamp(),
        })
    }

    pub fn publisher_token(&self, session_id: &str, user_id: &str) -> Result<VideoToken> {
        self.generate(session_id, user_id, role_options(Role::Publisher, user_id))
    }

    pub fn subscriber_token(&self, session_id: &str, user_id: &str) -> Result<VideoToken> {
        self.generate(session_id, user_id, role_options(Role::Subscriber, user_id))
    }

    pub fn moderator_token(&self, session_id: &str, user_id: &str) -> Result<VideoToken> {
        self.generate(session_id, user_id, role_options(Role::Moderator, user_id))
    }

    /// Fluent alternative to [`generate`](Self::generate)
    pub fn builder<'a>(&'a self, session_id: &str, user_id: &str) -> VideoTokenBuilder<'a> {
        VideoTokenBuilder {
            generator: self,
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
            options: TokenOptions::default(),
        }
    }

    fn generate_mock(&self, session_id: &str, user_id: &str, role: Role, expire_time: DateTime<Utc>) -> VideoToken {
        let payload = json!({
            "session_id": session_id,
            "user_id": user_id,
            "role": role.as_str(),
            "exp": expire_time.timestamp(),
            "mock": true,
        });
        let token = format!("{}{}", MOCK_TOKEN_PREFIX, STANDARD.encode(payload.to_string()));

        debug!(session_id = %session_id, user_id = %user_id, "Generated mock video token");

        VideoToken {
            token,
            session_id: session_id.to_string(),
            api_key: MOCK_API_KEY.to_string(),
            expires_at: expire_time.timestamp(),
        }
    }
}

fn role_options(role: Role, user_id: &str) -> TokenOptions {
    TokenOptions {
        role,
        data: Some(user_id.to_string()),
        ..Default::default()
    }
}

pub struct VideoTokenBuilder<'a> {
    generator: &'a VideoTokenGenerator,
    session_id: String,
    user_id: String,
    options: TokenOptions,
}

impl<'a> VideoTokenBuilder<'a> {
    pub fn role(mut self, role: Role) -> Self {
        self.options.role = role;
        self
    }

    pub fn expire_time(mut self, at: DateTime<Utc>) -> Self {
        self.options.expire_time = Some(at);
        self
    }

    /// Expire `ttl` from now
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.options.expire_time = Some(Utc::now() + ttl);
        self
    }

    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.options.data = Some(data.into());
        self
    }

    pub fn layout_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.initial_layout_class_list = classes.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> Result<VideoToken> {
        self.generator.generate(&self.session_id, &self.user_id, self.options)
    }
}
