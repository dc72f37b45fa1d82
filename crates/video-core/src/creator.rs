//! Remote session creation

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error};
use vonage_auth_core::TokenMinter;
use vonage_infra_common::ApiError;

use crate::types::{CreateSessionOptions, CreatedSession};
use crate::{Result, SessionError};

/// Default Video API base URL
pub const VIDEO_BASE_URL: &str = "https://video.api.vonage.com";

/// Creates sessions on the provider.
///
/// Implementations talk to the network; the registry calls them without
/// holding its lock and never retries.
#[async_trait]
pub trait SessionCreator: Send + Sync {
    async fn create_session(&self, options: &CreateSessionOptions) -> Result<CreatedSession>;
}

#[derive(Debug, Deserialize)]
struct CreateSessionResponse {
    session_id: String,
    #[serde(default)]
    project_id: Option<String>,
}

/// The provider answers with either an array or a single object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CreateSessionBody {
    Many(Vec<CreateSessionResponse>),
    One(CreateSessionResponse),
}

/// [`SessionCreator`] backed by `POST /session/create`
#[derive(Debug, Clone)]
pub struct RestSessionCreator {
    base_url: String,
    http: reqwest::Client,
    minter: TokenMinter,
}

impl RestSessionCreator {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client, minter: TokenMinter) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            minter,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl SessionCreator for RestSessionCreator {
    async fn create_session(&self, options: &CreateSessionOptions) -> Result<CreatedSession> {
        let token = self.minter.mint_api_token()?;
        let url = format!("{}/session/create", self.base_url);

        let mut request = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, token.bearer())
            .header(reqwest::header::ACCEPT, "application/json");

        let fields = options.form_fields();
        if !fields.is_empty() {
            request = request.form(&fields);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        if !status.is_success() {
            error!(status = status.as_u16(), body = %body, url = %url, "Vonage Video API error");
            return Err(ApiError::from_response(status.as_u16(), body).into());
        }

        let parsed: CreateSessionBody = serde_json::from_str(&body).map_err(|e| {
            error!(body = %body, error = %e, "Failed to parse Vonage Video API response");
            SessionError::Decode(e.to_string())
        })?;

        let first = match parsed {
            CreateSessionBody::Many(sessions) => sessions.into_iter().next(),
            CreateSessionBody::One(session) => Some(session),
        }
        .ok_or_else(|| SessionError::Decode("empty response from API".to_string()))?;

        debug!(session_id = %first.session_id, "Video API created session");

        Ok(CreatedSession {
            session_id: first.session_id,
            project_id: first.project_id.filter(|p| !p.is_empty()),
        })
    }
}
