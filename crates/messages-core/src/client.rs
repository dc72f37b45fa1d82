//! Messages API client

use reqwest::StatusCode;
use tracing::{debug, error};
use vonage_auth_core::{Credentials, TokenMinter};
use vonage_infra_common::ApiError;

use crate::types::{Channel, SendRequest, SendResponse};
use crate::{MessagesError, Result};

/// Default REST base URL
pub const REST_BASE_URL: &str = "https://api.nexmo.com";

#[derive(Debug, Clone)]
pub struct MessagesClient {
    base_url: String,
    phone_number: Option<String>,
    minter: TokenMinter,
    http: reqwest::Client,
}

impl MessagesClient {
    pub fn new(minter: TokenMinter, http: reqwest::Client) -> Self {
        Self {
            base_url: REST_BASE_URL.to_string(),
            phone_number: None,
            minter,
            http,
        }
    }

    /// Client for the application in `credentials`, sending from its phone number
    pub fn from_credentials(credentials: &Credentials, http: reqwest::Client) -> Result<Self> {
        let client = Self::new(credentials.token_minter()?, http);
        Ok(match credentials.phone_number() {
            Some(number) => client.with_phone_number(number),
            None => client,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sender used when a request has no `from`
    pub fn with_phone_number(mut self, number: impl Into<String>) -> Self {
        self.phone_number = Some(number.into());
        self
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }

    pub async fn send(&self, mut request: SendRequest) -> Result<SendResponse> {
        if request.from.as_deref().is_none_or(str::is_empty) {
            request.from = Some(self.phone_number.clone().ok_or_else(|| {
                MessagesError::InvalidRequest("no sender given and no phone number configured".to_string())
            })?);
        }

        let token = self.minter.mint_api_token()?;
        let url = format!("{}/v1/messages", self.base_url);

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, token.bearer())
            .json(&request)
            .send()
            .await
            .map_err(|e| MessagesError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MessagesError::Transport(e.to_string()))?;

        if status != StatusCode::OK && status != StatusCode::ACCEPTED {
            error!(status = status.as_u16(), body = %body, "Vonage Messages API error");
            return Err(ApiError::from_response(status.as_u16(), body).into());
        }

        let sent: SendResponse = serde_json::from_str(&body).map_err(|e| {
            error!(body = %body, error = %e, "Failed to parse Vonage Messages API response");
            MessagesError::Decode(e.to_string())
        })?;

        debug!(
            message_uuid = %sent.message_uuid,
            to = %request.to,
            channel = %request.channel,
            "Message sent"
        );
        Ok(sent)
    }

    pub async fn send_sms(&self, to: &str, text: &str) -> Result<SendResponse> {
        self.send(SendRequest::text(Channel::Sms, to, text)).await
    }

    pub async fn send_sms_from(&self, from: &str, to: &str, text: &str) -> Result<SendResponse> {
        self.send(SendRequest::text(Channel::Sms, to, text).with_from(from))
            .await
    }

    pub async fn send_mms(&self, to: &str, image_url: &str, caption: Option<&str>) -> Result<SendResponse> {
        self.send(SendRequest::image(
            Channel::Mms,
            to,
            image_url,
            caption.map(str::to_string),
        ))
        .await
    }

    pub async fn send_whatsapp(&self, to: &str, text: &str) -> Result<SendResponse> {
        self.send(SendRequest::text(Channel::Whatsapp, to, text)).await
    }

    pub async fn send_whatsapp_image(&self, to: &str, image_url: &str, caption: Option<&str>) -> Result<SendResponse> {
        self.send(SendRequest::image(
            Channel::Whatsapp,
            to,
            image_url,
            caption.map(str::to_string),
        ))
        .await
    }
}
