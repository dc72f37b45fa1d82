//! Voice API client
//!
//! Every request carries a freshly minted application token.

use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use vonage_auth_core::{Credentials, TokenMinter};
use vonage_infra_common::ApiError;

use crate::ncco::Ncco;
use crate::types::{
    CallInfo, CallModification, CreateCallOptions, CreateCallResponse, Endpoint, StreamIntoCall,
    TalkIntoCall, TransferDestination,
};
use crate::{Result, VoiceError};

/// Default REST base URL
pub const REST_BASE_URL: &str = "https://api.nexmo.com";

#[derive(Debug, Clone)]
pub struct VoiceClient {
    base_url: String,
    phone_number: Option<String>,
    minter: TokenMinter,
    http: reqwest::Client,
}

impl VoiceClient {
    pub fn new(minter: TokenMinter, http: reqwest::Client) -> Self {
        Self {
            base_url: REST_BASE_URL.to_string(),
            phone_number: None,
            minter,
            http,
        }
    }

    /// Client for the application in `credentials`, calling from its phone number
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

    pub fn with_phone_number(mut self, number: impl Into<String>) -> Self {
        self.phone_number = Some(number.into());
        self
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }

    /// Place an outbound call
    pub async fn create_call(&self, options: CreateCallOptions) -> Result<CreateCallResponse> {
        let from = match (&options.from, &self.phone_number) {
            (Some(from), _) => from.clone(),
            (None, Some(number)) => Endpoint::phone(number.clone()),
            (None, None) => {
                return Err(VoiceError::InvalidRequest(
                    "no caller endpoint given and no phone number configured".to_string(),
                ));
            }
        };
        let request = options.into_request(from);

        let body = self
            .send(Method::POST, &["v1", "calls"], Some(&request), &[StatusCode::OK, StatusCode::CREATED])
            .await?;
        let response: CreateCallResponse = decode(&body)?;

        debug!(uuid = %response.uuid, status = %response.status, "Call created");
        Ok(response)
    }

    /// Call a phone number, fetching the program from `answer_url`
    pub async fn call_phone(&self, to: &str, answer_url: &str, event_url: &str) -> Result<CreateCallResponse> {
        self.create_call(
            CreateCallOptions::new(Endpoint::phone(to))
                .with_answer_url(answer_url)
                .with_event_url(event_url),
        )
        .await
    }

    /// Call a phone number running `ncco` when answered
    pub async fn call_phone_with_ncco(&self, to: &str, ncco: Ncco, event_url: &str) -> Result<CreateCallResponse> {
        self.create_call(
            CreateCallOptions::new(Endpoint::phone(to))
                .with_ncco(ncco)
                .with_event_url(event_url),
        )
        .await
    }

    pub async fn get_call(&self, call_uuid: &str) -> Result<CallInfo> {
        let body = self
            .send::<()>(Method::GET, &["v1", "calls", call_uuid], None, &[StatusCode::OK])
            .await?;
        decode(&body)
    }

    /// Apply a state change to an active call
    pub async fn modify_call(&self, call_uuid: &str, modification: CallModification) -> Result<()> {
        self.send(
            Method::PUT,
            &["v1", "calls", call_uuid],
            Some(&modification),
            &[StatusCode::OK, StatusCode::NO_CONTENT],
        )
        .await?;

        debug!(call_uuid = %call_uuid, action = modification.name(), "Call modified");
        Ok(())
    }

    /// Continue the call with the program served at `ncco_url`
    pub async fn transfer_call(&self, call_uuid: &str, ncco_url: &str) -> Result<()> {
        self.modify_call(
            call_uuid,
            CallModification::Transfer {
                destination: TransferDestination::url(ncco_url),
            },
        )
        .await
    }

    pub async fn transfer_call_ncco(&self, call_uuid: &str, ncco: Ncco) -> Result<()> {
        self.modify_call(
            call_uuid,
            CallModification::Transfer {
                destination: TransferDestination::inline(ncco),
            },
        )
        .await
    }

    pub async fn hangup_call(&self, call_uuid: &str) -> Result<()> {
        self.modify_call(call_uuid, CallModification::Hangup).await
    }

    pub async fn mute_call(&self, call_uuid: &str) -> Result<()> {
        self.modify_call(call_uuid, CallModification::Mute).await
    }

    pub async fn unmute_call(&self, call_uuid: &str) -> Result<()> {
        self.modify_call(call_uuid, CallModification::Unmute).await
    }

    pub async fn earmuff_call(&self, call_uuid: &str) -> Result<()> {
        self.modify_call(call_uuid, CallModification::Earmuff).await
    }

    pub async fn unearmuff_call(&self, call_uuid: &str) -> Result<()> {
        self.modify_call(call_uuid, CallModification::Unearmuff).await
    }

    pub async fn send_dtmf(&self, call_uuid: &str, digits: &str) -> Result<()> {
        self.send(
            Method::PUT,
            &["v1", "calls", call_uuid, "dtmf"],
            Some(&serde_json::json!({ "digits": digits })),
            &[StatusCode::OK],
        )
        .await?;
        Ok(())
    }

    /// Speak into an active call
    pub async fn talk_into_call(&self, call_uuid: &str, talk: &TalkIntoCall) -> Result<()> {
        self.send(
            Method::PUT,
            &["v1", "calls", call_uuid, "talk"],
            Some(talk),
            &[StatusCode::OK],
        )
        .await?;
        Ok(())
    }

    pub async fn stop_talk(&self, call_uuid: &str) -> Result<()> {
        self.send::<()>(
            Method::DELETE,
            &["v1", "calls", call_uuid, "talk"],
            None,
            &[StatusCode::OK, StatusCode::NO_CONTENT],
        )
        .await?;
        Ok(())
    }

    /// Play audio into an active call
    pub async fn stream_into_call(&self, call_uuid: &str, stream_url: &str, loop_count: u32) -> Result<()> {
        let body = StreamIntoCall {
            stream_url: vec![stream_url.to_string()],
            loop_count,
        };
        self.send(
            Method::PUT,
            &["v1", "calls", call_uuid, "stream"],
            Some(&body),
            &[StatusCode::OK],
        )
        .await?;
        Ok(())
    }

    pub async fn stop_stream(&self, call_uuid: &str) -> Result<()> {
        self.send::<()>(
            Method::DELETE,
            &["v1", "calls", call_uuid, "stream"],
            None,
            &[StatusCode::OK, StatusCode::NO_CONTENT],
        )
        .await?;
        Ok(())
    }

    /// Base URL plus `segments`, each percent-encoded as a single path segment
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| VoiceError::InvalidRequest(format!("invalid base URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| VoiceError::InvalidRequest(format!("base URL {} cannot have a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send one authenticated request and return the body of an accepted response
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
        accepted: &[StatusCode],
    ) -> Result<String> {
        let url = self.endpoint(segments)?;
        let token = self.minter.mint_api_token()?;

        let mut request = self
            .http
            .request(method, url.clone())
            .header(reqwest::header::AUTHORIZATION, token.bearer());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| VoiceError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| VoiceError::Transport(e.to_string()))?;

        if !accepted.contains(&status) {
            error!(status = status.as_u16(), body = %text, url = %url, "Vonage Voice API error");
            return Err(ApiError::from_response(status.as_u16(), text).into());
        }

        Ok(text)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        error!(body = %body, error = %e, "Failed to parse Vonage Voice API response");
        VoiceError::Decode(e.to_string())
    })
}
