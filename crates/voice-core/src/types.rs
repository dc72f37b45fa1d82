//! Voice API request and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ncco::{DEFAULT_EVENT_METHOD, Ncco};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointType {
    Phone,
    Sip,
    Websocket,
    Vbc,
}

/// One side of a call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(rename = "type")]
    pub kind: EndpointType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Audio format of a websocket endpoint, e.g. `audio/l16;rate=16000`
    #[serde(rename = "content-type", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl Endpoint {
    fn of(kind: EndpointType) -> Self {
        Self {
            kind,
            number: None,
            uri: None,
            content_type: None,
            extension: None,
        }
    }

    pub fn phone(number: impl Into<String>) -> Self {
        Self {
            number: Some(number.into()),
            ..Self::of(EndpointType::Phone)
        }
    }

    pub fn sip(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            ..Self::of(EndpointType::Sip)
        }
    }

    pub fn websocket(uri: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            content_type: Some(content_type.into()),
            ..Self::of(EndpointType::Websocket)
        }
    }

    pub fn vbc(extension: impl Into<String>) -> Self {
        Self {
            extension: Some(extension.into()),
            ..Self::of(EndpointType::Vbc)
        }
    }
}

/// Body of `POST /v1/calls`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateCallRequest {
    pub to: Vec<Endpoint>,
    pub from: Endpoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ncco: Option<Ncco>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_url: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_url: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_method: Option<String>,
}

/// What the caller asks for when placing a call
#[derive(Debug, Clone, PartialEq)]
pub struct CreateCallOptions {
    pub to: Endpoint,
    /// Defaults to the client's configured phone number
    pub from: Option<Endpoint>,
    /// Used instead of `answer_url` when set
    pub ncco: Option<Ncco>,
    pub answer_url: Option<String>,
    pub answer_method: Option<String>,
    pub event_url: Option<String>,
    pub event_method: Option<String>,
}

impl CreateCallOptions {
    pub fn new(to: Endpoint) -> Self {
        Self {
            to,
            from: None,
            ncco: None,
            answer_url: None,
            answer_method: None,
            event_url: None,
            event_method: None,
        }
    }

    pub fn with_from(mut self, from: Endpoint) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_ncco(mut self, ncco: Ncco) -> Self {
        self.ncco = Some(ncco);
        self
    }

    pub fn with_answer_url(mut self, url: impl Into<String>) -> Self {
        self.answer_url = Some(url.into());
        self
    }

    pub fn with_answer_method(mut self, method: impl Into<String>) -> Self {
        self.answer_method = Some(method.into());
        self
    }

    pub fn with_event_url(mut self, url: impl Into<String>) -> Self {
        self.event_url = Some(url.into());
        self
    }

    pub fn with_event_method(mut self, method: impl Into<String>) -> Self {
        self.event_method = Some(method.into());
        self
    }

    /// Resolve into a request body with `from` as the fallback caller.
    ///
    /// An inline NCCO replaces the answer URL. Callback methods default to
    /// POST when their URL is in play.
    pub fn into_request(self, from: Endpoint) -> CreateCallRequest {
        let (answer_url, answer_method) = if self.ncco.is_some() {
            (None, None)
        } else {
            (
                self.answer_url.map(|url| vec![url]),
                Some(self.answer_method.unwrap_or_else(|| DEFAULT_EVENT_METHOD.to_string())),
            )
        };

        let event_method = self
            .event_url
            .as_ref()
            .map(|_| self.event_method.unwrap_or_else(|| DEFAULT_EVENT_METHOD.to_string()));

        CreateCallRequest {
            to: vec![self.to],
            from: self.from.unwrap_or(from),
            ncco: self.ncco,
            answer_url,
            answer_method,
            event_url: self.event_url.map(|url| vec![url]),
            event_method,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Started,
    Ringing,
    Answered,
    Machine,
    Completed,
    Busy,
    Cancelled,
    Failed,
    Rejected,
    Timeout,
    Unanswered,
    #[serde(other)]
    Unknown,
}

impl CallStatus {
    /// The call is over and will not change again
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CallStatus::Completed
                | CallStatus::Busy
                | CallStatus::Cancelled
                | CallStatus::Failed
                | CallStatus::Rejected
                | CallStatus::Timeout
                | CallStatus::Unanswered
        )
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CallStatus::Started => "started",
            CallStatus::Ringing => "ringing",
            CallStatus::Answered => "answered",
            CallStatus::Machine => "machine",
            CallStatus::Completed => "completed",
            CallStatus::Busy => "busy",
            CallStatus::Cancelled => "cancelled",
            CallStatus::Failed => "failed",
            CallStatus::Rejected => "rejected",
            CallStatus::Timeout => "timeout",
            CallStatus::Unanswered => "unanswered",
            CallStatus::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallDirection {
    Inbound,
    Outbound,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateCallResponse {
    pub uuid: String,
    pub status: CallStatus,
    pub direction: CallDirection,
    pub conversation_uuid: String,
}

/// Result of `GET /v1/calls/{uuid}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CallInfo {
    pub uuid: String,
    pub status: CallStatus,
    pub direction: CallDirection,
    #[serde(default)]
    pub conversation_uuid: Option<String>,
    #[serde(default)]
    pub rate: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub to: Option<Endpoint>,
    #[serde(default)]
    pub from: Option<Endpoint>,
}

/// Where a transferred call continues
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferDestination {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ncco: Option<Ncco>,
}

impl TransferDestination {
    /// Fetch the next program from `url`
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            kind: "ncco",
            url: Some(vec![url.into()]),
            ncco: None,
        }
    }

    pub fn inline(ncco: Ncco) -> Self {
        Self {
            kind: "ncco",
            url: None,
            ncco: Some(ncco),
        }
    }
}

/// Body of `PUT /v1/calls/{uuid}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum CallModification {
    Hangup,
    Mute,
    Unmute,
    Earmuff,
    Unearmuff,
    Transfer { destination: TransferDestination },
}

impl CallModification {
    pub fn name(&self) -> &'static str {
        match self {
            CallModification::Hangup => "hangup",
            CallModification::Mute => "mute",
            CallModification::Unmute => "unmute",
            CallModification::Earmuff => "earmuff",
            CallModification::Unearmuff => "unearmuff",
            CallModification::Transfer { .. } => "transfer",
        }
    }
}

/// Body of `PUT /v1/calls/{uuid}/talk`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TalkIntoCall {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(rename = "loop")]
    pub loop_count: u32,
}

/// Body of `PUT /v1/calls/{uuid}/stream`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamIntoCall {
    pub stream_url: Vec<String>,
    #[serde(rename = "loop")]
    pub loop_count: u32,
}
