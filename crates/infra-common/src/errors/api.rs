//! Provider API errors
//!
//! Vonage reports failures as RFC 7807 problem documents. When the body is
//! not a problem document the raw text is preserved instead.

use serde::Deserialize;
use std::fmt;

/// Error returned by a Vonage REST endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: u16,
    pub error_type: Option<String>,
    pub title: Option<String>,
    pub detail: Option<String>,
    pub instance: Option<String>,
    pub raw: String,
}

#[derive(Deserialize)]
struct ProblemDocument {
    #[serde(rename = "type")]
    error_type: Option<String>,
    title: Option<String>,
    detail: Option<String>,
    instance: Option<String>,
}

impl ApiError {
    /// Build an error from a response status and body
    pub fn from_response(status: u16, body: impl Into<String>) -> Self {
        let raw = body.into();
        let problem = serde_json::from_str::<ProblemDocument>(&raw).ok();

        match problem {
            Some(p) => Self {
                status,
                error_type: p.error_type,
                title: p.title,
                detail: p.detail,
                instance: p.instance,
                raw,
            },
            None => Self {
                status,
                error_type: None,
                title: None,
                detail: None,
                instance: None,
                raw,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    pub fn is_forbidden(&self) -> bool {
        self.status == 403
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(detail) = self.detail.as_deref().filter(|d| !d.is_empty()) {
            let title = self.title.as_deref().unwrap_or("error");
            return write!(f, "vonage: {} - {} (status: {})", title, detail, self.status);
        }
        if !self.raw.is_empty() {
            return write!(f, "vonage: status {} - {}", self.status, self.raw);
        }
        write!(f, "vonage: status {}", self.status)
    }
}

impl std::error::Error for ApiError {}
