//! Payloads the Voice API posts to an application's event and input URLs

use serde::Deserialize;

use crate::types::CallStatus;

/// Call state change posted to the event URL
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CallEvent {
    pub uuid: String,
    #[serde(default)]
    pub conversation_uuid: Option<String>,
    pub status: CallStatus,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub rate: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
}

impl CallEvent {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Result of an `input` action
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InputResult {
    pub uuid: String,
    #[serde(default)]
    pub conversation_uuid: Option<String>,
    #[serde(default)]
    pub speech: Option<SpeechResult>,
    #[serde(default)]
    pub dtmf: Option<DtmfResult>,
    #[serde(default)]
    pub timed_out: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SpeechResult {
    #[serde(default)]
    pub timeout_reason: Option<String>,
    #[serde(default)]
    pub results: Vec<SpeechMatch>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpeechMatch {
    pub text: String,
    #[serde(default)]
    pub confidence: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DtmfResult {
    #[serde(default)]
    pub digits: Option<String>,
    #[serde(default)]
    pub timed_out: bool,
}

impl InputResult {
    /// First recognition candidate, the provider ranks best first
    pub fn best_transcript(&self) -> Option<&str> {
        self.speech
            .as_ref()
            .and_then(|s| s.results.first())
            .map(|m| m.text.as_str())
    }

    pub fn has_speech(&self) -> bool {
        self.best_transcript().is_some()
    }

    pub fn digits(&self) -> Option<&str> {
        self.dtmf
            .as_ref()
            .and_then(|d| d.digits.as_deref())
            .filter(|d| !d.is_empty())
    }

    pub fn has_dtmf(&self) -> bool {
        self.digits().is_some()
    }
}
