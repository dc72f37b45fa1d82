//! Core types for video sessions and join tokens

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A cached video session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: String,
    /// Application-defined secondary key, e.g. a location identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Fabricated locally because the provider could not be reached
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_synthetic: bool,
}

impl SessionRecord {
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Has an id and has not expired
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.session_id.is_empty() && !self.is_expired_at(now)
    }
}

/// Session returned by the remote creation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedSession {
    pub session_id: String,
    pub project_id: Option<String>,
}

/// How media streams are routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaMode {
    /// Peer-to-peer where possible
    Relayed,
    /// Through the provider's media servers
    Routed,
}

impl MediaMode {
    /// Value of the `p2p.preference` form field
    pub fn p2p_preference(self) -> &'static str {
        match self {
            MediaMode::Relayed => "enabled",
            MediaMode::Routed => "disabled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveMode {
    Manual,
    Always,
}

impl ArchiveMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ArchiveMode::Manual => "manual",
            ArchiveMode::Always => "always",
        }
    }
}

/// Options for remote session creation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateSessionOptions {
    /// Location hint (an IP address)
    pub location: Option<String>,
    pub media_mode: Option<MediaMode>,
    pub archive_mode: Option<ArchiveMode>,
}

impl CreateSessionOptions {
    /// Form fields for the session create request; empty when nothing is set
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(location) = self.location.as_ref().filter(|l| !l.is_empty()) {
            fields.push(("location", location.clone()));
        }
        if let Some(mode) = self.media_mode {
            fields.push(("p2p.preference", mode.p2p_preference().to_string()));
        }
        if let Some(mode) = self.archive_mode {
            fields.push(("archiveMode", mode.as_str().to_string()));
        }
        fields
    }
}

/// Participant role in a video session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Can publish and subscribe
    #[default]
    Publisher,
    /// Can only subscribe
    Subscriber,
    /// Full control over the session
    Moderator,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Publisher => "publisher",
            Role::Subscriber => "subscriber",
            Role::Moderator => "moderator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for a session-join token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenOptions {
    pub role: Role,
    /// Defaults to 24 hours from generation
    pub expire_time: Option<DateTime<Utc>>,
    /// Connection data visible to other participants
    pub data: Option<String>,
    pub initial_layout_class_list: Vec<String>,
}

impl Default for TokenOptions {
    fn default() -> Self {
        Self {
            role: Role::Publisher,
            expire_time: None,
            data: None,
            initial_layout_class_list: Vec::new(),
        }
    }
}

/// A token a client uses to join a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoToken {
    pub token: String,
    pub session_id: String,
    /// Application id the client connects with
    pub api_key: String,
    /// Unix seconds
    pub expires_at: i64,
}
