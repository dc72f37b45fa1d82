//! Message, status and send-request types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// String-valued provider enum that keeps values it does not recognize
macro_rules! open_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $wire,)+
                    $name::Other(value) => value.as_str(),
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                let known = match value.as_str() {
                    $($wire => Some($name::$variant),)+
                    _ => None,
                };
                known.unwrap_or_else(|| $name::Other(value))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::from(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

open_enum! {
    /// Messaging channel
    Channel {
        Sms => "sms",
        Mms => "mms",
        Whatsapp => "whatsapp",
        Viber => "viber_service",
        Messenger => "messenger",
    }
}

open_enum! {
    /// Kind of message content
    MessageType {
        Text => "text",
        Image => "image",
        Audio => "audio",
        Video => "video",
        File => "file",
        Custom => "custom",
        Template => "template",
    }
}

open_enum! {
    /// Delivery state reported by a status webhook
    Status {
        Submitted => "submitted",
        Delivered => "delivered",
        Read => "read",
        Rejected => "rejected",
        Failed => "failed",
        Undeliverable => "undeliverable",
    }
}

impl Status {
    /// Reached the handset (read implies delivered)
    pub fn is_delivered(&self) -> bool {
        matches!(self, Status::Delivered | Status::Read)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Status::Rejected | Status::Failed | Status::Undeliverable)
    }

    /// No further status updates are expected
    pub fn is_terminal(&self) -> bool {
        self.is_delivered() || self.is_failed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
    File,
}

impl MediaKind {
    pub fn message_type(self) -> MessageType {
        match self {
            MediaKind::Image => MessageType::Image,
            MediaKind::Audio => MessageType::Audio,
            MediaKind::Video => MessageType::Video,
            MediaKind::File => MessageType::File,
        }
    }
}

/// Attachment carried by an inbound message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Wire format an inbound message arrived in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// Messages API webhook
    Messages,
    /// Older SMS API webhook
    LegacySms,
}

/// An inbound message normalized from whichever format carried it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub message_id: String,
    pub from: String,
    pub to: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub channel: Channel,
    pub content_type: MessageType,
    pub text: Option<String>,
    pub media: Option<MediaRef>,
    pub format: WireFormat,
}

/// Legacy inbound SMS webhook payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LegacySms {
    #[serde(default)]
    pub msisdn: String,
    #[serde(default)]
    pub to: String,
    #[serde(rename = "messageId", default)]
    pub message_id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(rename = "message-timestamp", default)]
    pub message_timestamp: Option<String>,
    #[serde(rename = "type", default)]
    pub sms_type: Option<String>,
    #[serde(default)]
    pub keyword: Option<String>,
}

/// Status webhook payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageStatus {
    pub message_uuid: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StatusError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusError {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// The provider sends a numeric code or a short phrase here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

/// Media attached to an outbound message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaContent {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WhatsAppOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<WhatsAppTemplate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhatsAppTemplate {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<WhatsAppTemplateParam>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhatsAppTemplateParam {
    pub default: String,
}

/// Body of `POST /v1/messages`.
///
/// Built with one of the content constructors and refined with `with_*`.
/// A missing `from` is filled in by the client from its configured number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub to: String,
    pub message_type: MessageType,
    pub channel: Channel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<MediaContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<MediaContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<MediaContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<MediaContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<WhatsAppOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_version: Option<String>,
}

impl SendRequest {
    fn empty(channel: Channel, to: impl Into<String>, message_type: MessageType) -> Self {
        Self {
            from: None,
            to: to.into(),
            message_type,
            channel,
            text: None,
            image: None,
            audio: None,
            video: None,
            file: None,
            whatsapp: None,
            client_ref: None,
            webhook_url: None,
            webhook_version: None,
        }
    }

    pub fn text(channel: Channel, to: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::empty(channel, to, MessageType::Text)
        }
    }

    pub fn image(channel: Channel, to: impl Into<String>, url: impl Into<String>, caption: Option<String>) -> Self {
        Self {
            image: Some(MediaContent {
                url: url.into(),
                caption,
                name: None,
            }),
            ..Self::empty(channel, to, MessageType::Image)
        }
    }

    pub fn audio(channel: Channel, to: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            audio: Some(MediaContent {
                url: url.into(),
                caption: None,
                name: None,
            }),
            ..Self::empty(channel, to, MessageType::Audio)
        }
    }

    pub fn video(channel: Channel, to: impl Into<String>, url: impl Into<String>, caption: Option<String>) -> Self {
        Self {
            video: Some(MediaContent {
                url: url.into(),
                caption,
                name: None,
            }),
            ..Self::empty(channel, to, MessageType::Video)
        }
    }

    pub fn file(channel: Channel, to: impl Into<String>, url: impl Into<String>, name: Option<String>) -> Self {
        Self {
            file: Some(MediaContent {
                url: url.into(),
                caption: None,
                name,
            }),
            ..Self::empty(channel, to, MessageType::File)
        }
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Reference echoed back in status webhooks
    pub fn with_client_ref(mut self, client_ref: impl Into<String>) -> Self {
        self.client_ref = Some(client_ref.into());
        self
    }

    /// Status webhook override for this message only
    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    pub fn with_webhook_version(mut self, version: impl Into<String>) -> Self {
        self.webhook_version = Some(version.into());
        self
    }

    pub fn with_whatsapp(mut self, options: WhatsAppOptions) -> Self {
        self.whatsapp = Some(options);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SendResponse {
    pub message_uuid: String,
}
