//! # Messages-Core
//!
//! Messaging for the Vonage Messages API:
//!
//! - [`InboundMessageDecoder`]: normalizes inbound webhooks from either the
//!   Messages API or the legacy SMS API into one [`InboundMessage`]
//! - [`decode_status`]: delivery status webhooks
//! - [`webhook::WebhookHandler`]: axum routes that always acknowledge
//! - [`MessagesClient`]: outbound SMS, MMS and WhatsApp

pub mod client;
pub mod decoder;
pub mod error;
pub mod types;
pub mod webhook;

pub use client::MessagesClient;
pub use decoder::{
    Detection, FormatDetector, InboundMessageDecoder, LegacySmsFormat, MessagesApiFormat,
    decode_inbound, decode_status,
};
pub use error::{MessagesError, Result};
pub use types::{
    Channel, InboundMessage, LegacySms, MediaKind, MediaRef, MessageStatus, MessageType,
    SendRequest, SendResponse, Status, WireFormat,
};
pub use webhook::WebhookHandler;
