//! # Vonage
//!
//! One entry point for the Vonage Voice, Messages and Video APIs.
//!
//! ```no_run
//! use std::path::Path;
//! use vonage::{Client, VonageConfig};
//!
//! # async fn run() -> vonage::Result<()> {
//! let config = VonageConfig::load(Some(Path::new("vonage.toml")))?;
//! config.init_logging("reservations")?;
//!
//! let client = Client::from_config(&config)?;
//! client.messages()?.send_sms("819012345678", "Your table is ready").await?;
//! # Ok(())
//! # }
//! ```
//!
//! The building blocks are re-exported as [`auth`], [`video`], [`voice`]
//! and [`messages`].

pub mod client;
pub mod config;
pub mod error;

pub use client::Client;
pub use config::{HttpSettings, VideoSettings, VonageConfig};
pub use error::{Error, Result};

pub use vonage_auth_core as auth;
pub use vonage_infra_common as infra;
pub use vonage_messages_core as messages;
pub use vonage_video_core as video;
pub use vonage_voice_core as voice;

pub use vonage_auth_core::{AuthError, Credentials, SigningKey, TokenMinter, parse_private_key};
pub use vonage_messages_core::{InboundMessage, InboundMessageDecoder, MessagesError, WebhookHandler};
pub use vonage_video_core::{FallbackPolicy, SessionError, SessionRecord, SessionRegistry};
pub use vonage_voice_core::{Ncco, NccoBuilder, VoiceError};
