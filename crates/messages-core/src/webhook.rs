//! Webhook endpoints for inbound messages and delivery status
//!
//! The provider treats any non-2xx answer as a failed delivery and retries,
//! so both endpoints answer `200 OK` no matter what happens to the payload.
//! Decode and handler failures are logged.
//!
//! ```no_run
//! use vonage_messages_core::webhook::WebhookHandler;
//!
//! # async fn serve() -> std::io::Result<()> {
//! let app = WebhookHandler::new()
//!     .on_inbound(|msg| async move {
//!         println!("{} says {:?}", msg.from, msg.text);
//!         Ok(())
//!     })
//!     .router();
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{error, warn};

use crate::decoder::{InboundMessageDecoder, decode_status};
use crate::types::{InboundMessage, LegacySms, MessageStatus, WireFormat};

/// Error type handlers may return; it is only logged
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;
pub type HandlerResult = std::result::Result<(), HandlerError>;

type Callback<T> = Arc<dyn Fn(T) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

fn boxed<T, F, Fut>(handler: F) -> Callback<T>
where
    T: 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |value: T| handler(value).boxed())
}

/// Callbacks for the webhook endpoints
#[derive(Default)]
pub struct WebhookHandler {
    decoder: InboundMessageDecoder,
    on_inbound: Option<Callback<InboundMessage>>,
    on_status: Option<Callback<MessageStatus>>,
    on_legacy_sms: Option<Callback<LegacySms>>,
}

impl WebhookHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a decoder with extra format detectors
    pub fn with_decoder(mut self, decoder: InboundMessageDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// Called for every recognized inbound message, legacy SMS included
    /// unless [`on_legacy_sms`](Self::on_legacy_sms) is set
    pub fn on_inbound<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(InboundMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.on_inbound = Some(boxed(handler));
        self
    }

    pub fn on_status<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(MessageStatus) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.on_status = Some(boxed(handler));
        self
    }

    /// Receive legacy SMS payloads in their original shape
    pub fn on_legacy_sms<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(LegacySms) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.on_legacy_sms = Some(boxed(handler));
        self
    }

    /// `POST /inbound` and `POST /status`
    pub fn router(self) -> Router {
        Router::new()
            .route("/inbound", post(inbound))
            .route("/status", post(status))
            .with_state(Arc::new(self))
    }

    /// Process one inbound payload
    pub async fn handle_inbound(&self, body: &[u8]) {
        let message = match self.decoder.decode(body) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, body = %String::from_utf8_lossy(body), "Unknown inbound webhook format");
                return;
            }
        };

        if message.format == WireFormat::LegacySms {
            if let Some(handler) = &self.on_legacy_sms {
                match serde_json::from_slice::<LegacySms>(body) {
                    Ok(sms) => {
                        let message_id = sms.message_id.clone();
                        if let Err(e) = handler(sms).await {
                            error!(error = %e, message_id = %message_id, "Error handling legacy inbound SMS");
                        }
                    }
                    Err(e) => error!(error = %e, "Failed to re-read legacy inbound SMS"),
                }
                return;
            }
        }

        if let Some(handler) = &self.on_inbound {
            let message_id = message.message_id.clone();
            if let Err(e) = handler(message).await {
                error!(error = %e, message_id = %message_id, "Error handling inbound message");
            }
        }
    }

    /// Process one status payload
    pub async fn handle_status(&self, body: &[u8]) {
        let update = match decode_status(body) {
            Ok(update) => update,
            Err(e) => {
                warn!(error = %e, body = %String::from_utf8_lossy(body), "Failed to parse status webhook");
                return;
            }
        };

        if let Some(handler) = &self.on_status {
            let message_id = update.message_uuid.clone();
            let state = update.status.clone();
            if let Err(e) = handler(update).await {
                error!(error = %e, message_id = %message_id, status = %state, "Error handling message status");
            }
        }
    }
}

async fn inbound(State(handler): State<Arc<WebhookHandler>>, body: Bytes) -> StatusCode {
    handler.handle_inbound(&body).await;
    StatusCode::OK
}

async fn status(State(handler): State<Arc<WebhookHandler>>, body: Bytes) -> StatusCode {
    handler.handle_status(&body).await;
    StatusCode::OK
}
