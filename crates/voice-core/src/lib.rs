//! # Voice-Core
//!
//! Call control for the Vonage Voice API.
//!
//! - [`ncco`]: typed call-program actions and the fluent [`NccoBuilder`]
//! - [`patterns`]: prebuilt speak-then-listen programs
//! - [`VoiceClient`]: create, inspect and modify calls
//! - [`events`]: payloads posted back to the application

pub mod client;
pub mod error;
pub mod events;
pub mod ncco;
pub mod patterns;
pub mod types;

pub use client::{REST_BASE_URL, VoiceClient};
pub use error::{Result, VoiceError};
pub use events::{CallEvent, InputResult};
pub use ncco::{Action, InputType, Ncco, NccoBuilder, RecordFormat};
pub use types::{
    CallDirection, CallInfo, CallModification, CallStatus, CreateCallOptions, CreateCallRequest,
    CreateCallResponse, Endpoint, EndpointType, TalkIntoCall, TransferDestination,
};
