//! # Video-Core
//!
//! Session management for the Vonage Video API:
//!
//! - [`SessionRegistry`]: concurrency-safe cache of sessions with absolute
//!   expiry, looked up by session id or topic key
//! - [`SessionCreator`] / [`RestSessionCreator`]: the remote creation call
//! - [`VideoTokenGenerator`]: role-scoped session-join tokens
//! - [`VideoClient`]: the pieces above wired together
//!
//! The registry owns no timers. Call [`SessionRegistry::sweep`] from your
//! own scheduler to evict expired records.

pub mod client;
pub mod creator;
pub mod error;
pub mod registry;
pub mod token;
pub mod types;

pub use client::VideoClient;
pub use creator::{RestSessionCreator, SessionCreator, VIDEO_BASE_URL};
pub use error::{Result, SessionError};
pub use registry::{FallbackPolicy, RegistryConfig, SessionRegistry};
pub use token::{VideoTokenBuilder, VideoTokenGenerator};
pub use types::{
    ArchiveMode, CreateSessionOptions, CreatedSession, MediaMode, Role, SessionRecord,
    TokenOptions, VideoToken,
};
