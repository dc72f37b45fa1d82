//! In-process session cache with absolute expiration
//!
//! Records are keyed by session id and can also be found by topic key. All
//! state sits behind one reader/writer lock that is never held while the
//! remote creator runs.
//!
//! # Concurrent creators
//!
//! The lookup-then-create path is not atomic. Two callers asking for the same
//! unseen topic at the same time can both miss the cache, both call the
//! creator and both insert. Topic lookups then resolve to whichever record
//! was inserted last; the other stays reachable through [`SessionRegistry::get`]
//! until it expires. The cache only exists to avoid redundant remote calls,
//! so this is tolerated.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::creator::SessionCreator;
use crate::types::{CreateSessionOptions, SessionRecord};
use crate::{Result, SessionError};

/// Prefix of locally fabricated session ids
pub const SYNTHETIC_SESSION_PREFIX: &str = "mock";

/// Default lifetime of a cached session
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// What to do when the remote creator fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Substitute a synthetic session and report success
    #[default]
    Synthetic,
    /// Surface the creator's error
    FailFast,
}

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Used to derive synthetic session ids
    pub application_id: String,
    pub session_ttl: Duration,
    pub fallback: FallbackPolicy,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            application_id: String::new(),
            session_ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
            fallback: FallbackPolicy::Synthetic,
        }
    }
}

struct Entry {
    record: SessionRecord,
    /// Insertion order, resolves topic lookups to the newest write
    seq: u64,
}

pub struct SessionRegistry {
    config: RegistryConfig,
    sessions: RwLock<HashMap<String, Entry>>,
    next_seq: AtomicU64,
    last_synthetic_suffix: AtomicI64,
}

impl SessionRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
            last_synthetic_suffix: AtomicI64::new(0),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Return the valid cached session for `topic_key`, creating one if needed.
    ///
    /// A cache hit never calls `creator`. On a miss the creator runs with the
    /// lock released. If it fails, the [`FallbackPolicy`] decides between a
    /// synthetic record (returned as success) and the creator's error.
    pub async fn create_for_topic<C>(
        &self,
        topic_key: &str,
        creator: &C,
        options: &CreateSessionOptions,
    ) -> Result<SessionRecord>
    where
        C: SessionCreator + ?Sized,
    {
        if let Some(record) = self.find_by_topic(topic_key) {
            debug!(session_id = %record.session_id, topic = %topic_key, "Session cache hit");
            return Ok(record);
        }

        self.create_inner(Some(topic_key), creator, options).await
    }

    /// Create a session with no topic; always calls `creator`
    pub async fn create<C>(&self, creator: &C, options: &CreateSessionOptions) -> Result<SessionRecord>
    where
        C: SessionCreator + ?Sized,
    {
        self.create_inner(None, creator, options).await
    }

    async fn create_inner<C>(
        &self,
        topic_key: Option<&str>,
        creator: &C,
        options: &CreateSessionOptions,
    ) -> Result<SessionRecord>
    where
        C: SessionCreator + ?Sized,
    {
        match creator.create_session(options).await {
            Ok(created) => {
                let now = Utc::now();
                let record = SessionRecord {
                    session_id: created.session_id,
                    topic_key: topic_key.map(str::to_string),
                    project_id: created.project_id,
                    created_at: now,
                    expires_at: now + self.config.session_ttl,
                    is_synthetic: false,
                };
                self.insert(record.clone());

                info!(
                    session_id = %record.session_id,
                    topic = topic_key.unwrap_or(""),
                    "Created video session"
                );
                Ok(record)
            }
            Err(e) => match self.config.fallback {
                FallbackPolicy::Synthetic => {
                    warn!(error = %e, topic = topic_key.unwrap_or(""), "Failed to create session via API, using synthetic session");
                    Ok(self.create_synthetic(topic_key))
                }
                FallbackPolicy::FailFast => Err(e),
            },
        }
    }

    /// Fabricate, cache and return a local session
    pub fn create_synthetic(&self, topic_key: Option<&str>) -> SessionRecord {
        let now = Utc::now();
        let record = SessionRecord {
            session_id: self.synthetic_session_id(now),
            topic_key: topic_key.map(str::to_string),
            project_id: None,
            created_at: now,
            expires_at: now + self.config.session_ttl,
            is_synthetic: true,
        };
        self.insert(record.clone());

        info!(
            session_id = %record.session_id,
            topic = topic_key.unwrap_or(""),
            "Created synthetic video session"
        );
        record
    }

    /// `mock_<app id prefix>_<nanos>`, with the suffix strictly increasing
    fn synthetic_session_id(&self, now: DateTime<Utc>) -> String {
        let app_prefix: String = if self.config.application_id.chars().count() >= 8 {
            self.config.application_id.chars().take(8).collect()
        } else {
            SYNTHETIC_SESSION_PREFIX.to_string()
        };

        let nanos = now.timestamp_nanos_opt().unwrap_or_else(|| now.timestamp_micros() * 1000);
        let previous = self
            .last_synthetic_suffix
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(nanos.max(last + 1)))
            .unwrap_or(nanos);
        let suffix = nanos.max(previous + 1);

        format!("{}_{}_{}", SYNTHETIC_SESSION_PREFIX, app_prefix, suffix)
    }

    /// Cache a record under its session id, replacing any previous one
    pub fn insert(&self, record: SessionRecord) {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let mut sessions = self.sessions.write();
        sessions.insert(record.session_id.clone(), Entry { record, seq });
    }

    /// Newest valid record stamped with `topic_key`
    pub fn find_by_topic(&self, topic_key: &str) -> Option<SessionRecord> {
        let now = Utc::now();
        let sessions = self.sessions.read();
        sessions
            .values()
            .filter(|e| e.record.topic_key.as_deref() == Some(topic_key) && e.record.is_valid_at(now))
            .max_by_key(|e| e.seq)
            .map(|e| e.record.clone())
    }

    /// Look up by id, telling "never existed" apart from "expired"
    pub fn get(&self, session_id: &str) -> Result<SessionRecord> {
        let sessions = self.sessions.read();
        let entry = sessions
            .get(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;

        if entry.record.is_expired() {
            return Err(SessionError::Expired(session_id.to_string()));
        }
        Ok(entry.record.clone())
    }

    /// Drop every record past its expiry; returns how many were removed
    pub fn sweep(&self) -> usize {
        self.sweep_at(Utc::now())
    }

    pub fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, e| !e.record.is_expired_at(now));
        let removed = before - sessions.len();

        if removed > 0 {
            debug!(count = removed, "Cleaned up expired video sessions");
        }
        removed
    }

    /// Number of cached records, expired ones included
    pub fn size(&self) -> usize {
        self.sessions.read().len()
    }
}
