//! Session records and the store contract.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session attribute holding the numeric user id.
pub const USER_ID_KEY: &str = "userId";
/// Session attribute holding the last time the session was re-persisted.
pub const LAST_ACTIVITY_KEY: &str = "update_time";

/// Errors raised by a session store backend.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session value for '{key}' could not be encoded: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("session backend unavailable: {0}")]
    Backend(String),
}

/// Result of a typed read from a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionValue<T> {
    /// No value stored under the key.
    Absent,
    /// A value is stored but does not decode as `T`.
    Invalid,
    Present(T),
}

impl<T> SessionValue<T> {
    pub fn present(self) -> Option<T> {
        match self {
            SessionValue::Present(v) => Some(v),
            SessionValue::Absent | SessionValue::Invalid => None,
        }
    }
}

/// A server-side session: an opaque id plus loosely typed attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    id: String,
    values: HashMap<String, serde_json::Value>,
}

impl Session {
    /// Start an empty session with a fresh random id.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().simple().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Decode the value under `key` as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> SessionValue<T> {
        match self.values.get(key) {
            None => SessionValue::Absent,
            Some(raw) => match T::deserialize(raw) {
                Ok(v) => SessionValue::Present(v),
                Err(_) => SessionValue::Invalid,
            },
        }
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), SessionStoreError> {
        let raw = serde_json::to_value(value).map_err(|source| SessionStoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.values.insert(key.to_string(), raw);
        Ok(())
    }

    /// Store an already-encoded attribute verbatim.
    pub fn set_raw(&mut self, key: &str, value: serde_json::Value) {
        self.values.insert(key.to_string(), value);
    }

    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    pub fn user_id(&self) -> SessionValue<i64> {
        self.get(USER_ID_KEY)
    }

    pub fn set_user_id(&mut self, user_id: i64) {
        self.set_raw(USER_ID_KEY, serde_json::Value::from(user_id));
    }

    pub fn last_activity(&self) -> SessionValue<DateTime<Utc>> {
        self.get(LAST_ACTIVITY_KEY)
    }

    pub fn set_last_activity(&mut self, at: DateTime<Utc>) -> Result<(), SessionStoreError> {
        self.set(LAST_ACTIVITY_KEY, &at)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Persistence for sessions, keyed by session id.
///
/// Implementations must make `save` and `touch` atomic per id: concurrent
/// writes of the same session may interleave but never produce a torn
/// record, and `touch` never brings back a destroyed session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a live session, `None` when unknown or expired.
    async fn load(&self, id: &str) -> Result<Option<Session>, SessionStoreError>;

    /// Insert or replace a session and restart its idle lifetime.
    async fn save(&self, session: &Session) -> Result<(), SessionStoreError>;

    /// Replace a session only if it is still live, restarting its lifetime.
    /// Returns `false` when it was destroyed or expired in the meantime.
    async fn touch(&self, session: &Session) -> Result<bool, SessionStoreError>;

    async fn destroy(&self, id: &str) -> Result<(), SessionStoreError>;
}
