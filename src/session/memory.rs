//! In-memory session store with idle expiry.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::time::Instant;

use super::store::{Session, SessionStore, SessionStoreError};

struct Entry {
    session: Session,
    expires_at: Instant,
}

/// Sessions held in a concurrent map, each expiring `max_age` after its last save.
pub struct MemorySessionStore {
    sessions: DashMap<String, Entry>,
    max_age: Duration,
}

impl MemorySessionStore {
    pub fn new(max_age: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            max_age,
        }
    }

    /// Remove every expired session. Returns how many were dropped.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| entry.expires_at > now);
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Sweep expired sessions every `interval` until shutdown fires.
    pub async fn run_sweeper(&self, interval: Duration, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.sweep();
                    if removed > 0 {
                        tracing::debug!(removed, remaining = self.len(), "Swept expired sessions");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Session sweeper stopping");
                    break;
                }
            }
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &str) -> Result<Option<Session>, SessionStoreError> {
        let now = Instant::now();
        match self.sessions.get(id) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.session.clone())),
            Some(entry) => {
                drop(entry);
                self.sessions.remove_if(id, |_, e| e.expires_at <= now);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        self.sessions.insert(
            session.id().to_string(),
            Entry {
                session: session.clone(),
                expires_at: Instant::now() + self.max_age,
            },
        );
        Ok(())
    }

    async fn touch(&self, session: &Session) -> Result<bool, SessionStoreError> {
        let now = Instant::now();
        match self.sessions.get_mut(session.id()) {
            Some(mut entry) if entry.expires_at > now => {
                entry.session = session.clone();
                entry.expires_at = now + self.max_age;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn destroy(&self, id: &str) -> Result<(), SessionStoreError> {
        self.sessions.remove(id);
        Ok(())
    }
}
