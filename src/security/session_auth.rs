//! Session-cookie authentication with sliding activity refresh.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{request::Parts, HeaderMap};
use axum_extra::extract::cookie::CookieJar;
use chrono::TimeDelta;

use crate::clock::Clock;
use crate::observability::metrics;
use crate::pipeline::{Guard, GuardError, Identity, Refresh, RejectReason, Verdict};
use crate::security::allowlist::PathAllowlist;
use crate::session::{Session, SessionStore, SessionValue};

/// Resolves the session cookie to a user id and keeps the session warm.
pub struct SessionAuthenticator {
    store: Arc<dyn SessionStore>,
    allowlist: Arc<PathAllowlist>,
    cookie_name: String,
    refresh_threshold: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl SessionAuthenticator {
    pub fn new(
        store: Arc<dyn SessionStore>,
        allowlist: Arc<PathAllowlist>,
        cookie_name: impl Into<String>,
        refresh_threshold: TimeDelta,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            allowlist,
            cookie_name: cookie_name.into(),
            refresh_threshold,
            clock,
        }
    }

    async fn load_session(&self, parts: &Parts) -> Result<Session, GuardError> {
        let jar = CookieJar::from_headers(&parts.headers);
        let id = jar
            .get(&self.cookie_name)
            .map(|c| c.value().to_string())
            .ok_or(GuardError::Unauthenticated(RejectReason::MissingCredential))?;

        match self.store.load(&id).await {
            Ok(Some(session)) => Ok(session),
            Ok(None) => Err(GuardError::Unauthenticated(RejectReason::NoSessionIdentity)),
            Err(e) => {
                tracing::error!(error = %e, "Session store load failed");
                Err(GuardError::Unauthenticated(RejectReason::SessionBackend))
            }
        }
    }

    /// Re-persist the session when its last activity is missing, unreadable,
    /// or older than the threshold.
    async fn touch(&self, mut session: Session) -> Refresh {
        let now = self.clock.now();
        let due = match session.last_activity() {
            SessionValue::Present(last) => now - last > self.refresh_threshold,
            SessionValue::Absent | SessionValue::Invalid => true,
        };
        if !due {
            return Refresh::Skipped;
        }

        if let Err(e) = session.set_last_activity(now) {
            tracing::warn!(error = %e, "Failed to stamp session activity");
            return Refresh::Failed;
        }
        match self.store.touch(&session).await {
            Ok(true) => Refresh::Refreshed,
            Ok(false) => {
                tracing::debug!("Session ended before refresh; not re-created");
                Refresh::Failed
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session refresh not persisted");
                Refresh::Failed
            }
        }
    }
}

#[async_trait]
impl Guard for SessionAuthenticator {
    fn name(&self) -> &'static str {
        "session"
    }

    async fn check(&self, parts: &mut Parts, _response_headers: &mut HeaderMap) -> Result<Verdict, GuardError> {
        if self.allowlist.contains(parts.uri.path()) {
            return Ok(Verdict::Allowlisted);
        }

        let session = self.load_session(parts).await?;
        let identity = match session.user_id() {
            SessionValue::Present(uid) => Identity(uid),
            SessionValue::Absent | SessionValue::Invalid => {
                return Err(GuardError::Unauthenticated(RejectReason::NoSessionIdentity));
            }
        };

        let refresh = self.touch(session).await;
        metrics::record_session_refresh(refresh);

        parts.extensions.insert(identity);
        Ok(Verdict::Authenticated { identity, refresh })
    }
}
