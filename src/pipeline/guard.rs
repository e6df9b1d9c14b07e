//! The guard step contract and its outcomes.

use std::fmt;

use async_trait::async_trait;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::limiter::LimiterError;

/// Authenticated subject attached to the request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity(pub i64);

impl Identity {
    pub fn user_id(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Marker in the request extensions for synthetic load-test traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTest;

/// What happened to a credential refresh attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// Credential still fresh, nothing written.
    Skipped,
    /// A new credential was issued or the session re-persisted.
    Refreshed,
    /// Refresh was due but the write or signing failed. The request still passes.
    Failed,
}

/// Terminal-pass outcome of one guard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Within rate budget.
    Admitted,
    /// Carried the load-test marker; the limiter was not consulted.
    LoadTestBypass,
    /// Path needs no credential.
    Allowlisted,
    Authenticated { identity: Identity, refresh: Refresh },
}

/// Why a credential was refused. Logged, never sent to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingCredential,
    MalformedCredential,
    BadSignature,
    InvalidClaims,
    FingerprintMismatch,
    Expired,
    NoSessionIdentity,
    SessionBackend,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectReason::MissingCredential => "missing credential",
            RejectReason::MalformedCredential => "malformed credential",
            RejectReason::BadSignature => "bad signature",
            RejectReason::InvalidClaims => "invalid claims",
            RejectReason::FingerprintMismatch => "fingerprint mismatch",
            RejectReason::Expired => "expired",
            RejectReason::NoSessionIdentity => "no identity in session",
            RejectReason::SessionBackend => "session backend error",
        };
        f.write_str(s)
    }
}

/// Terminal-fail outcome of a guard step. Aborts the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(RejectReason),
    #[error("admission denied: rate budget exceeded")]
    AdmissionDenied,
    #[error("admission backend unavailable: {0}")]
    BackendUnavailable(#[source] LimiterError),
}

impl GuardError {
    pub fn status(&self) -> StatusCode {
        match self {
            GuardError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            GuardError::AdmissionDenied => StatusCode::TOO_MANY_REQUESTS,
            GuardError::BackendUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GuardError {
    /// Status only. Every credential failure looks the same to the client.
    fn into_response(self) -> Response {
        self.status().into_response()
    }
}

/// One step of the admission/authentication pipeline.
///
/// A guard inspects the request head, may attach extensions to it, and may
/// stage headers for the eventual response.
#[async_trait]
pub trait Guard: Send + Sync {
    /// Short name for logs and metrics.
    fn name(&self) -> &'static str;

    async fn check(&self, parts: &mut Parts, response_headers: &mut HeaderMap) -> Result<Verdict, GuardError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GuardError::Unauthenticated(RejectReason::Expired).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(GuardError::AdmissionDenied.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            GuardError::BackendUnavailable(LimiterError::Protocol("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_rejections_do_not_leak_reason() {
        let forged = GuardError::Unauthenticated(RejectReason::BadSignature).into_response();
        let stolen = GuardError::Unauthenticated(RejectReason::FingerprintMismatch).into_response();
        assert_eq!(forged.status(), stolen.status());

        let a = axum::body::to_bytes(forged.into_body(), usize::MAX).await.unwrap();
        let b = axum::body::to_bytes(stolen.into_body(), usize::MAX).await.unwrap();
        assert!(a.is_empty());
        assert_eq!(a, b);
    }
}
