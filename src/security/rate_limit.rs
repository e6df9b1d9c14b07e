//! Admission control: per-client rate limiting ahead of authentication.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{request::Parts, HeaderMap};

use crate::limiter::RateLimiter;
use crate::observability::metrics;
use crate::pipeline::{Guard, GuardError, LoadTest, Verdict};
use crate::security::context::{client_address, is_load_test};

/// Default namespace for limiter keys.
pub const DEFAULT_PREFIX: &str = "ip-limiter";

/// Wraps a [`RateLimiter`] with the load-test bypass and fail-closed policy.
pub struct AdmissionGuard {
    limiter: Arc<dyn RateLimiter>,
    prefix: String,
    trust_forwarded_for: bool,
}

impl AdmissionGuard {
    pub fn builder(limiter: Arc<dyn RateLimiter>) -> AdmissionGuardBuilder {
        AdmissionGuardBuilder {
            limiter,
            prefix: DEFAULT_PREFIX.to_string(),
            trust_forwarded_for: false,
        }
    }

    fn key(&self, parts: &Parts) -> String {
        format!("{}:{}", self.prefix, client_address(parts, self.trust_forwarded_for))
    }
}

pub struct AdmissionGuardBuilder {
    limiter: Arc<dyn RateLimiter>,
    prefix: String,
    trust_forwarded_for: bool,
}

impl AdmissionGuardBuilder {
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn trust_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }

    pub fn build(self) -> AdmissionGuard {
        AdmissionGuard {
            limiter: self.limiter,
            prefix: self.prefix,
            trust_forwarded_for: self.trust_forwarded_for,
        }
    }
}

#[async_trait]
impl Guard for AdmissionGuard {
    fn name(&self) -> &'static str {
        "admission"
    }

    async fn check(&self, parts: &mut Parts, _response_headers: &mut HeaderMap) -> Result<Verdict, GuardError> {
        if is_load_test(parts) {
            parts.extensions.insert(LoadTest);
            metrics::record_load_test();
            return Ok(Verdict::LoadTestBypass);
        }

        let key = self.key(parts);
        match self.limiter.limit(&key).await {
            Ok(false) => {
                metrics::record_admission("admitted");
                Ok(Verdict::Admitted)
            }
            Ok(true) => {
                tracing::warn!(client = %key, "Rate limit exceeded");
                metrics::record_admission("limited");
                Err(GuardError::AdmissionDenied)
            }
            Err(e) => {
                // Fail closed: an unreachable limiter must not become a bypass.
                tracing::error!(client = %key, error = %e, "Rate limiter unavailable");
                metrics::record_admission("backend_error");
                Err(GuardError::BackendUnavailable(e))
            }
        }
    }
}
