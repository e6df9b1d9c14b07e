//! Bearer token authentication with client binding and sliding refresh.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::header::AUTHORIZATION;
use axum::http::{request::Parts, HeaderMap, HeaderValue};
use chrono::TimeDelta;

use crate::clock::Clock;
use crate::observability::metrics;
use crate::pipeline::{Guard, GuardError, Identity, Refresh, RejectReason, Verdict};
use crate::security::allowlist::PathAllowlist;
use crate::security::context::{fingerprint, X_JWT_TOKEN};
use crate::token::{TokenIssuer, UserClaims};

/// Validates `Authorization: <scheme> <token>` and reissues tokens nearing expiry.
pub struct TokenAuthenticator {
    issuer: TokenIssuer,
    allowlist: Arc<PathAllowlist>,
    refresh_threshold: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl TokenAuthenticator {
    pub fn new(
        issuer: TokenIssuer,
        allowlist: Arc<PathAllowlist>,
        refresh_threshold: TimeDelta,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            issuer,
            allowlist,
            refresh_threshold,
            clock,
        }
    }

    fn validate(&self, parts: &Parts) -> Result<UserClaims, GuardError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(GuardError::Unauthenticated(RejectReason::MissingCredential))?;
        let token = bearer_token(header).ok_or(GuardError::Unauthenticated(RejectReason::MalformedCredential))?;

        let claims = self.issuer.keys().verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Token failed verification");
            GuardError::Unauthenticated(RejectReason::BadSignature)
        })?;

        if !claims.is_well_formed() {
            return Err(GuardError::Unauthenticated(RejectReason::InvalidClaims));
        }

        if claims.user_agent != fingerprint(parts) {
            // A valid signature from the wrong client: likely a stolen token.
            tracing::warn!(uid = claims.uid, "Token presented by a different client");
            return Err(GuardError::Unauthenticated(RejectReason::FingerprintMismatch));
        }

        if claims.is_expired_at(self.clock.now()) {
            return Err(GuardError::Unauthenticated(RejectReason::Expired));
        }

        Ok(claims)
    }

    fn refresh(&self, claims: &UserClaims, response_headers: &mut HeaderMap) -> Refresh {
        if claims.remaining_at(self.clock.now()) >= self.refresh_threshold {
            return Refresh::Skipped;
        }

        let token = match self.issuer.reissue(claims) {
            Ok((token, _)) => token,
            Err(e) => {
                tracing::warn!(uid = claims.uid, error = %e, "Token refresh failed");
                return Refresh::Failed;
            }
        };
        match HeaderValue::from_str(&token) {
            Ok(value) => {
                response_headers.insert(X_JWT_TOKEN, value);
                Refresh::Refreshed
            }
            Err(e) => {
                tracing::warn!(uid = claims.uid, error = %e, "Refreshed token is not a valid header value");
                Refresh::Failed
            }
        }
    }
}

/// Split `<scheme> <token>` into its token; anything but exactly two parts is malformed.
fn bearer_token(header: &HeaderValue) -> Option<&str> {
    let value = header.to_str().ok()?;
    let mut segs = value.split(' ');
    match (segs.next(), segs.next(), segs.next()) {
        (Some(_scheme), Some(token), None) => Some(token),
        _ => None,
    }
}

#[async_trait]
impl Guard for TokenAuthenticator {
    fn name(&self) -> &'static str {
        "token"
    }

    async fn check(&self, parts: &mut Parts, response_headers: &mut HeaderMap) -> Result<Verdict, GuardError> {
        if self.allowlist.contains(parts.uri.path()) {
            return Ok(Verdict::Allowlisted);
        }

        let claims = self.validate(parts)?;
        let refresh = self.refresh(&claims, response_headers);
        metrics::record_token_refresh(refresh);

        let identity = Identity(claims.uid);
        parts.extensions.insert(identity);
        Ok(Verdict::Authenticated { identity, refresh })
    }
}
