//! Request metadata the guards key on.

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;

/// Header marking synthetic load-test traffic.
pub const X_STRESS: &str = "x-stress";
/// Response header carrying a freshly issued token.
pub const X_JWT_TOKEN: &str = "x-jwt-token";

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const UNKNOWN_CLIENT: &str = "unknown";

/// Network identity of the client, used to key rate limits.
///
/// Prefers the first `X-Forwarded-For` hop when `trust_forwarded_for` is set,
/// then the socket peer address.
pub fn client_address(parts: &Parts, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = parts
            .headers
            .get(X_FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Client fingerprint a token is bound to. Missing header reads as empty.
pub fn fingerprint(parts: &Parts) -> &str {
    parts
        .headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Whether the request asked to bypass the rate limiter.
pub fn is_load_test(parts: &Parts) -> bool {
    parts
        .headers
        .get(X_STRESS)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "true")
}
