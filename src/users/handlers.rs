//! HTTP handlers for the account endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{
        header::{SET_COOKIE, USER_AGENT},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

use super::service::UserService;
use super::UserError;
use crate::pipeline::Identity;
use crate::security::context::X_JWT_TOKEN;
use crate::session::{Session, SessionStore};
use crate::token::TokenIssuer;

/// How a successful login hands the client its credential.
#[derive(Clone)]
pub enum LoginMode {
    Session {
        store: Arc<dyn SessionStore>,
        cookie_name: String,
        max_age: Duration,
    },
    Token {
        issuer: TokenIssuer,
    },
}

/// State shared by the account handlers.
#[derive(Clone)]
pub struct UsersState {
    pub service: Arc<UserService>,
    pub login: LoginMode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub email: String,
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        match self {
            UserError::DuplicateEmail => (StatusCode::CONFLICT, "Email already registered").into_response(),
            UserError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid email or password").into_response(),
            UserError::NotFound => StatusCode::NOT_FOUND.into_response(),
            e @ (UserError::Hash(_) | UserError::Task(_) | UserError::Session(_)) => {
                tracing::error!(error = %e, "Account operation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "System error").into_response()
            }
        }
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

pub async fn signup(State(state): State<UsersState>, Json(req): Json<SignUpRequest>) -> Response {
    if !looks_like_email(&req.email) {
        return (StatusCode::BAD_REQUEST, "Invalid email address").into_response();
    }
    if req.password.is_empty() || req.password != req.confirm_password {
        return (StatusCode::BAD_REQUEST, "Passwords do not match").into_response();
    }

    match state.service.signup(&req.email, &req.password).await {
        Ok(user) => {
            tracing::info!(uid = user.id, "User signed up");
            (StatusCode::OK, "Signed up").into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn login(State(state): State<UsersState>, headers: HeaderMap, Json(req): Json<LoginRequest>) -> Response {
    let user = match state.service.login(&req.email, &req.password).await {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    match &state.login {
        LoginMode::Session {
            store,
            cookie_name,
            max_age,
        } => {
            let mut session = Session::new();
            session.set_user_id(user.id);
            if let Err(e) = store.save(&session).await {
                return UserError::Session(e).into_response();
            }
            let cookie = session_cookie(cookie_name, session.id(), *max_age);
            tracing::info!(uid = user.id, "Session login");
            ([(SET_COOKIE, cookie)], "Logged in").into_response()
        }
        LoginMode::Token { issuer } => {
            let user_agent = headers
                .get(USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            let token = match issuer.issue(user.id, user_agent) {
                Ok(token) => token,
                Err(e) => {
                    tracing::error!(uid = user.id, error = %e, "Token issuance failed");
                    return (StatusCode::INTERNAL_SERVER_ERROR, "System error").into_response();
                }
            };
            match HeaderValue::from_str(&token) {
                Ok(value) => {
                    tracing::info!(uid = user.id, "Token login");
                    ([(X_JWT_TOKEN, value)], "Logged in").into_response()
                }
                Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "System error").into_response(),
            }
        }
    }
}

pub async fn logout(State(state): State<UsersState>, jar: CookieJar) -> Response {
    match &state.login {
        LoginMode::Session { store, cookie_name, .. } => {
            if let Some(cookie) = jar.get(cookie_name) {
                if let Err(e) = store.destroy(cookie.value()).await {
                    return UserError::Session(e).into_response();
                }
            }
            ([(SET_COOKIE, session_cookie(cookie_name, "", Duration::ZERO))], "Logged out").into_response()
        }
        // Tokens are not revocable; the client discards it.
        LoginMode::Token { .. } => (StatusCode::OK, "Logged out").into_response(),
    }
}

pub async fn profile(State(state): State<UsersState>, Extension(identity): Extension<Identity>) -> Response {
    match state.service.profile(identity.user_id()) {
        Ok(user) => Json(ProfileResponse {
            id: user.id,
            email: user.email,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

fn session_cookie(name: &str, value: &str, max_age: Duration) -> String {
    let secs = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
    Cookie::build((name.to_string(), value.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::seconds(secs))
        .build()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shape() {
        assert!(looks_like_email("u1@example.com"));
        assert!(!looks_like_email("u1example.com"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("u1@localhost"));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let header = session_cookie("ssid", "abc", Duration::from_secs(900));
        assert!(header.starts_with("ssid=abc"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("Path=/"));
        assert!(header.ends_with("Max-Age=900"));
    }

    #[test]
    fn test_cleared_cookie_expires_now() {
        let header = session_cookie("ssid", "", Duration::ZERO);
        let parsed = Cookie::parse(header).unwrap();
        assert_eq!(parsed.value(), "");
        assert_eq!(parsed.max_age(), Some(cookie::time::Duration::ZERO));
    }
}
