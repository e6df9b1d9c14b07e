//! Account endpoints that sit behind the pipeline.
//!
//! Thin glue: signup and login are allowlisted, logout and profile need an
//! authenticated identity. Storage is in memory.

pub mod handlers;
pub mod repository;
pub mod service;

use axum::{
    routing::{get, post},
    Router,
};

pub use handlers::{LoginMode, UsersState};
pub use repository::{User, UserRepository};
pub use service::UserService;

use crate::session::SessionStoreError;

/// Errors from account operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("user not found")]
    NotFound,
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Session(#[from] SessionStoreError),
}

/// Routes under `/user`.
pub fn routes(state: UsersState) -> Router {
    Router::new()
        .route("/user/signup", post(handlers::signup))
        .route("/user/login", post(handlers::login))
        .route("/user/logout", post(handlers::logout))
        .route("/user/profile", get(handlers::profile))
        .with_state(state)
}
