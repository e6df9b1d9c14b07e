//! Security subsystem: the guards that run before any handler.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (AdmissionGuard: per-client budget, x-stress bypass)
//!     → session_auth.rs | token_auth.rs (exactly one, per config)
//!         → allowlist.rs (login/signup skip authentication)
//!     → Pass to handlers with Identity in extensions
//! ```
//!
//! # Design Decisions
//! - Fail closed: a limiter or session backend error rejects the request
//! - Refresh is best effort: a failed write or signature never rejects a
//!   request whose credential already validated
//! - One status per failure class, so clients cannot tell a forged token
//!   from an expired or stolen one

pub mod allowlist;
pub mod context;
pub mod rate_limit;
pub mod session_auth;
pub mod token_auth;

pub use allowlist::PathAllowlist;
pub use rate_limit::AdmissionGuard;
pub use session_auth::SessionAuthenticator;
pub use token_auth::TokenAuthenticator;
