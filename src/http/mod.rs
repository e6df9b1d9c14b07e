//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, trace)
//!     → pipeline::enforce (admission → authentication)
//!     → users handlers, or 404 fallback
//!     → staged headers (x-jwt-token) merged into the response
//!     → Send to client
//! ```

pub mod server;

pub use server::{HttpServer, ServerError};
