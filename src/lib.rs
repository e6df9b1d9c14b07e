//! Request authentication and admission control for axum services.

pub mod clock;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod limiter;
pub mod observability;
pub mod pipeline;
pub mod security;
pub mod session;
pub mod token;
pub mod users;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pipeline::{Guard, GuardError, Identity, Pipeline, Verdict};
