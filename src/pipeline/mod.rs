//! Request admission and authentication pipeline.
//!
//! # Data Flow
//! ```text
//! Request head (http::request::Parts)
//!     → AdmissionGuard        (rate budget, load-test bypass)
//!     → SessionAuthenticator | TokenAuthenticator   (exactly one)
//!     → Identity in extensions, staged response headers
//!     → business handler
//!
//! Any step returning GuardError:
//!     → status-only response, later steps and the handler never run
//! ```
//!
//! # Design Decisions
//! - Order is an explicit list evaluated by `Pipeline::run`, not a side
//!   effect of layer registration
//! - Guards see only the request head, never the body
//! - Refresh failures are a pass (`Refresh::Failed`), not an error

pub mod guard;
pub mod runner;

pub use guard::{Guard, GuardError, Identity, LoadTest, Refresh, RejectReason, Verdict};
pub use runner::{enforce, Pipeline, PipelineBuilder};
