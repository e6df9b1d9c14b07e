//! Server-side session storage.
//!
//! # Data Flow
//! ```text
//! Cookie "ssid=<id>"
//!     → SessionStore::load(id)      (store.rs contract, memory.rs impl)
//!     → Session::get::<T>(key)      (typed decode: Absent | Invalid | Present)
//!     → SessionAuthenticator decides / refreshes
//!     → SessionStore::save(session) (restarts idle lifetime)
//! ```
//!
//! # Design Decisions
//! - Attributes are stored as JSON values and decoded at the read site into
//!   the caller's type; a mismatched type is a value, never a panic
//! - Only the numeric user id is stored, not a cached profile
//! - Expiry is the store's job; the authenticator never deletes sessions

pub mod memory;
pub mod store;

pub use memory::MemorySessionStore;
pub use store::{Session, SessionStore, SessionStoreError, SessionValue};
