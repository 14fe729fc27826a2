//! Client session manager for the Balloon mobile shell.
//!
//! Owns the device-local authentication state: a durable copy of the bearer
//! token and the cached user profile, an API client for the auth endpoints,
//! and a reactive `authenticated` projection the presentation layer
//! subscribes to.

pub mod api;
pub mod state;
pub mod storage;

pub use api::{ApiClient, ApiError};
pub use state::session::{AuthOutcome, SessionManager, SessionState};
pub use storage::{FileStore, MemoryStore, SessionStore};
