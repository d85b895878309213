//! Session client for the task-management backend
//!
//! Holds the signed-in user and drives login, registration and profile
//! operations through the shared request gateway.

pub mod models;
pub mod session;
pub mod store;
pub mod validation;

pub use session::{Session, SessionHandle, SessionState};
pub use store::{SessionAction, SessionStore};
