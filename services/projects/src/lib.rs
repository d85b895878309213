//! Project collection client
//!
//! Keeps an in-memory, locally reorderable mirror of the backend project
//! list together with the users that can join a project.

pub mod collection;
pub mod controller;
pub mod error;
pub mod models;

pub use collection::{ProjectCollection, SortKey};
pub use controller::{ProjectAction, ProjectController};
pub use error::{ReorderError, ReorderResult};
