//! Error types for the project collection

use thiserror::Error;

/// Failure of a local reorder
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReorderError {
    /// One of the indices is past the end of the collection
    #[error("Cannot move from {from} to {to} in a collection of {len}")]
    OutOfBounds { from: usize, to: usize, len: usize },

    /// No project with this id is loaded
    #[error("Unknown project: {0}")]
    UnknownProject(i64),
}

/// Type alias for reorder results
pub type ReorderResult<T> = Result<T, ReorderError>;
