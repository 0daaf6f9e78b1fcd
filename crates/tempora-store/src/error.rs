//! Error types for store operations.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by [`Store`](crate::Store) and [`Graph`](crate::Graph)
/// implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The named graph does not exist.
    #[error("graph {0:?} not found")]
    GraphNotFound(String),

    /// A graph with the given name already exists.
    #[error("graph {0:?} already exists")]
    GraphAlreadyExists(String),

    /// The operation observed a cancelled token.
    #[error("operation cancelled")]
    Cancelled,

    /// A backend-specific failure.
    #[error("store error: {0}")]
    Internal(String),
}
