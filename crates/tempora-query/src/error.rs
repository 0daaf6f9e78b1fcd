//! Error types for query planning and execution.

use tempora_store::StoreError;
use thiserror::Error;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised while planning or executing a statement.
///
/// Query execution is fail-fast: the first error short-circuits the
/// pipeline and is returned verbatim. The one exception is mutation
/// fan-out, which accumulates per-graph store failures into a single
/// [`QueryError::Mutation`].
#[derive(Debug, Error)]
pub enum QueryError {
    /// A malformed clause or statement reached the executor.
    #[error("invalid input: {0}")]
    Input(String),

    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The expression evaluator could not resolve a binding or operand.
    #[error("evaluation failed: {0}")]
    Evaluation(String),

    /// An accumulator was fed a value it cannot aggregate.
    #[error("aggregation failed: {0}")]
    Aggregation(String),

    /// One or more graphs failed during mutation fan-out; the payload
    /// joins the individual failures with `"; "`.
    #[error("graph mutation failed: {0}")]
    Mutation(String),

    /// Execution observed a cancelled context.
    #[error("operation cancelled")]
    Cancelled,
}

impl QueryError {
    /// Whether this error reports cancellation, at either the driver or
    /// the store layer.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Store(StoreError::Cancelled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_cancellation_is_cancellation() {
        let err = QueryError::from(StoreError::Cancelled);
        assert!(err.is_cancellation());
        assert!(QueryError::Cancelled.is_cancellation());
        assert!(!QueryError::Input("bad".to_owned()).is_cancellation());
    }
}
