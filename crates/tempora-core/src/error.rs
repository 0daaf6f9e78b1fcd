//! Error types for the core crate.

use thiserror::Error;

/// Errors that can occur while building or parsing data-model values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A node's textual form could not be parsed.
    #[error("invalid node text {0:?}; expected /kind<id>")]
    InvalidNode(String),

    /// A predicate's textual form could not be parsed.
    #[error("invalid predicate text {0:?}; expected \"name\"@[] or \"name\"@[anchor]")]
    InvalidPredicate(String),

    /// A time anchor could not be parsed.
    #[error("invalid time anchor {0:?}")]
    InvalidAnchor(String),
}
