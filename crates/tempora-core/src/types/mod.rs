//! Core data types for tempora.
//!
//! This module defines the triple data model: nodes, predicates, literals,
//! and the triples assembled from them.

mod literal;
mod node;
mod predicate;
mod triple;

pub use literal::Literal;
pub use node::Node;
pub use predicate::{format_anchor, parse_anchor, Predicate};
pub use triple::{Object, Triple};
