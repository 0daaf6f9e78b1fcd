//! Tempora Core
//!
//! This crate provides the data model shared by every tempora component:
//! the triples stored in graphs and the pieces they are made of.
//!
//! # Overview
//!
//! - **Nodes**: [`Node`], a typed identifier printed as `/kind<id>`
//! - **Predicates**: [`Predicate`], a named relation with an optional
//!   time anchor (immutable `"name"@[]` or temporal `"name"@[anchor]`)
//! - **Literals**: [`Literal`], typed scalar values with a canonical
//!   comparable text form
//! - **Triples**: [`Triple`], a `(subject, predicate, object)` fact where
//!   the object is a [`Node`], [`Predicate`], or [`Literal`]
//!
//! # Example
//!
//! ```
//! use tempora_core::{Literal, Node, Object, Predicate, Triple};
//!
//! let joe = Node::new("u", "joe");
//! let mary = Node::new("u", "mary");
//! let parent_of = Predicate::immutable("parent_of");
//!
//! let fact = Triple::new(joe, parent_of, Object::Node(mary));
//! assert_eq!(fact.to_string(), "/u<joe> \"parent_of\"@[] /u<mary>");
//!
//! let age = Literal::Int64(42);
//! assert_eq!(age.to_string(), "\"42\"^^type:int64");
//! ```
//!
//! # Modules
//!
//! - [`types`] - The data model ([`Node`], [`Predicate`], [`Literal`],
//!   [`Object`], [`Triple`])
//! - [`error`] - Error types ([`CoreError`])

pub mod error;
pub mod types;

pub use error::CoreError;
pub use types::{Literal, Node, Object, Predicate, Triple};
