//! Tempora Store
//!
//! Storage interfaces for tempora graphs, plus the in-memory backend.
//!
//! # Overview
//!
//! - [`Store`] - manages named graphs (`new_graph` / `graph` / `delete_graph`)
//! - [`Graph`] - one named triple set: mutation, existence checks, and
//!   streaming lookups constrained by [`LookupOptions`]
//! - [`CancellationToken`] - cooperative cancellation observed by every
//!   potentially long store operation
//! - [`MemoryStore`] - a thread-safe in-memory implementation used by the
//!   query engine's tests and by embedders that don't need durability
//!
//! # Example
//!
//! ```
//! use tempora_core::{Node, Object, Predicate, Triple};
//! use tempora_store::{CancellationToken, Graph, LookupOptions, MemoryStore, Store};
//!
//! let store = MemoryStore::new();
//! let ctx = CancellationToken::new();
//! let graph = store.new_graph(&ctx, "?family").unwrap();
//!
//! let fact = Triple::new(
//!     Node::new("u", "joe"),
//!     Predicate::immutable("parent_of"),
//!     Object::Node(Node::new("u", "mary")),
//! );
//! graph.add_triples(&ctx, &[fact.clone()]).unwrap();
//! assert!(graph.exist(&ctx, &fact).unwrap());
//!
//! let mut found = graph.triples(&ctx, &LookupOptions::default()).unwrap();
//! assert_eq!(found.next().unwrap().unwrap(), fact);
//! ```

pub mod cancel;
pub mod error;
pub mod memory;
pub mod traits;

pub use cancel::CancellationToken;
pub use error::{StoreError, StoreResult};
pub use memory::{MemoryGraph, MemoryStore};
pub use traits::{Graph, LookupOptions, Store, TripleIter};
