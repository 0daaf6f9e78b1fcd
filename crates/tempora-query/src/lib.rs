//! Tempora Query
//!
//! The TQL query planner and execution engine. A validated
//! [`Statement`] goes in, a result [`Table`] comes out: the planner
//! resolves the statement's graphs, materializes its graph pattern by
//! propagating bindings clause by clause, and runs the
//! projection/grouping, ordering, HAVING, and limit tail.
//!
//! The planner is deliberately naive and clause-local: clauses execute
//! most-specific first and no cost model is consulted. Row order in a
//! result is only defined when the statement orders it.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use tempora_core::{Node, Object, Predicate, Triple};
//! use tempora_query::{
//!     ExecutionContext, GraphClause, Plan, Projection, SortCondition, Statement,
//! };
//! use tempora_store::{Graph, MemoryStore, Store};
//!
//! let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
//! let ctx = ExecutionContext::new();
//!
//! // Seed a graph with one fact.
//! let graph = store.new_graph(ctx.cancellation(), "?family").unwrap();
//! let fact = Triple::new(
//!     Node::new("u", "joe"),
//!     Predicate::immutable("parent_of"),
//!     Object::Node(Node::new("u", "mary")),
//! );
//! graph.add_triples(ctx.cancellation(), &[fact]).unwrap();
//!
//! // SELECT ?name WHERE { /u<joe> "parent_of"@[] ?offspring ID ?name }
//! let statement = Statement::query(["?family"])
//!     .with_clause(GraphClause {
//!         subject: Some(Node::new("u", "joe")),
//!         predicate: Some(Predicate::immutable("parent_of")),
//!         object_binding: Some("?offspring".to_owned()),
//!         object_id_alias: Some("?name".to_owned()),
//!         ..GraphClause::default()
//!     })
//!     .with_projection(Projection::new("?name"))
//!     .with_order_by(vec![SortCondition::ascending("?name")]);
//!
//! let mut plan = Plan::new(&ctx, store, statement).unwrap();
//! let result = plan.execute(&ctx).unwrap();
//!
//! assert_eq!(result.bindings(), ["?name"]);
//! assert_eq!(result.rows()[0].get("?name").unwrap().to_string(), "mary");
//! ```
//!
//! # Modules
//!
//! - [`statement`] - the validated input model ([`Statement`],
//!   [`GraphClause`], [`Projection`])
//! - [`table`] - the result [`Table`], its [`Cell`]s and accumulators
//! - [`expr`] - the HAVING expression tree ([`Expr`])
//! - [`exec`] - the execution context and clause executor
//! - [`plan`] - executable plans ([`Plan`], [`QueryPlan`])
//! - [`error`] - error types ([`QueryError`])

pub mod error;
pub mod exec;
pub mod expr;
pub mod plan;
pub mod statement;
pub mod table;

pub use error::{QueryError, QueryResult};
pub use exec::{ExecutionContext, DEFAULT_CHAN_SIZE};
pub use expr::{ComparisonOp, Expr, Operand};
pub use plan::{Plan, QueryPlan};
pub use statement::{AggregateOp, GraphClause, Projection, Statement, StatementKind};
pub use table::{Cell, Row, SortCondition, SortConfig, Table};
