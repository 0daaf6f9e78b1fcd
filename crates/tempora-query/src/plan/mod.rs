//! Executable plans for TQL statements.
//!
//! [`Plan::new`] turns a validated [`Statement`] into an executable
//! plan: queries get a [`QueryPlan`] driving the graph-pattern pipeline,
//! mutations get the thin fan-outs defined here. Executing a plan
//! returns a result [`Table`]; mutation plans return an empty one.
//!
//! Mutation error handling differs from query error handling by design:
//! queries fail fast, while mutations run every graph and accumulate the
//! failures into one joined error, so a failing graph does not shadow
//! the work done on its siblings.

mod query;

pub use query::QueryPlan;

use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use tracing::debug;

use tempora_core::Triple;
use tempora_store::Store;

use crate::error::{QueryError, QueryResult};
use crate::exec::ExecutionContext;
use crate::statement::{Statement, StatementKind};
use crate::table::Table;

/// An executable plan for one statement.
#[derive(Debug)]
pub enum Plan {
    /// A query materializing a result table.
    Query(QueryPlan),
    /// Graph creation.
    Create(GraphPlan),
    /// Graph removal.
    Drop(GraphPlan),
    /// Triple insertion.
    Insert(MutationPlan),
    /// Triple removal.
    Delete(MutationPlan),
}

impl Plan {
    /// Builds the plan for `statement` against `store`.
    ///
    /// Query plans resolve their graph handles here; mutation plans
    /// resolve graphs lazily inside their fan-out.
    pub fn new(
        ctx: &ExecutionContext,
        store: Arc<dyn Store>,
        statement: Statement,
    ) -> QueryResult<Self> {
        debug!(kind = ?statement.kind(), graphs = statement.graphs().len(), "planning statement");
        Ok(match statement.kind() {
            StatementKind::Query => Self::Query(QueryPlan::new(ctx, store, statement)?),
            StatementKind::Create => {
                Self::Create(GraphPlan::new(store, &statement, GraphOp::Create))
            }
            StatementKind::Drop => Self::Drop(GraphPlan::new(store, &statement, GraphOp::Drop)),
            StatementKind::Insert => {
                Self::Insert(MutationPlan::new(store, &statement, MutationOp::Insert))
            }
            StatementKind::Delete => {
                Self::Delete(MutationPlan::new(store, &statement, MutationOp::Delete))
            }
        })
    }

    /// Runs the plan to completion.
    pub fn execute(&mut self, ctx: &ExecutionContext) -> QueryResult<Table> {
        match self {
            Self::Query(plan) => plan.execute(ctx),
            Self::Create(plan) | Self::Drop(plan) => plan.execute(ctx),
            Self::Insert(plan) | Self::Delete(plan) => plan.execute(ctx),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum GraphOp {
    Create,
    Drop,
}

/// Creates or drops every named graph, accumulating per-graph errors.
pub struct GraphPlan {
    store: Arc<dyn Store>,
    graphs: Vec<String>,
    op: GraphOp,
}

impl std::fmt::Debug for GraphPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphPlan").field("graphs", &self.graphs).field("op", &self.op).finish()
    }
}

impl GraphPlan {
    fn new(store: Arc<dyn Store>, statement: &Statement, op: GraphOp) -> Self {
        Self { store, graphs: statement.graphs().to_vec(), op }
    }

    fn execute(&self, ctx: &ExecutionContext) -> QueryResult<Table> {
        let mut errors = Vec::new();
        for name in &self.graphs {
            let result = match self.op {
                GraphOp::Create => self.store.new_graph(ctx.cancellation(), name).map(|_| ()),
                GraphOp::Drop => self.store.delete_graph(ctx.cancellation(), name),
            };
            if let Err(e) = result {
                errors.push(e.to_string());
            }
        }
        if errors.is_empty() {
            Ok(Table::new(Vec::<String>::new()))
        } else {
            Err(QueryError::Mutation(errors.join("; ")))
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MutationOp {
    Insert,
    Delete,
}

/// Adds or removes the statement's triples on every named graph, one
/// task per graph, joined before return.
///
/// Failure of one graph does not cancel the others; the tasks share
/// only the error list.
pub struct MutationPlan {
    store: Arc<dyn Store>,
    graphs: Vec<String>,
    data: Vec<Triple>,
    op: MutationOp,
}

impl std::fmt::Debug for MutationPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationPlan")
            .field("graphs", &self.graphs)
            .field("data", &self.data)
            .field("op", &self.op)
            .finish()
    }
}

impl MutationPlan {
    fn new(store: Arc<dyn Store>, statement: &Statement, op: MutationOp) -> Self {
        Self { store, graphs: statement.graphs().to_vec(), data: statement.data().to_vec(), op }
    }

    fn execute(&self, ctx: &ExecutionContext) -> QueryResult<Table> {
        debug!(graphs = self.graphs.len(), triples = self.data.len(), op = ?self.op, "mutation fan-out");
        let errors = Mutex::new(Vec::<String>::new());
        thread::scope(|scope| {
            for name in &self.graphs {
                let errors = &errors;
                let cancel = ctx.cancellation();
                scope.spawn(move || {
                    let result = self.store.graph(cancel, name).and_then(|graph| match self.op {
                        MutationOp::Insert => graph.add_triples(cancel, &self.data),
                        MutationOp::Delete => graph.remove_triples(cancel, &self.data),
                    });
                    if let Err(e) = result {
                        errors
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push(e.to_string());
                    }
                });
            }
        });

        let errors = errors.into_inner().unwrap_or_else(PoisonError::into_inner);
        if errors.is_empty() {
            Ok(Table::new(Vec::<String>::new()))
        } else {
            Err(QueryError::Mutation(errors.join("; ")))
        }
    }
}
