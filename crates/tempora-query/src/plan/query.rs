//! The query-plan driver.
//!
//! A [`QueryPlan`] resolves its graph handles up front, then processes
//! the statement's clauses most-specific first, propagating bindings
//! through the working table. Each clause is classified against the
//! table's schema:
//!
//! | bindings already solved | action |
//! |---|---|
//! | specificity 3 (none)    | existence check; a miss empties the result |
//! | none                    | fetch, then append or cross-join |
//! | some                    | specialize the clause per row and re-fetch |
//! | all                     | prune rows whose triple does not exist |
//!
//! The tail stages then project and group, order, filter on HAVING, and
//! apply the limit. The planner is deliberately naive: clause order is
//! fixed by specificity and no cost model is consulted.

use std::sync::Arc;

use tracing::debug;

use tempora_core::{Literal, Node, Predicate, Triple};
use tempora_store::{Graph, LookupOptions, Store};

use crate::error::{QueryError, QueryResult};
use crate::exec::context::ExecutionContext;
use crate::exec::fetch::{
    cell_to_object, simple_exist, simple_fetch, update_time_bounds_for_row,
};
use crate::statement::{AggregateOp, GraphClause, Statement};
use crate::table::{
    merge_rows, Accumulator, AliasAccPair, Cell, CountAccumulator, CountDistinctAccumulator,
    Row, SortCondition, SortConfig, SumFloat64Accumulator, SumInt64Accumulator, Table,
};

/// An executable query over one or more graphs.
///
/// The plan owns its working table and borrows graph handles from the
/// store for the duration of execution.
pub struct QueryPlan {
    statement: Statement,
    graphs: Vec<Arc<dyn Graph>>,
    clauses: Vec<GraphClause>,
    tbl: Table,
}

impl std::fmt::Debug for QueryPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryPlan")
            .field("statement", &self.statement)
            .field("clauses", &self.clauses)
            .field("tbl", &self.tbl)
            .finish()
    }
}

impl QueryPlan {
    /// Resolves the statement's graphs and prepares an empty working
    /// table.
    pub(crate) fn new(
        ctx: &ExecutionContext,
        store: Arc<dyn Store>,
        statement: Statement,
    ) -> QueryResult<Self> {
        let mut graphs: Vec<Arc<dyn Graph>> = Vec::with_capacity(statement.graphs().len());
        for name in statement.graphs() {
            graphs.push(store.graph(ctx.cancellation(), name)?);
        }
        let clauses = statement.sorted_graph_pattern_clauses();
        debug!(graphs = graphs.len(), clauses = clauses.len(), "query plan ready");
        Ok(Self { statement, graphs, clauses, tbl: Table::new(Vec::<String>::new()) })
    }

    /// Runs the full pipeline and returns the result table.
    ///
    /// An empty result still carries the statement's output bindings as
    /// its schema.
    pub fn execute(&mut self, ctx: &ExecutionContext) -> QueryResult<Table> {
        let lo = self.statement.global_lookup_options().clone();
        self.process_graph_pattern(ctx, &lo)?;
        self.project_and_group_by()?;
        self.order_by();
        self.having()?;
        self.limit();
        if self.tbl.num_rows() == 0 {
            self.tbl = Table::new(self.statement.output_bindings());
        }
        Ok(std::mem::take(&mut self.tbl))
    }

    fn process_graph_pattern(
        &mut self,
        ctx: &ExecutionContext,
        lo: &LookupOptions,
    ) -> QueryResult<()> {
        let clauses = self.clauses.clone();
        for cls in &clauses {
            if ctx.is_cancelled() {
                return Err(QueryError::Cancelled);
            }
            let unresolvable = self.process_clause(ctx, cls, lo)?;
            if unresolvable {
                self.tbl.truncate();
                return Ok(());
            }
        }
        Ok(())
    }

    /// Handles one clause according to how its bindings relate to the
    /// working table. Returns true when a fully specified clause turned
    /// out not to exist, which makes the whole pattern unresolvable.
    fn process_clause(
        &mut self,
        ctx: &ExecutionContext,
        cls: &GraphClause,
        lo: &LookupOptions,
    ) -> QueryResult<bool> {
        if cls.specificity() == 3 {
            let triple = clause_triple(cls)?;
            let (exists, bound) = simple_exist(ctx, &self.graphs, cls, &triple)?;
            if exists {
                self.tbl.append_table(bound)?;
            }
            return Ok(!exists);
        }

        let bindings = cls.bindings();
        let total = bindings.len();
        let solved = bindings.iter().filter(|b| self.tbl.has_binding(b)).count();
        debug!(total, solved, specificity = cls.specificity(), "clause classified");

        if solved == 0 {
            // Every binding is new to the table.
            let fetched = simple_fetch(ctx, &self.graphs, cls, lo)?;
            if self.tbl.bindings().is_empty() {
                self.tbl.append_table(fetched)?;
            } else {
                self.tbl.dot_product(&fetched);
            }
            return Ok(false);
        }
        if solved < total {
            self.specify_clause_with_table(ctx, cls, lo)?;
            return Ok(false);
        }
        // All bindings are already solved; the clause reduces to an
        // existence test per row.
        self.filter_on_existence(ctx, cls)?;
        Ok(false)
    }

    /// Re-runs a partially bound clause once per existing row,
    /// specialized with the row's values.
    ///
    /// The current rows are snapshotted and the table truncated first;
    /// each specialized fetch re-adds the merged rows, so a row without
    /// matches drops out.
    fn specify_clause_with_table(
        &mut self,
        ctx: &ExecutionContext,
        cls: &GraphClause,
        lo: &LookupOptions,
    ) -> QueryResult<()> {
        let snapshot = self.tbl.rows().to_vec();
        self.tbl.truncate();
        for row in &snapshot {
            let mut specialized = cls.clone();
            self.add_specified_data(ctx, row, &mut specialized, lo)?;
        }
        Ok(())
    }

    fn add_specified_data(
        &mut self,
        ctx: &ExecutionContext,
        row: &Row,
        cls: &mut GraphClause,
        lo: &LookupOptions,
    ) -> QueryResult<()> {
        let mut lo = lo.clone();
        if cls.subject.is_none() {
            let names = [cls.subject_binding.as_deref(), cls.subject_alias.as_deref()];
            if let Some(Cell::Node(n)) = bound_value_for_component(row, &names) {
                cls.subject = Some(n);
            }
        }
        if cls.predicate.is_none() {
            let names = [cls.predicate_binding.as_deref(), cls.predicate_alias.as_deref()];
            if let Some(Cell::Predicate(p)) = bound_value_for_component(row, &names) {
                cls.predicate = Some(p);
            }
            lo = update_time_bounds_for_row(&lo, cls, row)?;
        }
        if cls.object.is_none() {
            let names = [cls.object_binding.as_deref(), cls.object_alias.as_deref()];
            if let Some(cell) = bound_value_for_component(row, &names) {
                cls.object = Some(cell_to_object(&cell)?);
            }
            lo = update_time_bounds_for_row(&lo, cls, row)?;
        }

        let fetched = simple_fetch(ctx, &self.graphs, cls, &lo)?;
        self.tbl.add_bindings(fetched.bindings().iter().cloned());
        for fetched_row in fetched.rows() {
            self.tbl.add_row(merge_rows(&[row, fetched_row]));
        }
        Ok(())
    }

    /// Prunes rows whose fully specified triple is absent from any open
    /// graph. Existence across graphs is a conjunction, unlike the
    /// union semantics of a fetch.
    fn filter_on_existence(&mut self, ctx: &ExecutionContext, cls: &GraphClause) -> QueryResult<()> {
        let mut idx = 0;
        while idx < self.tbl.num_rows() {
            let row = self.tbl.rows()[idx].clone();

            let subject = match &cls.subject {
                Some(s) => s.clone(),
                None => {
                    let names = [cls.subject_binding.as_deref(), cls.subject_alias.as_deref()];
                    resolve_node(&self.tbl, &row, &names)?
                }
            };
            let predicate = match &cls.predicate {
                Some(p) => p.clone(),
                None => {
                    let names = [cls.predicate_binding.as_deref(), cls.predicate_alias.as_deref()];
                    resolve_predicate(&self.tbl, &row, &names)?
                }
            };
            let object = match &cls.object {
                Some(o) => o.clone(),
                None => {
                    let names = [cls.object_binding.as_deref(), cls.object_alias.as_deref()];
                    cell_to_object(&resolve_cell(&self.tbl, &row, &names)?)?
                }
            };

            let triple = Triple::new(subject, predicate, object);
            let mut missing = false;
            for graph in &self.graphs {
                if !graph.exist(ctx.cancellation(), &triple)? {
                    missing = true;
                    break;
                }
            }
            if missing {
                self.tbl.delete_row(idx);
            } else {
                idx += 1;
            }
        }
        Ok(())
    }

    /// Projects the working table onto the output bindings, reducing
    /// grouped queries through their accumulators.
    fn project_and_group_by(&mut self) -> QueryResult<()> {
        let group_by = self.statement.group_by_bindings().to_vec();
        if group_by.is_empty() {
            let output = self.statement.output_bindings();
            self.tbl.add_bindings(output.iter().cloned());
            for prj in self.statement.projections() {
                let out_name = prj.output_binding().to_owned();
                if out_name == prj.binding {
                    continue;
                }
                for row in self.tbl.rows_mut() {
                    if let Some(cell) = row.get(&prj.binding).cloned() {
                        row.set(out_name.clone(), cell);
                    }
                }
            }
            return self.tbl.project_bindings(&output);
        }

        if self.tbl.num_rows() == 0 {
            // Nothing to group; there is no first row to infer sum
            // types from either. The empty-result correction in
            // `execute` supplies the output schema.
            self.tbl = Table::new(self.statement.output_bindings());
            return Ok(());
        }

        let mut input_bindings: Vec<String> = Vec::new();
        let mut cfg = SortConfig::new();
        let mut pairs: Vec<AliasAccPair> = Vec::new();
        for prj in self.statement.projections() {
            if !input_bindings.contains(&prj.binding) {
                input_bindings.push(prj.binding.clone());
            }
            if group_by.contains(&prj.binding) && !cfg.iter().any(|c| c.binding == prj.binding) {
                cfg.push(SortCondition::ascending(prj.binding.clone()));
            }
            let pair = match prj.op {
                None => AliasAccPair::identity(prj.binding.clone(), prj.output_binding()),
                Some(AggregateOp::Count) => {
                    let acc: Box<dyn Accumulator> = if prj.distinct {
                        Box::new(CountDistinctAccumulator::new())
                    } else {
                        Box::new(CountAccumulator::new())
                    };
                    AliasAccPair::with_accumulator(prj.binding.clone(), prj.output_binding(), acc)
                }
                Some(AggregateOp::Sum) => {
                    let first = self.tbl.rows()[0].get(&prj.binding);
                    let acc: Box<dyn Accumulator> = match first.and_then(Cell::as_literal) {
                        Some(Literal::Int64(_)) => Box::new(SumInt64Accumulator::new()),
                        Some(Literal::Float64(_)) => Box::new(SumFloat64Accumulator::new()),
                        _ => {
                            return Err(QueryError::Aggregation(format!(
                                "can only sum int64 and float64 literals; found {} for binding {:?}",
                                first.map_or_else(|| "nothing".to_owned(), ToString::to_string),
                                prj.binding
                            )))
                        }
                    };
                    AliasAccPair::with_accumulator(prj.binding.clone(), prj.output_binding(), acc)
                }
            };
            pairs.push(pair);
        }

        self.tbl.project_bindings(&input_bindings)?;
        self.tbl.reduce(&cfg, &mut pairs)
    }

    fn order_by(&mut self) {
        self.tbl.sort(self.statement.order_by_config());
    }

    fn having(&mut self) -> QueryResult<()> {
        if let Some(expr) = self.statement.having_evaluator() {
            let mut first_err = None;
            self.tbl.filter(|row| match expr.evaluate(row) {
                Ok(keep) => !keep,
                Err(e) => {
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                    false
                }
            });
            if let Some(e) = first_err {
                return Err(e);
            }
        }
        Ok(())
    }

    fn limit(&mut self) {
        if let Some(n) = self.statement.limit() {
            self.tbl.limit(n);
        }
    }
}

/// Assembles the triple of a fully specified clause.
fn clause_triple(cls: &GraphClause) -> QueryResult<Triple> {
    let err = || QueryError::Input(format!("clause is not fully specified: {cls:?}"));
    let subject = cls.subject.clone().ok_or_else(&err)?;
    let predicate = cls.predicate.clone().ok_or_else(&err)?;
    let object = cls.object.clone().ok_or_else(&err)?;
    Ok(Triple::new(subject, predicate, object))
}

/// The unique value a row binds for a component, if any.
///
/// Accepts one bound cell, or two deep-equal cells from the (binding,
/// alias) pair; anything else leaves the component unfixed.
fn bound_value_for_component(row: &Row, names: &[Option<&str>]) -> Option<Cell> {
    let cells: Vec<&Cell> =
        names.iter().copied().flatten().filter_map(|name| row.get(name)).collect();
    match cells.as_slice() {
        [only] => Some((*only).clone()),
        [first, second] if first == second => Some((*first).clone()),
        _ => None,
    }
}

/// The first of `names` present in the table's schema must be bound in
/// the row; missing bindings fail the query.
fn resolve_cell(tbl: &Table, row: &Row, names: &[Option<&str>]) -> QueryResult<Cell> {
    for name in names.iter().copied().flatten() {
        if tbl.has_binding(name) {
            return row
                .get(name)
                .cloned()
                .ok_or_else(|| QueryError::Input(format!("row {row:?} misses binding {name:?}")));
        }
    }
    Err(QueryError::Input(format!(
        "cannot fully specify the clause: none of {names:?} is bound in the table"
    )))
}

fn resolve_node(tbl: &Table, row: &Row, names: &[Option<&str>]) -> QueryResult<Node> {
    let cell = resolve_cell(tbl, row, names)?;
    cell.as_node().cloned().ok_or_else(|| {
        QueryError::Input(format!("bindings {names:?} require a node, got {cell} instead"))
    })
}

fn resolve_predicate(tbl: &Table, row: &Row, names: &[Option<&str>]) -> QueryResult<Predicate> {
    let cell = resolve_cell(tbl, row, names)?;
    cell.as_predicate().cloned().ok_or_else(|| {
        QueryError::Input(format!("bindings {names:?} require a predicate, got {cell} instead"))
    })
}
