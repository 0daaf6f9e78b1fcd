//! Parsed, validated statements consumed by the planner.
//!
//! A [`Statement`] is the output of the TQL front end: the operation
//! kind, the graphs it touches, and - for queries - the graph pattern,
//! projections, grouping, ordering, filtering, and limit. The front end
//! itself (lexing, parsing, semantic validation) lives elsewhere;
//! statements are built here through the `with_*` builder methods.
//!
//! A [`GraphClause`] is one triple pattern `S P O`. Components fixed by
//! the query text carry concrete values; unfixed components carry a
//! primary binding (receiving the component value) and optional aliases:
//! a value alias (another name for the same cell), an ID alias (the
//! component's identity as text), and - for temporal positions - an
//! anchor alias (the time anchor as text).

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use tempora_core::{Node, Object, Predicate, Triple};
use tempora_store::LookupOptions;

use crate::expr::Expr;
use crate::table::SortConfig;

/// The kind of operation a statement performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Materialize a result table from a graph pattern.
    Query,
    /// Add triples to the named graphs.
    Insert,
    /// Remove triples from the named graphs.
    Delete,
    /// Create the named graphs.
    Create,
    /// Drop the named graphs.
    Drop,
}

/// Aggregation applied to a projected binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    /// Count the group's rows (or distinct values).
    Count,
    /// Sum the group's numeric literals.
    Sum,
}

/// One entry of a query's projection list.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// The input binding read from the working table.
    pub binding: String,
    /// The output name; defaults to the input binding.
    pub alias: Option<String>,
    /// The aggregation applied over each group, if any.
    pub op: Option<AggregateOp>,
    /// Aggregate over distinct values only.
    pub distinct: bool,
}

impl Projection {
    /// Projects `binding` through unchanged.
    #[must_use]
    pub fn new(binding: impl Into<String>) -> Self {
        Self { binding: binding.into(), alias: None, op: None, distinct: false }
    }

    /// Renames the output column.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Applies an aggregation over each group.
    #[must_use]
    pub fn with_op(mut self, op: AggregateOp) -> Self {
        self.op = Some(op);
        self
    }

    /// Restricts the aggregation to distinct values.
    #[must_use]
    pub fn with_distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// The name this projection writes on output rows.
    #[must_use]
    pub fn output_binding(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.binding)
    }
}

/// One triple pattern of a query's graph pattern.
///
/// `None` components are unfixed and resolved through bindings; `Some`
/// components were fixed literally by the query text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphClause {
    /// Fixed subject, if any.
    pub subject: Option<Node>,
    /// Primary binding receiving the subject node.
    pub subject_binding: Option<String>,
    /// Secondary value alias for the subject node.
    pub subject_alias: Option<String>,
    /// ID alias receiving the subject's id as text.
    pub subject_id_alias: Option<String>,

    /// Fixed predicate, if any.
    pub predicate: Option<Predicate>,
    /// Primary binding receiving the predicate.
    pub predicate_binding: Option<String>,
    /// Secondary value alias for the predicate.
    pub predicate_alias: Option<String>,
    /// ID alias receiving the predicate's name as text.
    pub predicate_id_alias: Option<String>,
    /// Anchor alias receiving the predicate's time anchor as text.
    pub predicate_anchor_alias: Option<String>,

    /// Fixed object, if any.
    pub object: Option<Object>,
    /// Primary binding receiving the object.
    pub object_binding: Option<String>,
    /// Secondary value alias for the object.
    pub object_alias: Option<String>,
    /// ID alias receiving the object's identity as text.
    pub object_id_alias: Option<String>,
    /// Anchor alias receiving a temporal object predicate's anchor.
    pub object_anchor_alias: Option<String>,

    /// Inclusive lower bound on predicate anchors for this clause.
    pub lower_anchor: Option<DateTime<Utc>>,
    /// Inclusive upper bound on predicate anchors for this clause.
    pub upper_anchor: Option<DateTime<Utc>>,
    /// Binding whose row value further tightens the lower bound.
    pub lower_anchor_alias: Option<String>,
    /// Binding whose row value further tightens the upper bound.
    pub upper_anchor_alias: Option<String>,
}

impl GraphClause {
    /// Number of components fixed literally, 0 through 3.
    ///
    /// A fully specified clause (3) is an existence check; anything less
    /// is a fetch.
    #[must_use]
    pub fn specificity(&self) -> usize {
        [self.subject.is_some(), self.predicate.is_some(), self.object.is_some()]
            .iter()
            .filter(|fixed| **fixed)
            .count()
    }

    /// Every binding and alias name the clause can produce, in a stable
    /// order.
    #[must_use]
    pub fn bindings(&self) -> Vec<&str> {
        [
            &self.subject_binding,
            &self.subject_alias,
            &self.subject_id_alias,
            &self.predicate_binding,
            &self.predicate_alias,
            &self.predicate_id_alias,
            &self.predicate_anchor_alias,
            &self.object_binding,
            &self.object_alias,
            &self.object_id_alias,
            &self.object_anchor_alias,
        ]
        .into_iter()
        .filter_map(|b| b.as_deref())
        .collect()
    }
}

/// A parsed and semantically validated TQL statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    kind: StatementKind,
    graphs: Vec<String>,
    data: Vec<Triple>,
    pattern: Vec<GraphClause>,
    projections: Vec<Projection>,
    group_by: Vec<String>,
    order_by: SortConfig,
    having: Option<Expr>,
    limit: Option<usize>,
    lookup: LookupOptions,
}

impl Statement {
    fn with_kind<I, S>(kind: StatementKind, graphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            graphs: graphs.into_iter().map(Into::into).collect(),
            data: Vec::new(),
            pattern: Vec::new(),
            projections: Vec::new(),
            group_by: Vec::new(),
            order_by: SortConfig::new(),
            having: None,
            limit: None,
            lookup: LookupOptions::default(),
        }
    }

    /// Starts a query statement over the given graphs.
    #[must_use]
    pub fn query<I, S>(graphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(StatementKind::Query, graphs)
    }

    /// Starts an insert statement adding `data` to the given graphs.
    #[must_use]
    pub fn insert<I, S>(graphs: I, data: Vec<Triple>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut s = Self::with_kind(StatementKind::Insert, graphs);
        s.data = data;
        s
    }

    /// Starts a delete statement removing `data` from the given graphs.
    #[must_use]
    pub fn delete<I, S>(graphs: I, data: Vec<Triple>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut s = Self::with_kind(StatementKind::Delete, graphs);
        s.data = data;
        s
    }

    /// Starts a create statement for the given graphs.
    #[must_use]
    pub fn create<I, S>(graphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(StatementKind::Create, graphs)
    }

    /// Starts a drop statement for the given graphs.
    #[must_use]
    pub fn drop<I, S>(graphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(StatementKind::Drop, graphs)
    }

    /// Appends a clause to the graph pattern.
    #[must_use]
    pub fn with_clause(mut self, clause: GraphClause) -> Self {
        self.pattern.push(clause);
        self
    }

    /// Appends a projection.
    #[must_use]
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projections.push(projection);
        self
    }

    /// Sets the GROUP BY bindings.
    #[must_use]
    pub fn with_group_by<I, S>(mut self, bindings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = bindings.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the ORDER BY configuration.
    #[must_use]
    pub fn with_order_by(mut self, order_by: SortConfig) -> Self {
        self.order_by = order_by;
        self
    }

    /// Sets the HAVING expression.
    #[must_use]
    pub fn with_having(mut self, having: Expr) -> Self {
        self.having = Some(having);
        self
    }

    /// Sets the row limit.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the statement-global lookup options.
    #[must_use]
    pub fn with_lookup_options(mut self, lookup: LookupOptions) -> Self {
        self.lookup = lookup;
        self
    }

    /// The operation kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// The graphs the statement addresses.
    #[inline]
    #[must_use]
    pub fn graphs(&self) -> &[String] {
        &self.graphs
    }

    /// The triples of a mutation statement.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[Triple] {
        &self.data
    }

    /// Every binding the graph pattern can produce, first occurrence
    /// first.
    #[must_use]
    pub fn bindings(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for clause in &self.pattern {
            for b in clause.bindings() {
                if !out.iter().any(|x| x == b) {
                    out.push(b.to_owned());
                }
            }
        }
        out
    }

    /// The projection list.
    #[inline]
    #[must_use]
    pub fn projections(&self) -> &[Projection] {
        &self.projections
    }

    /// The output column names, in projection order.
    #[must_use]
    pub fn output_bindings(&self) -> Vec<String> {
        if self.projections.is_empty() {
            return self.bindings();
        }
        let mut out: Vec<String> = Vec::new();
        for prj in &self.projections {
            let name = prj.output_binding();
            if !out.iter().any(|x| x == name) {
                out.push(name.to_owned());
            }
        }
        out
    }

    /// The GROUP BY bindings.
    #[inline]
    #[must_use]
    pub fn group_by_bindings(&self) -> &[String] {
        &self.group_by
    }

    /// The ORDER BY configuration.
    #[inline]
    #[must_use]
    pub fn order_by_config(&self) -> &SortConfig {
        &self.order_by
    }

    /// Whether the statement carries a HAVING expression.
    #[inline]
    #[must_use]
    pub fn has_having_clause(&self) -> bool {
        self.having.is_some()
    }

    /// The HAVING expression, if any.
    #[inline]
    #[must_use]
    pub fn having_evaluator(&self) -> Option<&Expr> {
        self.having.as_ref()
    }

    /// The row limit, if one was set.
    #[inline]
    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// The graph pattern ordered most-specific first.
    ///
    /// The sort is stable: clauses of equal specificity keep the order
    /// they appear in the statement.
    #[must_use]
    pub fn sorted_graph_pattern_clauses(&self) -> Vec<GraphClause> {
        let mut clauses = self.pattern.clone();
        clauses.sort_by_key(|c| Reverse(c.specificity()));
        clauses
    }

    /// The statement-global lookup options.
    #[inline]
    #[must_use]
    pub fn global_lookup_options(&self) -> &LookupOptions {
        &self.lookup
    }
}
