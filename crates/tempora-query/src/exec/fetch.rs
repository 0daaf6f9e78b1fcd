//! Clause execution against open graphs.
//!
//! This module turns one [`GraphClause`] into rows: [`simple_fetch`]
//! streams every matching triple from every open graph, and
//! [`simple_exist`] checks a fully specified triple.
//!
//! The two operations treat the graph list differently, and the
//! difference is load-bearing: a fetch is a *union* (a triple in any
//! graph produces a row), while an existence check is a *conjunction*
//! (the triple must be present in every graph). The query driver relies
//! on the same asymmetry when it prunes fully bound rows.
//!
//! Within one fetch, per-graph producers stream into a bounded channel
//! of capacity [`chan_size`](crate::exec::ExecutionContext::chan_size);
//! row order across graphs is not guaranteed.

use std::sync::mpsc;
use std::thread;

use tempora_core::types::{format_anchor, parse_anchor};
use tempora_core::{Literal, Object, Triple};
use tempora_store::{CancellationToken, Graph, LookupOptions, StoreError, StoreResult, TripleIter};

use crate::error::{QueryError, QueryResult};
use crate::exec::context::ExecutionContext;
use crate::statement::GraphClause;
use crate::table::{Cell, Row, Table};

/// Streams the triples matching `cls` from every graph and assembles a
/// table whose schema is exactly the clause's bindings and aliases, one
/// row per matching triple.
pub(crate) fn simple_fetch(
    ctx: &ExecutionContext,
    graphs: &[std::sync::Arc<dyn Graph>],
    cls: &GraphClause,
    lo: &LookupOptions,
) -> QueryResult<Table> {
    let mut tbl = Table::new(cls.bindings());
    if graphs.is_empty() {
        return Ok(tbl);
    }

    let cancel = ctx.cancellation();
    let (tx, rx) = mpsc::sync_channel::<StoreResult<Triple>>(ctx.chan_size());
    let mut first_err: Option<QueryError> = None;

    thread::scope(|scope| {
        for graph in graphs {
            let tx = tx.clone();
            scope.spawn(move || {
                match lookup_for_clause(graph.as_ref(), cancel, cls, lo) {
                    Ok(triples) => {
                        for item in triples {
                            if cancel.is_cancelled() {
                                let _ = tx.send(Err(StoreError::Cancelled));
                                return;
                            }
                            let stop = item.is_err();
                            if tx.send(item).is_err() || stop {
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(Err(e));
                    }
                }
            });
        }
        drop(tx);

        for item in rx {
            match item {
                Ok(triple) => tbl.add_row(triple_to_row(cls, &triple)),
                Err(e) => {
                    first_err = Some(e.into());
                    // Dropping the receiver unblocks the remaining
                    // producers; the scope joins them on exit.
                    break;
                }
            }
        }
    });

    match first_err {
        Some(e) => Err(e),
        None => Ok(tbl),
    }
}

/// Checks whether `triple` exists in every open graph.
///
/// On success the returned table binds the clause's aliases from the
/// triple; a clause without aliases yields an empty table, so appending
/// it never plants rows that carry no bindings. On a miss the table has
/// an empty schema and no rows.
pub(crate) fn simple_exist(
    ctx: &ExecutionContext,
    graphs: &[std::sync::Arc<dyn Graph>],
    cls: &GraphClause,
    triple: &Triple,
) -> QueryResult<(bool, Table)> {
    for graph in graphs {
        if !graph.exist(ctx.cancellation(), triple)? {
            return Ok((false, Table::new(Vec::<String>::new())));
        }
    }
    let mut tbl = Table::new(cls.bindings());
    let row = triple_to_row(cls, triple);
    if !row.is_empty() {
        tbl.add_row(row);
    }
    Ok((true, tbl))
}

/// Narrows the lookup bounds with the clause's own hints and with anchor
/// values bound in `row`.
///
/// The tightening is monotone: the resulting lower bound is the max of
/// every contributing lower bound, the upper bound the min of every
/// contributing upper bound.
pub(crate) fn update_time_bounds_for_row(
    lo: &LookupOptions,
    cls: &GraphClause,
    row: &Row,
) -> QueryResult<LookupOptions> {
    fn raise_lower(out: &mut LookupOptions, anchor: chrono::DateTime<chrono::Utc>) {
        out.lower_anchor = Some(match out.lower_anchor {
            Some(cur) => cur.max(anchor),
            None => anchor,
        });
    }
    fn drop_upper(out: &mut LookupOptions, anchor: chrono::DateTime<chrono::Utc>) {
        out.upper_anchor = Some(match out.upper_anchor {
            Some(cur) => cur.min(anchor),
            None => anchor,
        });
    }

    let mut out = lo.clone();
    if let Some(anchor) = cls.lower_anchor {
        raise_lower(&mut out, anchor);
    }
    if let Some(anchor) = cls.upper_anchor {
        drop_upper(&mut out, anchor);
    }
    if let Some(binding) = &cls.lower_anchor_alias {
        if let Some(cell) = row.get(binding) {
            raise_lower(&mut out, anchor_from_cell(cell)?);
        }
    }
    if let Some(binding) = &cls.upper_anchor_alias {
        if let Some(cell) = row.get(binding) {
            drop_upper(&mut out, anchor_from_cell(cell)?);
        }
    }
    Ok(out)
}

/// Converts a cell into a triple object.
///
/// Raw text becomes a text literal, which is how projected identity
/// aliases re-enter the graph.
pub(crate) fn cell_to_object(cell: &Cell) -> QueryResult<Object> {
    match cell {
        Cell::Node(n) => Ok(Object::Node(n.clone())),
        Cell::Predicate(p) => Ok(Object::Predicate(p.clone())),
        Cell::Literal(l) => Ok(Object::Literal(l.clone())),
        Cell::Text(s) => Ok(Object::Literal(Literal::Text(s.clone()))),
    }
}

/// Maps one matching triple onto the clause's bindings and aliases.
///
/// Primary bindings and value aliases receive the component value; ID
/// aliases receive the component's identity as text; anchor aliases
/// receive the time anchor as text when the component is temporal.
/// Aliases write after bindings, so on a name collision the alias wins.
pub(crate) fn triple_to_row(cls: &GraphClause, triple: &Triple) -> Row {
    let mut row = Row::new();

    let subject = triple.subject();
    if let Some(b) = &cls.subject_binding {
        row.set(b.clone(), Cell::Node(subject.clone()));
    }
    if let Some(b) = &cls.subject_alias {
        row.set(b.clone(), Cell::Node(subject.clone()));
    }
    if let Some(b) = &cls.subject_id_alias {
        row.set(b.clone(), Cell::Text(subject.id().to_owned()));
    }

    let predicate = triple.predicate();
    if let Some(b) = &cls.predicate_binding {
        row.set(b.clone(), Cell::Predicate(predicate.clone()));
    }
    if let Some(b) = &cls.predicate_alias {
        row.set(b.clone(), Cell::Predicate(predicate.clone()));
    }
    if let Some(b) = &cls.predicate_id_alias {
        row.set(b.clone(), Cell::Text(predicate.name().to_owned()));
    }
    if let Some(b) = &cls.predicate_anchor_alias {
        if let Some(anchor) = predicate.anchor() {
            row.set(b.clone(), Cell::Text(format_anchor(&anchor)));
        }
    }

    let object = triple.object();
    if let Some(b) = &cls.object_binding {
        row.set(b.clone(), object_cell(object));
    }
    if let Some(b) = &cls.object_alias {
        row.set(b.clone(), object_cell(object));
    }
    if let Some(b) = &cls.object_id_alias {
        row.set(b.clone(), Cell::Text(object_identity(object)));
    }
    if let Some(b) = &cls.object_anchor_alias {
        if let Some(anchor) = object.as_predicate().and_then(|p| p.anchor()) {
            row.set(b.clone(), Cell::Text(format_anchor(&anchor)));
        }
    }

    row
}

fn object_cell(object: &Object) -> Cell {
    match object {
        Object::Node(n) => Cell::Node(n.clone()),
        Object::Predicate(p) => Cell::Predicate(p.clone()),
        Object::Literal(l) => Cell::Literal(l.clone()),
    }
}

fn object_identity(object: &Object) -> String {
    match object {
        Object::Node(n) => n.id().to_owned(),
        Object::Predicate(p) => p.name().to_owned(),
        Object::Literal(l) => l.to_string(),
    }
}

fn anchor_from_cell(cell: &Cell) -> QueryResult<chrono::DateTime<chrono::Utc>> {
    match cell {
        Cell::Text(s) => parse_anchor(s)
            .map_err(|e| QueryError::Input(format!("cannot read time anchor from cell: {e}"))),
        Cell::Predicate(p) => p.anchor().ok_or_else(|| {
            QueryError::Input(format!(
                "predicate {p} carries no time anchor to tighten bounds with"
            ))
        }),
        other => Err(QueryError::Input(format!(
            "cannot read a time anchor from cell {other}"
        ))),
    }
}

/// Picks the graph lookup matching the clause's fixed components.
fn lookup_for_clause(
    graph: &dyn Graph,
    ctx: &CancellationToken,
    cls: &GraphClause,
    lo: &LookupOptions,
) -> StoreResult<TripleIter> {
    match (&cls.subject, &cls.predicate, &cls.object) {
        // Specialization can pin all three components; the fetch then
        // degenerates to an existence probe yielding zero or one triple.
        (Some(s), Some(p), Some(o)) => {
            let t = Triple::new(s.clone(), p.clone(), o.clone());
            let found = graph.exist(ctx, &t)?;
            let items: Vec<StoreResult<Triple>> = if found { vec![Ok(t)] } else { Vec::new() };
            Ok(Box::new(items.into_iter()))
        }
        (Some(s), Some(p), None) => graph.triples_for_subject_and_predicate(ctx, s, p, lo),
        (Some(s), None, Some(o)) => graph.triples_for_subject_and_object(ctx, s, o, lo),
        (None, Some(p), Some(o)) => graph.triples_for_predicate_and_object(ctx, p, o, lo),
        (Some(s), None, None) => graph.triples_for_subject(ctx, s, lo),
        (None, Some(p), None) => graph.triples_for_predicate(ctx, p, lo),
        (None, None, Some(o)) => graph.triples_for_object(ctx, o, lo),
        (None, None, None) => graph.triples(ctx, lo),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use tempora_core::{Node, Predicate};
    use tempora_store::{MemoryStore, Store};

    use super::*;

    fn node(id: &str) -> Node {
        Node::new("u", id)
    }

    fn fact(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(node(s), Predicate::immutable(p), Object::Node(node(o)))
    }

    fn open_graph(store: &MemoryStore, name: &str, facts: &[Triple]) -> Arc<dyn Graph> {
        let ctx = CancellationToken::new();
        let graph = store.new_graph(&ctx, name).unwrap();
        graph.add_triples(&ctx, facts).unwrap();
        graph
    }

    fn offspring_clause() -> GraphClause {
        GraphClause {
            subject: Some(node("joe")),
            predicate: Some(Predicate::immutable("parent_of")),
            object_binding: Some("?offspring".to_owned()),
            object_id_alias: Some("?name".to_owned()),
            ..GraphClause::default()
        }
    }

    #[test]
    fn fetch_binds_clause_bindings_and_aliases() {
        let store = MemoryStore::new();
        let graph = open_graph(
            &store,
            "?family",
            &[fact("joe", "parent_of", "mary"), fact("joe", "parent_of", "peter")],
        );

        let ctx = ExecutionContext::new();
        let tbl = simple_fetch(&ctx, &[graph], &offspring_clause(), &LookupOptions::default())
            .unwrap();

        assert_eq!(tbl.bindings(), ["?offspring", "?name"]);
        assert_eq!(tbl.num_rows(), 2);
        let mut names: Vec<String> = tbl
            .rows()
            .iter()
            .map(|r| r.get("?name").unwrap().comparable_string())
            .collect();
        names.sort();
        assert_eq!(names, ["mary", "peter"]);
    }

    #[test]
    fn fetch_unions_across_graphs() {
        let store = MemoryStore::new();
        let a = open_graph(&store, "?a", &[fact("joe", "parent_of", "mary")]);
        let b = open_graph(&store, "?b", &[fact("joe", "parent_of", "peter")]);

        let ctx = ExecutionContext::new().with_chan_size(1);
        let tbl =
            simple_fetch(&ctx, &[a, b], &offspring_clause(), &LookupOptions::default()).unwrap();
        assert_eq!(tbl.num_rows(), 2);
    }

    #[test]
    fn fetch_propagates_cancellation() {
        let store = MemoryStore::new();
        let graph = open_graph(&store, "?g", &[fact("joe", "parent_of", "mary")]);

        let ctx = ExecutionContext::new();
        ctx.cancellation().cancel();
        let err = simple_fetch(&ctx, &[graph], &offspring_clause(), &LookupOptions::default())
            .unwrap_err();
        assert!(err.is_cancellation());
    }

    #[test]
    fn exist_is_a_conjunction_across_graphs() {
        let store = MemoryStore::new();
        let shared = fact("joe", "parent_of", "mary");
        let a = open_graph(&store, "?a", &[shared.clone()]);
        let b = open_graph(&store, "?b", &[shared.clone(), fact("joe", "parent_of", "peter")]);

        let ctx = ExecutionContext::new();
        let cls = GraphClause {
            subject: Some(node("joe")),
            predicate: Some(Predicate::immutable("parent_of")),
            object: Some(Object::Node(node("mary"))),
            ..GraphClause::default()
        };

        let (exists, _) = simple_exist(&ctx, &[a.clone(), b.clone()], &cls, &shared).unwrap();
        assert!(exists);

        let only_in_b = fact("joe", "parent_of", "peter");
        let (exists, tbl) = simple_exist(&ctx, &[a, b], &cls, &only_in_b).unwrap();
        assert!(!exists);
        assert!(tbl.bindings().is_empty());
    }

    #[test]
    fn time_bounds_tighten_monotonically() {
        let t2019 = Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap();
        let t2020 = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let t2021 = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();

        let lo = LookupOptions::new().with_lower_anchor(t2019).with_upper_anchor(t2021);
        let cls = GraphClause {
            lower_anchor_alias: Some("?since".to_owned()),
            ..GraphClause::default()
        };

        let mut row = Row::new();
        row.set("?since", Cell::Text(format_anchor(&t2020)));

        let tightened = update_time_bounds_for_row(&lo, &cls, &row).unwrap();
        assert_eq!(tightened.lower_anchor, Some(t2020));
        assert_eq!(tightened.upper_anchor, Some(t2021));

        // A looser row anchor never widens the bounds.
        let mut stale = Row::new();
        stale.set("?since", Cell::Text(format_anchor(&t2019)));
        let unchanged = update_time_bounds_for_row(&tightened, &cls, &stale).unwrap();
        assert_eq!(unchanged.lower_anchor, Some(t2020));
    }

    #[test]
    fn text_cells_become_text_literals() {
        let obj = cell_to_object(&Cell::Text("mary".to_owned())).unwrap();
        assert_eq!(obj, Object::Literal(Literal::Text("mary".to_owned())));
    }
}
