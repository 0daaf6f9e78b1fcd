//! In-memory store backend.
//!
//! [`MemoryStore`] keeps every graph in process memory behind `RwLock`s.
//! Triples are keyed by their canonical printed form in a `BTreeMap`, so
//! iteration order is deterministic. The backend is intended for tests
//! and for embedders that don't need durability.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use tempora_core::{Node, Object, Predicate, Triple};

use crate::cancel::CancellationToken;
use crate::error::{StoreError, StoreResult};
use crate::traits::{Graph, LookupOptions, Store, TripleIter};

/// A thread-safe in-memory [`Store`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    graphs: RwLock<HashMap<String, Arc<MemoryGraph>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn graphs_read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, HashMap<String, Arc<MemoryGraph>>>> {
        self.graphs.read().map_err(|_| StoreError::Internal("graph registry poisoned".to_owned()))
    }

    fn graphs_write(
        &self,
    ) -> StoreResult<std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<MemoryGraph>>>> {
        self.graphs.write().map_err(|_| StoreError::Internal("graph registry poisoned".to_owned()))
    }
}

impl Store for MemoryStore {
    fn new_graph(&self, ctx: &CancellationToken, name: &str) -> StoreResult<Arc<dyn Graph>> {
        check_cancelled(ctx)?;
        let mut graphs = self.graphs_write()?;
        if graphs.contains_key(name) {
            return Err(StoreError::GraphAlreadyExists(name.to_owned()));
        }
        let graph = Arc::new(MemoryGraph::new(name));
        graphs.insert(name.to_owned(), Arc::clone(&graph));
        Ok(graph)
    }

    fn delete_graph(&self, ctx: &CancellationToken, name: &str) -> StoreResult<()> {
        check_cancelled(ctx)?;
        let mut graphs = self.graphs_write()?;
        graphs.remove(name).map(|_| ()).ok_or_else(|| StoreError::GraphNotFound(name.to_owned()))
    }

    fn graph(&self, ctx: &CancellationToken, name: &str) -> StoreResult<Arc<dyn Graph>> {
        check_cancelled(ctx)?;
        let graphs = self.graphs_read()?;
        graphs
            .get(name)
            .map(|g| Arc::clone(g) as Arc<dyn Graph>)
            .ok_or_else(|| StoreError::GraphNotFound(name.to_owned()))
    }
}

/// One in-memory graph.
#[derive(Debug)]
pub struct MemoryGraph {
    name: String,
    triples: RwLock<BTreeMap<String, Triple>>,
}

impl MemoryGraph {
    fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), triples: RwLock::new(BTreeMap::new()) }
    }

    /// Number of triples currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triples.read().map(|t| t.len()).unwrap_or(0)
    }

    /// Whether the graph holds no triples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collects matching triples into a boxed stream.
    ///
    /// The filter sees every stored triple; the lookup options then apply
    /// the temporal bounds and the result cap.
    fn lookup<F>(&self, ctx: &CancellationToken, lo: &LookupOptions, keep: F) -> StoreResult<TripleIter>
    where
        F: Fn(&Triple) -> bool,
    {
        check_cancelled(ctx)?;
        let triples = self
            .triples
            .read()
            .map_err(|_| StoreError::Internal("triple set poisoned".to_owned()))?;
        let max = lo.max_elements.unwrap_or(usize::MAX);
        let matched: Vec<StoreResult<Triple>> = triples
            .values()
            .filter(|t| keep(t) && lo.accepts(t.predicate()))
            .take(max)
            .cloned()
            .map(Ok)
            .collect();
        Ok(Box::new(matched.into_iter()))
    }
}

impl Graph for MemoryGraph {
    fn name(&self) -> &str {
        &self.name
    }

    fn add_triples(&self, ctx: &CancellationToken, triples: &[Triple]) -> StoreResult<()> {
        check_cancelled(ctx)?;
        let mut stored = self
            .triples
            .write()
            .map_err(|_| StoreError::Internal("triple set poisoned".to_owned()))?;
        for t in triples {
            stored.insert(t.to_string(), t.clone());
        }
        Ok(())
    }

    fn remove_triples(&self, ctx: &CancellationToken, triples: &[Triple]) -> StoreResult<()> {
        check_cancelled(ctx)?;
        let mut stored = self
            .triples
            .write()
            .map_err(|_| StoreError::Internal("triple set poisoned".to_owned()))?;
        for t in triples {
            stored.remove(&t.to_string());
        }
        Ok(())
    }

    fn exist(&self, ctx: &CancellationToken, triple: &Triple) -> StoreResult<bool> {
        check_cancelled(ctx)?;
        let stored = self
            .triples
            .read()
            .map_err(|_| StoreError::Internal("triple set poisoned".to_owned()))?;
        Ok(stored.contains_key(&triple.to_string()))
    }

    fn triples(&self, ctx: &CancellationToken, lo: &LookupOptions) -> StoreResult<TripleIter> {
        self.lookup(ctx, lo, |_| true)
    }

    fn triples_for_subject(
        &self,
        ctx: &CancellationToken,
        subject: &Node,
        lo: &LookupOptions,
    ) -> StoreResult<TripleIter> {
        self.lookup(ctx, lo, |t| t.subject() == subject)
    }

    fn triples_for_predicate(
        &self,
        ctx: &CancellationToken,
        predicate: &Predicate,
        lo: &LookupOptions,
    ) -> StoreResult<TripleIter> {
        self.lookup(ctx, lo, |t| t.predicate() == predicate)
    }

    fn triples_for_object(
        &self,
        ctx: &CancellationToken,
        object: &Object,
        lo: &LookupOptions,
    ) -> StoreResult<TripleIter> {
        self.lookup(ctx, lo, |t| t.object() == object)
    }

    fn triples_for_subject_and_predicate(
        &self,
        ctx: &CancellationToken,
        subject: &Node,
        predicate: &Predicate,
        lo: &LookupOptions,
    ) -> StoreResult<TripleIter> {
        self.lookup(ctx, lo, |t| t.subject() == subject && t.predicate() == predicate)
    }

    fn triples_for_subject_and_object(
        &self,
        ctx: &CancellationToken,
        subject: &Node,
        object: &Object,
        lo: &LookupOptions,
    ) -> StoreResult<TripleIter> {
        self.lookup(ctx, lo, |t| t.subject() == subject && t.object() == object)
    }

    fn triples_for_predicate_and_object(
        &self,
        ctx: &CancellationToken,
        predicate: &Predicate,
        object: &Object,
        lo: &LookupOptions,
    ) -> StoreResult<TripleIter> {
        self.lookup(ctx, lo, |t| t.predicate() == predicate && t.object() == object)
    }
}

#[inline]
fn check_cancelled(ctx: &CancellationToken) -> StoreResult<()> {
    if ctx.is_cancelled() {
        return Err(StoreError::Cancelled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triple(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(
            Node::new("u", s),
            Predicate::immutable(p),
            Object::Node(Node::new("u", o)),
        )
    }

    #[test]
    fn new_graph_rejects_duplicates() {
        let store = MemoryStore::new();
        let ctx = CancellationToken::new();
        store.new_graph(&ctx, "?g").unwrap();
        assert_eq!(
            store.new_graph(&ctx, "?g").err(),
            Some(StoreError::GraphAlreadyExists("?g".to_owned()))
        );
    }

    #[test]
    fn graph_lookup_after_delete_fails() {
        let store = MemoryStore::new();
        let ctx = CancellationToken::new();
        store.new_graph(&ctx, "?g").unwrap();
        store.delete_graph(&ctx, "?g").unwrap();
        assert_eq!(store.graph(&ctx, "?g").err(), Some(StoreError::GraphNotFound("?g".to_owned())));
    }

    #[test]
    fn cancelled_token_aborts_operations() {
        let store = MemoryStore::new();
        let ctx = CancellationToken::new();
        let graph = store.new_graph(&ctx, "?g").unwrap();
        ctx.cancel();
        assert_eq!(graph.add_triples(&ctx, &[triple("a", "p", "b")]).err(), Some(StoreError::Cancelled));
        assert_eq!(store.graph(&ctx, "?g").err(), Some(StoreError::Cancelled));
    }

    #[test]
    fn add_is_idempotent() {
        let store = MemoryStore::new();
        let ctx = CancellationToken::new();
        store.new_graph(&ctx, "?g").unwrap();
        let graph = store.graph(&ctx, "?g").unwrap();

        let t = triple("joe", "parent_of", "mary");
        graph.add_triples(&ctx, &[t.clone(), t.clone()]).unwrap();
        let count = graph.triples(&ctx, &LookupOptions::default()).unwrap().count();
        assert_eq!(count, 1);
    }
}
