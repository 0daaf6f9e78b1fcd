//! Core storage traits.
//!
//! This module defines the interfaces the query engine consumes:
//!
//! - [`Store`] - the entry point managing named graphs
//! - [`Graph`] - one named triple set with mutation, existence checks,
//!   and streaming lookups
//! - [`LookupOptions`] - per-lookup constraints (temporal bounds and a
//!   result cap)
//!
//! Both traits are object-safe; the query engine holds graphs as
//! `Arc<dyn Graph>` handles borrowed from the store for the duration of
//! one plan execution. Streaming lookups return a boxed fallible iterator
//! so backends can stream from disk or an index without materializing the
//! full result.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tempora_core::{Node, Object, Predicate, Triple};

use crate::cancel::CancellationToken;
use crate::error::StoreResult;

/// A stream of triples produced by a lookup.
///
/// The stream ends when the iterator is exhausted; the first `Err` item
/// ends it early.
pub type TripleIter = Box<dyn Iterator<Item = StoreResult<Triple>> + Send>;

/// Per-lookup constraints.
///
/// Temporal bounds apply to triples whose predicate is temporal: the
/// predicate's anchor must fall within `[lower_anchor, upper_anchor]`.
/// Triples with immutable predicates always pass. `max_elements` caps how
/// many triples one lookup yields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupOptions {
    /// Maximum number of triples the lookup yields, if set.
    pub max_elements: Option<usize>,
    /// Inclusive lower bound on temporal predicate anchors.
    pub lower_anchor: Option<DateTime<Utc>>,
    /// Inclusive upper bound on temporal predicate anchors.
    pub upper_anchor: Option<DateTime<Utc>>,
}

impl LookupOptions {
    /// Creates unconstrained lookup options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the result cap.
    #[must_use]
    pub fn with_max_elements(mut self, max: usize) -> Self {
        self.max_elements = Some(max);
        self
    }

    /// Sets the inclusive lower anchor bound.
    #[must_use]
    pub fn with_lower_anchor(mut self, anchor: DateTime<Utc>) -> Self {
        self.lower_anchor = Some(anchor);
        self
    }

    /// Sets the inclusive upper anchor bound.
    #[must_use]
    pub fn with_upper_anchor(mut self, anchor: DateTime<Utc>) -> Self {
        self.upper_anchor = Some(anchor);
        self
    }

    /// Whether the given predicate passes the temporal bounds.
    ///
    /// Immutable predicates always pass; temporal predicates pass when
    /// their anchor falls within the configured inclusive bounds.
    #[must_use]
    pub fn accepts(&self, predicate: &Predicate) -> bool {
        match predicate.anchor() {
            None => true,
            Some(t) => {
                self.lower_anchor.map_or(true, |lo| t >= lo)
                    && self.upper_anchor.map_or(true, |hi| t <= hi)
            }
        }
    }
}

/// A store managing named graphs.
pub trait Store: Send + Sync {
    /// Creates a new graph and returns a handle to it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::GraphAlreadyExists`](crate::StoreError::GraphAlreadyExists)
    /// if the name is taken.
    fn new_graph(&self, ctx: &CancellationToken, name: &str) -> StoreResult<Arc<dyn Graph>>;

    /// Deletes a graph and all its triples.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::GraphNotFound`](crate::StoreError::GraphNotFound)
    /// if no graph has the given name.
    fn delete_graph(&self, ctx: &CancellationToken, name: &str) -> StoreResult<()>;

    /// Returns a handle to an existing graph.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::GraphNotFound`](crate::StoreError::GraphNotFound)
    /// if no graph has the given name.
    fn graph(&self, ctx: &CancellationToken, name: &str) -> StoreResult<Arc<dyn Graph>>;
}

/// One named triple set.
///
/// Handles are valid only within the caller-supplied cancellation
/// context; implementations must observe the token in every operation
/// that may touch I/O.
pub trait Graph: Send + Sync {
    /// The graph's name.
    fn name(&self) -> &str;

    /// Adds the given triples. Duplicates are idempotent.
    fn add_triples(&self, ctx: &CancellationToken, triples: &[Triple]) -> StoreResult<()>;

    /// Removes the given triples. Missing triples are ignored.
    fn remove_triples(&self, ctx: &CancellationToken, triples: &[Triple]) -> StoreResult<()>;

    /// Whether the exact triple is present.
    fn exist(&self, ctx: &CancellationToken, triple: &Triple) -> StoreResult<bool>;

    /// Streams every triple in the graph.
    fn triples(&self, ctx: &CancellationToken, lo: &LookupOptions) -> StoreResult<TripleIter>;

    /// Streams triples with the given subject.
    fn triples_for_subject(
        &self,
        ctx: &CancellationToken,
        subject: &Node,
        lo: &LookupOptions,
    ) -> StoreResult<TripleIter>;

    /// Streams triples with the given predicate.
    fn triples_for_predicate(
        &self,
        ctx: &CancellationToken,
        predicate: &Predicate,
        lo: &LookupOptions,
    ) -> StoreResult<TripleIter>;

    /// Streams triples with the given object.
    fn triples_for_object(
        &self,
        ctx: &CancellationToken,
        object: &Object,
        lo: &LookupOptions,
    ) -> StoreResult<TripleIter>;

    /// Streams triples with the given subject and predicate.
    fn triples_for_subject_and_predicate(
        &self,
        ctx: &CancellationToken,
        subject: &Node,
        predicate: &Predicate,
        lo: &LookupOptions,
    ) -> StoreResult<TripleIter>;

    /// Streams triples with the given subject and object.
    fn triples_for_subject_and_object(
        &self,
        ctx: &CancellationToken,
        subject: &Node,
        object: &Object,
        lo: &LookupOptions,
    ) -> StoreResult<TripleIter>;

    /// Streams triples with the given predicate and object.
    fn triples_for_predicate_and_object(
        &self,
        ctx: &CancellationToken,
        predicate: &Predicate,
        object: &Object,
        lo: &LookupOptions,
    ) -> StoreResult<TripleIter>;
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn lookup_options_accept_immutable_predicates() {
        let lo = LookupOptions::new()
            .with_lower_anchor(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        assert!(lo.accepts(&Predicate::immutable("parent_of")));
    }

    #[test]
    fn lookup_options_bound_temporal_predicates() {
        let lo = LookupOptions::new()
            .with_lower_anchor(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
            .with_upper_anchor(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap());

        let inside = Predicate::temporal("met", Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap());
        let before = Predicate::temporal("met", Utc.with_ymd_and_hms(2019, 6, 1, 0, 0, 0).unwrap());
        let after = Predicate::temporal("met", Utc.with_ymd_and_hms(2022, 6, 1, 0, 0, 0).unwrap());

        assert!(lo.accepts(&inside));
        assert!(!lo.accepts(&before));
        assert!(!lo.accepts(&after));
    }
}
