//! Integration tests for the in-memory backend.

use chrono::{TimeZone, Utc};
use tempora_core::{Literal, Node, Object, Predicate, Triple};
use tempora_store::{CancellationToken, Graph, LookupOptions, MemoryStore, Store};

fn node(id: &str) -> Node {
    Node::new("u", id)
}

fn fact(s: &str, p: &str, o: &str) -> Triple {
    Triple::new(node(s), Predicate::immutable(p), Object::Node(node(o)))
}

#[test]
fn lookups_by_component() {
    let store = MemoryStore::new();
    let ctx = CancellationToken::new();
    let graph = store.new_graph(&ctx, "?family").unwrap();

    graph
        .add_triples(
            &ctx,
            &[
                fact("joe", "parent_of", "mary"),
                fact("joe", "parent_of", "peter"),
                fact("peter", "parent_of", "john"),
            ],
        )
        .unwrap();

    let lo = LookupOptions::default();

    let by_subject: Vec<_> = graph
        .triples_for_subject(&ctx, &node("joe"), &lo)
        .unwrap()
        .map(Result::unwrap)
        .collect();
    assert_eq!(by_subject.len(), 2);
    assert!(by_subject.iter().all(|t| t.subject() == &node("joe")));

    let by_predicate =
        graph.triples_for_predicate(&ctx, &Predicate::immutable("parent_of"), &lo).unwrap().count();
    assert_eq!(by_predicate, 3);

    let by_object: Vec<_> = graph
        .triples_for_object(&ctx, &Object::Node(node("mary")), &lo)
        .unwrap()
        .map(Result::unwrap)
        .collect();
    assert_eq!(by_object.len(), 1);
    assert_eq!(by_object[0].subject(), &node("joe"));

    let by_pair = graph
        .triples_for_subject_and_predicate(&ctx, &node("peter"), &Predicate::immutable("parent_of"), &lo)
        .unwrap()
        .count();
    assert_eq!(by_pair, 1);

    let by_subject_object = graph
        .triples_for_subject_and_object(&ctx, &node("joe"), &Object::Node(node("peter")), &lo)
        .unwrap()
        .count();
    assert_eq!(by_subject_object, 1);
}

#[test]
fn exist_and_remove() {
    let store = MemoryStore::new();
    let ctx = CancellationToken::new();
    let graph = store.new_graph(&ctx, "?g").unwrap();

    let t = fact("joe", "parent_of", "mary");
    graph.add_triples(&ctx, &[t.clone()]).unwrap();
    assert!(graph.exist(&ctx, &t).unwrap());

    graph.remove_triples(&ctx, &[t.clone()]).unwrap();
    assert!(!graph.exist(&ctx, &t).unwrap());

    // Removing again is a no-op.
    graph.remove_triples(&ctx, &[t]).unwrap();
}

#[test]
fn temporal_bounds_filter_lookups() {
    let store = MemoryStore::new();
    let ctx = CancellationToken::new();
    let graph = store.new_graph(&ctx, "?g").unwrap();

    let t2019 = Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap();
    let t2020 = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let t2021 = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();

    graph
        .add_triples(
            &ctx,
            &[
                Triple::new(node("joe"), Predicate::temporal("met", t2019), Object::Node(node("mary"))),
                Triple::new(node("joe"), Predicate::temporal("met", t2020), Object::Node(node("mary"))),
                Triple::new(node("joe"), Predicate::temporal("met", t2021), Object::Node(node("mary"))),
                fact("joe", "parent_of", "mary"),
            ],
        )
        .unwrap();

    let lo = LookupOptions::new().with_lower_anchor(t2020).with_upper_anchor(t2020);
    let within: Vec<_> =
        graph.triples(&ctx, &lo).unwrap().map(Result::unwrap).collect();

    // One temporal match plus the immutable triple, which bounds never drop.
    assert_eq!(within.len(), 2);
    assert!(within.iter().any(|t| t.predicate().anchor() == Some(t2020)));
    assert!(within.iter().any(|t| !t.predicate().is_temporal()));
}

#[test]
fn max_elements_caps_results() {
    let store = MemoryStore::new();
    let ctx = CancellationToken::new();
    let graph = store.new_graph(&ctx, "?g").unwrap();

    let triples: Vec<_> = (0..10).map(|i| fact("joe", "knows", &format!("n{i}"))).collect();
    graph.add_triples(&ctx, &triples).unwrap();

    let lo = LookupOptions::new().with_max_elements(3);
    assert_eq!(graph.triples(&ctx, &lo).unwrap().count(), 3);
}

#[test]
fn literal_objects_round_trip() {
    let store = MemoryStore::new();
    let ctx = CancellationToken::new();
    let graph = store.new_graph(&ctx, "?g").unwrap();

    let t = Triple::new(
        node("joe"),
        Predicate::immutable("height_cm"),
        Object::Literal(Literal::Int64(183)),
    );
    graph.add_triples(&ctx, &[t.clone()]).unwrap();

    let found: Vec<_> = graph
        .triples_for_object(&ctx, &Object::Literal(Literal::Int64(183)), &LookupOptions::default())
        .unwrap()
        .map(Result::unwrap)
        .collect();
    assert_eq!(found, vec![t]);
}
