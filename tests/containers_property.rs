//! Property tests for container construction: shape, determinism, and
//! identity-based deduplication over generated topologies.

mod common;
use common::*;

use proptest::prelude::*;
use rustc_hash::FxHashSet;
use wiregraph::adapters::Passthrough;
use wiregraph::component::{entity, Entity};
use wiregraph::containers::{Container, Graphline, Pipeline};
use wiregraph::links::{Link, RawLink};

fn stages(count: usize) -> Vec<Entity> {
    (0..count).map(|_| entity(Passthrough::new())).collect()
}

proptest! {
    #[test]
    fn prop_pipeline_shape_is_linear_in_stage_count(count in 2usize..12) {
        let pipeline = Pipeline::new(stages(count)).unwrap();
        let inner = pipeline.borrow();

        prop_assert_eq!(inner.coroutines().len(), count + 1);
        prop_assert_eq!(inner.links().len(), 2 * (count - 1) + 4);

        let unique: FxHashSet<_> = ids(&inner.coroutines()).into_iter().collect();
        prop_assert_eq!(unique.len(), count + 1);
    }

    #[test]
    fn prop_pipeline_rejects_fewer_than_two_stages(count in 0usize..2) {
        prop_assert!(Pipeline::new(stages(count)).is_err());
    }

    #[test]
    fn prop_graphline_link_union_is_idempotent(
        count in 1usize..8,
        repeats in 1usize..4,
    ) {
        // A chain of `count` links, declared `repeats` times over.
        let nodes = stages(count + 1);
        let mut raw = Vec::new();
        for _ in 0..repeats {
            for pair in nodes.windows(2) {
                raw.push(RawLink::new(&pair[0], "outbox", &pair[1], "inbox"));
            }
        }

        let graph = Graphline::new(raw).unwrap();
        let inner = graph.borrow();
        prop_assert_eq!(inner.links().len(), count);
        prop_assert_eq!(inner.coroutines().len(), count + 2);
    }

    #[test]
    fn prop_flattening_is_deterministic(count in 2usize..10) {
        let pipeline = Pipeline::new(stages(count)).unwrap();
        let inner = pipeline.borrow();

        prop_assert_eq!(ids(&inner.coroutines()), ids(&inner.coroutines()));
        let first: Vec<_> = inner.links().iter().map(Link::key).collect();
        let second: Vec<_> = inner.links().iter().map(Link::key).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_nesting_depth_never_duplicates_coroutines(depth in 1usize..6) {
        let mut current = Pipeline::new(stages(2)).unwrap();
        for _ in 1..depth {
            let head = entity(Passthrough::new());
            let nested: Entity = current.clone();
            current = Pipeline::new([head, nested]).unwrap();
        }

        let inner = current.borrow();
        // Each nesting level contributes itself plus one fresh stage.
        prop_assert_eq!(inner.coroutines().len(), 2 * depth + 1);
        let unique: FxHashSet<_> = ids(&inner.coroutines()).into_iter().collect();
        prop_assert_eq!(unique.len(), inner.coroutines().len());
    }
}
