//! Benchmarks for container construction and flattening.
//!
//! These benchmarks measure the performance of:
//! - Pipeline construction (link derivation + resolution) at width
//! - Graphline construction from explicit raw links at width
//! - Flattening nested pipelines at depth

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use wiregraph::adapters::Passthrough;
use wiregraph::component::{entity, Entity};
use wiregraph::containers::{Container, Graphline, Pipeline};
use wiregraph::links::{Endpoint, RawLink};

fn stages(count: usize) -> Vec<Entity> {
    (0..count).map(|_| entity(Passthrough::new())).collect()
}

/// Raw links for a linear chain wired through the boundary.
fn chain_links(nodes: &[Entity]) -> Vec<RawLink> {
    let mut links = Vec::with_capacity(nodes.len() * 2 + 2);
    for pair in nodes.windows(2) {
        links.push(RawLink::new(&pair[0], "outbox", &pair[1], "inbox"));
        links.push(RawLink::new(&pair[0], "signal", &pair[1], "control"));
    }
    let first = &nodes[0];
    let last = &nodes[nodes.len() - 1];
    links.push(RawLink::new(Endpoint::Boundary, "inbox", first, "inbox"));
    links.push(RawLink::new(last, "outbox", Endpoint::Boundary, "outbox"));
    links
}

fn bench_pipeline_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_build");
    for width in [4, 16, 64, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, &width| {
            b.iter(|| Pipeline::new(stages(width)).unwrap());
        });
    }
    group.finish();
}

fn bench_graphline_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("graphline_build");
    for width in [4, 16, 64, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, &width| {
            b.iter(|| {
                let nodes = stages(width);
                Graphline::new(chain_links(&nodes)).unwrap()
            });
        });
    }
    group.finish();
}

fn bench_nested_flattening(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_flattening");
    for depth in [2, 8, 32] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter(|| {
                let mut current = Pipeline::new(stages(2)).unwrap();
                for _ in 1..depth {
                    let head = entity(Passthrough::new());
                    let nested: Entity = current.clone();
                    current = Pipeline::new([head, nested]).unwrap();
                }
                let inner = current.borrow();
                (inner.coroutines().len(), inner.links().len())
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_pipeline_build,
    bench_graphline_build,
    bench_nested_flattening
);
criterion_main!(benches);
