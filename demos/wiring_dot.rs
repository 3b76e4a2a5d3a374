//! Demo: exporting a container's wiring as Graphviz DOT.
//!
//! Builds a pipeline with a nested pipeline inside it, converts the
//! flattened wiring to petgraph form, and prints the DOT rendering.
//!
//! Running This Demo:
//! ```bash
//! cargo run --example wiring_dot --features petgraph-compat
//! ```

use miette::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use wiregraph::adapters::Passthrough;
use wiregraph::component::{Entity, entity};
use wiregraph::containers::{Container, Pipeline};
use wiregraph::petgraph_compat::{to_dot, to_petgraph};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,wiregraph=info"))
        .unwrap();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let inner = Pipeline::new([entity(Passthrough::new()), entity(Passthrough::new())])?;
    let inner_entity: Entity = inner.clone();
    let outer = Pipeline::new([
        entity(Passthrough::new()),
        inner_entity,
        entity(Passthrough::new()),
    ])?;

    let outer_ref = outer.borrow();
    let conversion = to_petgraph(&*outer_ref);
    info!(
        nodes = conversion.graph.node_count(),
        edges = conversion.graph.edge_count(),
        "flattened wiring"
    );

    println!("{}", to_dot(&*outer_ref));
    Ok(())
}
