//! Optional petgraph compatibility layer.
//!
//! Converts any container's resolved link set into petgraph's `DiGraph`
//! for analysis with petgraph's algorithm library, plus Graphviz DOT
//! export for visualization.
//!
//! # Feature Gate
//!
//! Only available with the `petgraph-compat` feature:
//!
//! ```toml
//! [dependencies]
//! wiregraph = { version = "0.1", features = ["petgraph-compat"] }
//! ```
//!
//! # Examples
//!
//! ```ignore
//! use wiregraph::petgraph_compat::{to_dot, to_petgraph};
//!
//! let pipeline = Pipeline::new([first, second])?;
//! let conversion = to_petgraph(&*pipeline.borrow());
//! assert!(petgraph::algo::is_cyclic_directed(&conversion.graph));
//!
//! let dot = to_dot(&*pipeline.borrow());
//! std::fs::write("wiring.dot", dot)?;
//! // Then: dot -Tpng wiring.dot -o wiring.png
//! ```

use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;

use crate::component::EntityId;
use crate::containers::Container;
use crate::mailbox::Mailbox;

/// A petgraph-compatible directed graph of a container's wiring.
///
/// Node weights are entity identities; edge weights are the
/// `(source mailbox, sink mailbox)` pair of the link.
pub type WireDiGraph = DiGraph<EntityId, (Mailbox, Mailbox)>;

/// Mapping from entity identity to petgraph NodeIndex.
pub type EntityIndexMap = FxHashMap<EntityId, NodeIndex>;

/// Result of converting a container to petgraph format.
#[derive(Debug, Clone)]
pub struct PetgraphConversion {
    /// The petgraph directed graph.
    pub graph: WireDiGraph,
    /// Mapping from entity identity to petgraph NodeIndex.
    pub index_map: EntityIndexMap,
}

impl PetgraphConversion {
    /// Look up the petgraph index for an entity.
    #[must_use]
    pub fn index_of(&self, entity: EntityId) -> Option<NodeIndex> {
        self.index_map.get(&entity).copied()
    }
}

/// Convert a container's wiring to a petgraph DiGraph.
///
/// Nodes are added in `coroutines` order (the container itself first),
/// so indices are deterministic for a deterministically built container.
#[must_use]
pub fn to_petgraph(container: &dyn Container) -> PetgraphConversion {
    let mut graph = DiGraph::new();
    let mut index_map: EntityIndexMap = FxHashMap::default();

    for entity in container.coroutines() {
        let id = EntityId::of(&entity);
        let index = graph.add_node(id);
        index_map.insert(id, index);
    }

    for link in container.links() {
        let source = index_map[&EntityId::of(&link.source)];
        let sink = index_map[&EntityId::of(&link.sink)];
        graph.add_edge(source, sink, (link.source_mailbox, link.sink_mailbox));
    }

    PetgraphConversion { graph, index_map }
}

/// Export a container's wiring to DOT format for visualization.
///
/// Nodes are labeled by their position in `coroutines` (position 0 is
/// the container itself); edges are labeled
/// `source mailbox -> sink mailbox`.
#[must_use]
pub fn to_dot(container: &dyn Container) -> String {
    use std::fmt::Write;

    let conversion = to_petgraph(container);
    let mut output = String::new();

    writeln!(output, "digraph {{").unwrap();
    writeln!(output, "    rankdir=LR;").unwrap();
    writeln!(output, "    node [shape=box, style=rounded];").unwrap();

    for index in conversion.graph.node_indices() {
        let label = if index.index() == 0 {
            "container".to_string()
        } else {
            format!("c{}", index.index())
        };
        writeln!(output, "    {} [ label=\"{label}\" ];", index.index()).unwrap();
    }

    writeln!(output).unwrap();

    for edge in conversion.graph.edge_indices() {
        let (from, to) = conversion.graph.edge_endpoints(edge).unwrap();
        let (outbox, inbox) = &conversion.graph[edge];
        writeln!(
            output,
            "    {} -> {} [ label=\"{outbox} -> {inbox}\" ];",
            from.index(),
            to.index()
        )
        .unwrap();
    }

    writeln!(output, "}}").unwrap();

    output
}
