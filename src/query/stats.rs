use std::collections::BTreeMap;

use serde::Serialize;

use crate::graph::RelationGraph;
use crate::graph::edge::Relation;
use crate::graph::node::VertexRole;

/// Aggregated graph statistics.
#[derive(Debug, Serialize)]
pub struct GraphStats {
    pub vertex_count: usize,
    pub modules: usize,
    pub symbols: usize,
    /// Vertices referenced both as a module and as a symbol (shared-namespace merges).
    pub merged: usize,
    pub edge_count: usize,
    pub edges: BTreeMap<Relation, usize>,
    /// Symbols that are declared somewhere but never invoked or extended.
    pub uninvoked_declarations: usize,
}

/// Compute statistics from a built `RelationGraph`.
pub fn graph_stats(graph: &RelationGraph) -> GraphStats {
    let merged = graph
        .graph
        .node_indices()
        .filter(|&i| graph.graph[i].is_module && graph.graph[i].is_symbol)
        .count();

    let uninvoked_declarations = graph
        .graph
        .node_indices()
        .filter(|&i| {
            let incoming = graph.incoming(i);
            incoming.iter().any(|(r, _)| *r == Relation::Declares)
                && !incoming
                    .iter()
                    .any(|(r, _)| matches!(r, Relation::Invokes | Relation::Extends))
        })
        .count();

    GraphStats {
        vertex_count: graph.vertex_count(),
        modules: graph.role_count(VertexRole::Module),
        symbols: graph.role_count(VertexRole::Symbol),
        merged,
        edge_count: graph.graph.edge_count(),
        edges: graph.edges_by_relation(),
        uninvoked_declarations,
    }
}
