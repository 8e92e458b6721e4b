pub mod dot;
pub mod json;
pub mod model;

use std::collections::BTreeSet;

use petgraph::stable_graph::{EdgeIndex, NodeIndex};

use crate::graph::RelationGraph;

use model::{ExportFormat, ExportParams, ExportResult};

/// The vertices and edges that survive the export filters, in index order.
pub struct VisibleGraph {
    pub nodes: BTreeSet<NodeIndex>,
    pub edges: Vec<EdgeIndex>,
}

/// Export the relation graph to DOT or JSON.
///
/// Edges are kept when their relation passes the filter. With `prune_isolated`,
/// vertices that end up with no visible edge are dropped as well.
pub fn export_graph(graph: &RelationGraph, params: &ExportParams) -> anyhow::Result<ExportResult> {
    let visible = visible_graph(graph, params);

    let content = match params.format {
        ExportFormat::Dot => dot::render_dot(graph, &visible),
        ExportFormat::Json => json::render_json(graph, &visible)?,
    };

    Ok(ExportResult {
        content,
        node_count: visible.nodes.len(),
        edge_count: visible.edges.len(),
    })
}

fn visible_graph(graph: &RelationGraph, params: &ExportParams) -> VisibleGraph {
    let keep = |idx: EdgeIndex| {
        params.relations.is_empty() || params.relations.contains(&graph.graph[idx])
    };

    let edges: Vec<EdgeIndex> = graph.graph.edge_indices().filter(|&e| keep(e)).collect();

    let nodes: BTreeSet<NodeIndex> = if params.prune_isolated {
        edges
            .iter()
            .filter_map(|&e| graph.graph.edge_endpoints(e))
            .flat_map(|(a, b)| [a, b])
            .collect()
    } else {
        graph.graph.node_indices().collect()
    };

    VisibleGraph { nodes, edges }
}
