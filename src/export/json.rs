use serde::Serialize;

use crate::export::VisibleGraph;
use crate::graph::RelationGraph;
use crate::graph::edge::Relation;

#[derive(Serialize)]
struct JsonVertex<'a> {
    id: usize,
    name: &'a str,
    module: bool,
    symbol: bool,
}

#[derive(Serialize)]
struct JsonEdge<'a> {
    from: &'a str,
    to: &'a str,
    relation: Relation,
}

#[derive(Serialize)]
struct JsonGraph<'a> {
    vertices: Vec<JsonVertex<'a>>,
    edges: Vec<JsonEdge<'a>>,
}

/// Render the visible part of the graph as pretty-printed JSON.
pub fn render_json(graph: &RelationGraph, visible: &VisibleGraph) -> anyhow::Result<String> {
    let vertices = visible
        .nodes
        .iter()
        .map(|&idx| {
            let v = &graph.graph[idx];
            JsonVertex {
                id: idx.index(),
                name: &v.name,
                module: v.is_module,
                symbol: v.is_symbol,
            }
        })
        .collect();

    let edges = visible
        .edges
        .iter()
        .filter_map(|&e| {
            let (src, tgt) = graph.graph.edge_endpoints(e)?;
            Some(JsonEdge {
                from: &graph.graph[src].name,
                to: &graph.graph[tgt].name,
                relation: graph.graph[e],
            })
        })
        .collect();

    Ok(serde_json::to_string_pretty(&JsonGraph { vertices, edges })?)
}

#[cfg(test)]
mod tests {
    use crate::export::export_graph;
    use crate::export::model::{ExportFormat, ExportParams};
    use crate::graph::RelationGraph;
    use crate::graph::edge::Relation;
    use crate::graph::node::VertexRole;

    #[test]
    fn test_render_json_shape() {
        let mut g = RelationGraph::new();
        let app = g.find_or_create("app", VertexRole::Module);
        let start = g.find_or_create("start", VertexRole::Symbol);
        g.add_relation(app, start, Relation::Declares);

        let params = ExportParams {
            format: ExportFormat::Json,
            relations: vec![],
            prune_isolated: false,
        };
        let content = export_graph(&g, &params).unwrap().content;
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();

        assert_eq!(value["vertices"].as_array().unwrap().len(), 2);
        assert_eq!(value["vertices"][0]["name"], "app");
        assert_eq!(value["vertices"][0]["module"], true);
        assert_eq!(value["edges"][0]["from"], "app");
        assert_eq!(value["edges"][0]["to"], "start");
        assert_eq!(value["edges"][0]["relation"], "declares");
    }
}
