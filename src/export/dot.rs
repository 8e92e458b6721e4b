use std::fmt::Write;

use crate::export::VisibleGraph;
use crate::graph::RelationGraph;
use crate::graph::edge::Relation;
use crate::graph::node::Vertex;

/// Escape a vertex name for use inside a double-quoted DOT label.
pub fn escape_label(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// DOT fillcolor and shape for a vertex, keyed on the roles it carries.
fn vertex_style(v: &Vertex) -> (&'static str, &'static str) {
    match (v.is_module, v.is_symbol) {
        (true, true) => ("#F9E79F", "box"),
        (true, false) => ("#A9DFBF", "box"),
        (false, true) => ("#AED6F1", "ellipse"),
        (false, false) => ("#EAECEE", "ellipse"),
    }
}

/// DOT edge style attributes for a given relation.
fn edge_style(relation: Relation) -> &'static str {
    match relation {
        Relation::Declares => "style=dashed color=gray40",
        Relation::Invokes => "style=solid color=blue",
        Relation::Extends => "style=solid arrowhead=onormal",
        Relation::Requires => "style=dotted",
    }
}

/// Render the visible part of the graph as DOT. Parallel edges are emitted once each.
pub fn render_dot(graph: &RelationGraph, visible: &VisibleGraph) -> String {
    let mut out = String::new();
    writeln!(out, "digraph relgraph {{").unwrap();
    writeln!(out, "    rankdir=LR;").unwrap();
    writeln!(out, "    node [style=filled fontname=monospace];").unwrap();

    for &idx in &visible.nodes {
        let v = &graph.graph[idx];
        let (color, shape) = vertex_style(v);
        writeln!(
            out,
            "    n{} [label=\"{}\" shape={} fillcolor=\"{}\"];",
            idx.index(),
            escape_label(&v.name),
            shape,
            color
        )
        .unwrap();
    }

    for &e in &visible.edges {
        let Some((src, tgt)) = graph.graph.edge_endpoints(e) else {
            continue;
        };
        let relation = graph.graph[e];
        writeln!(
            out,
            "    n{} -> n{} [label=\"{}\" {}];",
            src.index(),
            tgt.index(),
            relation,
            edge_style(relation)
        )
        .unwrap();
    }

    writeln!(out, "}}").unwrap();
    out
}
