use anyhow::Result;
use regex::RegexBuilder;
use serde::Serialize;

use crate::graph::RelationGraph;
use crate::graph::edge::Relation;

/// One relation endpoint as seen from the queried vertex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationEntry {
    pub relation: Relation,
    pub name: String,
    /// Number of parallel edges collapsed into this entry.
    pub count: usize,
}

/// Everything a single vertex declares/invokes/extends/requires, and what points at it.
#[derive(Debug, Clone, Serialize)]
pub struct ShowResult {
    pub name: String,
    pub role: &'static str,
    pub outgoing: Vec<RelationEntry>,
    pub incoming: Vec<RelationEntry>,
}

/// Show the relations of every vertex whose name matches `pattern`.
///
/// - `case_insensitive`: enable case-insensitive regex matching
/// - `relation_filter`: if non-empty, only relations in this list are reported
///
/// Parallel edges are collapsed into one entry with a count. Results are sorted by name.
pub fn show_relations(
    graph: &RelationGraph,
    pattern: &str,
    case_insensitive: bool,
    relation_filter: &[Relation],
) -> Result<Vec<ShowResult>> {
    let re = RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| anyhow::anyhow!("invalid name pattern '{}': {}", pattern, e))?;

    let keep = |r: Relation| relation_filter.is_empty() || relation_filter.contains(&r);

    let mut results: Vec<ShowResult> = graph
        .name_index
        .iter()
        .filter(|(name, _)| re.is_match(name))
        .map(|(name, &idx)| ShowResult {
            name: name.clone(),
            role: graph.graph[idx].role_label(),
            outgoing: collapse(
                graph
                    .outgoing(idx)
                    .into_iter()
                    .filter(|(r, _)| keep(*r))
                    .map(|(r, v)| (r, v.name.as_str())),
            ),
            incoming: collapse(
                graph
                    .incoming(idx)
                    .into_iter()
                    .filter(|(r, _)| keep(*r))
                    .map(|(r, v)| (r, v.name.as_str())),
            ),
        })
        .collect();

    results.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(results)
}

/// Merge runs of identical `(relation, name)` pairs. Input must already be sorted.
fn collapse<'a>(pairs: impl Iterator<Item = (Relation, &'a str)>) -> Vec<RelationEntry> {
    let mut out: Vec<RelationEntry> = Vec::new();
    for (relation, name) in pairs {
        match out.last_mut() {
            Some(last) if last.relation == relation && last.name == name => last.count += 1,
            _ => out.push(RelationEntry {
                relation,
                name: name.to_owned(),
                count: 1,
            }),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::VertexRole;

    fn sample() -> RelationGraph {
        let mut g = RelationGraph::new();
        let app = g.find_or_create("app", VertexRole::Module);
        let util = g.find_or_create("util", VertexRole::Module);
        let start = g.find_or_create("start", VertexRole::Symbol);
        let log = g.find_or_create("log", VertexRole::Symbol);
        g.add_relation(app, util, Relation::Requires);
        g.add_relation(app, start, Relation::Declares);
        g.add_relation(app, log, Relation::Invokes);
        g.add_relation(app, log, Relation::Invokes);
        g.add_relation(util, log, Relation::Invokes);
        g
    }

    #[test]
    fn test_show_collapses_parallel_edges() {
        let graph = sample();
        let results = show_relations(&graph, "^app$", false, &[]).unwrap();
        assert_eq!(results.len(), 1);
        let app = &results[0];
        assert_eq!(app.role, "module");
        assert_eq!(
            app.outgoing,
            vec![
                RelationEntry { relation: Relation::Declares, name: "start".into(), count: 1 },
                RelationEntry { relation: Relation::Invokes, name: "log".into(), count: 2 },
                RelationEntry { relation: Relation::Requires, name: "util".into(), count: 1 },
            ]
        );
        assert!(app.incoming.is_empty());
    }

    #[test]
    fn test_show_incoming_and_filter() {
        let graph = sample();
        let results = show_relations(&graph, "LOG", true, &[Relation::Invokes]).unwrap();
        assert_eq!(results.len(), 1);
        let names: Vec<(&str, usize)> = results[0]
            .incoming
            .iter()
            .map(|e| (e.name.as_str(), e.count))
            .collect();
        assert_eq!(names, vec![("app", 2), ("util", 1)]);

        let util = show_relations(&graph, "^util$", false, &[Relation::Declares]).unwrap();
        assert!(util[0].incoming.is_empty(), "requires edge filtered out");
    }

    #[test]
    fn test_show_invalid_pattern_is_an_error() {
        let graph = sample();
        let err = show_relations(&graph, "(", false, &[]).unwrap_err();
        assert!(err.to_string().contains("invalid name pattern"));
    }
}
