pub mod edge;
pub mod node;
pub mod registry;

use std::collections::{BTreeMap, HashMap};

use petgraph::Directed;
use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;

use edge::Relation;
use node::{Vertex, VertexRole};

/// The in-memory relation graph: a directed petgraph StableGraph plus the
/// name -> vertex index that makes names unique.
pub struct RelationGraph {
    /// The underlying directed multigraph, parameterised over vertices and relation labels.
    pub graph: StableGraph<Vertex, Relation, Directed>,
    /// Maps canonical names to their vertex. One entry per distinct name.
    pub name_index: HashMap<String, NodeIndex>,
}

impl RelationGraph {
    /// Create an empty relation graph.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            name_index: HashMap::new(),
        }
    }

    /// Return the vertex for `name`, creating it on first use.
    ///
    /// Repeated calls with the same name return the same index whatever the
    /// role; the role is only recorded on the vertex.
    pub fn find_or_create(&mut self, name: &str, role: VertexRole) -> NodeIndex {
        if let Some(&existing) = self.name_index.get(name) {
            self.graph[existing].mark(role);
            return existing;
        }
        let idx = self.graph.add_node(Vertex::new(name.to_owned(), role));
        self.name_index.insert(name.to_owned(), idx);
        idx
    }

    /// Add a labeled edge. Parallel edges with the same label are kept.
    pub fn add_relation(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
        relation: Relation,
    ) -> EdgeIndex {
        self.graph.add_edge(from, to, relation)
    }

    /// Look up a vertex by exact name.
    #[cfg(test)]
    pub fn vertex(&self, name: &str) -> Option<NodeIndex> {
        self.name_index.get(name).copied()
    }

    /// Outgoing `(relation, target)` pairs of `idx`, sorted by relation then target name.
    pub fn outgoing(&self, idx: NodeIndex) -> Vec<(Relation, &Vertex)> {
        self.neighbours(idx, Direction::Outgoing)
    }

    /// Incoming `(relation, source)` pairs of `idx`, sorted by relation then source name.
    pub fn incoming(&self, idx: NodeIndex) -> Vec<(Relation, &Vertex)> {
        self.neighbours(idx, Direction::Incoming)
    }

    fn neighbours(&self, idx: NodeIndex, dir: Direction) -> Vec<(Relation, &Vertex)> {
        let mut out: Vec<(Relation, &Vertex)> = self
            .graph
            .edges_directed(idx, dir)
            .map(|e| {
                let other = match dir {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                (*e.weight(), &self.graph[other])
            })
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.name.cmp(&b.1.name)));
        out
    }

    /// Number of edges from `from` to `to` labeled `relation`.
    #[cfg(test)]
    pub fn count_relations(&self, from: NodeIndex, to: NodeIndex, relation: Relation) -> usize {
        self.graph
            .edges_directed(from, Direction::Outgoing)
            .filter(|e| e.target() == to && *e.weight() == relation)
            .count()
    }

    /// Number of distinct vertices.
    pub fn vertex_count(&self) -> usize {
        self.name_index.len()
    }

    /// Number of vertices referenced under `role` (a merged vertex counts for both roles).
    pub fn role_count(&self, role: VertexRole) -> usize {
        self.graph
            .node_indices()
            .filter(|&i| self.graph[i].has_role(role))
            .count()
    }

    /// Edge count broken down by relation. Every relation is present, possibly with 0.
    pub fn edges_by_relation(&self) -> BTreeMap<Relation, usize> {
        let mut map: BTreeMap<Relation, usize> =
            Relation::ALL.into_iter().map(|r| (r, 0)).collect();
        for e in self.graph.edge_indices() {
            *map.entry(self.graph[e]).or_insert(0) += 1;
        }
        map
    }
}

impl Default for RelationGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_or_create_is_idempotent() {
        let mut graph = RelationGraph::new();
        let a = graph.find_or_create("app", VertexRole::Module);
        let b = graph.find_or_create("app", VertexRole::Module);
        assert_eq!(a, b, "same name should return the same vertex");
        assert_eq!(graph.vertex_count(), 1);
        assert_eq!(graph.graph.node_count(), 1);
    }

    #[test]
    fn test_module_and_symbol_share_namespace() {
        let mut graph = RelationGraph::new();
        let module = graph.find_or_create("util", VertexRole::Module);
        let symbol = graph.find_or_create("util", VertexRole::Symbol);
        assert_eq!(module, symbol, "a symbol named like a module merges onto it");
        let v = &graph.graph[module];
        assert!(v.is_module && v.is_symbol);
        assert_eq!(v.role_label(), "module+symbol");
        assert_eq!(graph.role_count(VertexRole::Module), 1);
        assert_eq!(graph.role_count(VertexRole::Symbol), 1);
    }

    #[test]
    fn test_parallel_edges_are_kept() {
        let mut graph = RelationGraph::new();
        let m = graph.find_or_create("main", VertexRole::Module);
        let f = graph.find_or_create("log", VertexRole::Symbol);
        graph.add_relation(m, f, Relation::Invokes);
        graph.add_relation(m, f, Relation::Invokes);
        graph.add_relation(m, f, Relation::Declares);
        assert_eq!(graph.count_relations(m, f, Relation::Invokes), 2);
        assert_eq!(graph.count_relations(m, f, Relation::Declares), 1);
        let breakdown = graph.edges_by_relation();
        assert_eq!(breakdown[&Relation::Invokes], 2);
        assert_eq!(breakdown[&Relation::Extends], 0);
    }

    #[test]
    fn test_outgoing_and_incoming_are_sorted() {
        let mut graph = RelationGraph::new();
        let m = graph.find_or_create("main", VertexRole::Module);
        let z = graph.find_or_create("zed", VertexRole::Symbol);
        let a = graph.find_or_create("alpha", VertexRole::Symbol);
        graph.add_relation(m, z, Relation::Invokes);
        graph.add_relation(m, a, Relation::Invokes);
        graph.add_relation(m, z, Relation::Declares);

        let out: Vec<(Relation, &str)> = graph
            .outgoing(m)
            .into_iter()
            .map(|(r, v)| (r, v.name.as_str()))
            .collect();
        assert_eq!(
            out,
            vec![
                (Relation::Declares, "zed"),
                (Relation::Invokes, "alpha"),
                (Relation::Invokes, "zed"),
            ]
        );

        let into_zed = graph.incoming(z);
        assert_eq!(into_zed.len(), 2);
        assert!(into_zed.iter().all(|(_, v)| v.name == "main"));
    }
}
