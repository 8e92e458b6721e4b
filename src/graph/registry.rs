use std::sync::{Mutex, MutexGuard, PoisonError};

use petgraph::stable_graph::NodeIndex;

use super::RelationGraph;
use super::edge::Relation;
use super::node::VertexRole;

/// The narrow interface the scanner writes through: find-or-create a vertex
/// by name, and add a labeled edge.
///
/// Implementations shared between threads must make `find_or_create` atomic
/// so a name never maps to two vertices.
pub trait RelationSink {
    fn find_or_create(&self, name: &str, role: VertexRole) -> NodeIndex;
    fn add_relation(&self, from: NodeIndex, to: NodeIndex, relation: Relation);
}

/// A [`RelationGraph`] behind one coarse lock, shared by every scanner of a run.
///
/// Each call takes the lock for exactly one check-then-insert or one edge
/// insert; a scan never holds it across node visits.
#[derive(Default)]
pub struct SharedGraph {
    inner: Mutex<RelationGraph>,
}

impl SharedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the graph for reading. A poisoned lock is recovered: every write
    /// is a single insert, so the graph is never left half-updated.
    pub fn lock(&self) -> MutexGuard<'_, RelationGraph> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Consume the wrapper and return the graph once all scans are done.
    pub fn into_inner(self) -> RelationGraph {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RelationSink for SharedGraph {
    fn find_or_create(&self, name: &str, role: VertexRole) -> NodeIndex {
        self.lock().find_or_create(name, role)
    }

    fn add_relation(&self, from: NodeIndex, to: NodeIndex, relation: Relation) {
        self.lock().add_relation(from, to, relation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn test_concurrent_find_or_create_yields_one_vertex_per_name() {
        let shared = SharedGraph::new();
        let names = ["a", "b", "c", "d"];

        (0..400).into_par_iter().for_each(|i| {
            let name = names[i % names.len()];
            let role = if i % 2 == 0 {
                VertexRole::Module
            } else {
                VertexRole::Symbol
            };
            shared.find_or_create(name, role);
        });

        let graph = shared.into_inner();
        assert_eq!(graph.vertex_count(), 4);
        assert_eq!(graph.graph.node_count(), 4, "no duplicate vertices under contention");
    }

    #[test]
    fn test_repeated_calls_return_identical_handle() {
        let shared = SharedGraph::new();
        let first = shared.find_or_create("widget", VertexRole::Symbol);
        for _ in 0..10 {
            assert_eq!(shared.find_or_create("widget", VertexRole::Symbol), first);
        }
    }
}
