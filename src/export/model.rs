use crate::graph::edge::Relation;

/// Output format for graph export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum, serde::Serialize, serde::Deserialize)]
pub enum ExportFormat {
    /// Graphviz DOT format (default).
    Dot,
    /// Node and edge lists as JSON, for downstream tooling.
    Json,
}

/// Parameters controlling a graph export operation.
pub struct ExportParams {
    pub format: ExportFormat,
    /// Keep only these relations. Empty means all four.
    pub relations: Vec<Relation>,
    /// Drop vertices left without any edge after relation filtering.
    pub prune_isolated: bool,
}

/// Result of a graph export operation.
pub struct ExportResult {
    /// The rendered graph content (DOT or JSON text).
    pub content: String,
    /// Number of vertices in the exported graph.
    pub node_count: usize,
    /// Number of edges in the exported graph.
    pub edge_count: usize,
}
