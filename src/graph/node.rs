/// The role under which a vertex name has been referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VertexRole {
    /// Named from a source file path or a required module path.
    Module,
    /// Named from a function or identifier in source.
    Symbol,
}

/// A vertex of the relation graph.
///
/// Modules and symbols share one namespace keyed by `name`: a function named
/// like some module's basename lands on that module's vertex. The role flags
/// record every way the name has been referenced without splitting it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Vertex {
    /// Canonical name; unique across the graph.
    pub name: String,
    /// Referenced as a module at least once.
    pub is_module: bool,
    /// Referenced as a symbol at least once.
    pub is_symbol: bool,
}

impl Vertex {
    pub fn new(name: String, role: VertexRole) -> Self {
        let mut v = Self {
            name,
            is_module: false,
            is_symbol: false,
        };
        v.mark(role);
        v
    }

    /// Record another role for this vertex. Never changes identity.
    pub fn mark(&mut self, role: VertexRole) {
        match role {
            VertexRole::Module => self.is_module = true,
            VertexRole::Symbol => self.is_symbol = true,
        }
    }

    pub fn has_role(&self, role: VertexRole) -> bool {
        match role {
            VertexRole::Module => self.is_module,
            VertexRole::Symbol => self.is_symbol,
        }
    }

    /// Short display tag: `module`, `symbol`, or `module+symbol`.
    pub fn role_label(&self) -> &'static str {
        match (self.is_module, self.is_symbol) {
            (true, true) => "module+symbol",
            (true, false) => "module",
            _ => "symbol",
        }
    }
}
