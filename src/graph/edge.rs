use std::fmt;
use std::str::FromStr;

/// The label on a directed edge of the relation graph.
///
/// All edges leave a module vertex. Repeated occurrences in source produce
/// repeated edges; nothing is deduplicated at the edge level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    /// Module -> Symbol: a named function is defined in the module.
    Declares,
    /// Module -> Symbol: the module calls a function by plain identifier.
    Invokes,
    /// Module -> Symbol: the module's `self` is built from this constructor.
    Extends,
    /// Module -> Module: the module lists another in a `require`/`define` array.
    Requires,
}

impl Relation {
    pub const ALL: [Relation; 4] = [
        Relation::Declares,
        Relation::Invokes,
        Relation::Extends,
        Relation::Requires,
    ];

    /// The edge's `relation` property value.
    pub fn as_str(self) -> &'static str {
        match self {
            Relation::Declares => "declares",
            Relation::Invokes => "invokes",
            Relation::Extends => "extends",
            Relation::Requires => "requires",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Relation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Relation::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!("unknown relation {s:?} (expected declares, invokes, extends or requires)")
            })
    }
}
