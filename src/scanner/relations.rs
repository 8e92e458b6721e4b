//! Pattern recognizers. Each one inspects a node the walk is already visiting
//! and, on an exact shape match, writes one edge from the file's module vertex.

use crate::ast::{ANONYMOUS_DELIMITER, Expression, Literal, VarNode, WRAPPER_NAME};
use crate::graph::edge::Relation;
use crate::graph::node::VertexRole;
use crate::graph::registry::RelationSink;
use crate::naming::canonical_name;

use super::Scanner;

impl<S: RelationSink + ?Sized> Scanner<'_, S> {
    fn relate(&mut self, relation: Relation, name: &str, role: VertexRole) {
        let target = self.sink.find_or_create(name, role);
        self.sink.add_relation(self.module, target, relation);
        self.emitted += 1;
    }

    /// `declares` for a named function, skipping the file wrapper and
    /// synthetic anonymous names.
    pub(super) fn declare(&mut self, name: &str) {
        if name == WRAPPER_NAME || name.contains(ANONYMOUS_DELIMITER) {
            return;
        }
        self.relate(Relation::Declares, name, VertexRole::Symbol);
    }

    /// `invokes` for every call whose callee is a plain identifier.
    pub(super) fn invoke(&mut self, callee: &str) {
        self.relate(Relation::Invokes, callee, VertexRole::Symbol);
    }

    /// `require(["./a", "./b"], cb)` / `define([...], factory)`: one `requires`
    /// edge per string element of the dependency array. Parentheses around the
    /// array or its elements are looked through.
    pub(super) fn match_requirement(&mut self, callee: &str, args: &[Expression]) {
        if !self.options.loader_functions.iter().any(|f| f == callee) {
            return;
        }
        let [first, _] = args else {
            return;
        };
        let Expression::Literal(Literal::Array(paths)) = first.strip_parens() else {
            return;
        };
        for path in paths {
            if let Expression::Literal(lit) = path.strip_parens()
                && let Some(path) = lit.as_str()
            {
                self.relate(Relation::Requires, canonical_name(path), VertexRole::Module);
            }
        }
    }

    /// `var self = new Base(...)`: the sentinel variable initialised from a
    /// unary-wrapped call on a plain identifier, ignoring parentheses.
    pub(super) fn match_extension(&mut self, var: &VarNode) {
        if var.name.name != self.options.extension_sentinel {
            return;
        }
        let Some(init) = &var.init else {
            return;
        };
        let Expression::Unary { operand, .. } = init.strip_parens() else {
            return;
        };
        let Expression::Call(call) = operand.strip_parens() else {
            return;
        };
        if let Expression::Ident(base) = call.callee.strip_parens() {
            self.relate(Relation::Extends, &base.name, VertexRole::Symbol);
        }
    }
}
