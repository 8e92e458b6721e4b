//! Relation extraction: a recursive walk over one file's syntax tree that
//! writes `declares` / `invokes` / `extends` / `requires` edges into a shared
//! [`RelationSink`] as it goes.
//!
//! One [`Scanner`] is built per source file, bound to that file's module
//! vertex. Edges are written incrementally; if the walk fails part-way, the
//! edges emitted so far stay in the graph.

mod expression;
mod relations;

use std::fmt;

use petgraph::stable_graph::NodeIndex;
use serde::Deserialize;
use thiserror::Error;

use crate::ast::{
    Block, CaseNode, CatchNode, DEFAULT_MAX_DEPTH, FunctionNode, Ident, Statement, VarNode,
};
use crate::graph::node::VertexRole;
use crate::graph::registry::RelationSink;
use crate::naming::canonical_name;

/// Which dispatch family an unsupported node was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeFamily {
    Statement,
    Expression,
}

impl fmt::Display for ShapeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeFamily::Statement => f.write_str("statement"),
            ShapeFamily::Expression => f.write_str("expression"),
        }
    }
}

/// The walk hit a node it has no rule for. Fatal for the current file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("unsupported {family} shape `{kind}`")]
    UnsupportedShape { family: ShapeFamily, kind: String },
    #[error("unsupported syntax shape: nesting exceeds {limit} levels")]
    TooDeep { limit: usize },
}

/// Pattern-recognition knobs, loaded from the `[scan]` table of `relgraph.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Variable name whose `new Base(...)` initializer marks inheritance.
    pub extension_sentinel: String,
    /// Callee names treated as AMD-style loaders: `require([...], cb)`.
    pub loader_functions: Vec<String>,
    /// Maximum statement/expression nesting before the walk gives up.
    pub max_depth: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extension_sentinel: "self".to_owned(),
            loader_functions: vec!["require".to_owned(), "define".to_owned()],
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Walks one file's tree and records its relations.
pub struct Scanner<'a, S: RelationSink + ?Sized> {
    sink: &'a S,
    options: &'a ScanOptions,
    module: NodeIndex,
    depth: usize,
    emitted: usize,
}

impl<'a, S: RelationSink + ?Sized> Scanner<'a, S> {
    /// Bind a scanner to the module vertex named after `relative_path`.
    pub fn new(sink: &'a S, relative_path: &str, options: &'a ScanOptions) -> Self {
        let module = sink.find_or_create(canonical_name(relative_path), VertexRole::Module);
        Self {
            sink,
            options,
            module,
            depth: 0,
            emitted: 0,
        }
    }

    /// Number of edges written so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Walk a file's top-level function to completion.
    pub fn scan(&mut self, root: &FunctionNode) -> Result<(), ScanError> {
        self.visit_function(root)
    }

    fn enter(&mut self) -> Result<(), ScanError> {
        if self.depth >= self.options.max_depth {
            return Err(ScanError::TooDeep {
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn visit_function(&mut self, node: &FunctionNode) -> Result<(), ScanError> {
        if let Some(name) = node.name() {
            self.declare(name);
        }
        self.visit_block(&node.body)?;
        if let Some(ident) = &node.ident {
            self.visit_ident(ident);
        }
        for param in &node.params {
            self.visit_ident(param);
        }
        Ok(())
    }

    // Identifiers carry no relation of their own.
    fn visit_ident(&mut self, _ident: &Ident) {}

    fn visit_block(&mut self, block: &Block) -> Result<(), ScanError> {
        for stmt in &block.statements {
            self.visit_statement(stmt)?;
        }
        Ok(())
    }

    fn visit_opt_block(&mut self, block: Option<&Block>) -> Result<(), ScanError> {
        match block {
            Some(b) => self.visit_block(b),
            None => Ok(()),
        }
    }

    fn visit_statement(&mut self, stmt: &Statement) -> Result<(), ScanError> {
        self.enter()?;
        let result = self.dispatch_statement(stmt);
        self.leave();
        result
    }

    fn dispatch_statement(&mut self, stmt: &Statement) -> Result<(), ScanError> {
        match stmt {
            Statement::Var(var) => self.visit_var(var),
            Statement::Return(exp) => self.visit_opt_expression(exp.as_ref()),
            Statement::If { test, pass, fail } => {
                self.visit_expression(test)?;
                self.visit_block(pass)?;
                self.visit_opt_block(fail.as_ref())
            }
            Statement::For {
                init,
                test,
                modify,
                body,
            } => {
                self.visit_opt_expression(init.as_ref())?;
                self.visit_opt_expression(test.as_ref())?;
                self.visit_opt_expression(modify.as_ref())?;
                self.visit_block(body)
            }
            Statement::While { test, body } => {
                self.visit_expression(test)?;
                self.visit_block(body)
            }
            Statement::Expression(exp) => self.visit_expression(exp),
            Statement::Block(block) => self.visit_block(block),
            Statement::Try {
                body,
                catch_blocks,
                finally,
            } => {
                self.visit_block(body)?;
                for blk in catch_blocks {
                    self.visit_block(blk)?;
                }
                self.visit_opt_block(finally.as_ref())
            }
            Statement::Catch(catch) => self.visit_catch(catch),
            Statement::Break { label } | Statement::Continue { label } => {
                if let Some(label) = label {
                    self.visit_ident(label);
                }
                Ok(())
            }
            Statement::Throw(exp) => self.visit_expression(exp),
            Statement::Switch {
                discriminant,
                cases,
            } => {
                self.visit_expression(discriminant)?;
                for case in cases {
                    self.visit_statement(case)?;
                }
                Ok(())
            }
            Statement::Case(case) => self.visit_case(case),
            Statement::Unsupported { kind } => Err(ScanError::UnsupportedShape {
                family: ShapeFamily::Statement,
                kind: kind.clone(),
            }),
        }
    }

    // var x = y;
    fn visit_var(&mut self, var: &VarNode) -> Result<(), ScanError> {
        self.match_extension(var);
        self.visit_ident(&var.name);
        self.visit_opt_expression(var.init.as_ref())
    }

    fn visit_catch(&mut self, catch: &CatchNode) -> Result<(), ScanError> {
        self.visit_block(&catch.body)?;
        if let Some(ex) = &catch.exception {
            self.visit_ident(ex);
        }
        self.visit_opt_expression(catch.condition.as_ref())
    }

    fn visit_case(&mut self, case: &CaseNode) -> Result<(), ScanError> {
        self.visit_opt_expression(case.test.as_ref())?;
        self.visit_block(&case.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expression, Literal, Property};
    use crate::graph::RelationGraph;
    use crate::graph::edge::Relation;
    use crate::graph::registry::SharedGraph;

    fn call(name: &str) -> Expression {
        Expression::call(Expression::ident(name), vec![])
    }

    fn stmt(name: &str) -> Statement {
        Statement::Expression(call(name))
    }

    fn block(names: &[&str]) -> Block {
        Block::new(names.iter().map(|n| stmt(n)).collect())
    }

    fn invoked(graph: &RelationGraph, module: &str) -> Vec<String> {
        let idx = graph.vertex(module).expect("module vertex");
        graph
            .outgoing(idx)
            .into_iter()
            .filter(|(r, _)| *r == Relation::Invokes)
            .map(|(_, v)| v.name.clone())
            .collect()
    }

    fn run(statements: Vec<Statement>) -> (RelationGraph, Result<(), ScanError>) {
        let shared = SharedGraph::new();
        let options = ScanOptions::default();
        let root = FunctionNode::wrapper(Block::new(statements));
        let result = Scanner::new(&shared, "app/main.js", &options).scan(&root);
        (shared.into_inner(), result)
    }

    #[test]
    fn test_every_statement_shape_is_traversed() {
        let statements = vec![
            Statement::Var(VarNode {
                name: Ident::new("x"),
                init: Some(call("v1")),
            }),
            Statement::Return(Some(call("v2"))),
            Statement::If {
                test: call("v3"),
                pass: block(&["v4"]),
                fail: Some(block(&["v5"])),
            },
            Statement::For {
                init: Some(call("v6")),
                test: Some(call("v7")),
                modify: Some(call("v8")),
                body: block(&["v9"]),
            },
            Statement::While {
                test: call("v10"),
                body: block(&["v11"]),
            },
            Statement::Block(block(&["v12"])),
            Statement::Try {
                body: block(&["v13"]),
                catch_blocks: vec![Block::new(vec![Statement::Catch(CatchNode {
                    exception: Some(Ident::new("e")),
                    condition: Some(call("v14")),
                    body: block(&["v15"]),
                })])],
                finally: Some(block(&["v16"])),
            },
            Statement::Throw(call("v17")),
            Statement::Switch {
                discriminant: call("v18"),
                cases: vec![
                    Statement::Case(CaseNode {
                        test: Some(call("v19")),
                        body: block(&["v20"]),
                    }),
                    Statement::Case(CaseNode {
                        test: None,
                        body: block(&["v21"]),
                    }),
                ],
            },
            Statement::Case(CaseNode {
                test: Some(call("v22")),
                body: Block::default(),
            }),
            Statement::Break {
                label: Some(Ident::new("outer")),
            },
            Statement::Continue { label: None },
        ];
        let (graph, result) = run(statements);
        assert!(result.is_ok());
        let mut names = invoked(&graph, "main");
        names.sort_by_key(|n| n[1..].parse::<u32>().unwrap());
        let expected: Vec<String> = (1..=22).map(|i| format!("v{i}")).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_absent_children_are_no_ops() {
        let statements = vec![
            Statement::Return(None),
            Statement::If {
                test: Expression::ident("flag"),
                pass: Block::default(),
                fail: None,
            },
            Statement::For {
                init: None,
                test: None,
                modify: None,
                body: Block::default(),
            },
            Statement::Try {
                body: Block::default(),
                catch_blocks: vec![],
                finally: None,
            },
        ];
        let (graph, result) = run(statements);
        assert!(result.is_ok());
        assert_eq!(graph.graph.edge_count(), 0);
    }

    #[test]
    fn test_every_expression_shape_is_traversed() {
        let exp = Expression::Object(vec![Property {
            key: Expression::string("k"),
            value: Expression::Ternary {
                test: Box::new(call("t1")),
                consequent: Box::new(Expression::binary("+", call("t2"), call("t3"))),
                alternate: Box::new(Expression::Index {
                    base: Box::new(Expression::access(call("t4"), "prop")),
                    index: Box::new(Expression::unary("!", call("t5"))),
                }),
            },
        }]);
        let literals = Expression::Literal(Literal::Array(vec![
            Expression::Literal(Literal::Expression(Box::new(call("t6")))),
            Expression::Literal(Literal::Regex {
                pattern: "a+".into(),
                flags: "g".into(),
            }),
            Expression::Literal(Literal::Null),
            Expression::Literal(Literal::Boolean(true)),
        ]));
        let callback = Expression::function(FunctionNode {
            ident: Some(Ident::new("L:9")),
            params: vec![Ident::new("err")],
            body: block(&["t7"]),
        });
        let outer = Expression::call(call("t8"), vec![exp, literals, callback]);
        let (graph, result) = run(vec![Statement::Expression(outer)]);
        assert!(result.is_ok());
        let mut names = invoked(&graph, "main");
        names.sort();
        assert_eq!(names, vec!["t1", "t2", "t3", "t4", "t5", "t6", "t7", "t8"]);
    }

    #[test]
    fn test_unsupported_statement_aborts_and_keeps_earlier_edges() {
        let (graph, result) = run(vec![
            stmt("before"),
            Statement::Unsupported {
                kind: "class_declaration".into(),
            },
            stmt("after"),
        ]);
        assert_eq!(
            result,
            Err(ScanError::UnsupportedShape {
                family: ShapeFamily::Statement,
                kind: "class_declaration".into(),
            })
        );
        assert_eq!(invoked(&graph, "main"), vec!["before"]);
        assert!(graph.vertex("after").is_none());
    }

    #[test]
    fn test_unsupported_expression_aborts() {
        let exp = Expression::call(
            Expression::ident("render"),
            vec![Expression::Unsupported {
                kind: "spread_element".into(),
            }],
        );
        let (graph, result) = run(vec![Statement::Expression(exp)]);
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "unsupported expression shape `spread_element`");
        // The invocation was emitted before the arguments were reached.
        assert_eq!(invoked(&graph, "main"), vec!["render"]);
    }

    #[test]
    fn test_nesting_limit_is_fatal() {
        let mut exp = Expression::ident("leaf");
        for _ in 0..50 {
            exp = Expression::unary("!", exp);
        }
        let shared = SharedGraph::new();
        let options = ScanOptions {
            max_depth: 20,
            ..ScanOptions::default()
        };
        let root = FunctionNode::wrapper(Block::new(vec![Statement::Expression(exp)]));
        let result = Scanner::new(&shared, "deep.js", &options).scan(&root);
        assert_eq!(result, Err(ScanError::TooDeep { limit: 20 }));
    }

    #[test]
    fn test_scanners_for_same_basename_share_module_vertex() {
        let shared = SharedGraph::new();
        let options = ScanOptions::default();
        let root = FunctionNode::wrapper(block(&["boot"]));
        Scanner::new(&shared, "pkg-a/index.js", &options).scan(&root).unwrap();
        Scanner::new(&shared, "pkg-b/index.js", &options).scan(&root).unwrap();

        let graph = shared.into_inner();
        assert_eq!(graph.vertex_count(), 2, "one `index` module, one `boot` symbol");
        let index = graph.vertex("index").expect("module vertex");
        let boot = graph.vertex("boot").expect("symbol vertex");
        assert_eq!(graph.count_relations(index, boot, Relation::Invokes), 2);
    }

    #[test]
    fn test_emitted_counts_edges() {
        let shared = SharedGraph::new();
        let options = ScanOptions::default();
        let root = FunctionNode::wrapper(block(&["a", "b"]));
        let mut scanner = Scanner::new(&shared, "m.js", &options);
        scanner.scan(&root).unwrap();
        assert_eq!(scanner.emitted(), 2);
    }
}
