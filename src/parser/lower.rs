//! Lowering from tree-sitter's JavaScript grammar to [`crate::ast`].
//!
//! Every construct the scanner has a rule for maps onto one of its shapes;
//! everything else becomes an `Unsupported` node tagged with the grammar kind
//! so the scan fails loudly instead of silently dropping relations.

use std::cell::Cell;

use tree_sitter::Node;

use crate::ast::{
    ANONYMOUS_DELIMITER, Block, CaseNode, CatchNode, Expression, FunctionNode, Ident, Literal,
    Property, Statement, TOO_DEEP_KIND, VarNode,
};

/// Named children of `node`, minus comments.
fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| !matches!(c.kind(), "comment" | "html_comment" | "hashbang_line"))
        .collect()
}

fn first_named<'t>(node: Node<'t>) -> Option<Node<'t>> {
    named_children(node).into_iter().next()
}

fn unsupported_statement(node: Node<'_>) -> Statement {
    Statement::Unsupported {
        kind: node.kind().to_owned(),
    }
}

fn unsupported_expression(node: Node<'_>) -> Expression {
    Expression::Unsupported {
        kind: node.kind().to_owned(),
    }
}

/// Name for a function literal with no usable identifier: `L:<line>`.
fn anonymous_name(node: Node<'_>) -> String {
    format!("L{}{}", ANONYMOUS_DELIMITER, node.start_position().row + 1)
}

fn parse_number(text: &str) -> f64 {
    let cleaned: String = text.trim_end_matches('n').chars().filter(|&c| c != '_').collect();
    let radix = match cleaned.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    match radix {
        Some(r) => u64::from_str_radix(&cleaned[2..], r)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN),
        None => cleaned.parse().unwrap_or(f64::NAN),
    }
}

/// Lowers one parsed file. Holds the source bytes node text is read from.
///
/// Statements and expressions nested deeper than `max_depth` are cut off and
/// replaced by an `Unsupported` node of kind [`TOO_DEEP_KIND`].
pub struct Lowering<'s> {
    source: &'s [u8],
    max_depth: usize,
    depth: Cell<usize>,
}

impl<'s> Lowering<'s> {
    pub fn new(source: &'s [u8], max_depth: usize) -> Self {
        Self {
            source,
            max_depth,
            depth: Cell::new(0),
        }
    }

    /// Run `lower` one nesting level down, or return `None` at the bound.
    fn nested<T>(&self, lower: impl FnOnce() -> T) -> Option<T> {
        let depth = self.depth.get();
        if depth >= self.max_depth {
            return None;
        }
        self.depth.set(depth + 1);
        let out = lower();
        self.depth.set(depth);
        Some(out)
    }

    fn text(&self, node: Node<'_>) -> &'s str {
        node.utf8_text(self.source).unwrap_or("")
    }

    fn ident(&self, node: Node<'_>) -> Ident {
        Ident::new(self.text(node))
    }

    /// The whole file as the synthetic top-level function.
    pub fn program(&self, root: Node<'_>) -> FunctionNode {
        FunctionNode::wrapper(self.block_of_children(root))
    }

    // ---------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------

    fn block_of_children(&self, node: Node<'_>) -> Block {
        let mut statements = Vec::new();
        for child in named_children(node) {
            self.statement_into(child, &mut statements);
        }
        Block::new(statements)
    }

    /// A statement body as a block: braces are unwrapped, a single statement is wrapped.
    fn block_of(&self, node: Node<'_>) -> Block {
        if node.kind() == "statement_block" {
            return self.block_of_children(node);
        }
        let mut statements = Vec::new();
        self.statement_into(node, &mut statements);
        Block::new(statements)
    }

    fn opt_block(&self, node: Option<Node<'_>>) -> Block {
        node.map(|n| self.block_of(n)).unwrap_or_default()
    }

    fn statement_into(&self, node: Node<'_>, out: &mut Vec<Statement>) {
        if self.nested(|| self.lower_statement_into(node, out)).is_none() {
            out.push(Statement::Unsupported {
                kind: TOO_DEEP_KIND.to_owned(),
            });
        }
    }

    fn lower_statement_into(&self, node: Node<'_>, out: &mut Vec<Statement>) {
        match node.kind() {
            "expression_statement" => {
                if let Some(exp) = first_named(node) {
                    out.push(Statement::Expression(self.expression(exp)));
                }
            }
            "variable_declaration" | "lexical_declaration" => self.declarators_into(node, out),
            "function_declaration" | "generator_function_declaration" => {
                match node.child_by_field_name("name") {
                    Some(name) => out.push(Statement::Var(VarNode {
                        name: self.ident(name),
                        init: Some(Expression::function(self.function(node))),
                    })),
                    None => out.push(unsupported_statement(node)),
                }
            }
            "return_statement" => {
                out.push(Statement::Return(first_named(node).map(|e| self.expression(e))));
            }
            "if_statement" => out.push(self.if_statement(node)),
            "for_statement" => self.for_statement_into(node, out),
            "for_in_statement" => out.push(Statement::For {
                init: node.child_by_field_name("left").map(|n| self.expression(n)),
                test: node.child_by_field_name("right").map(|n| self.expression(n)),
                modify: None,
                body: self.opt_block(node.child_by_field_name("body")),
            }),
            "while_statement" | "do_statement" => {
                let test = match node.child_by_field_name("condition") {
                    Some(c) => self.condition(c),
                    None => unsupported_expression(node),
                };
                out.push(Statement::While {
                    test,
                    body: self.opt_block(node.child_by_field_name("body")),
                });
            }
            "statement_block" => out.push(Statement::Block(self.block_of_children(node))),
            "try_statement" => out.push(self.try_statement(node)),
            "break_statement" => out.push(Statement::Break {
                label: node.child_by_field_name("label").map(|l| self.ident(l)),
            }),
            "continue_statement" => out.push(Statement::Continue {
                label: node.child_by_field_name("label").map(|l| self.ident(l)),
            }),
            "throw_statement" => match first_named(node) {
                Some(exp) => out.push(Statement::Throw(self.expression(exp))),
                None => out.push(unsupported_statement(node)),
            },
            "switch_statement" => out.push(self.switch_statement(node)),
            "labeled_statement" => {
                if let Some(body) = node.child_by_field_name("body") {
                    self.statement_into(body, out);
                }
            }
            "empty_statement" | "comment" | "html_comment" | "hashbang_line" => {}
            _ => out.push(unsupported_statement(node)),
        }
    }

    /// One `Var` per declarator; `let a = 1, b;` yields two.
    fn declarators_into(&self, node: Node<'_>, out: &mut Vec<Statement>) {
        for declarator in named_children(node) {
            if declarator.kind() != "variable_declarator" {
                out.push(unsupported_statement(declarator));
                continue;
            }
            let Some(name) = declarator.child_by_field_name("name") else {
                out.push(unsupported_statement(declarator));
                continue;
            };
            if name.kind() != "identifier" {
                // Destructuring declarations have no single declared name.
                out.push(unsupported_statement(name));
                continue;
            }
            out.push(Statement::Var(VarNode {
                name: self.ident(name),
                init: declarator
                    .child_by_field_name("value")
                    .map(|v| self.expression(v)),
            }));
        }
    }

    /// Conditions arrive wrapped in parentheses; the parentheses are syntax,
    /// not a nested expression.
    fn condition(&self, node: Node<'_>) -> Expression {
        if node.kind() == "parenthesized_expression"
            && let Some(inner) = first_named(node)
        {
            return self.expression(inner);
        }
        self.expression(node)
    }

    fn if_statement(&self, node: Node<'_>) -> Statement {
        let test = match node.child_by_field_name("condition") {
            Some(c) => self.condition(c),
            None => unsupported_expression(node),
        };
        let fail = node
            .child_by_field_name("alternative")
            .and_then(first_named)
            .map(|stmt| self.block_of(stmt));
        Statement::If {
            test,
            pass: self.opt_block(node.child_by_field_name("consequence")),
            fail,
        }
    }

    /// `for (var i = 0; ...)`: declarations in the initializer are hoisted into a
    /// block ahead of the loop, leaving `init` absent.
    fn for_statement_into(&self, node: Node<'_>, out: &mut Vec<Statement>) {
        let mut hoisted = Vec::new();
        let init = node
            .child_by_field_name("initializer")
            .and_then(|n| self.for_clause(n, &mut hoisted));
        let test = node
            .child_by_field_name("condition")
            .and_then(|n| self.for_clause(n, &mut hoisted));
        let modify = node
            .child_by_field_name("increment")
            .map(|n| self.expression(n));
        let body = self.opt_block(node.child_by_field_name("body"));

        let for_node = Statement::For {
            init,
            test,
            modify,
            body,
        };
        if hoisted.is_empty() {
            out.push(for_node);
        } else {
            hoisted.push(for_node);
            out.push(Statement::Block(Block::new(hoisted)));
        }
    }

    fn for_clause(&self, node: Node<'_>, hoisted: &mut Vec<Statement>) -> Option<Expression> {
        match node.kind() {
            "empty_statement" => None,
            "expression_statement" => first_named(node).map(|e| self.expression(e)),
            "variable_declaration" | "lexical_declaration" => {
                self.declarators_into(node, hoisted);
                None
            }
            _ => Some(self.expression(node)),
        }
    }

    fn try_statement(&self, node: Node<'_>) -> Statement {
        let body = self.opt_block(node.child_by_field_name("body"));
        let catch_blocks = node
            .child_by_field_name("handler")
            .map(|handler| vec![Block::new(vec![self.catch_clause(handler)])])
            .unwrap_or_default();
        let finally = node
            .child_by_field_name("finalizer")
            .map(|f| self.opt_block(f.child_by_field_name("body")));
        Statement::Try {
            body,
            catch_blocks,
            finally,
        }
    }

    fn catch_clause(&self, node: Node<'_>) -> Statement {
        let exception = match node.child_by_field_name("parameter") {
            Some(p) if p.kind() == "identifier" => Some(self.ident(p)),
            Some(p) => return unsupported_statement(p),
            None => None,
        };
        Statement::Catch(CatchNode {
            exception,
            condition: None,
            body: self.opt_block(node.child_by_field_name("body")),
        })
    }

    fn switch_statement(&self, node: Node<'_>) -> Statement {
        let discriminant = match node.child_by_field_name("value") {
            Some(v) => self.condition(v),
            None => unsupported_expression(node),
        };
        let cases = node
            .child_by_field_name("body")
            .map(|body| {
                named_children(body)
                    .into_iter()
                    .map(|c| Statement::Case(self.case(c)))
                    .collect()
            })
            .unwrap_or_default();
        Statement::Switch {
            discriminant,
            cases,
        }
    }

    fn case(&self, node: Node<'_>) -> CaseNode {
        let value = node.child_by_field_name("value");
        let mut statements = Vec::new();
        for child in named_children(node) {
            if value.is_some_and(|v| v.id() == child.id()) {
                continue;
            }
            self.statement_into(child, &mut statements);
        }
        CaseNode {
            test: value.map(|v| self.expression(v)),
            body: Block::new(statements),
        }
    }

    // ---------------------------------------------------------------------
    // Functions
    // ---------------------------------------------------------------------

    /// Lower a function declaration, function expression, arrow function or method.
    fn function(&self, node: Node<'_>) -> FunctionNode {
        let name = match node.child_by_field_name("name") {
            Some(n) if matches!(n.kind(), "identifier" | "property_identifier") => {
                self.text(n).to_owned()
            }
            _ => anonymous_name(node),
        };

        let params = if let Some(single) = node.child_by_field_name("parameter") {
            vec![self.param(single)]
        } else {
            node.child_by_field_name("parameters")
                .map(|p| named_children(p).into_iter().map(|n| self.param(n)).collect())
                .unwrap_or_default()
        };

        let body = match node.child_by_field_name("body") {
            Some(b) if b.kind() == "statement_block" => self.block_of_children(b),
            // Concise arrow body: `x => x + 1`.
            Some(b) => Block::new(vec![Statement::Return(Some(self.expression(b)))]),
            None => Block::default(),
        };

        FunctionNode {
            ident: Some(Ident::new(name)),
            params,
            body,
        }
    }

    /// The identifier a parameter binds; patterns keep their source text.
    fn param(&self, node: Node<'_>) -> Ident {
        match node.kind() {
            "identifier" => self.ident(node),
            "assignment_pattern" => match node.child_by_field_name("left") {
                Some(left) => self.param(left),
                None => self.ident(node),
            },
            "rest_pattern" => match first_named(node) {
                Some(inner) => self.param(inner),
                None => self.ident(node),
            },
            _ => self.ident(node),
        }
    }

    // ---------------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------------

    /// A required child; its absence makes the parent unsupported.
    fn child_expression(&self, node: Option<Node<'_>>, parent: Node<'_>) -> Expression {
        match node {
            Some(n) => self.expression(n),
            None => unsupported_expression(parent),
        }
    }

    fn boxed(&self, node: Option<Node<'_>>, parent: Node<'_>) -> Box<Expression> {
        Box::new(self.child_expression(node, parent))
    }

    pub fn expression(&self, node: Node<'_>) -> Expression {
        self.nested(|| self.lower_expression(node))
            .unwrap_or_else(|| Expression::Unsupported {
                kind: TOO_DEEP_KIND.to_owned(),
            })
    }

    fn lower_expression(&self, node: Node<'_>) -> Expression {
        match node.kind() {
            "identifier" | "this" | "super" | "undefined" | "property_identifier"
            | "private_property_identifier" | "shorthand_property_identifier" => {
                Expression::ident(self.text(node))
            }
            "string" => Expression::string(self.string_value(node)),
            "template_string" => self.template(node),
            "number" => Expression::Literal(Literal::Number(parse_number(self.text(node)))),
            "true" => Expression::Literal(Literal::Boolean(true)),
            "false" => Expression::Literal(Literal::Boolean(false)),
            "null" => Expression::Literal(Literal::Null),
            "regex" => Expression::Literal(Literal::Regex {
                pattern: node
                    .child_by_field_name("pattern")
                    .map(|p| self.text(p).to_owned())
                    .unwrap_or_default(),
                flags: node
                    .child_by_field_name("flags")
                    .map(|f| self.text(f).to_owned())
                    .unwrap_or_default(),
            }),
            "array" => Expression::Literal(Literal::Array(
                named_children(node)
                    .into_iter()
                    .map(|e| self.expression(e))
                    .collect(),
            )),
            "object" => Expression::Object(
                named_children(node)
                    .into_iter()
                    .map(|p| self.property(p))
                    .collect(),
            ),
            "function_expression" | "function" | "generator_function" | "arrow_function" => {
                Expression::function(self.function(node))
            }
            "call_expression" => Expression::call(
                self.child_expression(node.child_by_field_name("function"), node),
                self.arguments(node.child_by_field_name("arguments")),
            ),
            // `new C(a)` is a unary `new` over the call `C(a)`.
            "new_expression" => Expression::unary(
                "new",
                Expression::call(
                    self.child_expression(node.child_by_field_name("constructor"), node),
                    self.arguments(node.child_by_field_name("arguments")),
                ),
            ),
            "member_expression" => match node.child_by_field_name("property") {
                Some(prop) => Expression::access(
                    self.child_expression(node.child_by_field_name("object"), node),
                    self.text(prop),
                ),
                None => unsupported_expression(node),
            },
            "subscript_expression" => Expression::Index {
                base: self.boxed(node.child_by_field_name("object"), node),
                index: self.boxed(node.child_by_field_name("index"), node),
            },
            "assignment_expression" => Expression::Binary {
                op: "=".to_owned(),
                lhs: self.boxed(node.child_by_field_name("left"), node),
                rhs: self.boxed(node.child_by_field_name("right"), node),
            },
            "augmented_assignment_expression" | "binary_expression" => Expression::Binary {
                op: self.operator(node),
                lhs: self.boxed(node.child_by_field_name("left"), node),
                rhs: self.boxed(node.child_by_field_name("right"), node),
            },
            "unary_expression" | "update_expression" => Expression::Unary {
                op: self.operator(node),
                operand: self.boxed(node.child_by_field_name("argument"), node),
            },
            "await_expression" => Expression::Unary {
                op: "await".to_owned(),
                operand: self.boxed(first_named(node), node),
            },
            "ternary_expression" => Expression::Ternary {
                test: self.boxed(node.child_by_field_name("condition"), node),
                consequent: self.boxed(node.child_by_field_name("consequence"), node),
                alternate: self.boxed(node.child_by_field_name("alternative"), node),
            },
            "parenthesized_expression" => match first_named(node) {
                Some(inner) => {
                    Expression::Literal(Literal::Expression(Box::new(self.expression(inner))))
                }
                None => unsupported_expression(node),
            },
            "sequence_expression" => self.sequence(node),
            _ => unsupported_expression(node),
        }
    }

    fn operator(&self, node: Node<'_>) -> String {
        node.child_by_field_name("operator")
            .map(|op| self.text(op).to_owned())
            .unwrap_or_default()
    }

    /// String contents without the surrounding quotes; escapes are kept as written.
    fn string_value(&self, node: Node<'_>) -> String {
        let raw = self.text(node);
        raw.get(1..raw.len().saturating_sub(1))
            .unwrap_or("")
            .to_owned()
    }

    /// A template without substitutions is a plain string; otherwise a `+`
    /// chain of the literal text and each substituted expression.
    fn template(&self, node: Node<'_>) -> Expression {
        let mut fragments = String::new();
        let mut substitutions = Vec::new();
        for child in named_children(node) {
            if child.kind() == "template_substitution" {
                if let Some(inner) = first_named(child) {
                    substitutions.push(self.expression(inner));
                }
            } else {
                fragments.push_str(self.text(child));
            }
        }
        if substitutions.is_empty() {
            return Expression::string(self.string_value(node));
        }
        substitutions
            .into_iter()
            .fold(Expression::string(fragments), |acc, sub| Expression::binary("+", acc, sub))
    }

    /// `a, b, c` folds left into nested `,` binaries.
    fn sequence(&self, node: Node<'_>) -> Expression {
        let mut parts = named_children(node).into_iter().map(|n| self.expression(n));
        let Some(first) = parts.next() else {
            return unsupported_expression(node);
        };
        parts.fold(first, |acc, next| Expression::binary(",", acc, next))
    }

    fn arguments(&self, node: Option<Node<'_>>) -> Vec<Expression> {
        match node {
            // Tagged template: fn`text ${x}`.
            Some(n) if n.kind() == "template_string" => vec![self.template(n)],
            Some(n) => named_children(n)
                .into_iter()
                .map(|a| self.expression(a))
                .collect(),
            None => Vec::new(),
        }
    }

    fn property(&self, node: Node<'_>) -> Property {
        match node.kind() {
            "pair" => Property {
                key: match node.child_by_field_name("key") {
                    Some(k) => self.property_key(k),
                    None => unsupported_expression(node),
                },
                value: match node.child_by_field_name("value") {
                    Some(v) => self.expression(v),
                    None => unsupported_expression(node),
                },
            },
            "shorthand_property_identifier" => Property {
                key: Expression::ident(self.text(node)),
                value: Expression::ident(self.text(node)),
            },
            "method_definition" => Property {
                key: match node.child_by_field_name("name") {
                    Some(k) => self.property_key(k),
                    None => unsupported_expression(node),
                },
                value: Expression::function(self.function(node)),
            },
            // Spread and anything newer: the key carries the failure.
            _ => Property {
                key: unsupported_expression(node),
                value: Expression::Literal(Literal::Null),
            },
        }
    }

    fn property_key(&self, node: Node<'_>) -> Expression {
        match node.kind() {
            "computed_property_name" => match first_named(node) {
                Some(inner) => self.expression(inner),
                None => unsupported_expression(node),
            },
            _ => self.expression(node),
        }
    }
}
