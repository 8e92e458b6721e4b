//! The syntax tree the scanner walks.
//!
//! A small, closed model: only the shapes the scanner dispatches
//! on, and only the children it recurses into. The front end in
//! [`crate::parser`] lowers tree-sitter's concrete tree into it. Anything the
//! front end cannot express arrives as an `Unsupported` variant carrying the
//! original node kind, which the scanner treats as fatal.

/// Name given to the synthetic function wrapping a whole source file.
pub const WRAPPER_NAME: &str = "runScript";

/// Character present in every synthetic (anonymous) function name.
pub const ANONYMOUS_DELIMITER: char = ':';

/// Default bound on statement/expression nesting, shared by lowering and scanning.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// `Unsupported` kind recorded where a tree was cut off at the nesting bound.
pub const TOO_DEEP_KIND: &str = "nesting too deep";

/// A bare identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// An ordered list of statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

impl Block {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

/// A function: the top-level wrapper, a declaration, or a function literal.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionNode {
    pub ident: Option<Ident>,
    pub params: Vec<Ident>,
    pub body: Block,
}

impl FunctionNode {
    /// The synthetic top-level function for one source file.
    pub fn wrapper(body: Block) -> Self {
        Self {
            ident: Some(Ident::new(WRAPPER_NAME)),
            params: Vec::new(),
            body,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.ident.as_ref().map(|i| i.name.as_str())
    }
}

/// One declarator: `var name = init;`.
#[derive(Debug, Clone, PartialEq)]
pub struct VarNode {
    pub name: Ident,
    pub init: Option<Expression>,
}

/// A `catch` clause. `condition` is the non-standard `catch (e if cond)` guard.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchNode {
    pub exception: Option<Ident>,
    pub condition: Option<Expression>,
    pub body: Block,
}

/// One `case` of a switch; `test` is absent for `default`.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseNode {
    pub test: Option<Expression>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Var(VarNode),
    Return(Option<Expression>),
    If {
        test: Expression,
        pass: Block,
        fail: Option<Block>,
    },
    For {
        init: Option<Expression>,
        test: Option<Expression>,
        modify: Option<Expression>,
        body: Block,
    },
    While {
        test: Expression,
        body: Block,
    },
    Expression(Expression),
    Block(Block),
    /// Each catch block normally holds a single [`Statement::Catch`].
    Try {
        body: Block,
        catch_blocks: Vec<Block>,
        finally: Option<Block>,
    },
    Catch(CatchNode),
    Break {
        label: Option<Ident>,
    },
    Continue {
        label: Option<Ident>,
    },
    Throw(Expression),
    /// Each entry is a [`Statement::Case`].
    Switch {
        discriminant: Expression,
        cases: Vec<Statement>,
    },
    Case(CaseNode),
    Unsupported {
        kind: String,
    },
}

/// `key: value` inside an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: Expression,
    pub value: Expression,
}

/// `callee(args...)`
#[derive(Debug, Clone, PartialEq)]
pub struct CallNode {
    pub callee: Box<Expression>,
    pub args: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    String(String),
    Number(f64),
    Boolean(bool),
    /// A parenthesized expression.
    Expression(Box<Expression>),
    /// An array literal; holes are dropped.
    Array(Vec<Expression>),
    Regex {
        pattern: String,
        flags: String,
    },
}

impl Literal {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Object(Vec<Property>),
    Ident(Ident),
    Call(CallNode),
    Access {
        base: Box<Expression>,
        property: Ident,
    },
    Literal(Literal),
    Function(Box<FunctionNode>),
    Binary {
        op: String,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Unary {
        op: String,
        operand: Box<Expression>,
    },
    Index {
        base: Box<Expression>,
        index: Box<Expression>,
    },
    Ternary {
        test: Box<Expression>,
        consequent: Box<Expression>,
        alternate: Box<Expression>,
    },
    Unsupported {
        kind: String,
    },
}

impl Expression {
    pub fn ident(name: impl Into<String>) -> Self {
        Expression::Ident(Ident::new(name))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expression::Literal(Literal::String(value.into()))
    }

    pub fn call(callee: Expression, args: Vec<Expression>) -> Self {
        Expression::Call(CallNode {
            callee: Box::new(callee),
            args,
        })
    }

    pub fn unary(op: impl Into<String>, operand: Expression) -> Self {
        Expression::Unary {
            op: op.into(),
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: impl Into<String>, lhs: Expression, rhs: Expression) -> Self {
        Expression::Binary {
            op: op.into(),
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn access(base: Expression, property: impl Into<String>) -> Self {
        Expression::Access {
            base: Box::new(base),
            property: Ident::new(property),
        }
    }

    pub fn function(node: FunctionNode) -> Self {
        Expression::Function(Box::new(node))
    }

    /// Look through any number of enclosing parentheses.
    pub fn strip_parens(&self) -> &Expression {
        let mut exp = self;
        while let Expression::Literal(Literal::Expression(inner)) = exp {
            exp = inner;
        }
        exp
    }
}
