pub mod lower;

use std::cell::RefCell;
use std::path::Path;

use thiserror::Error;
use tree_sitter::{Node, Parser, Tree};

use crate::ast::FunctionNode;

use lower::Lowering;

// One parser per rayon worker thread; no lock contention.
thread_local! {
    static PARSER_JS: RefCell<Parser> = RefCell::new({
        let mut p = Parser::new();
        p.set_language(&tree_sitter_javascript::LANGUAGE.into())
            .expect("bundled JavaScript grammar matches the tree-sitter ABI");
        p
    });
}

/// Source file extensions handled by the JavaScript front end.
pub const JS_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx"];

/// Why a file could not be turned into a syntax tree.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported file extension {0:?}")]
    UnsupportedExtension(String),
    #[error("tree-sitter produced no tree")]
    NoTree,
    #[error("syntax error at {line}:{column} near `{kind}`")]
    Syntax {
        line: usize,
        column: usize,
        kind: String,
    },
}

/// Parse one file and lower it to the top-level function the scanner walks.
///
/// The extension must be one of [`JS_EXTENSIONS`]. Sources that tree-sitter
/// only recovers from with ERROR/MISSING nodes are rejected: a partial tree
/// would yield a graph that looks complete but is not. Nesting beyond
/// `max_depth` is lowered to an unsupported node, which fails the scan.
pub fn parse_file(
    path: &Path,
    source: &[u8],
    max_depth: usize,
) -> Result<FunctionNode, ParseError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !JS_EXTENSIONS.contains(&ext) {
        return Err(ParseError::UnsupportedExtension(ext.to_owned()));
    }
    parse_source(source, max_depth)
}

/// Parse JavaScript source text using the calling thread's parser.
pub fn parse_source(source: &[u8], max_depth: usize) -> Result<FunctionNode, ParseError> {
    let tree = PARSER_JS
        .with(|p| p.borrow_mut().parse(source, None))
        .ok_or(ParseError::NoTree)?;
    check_syntax(&tree)?;
    Ok(Lowering::new(source, max_depth).program(tree.root_node()))
}

fn check_syntax(tree: &Tree) -> Result<(), ParseError> {
    match first_error(tree.root_node()) {
        Some(node) => {
            let pos = node.start_position();
            Err(ParseError::Syntax {
                line: pos.row + 1,
                column: pos.column + 1,
                kind: node.kind().to_owned(),
            })
        }
        None => Ok(()),
    }
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error(child) {
            return Some(found);
        }
    }
    None
}
