//! Go declaration extraction.
//!
//! Only two facts are needed from a test file: the package clause and the
//! names of top-level `func` declarations. Both come from the tree-sitter Go
//! grammar via ast-grep. Methods are ignored because the test runner never
//! reports them as cases.

use crate::error::{Error, Result};
use ast_grep_core::Node;
use ast_grep_language::{LanguageExt, SupportLang};

/// Declarations found in one Go source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoDeclarations {
    pub package: String,
    /// Top-level function names in source order.
    pub functions: Vec<String>,
}

/// Parse `source` and return its package name and top-level functions.
///
/// Fails when error recovery had to wrap unparseable tokens in an `ERROR`
/// node or insert a `MISSING` token, or when no package clause is present.
pub fn parse_declarations(source: &str) -> Result<GoDeclarations> {
    let grep = SupportLang::Go.ast_grep(source);
    let root = grep.root();

    if let Some(line) = first_error_line(&root) {
        return Err(Error::parse(format!("syntax error near line {line}")));
    }

    let mut package = None;
    let mut functions = Vec::new();
    for child in root.children() {
        match child.kind().as_ref() {
            "package_clause" => {
                package = child
                    .children()
                    .find(|c| c.kind().as_ref() == "package_identifier")
                    .map(|ident| ident.text().to_string());
            }
            "function_declaration" => {
                if let Some(name) = child
                    .children()
                    .find(|c| c.kind().as_ref() == "identifier")
                {
                    functions.push(name.text().to_string());
                }
            }
            _ => {}
        }
    }

    let package = package.ok_or_else(|| Error::parse("missing package clause"))?;
    Ok(GoDeclarations { package, functions })
}

/// 1-based line of the first `ERROR` or `MISSING` node, if any.
///
/// Error recovery sometimes inserts a zero-width `MISSING` token (an absent
/// closing brace, say) without producing an `ERROR` node.
fn first_error_line<D: ast_grep_core::Doc>(node: &Node<D>) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_pos().line() + 1);
    }
    node.children().find_map(|child| first_error_line(&child))
}
