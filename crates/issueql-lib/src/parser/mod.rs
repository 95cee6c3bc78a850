//! Parser infrastructure for the search query language.
//!
//! # Architecture
//!
//! The parser produces a lossless concrete syntax tree (CST) via Rowan's
//! green tree builder:
//!
//! - Zero-copy lexing: tokens carry spans, text sliced only when building tree nodes
//! - Trivia buffering: whitespace collected, then attached as leading trivia
//! - Newlines are statement separators and stay significant
//!
//! # Recovery Strategy
//!
//! The parser is resilient - it always produces a tree. Unexpected input is
//! wrapped in a `Missing` node up to the next newline, with a diagnostic on
//! the side, so a malformed statement never corrupts its siblings. Every
//! node's range covers its quotes and sigils exactly; hover and rename
//! tooling depend on those offsets.

pub mod ast;
pub mod cst;
pub mod lexer;

mod core;
mod grammar;

#[cfg(test)]
mod ast_tests;
#[cfg(test)]
mod lexer_tests;

pub use ast::{Literal, QualifiedValue, Query, Root, SortBy, Statement, Term, VarDef, VarRef};
pub use cst::{SyntaxKind, SyntaxNode, SyntaxToken};
pub use lexer::{Token, lex, token_text};

pub use self::core::Parser;

use crate::diagnostics::Diagnostics;

/// Parse result containing the green tree.
///
/// The tree is always complete - diagnostics are returned separately.
/// `Missing` nodes in the tree represent recovery points.
#[derive(Debug, Clone)]
pub struct Parse {
    cst: rowan::GreenNode,
}

impl Parse {
    pub fn as_cst(&self) -> &rowan::GreenNode {
        &self.cst
    }

    /// Creates a typed view over the immutable green tree.
    /// This is cheap - SyntaxNode is a thin wrapper with parent pointers.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.cst.clone())
    }

    pub fn root(&self) -> Root {
        Root::cast(self.syntax()).expect("parser always produces Root")
    }
}

/// Main entry point. Re-parses from scratch; parsing identical text twice
/// yields structurally equal trees with identical ranges.
pub fn parse(source: &str) -> (Parse, Diagnostics) {
    let mut parser = Parser::new(source, lex(source));
    parser.parse_root();
    let (cst, diagnostics) = parser.finish();
    (Parse { cst }, diagnostics)
}
