//! A small query language for searching issues and pull requests.
//!
//! Documents hold one query per line, with `$name = ...` definitions for
//! reusable fragments. The pipeline is: lex and parse into a lossless
//! syntax tree ([`parser`]), validate qualifiers and values against the
//! built-in schema ([`analyze`]), compile each query line into search API
//! request parameters ([`compile`]), then fetch and aggregate results
//! ([`exec`]). [`Project`] ties the per-document pieces together for
//! editor-style use.
//!
//! ```
//! use issueql_lib::{analyze::SymbolTable, compile::compile_document, parser::parse};
//!
//! let (parsed, diagnostics) = parse("is:open label:bug sort:created-asc");
//! assert!(diagnostics.is_empty());
//! let (queries, _) = compile_document(&parsed.root(), &SymbolTable::new());
//! assert_eq!(queries[0].q, "is:open label:bug");
//! assert_eq!(queries[0].sort.as_deref(), Some("created"));
//! ```

pub mod analyze;
pub mod compile;
pub mod diagnostics;
pub mod exec;
pub mod parser;

mod project;


pub use analyze::{DocumentId, Schema, SymbolInfo, SymbolTable, validate};
pub use compile::{CompiledQuery, SortOrder, compile_document, compile_query};
pub use diagnostics::{DiagnosticKind, DiagnosticMessage, Diagnostics, DiagnosticsPrinter, Severity};
pub use exec::{CancelToken, CellRunner, Item, RunStatus, SearchClient};
pub use parser::{Parse, parse};
pub use project::{Document, Project};
