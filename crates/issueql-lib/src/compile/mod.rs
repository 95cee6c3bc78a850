//! Compilation of parsed queries into search API request parameters.
//!
//! Terms are emitted verbatim from the source text and joined with single
//! spaces, so quoting and negation survive exactly as written. Variable
//! references are expanded inline from the symbol table; a trailing `sort:`
//! directive is lifted out of the query string into dedicated request
//! parameters. Compilation is pure: the same tree and symbol table always
//! produce the same output.

use serde::{Deserialize, Serialize};

use crate::analyze::{schema, SymbolTable};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::parser::{Query, Root, Term};

#[cfg(test)]
mod compile_tests;

/// Result direction for a sort field. The search API defaults to newest or
/// highest first, so descending is the default here too.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

/// One search API request, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledQuery {
    /// The `q` parameter: space-joined terms, variables expanded.
    pub q: String,
    /// Sort field lifted out of a `sort:` directive, API default when absent.
    pub sort: Option<String>,
    pub order: SortOrder,
}

/// Compiles every top-level query in the document. Definition bodies are
/// only compiled where they are referenced.
pub fn compile_document(root: &Root, symbols: &SymbolTable) -> (Vec<CompiledQuery>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let compiled = root
        .queries()
        .map(|query| {
            let (compiled, query_diagnostics) = compile_query(&query, symbols);
            diagnostics.extend(query_diagnostics);
            compiled
        })
        .collect();
    (compiled, diagnostics)
}

pub fn compile_query(query: &Query, symbols: &SymbolTable) -> (CompiledQuery, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let mut parts = Vec::new();
    let mut sort = None;
    let mut visited = Vec::new();

    emit_query(query, symbols, &mut visited, &mut parts, &mut sort, &mut diagnostics);

    let (sort, order) = match sort {
        Some((field, order)) => (Some(field), order),
        None => (None, SortOrder::default()),
    };

    (
        CompiledQuery {
            q: parts.join(" "),
            sort,
            order,
        },
        diagnostics,
    )
}

fn emit_query(
    query: &Query,
    symbols: &SymbolTable,
    visited: &mut Vec<String>,
    parts: &mut Vec<String>,
    sort: &mut Option<(String, SortOrder)>,
    diagnostics: &mut Diagnostics,
) {
    for term in query.terms() {
        match term {
            Term::Literal(literal) => parts.push(literal.text()),
            Term::QualifiedValue(qualified) => {
                parts.push(qualified.as_cst().text().to_string());
            }
            Term::VarRef(var_ref) => {
                let name = var_ref.name();
                if visited.iter().any(|seen| *seen == name) {
                    diagnostics
                        .report(DiagnosticKind::CircularReference, var_ref.range())
                        .message(name)
                        .emit();
                    continue;
                }
                // Unresolved names are the validator's problem; the query
                // compiles without them.
                let Some(symbol) = symbols.get(&name) else {
                    continue;
                };
                let Some(body) = symbol.def.body() else {
                    continue;
                };
                visited.push(name);
                emit_query(&body, symbols, visited, parts, sort, diagnostics);
                visited.pop();
            }
        }
    }

    // An outer sort directive wins over any inherited from an expansion,
    // because this assignment happens after the recursion above.
    if let Some(directive) = query.sort_by() {
        if let Some(value) = directive.value_text() {
            let (field, order) = schema::split_sort(&value);
            let order = match order {
                Some("asc") => SortOrder::Asc,
                _ => SortOrder::Desc,
            };
            *sort = Some((field.to_string(), order));
        }
    }
}
