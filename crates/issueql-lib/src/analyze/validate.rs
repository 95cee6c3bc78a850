//! Semantic validation of parsed queries.
//!
//! Runs after parsing on a complete tree and never mutates it. Validation
//! checks qualifier names against the schema, values against their domains,
//! and variable references against the symbol table. One diagnostic per
//! offending term; a query with five unknown qualifiers gets five
//! diagnostics, not one.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::parser::{QualifiedValue, Query, Root, SortBy, Statement, Term};

use super::schema::{Schema, ValueInfo, ValueType, SORT_FIELDS, split_sort};
use super::symbols::SymbolTable;

/// Validates every query in `root`, definition bodies included.
pub fn validate(root: &Root, symbols: &SymbolTable) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    let schema = Schema::builtin();

    for statement in root.statements() {
        let query = match statement {
            Statement::Query(query) => query,
            Statement::VarDef(def) => match def.body() {
                Some(body) => body,
                None => continue,
            },
        };
        validate_query(&query, schema, symbols, &mut diagnostics);
    }

    diagnostics
}

fn validate_query(
    query: &Query,
    schema: &Schema,
    symbols: &SymbolTable,
    diagnostics: &mut Diagnostics,
) {
    let pr_restricted = has_pr_restriction(query);

    for term in query.terms() {
        match term {
            Term::QualifiedValue(qualified) => {
                validate_qualifier(&qualified, schema, pr_restricted, diagnostics);
            }
            Term::VarRef(var_ref) => {
                let name = var_ref.name();
                if symbols.get(&name).is_none() {
                    diagnostics
                        .report(DiagnosticKind::UndefinedVariable, var_ref.range())
                        .message(name)
                        .emit();
                }
            }
            Term::Literal(_) => {}
        }
    }

    if let Some(sort) = query.sort_by() {
        validate_sort(&sort, diagnostics);
    }
}

/// True when the query restricts itself to pull requests via `type:pr` or
/// `is:pr`.
fn has_pr_restriction(query: &Query) -> bool {
    query.qualified_values().any(|qualified| {
        !qualified.negated()
            && matches!(qualified.name().as_str(), "type" | "is")
            && qualified.values().any(|v| v.unquoted() == "pr")
    })
}

fn validate_qualifier(
    qualified: &QualifiedValue,
    schema: &Schema,
    pr_restricted: bool,
    diagnostics: &mut Diagnostics,
) {
    let name = qualified.name();

    // `sort` only parses as a qualifier when negated; a sort order cannot be
    // excluded.
    if name == "sort" {
        diagnostics
            .report(DiagnosticKind::InvalidSort, qualified.range())
            .message("`sort` cannot be negated")
            .emit();
        return;
    }

    let Some(info) = schema.get(&name) else {
        let range = qualified
            .name_token()
            .map_or_else(|| qualified.range(), |t| t.text_range());
        diagnostics
            .report(DiagnosticKind::UnknownQualifier, range)
            .message(name)
            .emit();
        return;
    };

    match info.value {
        ValueInfo::Enumeration(sets) => {
            validate_enumeration(qualified, sets, diagnostics);
        }
        ValueInfo::Semantic(value_type) => {
            validate_semantic(qualified, value_type, diagnostics);
        }
    }

    if info.pr_only && !pr_restricted {
        diagnostics
            .report(DiagnosticKind::MissingTypeRestriction, qualified.range())
            .message(name)
            .emit();
    }
}

fn validate_enumeration(
    qualified: &QualifiedValue,
    sets: &[&[&str]],
    diagnostics: &mut Diagnostics,
) {
    if qualified.has_comparison() {
        diagnostics
            .report(
                DiagnosticKind::InvalidValue,
                qualified.value_range().unwrap_or_else(|| qualified.range()),
            )
            .message(format!(
                "`{}` does not accept comparisons or ranges",
                qualified.name()
            ))
            .emit();
        return;
    }

    for literal in qualified.values() {
        let value = literal.unquoted();
        let permitted = sets.iter().any(|set| set.contains(&value.as_str()));
        if !permitted {
            diagnostics
                .report(DiagnosticKind::InvalidValue, literal.range())
                .message(format!(
                    "`{}` is not a valid value for `{}`; expected one of {}",
                    value,
                    qualified.name(),
                    permitted_list(sets)
                ))
                .emit();
        }
    }
}

fn permitted_list(sets: &[&[&str]]) -> String {
    let values: Vec<String> = sets
        .iter()
        .flat_map(|set| set.iter())
        .map(|v| format!("`{v}`"))
        .collect();
    values.join(", ")
}

fn validate_semantic(
    qualified: &QualifiedValue,
    value_type: ValueType,
    diagnostics: &mut Diagnostics,
) {
    let text = logical_value_text(qualified);
    if text.is_empty() {
        // The parser already reported the missing value.
        return;
    }
    if let Err(detail) = value_type.validate(&text) {
        diagnostics
            .report(
                DiagnosticKind::InvalidValue,
                qualified.value_range().unwrap_or_else(|| qualified.range()),
            )
            .message(detail)
            .emit();
    }
}

/// Value text as the search API sees it: a single quoted value is unwrapped,
/// everything else is taken verbatim (comparisons and ranges included).
fn logical_value_text(qualified: &QualifiedValue) -> String {
    let mut values = qualified.values();
    match (values.next(), values.next()) {
        (Some(only), None) if !qualified.has_comparison() => only.unquoted(),
        _ => qualified.value_text(),
    }
}

fn validate_sort(sort: &SortBy, diagnostics: &mut Diagnostics) {
    let Some(value) = sort.value_text() else {
        // Missing value already reported by the parser.
        return;
    };
    let (field, _) = split_sort(&value);
    if !SORT_FIELDS.contains(&field) {
        diagnostics
            .report(DiagnosticKind::InvalidSort, sort.range())
            .message(format!(
                "unknown sort field `{field}`; expected one of {}",
                SORT_FIELDS
                    .iter()
                    .map(|f| format!("`{f}`"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
            .emit();
    }
}
