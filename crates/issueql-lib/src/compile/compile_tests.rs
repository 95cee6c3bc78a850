use pretty_assertions::assert_eq;

use super::{CompiledQuery, SortOrder, compile_document, compile_query};
use crate::analyze::{DocumentId, SymbolTable};
use crate::diagnostics::DiagnosticKind;
use crate::parser::parse;

fn compile_one(source: &str) -> CompiledQuery {
    let (compiled, diagnostics) = compile_all(source);
    assert!(diagnostics_empty(&diagnostics), "{diagnostics:?}");
    assert_eq!(compiled.len(), 1, "expected exactly one query");
    compiled.into_iter().next().unwrap()
}

fn compile_all(source: &str) -> (Vec<CompiledQuery>, crate::diagnostics::Diagnostics) {
    let (parsed, parse_diagnostics) = parse(source);
    assert!(
        parse_diagnostics.is_empty(),
        "source must parse cleanly: {parse_diagnostics:?}"
    );
    let root = parsed.root();
    let mut symbols = SymbolTable::new();
    symbols.update(DocumentId::new(0), &root);
    compile_document(&root, &symbols)
}

fn diagnostics_empty(diagnostics: &crate::diagnostics::Diagnostics) -> bool {
    diagnostics.is_empty()
}

#[test]
fn terms_are_space_joined() {
    let compiled = compile_one("is:open   label:bug    crash");
    assert_eq!(compiled.q, "is:open label:bug crash");
    assert_eq!(compiled.sort, None);
    assert_eq!(compiled.order, SortOrder::Desc);
}

#[test]
fn quoting_and_negation_survive_verbatim() {
    let compiled = compile_one(r#"-label:"won't fix" reason:"not planned""#);
    assert_eq!(compiled.q, r#"-label:"won't fix" reason:"not planned""#);
}

#[test]
fn comparisons_ranges_and_lists_survive_verbatim() {
    let compiled = compile_one("comments:>=10 created:2023-01-01..2023-06-30 label:bug,ui");
    assert_eq!(
        compiled.q,
        "comments:>=10 created:2023-01-01..2023-06-30 label:bug,ui"
    );
}

#[test]
fn sort_directive_is_lifted_out() {
    let compiled = compile_one("is:open sort:created-asc");
    assert_eq!(compiled.q, "is:open");
    assert_eq!(compiled.sort.as_deref(), Some("created"));
    assert_eq!(compiled.order, SortOrder::Asc);
}

#[test]
fn sort_order_defaults_to_descending() {
    let compiled = compile_one("is:open sort:comments");
    assert_eq!(compiled.sort.as_deref(), Some("comments"));
    assert_eq!(compiled.order, SortOrder::Desc);
}

#[test]
fn variable_expansion_is_inline() {
    let compiled = compile_one("$mine = author:@me is:open\n$mine label:bug");
    assert_eq!(compiled.q, "author:@me is:open label:bug");
}

#[test]
fn nested_expansion() {
    let compiled = compile_one("$base = repo:rust-lang/rust\n$mine = $base author:@me\n$mine is:open");
    assert_eq!(compiled.q, "repo:rust-lang/rust author:@me is:open");
}

#[test]
fn outer_sort_wins_over_expanded_sort() {
    let compiled = compile_one("$hot = is:open sort:comments-desc\n$hot sort:created-asc");
    assert_eq!(compiled.q, "is:open");
    assert_eq!(compiled.sort.as_deref(), Some("created"));
    assert_eq!(compiled.order, SortOrder::Asc);
}

#[test]
fn expanded_sort_applies_when_outer_query_has_none() {
    let compiled = compile_one("$hot = is:open sort:comments-desc\n$hot label:bug");
    assert_eq!(compiled.q, "is:open label:bug");
    assert_eq!(compiled.sort.as_deref(), Some("comments"));
    assert_eq!(compiled.order, SortOrder::Desc);
}

#[test]
fn definition_bodies_are_not_compiled_standalone() {
    let (compiled, _) = compile_all("$unused = is:open\nlabel:bug");
    assert_eq!(compiled.len(), 1);
    assert_eq!(compiled[0].q, "label:bug");
}

#[test]
fn each_query_line_compiles_separately() {
    let (compiled, diagnostics) = compile_all("is:open\nis:closed sort:updated-asc");
    assert!(diagnostics.is_empty());
    assert_eq!(compiled.len(), 2);
    assert_eq!(compiled[0].q, "is:open");
    assert_eq!(compiled[1].q, "is:closed");
    assert_eq!(compiled[1].sort.as_deref(), Some("updated"));
}

#[test]
fn self_reference_is_circular() {
    let source = "$a = $a label:bug\n$a";
    let (compiled, diagnostics) = compile_all(source);
    assert_eq!(
        diagnostics.iter().map(|d| d.kind()).collect::<Vec<_>>(),
        [DiagnosticKind::CircularReference]
    );
    // Expansion stops at the cycle but keeps the rest of the body.
    assert_eq!(compiled[0].q, "label:bug");
}

#[test]
fn mutual_recursion_is_circular() {
    let source = "$a = $b\n$b = $a\n$a";
    let (_, diagnostics) = compile_all(source);
    assert_eq!(
        diagnostics.iter().map(|d| d.kind()).collect::<Vec<_>>(),
        [DiagnosticKind::CircularReference]
    );
    let diag = diagnostics.iter().next().unwrap();
    assert_eq!(diag.message(), "`$a` refers to itself");
}

#[test]
fn undefined_reference_compiles_without_the_term() {
    let (parsed, _) = parse("$missing label:bug");
    let symbols = SymbolTable::new();
    let (compiled, diagnostics) = compile_document(&parsed.root(), &symbols);
    assert!(diagnostics.is_empty());
    assert_eq!(compiled[0].q, "label:bug");
}

#[test]
fn compilation_is_deterministic() {
    let source = "$a = label:bug\n$a comments:>5 sort:updated-desc";
    let first = compile_all(source);
    let second = compile_all(source);
    assert_eq!(first.0, second.0);
}

#[test]
fn compiled_query_serializes() {
    let (parsed, _) = parse("is:open sort:created-asc");
    let symbols = SymbolTable::new();
    let query = parsed.root().queries().next().unwrap();
    let (compiled, _) = compile_query(&query, &symbols);
    let json = serde_json::to_value(&compiled).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "q": "is:open",
            "sort": "created",
            "order": "asc",
        })
    );
}
