use pretty_assertions::assert_eq;
use rowan::TextRange;

use super::ast::{Query, Term};
use super::parse;

fn first_query(source: &str) -> Query {
    let (parse, diagnostics) = parse(source);
    assert!(
        diagnostics.is_empty(),
        "unexpected diagnostics: {diagnostics:?}"
    );
    parse.root().queries().next().expect("no query parsed")
}

#[test]
fn root_statement_accessors() {
    let (parse, _) = parse("$a = label:bug\nis:open\n$a state:closed");
    let root = parse.root();
    assert_eq!(root.statements().count(), 3);
    assert_eq!(root.var_defs().count(), 1);
    // Definition bodies are nested; only top-level queries count here.
    assert_eq!(root.queries().count(), 2);
}

#[test]
fn var_def_name_keeps_sigil() {
    let (parse, _) = parse("$mine = author:@me");
    let def = parse.root().var_defs().next().unwrap();
    assert_eq!(def.name().as_deref(), Some("$mine"));
    let body = def.body().unwrap();
    assert_eq!(body.terms().count(), 1);

    let token = def.name_token().unwrap();
    assert_eq!(token.text_range(), TextRange::new(0.into(), 5.into()));
}

#[test]
fn var_ref_name_and_range() {
    let (parse, _) = parse("$a = x\n$a y");
    let query = parse.root().queries().next().unwrap();
    let Some(Term::VarRef(var_ref)) = query.terms().next() else {
        panic!("expected a variable reference");
    };
    assert_eq!(var_ref.name(), "$a");
    assert_eq!(var_ref.range(), TextRange::new(7.into(), 9.into()));
}

#[test]
fn qualified_value_accessors() {
    let query = first_query("-label:wontfix comments:>5");
    let mut terms = query.qualified_values();

    let negated = terms.next().unwrap();
    assert!(negated.negated());
    assert_eq!(negated.name(), "label");
    assert_eq!(negated.value_text(), "wontfix");
    assert!(!negated.has_comparison());

    let comments = terms.next().unwrap();
    assert!(!comments.negated());
    assert_eq!(comments.name(), "comments");
    assert_eq!(comments.value_text(), ">5");
    assert!(comments.has_comparison());
}

#[test]
fn value_text_covers_ranges_and_lists() {
    let query = first_query("created:2023-01-01..2023-06-30 label:bug,ui");
    let mut terms = query.qualified_values();
    assert_eq!(terms.next().unwrap().value_text(), "2023-01-01..2023-06-30");
    assert_eq!(terms.next().unwrap().value_text(), "bug,ui");
}

#[test]
fn value_text_keeps_quotes() {
    let query = first_query(r#"label:"good first issue""#);
    let qualified = query.qualified_values().next().unwrap();
    assert_eq!(qualified.value_text(), r#""good first issue""#);
}

#[test]
fn values_iterates_or_alternatives() {
    let query = first_query("label:bug,ui,docs");
    let qualified = query.qualified_values().next().unwrap();
    let values: Vec<String> = qualified.values().map(|v| v.unquoted()).collect();
    assert_eq!(values, ["bug", "ui", "docs"]);
}

#[test]
fn literal_unquoted_strips_quotes_and_escapes() {
    let query = first_query(r#"label:"a \"quoted\" label""#);
    let literal = query.qualified_values().next().unwrap().values().next().unwrap();
    assert_eq!(literal.text(), r#""a \"quoted\" label""#);
    assert_eq!(literal.unquoted(), r#"a "quoted" label"#);
}

#[test]
fn quoted_literal_range_covers_both_quotes() {
    let query = first_query(r#"label:"x y""#);
    let literal = query.qualified_values().next().unwrap().values().next().unwrap();
    assert_eq!(literal.range(), TextRange::new(6.into(), 11.into()));
}

#[test]
fn bare_literal_term() {
    let query = first_query("crash label:bug");
    let Some(Term::Literal(literal)) = query.terms().next() else {
        panic!("expected a bare literal");
    };
    assert_eq!(literal.text(), "crash");
    assert_eq!(literal.unquoted(), "crash");
}

#[test]
fn sort_by_accessor() {
    let query = first_query("is:open sort:created-asc");
    let sort = query.sort_by().expect("sort directive");
    assert_eq!(sort.value_text().as_deref(), Some("created-asc"));
    // Sort directives are not terms.
    assert_eq!(query.terms().count(), 1);
}

#[test]
fn query_without_sort() {
    let query = first_query("is:open");
    assert!(query.sort_by().is_none());
}
