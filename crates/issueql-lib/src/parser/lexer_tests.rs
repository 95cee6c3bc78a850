use pretty_assertions::assert_eq;
use rowan::TextRange;

use super::cst::SyntaxKind;
use super::lexer::{Token, lex, token_text};

fn kinds(source: &str) -> Vec<SyntaxKind> {
    lex(source).into_iter().map(|t| t.kind).collect()
}

/// Token spans must be contiguous, non-overlapping, and cover the whole
/// source; concatenating their slices reconstructs the input exactly.
fn assert_reconstructs(source: &str) {
    let tokens = lex(source);
    let mut cursor = 0u32;
    let mut rebuilt = String::new();
    for token in &tokens {
        assert_eq!(
            u32::from(token.span.start()),
            cursor,
            "gap or overlap before {token:?} in {source:?}"
        );
        cursor = token.span.end().into();
        rebuilt.push_str(token_text(source, token));
    }
    assert_eq!(cursor as usize, source.len());
    assert_eq!(rebuilt, source);
}

#[test]
fn reconstructs_source_exactly() {
    for source in [
        "",
        "label:bug is:open",
        "repo:rust-lang/rust comments:>100",
        "created:2023-01-01..2023-06-30 sort:updated-asc",
        "$mine = author:@me\n$mine state:open\r\nlabel:\"good first issue\"",
        "   leading  and   trailing   ",
        "\"unclosed string",
        "$$ garbage $ok",
        "a,b,c in:title,body",
    ] {
        assert_reconstructs(source);
    }
}

#[test]
fn qualifier_tokens() {
    assert_eq!(
        kinds("label:bug"),
        [SyntaxKind::Word, SyntaxKind::Colon, SyntaxKind::Word]
    );
}

#[test]
fn range_splits_but_dates_stay_whole() {
    assert_eq!(
        kinds("10..20"),
        [SyntaxKind::Word, SyntaxKind::Range, SyntaxKind::Word]
    );
    assert_eq!(kinds("2023-01-01"), [SyntaxKind::Word]);
    assert_eq!(
        kinds("v1.2"),
        [SyntaxKind::Word, SyntaxKind::Dot, SyntaxKind::Word]
    );
}

#[test]
fn comparison_operators() {
    assert_eq!(kinds(">=5"), [SyntaxKind::Gte, SyntaxKind::Word]);
    assert_eq!(kinds(">5"), [SyntaxKind::Gt, SyntaxKind::Word]);
    assert_eq!(kinds("<=5"), [SyntaxKind::Lte, SyntaxKind::Word]);
    assert_eq!(kinds("<5"), [SyntaxKind::Lt, SyntaxKind::Word]);
}

#[test]
fn repo_slug_is_one_word() {
    assert_eq!(kinds("rust-lang/rust"), [SyntaxKind::Word]);
}

#[test]
fn variable_names() {
    assert_eq!(kinds("$mine"), [SyntaxKind::VariableName]);
    assert_eq!(
        kinds("$a $b_2"),
        [
            SyntaxKind::VariableName,
            SyntaxKind::Whitespace,
            SyntaxKind::VariableName,
        ]
    );
}

#[test]
fn terminated_string_splits_into_quotes_and_content() {
    let tokens = lex(r#""ab""#);
    assert_eq!(
        tokens,
        [
            Token::new(SyntaxKind::DoubleQuote, TextRange::new(0.into(), 1.into())),
            Token::new(SyntaxKind::StrVal, TextRange::new(1.into(), 3.into())),
            Token::new(SyntaxKind::DoubleQuote, TextRange::new(3.into(), 4.into())),
        ]
    );
}

#[test]
fn empty_string_has_no_content_token() {
    assert_eq!(
        kinds(r#""""#),
        [SyntaxKind::DoubleQuote, SyntaxKind::DoubleQuote]
    );
}

#[test]
fn string_with_escaped_quote_stays_terminated() {
    assert_eq!(
        kinds(r#""a\"b""#),
        [
            SyntaxKind::DoubleQuote,
            SyntaxKind::StrVal,
            SyntaxKind::DoubleQuote,
        ]
    );
}

#[test]
fn unterminated_string_runs_to_line_end() {
    let tokens = lex("\"oops\nlabel:bug");
    assert_eq!(tokens[0].kind, SyntaxKind::UnterminatedString);
    assert_eq!(tokens[0].span, TextRange::new(0.into(), 5.into()));
    assert_eq!(tokens[1].kind, SyntaxKind::Newline);
}

#[test]
fn consecutive_errors_coalesce_into_one_garbage_token() {
    let tokens = lex("$$ ok");
    assert_eq!(tokens[0].kind, SyntaxKind::Garbage);
    assert_eq!(tokens[0].span, TextRange::new(0.into(), 2.into()));
    assert_eq!(tokens[1].kind, SyntaxKind::Whitespace);
    assert_eq!(tokens[2].kind, SyntaxKind::Word);
}

#[test]
fn trailing_garbage_is_flushed_at_eof() {
    let tokens = lex("ok $$");
    assert_eq!(tokens.last().map(|t| t.kind), Some(SyntaxKind::Garbage));
    assert_eq!(
        tokens.last().map(|t| t.span),
        Some(TextRange::new(3.into(), 5.into()))
    );
}

#[test]
fn newline_variants() {
    assert_eq!(
        kinds("a\nb\r\nc"),
        [
            SyntaxKind::Word,
            SyntaxKind::Newline,
            SyntaxKind::Word,
            SyntaxKind::Newline,
            SyntaxKind::Word,
        ]
    );
}

#[test]
fn token_text_slices_source() {
    let source = "label:bug";
    let tokens = lex(source);
    assert_eq!(token_text(source, &tokens[0]), "label");
    assert_eq!(token_text(source, &tokens[1]), ":");
    assert_eq!(token_text(source, &tokens[2]), "bug");
}
