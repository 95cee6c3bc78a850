//! Grammar productions for the search query language.
//!
//! A document is a sequence of lines. Each non-blank line is either a
//! variable definition (`$name = <body>`) or a query. A body is a
//! whitespace-separated sequence of terms: bare or quoted literals,
//! `$variable` references, and `[-]qualifier:value` pairs. Lookahead is one
//! token (plus one raw peek to split `$x = ...` from a `$x` reference); no
//! backtracking. A malformed statement recovers at the next newline and
//! never corrupts its siblings.

use rowan::TextRange;

use super::core::Parser;
use super::cst::SyntaxKind;
use super::cst::token_sets::{COMPARISONS, TERM_FIRST, VALUE_CONT};
use crate::diagnostics::DiagnosticKind;

impl Parser<'_> {
    pub fn parse_root(&mut self) {
        self.start_node(SyntaxKind::Root);

        loop {
            let kind = self.current();
            if self.eof() {
                break;
            }
            match kind {
                SyntaxKind::Newline => {
                    self.bump();
                }
                SyntaxKind::VariableName if self.next_non_trivia() == SyntaxKind::Equals => {
                    self.parse_var_def();
                }
                k if TERM_FIRST.contains(k) => {
                    self.parse_query();
                }
                _ => {
                    self.error_msg(
                        DiagnosticKind::UnexpectedToken,
                        "expected a query or `$name = ...`",
                    );
                    self.recover_to_newline();
                }
            }
        }

        // Trailing trivia still belongs inside the root node.
        self.drain_trivia();
        self.finish_node();
    }

    /// `$name = <body>`
    fn parse_var_def(&mut self) {
        self.start_node(SyntaxKind::VarDef);
        self.bump(); // $name
        self.expect(SyntaxKind::Equals, "`=`");

        let kind = self.current();
        if TERM_FIRST.contains(kind) {
            self.parse_query();
        } else {
            let at = self.last_token_end();
            self.error_at(DiagnosticKind::ExpectedQueryBody, TextRange::empty(at), None);
            self.start_node(SyntaxKind::Missing);
            self.finish_node();
        }

        self.finish_node();
    }

    /// One query statement: terms up to the next newline.
    fn parse_query(&mut self) {
        self.start_node(SyntaxKind::Query);

        loop {
            let kind = self.current();
            if self.eof() || kind == SyntaxKind::Newline {
                break;
            }
            if TERM_FIRST.contains(kind) {
                self.parse_term();
            } else {
                self.error_msg(DiagnosticKind::UnexpectedToken, "not a valid query term");
                self.recover_to_newline();
                break;
            }
        }

        self.finish_node();
    }

    fn parse_term(&mut self) {
        match self.current() {
            SyntaxKind::Dash => self.parse_negated_qualifier(),
            SyntaxKind::Word => {
                // Qualifier only when the colon is adjacent: in `label : x`
                // the word stays a bare literal.
                if self.nth_raw(1) == SyntaxKind::Colon {
                    if self.current_text() == "sort" {
                        self.parse_sort_by();
                    } else {
                        self.start_node(SyntaxKind::QualifiedValue);
                        self.parse_qualifier_body();
                        self.finish_node();
                    }
                } else {
                    self.parse_bare_literal();
                }
            }
            SyntaxKind::DoubleQuote => self.parse_quoted_literal(),
            SyntaxKind::UnterminatedString => self.parse_unterminated_literal(),
            SyntaxKind::VariableName => {
                self.start_node(SyntaxKind::VarRef);
                self.bump();
                self.finish_node();
            }
            k => unreachable!("parse_term called on non-term token {:?}", k),
        }
    }

    /// `-qualifier:value`. The qualifier must be adjacent to the dash.
    fn parse_negated_qualifier(&mut self) {
        let checkpoint = self.checkpoint();
        let dash_span = self.current_span();
        self.bump(); // '-'

        if self.current_raw() == SyntaxKind::Word && self.nth_raw(1) == SyntaxKind::Colon {
            self.start_node_at(checkpoint, SyntaxKind::QualifiedValue);
            self.parse_qualifier_body();
            self.finish_node();
        } else {
            self.start_node_at(checkpoint, SyntaxKind::Missing);
            self.error_at(DiagnosticKind::ExpectedQualifier, dash_span, None);
            self.finish_node();
        }
    }

    /// `word ':' value` - shared by plain and negated qualifiers.
    fn parse_qualifier_body(&mut self) {
        self.bump(); // qualifier name
        self.bump(); // ':'
        self.parse_value();
    }

    /// `sort:field-order`, kept as its own node so the compiler can lift it
    /// out of the query string.
    fn parse_sort_by(&mut self) {
        self.start_node(SyntaxKind::SortBy);
        self.bump(); // 'sort'
        self.bump(); // ':'
        self.parse_simple_value();
        self.finish_node();
    }

    /// Value position after `:`. Either a comparison (`>5`), a range
    /// (`10..20`, `*..5`), or an OR-list (`a,b,c`). Everything must stay
    /// contiguous with the colon - whitespace ends the value.
    fn parse_value(&mut self) {
        if COMPARISONS.contains(self.current_raw()) {
            self.bump();
            self.parse_simple_value();
            return;
        }

        if !self.parse_simple_value() {
            return;
        }

        if self.current_raw() == SyntaxKind::Range {
            self.bump();
            self.parse_simple_value();
        } else {
            while self.current_raw() == SyntaxKind::Comma {
                self.bump();
                if !self.parse_simple_value() {
                    break;
                }
            }
        }
    }

    /// One atomic value: a quoted string or a contiguous bare token run.
    /// Returns `false` (after reporting) when no value is present.
    fn parse_simple_value(&mut self) -> bool {
        match self.current_raw() {
            SyntaxKind::DoubleQuote => {
                self.parse_quoted_literal();
                true
            }
            SyntaxKind::UnterminatedString => {
                self.parse_unterminated_literal();
                true
            }
            k if VALUE_CONT.contains(k) => {
                self.parse_bare_literal();
                true
            }
            _ => {
                let at = self.last_token_end();
                self.error_at(DiagnosticKind::ExpectedValue, TextRange::empty(at), None);
                self.start_node(SyntaxKind::Missing);
                self.finish_node();
                false
            }
        }
    }

    /// Adjacent words, dashes and dots fuse into one literal whose range is
    /// the exact source slice (`2023-01-01`, `v1.2`, `owner/repo`).
    fn parse_bare_literal(&mut self) {
        self.start_node(SyntaxKind::Literal);
        self.bump();
        while VALUE_CONT.contains(self.current_raw()) {
            self.bump();
        }
        self.finish_node();
    }

    /// `"..."` - the literal's range covers both quotes.
    fn parse_quoted_literal(&mut self) {
        self.start_node(SyntaxKind::Literal);
        self.bump(); // opening quote
        if self.current_raw() == SyntaxKind::StrVal {
            self.bump();
        }
        // The lexer only emits quote tokens from terminated strings.
        self.eat(SyntaxKind::DoubleQuote);
        self.finish_node();
    }

    fn parse_unterminated_literal(&mut self) {
        self.error(DiagnosticKind::UnterminatedString);
        self.start_node(SyntaxKind::Literal);
        self.bump();
        self.finish_node();
    }
}
