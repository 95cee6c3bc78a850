//! Typed AST wrappers over CST nodes.
//!
//! Each struct wraps a `SyntaxNode` and provides typed accessors.
//! Cast is infallible for correct `SyntaxKind` - validation happens elsewhere.

use rowan::TextRange;

use super::cst::{SyntaxKind, SyntaxNode, SyntaxToken};

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl $name {
            pub fn cast(node: SyntaxNode) -> Option<Self> {
                (node.kind() == SyntaxKind::$kind).then(|| Self(node))
            }

            pub fn as_cst(&self) -> &SyntaxNode {
                &self.0
            }

            pub fn range(&self) -> TextRange {
                self.0.text_range()
            }
        }
    };
}

ast_node!(Root, Root);
ast_node!(Query, Query);
ast_node!(VarDef, VarDef);
ast_node!(VarRef, VarRef);
ast_node!(QualifiedValue, QualifiedValue);
ast_node!(Literal, Literal);
ast_node!(SortBy, SortBy);
ast_node!(Missing, Missing);

/// Top-level statement: one line of the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Statement {
    Query(Query),
    VarDef(VarDef),
}

impl Statement {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::Query => Query::cast(node).map(Statement::Query),
            SyntaxKind::VarDef => VarDef::cast(node).map(Statement::VarDef),
            _ => None,
        }
    }
}

/// One filter term inside a query body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Literal(Literal),
    VarRef(VarRef),
    QualifiedValue(QualifiedValue),
}

impl Term {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::Literal => Literal::cast(node).map(Term::Literal),
            SyntaxKind::VarRef => VarRef::cast(node).map(Term::VarRef),
            SyntaxKind::QualifiedValue => QualifiedValue::cast(node).map(Term::QualifiedValue),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            Term::Literal(n) => n.as_cst(),
            Term::VarRef(n) => n.as_cst(),
            Term::QualifiedValue(n) => n.as_cst(),
        }
    }
}

impl Root {
    pub fn statements(&self) -> impl Iterator<Item = Statement> + '_ {
        self.0.children().filter_map(Statement::cast)
    }

    pub fn queries(&self) -> impl Iterator<Item = Query> + '_ {
        self.0.children().filter_map(Query::cast)
    }

    pub fn var_defs(&self) -> impl Iterator<Item = VarDef> + '_ {
        self.0.children().filter_map(VarDef::cast)
    }
}

impl VarDef {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| t.kind() == SyntaxKind::VariableName)
    }

    /// Variable name including the `$` sigil, as written.
    pub fn name(&self) -> Option<String> {
        self.name_token().map(|t| t.text().to_string())
    }

    pub fn body(&self) -> Option<Query> {
        self.0.children().find_map(Query::cast)
    }
}

impl Query {
    pub fn terms(&self) -> impl Iterator<Item = Term> + '_ {
        self.0.children().filter_map(Term::cast)
    }

    pub fn sort_by(&self) -> Option<SortBy> {
        self.0.children().find_map(SortBy::cast)
    }

    pub fn qualified_values(&self) -> impl Iterator<Item = QualifiedValue> + '_ {
        self.0.children().filter_map(QualifiedValue::cast)
    }
}

impl VarRef {
    /// Reference name including the `$` sigil.
    pub fn name(&self) -> String {
        self.0.text().to_string()
    }
}

impl QualifiedValue {
    /// True for `-qualifier:value`.
    pub fn negated(&self) -> bool {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .next()
            .is_some_and(|t| t.kind() == SyntaxKind::Dash)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| t.kind() == SyntaxKind::Word)
    }

    pub fn name(&self) -> String {
        self.name_token().map_or(String::new(), |t| t.text().to_string())
    }

    /// Everything after the colon, exactly as written (`>5`, `a,b`, `"x y"`).
    pub fn value_text(&self) -> String {
        let mut out = String::new();
        let mut seen_colon = false;
        for element in self.0.children_with_tokens() {
            match element {
                rowan::NodeOrToken::Token(t) => {
                    if seen_colon {
                        out.push_str(t.text());
                    } else if t.kind() == SyntaxKind::Colon {
                        seen_colon = true;
                    }
                }
                rowan::NodeOrToken::Node(n) => {
                    if seen_colon {
                        out.push_str(&n.text().to_string());
                    }
                }
            }
        }
        out
    }

    /// Range of the value portion: everything between the colon and the node
    /// end. `None` when the colon itself is missing.
    pub fn value_range(&self) -> Option<TextRange> {
        let colon = self
            .0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| t.kind() == SyntaxKind::Colon)?;
        Some(TextRange::new(colon.text_range().end(), self.range().end()))
    }

    /// The comma-separated value alternatives (one entry for plain values).
    pub fn values(&self) -> impl Iterator<Item = Literal> + '_ {
        self.0.children().filter_map(Literal::cast)
    }

    /// True when the value is a comparison or range rather than a plain literal.
    pub fn has_comparison(&self) -> bool {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .any(|t| {
                matches!(
                    t.kind(),
                    SyntaxKind::Gt
                        | SyntaxKind::Gte
                        | SyntaxKind::Lt
                        | SyntaxKind::Lte
                        | SyntaxKind::Range
                )
            })
    }
}

impl Literal {
    /// Exact source text, quotes included for quoted literals.
    pub fn text(&self) -> String {
        self.0.text().to_string()
    }

    /// Literal content with surrounding quotes stripped and escapes resolved.
    pub fn unquoted(&self) -> String {
        let raw = self.text();
        if !raw.starts_with('"') {
            return raw;
        }
        let inner = raw
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"').or(Some(s)))
            .unwrap_or(&raw);
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl SortBy {
    pub fn value(&self) -> Option<Literal> {
        self.0.children().find_map(Literal::cast)
    }

    /// The raw `field-order` text, e.g. `created-desc`.
    pub fn value_text(&self) -> Option<String> {
        self.value().map(|v| v.text())
    }
}
