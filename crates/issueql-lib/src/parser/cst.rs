//! Syntax kinds for the search query language.
//!
//! `SyntaxKind` serves dual roles: token kinds (from lexer) and node kinds (from parser).
//! Logos derives token recognition; node kinds lack token/regex attributes.
//! `QLang` implements Rowan's `Language` trait for tree construction.

use logos::Logos;
use rowan::Language;

/// All token and node kinds. Tokens first, then nodes, then `__LAST` sentinel.
/// `#[repr(u16)]` enables safe transmute in `kind_from_raw`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    #[token(":")]
    Colon = 0,

    #[token(",")]
    Comma,

    /// Leading `-` negates a qualifier; also appears between bare value tokens.
    #[token("-")]
    Dash,

    #[token("=")]
    Equals,

    /// `..` between two value endpoints. Defined before `Dot` for correct precedence.
    #[token("..")]
    Range,

    #[token(".")]
    Dot,

    #[token(">=")]
    Gte,

    #[token(">")]
    Gt,

    #[token("<=")]
    Lte,

    #[token("<")]
    Lt,

    /// `$name` - variable definition target or reference.
    #[regex(r"\$[A-Za-z_][A-Za-z0-9_]*")]
    VariableName,

    #[regex(r#""(?:[^"\\\n]|\\.)*""#, priority = 10)]
    #[doc(hidden)]
    StringLiteral, // Lexer-internal only

    /// A quote that never closes before the end of the line.
    #[regex(r#""(?:[^"\\\n]|\\.)*"#)]
    UnterminatedString,

    DoubleQuote,
    /// String content between quotes
    StrVal,

    /// Bare word: qualifier names and values. Dashes allowed inside
    /// (`2023-01-01`, `created-desc`); dots excluded so `10..20` splits.
    #[regex(r#"[^ \t\r\n:,."$=<>\-][^ \t\r\n:,."$=<>]*"#)]
    Word,

    #[regex(r"[ \t]+")]
    Whitespace,

    /// Statement separator - significant, not trivia.
    #[token("\n")]
    #[token("\r\n")]
    Newline,

    /// Coalesced unrecognized characters
    Garbage,
    Error,

    // --- Node kinds (non-terminals) ---
    Root,
    Query,
    VarDef,
    VarRef,
    QualifiedValue,
    Literal,
    SortBy,
    Missing,

    // Must be last - used for bounds checking in `kind_from_raw`
    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Whitespace)
    }

    #[inline]
    pub fn is_error(self) -> bool {
        matches!(self, Error | Garbage)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    #[inline]
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language tag for Rowan's tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QLang {}

impl Language for QLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 < __LAST as u16);
        // SAFETY: We've verified the value is in bounds, and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for Rowan types parameterized by our language.
pub type SyntaxNode = rowan::SyntaxNode<QLang>;
pub type SyntaxToken = rowan::SyntaxToken<QLang>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;

/// 64-bit bitset of `SyntaxKind`s for O(1) membership testing.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TokenSet(u64);

impl TokenSet {
    /// Panics at compile time if any kind's discriminant >= 64.
    #[inline]
    pub const fn new(kinds: &[SyntaxKind]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            let kind = kinds[i] as u16;
            assert!(kind < 64, "SyntaxKind value exceeds TokenSet capacity");
            bits |= 1 << kind;
            i += 1;
        }
        TokenSet(bits)
    }

    #[inline]
    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        if kind >= 64 {
            return false;
        }
        self.0 & (1 << kind) != 0
    }

    #[inline]
    pub const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_set();
        for i in 0..64u16 {
            if self.0 & (1 << i) != 0 && i < __LAST as u16 {
                let kind: SyntaxKind = unsafe { std::mem::transmute(i) };
                list.entry(&kind);
            }
        }
        list.finish()
    }
}

/// Pre-defined token sets for the parser.
pub mod token_sets {
    use super::*;

    /// FIRST set of a statement term.
    pub const TERM_FIRST: TokenSet = TokenSet::new(&[
        Word,
        DoubleQuote,
        UnterminatedString,
        VariableName,
        Dash,
    ]);

    /// Comparison operators prefixing a value.
    pub const COMPARISONS: TokenSet = TokenSet::new(&[Gt, Gte, Lt, Lte]);

    /// Tokens that fuse into one contiguous bare literal.
    pub const VALUE_CONT: TokenSet = TokenSet::new(&[Word, Dash, Dot]);

    pub const TRIVIA: TokenSet = TokenSet::new(&[Whitespace]);
}
