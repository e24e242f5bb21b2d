//! Lexer token types

use std::fmt;

/// Token kinds for marker text.
///
/// Markers have a deliberately tiny lexical surface: identifiers, integer
/// runs, quoted strings, and single punctuation characters. Everything
/// composite (slices, maps, key=value fields) is structure imposed by the
/// value parser, not by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// End of marker text
    Eof,
    /// `_` or letter start, letter/digit/`_` continuation
    Ident,
    /// ASCII digit run
    Integer,
    /// `"…"` or `` `…` `` including the quotes; unescaping is the caller's job
    Str,
    /// Any other single character
    Punct(char),
}

impl TokenKind {
    /// Human-readable name for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Eof => "end of marker".to_string(),
            TokenKind::Ident => "identifier".to_string(),
            TokenKind::Integer => "integer".to_string(),
            TokenKind::Str => "string".to_string(),
            TokenKind::Punct(c) => format!("'{}'", c),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}
