//! Character scanner for marker text
//!
//! One scanner instance lexes one marker and is discarded. Token mismatches
//! are recorded as positioned soft errors and scanning continues; the value
//! parser decides when an accumulated soft error becomes a hard failure.

use super::token::TokenKind;
use sigil_core::{ParseError, ParseErrorKind, Position};

/// Opaque cursor snapshot for backtracking.
///
/// Restoring also discards soft errors recorded after the snapshot, so a
/// speculative lookahead leaves no diagnostics behind.
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint {
    cursor: usize,
    token_start: usize,
    token_end: usize,
    error_count: usize,
}

/// Scanner for one marker's text.
pub struct Scanner<'a> {
    source: &'a str,
    chars: Vec<(usize, char)>,
    cursor: usize,
    token_start: usize,
    token_end: usize,
    origin: Position,
    errors: Vec<ParseError>,
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn is_horizontal_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r')
}

impl<'a> Scanner<'a> {
    /// Create a scanner over marker text positioned at `origin` in the host
    /// source.
    pub fn new(source: &'a str, origin: Position) -> Self {
        Self {
            source,
            chars: source.char_indices().collect(),
            cursor: 0,
            token_start: 0,
            token_end: 0,
            origin,
            errors: Vec::new(),
        }
    }

    /// Current lookahead character without consuming. `None` at EOF.
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.cursor).map(|&(_, c)| c)
    }

    /// Advance one character. `None` past the end.
    pub fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += 1;
        Some(c)
    }

    /// Advance past horizontal whitespace (space, tab, CR, never LF)
    /// without scanning a token.
    pub fn skip_whitespaces(&mut self) {
        while self.peek().is_some_and(is_horizontal_whitespace) {
            self.cursor += 1;
        }
    }

    /// Scan one token: skip horizontal whitespace, then classify.
    pub fn scan(&mut self) -> TokenKind {
        self.skip_whitespaces();
        self.token_start = self.cursor;

        let kind = match self.peek() {
            None => TokenKind::Eof,
            Some(c) if is_ident_start(c) => {
                while self.peek().is_some_and(is_ident_continue) {
                    self.cursor += 1;
                }
                TokenKind::Ident
            }
            Some(c) if c.is_ascii_digit() => {
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.cursor += 1;
                }
                TokenKind::Integer
            }
            Some('"') => self.scan_quoted('"', true),
            Some('`') => self.scan_quoted('`', false),
            Some(c) => {
                self.cursor += 1;
                TokenKind::Punct(c)
            }
        };

        self.token_end = self.cursor;
        kind
    }

    /// Consume a quoted string including its quotes. Escapes are honored
    /// only to find the closing quote; unescaping is the caller's job.
    fn scan_quoted(&mut self, quote: char, escapes: bool) -> TokenKind {
        let start = self.cursor;
        self.cursor += 1; // opening quote

        loop {
            match self.peek() {
                None => {
                    self.soft_error(ParseErrorKind::UnterminatedString, start);
                    break;
                }
                Some(c) if c == quote => {
                    self.cursor += 1;
                    break;
                }
                Some('\\') if escapes => {
                    self.cursor += 1;
                    if self.peek().is_some() {
                        self.cursor += 1;
                    }
                }
                Some(_) => {
                    self.cursor += 1;
                }
            }
        }

        TokenKind::Str
    }

    /// Scan one token and require its kind. On mismatch a positioned soft
    /// error is recorded and `false` is returned; scanning continues.
    pub fn expect(&mut self, expected: TokenKind, description: &str) -> bool {
        let got = self.scan();
        if got == expected {
            return true;
        }

        let found = match got {
            TokenKind::Eof => "<eof>".to_string(),
            _ => self.token().to_string(),
        };
        self.soft_error(
            ParseErrorKind::UnexpectedToken {
                expected: description.to_string(),
                found,
            },
            self.token_start,
        );
        false
    }

    /// Raw source text of the last scanned token.
    pub fn token(&self) -> &'a str {
        &self.source[self.byte_at(self.token_start)..self.byte_at(self.token_end)]
    }

    /// Save the cursor for later backtracking.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            cursor: self.cursor,
            token_start: self.token_start,
            token_end: self.token_end,
            error_count: self.errors.len(),
        }
    }

    /// Reset to a saved cursor, discarding soft errors recorded since.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.cursor = checkpoint.cursor;
        self.token_start = checkpoint.token_start;
        self.token_end = checkpoint.token_end;
        self.errors.truncate(checkpoint.error_count);
    }

    /// Position of the current cursor in the host source.
    pub fn position(&self) -> Position {
        self.position_at(self.cursor)
    }

    /// Position of the last scanned token's start.
    pub fn token_position(&self) -> Position {
        self.position_at(self.token_start)
    }

    /// Map a character index in the marker text to a host-source position.
    fn position_at(&self, index: usize) -> Position {
        self.origin.shifted(index)
    }

    pub fn at_eof(&self) -> bool {
        self.cursor >= self.chars.len()
    }

    /// Unconsumed remainder of the marker text.
    pub fn rest(&self) -> &'a str {
        &self.source[self.byte_at(self.cursor)..]
    }

    /// Number of soft errors recorded so far.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// The most recently recorded soft error.
    pub fn last_error(&self) -> Option<&ParseError> {
        self.errors.last()
    }

    /// Drain the recorded soft errors.
    pub fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    fn soft_error(&mut self, kind: ParseErrorKind, index: usize) {
        self.errors.push(ParseError::new(kind, self.position_at(index)));
    }

    fn byte_at(&self, index: usize) -> usize {
        self.chars
            .get(index)
            .map(|&(offset, _)| offset)
            .unwrap_or(self.source.len())
    }
}
