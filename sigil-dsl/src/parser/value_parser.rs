//! Type-directed recursive value parser
//!
//! Given a type descriptor and a scanner positioned at a value's start, the
//! parser consumes exactly that value's tokens, leaving the trailing
//! delimiter (`,` `;` `}` or EOF) unconsumed. Composite shapes recurse;
//! `Any` runs syntax-driven inference before materializing. Composite
//! parses fail fast on the first child error; isolating one marker's
//! failure from its siblings is the registry's job.

use crate::lexer::{Scanner, TokenKind};
use crate::schema::{TypeDescriptor, TypeKind};
use sigil_core::{ParseError, ParseErrorKind, Value};
use std::collections::BTreeMap;

/// Maximum literal nesting depth. Recursion is bounded only by the input,
/// so adversarial nesting is cut off here.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Parses one value of a declared type from a scanner.
pub struct ValueParser<'a, 'src> {
    scanner: &'a mut Scanner<'src>,
    field: &'a str,
}

impl<'a, 'src> ValueParser<'a, 'src> {
    pub fn new(scanner: &'a mut Scanner<'src>, field: &'a str) -> Self {
        Self { scanner, field }
    }

    /// Parse exactly one value of the descriptor's type. Soft scanner
    /// errors that survive the parse (an unterminated quote, a structural
    /// mismatch) are promoted to a hard error here.
    pub fn parse(mut self, descriptor: &TypeDescriptor) -> Result<Value, ParseError> {
        let before = self.scanner.error_count();
        let value = self.parse_at(descriptor, 0)?;
        if self.scanner.error_count() > before {
            return Err(self.promote());
        }
        Ok(value)
    }

    fn parse_at(&mut self, descriptor: &TypeDescriptor, depth: usize) -> Result<Value, ParseError> {
        if depth >= MAX_NESTING_DEPTH {
            return Err(self.error(ParseErrorKind::TooDeep {
                limit: MAX_NESTING_DEPTH,
            }));
        }

        match &descriptor.kind {
            TypeKind::Bool => self.parse_bool(),
            TypeKind::SignedInt => self.parse_integer(true),
            TypeKind::UnsignedInt => self.parse_integer(false),
            TypeKind::Str => self.parse_string(descriptor),
            TypeKind::Slice(item) => self.parse_slice(item, depth),
            TypeKind::Map(item) => self.parse_map(item, depth),
            TypeKind::Any => {
                let inferred = self.infer(depth == 0, depth)?;
                self.parse_at(&inferred, depth)
            }
            // The schema compiler rejects these kinds; a descriptor built
            // by hand still gets a hard error instead of a silent no-op.
            other => Err(self.mismatch(format!("a parseable kind, not {}", other.name()))),
        }
    }

    // ------------------------------------------------------------------
    // Scalars
    // ------------------------------------------------------------------

    fn parse_bool(&mut self) -> Result<Value, ParseError> {
        let kind = self.scanner.scan();
        if kind == TokenKind::Ident {
            match self.scanner.token() {
                "true" => return Ok(Value::Bool(true)),
                "false" => return Ok(Value::Bool(false)),
                _ => {}
            }
        }
        Err(self.mismatch("bool (true or false)".to_string()))
    }

    fn parse_integer(&mut self, signed: bool) -> Result<Value, ParseError> {
        self.scanner.skip_whitespaces();
        let negative = if self.scanner.peek() == Some('-') {
            self.scanner.next();
            true
        } else {
            false
        };

        if self.scanner.scan() != TokenKind::Integer {
            return Err(self.mismatch("integer".to_string()));
        }
        let digits = self.scanner.token();

        if negative && !signed {
            return Err(self.error(ParseErrorKind::NegativeUnsigned {
                field: self.field.to_string(),
                value: format!("-{}", digits),
            }));
        }

        if signed {
            let text = if negative {
                format!("-{}", digits)
            } else {
                digits.to_string()
            };
            text.parse::<i64>().map(Value::Int).map_err(|_| {
                self.error(ParseErrorKind::OutOfRange {
                    field: self.field.to_string(),
                    value: text.clone(),
                })
            })
        } else {
            digits.parse::<u64>().map(Value::UInt).map_err(|_| {
                self.error(ParseErrorKind::OutOfRange {
                    field: self.field.to_string(),
                    value: digits.to_string(),
                })
            })
        }
    }

    // ------------------------------------------------------------------
    // Strings
    // ------------------------------------------------------------------

    fn parse_string(&mut self, descriptor: &TypeDescriptor) -> Result<Value, ParseError> {
        self.scanner.skip_whitespaces();
        let raw = match self.scanner.peek() {
            Some('"') | Some('`') => {
                self.scanner.scan();
                unescape_quoted(self.scanner.token())
            }
            _ => self.parse_bare_string(),
        };

        if descriptor.enum_table.is_some() {
            return match descriptor.enum_label(&raw) {
                Some(label) => Ok(Value::Str(label.to_string())),
                None => Err(self.error(ParseErrorKind::NotInEnum {
                    field: self.field.to_string(),
                    value: raw,
                })),
            };
        }

        Ok(Value::Str(raw))
    }

    /// Bare string: everything up to the next unescaped `,` `;` `:` `}` or
    /// EOF, trimmed of horizontal whitespace. A backslash escapes a
    /// delimiter (or itself) and is dropped; any other escape is kept
    /// verbatim.
    fn parse_bare_string(&mut self) -> String {
        let mut out = String::new();
        loop {
            match self.scanner.peek() {
                None => break,
                Some(',') | Some(';') | Some(':') | Some('}') => break,
                Some('\\') => {
                    self.scanner.next();
                    match self.scanner.peek() {
                        Some(c) if matches!(c, ',' | ';' | ':' | '}' | '\\') => {
                            out.push(c);
                            self.scanner.next();
                        }
                        Some(c) => {
                            out.push('\\');
                            out.push(c);
                            self.scanner.next();
                        }
                        None => out.push('\\'),
                    }
                }
                Some(c) => {
                    out.push(c);
                    self.scanner.next();
                }
            }
        }
        out.trim_matches([' ', '\t', '\r']).to_string()
    }

    // ------------------------------------------------------------------
    // Composites
    // ------------------------------------------------------------------

    fn parse_slice(&mut self, item: &TypeDescriptor, depth: usize) -> Result<Value, ParseError> {
        self.scanner.skip_whitespaces();
        if self.scanner.peek() == Some('{') {
            self.parse_braced_slice(item, depth)
        } else {
            self.parse_legacy_slice(item, depth)
        }
    }

    /// Brace form: `{ v (, v)* }`, trailing comma tolerated.
    fn parse_braced_slice(
        &mut self,
        item: &TypeDescriptor,
        depth: usize,
    ) -> Result<Value, ParseError> {
        if !self.scanner.expect(TokenKind::Punct('{'), "'{'") {
            return Err(self.promote());
        }

        let mut items = Vec::new();
        loop {
            self.scanner.skip_whitespaces();
            if self.scanner.peek() == Some('}') {
                break;
            }
            items.push(self.parse_at(item, depth + 1)?);
            self.scanner.skip_whitespaces();
            if self.scanner.peek() == Some(',') {
                self.scanner.scan();
            } else {
                break;
            }
        }

        if !self.scanner.expect(TokenKind::Punct('}'), "'}'") {
            return Err(self.promote());
        }
        Ok(Value::Seq(items))
    }

    /// Legacy bare form: `v (; v)*`, terminated by `,` `}` or EOF.
    fn parse_legacy_slice(
        &mut self,
        item: &TypeDescriptor,
        depth: usize,
    ) -> Result<Value, ParseError> {
        let mut items = vec![self.parse_at(item, depth + 1)?];
        loop {
            self.scanner.skip_whitespaces();
            if self.scanner.peek() == Some(';') {
                self.scanner.scan();
                items.push(self.parse_at(item, depth + 1)?);
            } else {
                break;
            }
        }
        Ok(Value::Seq(items))
    }

    /// Map form: `{ k : v (, k : v)* }`; keys always parse as strings,
    /// trailing comma tolerated, last binding of a repeated key wins.
    fn parse_map(&mut self, item: &TypeDescriptor, depth: usize) -> Result<Value, ParseError> {
        self.scanner.skip_whitespaces();
        if !self.scanner.expect(TokenKind::Punct('{'), "'{'") {
            return Err(self.promote());
        }

        let key_descriptor = TypeDescriptor::new(TypeKind::Str);
        let mut entries = BTreeMap::new();
        loop {
            self.scanner.skip_whitespaces();
            if self.scanner.peek() == Some('}') {
                break;
            }
            let key = match self.parse_string(&key_descriptor)? {
                Value::Str(key) => key,
                _ => unreachable!("string descriptor parses to Str"),
            };
            if !self.scanner.expect(TokenKind::Punct(':'), "':'") {
                return Err(self.promote());
            }
            let value = self.parse_at(item, depth + 1)?;
            entries.insert(key, value);
            self.scanner.skip_whitespaces();
            if self.scanner.peek() == Some(',') {
                self.scanner.scan();
            } else {
                break;
            }
        }

        if !self.scanner.expect(TokenKind::Punct('}'), "'}'") {
            return Err(self.promote());
        }
        Ok(Value::Map(entries))
    }

    // ------------------------------------------------------------------
    // Dynamic inference
    // ------------------------------------------------------------------

    /// Infer the shape of the next value from its literal syntax without
    /// consuming input. The scanner is fully restored on completion,
    /// including soft errors recorded during speculation.
    fn infer(&mut self, top_level: bool, depth: usize) -> Result<TypeDescriptor, ParseError> {
        if depth >= MAX_NESTING_DEPTH {
            return Err(self.error(ParseErrorKind::TooDeep {
                limit: MAX_NESTING_DEPTH,
            }));
        }

        let checkpoint = self.scanner.checkpoint();
        let inferred = self.infer_speculative(top_level, depth);
        self.scanner.restore(checkpoint);
        inferred.map(TypeDescriptor::new)
    }

    /// Speculative body of `infer`; the caller restores the scanner.
    fn infer_speculative(
        &mut self,
        top_level: bool,
        depth: usize,
    ) -> Result<TypeKind, ParseError> {
        // A bare top-level `;` before the next top-level `,` or EOF means
        // the whole value is a legacy slice, whatever its head looks like.
        if top_level && self.legacy_slice_ahead() {
            return Ok(TypeKind::Slice(Box::new(TypeDescriptor::new(
                TypeKind::Any,
            ))));
        }

        self.scanner.skip_whitespaces();
        let kind = match self.scanner.peek() {
            Some('"') | Some('`') => TypeKind::Str,
            Some('{') => {
                self.scanner.next();
                let inner = self.infer(false, depth + 1)?;
                let any = Box::new(TypeDescriptor::new(TypeKind::Any));
                if inner.kind == TypeKind::Str {
                    // A string element immediately followed by ':' is a
                    // map entry; anything else is a slice element.
                    let _ = self.parse_string(&inner)?;
                    self.scanner.skip_whitespaces();
                    if self.scanner.peek() == Some(':') {
                        TypeKind::Map(any)
                    } else {
                        TypeKind::Slice(any)
                    }
                } else {
                    TypeKind::Slice(any)
                }
            }
            Some('t') | Some('f') => {
                let kind = self.scanner.scan();
                if kind == TokenKind::Ident && matches!(self.scanner.token(), "true" | "false") {
                    TypeKind::Bool
                } else {
                    TypeKind::Str
                }
            }
            Some(c) if c == '-' || c.is_ascii_digit() => {
                if self.scanner.peek() == Some('-') {
                    self.scanner.next();
                }
                if self.scanner.scan() == TokenKind::Integer {
                    TypeKind::SignedInt
                } else {
                    TypeKind::Str
                }
            }
            _ => TypeKind::Str,
        };
        Ok(kind)
    }

    /// Look ahead for a bare `;` before the next top-level `,` `}` or EOF,
    /// skipping braced nesting and quoted strings. Restores the scanner.
    fn legacy_slice_ahead(&mut self) -> bool {
        let checkpoint = self.scanner.checkpoint();
        let mut nesting = 0usize;
        let mut found = false;

        loop {
            match self.scanner.next() {
                None => break,
                Some('{') => nesting += 1,
                Some('}') => {
                    if nesting == 0 {
                        break;
                    }
                    nesting -= 1;
                }
                Some(',') if nesting == 0 => break,
                Some(';') if nesting == 0 => {
                    found = true;
                    break;
                }
                Some('"') => self.skip_quoted('"', true),
                Some('`') => self.skip_quoted('`', false),
                Some('\\') => {
                    self.scanner.next();
                }
                Some(_) => {}
            }
        }

        self.scanner.restore(checkpoint);
        found
    }

    /// Advance past a quoted string body whose opening quote was consumed.
    fn skip_quoted(&mut self, quote: char, escapes: bool) {
        loop {
            match self.scanner.next() {
                None => break,
                Some(c) if c == quote => break,
                Some('\\') if escapes => {
                    self.scanner.next();
                }
                Some(_) => {}
            }
        }
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.scanner.token_position())
    }

    fn mismatch(&self, expected: String) -> ParseError {
        self.error(ParseErrorKind::TypeMismatch {
            field: self.field.to_string(),
            expected,
        })
    }

    /// Promote the scanner's most recent soft error to a hard error.
    fn promote(&mut self) -> ParseError {
        self.scanner
            .last_error()
            .cloned()
            .unwrap_or_else(|| self.mismatch("a well-formed value".to_string()))
    }
}

/// Strip the quotes from a scanned string token and unescape its body.
///
/// Double-quoted bodies get the standard escapes (`\n \t \r \\ \"`);
/// unknown escapes are kept verbatim. Backtick bodies are raw. A missing
/// closing quote (already reported by the scanner) strips only the opener.
fn unescape_quoted(token: &str) -> String {
    let mut chars = token.chars();
    let quote = match chars.next() {
        Some(q) => q,
        None => return String::new(),
    };

    let body: Vec<char> = chars.collect();
    let body = match body.last() {
        Some(&last) if last == quote && !ends_with_escape(&body, quote) => &body[..body.len() - 1],
        _ => &body[..],
    };

    if quote == '`' {
        return body.iter().collect();
    }

    let mut out = String::with_capacity(body.len());
    let mut iter = body.iter();
    while let Some(&c) = iter.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match iter.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some(&other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// True when the trailing quote is itself escaped (`"abc\"` has no closer).
fn ends_with_escape(body: &[char], quote: char) -> bool {
    if quote == '`' {
        return false;
    }
    let mut backslashes = 0;
    for &c in body[..body.len().saturating_sub(1)].iter().rev() {
        if c == '\\' {
            backslashes += 1;
        } else {
            break;
        }
    }
    backslashes % 2 == 1
}
