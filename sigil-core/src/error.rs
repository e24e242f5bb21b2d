//! Error types for Sigil operations

use crate::Position;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Invalid schema declarations, raised only at registration.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaError {
    #[error("marker name must not be empty")]
    EmptyName,

    #[error("marker '{name}' declares an empty target level mask")]
    EmptyTargets { name: String },

    #[error("field '{field}': kind {kind} cannot be parsed from marker text")]
    UnsupportedKind { field: String, kind: String },

    #[error("field '{field}': optional wrapping cannot be nested")]
    NestedOptional { field: String },

    #[error("field '{field}': enum values require a string or string-slice type, got {kind}")]
    EnumTargetInvalid { field: String, kind: String },

    #[error("field '{field}': empty entry in enum specification")]
    EmptyEnumEntry { field: String },

    #[error("argument '{field}' is declared more than once")]
    DuplicateArgument { field: String },
}

/// Registration failures.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationError {
    #[error("marker '{name}' is already registered in scope '{scope}'")]
    Duplicate { scope: String, name: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// What went wrong while parsing one marker.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseErrorKind {
    #[error("expected {expected}, found '{found}'")]
    UnexpectedToken { expected: String, found: String },

    #[error("unterminated string")]
    UnterminatedString,

    #[error("field '{field}': expected {expected}")]
    TypeMismatch { field: String, expected: String },

    #[error("field '{field}': integer '{value}' is out of range")]
    OutOfRange { field: String, value: String },

    #[error("field '{field}': negative value '{value}' for unsigned field")]
    NegativeUnsigned { field: String, value: String },

    #[error("field '{field}': '{value}' is not one of the permitted values")]
    NotInEnum { field: String, value: String },

    #[error("nesting exceeds the maximum depth of {limit}")]
    TooDeep { limit: usize },

    #[error("field '{field}': unexpected characters after value: '{rest}'")]
    TrailingCharacters { field: String, rest: String },

    #[error("unknown field '{field}' for marker '{marker}'")]
    UnknownField { marker: String, field: String },

    #[error("field '{field}' given more than once for marker '{marker}'")]
    DuplicateField { marker: String, field: String },

    #[error("missing required field '{field}' for marker '{marker}'")]
    MissingField { marker: String, field: String },

    #[error("unknown marker '{name}'")]
    UnknownMarker { name: String },

    #[error("marker '{name}' cannot be applied to {level} declarations")]
    WrongTarget { name: String, level: String },

    #[error("marker '{marker}': {message}")]
    Validation { marker: String, message: String },
}

/// A positioned parse diagnostic.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("{position}: {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub position: Position,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, position: Position) -> Self {
        Self { kind, position }
    }
}

/// Ordered collection of positioned parse errors.
///
/// Batch operations (every marker on a node, every node in a file) collect
/// all failures instead of aborting on the first; `merge` flattens one
/// list into another while preserving order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorList {
    errors: Vec<ParseError>,
}

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// Append every error from `other`, preserving both orders.
    pub fn merge(&mut self, other: ErrorList) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseError> + '_ {
        self.errors.iter()
    }

    pub fn first(&self) -> Option<&ParseError> {
        self.errors.first()
    }

    /// Turn a non-empty list into `Err(self)`.
    pub fn into_result(self) -> Result<(), ErrorList> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ParseError> for ErrorList {
    fn from(error: ParseError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl IntoIterator for ErrorList {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl Extend<ParseError> for ErrorList {
    fn extend<T: IntoIterator<Item = ParseError>>(&mut self, iter: T) {
        self.errors.extend(iter);
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorList {}

/// Master error type for all Sigil operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SigilError {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("registration error: {0}")]
    Registration(#[from] RegistrationError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Aggregate(#[from] ErrorList),
}

/// Result type alias for Sigil operations.
pub type SigilResult<T> = Result<T, SigilError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position::new("pkg/user.go", 12, 4)
    }

    #[test]
    fn test_schema_error_display_empty_targets() {
        let err = SchemaError::EmptyTargets {
            name: "validate".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("validate"));
        assert!(msg.contains("empty target level"));
    }

    #[test]
    fn test_registration_error_display_duplicate() {
        let err = RegistrationError::Duplicate {
            scope: "acme/markers".to_string(),
            name: "validate".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("already registered"));
        assert!(msg.contains("acme/markers"));
    }

    #[test]
    fn test_registration_error_wraps_schema_error_transparently() {
        let err = RegistrationError::from(SchemaError::EmptyName);
        assert_eq!(format!("{}", err), "marker name must not be empty");
    }

    #[test]
    fn test_parse_error_display_carries_position() {
        let err = ParseError::new(
            ParseErrorKind::UnknownField {
                marker: "validate".to_string(),
                field: "maxx".to_string(),
            },
            pos(),
        );
        let msg = format!("{}", err);
        assert!(msg.starts_with("pkg/user.go:12:4: "));
        assert!(msg.contains("unknown field 'maxx'"));
    }

    #[test]
    fn test_error_list_merge_preserves_order() {
        let mut outer = ErrorList::new();
        outer.push(ParseError::new(
            ParseErrorKind::UnterminatedString,
            Position::new("a.go", 1, 1),
        ));

        let mut inner = ErrorList::new();
        inner.push(ParseError::new(
            ParseErrorKind::UnknownMarker {
                name: "nope".to_string(),
            },
            Position::new("a.go", 2, 1),
        ));
        inner.push(ParseError::new(
            ParseErrorKind::TooDeep { limit: 64 },
            Position::new("a.go", 3, 1),
        ));

        outer.merge(inner);
        assert_eq!(outer.len(), 3);
        let lines: Vec<String> = outer.iter().map(|e| format!("{}", e)).collect();
        assert!(lines[0].contains("unterminated"));
        assert!(lines[1].contains("unknown marker"));
        assert!(lines[2].contains("maximum depth"));
    }

    #[test]
    fn test_error_list_display_one_line_per_error() {
        let mut list = ErrorList::new();
        list.push(ParseError::new(
            ParseErrorKind::UnterminatedString,
            Position::new("a.go", 1, 3),
        ));
        list.push(ParseError::new(
            ParseErrorKind::TooDeep { limit: 64 },
            Position::new("b.go", 9, 1),
        ));
        let rendered = format!("{}", list);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("a.go:1:3:"));
        assert!(lines[1].starts_with("b.go:9:1:"));
    }

    #[test]
    fn test_error_list_into_result() {
        assert!(ErrorList::new().into_result().is_ok());
        let list = ErrorList::from(ParseError::new(
            ParseErrorKind::UnterminatedString,
            pos(),
        ));
        assert!(list.into_result().is_err());
    }

    #[test]
    fn test_sigil_error_from_variants() {
        let schema = SigilError::from(SchemaError::EmptyName);
        assert!(matches!(schema, SigilError::Schema(_)));

        let registration = SigilError::from(RegistrationError::Duplicate {
            scope: String::new(),
            name: "x".to_string(),
        });
        assert!(matches!(registration, SigilError::Registration(_)));

        let parse = SigilError::from(ParseError::new(ParseErrorKind::UnterminatedString, pos()));
        assert!(matches!(parse, SigilError::Parse(_)));
    }
}
