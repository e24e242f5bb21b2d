//! Source positions for marker comments and diagnostics

use serde::{Deserialize, Serialize};
use std::fmt;

/// Location of a marker comment (or an error inside one) in host source.
///
/// Columns are 1-based character counts. A marker comment is a logical
/// single line, so positions inside its text differ from the comment's own
/// position only by column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// The same position shifted right by `columns` characters.
    pub fn shifted(&self, columns: usize) -> Self {
        Self {
            file: self.file.clone(),
            line: self.line,
            column: self.column + columns,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self {
            file: String::new(),
            line: 1,
            column: 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
