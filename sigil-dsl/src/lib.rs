//! Sigil DSL - Marker Micro-Language Parser & Registry
//!
//! Markers are `+name=fields` comments attached to declarations in a host
//! language's source. This crate lexes marker text, parses field values
//! against registered schemas, and yields typed values for downstream code
//! generators.
//!
//! Architecture:
//! ```text
//! Marker comment bodies (+ positions + alias table)
//!     ↓
//! Registry lookup (name split, scope/alias resolution)
//!     ↓
//! Value Parser (scanner-driven, type-directed, recursive)
//!     ↓
//! Values / ErrorList (per declaration node)
//! ```
//!
//! Lifecycle: construct definitions, register them on a `RegistryBuilder`,
//! freeze with `build()`, then share the immutable `Registry` across
//! threads for parsing.

pub mod comment;
pub mod lexer;
pub mod parser;
pub mod registry;
pub mod schema;

// Re-export key types for convenience
pub use comment::{is_marker_comment, process_comment, process_node, MarkerComment};
pub use registry::{AliasMap, Definition, Registry, RegistryBuilder, Resolution, IMPLICIT_FIELD};
pub use schema::{Argument, FieldKind, FieldSpec, TypeDescriptor, TypeKind};
