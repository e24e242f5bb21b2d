//! Type descriptors and compiled argument schemas

use serde::{Deserialize, Serialize};
use std::fmt;

/// The shape of one parseable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeKind {
    /// Unclassifiable declaration; never parseable
    Invalid,
    /// Uninterpreted bytes; carried by the host, never parsed from markers
    Raw,
    /// Shape inferred from literal syntax at parse time
    Any,
    Bool,
    SignedInt,
    UnsignedInt,
    Str,
    /// Ordered elements of one item shape
    Slice(Box<TypeDescriptor>),
    /// String-keyed entries of one item shape
    Map(Box<TypeDescriptor>),
    /// Host-language function reference; never parseable
    HostFunc,
    /// Host-language type reference; never parseable
    HostType,
}

impl TypeKind {
    /// Short name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            TypeKind::Invalid => "invalid",
            TypeKind::Raw => "raw",
            TypeKind::Any => "any",
            TypeKind::Bool => "bool",
            TypeKind::SignedInt => "integer",
            TypeKind::UnsignedInt => "unsigned integer",
            TypeKind::Str => "string",
            TypeKind::Slice(_) => "slice",
            TypeKind::Map(_) => "map",
            TypeKind::HostFunc => "host function",
            TypeKind::HostType => "host type",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A compiled value type: kind, optionality, and the optional enum table
/// mapping raw marker tokens to canonical labels.
///
/// The enum table is legal only on `Str` descriptors; for `Slice<Str>` the
/// schema compiler pushes the table down onto the element descriptor so
/// membership is enforced per element. Map keys are always strings, so the
/// `Map` variant carries only its element descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub kind: TypeKind,
    /// Set when the declaration wrapped the type in one level of optional.
    pub is_pointer: bool,
    /// Raw token → canonical label, in declaration order.
    pub enum_table: Option<Vec<(String, String)>>,
}

impl TypeDescriptor {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            is_pointer: false,
            enum_table: None,
        }
    }

    /// Mark as pointer-wrapped (declared optional).
    pub fn pointer(mut self) -> Self {
        self.is_pointer = true;
        self
    }

    /// Look up a raw token's canonical label.
    pub fn enum_label(&self, raw: &str) -> Option<&str> {
        self.enum_table.as_ref().and_then(|table| {
            table
                .iter()
                .find(|(key, _)| key == raw)
                .map(|(_, label)| label.as_str())
        })
    }
}

/// One compiled schema argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    /// Display name used as the field key in marker text.
    pub name: String,
    pub descriptor: TypeDescriptor,
    pub required: bool,
    pub deprecated: bool,
    /// Raw marker text parsed when the field is absent.
    pub default: Option<String>,
}
