//! Schema compiler: declarative field lists → argument schemas
//!
//! Definition authors describe their marker's fields as an explicit,
//! ordered list of `FieldSpec`s. Compilation derives display names,
//! resolves the declared shapes into `TypeDescriptor`s, and validates the
//! constraints that can be checked before any marker text exists: optional
//! wrapping depth, parseable kinds, enum target types, duplicate names.

pub mod typedesc;

pub use typedesc::{Argument, TypeDescriptor, TypeKind};

use serde::{Deserialize, Serialize};
use sigil_core::SchemaError;

/// Declarable field shapes.
///
/// `Optional` is legal only as the outermost wrapper of a field; it sets
/// the descriptor's pointer flag and unwraps. `Raw`, `HostFunc`, and
/// `HostType` exist so declarations can name every host shape, but none of
/// them has marker grammar and all fail compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Bool,
    SignedInt,
    UnsignedInt,
    Str,
    Any,
    Slice(Box<FieldKind>),
    Map(Box<FieldKind>),
    Optional(Box<FieldKind>),
    Raw,
    HostFunc,
    HostType,
}

/// One declarative field: identifier, shape, and flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub ident: String,
    pub kind: FieldKind,
    /// Explicit display-name override.
    pub name: Option<String>,
    pub required: bool,
    pub deprecated: bool,
    pub default: Option<String>,
    /// Comma-separated `key` or `key=label` entries.
    pub enum_spec: Option<String>,
}

impl FieldSpec {
    pub fn new(ident: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            ident: ident.into(),
            kind,
            name: None,
            required: false,
            deprecated: false,
            default: None,
            enum_spec: None,
        }
    }

    /// Override the display name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Raw marker text to parse when the field is absent.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Restrict the field to an enumerated set of raw tokens.
    pub fn with_enum(mut self, spec: impl Into<String>) -> Self {
        self.enum_spec = Some(spec.into());
        self
    }
}

/// Default display name: the field identifier with its first character
/// lowercased.
fn default_argument_name(ident: &str) -> String {
    let mut chars = ident.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Resolve a declared shape into a descriptor. `outermost` is true only
/// for the field's own shape; optional wrapping anywhere deeper fails.
fn resolve_kind(
    field: &str,
    kind: &FieldKind,
    outermost: bool,
) -> Result<TypeDescriptor, SchemaError> {
    match kind {
        FieldKind::Optional(inner) => {
            if !outermost || matches!(**inner, FieldKind::Optional(_)) {
                return Err(SchemaError::NestedOptional {
                    field: field.to_string(),
                });
            }
            Ok(resolve_kind(field, inner, false)?.pointer())
        }
        FieldKind::Bool => Ok(TypeDescriptor::new(TypeKind::Bool)),
        FieldKind::SignedInt => Ok(TypeDescriptor::new(TypeKind::SignedInt)),
        FieldKind::UnsignedInt => Ok(TypeDescriptor::new(TypeKind::UnsignedInt)),
        FieldKind::Str => Ok(TypeDescriptor::new(TypeKind::Str)),
        FieldKind::Any => Ok(TypeDescriptor::new(TypeKind::Any)),
        FieldKind::Slice(item) => {
            let item = resolve_kind(field, item, false)?;
            Ok(TypeDescriptor::new(TypeKind::Slice(Box::new(item))))
        }
        FieldKind::Map(item) => {
            let item = resolve_kind(field, item, false)?;
            Ok(TypeDescriptor::new(TypeKind::Map(Box::new(item))))
        }
        FieldKind::Raw => Err(unsupported(field, TypeKind::Raw)),
        FieldKind::HostFunc => Err(unsupported(field, TypeKind::HostFunc)),
        FieldKind::HostType => Err(unsupported(field, TypeKind::HostType)),
    }
}

fn unsupported(field: &str, kind: TypeKind) -> SchemaError {
    SchemaError::UnsupportedKind {
        field: field.to_string(),
        kind: kind.name().to_string(),
    }
}

/// Parse a `key` / `key=label` enum specification into an ordered table.
fn parse_enum_spec(field: &str, spec: &str) -> Result<Vec<(String, String)>, SchemaError> {
    let mut table = Vec::new();
    for entry in spec.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            return Err(SchemaError::EmptyEnumEntry {
                field: field.to_string(),
            });
        }
        match entry.split_once('=') {
            Some((key, label)) => {
                let key = key.trim();
                if key.is_empty() {
                    return Err(SchemaError::EmptyEnumEntry {
                        field: field.to_string(),
                    });
                }
                table.push((key.to_string(), label.trim().to_string()));
            }
            None => table.push((entry.to_string(), entry.to_string())),
        }
    }
    Ok(table)
}

/// Compile one declarative field into an argument.
pub fn compile_field(spec: &FieldSpec) -> Result<Argument, SchemaError> {
    let name = spec
        .name
        .clone()
        .unwrap_or_else(|| default_argument_name(&spec.ident));

    let mut descriptor = resolve_kind(&name, &spec.kind, true)?;

    if let Some(enum_spec) = &spec.enum_spec {
        let table = parse_enum_spec(&name, enum_spec)?;
        match &mut descriptor.kind {
            TypeKind::Str => descriptor.enum_table = Some(table),
            TypeKind::Slice(item) if item.kind == TypeKind::Str => {
                item.enum_table = Some(table);
            }
            other => {
                return Err(SchemaError::EnumTargetInvalid {
                    field: name,
                    kind: other.name().to_string(),
                });
            }
        }
    }

    Ok(Argument {
        name,
        descriptor,
        required: spec.required,
        deprecated: spec.deprecated,
        default: spec.default.clone(),
    })
}

/// Compile an ordered field list into an argument schema.
pub fn compile_schema(fields: &[FieldSpec]) -> Result<Vec<Argument>, SchemaError> {
    let mut schema: Vec<Argument> = Vec::with_capacity(fields.len());
    for spec in fields {
        let argument = compile_field(spec)?;
        if schema.iter().any(|a| a.name == argument.name) {
            return Err(SchemaError::DuplicateArgument {
                field: argument.name,
            });
        }
        schema.push(argument);
    }
    Ok(schema)
}
