//! Marker definitions and per-marker field parsing

use crate::lexer::Scanner;
use crate::parser::ValueParser;
use crate::registry::split::{
    char_len, find_top_level_eq, split_marker, split_top_level_commas,
};
use crate::schema::{compile_schema, Argument, FieldSpec};
use sigil_core::{
    ErrorList, MarkerInstance, ParseError, ParseErrorKind, Position, SchemaError, TargetLevel,
};

/// Display name that receives unkeyed field values.
pub const IMPLICIT_FIELD: &str = "Value";

/// Post-parse validation hook.
pub type ValidateFn = fn(&MarkerInstance) -> Result<(), String>;

/// A registered marker: name, origin scope, target mask, and the compiled
/// argument schema.
#[derive(Debug, Clone)]
pub struct Definition {
    name: String,
    scope: String,
    targets: TargetLevel,
    schema: Vec<Argument>,
    validate: Option<ValidateFn>,
}

impl Definition {
    /// Compile a definition from a declarative field list.
    ///
    /// Rejects an empty name, an empty target mask, and any field the
    /// schema compiler cannot express in marker grammar.
    pub fn new(
        name: impl Into<String>,
        scope: impl Into<String>,
        targets: TargetLevel,
        fields: &[FieldSpec],
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SchemaError::EmptyName);
        }
        if targets.is_empty() {
            return Err(SchemaError::EmptyTargets { name });
        }
        let schema = compile_schema(fields)?;
        Ok(Self {
            name,
            scope: scope.into(),
            targets,
            schema,
            validate: None,
        })
    }

    /// Attach a post-parse validation hook.
    pub fn with_validator(mut self, validate: ValidateFn) -> Self {
        self.validate = Some(validate);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn targets(&self) -> TargetLevel {
        self.targets
    }

    /// Whether this marker may attach to a declaration of `level`.
    pub fn supports(&self, level: TargetLevel) -> bool {
        self.targets.intersects(level)
    }

    /// Compiled arguments in declaration order.
    pub fn schema(&self) -> &[Argument] {
        &self.schema
    }

    fn argument(&self, name: &str) -> Option<&Argument> {
        self.schema.iter().find(|a| a.name == name)
    }

    /// Parse a whole raw marker (name included) against this definition.
    ///
    /// The registry's lookup drives the usual path; this entry point serves
    /// callers holding a definition directly.
    pub fn parse_raw(&self, raw: &str, position: &Position) -> Result<MarkerInstance, ErrorList> {
        let split = split_marker(raw);
        let fields = if split.name == self.name {
            split.canonical_fields
        } else if split.anonymous == self.name {
            split.anonymous_fields
        } else {
            return Err(ErrorList::from(ParseError::new(
                ParseErrorKind::UnknownMarker {
                    name: split.anonymous,
                },
                position.clone(),
            )));
        };
        self.parse(fields.text, position, fields.offset)
    }

    /// Parse this marker's fields text into a fresh instance.
    ///
    /// `fields_offset` is the character offset of `fields` inside the
    /// marker text, used to position diagnostics. Field failures are
    /// collected per field, so one bad field does not stop its siblings;
    /// a non-empty collection fails the whole marker.
    pub fn parse(
        &self,
        fields: &str,
        marker_position: &Position,
        fields_offset: usize,
    ) -> Result<MarkerInstance, ErrorList> {
        let mut instance = MarkerInstance::new(self.name.as_str(), marker_position.clone());
        let mut errors = ErrorList::new();
        let mut failed: Vec<&str> = Vec::new();

        let keyed = find_top_level_eq(fields).is_some();
        let chunks: Vec<(usize, &str)> = if keyed {
            split_top_level_commas(fields)
        } else if fields.trim_matches([' ', '\t', '\r']).is_empty() {
            Vec::new()
        } else {
            // No key=value structure: the whole remainder is one value for
            // the implicit field.
            vec![(0, fields)]
        };

        for (chunk_offset, chunk) in chunks {
            let (key, value_offset, value_text) = if keyed {
                match find_top_level_eq(chunk) {
                    Some(eq) => (
                        Some(chunk[..eq].trim()),
                        chunk_offset + char_len(&chunk[..eq + 1]),
                        &chunk[eq + 1..],
                    ),
                    None => (None, chunk_offset, chunk),
                }
            } else {
                (None, chunk_offset, chunk)
            };

            let field_name = key.unwrap_or(IMPLICIT_FIELD);
            let key_position = marker_position.shifted(fields_offset + chunk_offset);

            let Some(argument) = self.argument(field_name) else {
                errors.push(ParseError::new(
                    ParseErrorKind::UnknownField {
                        marker: self.name.clone(),
                        field: field_name.to_string(),
                    },
                    key_position,
                ));
                continue;
            };

            if instance.get(&argument.name).is_some() {
                errors.push(ParseError::new(
                    ParseErrorKind::DuplicateField {
                        marker: self.name.clone(),
                        field: argument.name.clone(),
                    },
                    key_position,
                ));
                continue;
            }

            let origin = marker_position.shifted(fields_offset + value_offset);
            let mut scanner = Scanner::new(value_text, origin);
            match ValueParser::new(&mut scanner, &argument.name).parse(&argument.descriptor) {
                Ok(value) => {
                    scanner.skip_whitespaces();
                    if !scanner.at_eof() {
                        errors.push(ParseError::new(
                            ParseErrorKind::TrailingCharacters {
                                field: argument.name.clone(),
                                rest: scanner.rest().trim_end().to_string(),
                            },
                            scanner.position(),
                        ));
                        failed.push(&argument.name);
                        continue;
                    }
                    if argument.deprecated {
                        tracing::warn!(
                            marker = %self.name,
                            field = %argument.name,
                            "deprecated marker field bound"
                        );
                    }
                    instance.bind(argument.name.as_str(), value);
                }
                Err(error) => {
                    errors.push(error);
                    failed.push(&argument.name);
                }
            }
        }

        self.apply_defaults(&mut instance, &failed, marker_position, &mut errors);

        if errors.is_empty() {
            if let Some(validate) = self.validate {
                if let Err(message) = validate(&instance) {
                    errors.push(ParseError::new(
                        ParseErrorKind::Validation {
                            marker: self.name.clone(),
                            message,
                        },
                        marker_position.clone(),
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(instance)
        } else {
            Err(errors)
        }
    }

    /// Fill unbound arguments from their defaults and enforce strict
    /// required-field presence. A default satisfies `required`; a field
    /// that was given but failed its parse is already reported and gets
    /// neither a default nor a second error.
    fn apply_defaults(
        &self,
        instance: &mut MarkerInstance,
        failed: &[&str],
        marker_position: &Position,
        errors: &mut ErrorList,
    ) {
        for argument in &self.schema {
            if instance.get(&argument.name).is_some() || failed.contains(&argument.name.as_str()) {
                continue;
            }
            if let Some(default) = &argument.default {
                let mut scanner = Scanner::new(default, marker_position.clone());
                match ValueParser::new(&mut scanner, &argument.name).parse(&argument.descriptor) {
                    Ok(value) => instance.bind(argument.name.as_str(), value),
                    Err(error) => errors.push(error),
                }
            } else if argument.required {
                errors.push(ParseError::new(
                    ParseErrorKind::MissingField {
                        marker: self.name.clone(),
                        field: argument.name.clone(),
                    },
                    marker_position.clone(),
                ));
            }
        }
    }
}
