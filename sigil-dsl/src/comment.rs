//! Comment boundary: marker comments and per-node orchestration
//!
//! The host collaborator walks its syntax tree, collects the comment
//! bodies attached to each declaration (comment syntax stripped), and
//! hands them over with positions and an alias table. Everything here is
//! about turning that input into `Values` plus an `ErrorList`; one
//! comment's failure never suppresses its siblings.

use crate::registry::split::split_marker;
use crate::registry::{AliasMap, Registry};
use sigil_core::{ErrorList, MarkerInstance, ParseError, ParseErrorKind, Position, TargetLevel, Values};

/// Whether a comment body is a marker: its first non-whitespace character
/// is the `+` sigil.
pub fn is_marker_comment(text: &str) -> bool {
    text.trim_start().starts_with('+')
}

/// One logical marker comment with its position.
///
/// Continuation lines are already joined and the leading sigil stripped;
/// the stored position accounts for the stripped characters so columns in
/// diagnostics stay true to the host source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerComment {
    text: String,
    position: Position,
}

impl MarkerComment {
    /// Wrap a single comment body. Leading horizontal whitespace and one
    /// `+` sigil are stripped, shifting the position accordingly.
    pub fn new(text: &str, position: Position) -> Self {
        let mut stripped = 0usize;
        let mut rest = text;
        while let Some(c) = rest.chars().next() {
            if matches!(c, ' ' | '\t' | '\r') {
                rest = &rest[c.len_utf8()..];
                stripped += 1;
            } else {
                break;
            }
        }
        if let Some(after) = rest.strip_prefix('+') {
            rest = after;
            stripped += 1;
        }
        Self {
            text: rest.to_string(),
            position: position.shifted(stripped),
        }
    }

    /// Join a comment group into one logical marker: a line ending in `\`
    /// continues onto the next, whose leading whitespace is dropped.
    pub fn from_lines(lines: &[&str], position: Position) -> Self {
        let mut joined = String::new();
        for (i, line) in lines.iter().enumerate() {
            let line = if i == 0 {
                *line
            } else {
                line.trim_start_matches([' ', '\t'])
            };
            match line.trim_end().strip_suffix('\\') {
                Some(head) => joined.push_str(head),
                None => joined.push_str(line),
            }
        }
        Self::new(&joined, position)
    }

    /// Marker text with the sigil stripped.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn position(&self) -> &Position {
        &self.position
    }
}

/// Resolve and parse one marker comment against a declaration of `level`.
pub fn process_comment(
    registry: &Registry,
    comment: &MarkerComment,
    aliases: &AliasMap,
    level: TargetLevel,
) -> Result<MarkerInstance, ErrorList> {
    let Some(resolution) = registry.lookup(comment.text(), aliases) else {
        let split = split_marker(comment.text());
        return Err(ErrorList::from(ParseError::new(
            ParseErrorKind::UnknownMarker {
                name: split.anonymous,
            },
            comment.position().clone(),
        )));
    };

    if !resolution.definition.supports(level) {
        return Err(ErrorList::from(ParseError::new(
            ParseErrorKind::WrongTarget {
                name: resolution.definition.name().to_string(),
                level: format!("{}", level),
            },
            comment.position().clone(),
        )));
    }

    resolution.definition.parse(
        resolution.fields,
        comment.position(),
        resolution.fields_offset,
    )
}

/// Parse every marker comment on one declaration node.
///
/// Failures land in the error list, successes in the values container;
/// partial success is always preserved.
pub fn process_node(
    registry: &Registry,
    comments: &[MarkerComment],
    aliases: &AliasMap,
    level: TargetLevel,
) -> (Values, ErrorList) {
    let mut values = Values::new();
    let mut errors = ErrorList::new();

    for comment in comments {
        match process_comment(registry, comment, aliases, level) {
            Ok(instance) => values.insert(instance),
            Err(list) => errors.merge(list),
        }
    }

    tracing::trace!(
        parsed = values.count(),
        failed = errors.len(),
        "processed marker comments for node"
    );
    (values, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::IMPLICIT_FIELD;
    use crate::schema::{FieldKind, FieldSpec};
    use crate::Definition;
    use sigil_core::Value;

    fn registry() -> Registry {
        let mut builder = Registry::builder();
        builder
            .register(
                Definition::new(
                    "validate",
                    "",
                    TargetLevel::FIELD,
                    &[FieldSpec::new("Max", FieldKind::SignedInt).named("Max")],
                )
                .unwrap(),
            )
            .unwrap();
        builder
            .register(
                Definition::new(
                    "doc",
                    "",
                    TargetLevel::ALL,
                    &[FieldSpec::new("value", FieldKind::Str).named(IMPLICIT_FIELD)],
                )
                .unwrap(),
            )
            .unwrap();
        builder.build()
    }

    fn comment(text: &str, line: usize) -> MarkerComment {
        MarkerComment::new(text, Position::new("api.go", line, 3))
    }

    #[test]
    fn test_is_marker_comment() {
        assert!(is_marker_comment("+validate=Max=3"));
        assert!(is_marker_comment("  +doc=hello"));
        assert!(!is_marker_comment("plain comment"));
        assert!(!is_marker_comment(""));
    }

    #[test]
    fn test_sigil_and_whitespace_stripped_with_position_shift() {
        let c = comment("  +validate=Max=3", 4);
        assert_eq!(c.text(), "validate=Max=3");
        assert_eq!(c.position(), &Position::new("api.go", 4, 6));
    }

    #[test]
    fn test_continuation_lines_joined() {
        let c = MarkerComment::from_lines(
            &["+doc=first \\", "   second"],
            Position::new("api.go", 1, 3),
        );
        assert_eq!(c.text(), "doc=first second");
    }

    #[test]
    fn test_process_node_isolates_failures() {
        let registry = registry();
        let comments = vec![
            comment("+doc=\"unterminated", 1),
            comment("+validate=Max=10", 2),
        ];
        let (values, errors) = process_node(
            &registry,
            &comments,
            &AliasMap::new(),
            TargetLevel::FIELD,
        );

        // One error entry plus one populated value, never total failure.
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors.first().unwrap().kind,
            ParseErrorKind::UnterminatedString
        ));
        assert_eq!(values.count(), 1);
        assert_eq!(
            values.first("validate").unwrap().get("Max"),
            Some(&Value::Int(10))
        );
    }

    #[test]
    fn test_unknown_marker_reported_with_full_written_name() {
        let registry = registry();
        let comments = vec![comment("+acme:unknown=1", 1)];
        let (values, errors) =
            process_node(&registry, &comments, &AliasMap::new(), TargetLevel::FIELD);
        assert!(values.is_empty());
        assert!(matches!(
            errors.first().unwrap().kind,
            ParseErrorKind::UnknownMarker { ref name } if name == "acme:unknown"
        ));
    }

    #[test]
    fn test_wrong_target_level_reported() {
        let registry = registry();
        let comments = vec![comment("+validate=Max=1", 1)];
        let (values, errors) = process_node(
            &registry,
            &comments,
            &AliasMap::new(),
            TargetLevel::PACKAGE,
        );
        assert!(values.is_empty());
        assert!(matches!(
            errors.first().unwrap().kind,
            ParseErrorKind::WrongTarget { .. }
        ));
    }

    #[test]
    fn test_repeated_markers_keep_declaration_order() {
        let registry = registry();
        let comments = vec![
            comment("+doc=first", 1),
            comment("+validate=Max=1", 2),
            comment("+doc=second", 3),
        ];
        let (values, errors) =
            process_node(&registry, &comments, &AliasMap::new(), TargetLevel::FIELD);
        assert!(errors.is_empty());
        assert_eq!(values.count_by_name("doc"), 2);
        let docs = values.find_by_name("doc");
        assert_eq!(docs[0].get("Value"), Some(&Value::from("first")));
        assert_eq!(docs[1].get("Value"), Some(&Value::from("second")));
    }

    #[test]
    fn test_error_positions_point_into_the_comment() {
        let registry = registry();
        // Marker text starts at column 3; `+` shifts to 4; value `x` of
        // Max sits after `validate=Max=` (13 chars) at column 17.
        let comments = vec![comment("+validate=Max=x", 7)];
        let (_, errors) =
            process_node(&registry, &comments, &AliasMap::new(), TargetLevel::FIELD);
        let error = errors.first().unwrap();
        assert_eq!(error.position.line, 7);
        assert_eq!(error.position.column, 17);
    }
}
