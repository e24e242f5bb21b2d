//! Property-Based Tests for Value Round-Trips
//!
//! Property: for any value, canonical rendering followed by a parse with a
//! matching type descriptor SHALL produce an equal value.
//!
//! This validates:
//! - The canonical renderer is deterministic and parseable
//! - Quoting/unescaping are lossless
//! - Dynamic inference materializes the same shapes the renderer emits

use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use sigil_core::{Position, Value};
use sigil_dsl::lexer::Scanner;
use sigil_dsl::parser::ValueParser;
use sigil_dsl::{TypeDescriptor, TypeKind};
use std::collections::BTreeMap;

fn parse(text: &str, descriptor: &TypeDescriptor) -> Value {
    let mut scanner = Scanner::new(text, Position::new("prop.go", 1, 1));
    ValueParser::new(&mut scanner, "value")
        .parse(descriptor)
        .unwrap_or_else(|e| panic!("failed to parse {:?}: {}", text, e))
}

fn descriptor(kind: TypeKind) -> TypeDescriptor {
    TypeDescriptor::new(kind)
}

// ============================================================================
// STRATEGIES
// ============================================================================

/// Strings over a mix of plain, quoted-relevant, and unicode characters.
fn arb_string() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[ -~à-ü\\\\\"\\n\\t]{0,24}").unwrap()
}

/// Any-compatible values: everything inference can produce. Maps must be
/// non-empty because `{}` always infers as an empty sequence.
fn arb_any_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        arb_string().prop_map(Value::Str),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..4).prop_map(Value::Seq),
            btree_map(arb_string(), inner, 1..4).prop_map(Value::Map),
        ]
    })
}

// ============================================================================
// DECLARED-TYPE ROUND-TRIPS
// ============================================================================

proptest! {
    #[test]
    fn prop_bool_round_trip(b in any::<bool>()) {
        let value = Value::Bool(b);
        prop_assert_eq!(parse(&value.to_string(), &descriptor(TypeKind::Bool)), value);
    }

    #[test]
    fn prop_signed_int_round_trip(n in any::<i64>()) {
        let value = Value::Int(n);
        prop_assert_eq!(parse(&value.to_string(), &descriptor(TypeKind::SignedInt)), value);
    }

    #[test]
    fn prop_unsigned_int_round_trip(n in any::<u64>()) {
        let value = Value::UInt(n);
        prop_assert_eq!(parse(&value.to_string(), &descriptor(TypeKind::UnsignedInt)), value);
    }

    #[test]
    fn prop_string_round_trip(s in arb_string()) {
        let value = Value::Str(s);
        prop_assert_eq!(parse(&value.to_string(), &descriptor(TypeKind::Str)), value);
    }

    #[test]
    fn prop_int_slice_round_trip(items in vec(any::<i64>(), 0..8)) {
        let value = Value::Seq(items.into_iter().map(Value::Int).collect());
        let slice = descriptor(TypeKind::Slice(Box::new(descriptor(TypeKind::SignedInt))));
        prop_assert_eq!(parse(&value.to_string(), &slice), value);
    }

    #[test]
    fn prop_string_slice_round_trip(items in vec(arb_string(), 0..8)) {
        let value = Value::Seq(items.into_iter().map(Value::Str).collect());
        let slice = descriptor(TypeKind::Slice(Box::new(descriptor(TypeKind::Str))));
        prop_assert_eq!(parse(&value.to_string(), &slice), value);
    }

    #[test]
    fn prop_string_map_round_trip(entries in btree_map(arb_string(), arb_string(), 0..8)) {
        let value = Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k, Value::Str(v)))
                .collect::<BTreeMap<_, _>>(),
        );
        let map = descriptor(TypeKind::Map(Box::new(descriptor(TypeKind::Str))));
        prop_assert_eq!(parse(&value.to_string(), &map), value);
    }
}

// ============================================================================
// DYNAMIC-INFERENCE ROUND-TRIPS
// ============================================================================

proptest! {
    /// The renderer always quotes strings, so inference never mistakes a
    /// rendered string for a bool, integer, or container.
    #[test]
    fn prop_any_round_trip(value in arb_any_value()) {
        prop_assert_eq!(parse(&value.to_string(), &descriptor(TypeKind::Any)), value);
    }

    /// Legacy and brace syntax infer the same integer sequence. A single
    /// element has no semicolon and stays a scalar, so two is the floor.
    #[test]
    fn prop_legacy_slice_equivalence(items in vec(any::<i64>(), 2..8)) {
        let braced = format!(
            "{{{}}}",
            items.iter().map(i64::to_string).collect::<Vec<_>>().join(",")
        );
        let legacy = items.iter().map(i64::to_string).collect::<Vec<_>>().join(";");
        let any = descriptor(TypeKind::Any);
        prop_assert_eq!(parse(&braced, &any), parse(&legacy, &any));
    }
}
