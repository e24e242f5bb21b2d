//! Fuzz test for end-to-end marker processing
//!
//! This fuzz target drives lookup, field splitting, value parsing, and
//! dynamic inference with arbitrary marker text to find:
//! - Panics or crashes
//! - Infinite loops (inference backtracking, legacy-slice lookahead)
//! - Unbounded recursion on adversarial nesting
//!
//! Run with: cargo +nightly fuzz run marker_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use sigil_core::{Position, TargetLevel};
use sigil_dsl::{
    process_node, AliasMap, Definition, FieldKind, FieldSpec, MarkerComment, Registry,
    IMPLICIT_FIELD,
};

fn registry() -> Registry {
    let mut builder = Registry::builder();
    builder
        .register(
            Definition::new(
                "any",
                "",
                TargetLevel::ALL,
                &[FieldSpec::new("value", FieldKind::Any).named(IMPLICIT_FIELD)],
            )
            .expect("compile any"),
        )
        .expect("register any");
    builder
        .register(
            Definition::new(
                "typed",
                "",
                TargetLevel::ALL,
                &[
                    FieldSpec::new("Flag", FieldKind::Bool).named("Flag"),
                    FieldSpec::new("Count", FieldKind::UnsignedInt).named("Count"),
                    FieldSpec::new("Items", FieldKind::Slice(Box::new(FieldKind::SignedInt)))
                        .named("Items"),
                    FieldSpec::new("Meta", FieldKind::Map(Box::new(FieldKind::Str))).named("Meta"),
                ],
            )
            .expect("compile typed"),
        )
        .expect("register typed");
    builder.build()
}

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let registry = registry();
        let aliases = AliasMap::new();

        // Feed the raw input as fields of both definitions; processing must
        // return values or positioned errors, never panic.
        for name in ["any", "typed"] {
            let comment = MarkerComment::new(
                &format!("+{}={}", name, input),
                Position::new("fuzz.go", 1, 1),
            );
            let (_, errors) = process_node(
                &registry,
                std::slice::from_ref(&comment),
                &aliases,
                TargetLevel::FUNCTION,
            );
            for error in errors.iter() {
                assert!(error.position.line >= 1);
                assert!(error.position.column >= 1);
            }
        }

        // And as a whole raw marker, exercising name splitting too.
        let comment = MarkerComment::new(input, Position::new("fuzz.go", 1, 1));
        let _ = process_node(
            &registry,
            std::slice::from_ref(&comment),
            &aliases,
            TargetLevel::FUNCTION,
        );
    }
});
