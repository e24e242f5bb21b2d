use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sigil_core::{Position, TargetLevel};
use sigil_dsl::{
    process_node, AliasMap, Definition, FieldKind, FieldSpec, MarkerComment, Registry,
    IMPLICIT_FIELD,
};

const MARKERS: &[&str] = &[
    "+validate=Min=1, Max=100",
    "+tags={api, stable, internal}",
    "+meta={owner:\"platform\", retries:{1,2,3}}",
    "+doc=short summary of the declaration",
];

fn registry() -> Registry {
    let mut builder = Registry::builder();
    builder
        .register(
            Definition::new(
                "validate",
                "",
                TargetLevel::FIELD,
                &[
                    FieldSpec::new("Min", FieldKind::SignedInt).named("Min"),
                    FieldSpec::new("Max", FieldKind::SignedInt).named("Max"),
                ],
            )
            .expect("compile validate"),
        )
        .expect("register validate");
    builder
        .register(
            Definition::new(
                "tags",
                "",
                TargetLevel::FIELD,
                &[FieldSpec::new("value", FieldKind::Slice(Box::new(FieldKind::Str)))
                    .named(IMPLICIT_FIELD)],
            )
            .expect("compile tags"),
        )
        .expect("register tags");
    builder
        .register(
            Definition::new(
                "meta",
                "",
                TargetLevel::FIELD,
                &[FieldSpec::new("value", FieldKind::Any).named(IMPLICIT_FIELD)],
            )
            .expect("compile meta"),
        )
        .expect("register meta");
    builder
        .register(
            Definition::new(
                "doc",
                "",
                TargetLevel::FIELD,
                &[FieldSpec::new("value", FieldKind::Str).named(IMPLICIT_FIELD)],
            )
            .expect("compile doc"),
        )
        .expect("register doc");
    builder.build()
}

fn bench_process_node(c: &mut Criterion) {
    let registry = registry();
    let aliases = AliasMap::new();
    let comments: Vec<MarkerComment> = MARKERS
        .iter()
        .enumerate()
        .map(|(i, text)| MarkerComment::new(text, Position::new("bench.go", i + 1, 1)))
        .collect();

    c.bench_function("marker/process_node", |b| {
        b.iter(|| {
            let (values, errors) = process_node(
                black_box(&registry),
                black_box(&comments),
                &aliases,
                TargetLevel::FIELD,
            );
            black_box((values.count(), errors.len()));
        });
    });
}

fn bench_any_inference(c: &mut Criterion) {
    let registry = registry();
    let aliases = AliasMap::new();
    let comment = MarkerComment::new(
        "+meta={a:{1,2,3}, b:{x,y}, c:true, d:-42}",
        Position::new("bench.go", 1, 1),
    );

    c.bench_function("marker/any_inference", |b| {
        b.iter(|| {
            let (values, errors) = process_node(
                black_box(&registry),
                std::slice::from_ref(&comment),
                &aliases,
                TargetLevel::FIELD,
            );
            black_box((values.count(), errors.len()));
        });
    });
}

criterion_group!(benches, bench_process_node, bench_any_inference);
criterion_main!(benches);
