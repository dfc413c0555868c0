use super::*;
use crate::{
    binding::ParameterBindings,
    config::{CacheConfig, CompileConfig},
    expr::{Expr, has_constant_of_kind, visit::constants},
    model::{FieldKind, PathError},
    obs::{MetricsEvent, MetricsSink, with_metrics_sink},
    projection::ProjectionSpec,
    test_fixtures::{ENTITY, ENTITY_DTO, ORDER, ORDER_VIEW},
    value::{Value, ValueKind},
};
use proptest::prelude::*;
use std::{cell::RefCell, rc::Rc, sync::Arc};

fn dto_spec() -> ProjectionSpec {
    ProjectionSpec::builder(&ENTITY, &ENTITY_DTO)
        .map_parameter("user_name", "username")
        .build()
}

fn username(value: &str) -> ParameterBindings {
    let mut bindings = ParameterBindings::new();
    bindings.bind_value("username", value).expect("bind");
    bindings
}

fn src_member(name: &str, kind: ValueKind) -> Expr {
    Expr::member(Expr::variable(SOURCE_VAR), name, FieldKind::Scalar(kind))
}

#[test]
fn bound_parameter_compiles_to_a_parameter_slot() {
    let compiled = compile(&dto_spec(), &username("Joe")).expect("compile");

    let expected = Expr::lambda(
        "src",
        Expr::construct(
            "EntityDto",
            [
                ("id", src_member("id", ValueKind::Int)),
                ("value", src_member("value", ValueKind::Text)),
                ("user_name", Expr::parameter("username", ValueKind::Text)),
            ],
        )
        .expect("construct"),
    );

    assert_eq!(compiled.expr(), &expected);
    assert!(!has_constant_of_kind(compiled.expr(), ValueKind::Text));
    assert_eq!(compiled.source(), "Entity");
    assert_eq!(compiled.target(), "EntityDto");
}

#[test]
fn dynamic_and_snapshot_bindings_compile_identically() {
    let mut dynamic = ParameterBindings::new();
    dynamic
        .bind_with("username", ValueKind::Text, || Value::from("Joe"))
        .expect("bind");

    let a = compile(&dto_spec(), &dynamic).expect("dynamic");
    let b = compile(&dto_spec(), &username("Joe")).expect("snapshot");

    assert_eq!(a, b);
}

#[test]
fn null_bound_parameter_is_still_a_slot() {
    let mut bindings = ParameterBindings::new();
    bindings
        .bind("username", ValueKind::Text, Value::Null)
        .expect("bind null");

    let compiled = compile(&dto_spec(), &bindings).expect("compile");

    assert!(constants(compiled.expr()).is_empty());
    assert_eq!(compiled.parameters().kind_of("username"), Some(ValueKind::Text));
}

#[test]
fn spec_literal_compiles_to_a_constant() {
    let spec = ProjectionSpec::builder(&ENTITY, &ENTITY_DTO)
        .map_literal("user_name", "Joe")
        .build();

    let compiled = compile(&spec, &ParameterBindings::new()).expect("compile");

    assert!(has_constant_of_kind(compiled.expr(), ValueKind::Text));
    assert!(compiled.parameters().is_empty());
}

#[test]
fn nested_path_becomes_a_member_chain() {
    let spec = ProjectionSpec::builder(&ORDER, &ORDER_VIEW)
        .map_from("city", "ship_to.city")
        .map_parameter("channel", "channel")
        .build();
    let bindings = ParameterBindings::snapshot([("channel", "web")]).expect("bind");

    let compiled = compile(&spec, &bindings).expect("compile");
    let Some(Expr::Construct(construct)) = compiled.expr().as_lambda().map(|l| l.body()) else {
        panic!("expected construct body");
    };

    let ship_to = Expr::member(
        Expr::variable("src"),
        "ship_to",
        FieldKind::Shape(&crate::test_fixtures::ADDRESS),
    );
    assert_eq!(
        construct.field("city"),
        Some(&Expr::member(
            ship_to,
            "city",
            FieldKind::Scalar(ValueKind::Text)
        ))
    );
    let names: Vec<&str> = construct.fields().iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["id", "city", "channel", "paid"]);
}

#[test]
fn ignored_field_is_left_out() {
    let spec = ProjectionSpec::builder(&ENTITY, &ENTITY_DTO)
        .ignore("user_name")
        .build();

    let compiled = compile(&spec, &ParameterBindings::new()).expect("compile");
    let body = compiled.expr().as_lambda().expect("lambda").body();

    let Expr::Construct(construct) = body else {
        panic!("expected construct body");
    };
    assert!(construct.field("user_name").is_none());
    assert_eq!(construct.fields().len(), 2);
}

#[test]
fn unbound_parameter_is_rejected() {
    let err = compile(&dto_spec(), &ParameterBindings::new()).expect_err("unbound");

    assert_eq!(
        err,
        CompileError::UnboundParameter {
            field: "user_name",
            parameter: "username".to_string(),
        }
    );
}

#[test]
fn parameter_kind_must_match_destination() {
    let mut bindings = ParameterBindings::new();
    bindings.bind_value("username", 7_i64).expect("bind");

    let err = compile(&dto_spec(), &bindings).expect_err("kind mismatch");

    assert!(matches!(
        err,
        CompileError::KindMismatch {
            field: "user_name",
            ..
        }
    ));
}

#[test]
fn unknown_destination_field_is_rejected() {
    let spec = ProjectionSpec::builder(&ENTITY, &ENTITY_DTO)
        .map_parameter("user_name", "username")
        .map_parameter("nickname", "username")
        .build();

    let err = compile(&spec, &username("Joe")).expect_err("unknown field");

    assert_eq!(
        err,
        CompileError::UnknownField {
            shape: "EntityDto",
            field: "nickname".to_string(),
        }
    );
}

#[test]
fn unresolved_source_path_is_rejected() {
    let spec = ProjectionSpec::builder(&ENTITY, &ENTITY_DTO)
        .map_from("user_name", "owner.name")
        .build();

    let err = compile(&spec, &ParameterBindings::new()).expect_err("unresolved");

    assert!(matches!(
        err,
        CompileError::UnresolvedSource {
            shape: "Entity",
            source: PathError::MissingMember { .. },
            ..
        }
    ));
}

#[test]
fn path_through_a_scalar_is_rejected() {
    let spec = ProjectionSpec::builder(&ENTITY, &ENTITY_DTO)
        .map_from("user_name", "value.length")
        .build();

    let err = compile(&spec, &ParameterBindings::new()).expect_err("scalar traversal");

    assert!(matches!(
        err,
        CompileError::UnresolvedSource {
            source: PathError::ScalarTraversal { .. },
            ..
        }
    ));
}

#[test]
fn duplicate_mapping_is_rejected() {
    let spec = ProjectionSpec::builder(&ENTITY, &ENTITY_DTO)
        .map_parameter("user_name", "username")
        .map_literal("user_name", "Joe")
        .build();

    let err = compile(&spec, &username("Joe")).expect_err("duplicate");

    assert_eq!(
        err,
        CompileError::DuplicateMapping {
            field: "user_name".to_string(),
        }
    );
}

#[test]
fn unmapped_field_without_source_member_is_rejected() {
    let spec = ProjectionSpec::builder(&ORDER, &ORDER_VIEW)
        .map_from("city", "ship_to.city")
        .build();

    let err = compile(&spec, &ParameterBindings::new()).expect_err("unmapped");

    assert_eq!(
        err,
        CompileError::UnmappedField {
            shape: "OrderView",
            field: "channel",
        }
    );
}

#[test]
fn limits_are_enforced() {
    let spec = ProjectionSpec::builder(&ORDER, &ORDER_VIEW)
        .map_from("city", "ship_to.city")
        .map_literal("channel", "web")
        .build();
    let bindings = ParameterBindings::new();

    let shallow = CompileConfig {
        max_path_depth: 1,
        ..CompileConfig::default()
    };
    let err = compile_with(&spec, &bindings, &shallow).expect_err("too deep");
    assert!(matches!(err, CompileError::PathTooDeep { max: 1, .. }));

    let narrow = CompileConfig {
        max_fields: 3,
        ..CompileConfig::default()
    };
    let err = compile_with(&spec, &bindings, &narrow).expect_err("too wide");
    assert!(matches!(
        err,
        CompileError::TooManyFields {
            count: 4,
            max: 3,
            ..
        }
    ));
}

#[test]
fn compile_reports_metrics_events() {
    #[derive(Default)]
    struct Capture(RefCell<Vec<MetricsEvent>>);

    impl MetricsSink for Capture {
        fn record(&self, event: MetricsEvent) {
            self.0.borrow_mut().push(event);
        }
    }

    let capture = Rc::new(Capture::default());
    with_metrics_sink(capture.clone(), || {
        compile(&dto_spec(), &username("Joe")).expect("compile");
        compile(&dto_spec(), &ParameterBindings::new()).expect_err("unbound");
    });

    assert_eq!(
        *capture.0.borrow(),
        vec![
            MetricsEvent::Compile {
                target: "EntityDto",
                fields: 3,
                parameters: 1,
            },
            MetricsEvent::CompileRejected {
                target: "EntityDto"
            },
        ]
    );
}

#[test]
fn display_renders_the_compiled_shape() {
    let compiled = compile(&dto_spec(), &username("Joe")).expect("compile");

    assert_eq!(
        compiled.to_string(),
        "|src| EntityDto { id: src.id, value: src.value, user_name: @username }"
    );
}

//
// shape cache
//

#[test]
fn projection_key_ignores_values_but_not_kinds() {
    let spec = dto_spec();

    let joe = ProjectionKey::new(&spec, &username("Joe"));
    let mary = ProjectionKey::new(&spec, &username("Mary"));
    assert_eq!(joe, mary);

    let mut int_bindings = ParameterBindings::new();
    int_bindings.bind_value("username", 1_i64).expect("bind");
    assert_ne!(joe, ProjectionKey::new(&spec, &int_bindings));
    assert_ne!(joe, ProjectionKey::new(&spec, &ParameterBindings::new()));
}

#[test]
fn projection_key_ignores_unreferenced_bindings() {
    let spec = dto_spec();
    let mut extra = username("Joe");
    extra.bind_value("tenant", 9_u64).expect("bind");

    assert_eq!(
        ProjectionKey::new(&spec, &username("Joe")),
        ProjectionKey::new(&spec, &extra)
    );
}

#[cfg(feature = "shape-cache")]
#[test]
fn shape_cache_tracks_hits_misses_and_size() {
    let cache = ShapeCache::new(&CacheConfig::default());
    let spec = dto_spec();
    let key = ProjectionKey::new(&spec, &username("Joe"));

    assert!(cache.get(&key).is_none());
    cache.record_miss();

    let compiled = Arc::new(compile(&spec, &username("Joe")).expect("compile"));
    cache.insert(key, Arc::clone(&compiled));

    let hit = cache.get(&key).expect("cached");
    cache.record_hit();
    assert!(Arc::ptr_eq(&hit, &compiled));

    assert_eq!(
        cache.stats(),
        CacheStats {
            hits: 1,
            misses: 1,
            size: 1,
        }
    );

    cache.clear();
    assert_eq!(cache.stats(), CacheStats::default());
}

#[cfg(feature = "shape-cache")]
#[test]
fn shape_cache_skips_inserts_beyond_capacity() {
    let cache = ShapeCache::new(&CacheConfig {
        enabled: true,
        max_entries: 1,
    });
    let spec = dto_spec();
    let compiled = Arc::new(compile(&spec, &username("Joe")).expect("compile"));

    let text_key = ProjectionKey::new(&spec, &username("Joe"));
    let mut int_bindings = ParameterBindings::new();
    int_bindings.bind_value("username", 1_i64).expect("bind");
    let int_key = ProjectionKey::new(&spec, &int_bindings);

    cache.insert(text_key, Arc::clone(&compiled));
    cache.insert(int_key, Arc::clone(&compiled));

    assert!(cache.get(&text_key).is_some());
    assert!(cache.get(&int_key).is_none());
    assert_eq!(cache.stats().size, 1);
}

#[test]
fn disabled_shape_cache_stores_nothing() {
    let cache = ShapeCache::new(&CacheConfig {
        enabled: false,
        max_entries: 8,
    });
    let spec = dto_spec();
    let key = ProjectionKey::new(&spec, &username("Joe"));

    cache.insert(key, Arc::new(compile(&spec, &username("Joe")).expect("compile")));
    cache.record_miss();

    assert!(!cache.is_enabled());
    assert!(cache.get(&key).is_none());
    assert_eq!(cache.stats(), CacheStats::default());
}

//
// properties
//

fn arb_text() -> impl Strategy<Value = String> {
    any::<String>()
}

fn arb_parameter_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}"
}

proptest! {
    #[test]
    fn bound_values_never_become_constants(a in arb_text(), b in arb_text()) {
        let first = compile(&dto_spec(), &username(&a)).expect("compile");
        let second = compile(&dto_spec(), &username(&b)).expect("compile");

        prop_assert!(!has_constant_of_kind(first.expr(), ValueKind::Text));
        prop_assert_eq!(first.expr(), second.expr());
        prop_assert_eq!(first.fingerprint(), second.fingerprint());
    }

    #[test]
    fn parameter_name_flows_into_the_slot(name in arb_parameter_name(), value in arb_text()) {
        let spec = ProjectionSpec::builder(&ENTITY, &ENTITY_DTO)
            .map_parameter("user_name", name.as_str())
            .build();
        let bindings = ParameterBindings::snapshot([(name.as_str(), value)]).expect("bind");

        let compiled = compile(&spec, &bindings).expect("compile");
        let slots: Vec<(&str, ValueKind)> = compiled.parameters().iter().collect();

        prop_assert_eq!(slots, vec![(name.as_str(), ValueKind::Text)]);
        prop_assert!(constants(compiled.expr()).is_empty());
    }
}
