use projector::{
    core::{
        binding::ParameterValues,
        compile::CompileError,
        exec::{ExecuteError, evaluate},
        expr::visit::constants,
    },
    error::{BindingErrorKind, ErrorKind, ErrorOrigin, ProjectionErrorKind},
    prelude::*,
};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

static ENTITY: ShapeModel = ShapeModel::new(
    "Entity",
    &[
        FieldModel::scalar("id", ValueKind::Int),
        FieldModel::scalar("value", ValueKind::Text),
    ],
);

static ENTITY_DTO: ShapeModel = ShapeModel::new(
    "EntityDto",
    &[
        FieldModel::scalar("id", ValueKind::Int),
        FieldModel::scalar("value", ValueKind::Text),
        FieldModel::scalar("user_name", ValueKind::Text),
    ],
);

///
/// EntityDto
///

#[derive(Debug, Eq, PartialEq)]
struct EntityDto {
    id: i64,
    value: String,
    user_name: Option<String>,
}

impl FromRecord for EntityDto {
    fn from_record(record: &Record) -> Result<Self, ExecuteError> {
        Ok(Self {
            id: Self::int_field(record, "EntityDto", "id")?,
            value: Self::text_field(record, "EntityDto", "value")?,
            user_name: record.text("user_name").map(str::to_string),
        })
    }
}

fn registry() -> Arc<ProjectionRegistry> {
    let mut registry = ProjectionRegistry::new();
    registry
        .register(
            ProjectionSpec::builder(&ENTITY, &ENTITY_DTO)
                .map_parameter("user_name", "username")
                .build(),
        )
        .expect("register EntityDto");

    Arc::new(registry)
}

fn seeded_store() -> MemoryStore {
    let mut store = MemoryStore::new(&ENTITY);
    for (id, value) in [(1_i64, "Value1"), (2, "Value2")] {
        let row = Record::from_fields([("id", Value::from(id)), ("value", Value::from(value))])
            .expect("row");
        store.insert(row).expect("seed");
    }

    store
}

/// Binding table whose `username` tracks a shared variable.
fn captured_username(initial: Option<&str>) -> (Arc<Mutex<Option<String>>>, ParameterBindings) {
    let username = Arc::new(Mutex::new(initial.map(str::to_string)));
    let provider = Arc::clone(&username);

    let mut bindings = ParameterBindings::new();
    bindings
        .bind_with("username", ValueKind::Text, move || {
            Value::from(provider.lock().expect("username lock").clone())
        })
        .expect("bind username");

    (username, bindings)
}

fn user_names(rows: &[EntityDto]) -> Vec<Option<&str>> {
    rows.iter().map(|row| row.user_name.as_deref()).collect()
}

#[test]
fn username_is_hoisted_into_a_parameter_slot() {
    let projector = Projector::new(registry(), ProjectorConfig::default());
    let (_, bindings) = captured_username(None);

    let compiled = projector
        .project("Entity", "EntityDto", &bindings)
        .expect("project");

    assert!(!has_constant_of_kind(compiled.expr(), ValueKind::Text));
    assert!(constants(compiled.expr()).is_empty());
    assert_eq!(
        compiled.parameters().iter().collect::<Vec<_>>(),
        vec![("username", ValueKind::Text)]
    );
}

#[test]
fn rebinding_changes_results_without_recompiling() {
    let projector = Projector::new(registry(), ProjectorConfig::default());
    let store = seeded_store();
    let (username, bindings) = captured_username(None);

    let compiled = projector
        .project("Entity", "EntityDto", &bindings)
        .expect("project");

    *username.lock().expect("lock") = Some("Joe".to_string());
    let joe: Vec<EntityDto> = projector
        .execute_as(&compiled, &bindings, &store)
        .expect("execute as Joe");
    assert_eq!(
        joe,
        vec![
            EntityDto {
                id: 1,
                value: "Value1".to_string(),
                user_name: Some("Joe".to_string()),
            },
            EntityDto {
                id: 2,
                value: "Value2".to_string(),
                user_name: Some("Joe".to_string()),
            },
        ]
    );

    *username.lock().expect("lock") = Some("Mary".to_string());
    let mary: Vec<EntityDto> = projector
        .execute_as(&compiled, &bindings, &store)
        .expect("execute as Mary");
    assert_eq!(user_names(&mary), [Some("Mary"), Some("Mary")]);

    let again = projector
        .project("Entity", "EntityDto", &bindings)
        .expect("project again");
    assert!(Arc::ptr_eq(&compiled, &again));
    assert_eq!(compiled.fingerprint(), again.fingerprint());
}

#[test]
fn null_username_materializes_as_absent() {
    let projector = Projector::new(registry(), ProjectorConfig::default());
    let (_, bindings) = captured_username(None);

    let rows: Vec<EntityDto> = projector
        .query_as("Entity", "EntityDto", &bindings, &seeded_store())
        .expect("query");

    assert_eq!(user_names(&rows), [None, None]);
}

#[test]
fn snapshot_binding_compiles_to_the_same_shape() {
    let projector = Projector::new(registry(), ProjectorConfig::default());
    let (_, dynamic) = captured_username(Some("Joe"));
    let snapshot = ParameterBindings::snapshot([("username", "Joe")]).expect("snapshot");

    let a = projector
        .project("Entity", "EntityDto", &dynamic)
        .expect("dynamic");
    let b = projector
        .project("Entity", "EntityDto", &snapshot)
        .expect("snapshot");

    assert_eq!(a.expr(), b.expr());
    assert!(!has_constant_of_kind(b.expr(), ValueKind::Text));

    let rows: Vec<EntityDto> = projector
        .execute_as(&b, &snapshot, &seeded_store())
        .expect("execute");
    assert_eq!(user_names(&rows), [Some("Joe"), Some("Joe")]);
}

#[test]
fn compiled_shape_matches_a_hand_written_projection() {
    let projector = Projector::new(registry(), ProjectorConfig::default());
    let (_, bindings) = captured_username(Some("Joe"));
    let compiled = projector
        .project("Entity", "EntityDto", &bindings)
        .expect("project");

    let member = |name: &str, kind| {
        Expr::member(Expr::variable("src"), name, FieldKind::Scalar(kind))
    };
    let baseline = Expr::lambda(
        "src",
        Expr::construct(
            "EntityDto",
            [
                ("id", member("id", ValueKind::Int)),
                ("value", member("value", ValueKind::Text)),
                ("user_name", Expr::parameter("username", ValueKind::Text)),
            ],
        )
        .expect("baseline construct"),
    );

    assert_eq!(compiled.expr(), &baseline);
    assert_eq!(compiled.fingerprint(), baseline.fingerprint());

    // evaluate the baseline by hand against the first seeded row
    let store = seeded_store();
    let row = Value::Record(store.rows()[0].clone());
    let parameters: ParameterValues = [("username", "Joe")].into_iter().collect();
    let lambda = baseline.as_lambda().expect("lambda");
    let env = projector::core::exec::Env::new(lambda.param(), &row, &parameters);
    let by_hand = evaluate(lambda.body(), &env).expect("evaluate");

    let executed = projector
        .execute(&compiled, &bindings, &store)
        .expect("execute");
    assert_eq!(Some(&executed[0]), by_hand.as_record());
}

#[test]
fn inline_literal_is_detected_as_a_constant() {
    let mut registry = ProjectionRegistry::new();
    registry
        .register(
            ProjectionSpec::builder(&ENTITY, &ENTITY_DTO)
                .map_literal("user_name", "Joe")
                .build(),
        )
        .expect("register");
    let projector = Projector::new(Arc::new(registry), ProjectorConfig::default());

    let compiled = projector
        .project("Entity", "EntityDto", &ParameterBindings::new())
        .expect("project");

    assert!(has_constant_of_kind(compiled.expr(), ValueKind::Text));
}

#[test]
fn duplicate_binding_is_rejected() {
    let mut bindings = ParameterBindings::new();
    bindings.bind_value("username", "Joe").expect("first");

    let err: Error = bindings
        .bind_value("username", "Mary")
        .map(|_| ())
        .expect_err("duplicate")
        .into();

    assert_eq!(err.kind, ErrorKind::Binding(BindingErrorKind::Duplicate));
    assert_eq!(err.origin, ErrorOrigin::Binding);
}

#[test]
fn unknown_field_is_rejected_before_execution() {
    let mut registry = ProjectionRegistry::new();

    let err = registry
        .register(
            ProjectionSpec::builder(&ENTITY, &ENTITY_DTO)
                .map_parameter("nickname", "username")
                .build(),
        )
        .expect_err("unknown field");

    assert_eq!(
        err,
        CompileError::UnknownField {
            shape: "EntityDto",
            field: "nickname".to_string(),
        }
    );
    assert!(registry.is_empty());
}

#[test]
fn unregistered_projection_is_not_found() {
    let projector = Projector::new(registry(), ProjectorConfig::default());

    let err = projector
        .project("Entity", "Entity", &ParameterBindings::new())
        .expect_err("not registered");

    assert_eq!(err.kind, ErrorKind::Projection(ProjectionErrorKind::NotFound));
    assert_eq!(err.origin, ErrorOrigin::Registry);
}

#[test]
fn missing_binding_fails_at_compile_time() {
    let projector = Projector::new(registry(), ProjectorConfig::default());

    let err = projector
        .project("Entity", "EntityDto", &ParameterBindings::new())
        .expect_err("unbound");

    assert_eq!(err.kind, ErrorKind::Binding(BindingErrorKind::Unbound));
    assert_eq!(err.origin, ErrorOrigin::Compile);
}

#[test]
fn config_file_toggles_the_cache() {
    let path = std::env::temp_dir().join(format!("projector-{}.toml", std::process::id()));
    std::fs::write(&path, "[cache]\nenabled = false\n").expect("write config");

    let projector = Projector::from_config_path(registry(), &path).expect("load config");
    let _ = std::fs::remove_file(&path);

    let bindings = ParameterBindings::snapshot([("username", "Joe")]).expect("bind");
    projector
        .project("Entity", "EntityDto", &bindings)
        .expect("first");
    projector
        .project("Entity", "EntityDto", &bindings)
        .expect("second");

    assert!(!projector.mapper().config().cache.enabled);
    assert_eq!(projector.cache_stats().size, 0);
}

proptest! {
    #[test]
    fn every_execution_sees_the_current_value(
        names in proptest::collection::vec(any::<String>(), 1..6)
    ) {
        let projector = Projector::new(registry(), ProjectorConfig::default());
        let store = seeded_store();
        let (username, bindings) = captured_username(None);
        let compiled = projector
            .project("Entity", "EntityDto", &bindings)
            .expect("project");

        for name in &names {
            *username.lock().expect("lock") = Some(name.clone());
            let rows: Vec<EntityDto> = projector
                .execute_as(&compiled, &bindings, &store)
                .expect("execute");

            prop_assert_eq!(rows.len(), 2);
            for row in &rows {
                prop_assert_eq!(row.user_name.as_deref(), Some(name.as_str()));
            }
        }

        prop_assert!(!has_constant_of_kind(compiled.expr(), ValueKind::Text));
    }
}
