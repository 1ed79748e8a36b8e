use graftree::{
    ApplyError, Object, Pointer, SelectorError, Session, Value, create_session,
    sentinel::RecordingSentinel, value,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn person() -> Value {
    value!({
        "person" => {
            "name" => "John Cena",
            "address" => {
                "permanent" => "Nepal",
                "temporary" => "China"
            }
        },
        "friends" => [{ "name" => "Batista" }]
    })
}

#[test]
fn set_a_nested_leaf() {
    init_tracing();
    let original = person();
    let session = create_session(&value!({
        "person" => { "address" => { "permanent" => "#" } }
    }))
    .unwrap();

    let result = session.bind(&original).set("Holy land").apply().unwrap();

    assert_eq!(
        result,
        value!({
            "person" => {
                "name" => "John Cena",
                "address" => {
                    "permanent" => "Holy land",
                    "temporary" => "China"
                }
            },
            "friends" => [{ "name" => "Batista" }]
        })
    );
    assert!(!result["person"]["address"].ptr_eq(&original["person"]["address"]));
    assert!(!result["person"].ptr_eq(&original["person"]));
    assert!(!result.ptr_eq(&original));
    assert!(result["friends"].ptr_eq(&original["friends"]));
    assert_eq!(original, person());
}

#[test]
fn delete_a_key_from_a_selected_object() {
    init_tracing();
    let original = value!({ "obj" => { "a" => 1, "b" => 2 } });
    let session = create_session(&value!({ "obj" => "#" })).unwrap();

    let result = session.bind(&original).delete("b").apply().unwrap();
    assert_eq!(result, value!({ "obj" => { "a" => 1 } }));
    assert_eq!(original, value!({ "obj" => { "a" => 1, "b" => 2 } }));
}

#[test]
fn apply_without_an_operation_fails() {
    init_tracing();
    let original = value!({ "p" => 5 });
    let session = create_session(&value!({ "p" => "#" })).unwrap();

    let err = session.bind(&original).apply().unwrap_err();
    assert!(matches!(err, ApplyError::NoOperationQueued { .. }));
    assert_eq!(err.path(), ["p"]);
    insta::assert_snapshot!(
        err.to_string(),
        @"operation required: reached pointer at <root>.p but no operation was queued"
    );
}

#[test]
fn invalid_selectors_are_rejected_up_front() {
    for selector in [value!({}), value!(null), value!("#"), value!([{ "a" => "#" }])] {
        assert!(
            matches!(
                create_session(&selector),
                Err(SelectorError::InvalidSelector { .. })
            ),
            "{selector} should be rejected"
        );
    }

    let err = create_session(&value!({ "a" => { "b" => 3 } })).unwrap_err();
    assert!(matches!(err, SelectorError::InvalidLeaf { .. }));
}

#[test]
fn merge_extend_and_append() {
    init_tracing();
    let original = value!({
        "settings" => { "theme" => "dark", "lang" => "en" },
        "history" => [1, 2],
        "log" => ["start"]
    });
    let session = create_session(&value!({
        "settings" => "#/settings",
        "history" => "#/history",
        "log" => "#/log"
    }))
    .unwrap();

    let result = session
        .bind(&original)
        .of("#/settings")
        .merge([("lang", "de"), ("tz", "CET")])
        .of("#/history")
        .extend(vec![3, 4])
        .of("#/log")
        .append("stop")
        .apply()
        .unwrap();

    assert_eq!(
        result,
        value!({
            "settings" => { "theme" => "dark", "lang" => "de", "tz" => "CET" },
            "history" => [1, 2, 3, 4],
            "log" => ["start", "stop"]
        })
    );
    let keys: Vec<_> = result["settings"].as_object().unwrap().keys().collect();
    assert_eq!(keys, ["theme", "lang", "tz"]);
}

#[test]
fn no_op_operations_keep_the_original_leaf() {
    let original = value!({
        "obj" => { "a" => 1 },
        "arr" => [1],
        "name" => "x"
    });
    let session = create_session(&value!({
        "obj" => "#/obj",
        "arr" => "#/arr",
        "name" => "#/name"
    }))
    .unwrap();

    let result = session
        .bind(&original)
        .of("#/obj")
        .merge(Object::new())
        .of("#/arr")
        .append(Value::Null)
        .of("#/name")
        .set(Value::Null)
        .apply()
        .unwrap();

    assert_eq!(result, original);
    assert!(result["obj"].ptr_eq(&original["obj"]));
    assert!(result["arr"].ptr_eq(&original["arr"]));
}

#[test]
fn operations_on_the_wrong_shape_are_no_ops() {
    let original = value!({ "n" => 1, "s" => "text" });
    let session = create_session(&value!({ "n" => "#/n", "s" => "#/s" })).unwrap();

    let result = session
        .bind(&original)
        .of("#/n")
        .append(2)
        .of("#/s")
        .merge([("k", "v")])
        .apply()
        .unwrap();
    assert_eq!(result, original);
}

#[test]
fn pipe_receives_the_current_leaf() {
    let original = value!({ "count" => 41, "missing" => { "x" => null } });
    let session = create_session(&value!({ "count" => "#" })).unwrap();

    let result = session
        .bind(&original)
        .pipe(|v| Value::from(v.as_i64().unwrap_or(0) + 1))
        .apply()
        .unwrap();
    assert_eq!(result["count"], 42);
}

#[test]
fn one_session_many_documents() {
    let session: Session = create_session(&value!({ "meta" => { "rev" => "#" } })).unwrap();
    let docs: Vec<Value> = (0..3)
        .map(|i| value!({ "meta" => { "rev" => (i) }, "body" => "..." }))
        .collect();

    let bumped: Vec<Value> = docs
        .iter()
        .map(|doc| {
            session
                .bind(doc)
                .pipe(|v| Value::from(v.as_i64().unwrap_or(0) + 100))
                .apply()
                .unwrap()
        })
        .collect();

    for (i, (doc, bumped)) in docs.iter().zip(&bumped).enumerate() {
        assert_eq!(bumped["meta"]["rev"], 100 + i as i64);
        assert_eq!(doc["meta"]["rev"], i as i64);
        assert!(bumped["body"].ptr_eq(&doc["body"]));
    }
}

#[test]
fn default_pointer_marker_is_not_a_named_pointer() {
    let original = value!({ "a" => 1, "b" => 2 });
    let session = create_session(&value!({ "a" => "#", "b" => "#/unused" })).unwrap();

    let mut tx = session.bind(&original);
    tx.of("#/unused").set(20);
    tx.of("#");
    assert_eq!(tx.current_pointer(), &Pointer::Named("#/unused".into()));

    let result = tx.apply().unwrap();
    assert_eq!(result, value!({ "a" => 1, "b" => 20 }));
}

#[test]
fn recording_the_traversal() {
    let original = value!({ "a" => { "b" => 1, "c" => 2 }, "d" => [10, 20] });
    let session = create_session(&value!({
        "a" => { "b" => "#", "c" => "#/c" },
        "d" => { "1" => "#" }
    }))
    .unwrap();

    let mut sentinel = RecordingSentinel::new();
    let result = session
        .bind(&original)
        .set(0)
        .apply_with(&mut sentinel)
        .unwrap();

    assert_eq!(result, value!({ "a" => { "b" => 0, "c" => 2 }, "d" => [10, 0] }));
    insta::assert_debug_snapshot!(sentinel.changes_seen, @r#"
    [
        "update 1 -> 0 at a/b via #",
        "unmatched #/c at a/c",
        "update 20 -> 0 at d/1 via #",
    ]
    "#);
}
