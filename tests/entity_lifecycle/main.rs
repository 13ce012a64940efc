//! Entity lifecycle over a file-backed SQLite store: insert, find, update.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use tabula::EntityRepository;
use uuid::Uuid;

fn john() -> AttributeMap {
    attrs(&[
        ("firstName", Value::from("John")),
        ("age", Value::I32(31)),
        ("married", Value::Bool(true)),
    ])
}

#[test]
fn insert_assigns_identity_and_keeps_fields() {
    let t = TestDb::with_entity_table("people");
    let saved = t.db.entities().put("people", john()).unwrap();

    assert!(saved[ID_KEY].as_uuid().is_some());
    assert!(saved[UPDATED_KEY].as_timestamp().is_some());
    assert_eq!(saved["firstName"], Value::from("John"));
    assert_eq!(saved["age"], Value::I32(31));
    assert_eq!(saved["married"], Value::Bool(true));
    assert_eq!(saved.len(), 5);
}

#[test]
fn find_returns_narrowed_integers() {
    let t = TestDb::with_entity_table("people");
    let saved = t.db.entities().put("people", john()).unwrap();
    let id = saved[ID_KEY].as_uuid().unwrap();

    let found = t.db.entities().find("people", id).unwrap().unwrap();
    assert_eq!(found["age"], Value::I8(31));
    assert_eq!(found["firstName"], Value::from("John"));
    assert_eq!(found["married"], Value::Bool(true));
    assert_eq!(found[ID_KEY], saved[ID_KEY]);
    assert_eq!(found[UPDATED_KEY], saved[UPDATED_KEY]);
}

#[test]
fn inserting_twice_creates_two_entities() {
    let t = TestDb::with_entity_table("people");
    let a = t.db.entities().put("people", john()).unwrap();
    let b = t.db.entities().put("people", john()).unwrap();
    assert_ne!(a[ID_KEY], b[ID_KEY]);

    for saved in [&a, &b] {
        let id = saved[ID_KEY].as_uuid().unwrap();
        assert!(t.db.entities().find("people", id).unwrap().is_some());
    }
}

#[test]
fn update_keeps_id_and_replaces_body() {
    let t = TestDb::with_entity_table("people");
    let saved = t.db.entities().put("people", john()).unwrap();
    let id = saved[ID_KEY].as_uuid().unwrap();

    let mut changed = saved.clone();
    changed.insert("age".into(), Value::I64(70_000));
    changed.remove("married");
    let resaved = t.db.entities().put("people", changed).unwrap();
    assert_eq!(resaved[ID_KEY].as_uuid(), Some(id));
    assert!(resaved[UPDATED_KEY].as_timestamp() >= saved[UPDATED_KEY].as_timestamp());

    let found = t.db.entities().find("people", id).unwrap().unwrap();
    assert_eq!(found["age"], Value::I32(70_000));
    assert!(!found.contains_key("married"));

    // still one row
    let record = t.db.repository().get_by_id("people", id).unwrap().unwrap();
    assert_eq!(record.ref_key, Some(1));
    assert!(t.db.repository().get_by_ref_key("people", 2).unwrap().is_none());
}

#[test]
fn update_of_missing_entity_fails() {
    let t = TestDb::with_entity_table("people");
    let id = Uuid::new_v4();
    let mut ghost = john();
    ghost.insert(ID_KEY.into(), Value::Uuid(id));
    ghost.insert(UPDATED_KEY.into(), Value::Timestamp(timestamp(2020, 1, 1)));

    let err = t.db.entities().put("people", ghost).unwrap_err();
    assert!(matches!(err, Error::EntityNotFound(missing) if missing == id));
}

#[test]
fn find_of_unknown_id_is_none() {
    let t = TestDb::with_entity_table("people");
    assert!(t.db.entities().find("people", Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn entity_name_is_case_and_space_insensitive() {
    let t = TestDb::with_entity_table("People");
    let saved = t.db.entities().put(" PEOPLE ", john()).unwrap();
    let id = saved[ID_KEY].as_uuid().unwrap();
    assert!(t.db.entities().find("people", id).unwrap().is_some());
}

#[test]
fn missing_entity_table_is_storage_error() {
    let t = TestDb::new();
    let err = t.db.entities().put("nowhere", john()).unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
}

#[test]
fn all_scalar_kinds_survive() {
    let t = TestDb::with_entity_table("things");
    let attributes = attrs(&[
        ("nothing", Value::Null),
        ("flag", Value::Bool(false)),
        ("small", Value::I16(-3)),
        ("big", Value::I64(i64::MIN)),
        ("ratio", Value::F32(0.5)),
        ("pi", Value::F64(std::f64::consts::PI)),
        ("label", Value::from("żółw")),
    ]);
    let saved = t.db.entities().put("things", attributes).unwrap();
    let found = t
        .db
        .entities()
        .find("things", saved[ID_KEY].as_uuid().unwrap())
        .unwrap()
        .unwrap();

    assert_eq!(found["nothing"], Value::Null);
    assert_eq!(found["flag"], Value::Bool(false));
    assert_eq!(found["small"], Value::I8(-3));
    assert_eq!(found["big"], Value::I64(i64::MIN));
    assert_eq!(found["ratio"], Value::F32(0.5));
    assert_eq!(found["pi"], Value::F64(std::f64::consts::PI));
    assert_eq!(found["label"], Value::from("żółw"));
}

#[test]
fn entity_table_shape() {
    let t = TestDb::with_entity_table("people");
    let columns = t.store.columns("people").unwrap();
    let shape: Vec<(&str, &str, bool)> = columns
        .iter()
        .map(|c| (c.name.as_str(), c.declared_type.as_str(), c.nullable))
        .collect();
    assert_eq!(
        shape,
        vec![
            ("added_id", "INTEGER", false),
            ("id", "TEXT", false),
            ("updated", "TIMESTAMP", false),
            ("body", "BLOB", true),
        ]
    );
}
