//! Index tables over a file-backed SQLite store.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use uuid::Uuid;

fn artist(id: Uuid, name: &str, married: bool) -> AttributeMap {
    attrs(&[
        (ID_KEY, Value::Uuid(id)),
        ("name", Value::from(name)),
        ("born", Value::Timestamp(timestamp(1881, 10, 25))),
        ("married", Value::Bool(married)),
        ("picture", Value::Bytes(name.as_bytes().to_vec())),
    ])
}

#[test]
fn create_index_table_uses_truncated_name() {
    let t = TestDb::new();
    let table = t
        .db
        .indexes()
        .create_index_table("VeryFamousArtists", &artist_descriptor())
        .unwrap();
    assert_eq!(
        table,
        "index_veryfamousartists_on_nam_and_bor_and_marrie_and_pictur"
    );
    assert!(t.store.table_exists(&table).unwrap());
}

#[test]
fn index_columns_follow_descriptor_order() {
    let t = TestDb::new();
    let table = t
        .db
        .indexes()
        .create_index_table("artists", &artist_descriptor())
        .unwrap();

    let columns = t.store.columns(&table).unwrap();
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["name", "born", "married", "picture", "id"]);
    assert!(columns.iter().all(|c| !c.nullable));
    let positions: Vec<usize> = columns.iter().map(|c| c.position).collect();
    assert_eq!(positions, vec![1, 2, 3, 4, 5]);
}

#[test]
fn single_row_roundtrip() {
    let t = TestDb::new();
    let d = IndexDescriptor::from_pairs([("name", ColumnType::Text)]);
    t.db.indexes().create_index_table("artists", &d).unwrap();

    let id = Uuid::new_v4();
    let row = attrs(&[(ID_KEY, Value::Uuid(id)), ("name", Value::from("Dali"))]);
    assert_eq!(t.db.indexes().insert_index_value("artists", &d, &[row.clone()]).unwrap(), 1);

    let values = t.db.indexes().get_index_values_by_id("artists", &d, id).unwrap();
    assert_eq!(values, Some(row));
}

#[test]
fn every_row_of_a_batch_is_retrievable() {
    let t = TestDb::new();
    let d = artist_descriptor();
    t.db.indexes().create_index_table("artists", &d).unwrap();

    let rows: Vec<AttributeMap> = ["Picasso", "Dali", "Miro"]
        .iter()
        .enumerate()
        .map(|(i, name)| artist(Uuid::new_v4(), name, i % 2 == 0))
        .collect();
    assert_eq!(t.db.indexes().insert_index_value("artists", &d, &rows).unwrap(), 3);

    for row in &rows {
        let id = row[ID_KEY].as_uuid().unwrap();
        let values = t
            .db
            .indexes()
            .get_index_values_by_id("artists", &d, id)
            .unwrap()
            .unwrap();
        assert_eq!(&values, row);
    }
}

#[test]
fn empty_batch_is_rejected() {
    let t = TestDb::new();
    let err = t
        .db
        .indexes()
        .insert_index_value("artists", &artist_descriptor(), &[])
        .unwrap_err();
    assert!(matches!(err, Error::EmptyIndexRows));
    assert!(err.is_validation());
}

#[test]
fn duplicate_id_in_index_is_storage_error() {
    let t = TestDb::new();
    let d = artist_descriptor();
    t.db.indexes().create_index_table("artists", &d).unwrap();
    let id = Uuid::new_v4();

    t.db.indexes()
        .insert_index_value("artists", &d, &[artist(id, "Picasso", true)])
        .unwrap();
    let err = t
        .db
        .indexes()
        .insert_index_value("artists", &d, &[artist(id, "Other", false)])
        .unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
}

#[test]
fn drop_removes_table() {
    let t = TestDb::new();
    let d = artist_descriptor();
    let table = t.db.indexes().create_index_table("artists", &d).unwrap();
    assert_eq!(t.db.indexes().drop_index_table("artists", &d).unwrap(), table);
    assert!(!t.store.table_exists(&table).unwrap());
}

#[test]
fn configured_truncation_bound_applies() {
    let dir = tempfile::tempdir().unwrap();
    let store = std::sync::Arc::new(SqliteStore::open(dir.path().join("t.db")).unwrap());
    let config = TabulaConfig {
        max_truncation_attempts: 3,
        ..TabulaConfig::for_dialect("sqlite")
    };
    let db = Tabula::new(store, &config).unwrap();

    let err = db
        .indexes()
        .create_index_table("VeryVeryFamousArtistsOfTheTwentiethCentury", &artist_descriptor())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::IndexNameTooLong {
            limit: 63,
            attempts: 3,
            ..
        }
    ));
}
