//! Entity table access
//!
//! `EntityRepository` is the capability `EntityStore` needs: insert a record,
//! update it by id, fetch it by id. `SqlEntityRepository` implements it over
//! any `BackingStore` with statements rendered by a `Dialect`.

use std::sync::Arc;

use tabula_core::{Error, Result};
use tabula_sql::{entity_table_name, BackingStore, Dialect, SqlRow, SqlType, SqlValue};
use tracing::{debug, info};
use uuid::Uuid;

use crate::entity::EntityRecord;

/// Persistence of entity records.
///
/// # Thread Safety
///
/// Implementations are shared behind an `Arc` and must be `Send + Sync`.
pub trait EntityRepository: Send + Sync {
    /// Insert a record, returning the generated surrogate key.
    ///
    /// # Errors
    ///
    /// `NoGeneratedKey` when the backend reports no key.
    fn insert_entity(&self, entity_name: &str, record: &EntityRecord) -> Result<i64>;

    /// Overwrite `updated` and `body` of the row with `record.id`.
    ///
    /// Returns the number of rows changed.
    fn update_entity(&self, entity_name: &str, record: &EntityRecord) -> Result<u64>;

    /// Fetch a record by id.
    fn get_by_id(&self, entity_name: &str, id: Uuid) -> Result<Option<EntityRecord>>;
}

const RECORD_SHAPE: [SqlType; 4] = [SqlType::Int, SqlType::Uuid, SqlType::Timestamp, SqlType::Bytes];

/// `EntityRepository` over a relational backing store.
#[derive(Clone)]
pub struct SqlEntityRepository {
    store: Arc<dyn BackingStore>,
    dialect: Arc<dyn Dialect>,
}

impl SqlEntityRepository {
    /// Create a repository
    pub fn new(store: Arc<dyn BackingStore>, dialect: Arc<dyn Dialect>) -> Self {
        info!(target: "tabula::entity", dialect = dialect.name(), "Entity repository initialized");
        Self { store, dialect }
    }

    /// Dialect used for statements
    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }

    /// Create the standard entity table for `entity_name`.
    ///
    /// Returns the table name.
    pub fn create_entity_table(&self, entity_name: &str) -> Result<String> {
        let table = entity_table_name(entity_name)?;
        let ddl = self.dialect.entity_table_ddl(&table);

        let mut conn = self.store.acquire()?;
        conn.execute(&ddl, &[])?;

        info!(target: "tabula::entity", table = %table, "Entity table created");
        Ok(table)
    }

    /// Fetch a record by its surrogate key.
    pub fn get_by_ref_key(&self, entity_name: &str, ref_key: i64) -> Result<Option<EntityRecord>> {
        let table = entity_table_name(entity_name)?;
        debug!(target: "tabula::entity", table = %table, ref_key, "get by ref key");

        let sql = format!(
            "SELECT added_id,id,updated,body FROM {} WHERE added_id={}",
            table,
            self.dialect.placeholder(1)
        );
        self.fetch_one(&sql, SqlValue::Int(ref_key))
    }

    fn fetch_one(&self, sql: &str, key: SqlValue) -> Result<Option<EntityRecord>> {
        let mut conn = self.store.acquire()?;
        let rows = conn.query(sql, &[key], &RECORD_SHAPE)?;
        // id and added_id are both unique
        match rows.into_iter().next() {
            Some(row) => record_from_row(row).map(Some),
            None => Ok(None),
        }
    }
}

impl EntityRepository for SqlEntityRepository {
    fn insert_entity(&self, entity_name: &str, record: &EntityRecord) -> Result<i64> {
        let table = entity_table_name(entity_name)?;
        debug!(target: "tabula::entity", table = %table, id = %record.id, "Before inserting tuple");

        let sql = format!(
            "INSERT INTO {}(id,updated,body) VALUES ({},{},{})",
            table,
            self.dialect.placeholder(1),
            self.dialect.placeholder(2),
            self.dialect.placeholder(3)
        );
        let params = [
            SqlValue::Uuid(record.id),
            SqlValue::Timestamp(record.updated),
            SqlValue::Bytes(record.body.clone()),
        ];

        let mut conn = self.store.acquire()?;
        let key = match conn.insert_returning_key(&sql, &params)? {
            Some(key) if key != 0 => key,
            _ => return Err(Error::NoGeneratedKey),
        };

        debug!(target: "tabula::entity", id = %record.id, ref_key = key, "Put entity");
        Ok(key)
    }

    fn update_entity(&self, entity_name: &str, record: &EntityRecord) -> Result<u64> {
        let table = entity_table_name(entity_name)?;
        debug!(target: "tabula::entity", table = %table, id = %record.id, "Update");

        let sql = format!(
            "UPDATE {} SET updated={},body={} WHERE id={}",
            table,
            self.dialect.placeholder(1),
            self.dialect.placeholder(2),
            self.dialect.placeholder(3)
        );
        let params = [
            SqlValue::Timestamp(record.updated),
            SqlValue::Bytes(record.body.clone()),
            SqlValue::Uuid(record.id),
        ];

        let mut conn = self.store.acquire()?;
        conn.execute(&sql, &params)
    }

    fn get_by_id(&self, entity_name: &str, id: Uuid) -> Result<Option<EntityRecord>> {
        let table = entity_table_name(entity_name)?;
        debug!(target: "tabula::entity", table = %table, id = %id, "get by id");

        let sql = format!(
            "SELECT added_id,id,updated,body FROM {} WHERE id={}",
            table,
            self.dialect.placeholder(1)
        );
        self.fetch_one(&sql, SqlValue::Uuid(id))
    }
}

fn record_from_row(row: SqlRow) -> Result<EntityRecord> {
    let mut values = row.into_iter();
    match (values.next(), values.next(), values.next(), values.next()) {
        (
            Some(SqlValue::Int(ref_key)),
            Some(SqlValue::Uuid(id)),
            Some(SqlValue::Timestamp(updated)),
            Some(body),
        ) => {
            let body = match body {
                SqlValue::Bytes(bytes) => bytes,
                SqlValue::Null => Vec::new(),
                other => {
                    return Err(Error::storage(format!(
                        "Entity body holds {} instead of bytes",
                        other.type_name()
                    )))
                }
            };
            Ok(EntityRecord {
                ref_key: Some(ref_key),
                id,
                updated,
                body,
            })
        }
        _ => Err(Error::storage("Entity row does not match the entity table shape")),
    }
}
