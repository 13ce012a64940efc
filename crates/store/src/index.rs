//! Secondary index tables
//!
//! An index table holds one row per indexed entity: the values of the
//! descriptor's columns, in order, followed by the entity id. The table name
//! is derived from the entity name and the descriptor, so the same pair
//! always maps to the same table.
//!
//! Column names are written lower-cased in SQL; values read back are keyed
//! by the names exactly as the descriptor declares them.

use std::sync::Arc;

use tabula_core::{
    AttributeMap, ColumnType, Error, IndexColumn, IndexDescriptor, Result, Value, ID_KEY,
};
use tabula_sql::{BackingStore, Dialect, IndexTableNameResolver, SqlType, SqlValue};
use tracing::{debug, info};
use uuid::Uuid;

/// Creates, fills, reads and drops index tables.
#[derive(Clone)]
pub struct IndexRepository {
    store: Arc<dyn BackingStore>,
    dialect: Arc<dyn Dialect>,
    resolver: IndexTableNameResolver,
}

impl IndexRepository {
    /// Create a repository using the dialect's identifier limit and the
    /// default truncation bound.
    pub fn new(store: Arc<dyn BackingStore>, dialect: Arc<dyn Dialect>) -> Self {
        let resolver = IndexTableNameResolver::for_dialect(dialect.as_ref());
        Self::with_resolver(store, dialect, resolver)
    }

    /// Create a repository with an explicit name resolver
    pub fn with_resolver(
        store: Arc<dyn BackingStore>,
        dialect: Arc<dyn Dialect>,
        resolver: IndexTableNameResolver,
    ) -> Self {
        Self {
            store,
            dialect,
            resolver,
        }
    }

    /// Name resolver in use
    pub fn resolver(&self) -> &IndexTableNameResolver {
        &self.resolver
    }

    /// Index table name for `entity_name` and `descriptor`.
    ///
    /// The name is not checked against existing tables.
    pub fn resolve_table_name(&self, entity_name: &str, descriptor: &IndexDescriptor) -> Result<String> {
        self.resolver.resolve(entity_name, descriptor)
    }

    /// Create the index table. Returns its name.
    pub fn create_index_table(&self, entity_name: &str, descriptor: &IndexDescriptor) -> Result<String> {
        let table = self.resolve_table_name(entity_name, descriptor)?;
        let ddl = self.dialect.index_table_ddl(&table, descriptor)?;

        let mut conn = self.store.acquire()?;
        conn.execute(&ddl, &[])?;

        info!(target: "tabula::index", table = %table, "Index table created");
        Ok(table)
    }

    /// Drop the index table. Returns its name.
    pub fn drop_index_table(&self, entity_name: &str, descriptor: &IndexDescriptor) -> Result<String> {
        let table = self.resolve_table_name(entity_name, descriptor)?;
        let ddl = self.dialect.drop_table_ddl(&table);

        let mut conn = self.store.acquire()?;
        conn.execute(&ddl, &[])?;

        info!(target: "tabula::index", table = %table, "Index table dropped");
        Ok(table)
    }

    /// Insert one index row per attribute map, as a single batch.
    ///
    /// Each map must carry a UUID `id` and a value of the declared type for
    /// every descriptor column. Extra keys are ignored. Returns the number of
    /// rows written.
    ///
    /// # Errors
    ///
    /// - `EmptyIndexRows` when `rows` is empty
    /// - `IndexValueMismatch` when a value is missing, null or of the wrong type
    pub fn insert_index_value(
        &self,
        entity_name: &str,
        descriptor: &IndexDescriptor,
        rows: &[AttributeMap],
    ) -> Result<u64> {
        if rows.is_empty() {
            return Err(Error::EmptyIndexRows);
        }

        let table = self.resolve_table_name(entity_name, descriptor)?;
        let params = rows
            .iter()
            .map(|row| project_row(descriptor, row))
            .collect::<Result<Vec<_>>>()?;
        let sql = self.insert_sql(&table, descriptor);
        debug!(target: "tabula::index", sql = %sql, rows = params.len(), "batch insert");

        let mut conn = self.store.acquire()?;
        conn.execute_batch(&sql, &params)
    }

    /// Values stored for entity `id`, or `None` when it is not indexed.
    ///
    /// The map holds `id` plus every descriptor column.
    pub fn get_index_values_by_id(
        &self,
        entity_name: &str,
        descriptor: &IndexDescriptor,
        id: Uuid,
    ) -> Result<Option<AttributeMap>> {
        let table = self.resolve_table_name(entity_name, descriptor)?;

        let mut projection = String::from(ID_KEY);
        let mut shape = vec![SqlType::Uuid];
        for column in descriptor {
            projection.push(',');
            projection.push_str(&column.sql_name());
            shape.push(SqlType::from(column.column_type));
        }
        let sql = format!(
            "SELECT {} FROM {} WHERE id={}",
            projection,
            table,
            self.dialect.placeholder(1)
        );
        debug!(target: "tabula::index", table = %table, id = %id, "get index values");

        let mut conn = self.store.acquire()?;
        let rows = conn.query(&sql, &[SqlValue::Uuid(id)], &shape)?;
        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };

        let mut values = row.into_iter();
        let mut out = AttributeMap::new();
        out.insert(ID_KEY.to_string(), to_value(values.next().unwrap_or(SqlValue::Null)));
        for (column, value) in descriptor.iter().zip(values) {
            out.insert(column.name.clone(), to_value(value));
        }
        Ok(Some(out))
    }

    fn insert_sql(&self, table: &str, descriptor: &IndexDescriptor) -> String {
        let mut columns = String::from(ID_KEY);
        let mut placeholders = self.dialect.placeholder(1);
        for (i, column) in descriptor.iter().enumerate() {
            columns.push(',');
            columns.push_str(&column.sql_name());
            placeholders.push(',');
            placeholders.push_str(&self.dialect.placeholder(i + 2));
        }
        format!("INSERT INTO {}({}) VALUES ({})", table, columns, placeholders)
    }
}

/// Parameters for one index row: `id`, then each column in descriptor order
fn project_row(descriptor: &IndexDescriptor, row: &AttributeMap) -> Result<Vec<SqlValue>> {
    let mut params = Vec::with_capacity(descriptor.len() + 1);

    match row.get(ID_KEY) {
        Some(Value::Uuid(id)) => params.push(SqlValue::Uuid(*id)),
        other => return Err(mismatch(ID_KEY, "Uuid", other)),
    }

    for column in descriptor {
        params.push(project_value(column, row.get(&column.name))?);
    }
    Ok(params)
}

fn project_value(column: &IndexColumn, value: Option<&Value>) -> Result<SqlValue> {
    match (column.column_type, value) {
        (ColumnType::Text, Some(Value::String(s))) => Ok(SqlValue::Text(s.clone())),
        (ColumnType::Bool, Some(Value::Bool(b))) => Ok(SqlValue::Bool(*b)),
        (ColumnType::TimestampNoTz, Some(Value::Timestamp(ts))) => Ok(SqlValue::Timestamp(*ts)),
        (ColumnType::Binary, Some(Value::Bytes(b))) => Ok(SqlValue::Bytes(b.clone())),
        (column_type, other) => Err(mismatch(&column.name, expected_for(column_type), other)),
    }
}

fn expected_for(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::Text => "String",
        ColumnType::Bool => "Bool",
        ColumnType::TimestampNoTz => "Timestamp",
        ColumnType::Binary => "Bytes",
    }
}

fn mismatch(column: &str, expected: &'static str, actual: Option<&Value>) -> Error {
    Error::IndexValueMismatch {
        column: column.to_string(),
        expected,
        actual: actual.map_or("missing", Value::type_name),
    }
}

fn to_value(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Text(s) => Value::String(s),
        SqlValue::Bool(b) => Value::Bool(b),
        SqlValue::Int(i) => Value::I64(i),
        SqlValue::Timestamp(ts) => Value::Timestamp(ts),
        SqlValue::Bytes(b) => Value::Bytes(b),
        SqlValue::Uuid(u) => Value::Uuid(u),
    }
}
