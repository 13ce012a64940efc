//! SQLite backing store
//!
//! A single `rusqlite::Connection` behind a `parking_lot::Mutex`. Acquiring a
//! connection takes the lock; dropping it releases the lock. UUIDs are bound
//! as hyphenated text, timestamps as `YYYY-MM-DD HH:MM:SS.ffffff` text and
//! booleans as integers.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use parking_lot::{Mutex, MutexGuard};
use rusqlite::types::{Value as SqliteValue, ValueRef};
use rusqlite::{params_from_iter, OptionalExtension};
use tabula_core::{Error, Result};
use tracing::{debug, info};
use uuid::Uuid;

use crate::backend::{BackingStore, Connection, SqlRow, SqlType, SqlValue};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Column of an existing table, as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumn {
    /// Column name
    pub name: String,
    /// Declared SQL type
    pub declared_type: String,
    /// Whether NULL is accepted
    pub nullable: bool,
    /// 1-based position in the table
    pub position: usize,
}

/// SQLite-backed store.
///
/// # Example
///
/// ```
/// use tabula_sql::SqliteStore;
///
/// let store = SqliteStore::open_in_memory().unwrap();
/// assert!(!store.table_exists("artists").unwrap());
/// ```
pub struct SqliteStore {
    conn: Mutex<rusqlite::Connection>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = rusqlite::Connection::open(path).map_err(storage_error)?;
        info!(target: "tabula::sqlite", path = %path.display(), "Opened SQLite store");
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory().map_err(storage_error)?;
        debug!(target: "tabula::sqlite", "Opened in-memory SQLite store");
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Database file, `None` when in memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether a table named `name` exists.
    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()
            .map_err(storage_error)?;
        Ok(found.is_some())
    }

    /// Columns of `table` in ordinal order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName` when the table does not exist.
    pub fn columns(&self, table: &str) -> Result<Vec<TableColumn>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(r#"SELECT cid, name, type, "notnull" FROM pragma_table_info(?1) ORDER BY cid"#)
            .map_err(storage_error)?;
        let columns = stmt
            .query_map([table], |row| {
                let cid: i64 = row.get(0)?;
                let not_null: i64 = row.get(3)?;
                Ok(TableColumn {
                    name: row.get(1)?,
                    declared_type: row.get(2)?,
                    nullable: not_null == 0,
                    position: cid as usize + 1,
                })
            })
            .map_err(storage_error)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(storage_error)?;

        if columns.is_empty() {
            return Err(Error::invalid_name(format!("Table not found: {}", table)));
        }
        Ok(columns)
    }
}

impl BackingStore for SqliteStore {
    fn acquire(&self) -> Result<Box<dyn Connection + '_>> {
        Ok(Box::new(SqliteConnection {
            guard: self.conn.lock(),
        }))
    }
}

/// Connection holding the store lock
struct SqliteConnection<'a> {
    guard: MutexGuard<'a, rusqlite::Connection>,
}

impl Connection for SqliteConnection<'_> {
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        debug!(target: "tabula::sqlite", sql, params = params.len(), "execute");
        let affected = self
            .guard
            .execute(sql, params_from_iter(params.iter().map(to_sqlite)))
            .map_err(storage_error)?;
        Ok(affected as u64)
    }

    fn execute_batch(&mut self, sql: &str, rows: &[Vec<SqlValue>]) -> Result<u64> {
        debug!(target: "tabula::sqlite", sql, rows = rows.len(), "execute batch");
        let tx = self.guard.transaction().map_err(storage_error)?;
        let mut affected = 0u64;
        {
            let mut stmt = tx.prepare(sql).map_err(storage_error)?;
            for row in rows {
                affected += stmt
                    .execute(params_from_iter(row.iter().map(to_sqlite)))
                    .map_err(storage_error)? as u64;
            }
        }
        tx.commit().map_err(storage_error)?;
        Ok(affected)
    }

    fn insert_returning_key(&mut self, sql: &str, params: &[SqlValue]) -> Result<Option<i64>> {
        debug!(target: "tabula::sqlite", sql, params = params.len(), "insert");
        let affected = self
            .guard
            .execute(sql, params_from_iter(params.iter().map(to_sqlite)))
            .map_err(storage_error)?;
        if affected == 0 {
            return Ok(None);
        }
        Ok(Some(self.guard.last_insert_rowid()))
    }

    fn query(&mut self, sql: &str, params: &[SqlValue], shape: &[SqlType]) -> Result<Vec<SqlRow>> {
        debug!(target: "tabula::sqlite", sql, params = params.len(), "query");
        let mut stmt = self.guard.prepare(sql).map_err(storage_error)?;
        let mut rows = stmt
            .query(params_from_iter(params.iter().map(to_sqlite)))
            .map_err(storage_error)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(storage_error)? {
            let mut values = Vec::with_capacity(shape.len());
            for (i, sql_type) in shape.iter().enumerate() {
                let raw = row.get_ref(i).map_err(storage_error)?;
                values.push(from_sqlite(raw, *sql_type, i)?);
            }
            out.push(values);
        }
        Ok(out)
    }
}

fn storage_error(e: rusqlite::Error) -> Error {
    Error::storage(e.to_string())
}

fn to_sqlite(value: &SqlValue) -> SqliteValue {
    match value {
        SqlValue::Null => SqliteValue::Null,
        SqlValue::Text(s) => SqliteValue::Text(s.clone()),
        SqlValue::Bool(b) => SqliteValue::Integer(i64::from(*b)),
        SqlValue::Int(i) => SqliteValue::Integer(*i),
        SqlValue::Timestamp(ts) => SqliteValue::Text(ts.format(TIMESTAMP_FORMAT).to_string()),
        SqlValue::Bytes(b) => SqliteValue::Blob(b.clone()),
        SqlValue::Uuid(u) => SqliteValue::Text(u.hyphenated().to_string()),
    }
}

fn from_sqlite(raw: ValueRef<'_>, sql_type: SqlType, index: usize) -> Result<SqlValue> {
    let mismatch = || {
        Error::storage(format!(
            "Column {} holds {} where {:?} was expected",
            index,
            raw.data_type(),
            sql_type
        ))
    };

    if let ValueRef::Null = raw {
        return Ok(SqlValue::Null);
    }

    match (sql_type, raw) {
        (SqlType::Text, ValueRef::Text(bytes)) => Ok(SqlValue::Text(utf8(bytes)?.to_owned())),
        (SqlType::Bool, ValueRef::Integer(i)) => Ok(SqlValue::Bool(i != 0)),
        (SqlType::Int, ValueRef::Integer(i)) => Ok(SqlValue::Int(i)),
        (SqlType::Timestamp, ValueRef::Text(bytes)) => {
            let text = utf8(bytes)?;
            NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
                .map(SqlValue::Timestamp)
                .map_err(|e| Error::storage(format!("Invalid timestamp '{}': {}", text, e)))
        }
        (SqlType::Bytes, ValueRef::Blob(bytes)) => Ok(SqlValue::Bytes(bytes.to_vec())),
        (SqlType::Uuid, ValueRef::Text(bytes)) => {
            let text = utf8(bytes)?;
            Uuid::parse_str(text)
                .map(SqlValue::Uuid)
                .map_err(|e| Error::storage(format!("Invalid uuid '{}': {}", text, e)))
        }
        (SqlType::Uuid, ValueRef::Blob(bytes)) => Uuid::from_slice(bytes)
            .map(SqlValue::Uuid)
            .map_err(|e| Error::storage(format!("Invalid uuid bytes: {}", e))),
        _ => Err(mismatch()),
    }
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| Error::storage(format!("Invalid UTF-8 text: {}", e)))
}
