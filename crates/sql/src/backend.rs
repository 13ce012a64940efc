//! Backing store abstraction
//!
//! Repositories talk to a relational backend through two traits:
//!
//! - `BackingStore` hands out one scoped `Connection` per operation
//! - `Connection` runs statements with typed parameters and returns typed rows
//!
//! The connection is released when it is dropped, on every exit path. There
//! is no pooling and no retry at this layer.

use chrono::NaiveDateTime;
use tabula_core::{ColumnType, Result};
use uuid::Uuid;

/// Bound parameter or fetched column value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL NULL
    Null,
    /// Text
    Text(String),
    /// Boolean
    Bool(bool),
    /// 64-bit integer
    Int(i64),
    /// Timestamp without time zone
    Timestamp(NaiveDateTime),
    /// Binary blob
    Bytes(Vec<u8>),
    /// UUID
    Uuid(Uuid),
}

impl SqlValue {
    /// Type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "Null",
            SqlValue::Text(_) => "Text",
            SqlValue::Bool(_) => "Bool",
            SqlValue::Int(_) => "Int",
            SqlValue::Timestamp(_) => "Timestamp",
            SqlValue::Bytes(_) => "Bytes",
            SqlValue::Uuid(_) => "Uuid",
        }
    }
}

/// Expected shape of a fetched column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    /// Text
    Text,
    /// Boolean
    Bool,
    /// 64-bit integer
    Int,
    /// Timestamp without time zone
    Timestamp,
    /// Binary blob
    Bytes,
    /// UUID
    Uuid,
}

impl From<ColumnType> for SqlType {
    fn from(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Text => SqlType::Text,
            ColumnType::TimestampNoTz => SqlType::Timestamp,
            ColumnType::Bool => SqlType::Bool,
            ColumnType::Binary => SqlType::Bytes,
        }
    }
}

/// One row of a query result, in projection order
pub type SqlRow = Vec<SqlValue>;

/// A scoped connection to the backing store.
pub trait Connection {
    /// Run a statement, returning the number of affected rows.
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64>;

    /// Run one statement once per parameter row as a single unit of work.
    ///
    /// Returns the total number of affected rows.
    fn execute_batch(&mut self, sql: &str, rows: &[Vec<SqlValue>]) -> Result<u64>;

    /// Run an insert and return the generated surrogate key, if any.
    fn insert_returning_key(&mut self, sql: &str, params: &[SqlValue]) -> Result<Option<i64>>;

    /// Run a query, decoding each column according to `shape`.
    fn query(&mut self, sql: &str, params: &[SqlValue], shape: &[SqlType]) -> Result<Vec<SqlRow>>;
}

/// Source of scoped connections.
///
/// # Thread Safety
///
/// Stores are shared between repositories behind an `Arc`.
pub trait BackingStore: Send + Sync {
    /// Acquire a connection for the duration of one operation.
    fn acquire(&self) -> Result<Box<dyn Connection + '_>>;
}
