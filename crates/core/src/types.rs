//! Schema types for index tables
//!
//! - ColumnType: backend-neutral column type
//! - IndexColumn: one (name, type) pair
//! - IndexDescriptor: ordered columns defining an index table's shape

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Column type not tied to any particular RDBMS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    /// Variable-length text
    Text,
    /// Timestamp without time zone
    TimestampNoTz,
    /// Boolean
    Bool,
    /// Binary blob
    Binary,
}

impl ColumnType {
    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::TimestampNoTz => "TIMESTAMP_NO_TZ",
            ColumnType::Bool => "BOOL",
            ColumnType::Binary => "BINARY",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TEXT" => Ok(ColumnType::Text),
            "TIMESTAMP_NO_TZ" | "TIMESTAMP_WITHOUT_TZ" => Ok(ColumnType::TimestampNoTz),
            "BOOL" => Ok(ColumnType::Bool),
            "BINARY" => Ok(ColumnType::Binary),
            _ => Err(Error::UnknownColumnType(s.to_string())),
        }
    }
}

/// Named, typed column of an index table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexColumn {
    /// Attribute name as it appears in the attribute map
    pub name: String,
    /// Column type
    pub column_type: ColumnType,
}

impl IndexColumn {
    /// Create a column
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    /// Name as rendered in SQL: trimmed and lower-cased
    pub fn sql_name(&self) -> String {
        self.name.trim().to_lowercase()
    }
}

/// Ordered columns of an index table
///
/// Order is significant: it drives both the derived table name and the
/// primary key column order. Emptiness is checked where the descriptor is
/// used, not at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexDescriptor {
    columns: Vec<IndexColumn>,
}

impl IndexDescriptor {
    /// Create a descriptor from columns in order
    pub fn new(columns: Vec<IndexColumn>) -> Self {
        Self { columns }
    }

    /// Build from `(name, type)` pairs
    ///
    /// ```
    /// use tabula_core::{ColumnType, IndexDescriptor};
    ///
    /// let d = IndexDescriptor::from_pairs([("name", ColumnType::Text)]);
    /// assert_eq!(d.len(), 1);
    /// ```
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, ColumnType)>,
        S: Into<String>,
    {
        Self {
            columns: pairs
                .into_iter()
                .map(|(name, ty)| IndexColumn::new(name, ty))
                .collect(),
        }
    }

    /// Columns in declared order
    pub fn columns(&self) -> &[IndexColumn] {
        &self.columns
    }

    /// Iterate columns in declared order
    pub fn iter(&self) -> std::slice::Iter<'_, IndexColumn> {
        self.columns.iter()
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when no columns are declared
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<'a> IntoIterator for &'a IndexDescriptor {
    type Item = &'a IndexColumn;
    type IntoIter = std::slice::Iter<'a, IndexColumn>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
