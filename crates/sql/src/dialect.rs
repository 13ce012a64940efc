//! SQL dialects
//!
//! A dialect maps backend-neutral column types to SQL type names and renders
//! the DDL for entity and index tables. Backends supply a handful of hooks;
//! the statement builders are shared.
//!
//! Column names are rendered lower-cased. Table names are used as given, so
//! callers pass names from `naming`.

use tabula_core::{ColumnType, Error, IndexColumn, IndexDescriptor, Result};
use tracing::debug;

/// Backend-specific SQL rendering.
///
/// # Thread Safety
///
/// Dialects are stateless and shared between repositories.
pub trait Dialect: Send + Sync {
    /// Dialect name as used in configuration
    fn name(&self) -> &'static str;

    /// Longest identifier the backend accepts, in bytes of UTF-8
    fn max_identifier_length(&self) -> usize;

    /// SQL type for a column type
    fn column_type(&self, column_type: ColumnType) -> &'static str;

    /// SQL type of the `id` column
    fn uuid_type(&self) -> &'static str;

    /// Full column definition of the `added_id` surrogate key
    fn surrogate_key_ddl(&self) -> &'static str;

    /// Bind placeholder for the 1-based parameter `index`
    fn placeholder(&self, index: usize) -> String;

    /// `lowercase(name) TYPE[ NOT NULL]`
    fn column_ddl(&self, column: &IndexColumn, nullable: bool) -> String {
        let mut ddl = format!(
            "{} {}",
            column.sql_name(),
            self.column_type(column.column_type)
        );
        if !nullable {
            ddl.push_str(" NOT NULL");
        }
        ddl
    }

    /// DDL of an index table: every descriptor column not null, then the
    /// entity id, with a composite primary key over all of them.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName` for an empty descriptor.
    fn index_table_ddl(&self, table_name: &str, descriptor: &IndexDescriptor) -> Result<String> {
        if descriptor.is_empty() {
            return Err(Error::invalid_name(format!(
                "Index table '{}' needs at least one column",
                table_name
            )));
        }

        let mut sql = format!("CREATE TABLE {}(", table_name);
        let mut primary_key = String::new();
        for column in descriptor {
            sql.push_str(&self.column_ddl(column, false));
            sql.push(',');
            primary_key.push_str(&column.sql_name());
            primary_key.push(',');
        }
        sql.push_str(&format!("id {} NOT NULL UNIQUE,", self.uuid_type()));
        sql.push_str(&format!("PRIMARY KEY({}id))", primary_key));

        debug!(target: "tabula::index", dialect = self.name(), ddl = %sql, "Index ddl");
        Ok(sql)
    }

    /// DDL of an entity table
    fn entity_table_ddl(&self, table_name: &str) -> String {
        format!(
            "CREATE TABLE {}({},id {} NOT NULL UNIQUE,updated {} NOT NULL,body {})",
            table_name,
            self.surrogate_key_ddl(),
            self.uuid_type(),
            self.column_type(ColumnType::TimestampNoTz),
            self.column_type(ColumnType::Binary),
        )
    }

    /// `DROP TABLE` statement
    fn drop_table_ddl(&self, table_name: &str) -> String {
        format!("DROP TABLE {}", table_name)
    }
}

/// PostgreSQL dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn max_identifier_length(&self) -> usize {
        63
    }

    fn column_type(&self, column_type: ColumnType) -> &'static str {
        match column_type {
            ColumnType::Text => "TEXT",
            ColumnType::TimestampNoTz => "TIMESTAMP WITHOUT TIME ZONE",
            ColumnType::Bool => "BOOLEAN",
            ColumnType::Binary => "BYTEA",
        }
    }

    fn uuid_type(&self) -> &'static str {
        "UUID"
    }

    fn surrogate_key_ddl(&self) -> &'static str {
        "added_id SERIAL NOT NULL PRIMARY KEY"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }
}

/// SQLite dialect.
///
/// UUIDs are stored as hyphenated text and timestamps as ISO-8601 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn max_identifier_length(&self) -> usize {
        63
    }

    fn column_type(&self, column_type: ColumnType) -> &'static str {
        match column_type {
            ColumnType::Text => "TEXT",
            ColumnType::TimestampNoTz => "TIMESTAMP",
            ColumnType::Bool => "BOOLEAN",
            ColumnType::Binary => "BLOB",
        }
    }

    fn uuid_type(&self) -> &'static str {
        "TEXT"
    }

    fn surrogate_key_ddl(&self) -> &'static str {
        "added_id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("?{}", index)
    }
}

/// Look up a dialect by configuration name.
///
/// # Known Dialects
///
/// - `"postgresql"` (alias `"postgres"`)
/// - `"sqlite"`
pub fn dialect_for_name(name: &str) -> Result<Box<dyn Dialect>> {
    match name.trim().to_ascii_lowercase().as_str() {
        "postgresql" | "postgres" => Ok(Box::new(PostgresDialect)),
        "sqlite" => Ok(Box::new(SqliteDialect)),
        _ => Err(Error::config(format!("Unknown SQL dialect: {}", name))),
    }
}
