//! SQL layer for tabula
//!
//! - `dialect`: DDL rendering per backend (PostgreSQL, SQLite)
//! - `naming`: entity and index table names within identifier limits
//! - `backend`: the `BackingStore` / `Connection` seam used by repositories
//! - `sqlite`: a `BackingStore` over SQLite (feature `sqlite`, on by default)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod dialect;
pub mod naming;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use backend::{BackingStore, Connection, SqlRow, SqlType, SqlValue};
pub use dialect::{dialect_for_name, Dialect, PostgresDialect, SqliteDialect};
pub use naming::{entity_table_name, IndexTableNameResolver};
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteStore, TableColumn};
