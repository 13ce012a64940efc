//! Shared test utilities for all integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from any test's main.rs.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use chrono::{NaiveDate, NaiveDateTime};
pub use tabula::{
    AttributeMap, ColumnType, Error, IndexDescriptor, SqliteStore, Tabula, TabulaConfig, Value,
    ID_KEY, UPDATED_KEY,
};
use tempfile::TempDir;

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output through the test harness. Set `RUST_LOG` to see it.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// TestDb - Tabula over a file-backed SQLite store
// ============================================================================

/// Tabula instance with direct access to its SQLite store for introspection.
pub struct TestDb {
    pub db: Tabula,
    pub store: Arc<SqliteStore>,
    pub dir: TempDir,
}

impl TestDb {
    /// Fresh database in a temporary directory.
    pub fn new() -> Self {
        init_tracing();
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = Arc::new(
            SqliteStore::open(dir.path().join("tabula.db")).expect("Failed to open SQLite store"),
        );
        let db = Tabula::new(store.clone(), &TabulaConfig::for_dialect("sqlite"))
            .expect("Failed to create test database");
        TestDb { db, store, dir }
    }

    /// Fresh database with the `entity_name` table already created.
    pub fn with_entity_table(entity_name: &str) -> Self {
        let test_db = Self::new();
        test_db
            .db
            .create_entity_table(entity_name)
            .expect("Failed to create entity table");
        test_db
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Build an attribute map from pairs.
pub fn attrs(pairs: &[(&str, Value)]) -> AttributeMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Descriptor over (name TEXT, born TIMESTAMP, married BOOL, picture BINARY)
pub fn artist_descriptor() -> IndexDescriptor {
    IndexDescriptor::from_pairs([
        ("name", ColumnType::Text),
        ("born", ColumnType::TimestampNoTz),
        ("married", ColumnType::Bool),
        ("picture", ColumnType::Binary),
    ])
}

/// Fixed timestamp at microsecond precision
pub fn timestamp(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .expect("valid date")
        .and_hms_micro_opt(8, 30, 0, 125_000)
        .expect("valid time")
}
