//! Tabula - schema-flexible documents over relational tables
//!
//! Entities are attribute maps stored as one row each: an identity (`id`,
//! `updated`) in dedicated columns and every other attribute encoded into a
//! binary body. Selected attributes can be copied into typed index tables
//! whose names and DDL are derived per SQL dialect.
//!
//! # Quick Start
//!
//! ```
//! use tabula::{Tabula, Value, AttributeMap};
//!
//! let db = Tabula::open_sqlite_in_memory().unwrap();
//! db.create_entity_table("people").unwrap();
//!
//! let mut john = AttributeMap::new();
//! john.insert("name".to_string(), Value::from("John"));
//! john.insert("age".to_string(), Value::I32(31));
//!
//! let saved = db.entities().put("people", john).unwrap();
//! let id = saved["id"].as_uuid().unwrap();
//!
//! let found = db.entities().find("people", id).unwrap().unwrap();
//! assert_eq!(found["age"], Value::I8(31));
//! ```
//!
//! # Architecture
//!
//! - `tabula-core`: values, schema types, errors, configuration
//! - `tabula-codec`: attribute map wire format
//! - `tabula-sql`: dialects, table naming, backing stores
//! - `tabula-store`: entity store and repositories

use std::sync::Arc;

pub use tabula_codec::{get_codec, AttributeCodec, CodecError, MessagePackCodec};
pub use tabula_core::{
    AttributeMap, ColumnType, Error, IdentityViolation, IndexColumn, IndexDescriptor, Result,
    TabulaConfig, Value, CONFIG_FILE_NAME, ID_KEY, UPDATED_KEY,
};
pub use tabula_sql::{
    dialect_for_name, entity_table_name, BackingStore, Connection, Dialect, IndexTableNameResolver,
    PostgresDialect, SqlType, SqlValue, SqliteDialect,
};
#[cfg(feature = "sqlite")]
pub use tabula_sql::{SqliteStore, TableColumn};
pub use tabula_store::{
    EntityRecord, EntityRepository, EntityStore, IndexRepository, SqlEntityRepository,
};

use tracing::info;

/// Entity store, entity repository and index repository wired over one
/// backing store.
///
/// Everything is built from the `TabulaConfig` passed in; nothing is looked
/// up globally.
pub struct Tabula {
    config: TabulaConfig,
    dialect: Arc<dyn Dialect>,
    repository: Arc<SqlEntityRepository>,
    entities: EntityStore,
    indexes: IndexRepository,
}

impl Tabula {
    /// Wire the components for `store` according to `config`.
    ///
    /// # Errors
    ///
    /// Returns `Config` for an invalid config, unknown dialect or unknown codec.
    pub fn new(store: Arc<dyn BackingStore>, config: &TabulaConfig) -> Result<Self> {
        config.validate()?;
        let dialect: Arc<dyn Dialect> = Arc::from(dialect_for_name(&config.dialect)?);
        let codec: Arc<dyn AttributeCodec> = Arc::from(get_codec(&config.codec)?);

        let repository = Arc::new(SqlEntityRepository::new(store.clone(), dialect.clone()));
        let entities = EntityStore::new(repository.clone(), codec);
        let resolver = IndexTableNameResolver::for_dialect(dialect.as_ref())
            .with_max_truncation_attempts(config.max_truncation_attempts);
        let indexes = IndexRepository::with_resolver(store, dialect.clone(), resolver);

        info!(
            target: "tabula::entity",
            dialect = dialect.name(),
            codec = %config.codec,
            "Tabula initialized"
        );
        Ok(Self {
            config: config.clone(),
            dialect,
            repository,
            entities,
            indexes,
        })
    }

    /// Open an SQLite database in `dir`.
    ///
    /// Reads `tabula.toml` from `dir`, writing an SQLite config there first
    /// if none exists. The database file is `tabula.db`.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the stored config names another dialect.
    #[cfg(feature = "sqlite")]
    pub fn open_sqlite<P: AsRef<std::path::Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| {
            Error::storage(format!("Failed to create '{}': {}", dir.display(), e))
        })?;

        let config_path = dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            TabulaConfig::for_dialect("sqlite").write_to_file(&config_path)?;
        }
        let config = TabulaConfig::from_file(&config_path)?;
        if dialect_for_name(&config.dialect)?.name() != SqliteDialect.name() {
            return Err(Error::config(format!(
                "'{}' configures dialect '{}', expected sqlite",
                config_path.display(),
                config.dialect
            )));
        }

        let store = Arc::new(SqliteStore::open(dir.join("tabula.db"))?);
        Self::new(store, &config)
    }

    /// In-memory SQLite database with default settings
    #[cfg(feature = "sqlite")]
    pub fn open_sqlite_in_memory() -> Result<Self> {
        let store = Arc::new(SqliteStore::open_in_memory()?);
        Self::new(store, &TabulaConfig::for_dialect("sqlite"))
    }

    /// Configuration in effect
    pub fn config(&self) -> &TabulaConfig {
        &self.config
    }

    /// Dialect in use
    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }

    /// Entity store
    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    /// Entity repository
    pub fn repository(&self) -> &SqlEntityRepository {
        &self.repository
    }

    /// Index repository
    pub fn indexes(&self) -> &IndexRepository {
        &self.indexes
    }

    /// Create the entity table for `entity_name`. Returns the table name.
    pub fn create_entity_table(&self, entity_name: &str) -> Result<String> {
        self.repository.create_entity_table(entity_name)
    }
}
