//! Core types for tabula
//!
//! This crate defines the types shared by every layer:
//! - Value / AttributeMap: the schema-flexible document model
//! - ColumnType / IndexColumn / IndexDescriptor: index table shapes
//! - Error: the error taxonomy
//! - TabulaConfig: `tabula.toml` configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod types;
pub mod value;

pub use config::{TabulaConfig, CONFIG_FILE_NAME, DEFAULT_MAX_TRUNCATION_ATTEMPTS};
pub use error::{Error, IdentityViolation, Result};
pub use types::{ColumnType, IndexColumn, IndexDescriptor};
pub use value::{AttributeMap, Value};

/// Attribute key holding the entity UUID
pub const ID_KEY: &str = "id";

/// Attribute key holding the last-modified timestamp
pub const UPDATED_KEY: &str = "updated";

/// Keys never written into an entity body
pub const RESERVED_KEYS: [&str; 2] = [ID_KEY, UPDATED_KEY];
