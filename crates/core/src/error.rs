//! Error types for tabula
//!
//! One error enum covers the whole stack. Variants fall into five groups:
//! - validation (caller-fixable, raised before any I/O)
//! - encoding (unsupported attribute values)
//! - decoding (corrupt attribute streams)
//! - storage (backing store failures, never retried)
//! - configuration (unknown dialects, codecs, column types)
//!
//! Absence of a row is not an error; lookups return `Ok(None)`.

use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for tabula operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ways an attribute map can violate the identity invariant
///
/// A map carries both `id` and `updated` or neither. When both are
/// present, `id` must be a UUID and `updated` a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityViolation {
    /// `id` present, `updated` missing
    IdWithoutUpdated,
    /// `updated` present, `id` missing
    UpdatedWithoutId,
    /// both present, `id` is null
    IdNull,
    /// both present, `id` is not a UUID
    IdNotUuid,
    /// both present, `updated` is null
    UpdatedNull,
    /// both present, `updated` is not a timestamp
    UpdatedNotTimestamp,
}

impl fmt::Display for IdentityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            IdentityViolation::IdWithoutUpdated => "id field present without updated",
            IdentityViolation::UpdatedWithoutId => "updated field present without id",
            IdentityViolation::IdNull => "updated field present with id empty",
            IdentityViolation::IdNotUuid => "id field is not UUID",
            IdentityViolation::UpdatedNull => "id field present with updated empty",
            IdentityViolation::UpdatedNotTimestamp => "updated field is not a timestamp",
        };
        f.write_str(msg)
    }
}

/// Error types for tabula
#[derive(Debug, Error)]
pub enum Error {
    /// Attribute map breaks the id/updated invariant
    #[error("Inconsistent entity - {0}")]
    InconsistentEntity(IdentityViolation),

    /// Blank entity name, blank column name, empty descriptor, missing table
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Index insert called without rows
    #[error("Can not insert empty entities arguments into index")]
    EmptyIndexRows,

    /// A projected index value does not match the column type
    #[error("Index column '{column}' expects {expected}, got {actual}")]
    IndexValueMismatch {
        /// Column name from the descriptor
        column: String,
        /// Expected value type
        expected: &'static str,
        /// Type actually found in the row
        actual: &'static str,
    },

    /// Truncation could not bring an index table name under the limit
    #[error("Unable to build index table name from '{name}': limit {limit} not reached after {attempts} truncation attempts")]
    IndexNameTooLong {
        /// Last rendered candidate name
        name: String,
        /// Backend identifier length limit
        limit: usize,
        /// Truncation attempts made
        attempts: usize,
    },

    /// Update addressed an id with no stored row
    #[error("Entity not found: {0}")]
    EntityNotFound(Uuid),

    /// Attribute value cannot be carried by the codec
    #[error("Type: {type_name} is not supported to transport (key '{key}')")]
    UnsupportedType {
        /// Offending key
        key: String,
        /// Runtime type of the value
        type_name: &'static str,
    },

    /// A value token appeared where a key was expected
    #[error("{type_name} pair value found but no preceding String key name found")]
    ValueWithoutKey {
        /// Type of the orphaned value
        type_name: &'static str,
    },

    /// The stream ended with a key still waiting for its value
    #[error("Inconsistent byte array structure, key '{key}' present without value")]
    KeyWithoutValue {
        /// Dangling key
        key: String,
    },

    /// Bytes are not a valid attribute stream
    #[error("Malformed attribute stream: {0}")]
    Malformed(String),

    /// Backing store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Insert completed without reporting a surrogate key
    #[error("No generated key info")]
    NoGeneratedKey,

    /// Column type name not recognised
    #[error("Unsupported ColumnType: {0}")]
    UnknownColumnType(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Backing store failure
    pub fn storage(msg: impl Into<String>) -> Self {
        Error::Storage(msg.into())
    }

    /// Invalid entity, table or column name
    pub fn invalid_name(msg: impl Into<String>) -> Self {
        Error::InvalidName(msg.into())
    }

    /// Invalid configuration
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Corrupt attribute stream
    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::Malformed(msg.into())
    }

    /// True for caller-fixable errors raised before any I/O
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InconsistentEntity(_)
                | Error::InvalidName(_)
                | Error::EmptyIndexRows
                | Error::IndexValueMismatch { .. }
                | Error::IndexNameTooLong { .. }
                | Error::EntityNotFound(_)
        )
    }

    /// True for errors that indicate a corrupt stored body
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::ValueWithoutKey { .. } | Error::KeyWithoutValue { .. } | Error::Malformed(_)
        )
    }
}

impl From<IdentityViolation> for Error {
    fn from(v: IdentityViolation) -> Self {
        Error::InconsistentEntity(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_inconsistent_entity() {
        let err = Error::InconsistentEntity(IdentityViolation::IdWithoutUpdated);
        assert_eq!(
            err.to_string(),
            "Inconsistent entity - id field present without updated"
        );
    }

    #[test]
    fn test_identity_violations_have_distinct_messages() {
        let all = [
            IdentityViolation::IdWithoutUpdated,
            IdentityViolation::UpdatedWithoutId,
            IdentityViolation::IdNull,
            IdentityViolation::IdNotUuid,
            IdentityViolation::UpdatedNull,
            IdentityViolation::UpdatedNotTimestamp,
        ];
        let mut messages: Vec<String> = all.iter().map(|v| v.to_string()).collect();
        messages.sort();
        messages.dedup();
        assert_eq!(messages.len(), 6);
    }

    #[test]
    fn test_error_display_unsupported_type() {
        let err = Error::UnsupportedType {
            key: "avatar".to_string(),
            type_name: "Bytes",
        };
        let msg = err.to_string();
        assert!(msg.contains("Bytes"));
        assert!(msg.contains("avatar"));
    }

    #[test]
    fn test_error_display_structural() {
        let err = Error::KeyWithoutValue {
            key: "age".to_string(),
        };
        assert!(err.to_string().contains("key 'age' present without value"));

        let err = Error::ValueWithoutKey { type_name: "Integer" };
        assert!(err.to_string().contains("no preceding String key"));
    }

    #[test]
    fn test_error_display_storage() {
        let err = Error::storage("write failed");
        let msg = err.to_string();
        assert!(msg.contains("Storage error"));
        assert!(msg.contains("write failed"));
    }

    #[test]
    fn test_error_display_index_name_too_long() {
        let err = Error::IndexNameTooLong {
            name: "index_x_on_y".to_string(),
            limit: 5,
            attempts: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("index_x_on_y"));
        assert!(msg.contains('5'));
    }

    #[test]
    fn test_classification() {
        assert!(Error::EmptyIndexRows.is_validation());
        assert!(Error::from(IdentityViolation::IdNull).is_validation());
        assert!(!Error::storage("x").is_validation());
        assert!(Error::malformed("x").is_corruption());
        assert!(!Error::NoGeneratedKey.is_corruption());
    }

    #[test]
    fn test_error_pattern_matching() {
        let err: Error = IdentityViolation::UpdatedNotTimestamp.into();
        match err {
            Error::InconsistentEntity(v) => assert_eq!(v, IdentityViolation::UpdatedNotTimestamp),
            _ => panic!("Wrong error variant"),
        }
    }
}
