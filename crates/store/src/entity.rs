//! Stored entity row

use chrono::NaiveDateTime;
use uuid::Uuid;

/// Row of an entity table.
///
/// `ref_key` is the backend-generated surrogate key (`added_id`). It is `None`
/// until the record has been read back from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRecord {
    /// Surrogate key assigned by the backend
    pub ref_key: Option<i64>,
    /// Entity identity
    pub id: Uuid,
    /// Last modification time
    pub updated: NaiveDateTime,
    /// Encoded attribute map
    pub body: Vec<u8>,
}

impl EntityRecord {
    /// Record not yet written to the backend
    pub fn new(id: Uuid, updated: NaiveDateTime, body: Vec<u8>) -> Self {
        Self {
            ref_key: None,
            id,
            updated,
            body,
        }
    }
}
