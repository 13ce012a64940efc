//! EntityStore: put and find schema-flexible entities
//!
//! ## Identity
//!
//! An attribute map carries both `id` and `updated`, or neither:
//!
//! - neither: `put` inserts a new entity with a fresh v4 UUID
//! - both: `put` overwrites the stored entity with that `id`
//!
//! Anything else is rejected before any I/O. The two identity keys live in
//! their own columns and are never part of the encoded body.
//!
//! ## Timestamps
//!
//! `updated` is set by the store on every write, in UTC with microsecond
//! precision so it survives a round trip through the backend unchanged.

use std::sync::Arc;

use chrono::{NaiveDateTime, SubsecRound, Utc};
use tabula_codec::AttributeCodec;
use tabula_core::{AttributeMap, Error, IdentityViolation, Result, Value, ID_KEY, RESERVED_KEYS, UPDATED_KEY};
use tracing::debug;
use uuid::Uuid;

use crate::entity::EntityRecord;
use crate::repository::EntityRepository;

/// Identity carried by an attribute map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Identity {
    New,
    Existing { id: Uuid, updated: NaiveDateTime },
}

/// Check the id/updated invariant.
fn identity_of(attributes: &AttributeMap) -> Result<Identity> {
    let id = attributes.get(ID_KEY);
    let updated = attributes.get(UPDATED_KEY);

    match (id, updated) {
        (None, None) => Ok(Identity::New),
        (Some(_), None) => Err(IdentityViolation::IdWithoutUpdated.into()),
        (None, Some(_)) => Err(IdentityViolation::UpdatedWithoutId.into()),
        (Some(id), Some(updated)) => {
            let id = match id {
                Value::Null => return Err(IdentityViolation::IdNull.into()),
                Value::Uuid(id) => *id,
                _ => return Err(IdentityViolation::IdNotUuid.into()),
            };
            let updated = match updated {
                Value::Null => return Err(IdentityViolation::UpdatedNull.into()),
                Value::Timestamp(ts) => *ts,
                _ => return Err(IdentityViolation::UpdatedNotTimestamp.into()),
            };
            Ok(Identity::Existing { id, updated })
        }
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(6)
}

/// Entity store over an `EntityRepository` and an `AttributeCodec`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tabula_codec::MessagePackCodec;
/// use tabula_core::{AttributeMap, Value};
/// use tabula_sql::{SqliteDialect, SqliteStore};
/// use tabula_store::{EntityStore, SqlEntityRepository};
///
/// let store = Arc::new(SqliteStore::open_in_memory().unwrap());
/// let repo = SqlEntityRepository::new(store, Arc::new(SqliteDialect));
/// repo.create_entity_table("people").unwrap();
///
/// let entities = EntityStore::new(Arc::new(repo), Arc::new(MessagePackCodec));
/// let mut john = AttributeMap::new();
/// john.insert("name".to_string(), Value::from("John"));
///
/// let saved = entities.put("people", john).unwrap();
/// let id = saved["id"].as_uuid().unwrap();
/// let found = entities.find("people", id).unwrap().unwrap();
/// assert_eq!(found["name"], Value::from("John"));
/// ```
#[derive(Clone)]
pub struct EntityStore {
    repository: Arc<dyn EntityRepository>,
    codec: Arc<dyn AttributeCodec>,
}

impl EntityStore {
    /// Create a store
    pub fn new(repository: Arc<dyn EntityRepository>, codec: Arc<dyn AttributeCodec>) -> Self {
        Self { repository, codec }
    }

    /// Insert or update an entity.
    ///
    /// Returns the caller's attributes with `id` and a refreshed `updated`.
    ///
    /// # Errors
    ///
    /// - `InconsistentEntity` when the identity keys are inconsistent
    /// - `UnsupportedType` when an attribute cannot be encoded
    /// - `EntityNotFound` when updating an id that is not stored
    pub fn put(&self, entity_name: &str, mut attributes: AttributeMap) -> Result<AttributeMap> {
        let identity = identity_of(&attributes)?;
        let body = self.codec.encode(&attributes, &RESERVED_KEYS)?;

        let record = match identity {
            Identity::New => {
                let record = EntityRecord::new(Uuid::new_v4(), now(), body);
                self.repository.insert_entity(entity_name, &record)?;
                record
            }
            Identity::Existing { id, updated } => {
                let record = EntityRecord::new(id, now(), body);
                debug!(target: "tabula::entity", %id, previous = %updated, "Updating entity");
                if self.repository.update_entity(entity_name, &record)? == 0 {
                    return Err(Error::EntityNotFound(id));
                }
                record
            }
        };

        debug!(target: "tabula::entity", entity = entity_name, id = %record.id, "put");
        attributes.insert(ID_KEY.to_string(), Value::Uuid(record.id));
        attributes.insert(UPDATED_KEY.to_string(), Value::Timestamp(record.updated));
        Ok(attributes)
    }

    /// Fetch an entity by id. `Ok(None)` when it does not exist.
    ///
    /// Integer attributes come back in the narrowest width that holds them.
    pub fn find(&self, entity_name: &str, id: Uuid) -> Result<Option<AttributeMap>> {
        let Some(record) = self.repository.get_by_id(entity_name, id)? else {
            return Ok(None);
        };

        let mut attributes = self.codec.decode(&record.body)?;
        attributes.insert(ID_KEY.to_string(), Value::Uuid(record.id));
        attributes.insert(UPDATED_KEY.to_string(), Value::Timestamp(record.updated));
        Ok(Some(attributes))
    }
}
