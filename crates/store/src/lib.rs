//! Entity and index storage for tabula
//!
//! - `EntityStore`: put/find of attribute maps, identity rules, body encoding
//! - `EntityRepository` / `SqlEntityRepository`: entity table access
//! - `IndexRepository`: secondary index tables

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entity;
pub mod entity_store;
pub mod index;
pub mod repository;

pub use entity::EntityRecord;
pub use entity_store::EntityStore;
pub use index::IndexRepository;
pub use repository::{EntityRepository, SqlEntityRepository};
