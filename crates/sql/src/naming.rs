//! Table name derivation
//!
//! Entity tables are named after the entity. Index tables combine the entity
//! name with every indexed column, in descriptor order:
//!
//! ```text
//! index_<entity>_on_<col1>_and_<col2>_and_<colN>
//! ```
//!
//! When the rendered name exceeds the dialect's identifier limit, every
//! column segment is shortened by the same number of characters from its
//! tail, one character at a time, until the name fits. The limit is measured
//! in UTF-8 bytes, as PostgreSQL's `NAMEDATALEN` is. The entity part is
//! never shortened. The number of retries is bounded; a name that still does
//! not fit is an error rather than a silent collision risk.

use tabula_core::{Error, IndexDescriptor, Result, DEFAULT_MAX_TRUNCATION_ATTEMPTS};

use crate::dialect::Dialect;

const INDEX_PREFIX: &str = "index_";
const FIRST_COLUMN_SEPARATOR: &str = "_on_";
const NEXT_COLUMN_SEPARATOR: &str = "_and_";

/// Entity table name: the trimmed, lower-cased entity name.
///
/// # Errors
///
/// Returns `InvalidName` for a blank entity name.
pub fn entity_table_name(entity_name: &str) -> Result<String> {
    let trimmed = entity_name.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_name(
            "Can not resolve table name, entityName should not be empty",
        ));
    }
    Ok(trimmed.to_lowercase())
}

/// Derives index table names within an identifier length limit.
///
/// Resolution is a pure function of the entity name, the descriptor and the
/// two bounds.
///
/// ```
/// use tabula_core::{ColumnType, IndexDescriptor};
/// use tabula_sql::IndexTableNameResolver;
///
/// let resolver = IndexTableNameResolver::new(63);
/// let descriptor = IndexDescriptor::from_pairs([("name", ColumnType::Text)]);
/// assert_eq!(
///     resolver.resolve("VeryFamousArtists", &descriptor).unwrap(),
///     "index_veryfamousartists_on_name"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexTableNameResolver {
    max_identifier_length: usize,
    max_truncation_attempts: usize,
}

impl IndexTableNameResolver {
    /// Resolver with the default truncation bound
    pub fn new(max_identifier_length: usize) -> Self {
        Self {
            max_identifier_length,
            max_truncation_attempts: DEFAULT_MAX_TRUNCATION_ATTEMPTS,
        }
    }

    /// Resolver using the dialect's identifier limit
    pub fn for_dialect(dialect: &dyn Dialect) -> Self {
        Self::new(dialect.max_identifier_length())
    }

    /// Override the truncation bound
    pub fn with_max_truncation_attempts(mut self, attempts: usize) -> Self {
        self.max_truncation_attempts = attempts;
        self
    }

    /// Identifier length limit, in bytes
    pub fn max_identifier_length(&self) -> usize {
        self.max_identifier_length
    }

    /// Truncation retry bound
    pub fn max_truncation_attempts(&self) -> usize {
        self.max_truncation_attempts
    }

    /// Resolve the index table name for `entity_name` and `descriptor`.
    ///
    /// # Errors
    ///
    /// - `InvalidName` if the entity name is blank, the descriptor is empty,
    ///   or a column name is blank.
    /// - `IndexNameTooLong` if the name still exceeds the limit once the
    ///   retry bound is spent or every column segment is already empty.
    pub fn resolve(&self, entity_name: &str, descriptor: &IndexDescriptor) -> Result<String> {
        let entity = entity_name.trim();
        if entity.is_empty() {
            return Err(Error::invalid_name("entityName should not be empty"));
        }
        if descriptor.is_empty() {
            return Err(Error::invalid_name(
                "Can not generate index table name without columns",
            ));
        }

        let mut segments = Vec::with_capacity(descriptor.len());
        for column in descriptor {
            let name = column.sql_name();
            if name.is_empty() {
                return Err(Error::invalid_name(format!(
                    "Blank column name in index on '{}'",
                    entity
                )));
            }
            segments.push(name.chars().collect::<Vec<char>>());
        }

        let base = format!("{}{}", INDEX_PREFIX, entity.to_lowercase());
        let longest = segments.iter().map(Vec::len).max().unwrap_or(0);

        let mut cut = 0;
        loop {
            let name = render(&base, &segments, cut);
            if name.len() <= self.max_identifier_length {
                return Ok(name);
            }
            if cut >= self.max_truncation_attempts || cut >= longest {
                return Err(Error::IndexNameTooLong {
                    name,
                    limit: self.max_identifier_length,
                    attempts: cut,
                });
            }
            cut += 1;
        }
    }
}

fn render(base: &str, segments: &[Vec<char>], cut: usize) -> String {
    let mut name = String::from(base);
    for (i, segment) in segments.iter().enumerate() {
        name.push_str(if i == 0 {
            FIRST_COLUMN_SEPARATOR
        } else {
            NEXT_COLUMN_SEPARATOR
        });
        let keep = segment.len().saturating_sub(cut);
        name.extend(&segment[..keep]);
    }
    name
}
