//! Configuration via `tabula.toml`
//!
//! Names the SQL dialect, the attribute codec and the truncation bound used
//! when deriving index table names. Everything is passed explicitly to the
//! components that need it; nothing is read from the environment.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Default config file name
pub const CONFIG_FILE_NAME: &str = "tabula.toml";

/// Default number of truncation retries when an index table name is too long
pub const DEFAULT_MAX_TRUNCATION_ATTEMPTS: usize = 64;

/// Configuration loaded from `tabula.toml`.
///
/// # Example
///
/// ```toml
/// dialect = "postgresql"
/// codec = "msgpack"
/// max_truncation_attempts = 64
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabulaConfig {
    /// SQL dialect: `"postgresql"` or `"sqlite"`.
    #[serde(default = "default_dialect")]
    pub dialect: String,
    /// Attribute codec identifier.
    #[serde(default = "default_codec")]
    pub codec: String,
    /// Upper bound on truncation retries for index table names.
    #[serde(default = "default_max_truncation_attempts")]
    pub max_truncation_attempts: usize,
}

fn default_dialect() -> String {
    "postgresql".to_string()
}

fn default_codec() -> String {
    "msgpack".to_string()
}

fn default_max_truncation_attempts() -> usize {
    DEFAULT_MAX_TRUNCATION_ATTEMPTS
}

impl Default for TabulaConfig {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
            codec: default_codec(),
            max_truncation_attempts: default_max_truncation_attempts(),
        }
    }
}

impl TabulaConfig {
    /// Config for the given dialect with every other field defaulted
    pub fn for_dialect(dialect: impl Into<String>) -> Self {
        Self {
            dialect: dialect.into(),
            ..Self::default()
        }
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Tabula configuration
#
# SQL dialect used for DDL and statement placeholders: "postgresql" or "sqlite"
dialect = "postgresql"

# Attribute codec for entity bodies
codec = "msgpack"

# Index table names longer than the dialect's identifier limit are shortened
# one character per column at a time. This bounds the number of retries.
max_truncation_attempts = 64
"#
    }

    /// Check field values.
    ///
    /// # Errors
    ///
    /// Returns `Config` for blank names or a zero truncation bound.
    pub fn validate(&self) -> Result<()> {
        if self.dialect.trim().is_empty() {
            return Err(Error::config("dialect must not be empty"));
        }
        if self.codec.trim().is_empty() {
            return Err(Error::config("codec must not be empty"));
        }
        if self.max_truncation_attempts == 0 {
            return Err(Error::config(
                "max_truncation_attempts must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Parse and validate config text.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the text is not valid TOML or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TabulaConfig = toml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
