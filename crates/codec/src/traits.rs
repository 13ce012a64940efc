//! Attribute codec trait definitions.

use tabula_core::{AttributeMap, Error};

/// Attribute codec trait.
///
/// Turns an attribute map into an entity body and back. Implementors are
/// free to choose the wire format, but must honour the pairing protocol:
/// every key is followed by exactly one value, an explicit null is kept,
/// and an empty map is an empty buffer.
///
/// # Thread Safety
///
/// Codecs must be `Send + Sync` so one instance can serve every store.
pub trait AttributeCodec: Send + Sync {
    /// Encode every entry whose key is not in `excluded`.
    fn encode(&self, attributes: &AttributeMap, excluded: &[&str]) -> Result<Vec<u8>, CodecError>;

    /// Decode a buffer produced by `encode`.
    fn decode(&self, bytes: &[u8]) -> Result<AttributeMap, CodecError>;

    /// Unique codec identifier.
    fn codec_id(&self) -> &str;
}

/// Codec errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Value variant the wire format cannot carry.
    #[error("Type: {type_name} is not supported to transport (key '{key}')")]
    UnsupportedType {
        /// Offending key
        key: String,
        /// Runtime type of the value
        type_name: &'static str,
    },

    /// Value token read while a key was expected.
    #[error("{type_name} pair value found but no preceding String key name found")]
    ValueWithoutKey {
        /// Type of the orphaned token
        type_name: &'static str,
    },

    /// Stream ended with a key still waiting for its value.
    #[error("Inconsistent byte array structure, key '{key}' present without value")]
    KeyWithoutValue {
        /// Dangling key
        key: String,
    },

    /// Bytes are not a valid token stream.
    #[error("Malformed attribute stream: {0}")]
    Malformed(String),

    /// Writer failure while encoding.
    #[error("Encode error: {0}")]
    Encode(String),

    /// Unknown codec identifier.
    #[error("Unknown codec: {0}")]
    UnknownCodec(String),
}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::UnsupportedType { key, type_name } => {
                Error::UnsupportedType { key, type_name }
            }
            CodecError::ValueWithoutKey { type_name } => Error::ValueWithoutKey { type_name },
            CodecError::KeyWithoutValue { key } => Error::KeyWithoutValue { key },
            CodecError::Malformed(msg) => Error::Malformed(msg),
            CodecError::Encode(msg) => Error::Malformed(format!("encode failed: {}", msg)),
            CodecError::UnknownCodec(id) => Error::Config(format!("Unknown codec: {}", id)),
        }
    }
}
