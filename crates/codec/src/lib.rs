//! Attribute codecs for tabula
//!
//! An entity body is the encoded form of its attribute map, minus the
//! reserved `id` and `updated` keys. The codec seam keeps the wire format
//! swappable; MessagePack is the only format shipped.
//!
//! # Usage
//!
//! ```
//! use tabula_codec::get_codec;
//! use tabula_core::{AttributeMap, Value};
//!
//! let codec = get_codec("msgpack").unwrap();
//! let mut attrs = AttributeMap::new();
//! attrs.insert("name".to_string(), Value::from("John"));
//!
//! let bytes = codec.encode(&attrs, &["id", "updated"]).unwrap();
//! assert_eq!(codec.decode(&bytes).unwrap(), attrs);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod messagepack;
mod traits;

pub use messagepack::{MessagePackCodec, MSGPACK_CODEC_ID};
pub use traits::{AttributeCodec, CodecError};

/// Get a codec by its identifier.
///
/// # Known Codecs
///
/// - `"msgpack"`: MessagePack key/value token stream
pub fn get_codec(codec_id: &str) -> Result<Box<dyn AttributeCodec>, CodecError> {
    match codec_id {
        MSGPACK_CODEC_ID => Ok(Box::new(MessagePackCodec)),
        _ => Err(CodecError::UnknownCodec(codec_id.to_string())),
    }
}
