//! MessagePack attribute codec.
//!
//! An entity body is a flat sequence of MessagePack tokens, alternating
//! string keys and scalar values. There is no surrounding map header, so an
//! empty attribute map is an empty buffer.
//!
//! Integers are written in the most compact MessagePack form and read back
//! into the smallest signed width that holds them. A value stored as
//! `I32(31)` therefore comes back as `I8(31)`. This narrowing is part of the
//! contract. Float width is kept: `F32` stays `F32`, `F64` stays `F64`.

use std::fmt;
use std::io::Cursor;

use rmp_serde::encode;
use serde::de::{self, Deserialize, Deserializer, Visitor};
use tabula_core::{AttributeMap, Value};

use super::traits::{AttributeCodec, CodecError};

/// MessagePack codec identifier
pub const MSGPACK_CODEC_ID: &str = "msgpack";

/// MessagePack attribute codec.
///
/// # Example
///
/// ```
/// use tabula_codec::{AttributeCodec, MessagePackCodec};
/// use tabula_core::{AttributeMap, Value};
///
/// let codec = MessagePackCodec;
/// let mut attrs = AttributeMap::new();
/// attrs.insert("age".to_string(), Value::I32(31));
///
/// let bytes = codec.encode(&attrs, &[]).unwrap();
/// let decoded = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded["age"], Value::I8(31));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MessagePackCodec;

impl AttributeCodec for MessagePackCodec {
    fn encode(&self, attributes: &AttributeMap, excluded: &[&str]) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::new();
        for (key, value) in attributes {
            if excluded.contains(&key.as_str()) {
                continue;
            }
            encode::write(&mut buf, key.as_str()).map_err(encode_error)?;
            write_value(&mut buf, key, value)?;
        }
        Ok(buf)
    }

    fn decode(&self, bytes: &[u8]) -> Result<AttributeMap, CodecError> {
        let mut cursor = Cursor::new(bytes);
        let mut attributes = AttributeMap::new();
        let mut pending: Option<String> = None;

        while (cursor.position() as usize) < bytes.len() {
            let token: Token = rmp_serde::from_read(&mut cursor)
                .map_err(|e| CodecError::Malformed(e.to_string()))?;

            match pending.take() {
                // ExpectKey
                None => match token {
                    Token::Str(key) => pending = Some(key),
                    other => {
                        return Err(CodecError::ValueWithoutKey {
                            type_name: other.type_name(),
                        })
                    }
                },
                // ExpectValue
                Some(key) => {
                    attributes.insert(key, token.into_value());
                }
            }
        }

        if let Some(key) = pending {
            return Err(CodecError::KeyWithoutValue { key });
        }
        Ok(attributes)
    }

    fn codec_id(&self) -> &str {
        MSGPACK_CODEC_ID
    }
}

fn write_value(buf: &mut Vec<u8>, key: &str, value: &Value) -> Result<(), CodecError> {
    let written = match value {
        Value::Null => encode::write(buf, &()),
        Value::Bool(b) => encode::write(buf, b),
        Value::I8(v) => encode::write(buf, v),
        Value::I16(v) => encode::write(buf, v),
        Value::I32(v) => encode::write(buf, v),
        Value::I64(v) => encode::write(buf, v),
        Value::F32(v) => encode::write(buf, v),
        Value::F64(v) => encode::write(buf, v),
        Value::String(s) => encode::write(buf, s.as_str()),
        Value::Bytes(_) | Value::Uuid(_) | Value::Timestamp(_) => {
            return Err(CodecError::UnsupportedType {
                key: key.to_string(),
                type_name: value.type_name(),
            })
        }
    };
    written.map_err(encode_error)
}

fn encode_error(e: encode::Error) -> CodecError {
    CodecError::Encode(e.to_string())
}

/// One scalar token of the stream
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Nil,
    Bool(bool),
    Int(i64),
    F32(f32),
    F64(f64),
    Str(String),
}

impl Token {
    fn type_name(&self) -> &'static str {
        match self {
            Token::Nil => "NIL",
            Token::Bool(_) => "Boolean",
            Token::Int(_) => "Integer",
            Token::F32(_) | Token::F64(_) => "Float/Double",
            Token::Str(_) => "String",
        }
    }

    fn into_value(self) -> Value {
        match self {
            Token::Nil => Value::Null,
            Token::Bool(b) => Value::Bool(b),
            Token::Int(i) => Value::narrowed(i),
            Token::F32(f) => Value::F32(f),
            Token::F64(f) => Value::F64(f),
            Token::Str(s) => Value::String(s),
        }
    }
}

struct TokenVisitor;

impl<'de> Visitor<'de> for TokenVisitor {
    type Value = Token;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a nil, boolean, integer, float or string token")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Token, E> {
        Ok(Token::Nil)
    }

    fn visit_none<E: de::Error>(self) -> Result<Token, E> {
        Ok(Token::Nil)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Token, E> {
        Ok(Token::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Token, E> {
        Ok(Token::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Token, E> {
        i64::try_from(v)
            .map(Token::Int)
            .map_err(|_| E::custom(format!("integer {} exceeds signed 64-bit range", v)))
    }

    fn visit_f32<E: de::Error>(self, v: f32) -> Result<Token, E> {
        Ok(Token::F32(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Token, E> {
        Ok(Token::F64(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Token, E> {
        Ok(Token::Str(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Token, E> {
        Ok(Token::Str(v))
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TokenVisitor)
    }
}
