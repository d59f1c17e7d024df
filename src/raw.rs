//! Lazy raw elements.
//!
//! A [`RawBson`] is an element kind plus its undecoded payload bytes. It
//! defers parsing on the way in (capture a whole document, look at it
//! later) and splices pre-encoded bytes on the way out. The payload is
//! always an owned copy; a `RawBson` never borrows from the buffer it was
//! read from.

use crate::{
    encoding::{
        de::{self, DeserializerBytes},
        ser,
    },
    errors::{ConversionError, DecodeError},
    rep::BsonRep,
    Bson,
};
use bytes::{Bytes, IntoBuf};

/// An unparsed BSON element body, or an unparsed document body when `kind`
/// is 0x03 (kind 0x00 is accepted as a synonym for a document body).
///
/// # Example
///
/// ```
/// use bson::prelude::*;
///
/// let data = marshal(&doc! { "hello" => "world" }).unwrap();
/// let raw = RawBson::from_doc_bytes(&data).unwrap();
///
/// // nothing below the outer frame has been parsed yet
/// let doc: Document = raw.unmarshal().unwrap();
/// assert_eq!(doc.get("hello"), Some(&Bson::String("world".to_string())));
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RawBson {
    /// The element type tag.
    pub kind: u8,
    /// The undecoded payload.
    pub data: Bytes,
}

impl Default for RawBson {
    fn default() -> RawBson { RawBson { kind: 0x00, data: Bytes::new() } }
}

impl RawBson {
    /// Wraps a kind and payload without validating either.
    pub fn new<B: Into<Bytes>>(kind: u8, data: B) -> RawBson {
        RawBson { kind, data: data.into() }
    }

    /// Captures a complete document without parsing its elements.
    ///
    /// Only the outer frame is checked: the length prefix must match the
    /// slice length and the final byte must be the closing NUL. Element
    /// payloads are validated later, when the raw document is unmarshaled.
    pub fn from_doc_bytes(data: &[u8]) -> Result<RawBson, DecodeError> {
        let mut buf = data.into_buf();
        let total = buf.read_i32()?;
        if total < crate::encoding::MIN_DOC_LEN || total as usize != data.len() {
            return Err(DecodeError::Corrupted("document length mismatch"));
        }
        if data[data.len() - 1] != 0x00 {
            return Err(DecodeError::Corrupted("document missing NUL terminator"));
        }
        Ok(RawBson::new(0x03, data.to_vec()))
    }

    /// Parses the payload into its value form.
    pub fn value(&self) -> Result<Bson, DecodeError> { de::element_from_raw(self) }

    /// Parses the payload and converts it into the destination type.
    ///
    /// Fails with [`ConversionError::RawIncompatible`] when the destination
    /// cannot hold this element kind.
    pub fn unmarshal<T: BsonRep>(&self) -> Result<T, DecodeError> {
        let value = self.value()?;
        T::from_bson(value).map_err(|e| {
            DecodeError::Conversion(match e {
                ConversionError::TypeMismatch(_, dest) => {
                    ConversionError::RawIncompatible(self.kind, dest)
                }
                other => other,
            })
        })
    }

    /// Derives the raw form of an already-parsed value by encoding its
    /// payload. For values parsed off the wire in order-preserving form the
    /// result is byte-identical to the original element body.
    pub fn capture(value: &Bson) -> Result<RawBson, ConversionError> {
        if let Bson::Raw(raw) = value {
            return Ok(raw.clone());
        }
        let mut out = Vec::new();
        ser::write_payload(&mut out, value)
            .map_err(|e| ConversionError::Message(e.to_string()))?;
        Ok(RawBson::new(value.element_type(), out))
    }
}
