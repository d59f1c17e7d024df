//! # BSON binary encoder and decoder
//!
//! The facade over the wire layer: [`marshal`] and [`unmarshal`] move whole
//! documents between user types and bytes, [`encode_document`] and
//! [`decode_document`] work at the value level.
//!
//! # Example
//!
//! ```
//! use bson::prelude::*;
//!
//! #[derive(BsonRep, Clone, Debug, Default, PartialEq)]
//! struct SomeData {
//!     x: u32,
//!     y: i32,
//! }
//!
//! let some_data = SomeData { x: 1, y: 2 };
//! let enc = marshal(&some_data).unwrap();
//!
//! // encoding into a caller-provided buffer is equivalent
//! let mut out = Vec::new();
//! marshal_into(&some_data, &mut out).unwrap();
//! assert_eq!(out, enc);
//!
//! let dec: SomeData = unmarshal(&enc).unwrap();
//! assert_eq!(dec, some_data);
//! ```

use crate::{
    errors::{DecodeError, EncodeError},
    rep::BsonRep,
    Bson, Document,
};
use bytes::{Buf, IntoBuf};

mod constants;
pub(crate) use constants::*;
pub(crate) mod de;
pub(crate) mod ser;

/// Encodes any document-shaped value into a fresh byte vector.
///
/// Accepted roots are values whose representation is a document: the ordered
/// [`Document`], string-keyed maps, derived record types, and raw documents
/// (spliced verbatim). Anything else fails with
/// [`EncodeError::NotADocument`].
pub fn marshal<T: BsonRep>(value: &T) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    marshal_into(value, &mut out)?;
    Ok(out)
}

/// Encodes a document-shaped value, appending to a caller-provided buffer.
pub fn marshal_into<T: BsonRep>(value: &T, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    match value.to_bson()? {
        Bson::Document(doc) => ser::write_document(out, &doc),
        Bson::Raw(raw) => {
            if raw.data.is_empty() {
                return Err(EncodeError::RawEmpty);
            }
            match raw.kind {
                0x00 | TAG_DOCUMENT => {
                    out.extend_from_slice(raw.data.as_ref());
                    Ok(())
                }
                kind => Err(EncodeError::RawNotDocument(kind)),
            }
        }
        other => Err(EncodeError::NotADocument(other.kind_name())),
    }
}

/// Decodes a complete document and converts it into the destination type.
///
/// The wire is parsed into the ordered element form first, preserving
/// on-wire order, then handed to the destination's
/// [`from_bson`](BsonRep::from_bson). Unmatched record fields are zeroed;
/// unknown element names are discarded silently.
pub fn unmarshal<T: BsonRep>(data: &[u8]) -> Result<T, DecodeError> {
    let doc = decode_document(&mut data.into_buf())?;
    T::from_bson(Bson::Document(doc)).map_err(DecodeError::Conversion)
}

/// Encodes a [`Document`], appending to `out`.
pub fn encode_document(doc: &Document, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    ser::write_document(out, doc)
}

/// Decodes one complete document from the buffer, leaving any trailing
/// bytes unread.
pub fn decode_document<B: Buf>(data: &mut B) -> Result<Document, DecodeError> {
    de::read_document(data, 0)
}
