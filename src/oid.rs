//! # ObjectIds
//!
//! A BSON ObjectId is a 12-byte opaque identifier. This module only reads
//! them; minting fresh ids (counter, machine id, pid) belongs to whoever
//! produces documents, not to the codec.

use crate::errors::ConversionError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A 12-byte BSON ObjectId.
///
/// # Example
///
/// ```
/// use bson::oid::ObjectId;
///
/// let id = ObjectId::from_hex("4d88e15b60f486e428412dc9").unwrap();
/// assert_eq!(id.hex(), "4d88e15b60f486e428412dc9");
/// assert_eq!(id.timestamp(), 1300816219);
/// ```
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Builds an id from raw bytes, rejecting slices that are not exactly 12
    /// bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<ObjectId, ConversionError> {
        if bytes.len() != 12 {
            return Err(ConversionError::ObjectIdBadLength(bytes.len()));
        }
        let mut out = [0u8; 12];
        out.copy_from_slice(bytes);
        Ok(ObjectId(out))
    }

    /// Builds an id from its 24-character lowercase or uppercase hex form.
    pub fn from_hex(s: &str) -> Result<ObjectId, ConversionError> {
        if s.len() != 24 {
            return Err(ConversionError::ObjectIdBadHex(s.to_string()));
        }
        let bytes =
            hex::decode(s).map_err(|_| ConversionError::ObjectIdBadHex(s.to_string()))?;
        ObjectId::from_bytes(&bytes)
    }

    /// The raw bytes of the id.
    pub fn bytes(&self) -> &[u8; 12] { &self.0 }

    /// Lowercase hex representation.
    pub fn hex(&self) -> String { hex::encode(&self.0[..]) }

    /// Seconds since the Unix epoch, taken big-endian from the first four
    /// bytes.
    pub fn timestamp(&self) -> i64 {
        i64::from(u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]))
    }

    /// The three machine-identifier bytes.
    pub fn machine(&self) -> [u8; 3] { [self.0[4], self.0[5], self.0[6]] }

    /// The process id, big-endian.
    pub fn pid(&self) -> u16 { u16::from_be_bytes([self.0[7], self.0[8]]) }

    /// The insertion counter, big-endian from the last three bytes.
    pub fn counter(&self) -> u32 {
        u32::from_be_bytes([0, self.0[9], self.0[10], self.0[11]])
    }

    /// Whether every byte of the id is zero. The zero id is what JSON `null`
    /// decodes to.
    pub fn is_zero(&self) -> bool { self.0 == [0u8; 12] }
}

impl From<[u8; 12]> for ObjectId {
    fn from(bytes: [u8; 12]) -> ObjectId { ObjectId(bytes) }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str(&self.hex()) }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ObjectId({:?})", self.hex())
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // The zero id round-trips as the empty string, mirroring the
        // deserializer below.
        if self.is_zero() {
            serializer.serialize_str("")
        } else {
            serializer.serialize_str(&self.hex())
        }
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<ObjectId, D::Error> {
        // `null` and the empty string both mean "no id yet".
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(ObjectId::default()),
            Some(ref s) if s.is_empty() => Ok(ObjectId::default()),
            Some(s) => ObjectId::from_hex(&s).map_err(de::Error::custom),
        }
    }
}
