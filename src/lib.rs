//! # bson
//!
//! A codec for the BSON binary document format: a self-describing,
//! length-prefixed, ordered map-of-typed-values encoding.
//!
//! Values round-trip through the closed [`Bson`] variant; user-defined
//! records participate through the [`BsonRep`](rep::BsonRep) trait, which is
//! derivable:
//!
//! ```
//! use bson::prelude::*;
//!
//! #[derive(BsonRep, Clone, Debug, Default, PartialEq)]
//! struct Job {
//!     id:    i64,
//!     state: String,
//!     #[bson(omitempty)]
//!     tags:  Vec<String>,
//! }
//!
//! let job = Job { id: 7, state: "queued".to_string(), tags: vec![] };
//! let data = marshal(&job).unwrap();
//! let back: Job = unmarshal(&data).unwrap();
//! assert_eq!(back, job);
//! ```
//!
//! Free-form documents use the ordered [`Document`] container or a plain
//! string-keyed hash map:
//!
//! ```
//! use bson::prelude::*;
//!
//! let data = marshal(&doc! { "hello" => "world" }).unwrap();
//! let d: Document = unmarshal(&data).unwrap();
//! assert_eq!(d.get("hello"), Some(&Bson::String("world".to_string())));
//! ```

#![allow(clippy::cast_lossless)]

/// Procedural macros.
pub extern crate bson_macro;

/// The ordered document container.
pub mod document;
/// BSON binary encoder and decoder.
pub mod encoding;
/// Error types.
pub mod errors;
/// ObjectId support.
pub mod oid;
/// Prelude.
pub mod prelude;
/// Lazy raw elements.
pub mod raw;
/// Types representable as `Bson`.
pub mod rep;
/// Helper functions.
pub mod util;

pub use bytes::Bytes;
pub use document::Document;
pub use encoding::{decode_document, encode_document, marshal, marshal_into, unmarshal};
pub use hashbrown::HashMap;
pub use oid::ObjectId;
pub use raw::RawBson;

use chrono::{DateTime, TimeZone, Utc};
use std::cmp::Ordering;

/// A binary blob with a subtype byte.
///
/// Unknown subtypes are carried through untouched.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Binary {
    /// The subtype byte stored on the wire.
    pub subtype: u8,
    /// The payload.
    pub bytes:   Bytes,
}

impl Default for Binary {
    fn default() -> Binary {
        Binary { subtype: encoding::SUBTYPE_GENERIC, bytes: Bytes::new() }
    }
}

/// A regular expression: pattern plus option flags, both cstrings on the
/// wire.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RegEx {
    pub pattern: String,
    pub options: String,
}

/// JavaScript code, optionally carrying a scope document.
///
/// A value without scope is emitted with tag 0x0D, one with scope as the
/// enveloped 0x0F form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JavaScript {
    pub code:  String,
    pub scope: Option<Document>,
}

/// A symbol (deprecated on the wire, still readable and writable).
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Symbol(pub String);

/// An internal MongoDB timestamp: two 32-bit ordinals packed into eight
/// wire bytes.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Timestamp {
    pub time:      u32,
    pub increment: u32,
}

/// A DBPointer (deprecated on the wire, still readable and writable).
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DbPointer {
    pub namespace: String,
    pub id:        ObjectId,
}

/// Milliseconds since the Unix epoch, exactly as stored on the wire.
///
/// The codec keeps the raw count so every representable wire value round
/// trips; conversion to a calendar type happens at the edges.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct UtcDatetime(pub i64);

impl UtcDatetime {
    /// Converts to a chrono timestamp, unless the millisecond count lies
    /// outside chrono's representable range.
    pub fn to_chrono(self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.0).single()
    }
}

impl From<DateTime<Utc>> for UtcDatetime {
    fn from(t: DateTime<Utc>) -> UtcDatetime { UtcDatetime(t.timestamp_millis()) }
}

/// Every value a BSON element can carry.
#[derive(Clone, Debug, PartialEq)]
pub enum Bson {
    /// 64-bit IEEE-754 double.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Embedded document.
    Document(Document),
    /// Array.
    Array(Vec<Bson>),
    /// Binary blob.
    Binary(Binary),
    /// Undefined (deprecated; accepted on decode).
    Undefined,
    /// 12-byte ObjectId.
    ObjectId(ObjectId),
    /// Boolean.
    Bool(bool),
    /// Milliseconds since the Unix epoch.
    UtcDatetime(UtcDatetime),
    /// Null.
    Null,
    /// Regular expression.
    RegEx(RegEx),
    /// DBPointer (deprecated; accepted on decode).
    DbPointer(DbPointer),
    /// JavaScript code, with or without scope.
    JavaScript(JavaScript),
    /// Symbol (deprecated; accepted on decode).
    Symbol(Symbol),
    /// 32-bit integer.
    Int32(i32),
    /// Internal timestamp.
    Timestamp(Timestamp),
    /// 64-bit integer.
    Int64(i64),
    /// MaxKey.
    MaxKey,
    /// MinKey.
    MinKey,
    /// A pre-encoded element spliced verbatim into the output.
    Raw(RawBson),
}

impl Bson {
    /// The element type tag this value is written with.
    pub fn element_type(&self) -> u8 {
        use Bson::*;
        match self {
            Double(_) => 0x01,
            String(_) => 0x02,
            Document(_) => 0x03,
            Array(_) => 0x04,
            Binary(_) => 0x05,
            Undefined => 0x06,
            ObjectId(_) => 0x07,
            Bool(_) => 0x08,
            UtcDatetime(_) => 0x09,
            Null => 0x0A,
            RegEx(_) => 0x0B,
            DbPointer(_) => 0x0C,
            JavaScript(js) => {
                if js.scope.is_some() {
                    0x0F
                } else {
                    0x0D
                }
            }
            Symbol(_) => 0x0E,
            Int32(_) => 0x10,
            Timestamp(_) => 0x11,
            Int64(_) => 0x12,
            MaxKey => 0x7F,
            MinKey => 0xFF,
            // Raw kind zero means "document body".
            Raw(raw) => {
                if raw.kind == 0x00 {
                    0x03
                } else {
                    raw.kind
                }
            }
        }
    }

    /// A human-readable name for the value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        use Bson::*;
        match self {
            Double(_) => "Double",
            String(_) => "String",
            Document(_) => "Document",
            Array(_) => "Array",
            Binary(_) => "Binary",
            Undefined => "Undefined",
            ObjectId(_) => "ObjectId",
            Bool(_) => "Bool",
            UtcDatetime(_) => "UTCDateTime",
            Null => "Null",
            RegEx(_) => "RegEx",
            DbPointer(_) => "DBPointer",
            JavaScript(_) => "JavaScript",
            Symbol(_) => "Symbol",
            Int32(_) => "Int32",
            Timestamp(_) => "Timestamp",
            Int64(_) => "Int64",
            MaxKey => "MaxKey",
            MinKey => "MinKey",
            Raw(_) => "Raw",
        }
    }

    /// Indicates whether a value is `Null`.
    pub fn is_null(&self) -> bool {
        match self {
            Bson::Null => true,
            _ => false,
        }
    }

    /// Borrows the value as a document, if it is one.
    pub fn to_doc(&self) -> Option<&Document> {
        match self {
            Bson::Document(d) => Some(d),
            _ => None,
        }
    }

    /// Consumes the value, converting it into a document.
    pub fn into_doc(self) -> Option<Document> {
        match self {
            Bson::Document(d) => Some(d),
            _ => None,
        }
    }

    /// Borrows the value as an array, if it is one.
    pub fn to_array(&self) -> Option<&Vec<Bson>> {
        match self {
            Bson::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Consumes the value, converting it into an array.
    pub fn into_array(self) -> Option<Vec<Bson>> {
        match self {
            Bson::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Borrows the value as a string, if it is one.
    pub fn to_str(&self) -> Option<&str> {
        match self {
            Bson::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts a boolean.
    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Bson::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extracts a 64-bit integer from either integer kind.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Bson::Int32(v) => Some(i64::from(*v)),
            Bson::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Extracts a double.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Bson::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Rank of the value's kind in the composite-key ordering. Within one
    /// rank, values compare by their payloads.
    fn type_rank(&self) -> u8 {
        use Bson::*;
        match self {
            MinKey => 0,
            Null => 1,
            Undefined => 2,
            Bool(_) => 3,
            Int32(_) | Int64(_) | Double(_) => 4,
            String(_) | Symbol(_) => 5,
            Document(_) => 6,
            Array(_) => 7,
            Binary(_) => 8,
            ObjectId(_) => 9,
            UtcDatetime(_) => 10,
            Timestamp(_) => 11,
            RegEx(_) => 12,
            DbPointer(_) => 13,
            JavaScript(_) => 14,
            Raw(_) => 15,
            MaxKey => 255,
        }
    }

    /// Total ordering over values, suitable for sorting composite keys:
    /// booleans sort below numerics, numerics below strings, strings below
    /// documents; numerics compare numerically regardless of width, strings
    /// lexicographically, and documents field by field in declared order.
    pub fn compare(&self, other: &Bson) -> Ordering {
        use Bson::*;
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int32(a), Int32(b)) => a.cmp(b),
            (Int64(a), Int64(b)) => a.cmp(b),
            (Int32(a), Int64(b)) => i64::from(*a).cmp(b),
            (Int64(a), Int32(b)) => a.cmp(&i64::from(*b)),
            (Double(a), Double(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Double(a), Int32(b)) => {
                a.partial_cmp(&f64::from(*b)).unwrap_or(Ordering::Equal)
            }
            (Double(a), Int64(b)) => {
                a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal)
            }
            (Int32(a), Double(b)) => {
                f64::from(*a).partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (Int64(a), Double(b)) => {
                (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (String(a), String(b)) => a.cmp(b),
            (String(a), Symbol(b)) => a.cmp(&b.0),
            (Symbol(a), String(b)) => a.0.cmp(b),
            (Symbol(a), Symbol(b)) => a.cmp(b),
            (Document(a), Document(b)) => {
                for ((_, va), (_, vb)) in a.iter().zip(b.iter()) {
                    match va.compare(vb) {
                        Ordering::Equal => continue,
                        other => return other,
                    }
                }
                a.len().cmp(&b.len())
            }
            (Array(a), Array(b)) => {
                for (va, vb) in a.iter().zip(b.iter()) {
                    match va.compare(vb) {
                        Ordering::Equal => continue,
                        other => return other,
                    }
                }
                a.len().cmp(&b.len())
            }
            (Binary(a), Binary(b)) => a.cmp(b),
            (ObjectId(a), ObjectId(b)) => a.cmp(b),
            (UtcDatetime(a), UtcDatetime(b)) => a.cmp(b),
            (Timestamp(a), Timestamp(b)) => a.cmp(b),
            (RegEx(a), RegEx(b)) => a.cmp(b),
            (DbPointer(a), DbPointer(b)) => a.cmp(b),
            (JavaScript(a), JavaScript(b)) => match a.code.cmp(&b.code) {
                Ordering::Equal => match (&a.scope, &b.scope) {
                    (None, None) => Ordering::Equal,
                    (None, Some(_)) => Ordering::Less,
                    (Some(_), None) => Ordering::Greater,
                    (Some(sa), Some(sb)) => {
                        Bson::Document(sa.clone()).compare(&Bson::Document(sb.clone()))
                    }
                },
                other => other,
            },
            (Raw(a), Raw(b)) => (a.kind, a.data.as_ref()).cmp(&(b.kind, b.data.as_ref())),
            (a, b) => a.type_rank().cmp(&b.type_rank()),
        }
    }
}

// Direct constructors for the scalar kinds.
from_fn!(Bson, f64, Bson::Double);
from_fn!(Bson, bool, Bson::Bool);
from_fn!(Bson, i32, Bson::Int32);
from_fn!(Bson, i64, Bson::Int64);
from_fn!(Bson, String, Bson::String);
from_fn!(Bson, Document, Bson::Document);
from_fn!(Bson, Vec<Bson>, Bson::Array);
from_fn!(Bson, Binary, Bson::Binary);
from_fn!(Bson, ObjectId, Bson::ObjectId);
from_fn!(Bson, UtcDatetime, Bson::UtcDatetime);
from_fn!(Bson, RegEx, Bson::RegEx);
from_fn!(Bson, DbPointer, Bson::DbPointer);
from_fn!(Bson, JavaScript, Bson::JavaScript);
from_fn!(Bson, Symbol, Bson::Symbol);
from_fn!(Bson, Timestamp, Bson::Timestamp);
from_fn!(Bson, RawBson, Bson::Raw);

compose_from!(Bson, f64, f32);
compose_from!(Bson, i32, i8);
compose_from!(Bson, i32, i16);
compose_from!(Bson, i32, u8);
compose_from!(Bson, i32, u16);
compose_from!(Bson, UtcDatetime, DateTime<Utc>);

impl From<&str> for Bson {
    fn from(s: &str) -> Bson { Bson::String(s.to_string()) }
}

impl From<Bytes> for Bson {
    fn from(bytes: Bytes) -> Bson {
        Bson::Binary(Binary { subtype: encoding::SUBTYPE_GENERIC, bytes })
    }
}

impl From<HashMap<String, Bson>> for Bson {
    fn from(m: HashMap<String, Bson>) -> Bson { Bson::Document(Document::from(m)) }
}

impl<T: Into<Bson>> From<Option<T>> for Bson {
    fn from(v: Option<T>) -> Bson {
        match v {
            Some(v) => v.into(),
            None => Bson::Null,
        }
    }
}

/// Builds an ordered [`Document`] from `key => value` pairs.
///
/// # Example
///
/// ```
/// use bson::{doc, Bson};
///
/// let d = doc! {
///     "name" => "worker-1",
///     "jobs" => 12i32,
///     "idle" => Bson::Null,
/// };
/// assert_eq!(d.len(), 3);
/// ```
#[macro_export]
macro_rules! doc {
    () => { $crate::Document::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut doc = $crate::Document::new();
        $( doc.insert($key, $value); )+
        doc
    }};
}
