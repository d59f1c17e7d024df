//! # Values representable as BSON.
//!
//! [`BsonRep`] is the seam between user types and the [`Bson`] value model:
//! `to_bson` feeds the encoder, `from_bson` consumes what the decoder
//! produced and performs the cross-type coercions the wire format calls
//! for (numerics widen and truncate across widths, booleans exchange with
//! numerics as 0/1, strings exchange with symbols and binary payloads,
//! datetimes surface as their millisecond counts).
//!
//! Record types derive the trait; see `#[derive(BsonRep)]` and the field
//! options `rename`, `skip`, `omitempty`, `minsize` and `inline`. Wire
//! names must be unique under the ASCII case fold used by decode lookups;
//! a collision is rejected while the descriptor is derived:
//!
//! ```compile_fail
//! use bson::prelude::*;
//!
//! #[derive(BsonRep, Clone, Debug, Default)]
//! struct Record {
//!     name:  u8,
//!     #[bson(rename = "name")]
//!     other: u8,
//! }
//! ```
//!
//! Types that want full control implement the [`Getter`] and [`Setter`]
//! hooks and wire them in with [`hooked_rep!`].

use crate::{
    document::Document,
    encoding::{SUBTYPE_BINARY_OLD, SUBTYPE_GENERIC},
    errors::ConversionError,
    oid::ObjectId,
    raw::RawBson,
    Binary, Bson, DbPointer, JavaScript, RegEx, Symbol, Timestamp, UtcDatetime,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use std::hash::BuildHasher;

/// A value representable as [`Bson`].
pub trait BsonRep: Sized {
    /// Converts the value into [`Bson`].
    fn to_bson(&self) -> Result<Bson, ConversionError>;

    /// Consumes the value, converting it into [`Bson`].
    fn into_bson(self) -> Result<Bson, ConversionError> { self.to_bson() }

    /// Converts a decoded value into `Self`, coercing across compatible
    /// wire kinds.
    fn from_bson(bs: Bson) -> Result<Self, ConversionError>;

    /// Whether the value equals the zero of its type. Fields tagged
    /// `omitempty` are skipped on encode when this returns `true`.
    fn is_zero(&self) -> bool { false }
}

/// A type that produces its own BSON representation on encode.
///
/// The returned value is marshaled by the normal rules; an error aborts the
/// entire marshal and propagates unchanged.
pub trait Getter {
    fn get_bson(&self) -> Result<Bson, ConversionError>;
}

/// A type that builds itself from the raw element on decode.
///
/// The hook receives the element's kind and undecoded payload and may
/// recurse through [`RawBson::unmarshal`]. Returning
/// [`ConversionError::SetZero`] zeroes the destination slot instead; any
/// other error aborts the whole unmarshal.
pub trait Setter: Sized {
    fn set_bson(raw: RawBson) -> Result<Self, ConversionError>;
}

/// Implements [`BsonRep`] for a type in terms of its [`Getter`] and
/// [`Setter`] hooks.
///
/// # Example
///
/// ```
/// use bson::prelude::*;
///
/// #[derive(Clone, Debug, Default, PartialEq)]
/// struct Celsius(f64);
///
/// impl Getter for Celsius {
///     fn get_bson(&self) -> Result<Bson, ConversionError> {
///         Ok(Bson::Double(self.0))
///     }
/// }
///
/// impl Setter for Celsius {
///     fn set_bson(raw: RawBson) -> Result<Celsius, ConversionError> {
///         Ok(Celsius(raw.unmarshal()?))
///     }
/// }
///
/// hooked_rep!(Celsius);
/// ```
#[macro_export]
macro_rules! hooked_rep {
    ($t:ty) => {
        impl $crate::rep::BsonRep for $t {
            fn to_bson(
                &self,
            ) -> Result<$crate::Bson, $crate::errors::ConversionError> {
                $crate::rep::Getter::get_bson(self)
            }

            fn from_bson(
                bs: $crate::Bson,
            ) -> Result<Self, $crate::errors::ConversionError> {
                match <$t as $crate::rep::Setter>::set_bson($crate::RawBson::capture(
                    &bs,
                )?) {
                    Err($crate::errors::ConversionError::SetZero) => {
                        Ok(<$t as Default>::default())
                    }
                    other => other,
                }
            }
        }
    };
}

fn mismatch(value: &Bson, dest: &'static str) -> ConversionError {
    ConversionError::TypeMismatch(value.kind_name(), dest)
}

/// Integers that can shrink to Int32 on the wire when the value fits.
///
/// This is deliberately narrower than [`BsonRep`]: `minsize` only makes
/// sense on 64-bit integer fields, and attaching it to anything else should
/// not compile.
pub trait Minsize: BsonRep {
    fn to_bson_minsize(&self) -> Result<Bson, ConversionError>;
}

impl Minsize for i64 {
    fn to_bson_minsize(&self) -> Result<Bson, ConversionError> {
        if *self >= i64::from(i32::min_value()) && *self <= i64::from(i32::max_value()) {
            Ok(Bson::Int32(*self as i32))
        } else {
            Ok(Bson::Int64(*self))
        }
    }
}

impl Minsize for isize {
    fn to_bson_minsize(&self) -> Result<Bson, ConversionError> {
        (*self as i64).to_bson_minsize()
    }
}

impl Minsize for u64 {
    fn to_bson_minsize(&self) -> Result<Bson, ConversionError> { self.to_bson() }
}

impl Minsize for usize {
    fn to_bson_minsize(&self) -> Result<Bson, ConversionError> {
        (*self as u64).to_bson_minsize()
    }
}

impl<T: Minsize> Minsize for Option<T> {
    fn to_bson_minsize(&self) -> Result<Bson, ConversionError> {
        match self {
            None => Ok(Bson::Null),
            Some(v) => v.to_bson_minsize(),
        }
    }
}

/// The shared decode arm for every numeric destination.
macro_rules! numeric_from_bson {
    ($t:ty) => {
        fn from_bson(bs: Bson) -> Result<Self, ConversionError> {
            match bs {
                Bson::Int32(v) => Ok(v as $t),
                Bson::Int64(v) => Ok(v as $t),
                Bson::Double(v) => Ok(v as $t),
                Bson::Bool(b) => Ok((b as u8) as $t),
                Bson::UtcDatetime(t) => Ok(t.0 as $t),
                other => Err(mismatch(&other, stringify!($t))),
            }
        }
    };
}

/// Integers narrower than 32 bits always fit an Int32.
macro_rules! small_int_rep {
    ($t:ty) => {
        impl BsonRep for $t {
            fn to_bson(&self) -> Result<Bson, ConversionError> {
                Ok(Bson::Int32(*self as i32))
            }

            numeric_from_bson!($t);

            fn is_zero(&self) -> bool { *self == 0 }
        }
    };
}

/// Native-width and 64-bit signed integers take the Int64 path.
macro_rules! wide_int_rep {
    ($t:ty) => {
        impl BsonRep for $t {
            fn to_bson(&self) -> Result<Bson, ConversionError> {
                Ok(Bson::Int64(*self as i64))
            }

            numeric_from_bson!($t);

            fn is_zero(&self) -> bool { *self == 0 }
        }
    };
}

/// Unsigned integers pick the narrowest kind their value fits; values past
/// `i64::MAX` have no BSON representation at all.
macro_rules! unsigned_rep {
    ($t:ty) => {
        impl BsonRep for $t {
            fn to_bson(&self) -> Result<Bson, ConversionError> {
                let v = *self as u64;
                if v <= i32::max_value() as u64 {
                    Ok(Bson::Int32(v as i32))
                } else if v <= i64::max_value() as u64 {
                    Ok(Bson::Int64(v as i64))
                } else {
                    Err(ConversionError::Uint64Overflow(v))
                }
            }

            numeric_from_bson!($t);

            fn is_zero(&self) -> bool { *self == 0 }
        }
    };
}

small_int_rep!(i8);
small_int_rep!(i16);
small_int_rep!(i32);

wide_int_rep!(i64);
wide_int_rep!(isize);

unsigned_rep!(u8);
unsigned_rep!(u16);
unsigned_rep!(u32);
unsigned_rep!(u64);
unsigned_rep!(usize);

impl BsonRep for f64 {
    fn to_bson(&self) -> Result<Bson, ConversionError> { Ok(Bson::Double(*self)) }

    numeric_from_bson!(f64);

    fn is_zero(&self) -> bool { *self == 0.0 }
}

impl BsonRep for f32 {
    fn to_bson(&self) -> Result<Bson, ConversionError> {
        Ok(Bson::Double(f64::from(*self)))
    }

    numeric_from_bson!(f32);

    fn is_zero(&self) -> bool { *self == 0.0 }
}

impl BsonRep for bool {
    fn to_bson(&self) -> Result<Bson, ConversionError> { Ok(Bson::Bool(*self)) }

    fn from_bson(bs: Bson) -> Result<Self, ConversionError> {
        match bs {
            Bson::Bool(b) => Ok(b),
            Bson::Int32(v) => Ok(v != 0),
            Bson::Int64(v) => Ok(v != 0),
            Bson::Double(v) => Ok(v != 0.0),
            other => Err(mismatch(&other, "bool")),
        }
    }

    fn is_zero(&self) -> bool { !*self }
}

impl BsonRep for String {
    fn to_bson(&self) -> Result<Bson, ConversionError> {
        Ok(Bson::String(self.clone()))
    }

    fn into_bson(self) -> Result<Bson, ConversionError> { Ok(Bson::String(self)) }

    fn from_bson(bs: Bson) -> Result<Self, ConversionError> {
        match bs {
            Bson::String(s) => Ok(s),
            Bson::Symbol(s) => Ok(s.0),
            // Text stored as generic or obsolete binary reads back as text.
            Bson::Binary(b)
                if b.subtype == SUBTYPE_GENERIC || b.subtype == SUBTYPE_BINARY_OLD =>
            {
                Ok(String::from_utf8_lossy(b.bytes.as_ref()).into_owned())
            }
            other => Err(mismatch(&other, "String")),
        }
    }

    fn is_zero(&self) -> bool { self.is_empty() }
}

impl BsonRep for Bytes {
    fn to_bson(&self) -> Result<Bson, ConversionError> {
        Ok(Bson::Binary(Binary { subtype: SUBTYPE_GENERIC, bytes: self.clone() }))
    }

    fn from_bson(bs: Bson) -> Result<Self, ConversionError> {
        match bs {
            Bson::Binary(b) => Ok(b.bytes),
            Bson::String(s) => Ok(Bytes::from(s.into_bytes())),
            other => Err(mismatch(&other, "Bytes")),
        }
    }

    fn is_zero(&self) -> bool { self.is_empty() }
}

impl BsonRep for Binary {
    fn to_bson(&self) -> Result<Bson, ConversionError> {
        Ok(Bson::Binary(self.clone()))
    }

    fn from_bson(bs: Bson) -> Result<Self, ConversionError> {
        match bs {
            Bson::Binary(b) => Ok(b),
            Bson::String(s) => Ok(Binary {
                subtype: SUBTYPE_GENERIC,
                bytes:   Bytes::from(s.into_bytes()),
            }),
            other => Err(mismatch(&other, "Binary")),
        }
    }

    fn is_zero(&self) -> bool {
        self.subtype == SUBTYPE_GENERIC && self.bytes.is_empty()
    }
}

impl BsonRep for Symbol {
    fn to_bson(&self) -> Result<Bson, ConversionError> {
        Ok(Bson::Symbol(self.clone()))
    }

    fn from_bson(bs: Bson) -> Result<Self, ConversionError> {
        match bs {
            Bson::Symbol(s) => Ok(s),
            Bson::String(s) => Ok(Symbol(s)),
            other => Err(mismatch(&other, "Symbol")),
        }
    }

    fn is_zero(&self) -> bool { self.0.is_empty() }
}

impl BsonRep for ObjectId {
    fn to_bson(&self) -> Result<Bson, ConversionError> { Ok(Bson::ObjectId(*self)) }

    fn from_bson(bs: Bson) -> Result<Self, ConversionError> {
        match bs {
            Bson::ObjectId(id) => Ok(id),
            other => Err(mismatch(&other, "ObjectId")),
        }
    }

    fn is_zero(&self) -> bool { ObjectId::is_zero(self) }
}

impl BsonRep for UtcDatetime {
    fn to_bson(&self) -> Result<Bson, ConversionError> {
        Ok(Bson::UtcDatetime(*self))
    }

    fn from_bson(bs: Bson) -> Result<Self, ConversionError> {
        match bs {
            Bson::UtcDatetime(t) => Ok(t),
            other => Err(mismatch(&other, "UTCDateTime")),
        }
    }

    fn is_zero(&self) -> bool { self.0 == 0 }
}

impl BsonRep for DateTime<Utc> {
    fn to_bson(&self) -> Result<Bson, ConversionError> {
        Ok(Bson::UtcDatetime(UtcDatetime::from(*self)))
    }

    fn from_bson(bs: Bson) -> Result<Self, ConversionError> {
        match bs {
            Bson::UtcDatetime(t) => t
                .to_chrono()
                .ok_or(ConversionError::TypeMismatch("UTCDateTime", "DateTime<Utc>")),
            other => Err(mismatch(&other, "DateTime<Utc>")),
        }
    }
}

impl BsonRep for Timestamp {
    fn to_bson(&self) -> Result<Bson, ConversionError> { Ok(Bson::Timestamp(*self)) }

    fn from_bson(bs: Bson) -> Result<Self, ConversionError> {
        match bs {
            Bson::Timestamp(ts) => Ok(ts),
            other => Err(mismatch(&other, "Timestamp")),
        }
    }

    fn is_zero(&self) -> bool { self.time == 0 && self.increment == 0 }
}

impl BsonRep for RegEx {
    fn to_bson(&self) -> Result<Bson, ConversionError> { Ok(Bson::RegEx(self.clone())) }

    fn from_bson(bs: Bson) -> Result<Self, ConversionError> {
        match bs {
            Bson::RegEx(r) => Ok(r),
            other => Err(mismatch(&other, "RegEx")),
        }
    }
}

impl BsonRep for DbPointer {
    fn to_bson(&self) -> Result<Bson, ConversionError> {
        Ok(Bson::DbPointer(self.clone()))
    }

    fn from_bson(bs: Bson) -> Result<Self, ConversionError> {
        match bs {
            Bson::DbPointer(p) => Ok(p),
            other => Err(mismatch(&other, "DBPointer")),
        }
    }
}

impl BsonRep for JavaScript {
    fn to_bson(&self) -> Result<Bson, ConversionError> {
        Ok(Bson::JavaScript(self.clone()))
    }

    fn from_bson(bs: Bson) -> Result<Self, ConversionError> {
        match bs {
            Bson::JavaScript(js) => Ok(js),
            other => Err(mismatch(&other, "JavaScript")),
        }
    }
}

impl BsonRep for RawBson {
    fn to_bson(&self) -> Result<Bson, ConversionError> {
        Ok(Bson::Raw(self.clone()))
    }

    fn from_bson(bs: Bson) -> Result<Self, ConversionError> { RawBson::capture(&bs) }

    fn is_zero(&self) -> bool { self.kind == 0x00 && self.data.is_empty() }
}

impl BsonRep for Bson {
    fn to_bson(&self) -> Result<Bson, ConversionError> { Ok(self.clone()) }

    fn into_bson(self) -> Result<Bson, ConversionError> { Ok(self) }

    fn from_bson(bs: Bson) -> Result<Self, ConversionError> { Ok(bs) }

    fn is_zero(&self) -> bool { self.is_null() }
}

impl BsonRep for Document {
    fn to_bson(&self) -> Result<Bson, ConversionError> {
        Ok(Bson::Document(self.clone()))
    }

    fn into_bson(self) -> Result<Bson, ConversionError> { Ok(Bson::Document(self)) }

    fn from_bson(bs: Bson) -> Result<Self, ConversionError> {
        match bs {
            Bson::Document(d) => Ok(d),
            other => Err(mismatch(&other, "Document")),
        }
    }

    fn is_zero(&self) -> bool { self.is_empty() }
}

impl<T: BsonRep> BsonRep for Vec<T> {
    fn to_bson(&self) -> Result<Bson, ConversionError> {
        let items: Result<Vec<Bson>, ConversionError> =
            self.iter().map(T::to_bson).collect();
        Ok(Bson::Array(items?))
    }

    fn from_bson(bs: Bson) -> Result<Self, ConversionError> {
        match bs {
            Bson::Array(items) => items.into_iter().map(T::from_bson).collect(),
            other => Err(mismatch(&other, "array")),
        }
    }

    fn is_zero(&self) -> bool { self.is_empty() }
}

impl<T: BsonRep, S: BuildHasher + Default> BsonRep for HashMap<String, T, S> {
    fn to_bson(&self) -> Result<Bson, ConversionError> {
        let mut doc = Document::with_capacity(self.len());
        for (k, v) in self.iter() {
            doc.push(k.clone(), v.to_bson()?);
        }
        Ok(Bson::Document(doc))
    }

    fn from_bson(bs: Bson) -> Result<Self, ConversionError> {
        match bs {
            Bson::Document(d) => {
                let mut out = HashMap::with_capacity_and_hasher(d.len(), S::default());
                for (k, v) in d {
                    out.insert(k, T::from_bson(v)?);
                }
                Ok(out)
            }
            other => Err(mismatch(&other, "map")),
        }
    }

    fn is_zero(&self) -> bool { self.is_empty() }
}

impl<T: BsonRep> BsonRep for Box<T> {
    fn to_bson(&self) -> Result<Bson, ConversionError> { (**self).to_bson() }

    fn into_bson(self) -> Result<Bson, ConversionError> { (*self).into_bson() }

    fn from_bson(bs: Bson) -> Result<Self, ConversionError> {
        T::from_bson(bs).map(Box::new)
    }

    fn is_zero(&self) -> bool { (**self).is_zero() }
}

impl<T: BsonRep> BsonRep for Option<T> {
    fn to_bson(&self) -> Result<Bson, ConversionError> {
        match self {
            None => Ok(Bson::Null),
            Some(v) => v.to_bson(),
        }
    }

    fn from_bson(bs: Bson) -> Result<Self, ConversionError> {
        match bs {
            Bson::Null | Bson::Undefined => Ok(None),
            other => match T::from_bson(other) {
                Ok(v) => Ok(Some(v)),
                // A mismatched kind leaves the slot unset rather than
                // failing, keeping absent and present-but-wrong
                // distinguishable from set.
                Err(ConversionError::TypeMismatch(..)) => Ok(None),
                Err(e) => Err(e),
            },
        }
    }

    fn is_zero(&self) -> bool { self.is_none() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    #[test]
    fn unsigned_width_selection() {
        assert_eq!(258u64.to_bson(), Ok(Bson::Int32(258)));
        assert_eq!((1u64 << 31).to_bson(), Ok(Bson::Int64(1 << 31)));
        assert_eq!(
            (1u64 << 63).to_bson(),
            Err(ConversionError::Uint64Overflow(1 << 63))
        );
        assert_eq!((u32::max_value()).to_bson(), Ok(Bson::Int64(4294967295)));
    }

    #[test]
    fn minsize_width_selection() {
        assert_eq!(1i64.to_bson_minsize(), Ok(Bson::Int32(1)));
        assert_eq!((1i64 << 30).to_bson_minsize(), Ok(Bson::Int32(1 << 30)));
        assert_eq!((1i64 << 31).to_bson_minsize(), Ok(Bson::Int64(1 << 31)));
        assert_eq!((-1i64).to_bson_minsize(), Ok(Bson::Int32(-1)));
        assert_eq!(i64::min_value().to_bson_minsize(), Ok(Bson::Int64(i64::min_value())));
        assert_eq!((1u64 << 31).to_bson_minsize(), Ok(Bson::Int64(1 << 31)));
    }

    #[test]
    fn numeric_coercions() {
        assert_eq!(i8::from_bson(Bson::Int32(42)), Ok(42i8));
        assert_eq!(i64::from_bson(Bson::Int32(42)), Ok(42i64));
        assert_eq!(f64::from_bson(Bson::Int64(42)), Ok(42.0));
        assert_eq!(u32::from_bson(Bson::Double(42.0)), Ok(42u32));
        assert_eq!(i32::from_bson(Bson::Bool(true)), Ok(1));
        assert_eq!(bool::from_bson(Bson::Int64(2)), Ok(true));
        assert_eq!(bool::from_bson(Bson::Double(0.0)), Ok(false));
        assert_eq!(
            i64::from_bson(Bson::UtcDatetime(UtcDatetime(258))),
            Ok(258)
        );
        assert_eq!(
            i32::from_bson(Bson::String("x".to_string())),
            Err(ConversionError::TypeMismatch("String", "i32"))
        );
    }

    #[test]
    fn string_coercions() {
        assert_eq!(
            String::from_bson(Bson::Symbol(Symbol("sym".to_string()))),
            Ok("sym".to_string())
        );
        let b = Binary { subtype: 0x00, bytes: Bytes::from(&b"abc"[..]) };
        assert_eq!(String::from_bson(Bson::Binary(b)), Ok("abc".to_string()));
        let b = Binary { subtype: 0x80, bytes: Bytes::from(&b"abc"[..]) };
        assert_eq!(
            String::from_bson(Bson::Binary(b)),
            Err(ConversionError::TypeMismatch("Binary", "String"))
        );
        assert_eq!(
            Bytes::from_bson(Bson::String("abc".to_string())),
            Ok(Bytes::from(&b"abc"[..]))
        );
    }

    #[test]
    fn option_does_not_materialize_on_mismatch() {
        assert_eq!(Option::<i32>::from_bson(Bson::Null), Ok(None));
        assert_eq!(
            Option::<u8>::from_bson(Bson::String("s".to_string())),
            Ok(None)
        );
        assert_eq!(Option::<i32>::from_bson(Bson::Int32(3)), Ok(Some(3)));
    }

    #[test]
    fn zero_probes() {
        assert!(0i32.is_zero());
        assert!(!1i32.is_zero());
        assert!("".to_string().is_zero());
        assert!(Vec::<i32>::new().is_zero());
        assert!(Option::<bool>::None.is_zero());
        assert!(Bson::Null.is_zero());
        assert!(RawBson::default().is_zero());
        assert!(!RawBson::new(0x0A, vec![]).is_zero());
    }

    #[test]
    fn map_round_trip() {
        let mut m: HashMap<String, i32> = HashMap::default();
        m.insert("a".to_string(), 1);
        let bs = m.to_bson().unwrap();
        assert_eq!(bs, Bson::Document(doc! { "a" => 1i32 }));
        assert_eq!(HashMap::<String, i32>::from_bson(bs).unwrap(), m);
    }
}
