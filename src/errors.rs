//! Error types for the three layers of the codec: the wire decoder, the wire
//! encoder, and the value conversion layer that sits between user types and
//! [`Bson`](crate::Bson).

use failure::Fail;

/// Errors produced while parsing a BSON byte stream.
#[derive(Clone, Debug, Fail, PartialEq)]
pub enum DecodeError {
    /// The byte stream violates the framing rules: truncated buffer, bad or
    /// mismatched length prefix, missing NUL terminator, boolean byte other
    /// than 0 or 1, or a negative length field.
    #[fail(display = "Document is corrupted: {}", _0)]
    Corrupted(&'static str),

    /// An element carried a type tag this codec does not know about.
    #[fail(display = "Unknown element kind (0x{:02X})", _0)]
    UnknownElementKind(u8),

    /// Documents nested deeper than the decoder is willing to follow.
    #[fail(display = "document nesting exceeds the depth limit")]
    DepthExceeded,

    /// The bytes parsed fine but could not be converted into the requested
    /// destination type.
    #[fail(display = "{}", _0)]
    Conversion(ConversionError),
}

/// Errors produced while emitting a BSON byte stream.
#[derive(Clone, Debug, Fail, PartialEq)]
pub enum EncodeError {
    /// The marshal root does not represent a document.
    #[fail(display = "can't marshal {} as a BSON document", _0)]
    NotADocument(&'static str),

    /// A raw value used as the marshal root carried a non-document kind.
    #[fail(display = "attempted to marshal raw kind 0x{:02X} as a document", _0)]
    RawNotDocument(u8),

    /// A raw value with no payload bytes where a payload is mandatory.
    #[fail(display = "attempted to marshal an empty raw value")]
    RawEmpty,

    /// The value could not be converted into its wire representation.
    #[fail(display = "{}", _0)]
    Conversion(ConversionError),
}

/// Errors produced while converting between user values and [`Bson`].
///
/// [`Bson`]: crate::Bson
#[derive(Clone, Debug, Fail, PartialEq)]
pub enum ConversionError {
    /// The wire kind cannot be coerced into the destination type.
    #[fail(display = "BSON {} isn't compatible with {}", _0, _1)]
    TypeMismatch(&'static str, &'static str),

    /// BSON has no unsigned 64-bit kind; values at or above `1 << 63` do not
    /// fit an Int64 either.
    #[fail(
        display = "BSON has no uint64 type, and {} is too large to fit correctly in an int64",
        _0
    )]
    Uint64Overflow(u64),

    /// ObjectId constructor received a byte slice whose length is not 12.
    #[fail(display = "ObjectIds must be exactly 12 bytes long (got {})", _0)]
    ObjectIdBadLength(usize),

    /// ObjectId hex constructor received a malformed string.
    #[fail(display = "invalid ObjectId hex: {:?}", _0)]
    ObjectIdBadHex(String),

    /// An `inline` field whose representation is not a document.
    #[fail(display = "inline field needs a struct value or string-keyed map, got {}", _0)]
    InlineMisuse(&'static str),

    /// An inlined entry collides with a sibling field of the same record.
    #[fail(display = "can't have key {:?} in inlined map; conflicts with a sibling field", _0)]
    InlineNameConflict(String),

    /// A raw element was unmarshaled into a type that cannot hold its kind.
    #[fail(display = "BSON kind 0x{:02X} isn't compatible with {}", _0, _1)]
    RawIncompatible(u8, &'static str),

    /// Sentinel returned by [`Setter`](crate::rep::Setter) hooks to request
    /// that the destination slot be zeroed instead of assigned.
    #[fail(display = "slot should be set to its zero value")]
    SetZero,

    /// A user hook failed; the message propagates unchanged.
    #[fail(display = "{}", _0)]
    Message(String),

    /// A raw sub-decode failed below the conversion layer.
    #[fail(display = "{}", _0)]
    Decode(Box<DecodeError>),
}

impl From<ConversionError> for DecodeError {
    fn from(e: ConversionError) -> DecodeError { DecodeError::Conversion(e) }
}

impl From<ConversionError> for EncodeError {
    fn from(e: ConversionError) -> EncodeError { EncodeError::Conversion(e) }
}

impl From<DecodeError> for ConversionError {
    fn from(e: DecodeError) -> ConversionError { ConversionError::Decode(Box::new(e)) }
}
