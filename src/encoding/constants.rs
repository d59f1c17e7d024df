/// 64-bit IEEE-754 double, 0x01.
pub(crate) const TAG_DOUBLE: u8 = 0x01;
/// Length-prefixed UTF-8 string, 0x02.
pub(crate) const TAG_STRING: u8 = 0x02;
/// Embedded document, 0x03.
pub(crate) const TAG_DOCUMENT: u8 = 0x03;
/// Array (document keyed by decimal indices), 0x04.
pub(crate) const TAG_ARRAY: u8 = 0x04;
/// Binary blob with a subtype byte, 0x05.
pub(crate) const TAG_BINARY: u8 = 0x05;
/// Undefined (deprecated, still decoded), 0x06.
pub(crate) const TAG_UNDEFINED: u8 = 0x06;
/// 12-byte ObjectId, 0x07.
pub(crate) const TAG_OBJECT_ID: u8 = 0x07;
/// Boolean, 0x08.
pub(crate) const TAG_BOOL: u8 = 0x08;
/// Milliseconds since the Unix epoch, 0x09.
pub(crate) const TAG_UTC_DATETIME: u8 = 0x09;
/// Null, 0x0A.
pub(crate) const TAG_NULL: u8 = 0x0A;
/// Regular expression (two cstrings), 0x0B.
pub(crate) const TAG_REGEX: u8 = 0x0B;
/// DBPointer (deprecated, still decoded), 0x0C.
pub(crate) const TAG_DB_POINTER: u8 = 0x0C;
/// JavaScript code without scope, 0x0D.
pub(crate) const TAG_JAVASCRIPT: u8 = 0x0D;
/// Symbol (deprecated, still decoded), 0x0E.
pub(crate) const TAG_SYMBOL: u8 = 0x0E;
/// JavaScript code with a scope document, 0x0F.
pub(crate) const TAG_JAVASCRIPT_SCOPE: u8 = 0x0F;
/// 32-bit little-endian integer, 0x10.
pub(crate) const TAG_INT32: u8 = 0x10;
/// Internal timestamp (two 32-bit ordinals), 0x11.
pub(crate) const TAG_TIMESTAMP: u8 = 0x11;
/// 64-bit little-endian integer, 0x12.
pub(crate) const TAG_INT64: u8 = 0x12;
/// MaxKey, 0x7F.
pub(crate) const TAG_MAX_KEY: u8 = 0x7F;
/// MinKey, 0xFF.
pub(crate) const TAG_MIN_KEY: u8 = 0xFF;

/// Generic binary subtype.
pub(crate) const SUBTYPE_GENERIC: u8 = 0x00;
/// Obsolete binary subtype that repeats the payload length inside the
/// payload itself.
pub(crate) const SUBTYPE_BINARY_OLD: u8 = 0x02;

/// The empty document: a length prefix counting itself plus the closing NUL.
pub(crate) const MIN_DOC_LEN: i32 = 5;

/// Documents nested deeper than this are treated as hostile input.
pub(crate) const MAX_DEPTH: usize = 200;

/// Kinds whose payload is legitimately empty.
pub(crate) fn payloadless(tag: u8) -> bool {
    match tag {
        TAG_UNDEFINED | TAG_NULL | TAG_MAX_KEY | TAG_MIN_KEY => true,
        _ => false,
    }
}
