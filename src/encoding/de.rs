use super::constants::*;
use crate::{
    errors::DecodeError, Binary, Bson, DbPointer, Document, JavaScript, ObjectId, RawBson,
    RegEx, Symbol, Timestamp, UtcDatetime,
};
use bytes::{Buf, Bytes};

/// A sequence of bytes with bounds-checked read methods.
///
/// Every reader verifies the remaining length first; running off the end of
/// the buffer is a corruption, not a panic.
pub(crate) trait DeserializerBytes {
    /// Number of unread bytes.
    fn left(&self) -> usize;

    /// Read a single byte.
    fn read_u8(&mut self) -> Result<u8, DecodeError>;

    /// Read four bytes as a little-endian `i32`.
    fn read_i32(&mut self) -> Result<i32, DecodeError>;

    /// Read eight bytes as a little-endian `i64`.
    fn read_i64(&mut self) -> Result<i64, DecodeError>;

    /// Read eight bytes as a little-endian IEEE-754 double.
    fn read_f64(&mut self) -> Result<f64, DecodeError>;

    /// Read a specified number of bytes.
    fn read_many(&mut self, len: usize) -> Result<Vec<u8>, DecodeError>;

    /// Read bytes up to (and consuming) a NUL terminator.
    fn read_cstring(&mut self) -> Result<String, DecodeError>;

    /// Read a length-prefixed, NUL-terminated string.
    fn read_string(&mut self) -> Result<String, DecodeError> {
        let len = self.read_i32()?;
        if len < 1 {
            return Err(DecodeError::Corrupted("string length must be positive"));
        }
        let mut raw = self.read_many(len as usize)?;
        if raw.pop() != Some(0x00) {
            return Err(DecodeError::Corrupted("string missing NUL terminator"));
        }
        Ok(string_from_bytes(raw))
    }
}

impl<B: Buf> DeserializerBytes for B {
    #[inline(always)]
    fn left(&self) -> usize { self.remaining() }

    #[inline(always)]
    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        if self.has_remaining() {
            Ok(self.get_u8())
        } else {
            Err(DecodeError::Corrupted("buffer exhausted"))
        }
    }

    #[inline(always)]
    fn read_i32(&mut self) -> Result<i32, DecodeError> {
        if self.remaining() >= 4 {
            Ok(self.get_i32_le())
        } else {
            Err(DecodeError::Corrupted("buffer exhausted"))
        }
    }

    #[inline(always)]
    fn read_i64(&mut self) -> Result<i64, DecodeError> {
        if self.remaining() >= 8 {
            Ok(self.get_i64_le())
        } else {
            Err(DecodeError::Corrupted("buffer exhausted"))
        }
    }

    #[inline(always)]
    fn read_f64(&mut self) -> Result<f64, DecodeError> {
        if self.remaining() >= 8 {
            Ok(f64::from_bits(self.get_u64_le()))
        } else {
            Err(DecodeError::Corrupted("buffer exhausted"))
        }
    }

    #[inline(always)]
    fn read_many(&mut self, len: usize) -> Result<Vec<u8>, DecodeError> {
        if self.remaining() >= len {
            let mut bts = vec![0; len];
            self.copy_to_slice(&mut bts);
            Ok(bts)
        } else {
            Err(DecodeError::Corrupted("buffer exhausted"))
        }
    }

    fn read_cstring(&mut self) -> Result<String, DecodeError> {
        let mut bts = Vec::new();
        loop {
            if !self.has_remaining() {
                return Err(DecodeError::Corrupted("unterminated cstring"));
            }
            match self.get_u8() {
                0x00 => return Ok(string_from_bytes(bts)),
                b => bts.push(b),
            }
        }
    }
}

/// The wire promises UTF-8 but nothing enforces it at the producer; broken
/// sequences are replaced rather than rejected.
fn string_from_bytes(bts: Vec<u8>) -> String {
    match String::from_utf8(bts) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

/// Parses a complete document: length prefix, elements until the closing
/// NUL, and an exact-length check against the prefix.
pub(crate) fn read_document<D: DeserializerBytes>(
    data: &mut D,
    depth: usize,
) -> Result<Document, DecodeError> {
    let mut doc = Document::new();
    read_elements(data, depth, |name, value| doc.push(name, value))?;
    Ok(doc)
}

fn read_array<D: DeserializerBytes>(
    data: &mut D,
    depth: usize,
) -> Result<Vec<Bson>, DecodeError> {
    let mut items = Vec::new();
    // An array is a document whose keys are ignored; only order matters.
    read_elements(data, depth, |_, value| items.push(value))?;
    Ok(items)
}

fn read_elements<D, F>(data: &mut D, depth: usize, mut push: F) -> Result<(), DecodeError>
where
    D: DeserializerBytes,
    F: FnMut(String, Bson),
{
    if depth > MAX_DEPTH {
        return Err(DecodeError::DepthExceeded);
    }
    let total = data.read_i32()?;
    if total < MIN_DOC_LEN {
        return Err(DecodeError::Corrupted("document length below minimum"));
    }
    let body = total as usize - 4;
    if body > data.left() {
        return Err(DecodeError::Corrupted("document length past end of buffer"));
    }
    let end = data.left() - body;
    loop {
        let tag = data.read_u8()?;
        if tag == 0x00 {
            break;
        }
        let name = data.read_cstring()?;
        let value = read_element(data, tag, depth + 1)?;
        push(name, value);
    }
    if data.left() != end {
        return Err(DecodeError::Corrupted("document length mismatch"));
    }
    Ok(())
}

/// Parses one element payload for a known tag.
pub(crate) fn read_element<D: DeserializerBytes>(
    data: &mut D,
    tag: u8,
    depth: usize,
) -> Result<Bson, DecodeError> {
    match tag {
        TAG_DOUBLE => data.read_f64().map(Bson::Double),
        TAG_STRING => data.read_string().map(Bson::String),
        TAG_DOCUMENT => read_document(data, depth).map(Bson::Document),
        TAG_ARRAY => read_array(data, depth).map(Bson::Array),
        TAG_BINARY => read_binary(data).map(Bson::Binary),
        TAG_UNDEFINED => Ok(Bson::Undefined),
        TAG_OBJECT_ID => {
            let bts = data.read_many(12)?;
            let mut id = [0u8; 12];
            id.copy_from_slice(&bts);
            Ok(Bson::ObjectId(ObjectId::from(id)))
        }
        TAG_BOOL => match data.read_u8()? {
            0x00 => Ok(Bson::Bool(false)),
            0x01 => Ok(Bson::Bool(true)),
            _ => Err(DecodeError::Corrupted("encoded boolean must be 1 or 0")),
        },
        TAG_UTC_DATETIME => data.read_i64().map(|ms| Bson::UtcDatetime(UtcDatetime(ms))),
        TAG_NULL => Ok(Bson::Null),
        TAG_REGEX => {
            let pattern = data.read_cstring()?;
            let options = data.read_cstring()?;
            Ok(Bson::RegEx(RegEx { pattern, options }))
        }
        TAG_DB_POINTER => {
            let namespace = data.read_string()?;
            let bts = data.read_many(12)?;
            let mut id = [0u8; 12];
            id.copy_from_slice(&bts);
            Ok(Bson::DbPointer(DbPointer { namespace, id: ObjectId::from(id) }))
        }
        TAG_JAVASCRIPT => {
            let code = data.read_string()?;
            Ok(Bson::JavaScript(JavaScript { code, scope: None }))
        }
        TAG_SYMBOL => data.read_string().map(|s| Bson::Symbol(Symbol(s))),
        TAG_JAVASCRIPT_SCOPE => {
            let total = data.read_i32()?;
            let body = match (total as i64).checked_sub(4) {
                Some(b) if b > 0 => b as usize,
                _ => return Err(DecodeError::Corrupted("bad code-with-scope length")),
            };
            let before = data.left();
            let code = data.read_string()?;
            let scope = read_document(data, depth)?;
            if before - data.left() != body {
                return Err(DecodeError::Corrupted("code-with-scope length mismatch"));
            }
            Ok(Bson::JavaScript(JavaScript { code, scope: Some(scope) }))
        }
        TAG_INT32 => data.read_i32().map(Bson::Int32),
        TAG_TIMESTAMP => {
            let v = data.read_i64()? as u64;
            Ok(Bson::Timestamp(Timestamp {
                time:      (v >> 32) as u32,
                increment: v as u32,
            }))
        }
        TAG_INT64 => data.read_i64().map(Bson::Int64),
        TAG_MAX_KEY => Ok(Bson::MaxKey),
        TAG_MIN_KEY => Ok(Bson::MinKey),
        unknown => Err(DecodeError::UnknownElementKind(unknown)),
    }
}

fn read_binary<D: DeserializerBytes>(data: &mut D) -> Result<Binary, DecodeError> {
    let len = data.read_i32()?;
    if len < 0 {
        return Err(DecodeError::Corrupted("negative binary length"));
    }
    let subtype = data.read_u8()?;
    let mut bts = data.read_many(len as usize)?;
    // The obsolete 0x02 subtype carries a redundant inner length. Strip it
    // when it is well formed; payloads written without it are still seen in
    // the wild and pass through untouched.
    if subtype == SUBTYPE_BINARY_OLD && bts.len() >= 4 {
        let inner = i32::from_le_bytes([bts[0], bts[1], bts[2], bts[3]]);
        if inner >= 0 && inner as usize == bts.len() - 4 {
            bts.drain(..4);
        }
    }
    Ok(Binary { subtype, bytes: Bytes::from(bts) })
}

/// Used by [`RawBson`](crate::RawBson) to parse a captured element body.
pub(crate) fn element_from_raw(raw: &RawBson) -> Result<Bson, DecodeError> {
    use bytes::IntoBuf;

    let kind = if raw.kind == 0x00 { TAG_DOCUMENT } else { raw.kind };
    let mut buf = raw.data.as_ref().into_buf();
    let value = read_element(&mut buf, kind, 0)?;
    if buf.left() != 0 {
        return Err(DecodeError::Corrupted("trailing bytes after element"));
    }
    Ok(value)
}
