use super::constants::*;
use crate::{errors::EncodeError, util::u64_to_decimal_digits, Bson, Document};

/// Byte-oriented serializer over the output buffer.
///
/// Documents are length-prefixed, so the writer works against a growable
/// buffer that supports backpatching; every prefix is reserved up front and
/// filled in by [`finish_document`] once the payload length is known.
pub(crate) trait SerializerBytes {
    /// Add a byte to the output.
    fn put_byte(&mut self, u: u8);

    /// Add a slice to the output.
    fn put_buf(&mut self, buf: &[u8]);

    /// Add a little-endian `i32` to the output.
    fn put_i32(&mut self, i: i32) { self.put_buf(&i.to_le_bytes()) }

    /// Add a little-endian `i64` to the output.
    fn put_i64(&mut self, i: i64) { self.put_buf(&i.to_le_bytes()) }

    /// Add a little-endian `u64` to the output.
    fn put_u64(&mut self, u: u64) { self.put_buf(&u.to_le_bytes()) }

    /// Add a little-endian IEEE-754 double to the output.
    fn put_f64(&mut self, f: f64) { self.put_u64(f.to_bits()) }

    /// Add a NUL-terminated name to the output.
    fn put_cstring(&mut self, s: &[u8]) {
        self.put_buf(s);
        self.put_byte(0x00);
    }

    /// Add a length-prefixed, NUL-terminated string to the output. The
    /// prefix counts the trailing NUL.
    fn put_string(&mut self, s: &str) {
        self.put_i32(s.len() as i32 + 1);
        self.put_buf(s.as_bytes());
        self.put_byte(0x00);
    }
}

impl SerializerBytes for Vec<u8> {
    fn put_byte(&mut self, u: u8) { self.push(u) }

    fn put_buf(&mut self, buf: &[u8]) { self.extend_from_slice(buf) }
}

/// Backpatches the length prefix reserved at `start` with the number of
/// bytes written since, the prefix included.
fn finish_document(out: &mut Vec<u8>, start: usize) {
    let total = (out.len() - start) as i32;
    out[start..start + 4].copy_from_slice(&total.to_le_bytes());
}

/// Emits a complete document: length prefix, elements in order, closing NUL.
pub(crate) fn write_document(out: &mut Vec<u8>, doc: &Document) -> Result<(), EncodeError> {
    let start = out.len();
    out.put_i32(0);
    for (name, value) in doc.iter() {
        write_element(out, name.as_bytes(), value)?;
    }
    out.put_byte(0x00);
    finish_document(out, start);
    Ok(())
}

fn write_array(out: &mut Vec<u8>, items: &[Bson]) -> Result<(), EncodeError> {
    let start = out.len();
    out.put_i32(0);
    for (i, value) in items.iter().enumerate() {
        let key = u64_to_decimal_digits(i as u64);
        write_element(out, &key, value)?;
    }
    out.put_byte(0x00);
    finish_document(out, start);
    Ok(())
}

fn write_element(out: &mut Vec<u8>, name: &[u8], value: &Bson) -> Result<(), EncodeError> {
    if let Bson::Raw(raw) = value {
        if raw.data.is_empty() && !payloadless(value.element_type()) {
            return Err(EncodeError::RawEmpty);
        }
    }
    out.put_byte(value.element_type());
    out.put_cstring(name);
    write_payload(out, value)
}

/// Emits the payload of a single element, without its tag byte or name.
pub(crate) fn write_payload(out: &mut Vec<u8>, value: &Bson) -> Result<(), EncodeError> {
    match value {
        Bson::Double(f) => out.put_f64(*f),
        Bson::String(s) => out.put_string(s),
        Bson::Document(d) => write_document(out, d)?,
        Bson::Array(items) => write_array(out, items)?,
        Bson::Binary(b) => {
            // The obsolete 0x02 subtype repeats the payload length inside
            // the payload.
            if b.subtype == SUBTYPE_BINARY_OLD {
                out.put_i32(b.bytes.len() as i32 + 4);
                out.put_byte(b.subtype);
                out.put_i32(b.bytes.len() as i32);
            } else {
                out.put_i32(b.bytes.len() as i32);
                out.put_byte(b.subtype);
            }
            out.put_buf(b.bytes.as_ref());
        }
        Bson::Undefined | Bson::Null | Bson::MaxKey | Bson::MinKey => {}
        Bson::ObjectId(id) => out.put_buf(&id.bytes()[..]),
        Bson::Bool(b) => out.put_byte(*b as u8),
        Bson::UtcDatetime(t) => out.put_i64(t.0),
        Bson::RegEx(r) => {
            out.put_cstring(r.pattern.as_bytes());
            out.put_cstring(r.options.as_bytes());
        }
        Bson::DbPointer(p) => {
            out.put_string(&p.namespace);
            out.put_buf(&p.id.bytes()[..]);
        }
        Bson::JavaScript(js) => match &js.scope {
            None => out.put_string(&js.code),
            Some(scope) => {
                let start = out.len();
                out.put_i32(0);
                out.put_string(&js.code);
                write_document(out, scope)?;
                finish_document(out, start);
            }
        },
        Bson::Symbol(s) => out.put_string(&s.0),
        Bson::Int32(i) => out.put_i32(*i),
        Bson::Timestamp(ts) => {
            out.put_u64((u64::from(ts.time) << 32) | u64::from(ts.increment))
        }
        Bson::Int64(i) => out.put_i64(*i),
        Bson::Raw(raw) => out.put_buf(raw.data.as_ref()),
    }
    Ok(())
}
