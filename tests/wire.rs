//! Byte-level wire format tests: golden vectors for every element kind,
//! one-way encodings, and the corruption corpus.

use bson::prelude::*;

/// Wraps the document elements in `data` with the int32 length prefix and
/// the closing NUL.
fn wrap_in_doc(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 5);
    out.extend_from_slice(&((data.len() + 5) as i32).to_le_bytes());
    out.extend_from_slice(data);
    out.push(0x00);
    out
}

fn oid(bytes: &[u8; 12]) -> ObjectId { ObjectId::from(*bytes) }

/// Every element kind, keyed "_", without the document framing.
fn all_items() -> Vec<(Document, &'static [u8])> {
    vec![
        (doc! {}, b""),
        (doc! { "_" => 5.05f64 }, b"\x01_\x00333333\x14@"),
        (doc! { "_" => "yo" }, b"\x02_\x00\x03\x00\x00\x00yo\x00"),
        (
            doc! { "_" => doc! { "a" => true } },
            b"\x03_\x00\x09\x00\x00\x00\x08a\x00\x01\x00",
        ),
        (
            doc! { "_" => vec![Bson::Bool(true), Bson::Bool(false)] },
            b"\x04_\x00\x0d\x00\x00\x00\x080\x00\x01\x081\x00\x00\x00",
        ),
        (
            doc! { "_" => Binary { subtype: 0x00, bytes: Bytes::from(&b"yo"[..]) } },
            b"\x05_\x00\x02\x00\x00\x00\x00yo",
        ),
        (
            doc! { "_" => Binary { subtype: 0x80, bytes: Bytes::from(&b"udef"[..]) } },
            b"\x05_\x00\x04\x00\x00\x00\x80udef",
        ),
        (doc! { "_" => Bson::Undefined }, b"\x06_\x00"),
        (doc! { "_" => oid(b"0123456789ab") }, b"\x07_\x000123456789ab"),
        (
            doc! { "_" => DbPointer {
                namespace: "testnamespace".to_string(),
                id:        oid(b"0123456789ab"),
            } },
            b"\x0C_\x00\x0e\x00\x00\x00testnamespace\x000123456789ab",
        ),
        (doc! { "_" => false }, b"\x08_\x00\x00"),
        (doc! { "_" => true }, b"\x08_\x00\x01"),
        (
            doc! { "_" => UtcDatetime(258) },
            b"\x09_\x00\x02\x01\x00\x00\x00\x00\x00\x00",
        ),
        (doc! { "_" => Bson::Null }, b"\x0A_\x00"),
        (
            doc! { "_" => RegEx { pattern: "ab".to_string(), options: "cd".to_string() } },
            b"\x0B_\x00ab\x00cd\x00",
        ),
        (
            doc! { "_" => JavaScript { code: "code".to_string(), scope: None } },
            b"\x0D_\x00\x05\x00\x00\x00code\x00",
        ),
        (
            doc! { "_" => Symbol("sym".to_string()) },
            b"\x0E_\x00\x04\x00\x00\x00sym\x00",
        ),
        (
            doc! { "_" => JavaScript {
                code:  "code".to_string(),
                scope: Some(doc! { "" => Bson::Null }),
            } },
            b"\x0F_\x00\x14\x00\x00\x00\x05\x00\x00\x00code\x00\x07\x00\x00\x00\x0A\x00\x00",
        ),
        (doc! { "_" => 258i32 }, b"\x10_\x00\x02\x01\x00\x00"),
        (
            doc! { "_" => Timestamp { time: 0, increment: 258 } },
            b"\x11_\x00\x02\x01\x00\x00\x00\x00\x00\x00",
        ),
        (doc! { "_" => 258i64 }, b"\x12_\x00\x02\x01\x00\x00\x00\x00\x00\x00"),
        (
            doc! { "_" => 258i64 << 32 },
            b"\x12_\x00\x00\x00\x00\x00\x02\x01\x00\x00",
        ),
        (doc! { "_" => Bson::MaxKey }, b"\x7F_\x00"),
        (doc! { "_" => Bson::MinKey }, b"\xFF_\x00"),
    ]
}

#[test]
fn marshal_all_items() {
    for (i, (doc, data)) in all_items().into_iter().enumerate() {
        let out = marshal(&doc).unwrap();
        assert_eq!(out, wrap_in_doc(data), "failed on item {}", i);
    }
}

#[test]
fn unmarshal_all_items() {
    for (i, (doc, data)) in all_items().into_iter().enumerate() {
        let parsed: Document = unmarshal(&wrap_in_doc(data)).unwrap();
        assert_eq!(parsed, doc, "failed on item {}", i);
    }
}

#[test]
fn unmarshal_raw_all_items() {
    for (i, (doc, data)) in all_items().into_iter().enumerate() {
        if data.is_empty() {
            continue;
        }
        // Strip the tag byte and the "_\x00" name to get the element body.
        let raw = RawBson::new(data[0], data[3..].to_vec());
        let value: Bson = raw.unmarshal().unwrap();
        assert_eq!(Some(&value), doc.get("_"), "failed on item {}", i);
    }
}

#[test]
fn length_prefix_and_terminator_invariant() {
    for (doc, _) in all_items() {
        let out = marshal(&doc).unwrap();
        let prefix = i32::from_le_bytes([out[0], out[1], out[2], out[3]]);
        assert_eq!(prefix as usize, out.len());
        assert_eq!(*out.last().unwrap(), 0x00);
    }
}

#[test]
fn one_way_marshal_items() {
    let items: Vec<(Document, &[u8])> = vec![
        // No 32-bit float on the wire; f32 widens to a double.
        (doc! { "" => 5.05f32 }, b"\x01\x00\x00\x00\x00@33\x14@"),
        // Unsigned integers pick the narrowest kind their value fits.
        (doc! { "" => Bson::from(8i32) }, b"\x10\x00\x08\x00\x00\x00"),
        (doc! { "" => 258u32.to_bson().unwrap() }, b"\x10\x00\x02\x01\x00\x00"),
        (
            doc! { "" => u32::max_value().to_bson().unwrap() },
            b"\x12\x00\xFF\xFF\xFF\xFF\x00\x00\x00\x00",
        ),
        (
            doc! { "" => (1u64 << 33).to_bson().unwrap() },
            b"\x12\x00\x00\x00\x00\x00\x02\x00\x00\x00",
        ),
    ];
    for (i, (doc, data)) in items.into_iter().enumerate() {
        let out = marshal(&doc).unwrap();
        assert_eq!(out, wrap_in_doc(data), "failed on item {}", i);
    }
}

#[test]
fn uint64_overflow_is_an_error() {
    let err = (1u64 << 63).to_bson().unwrap_err();
    assert_eq!(err, ConversionError::Uint64Overflow(1 << 63));
}

#[test]
fn old_binary_decodes_with_and_without_inner_length() {
    let expected = doc! {
        "_" => Binary { subtype: 0x02, bytes: Bytes::from(&b"old"[..]) }
    };
    // Well-formed: redundant inner length present.
    let with_len = wrap_in_doc(b"\x05_\x00\x07\x00\x00\x00\x02\x03\x00\x00\x00old");
    let parsed: Document = unmarshal(&with_len).unwrap();
    assert_eq!(parsed, expected);
    // Seen in the wild: inner length missing entirely.
    let without_len = wrap_in_doc(b"\x05_\x00\x03\x00\x00\x00\x02old");
    let parsed: Document = unmarshal(&without_len).unwrap();
    assert_eq!(parsed, expected);
    // Re-encoding always writes the canonical form.
    assert_eq!(marshal(&parsed).unwrap(), with_len);
}

#[test]
fn corrupted_documents() {
    let corpus: Vec<Vec<u8>> = vec![
        // Document shorter than minimum.
        b"\x04\x00\x00\x00\x00".to_vec(),
        // Not enough data.
        b"\x06\x00\x00\x00\x00".to_vec(),
        // Broken length.
        b"\x05\x00\x00".to_vec(),
        // Corrupted termination.
        b"\x05\x00\x00\x00\xff".to_vec(),
        // Unfinished cstring.
        b"\x0A\x00\x00\x00\x0Aooop\x00".to_vec(),
        // Array end past end of buffer.
        wrap_in_doc(b"\x04\x00\x09\x00\x00\x00\x0A\x00\x00"),
        // Array end within buffer, but past where it should be.
        wrap_in_doc(b"\x04\x00\x08\x00\x00\x00\x0A\x00\x00"),
        // Document end within buffer, but past where it should be.
        wrap_in_doc(b"\x03\x00\x08\x00\x00\x00\x0A\x00\x00"),
        // String with corrupted end.
        wrap_in_doc(b"\x02\x00\x03\x00\x00\x00yo\xFF"),
        // String with negative length.
        b"\x0c\x00\x00\x00\x02x\x00\xff\xff\xff\xff\x00".to_vec(),
        // String with zero length (must count the trailing NUL).
        b"\x0c\x00\x00\x00\x02x\x00\x00\x00\x00\x00\x00".to_vec(),
        // Binary with negative length.
        b"\x0d\x00\x00\x00\x05x\x00\xff\xff\xff\xff\x00\x00".to_vec(),
    ];
    for (i, data) in corpus.iter().enumerate() {
        let err = unmarshal::<Document>(data).unwrap_err();
        match err {
            DecodeError::Corrupted(_) => {}
            other => panic!("item {} should be corrupted, got {:?}", i, other),
        }
    }
}

#[test]
fn boolean_bytes_other_than_zero_and_one_are_corrupt() {
    let err = unmarshal::<Document>(&wrap_in_doc(b"\x08b\x00\x02")).unwrap_err();
    assert_eq!(err, DecodeError::Corrupted("encoded boolean must be 1 or 0"));
}

#[test]
fn unknown_element_kind() {
    let err = unmarshal::<Document>(&wrap_in_doc(b"\xEEname\x00")).unwrap_err();
    assert_eq!(err, DecodeError::UnknownElementKind(0xEE));
}

#[test]
fn depth_cap_rejects_hostile_nesting() {
    // 300 nested documents under single-character names.
    let mut data = wrap_in_doc(b"");
    for _ in 0..300 {
        let mut elems = Vec::new();
        elems.push(0x03);
        elems.extend_from_slice(b"d\x00");
        elems.extend_from_slice(&data);
        data = wrap_in_doc(&elems);
    }
    assert_eq!(unmarshal::<Document>(&data).unwrap_err(), DecodeError::DepthExceeded);
}

#[test]
fn unordered_map_round_trip() {
    let mut m: HashMap<String, Bson> = HashMap::default();
    m.insert("a".to_string(), Bson::Int32(1));
    m.insert("b".to_string(), Bson::String("two".to_string()));
    let data = marshal(&m).unwrap();
    let back: HashMap<String, Bson> = unmarshal(&data).unwrap();
    assert_eq!(back, m);
}

#[test]
fn map_destination_is_fresh() {
    // Unmarshal produces a new map; nothing of any previous value survives.
    let data = marshal(&doc! { "b" => 2i32 }).unwrap();
    let m: HashMap<String, Bson> = unmarshal(&data).unwrap();
    assert_eq!(m.len(), 1);
    assert_eq!(m.get("b"), Some(&Bson::Int32(2)));
}

#[test]
fn ordered_document_preserves_wire_order() {
    let data = wrap_in_doc(b"\x0Aa\x00\x0Ac\x00\x0Ab\x00\x08d\x00\x01");
    let doc: Document = unmarshal(&data).unwrap();
    let keys: Vec<&str> = doc.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, ["a", "c", "b", "d"]);
    assert_eq!(marshal(&doc).unwrap(), data);
}

#[test]
fn lazy_raw_document_capture() {
    let data = marshal(&doc! { "x" => vec![Bson::Int32(1), Bson::Int32(2)] }).unwrap();
    let raw = RawBson::from_doc_bytes(&data).unwrap();
    assert_eq!(raw.kind, 0x03);
    // Splicing the capture back out reproduces the input exactly.
    assert_eq!(marshal(&raw).unwrap(), data);
    let doc: Document = raw.unmarshal().unwrap();
    assert_eq!(marshal(&doc).unwrap(), data);
}
