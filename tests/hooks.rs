//! Getter/Setter hook behavior: replacement values on encode, raw element
//! delivery on decode, the SetZero sentinel, and error propagation.

use bson::prelude::*;

/// Wraps a document body with its length prefix and closing NUL.
fn wrap_in_doc(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 5);
    out.extend_from_slice(&((data.len() + 5) as i32).to_le_bytes());
    out.extend_from_slice(data);
    out.push(0x00);
    out
}

/// Encodes as a one-field document and decodes from one, whatever the
/// element kind was.
#[derive(Clone, Debug, Default, PartialEq)]
struct WrappedInt(i64);

impl Getter for WrappedInt {
    fn get_bson(&self) -> Result<Bson, ConversionError> {
        Ok(Bson::Document(doc! { "a" => self.0 }))
    }
}

impl Setter for WrappedInt {
    fn set_bson(raw: RawBson) -> Result<WrappedInt, ConversionError> {
        let doc: Document = raw.unmarshal()?;
        let a = doc.get("a").and_then(Bson::to_i64).unwrap_or(0);
        Ok(WrappedInt(a))
    }
}

hooked_rep!(WrappedInt);

#[test]
fn getter_replaces_the_representation() {
    #[derive(BsonRep, Clone, Debug, Default, PartialEq)]
    struct T {
        v: WrappedInt,
    }

    let m: HashMap<String, Bson> = unmarshal(&marshal(&T { v: WrappedInt(42) }).unwrap()).unwrap();
    assert_eq!(m.get("v"), Some(&Bson::Document(doc! { "a" => 42i64 })));
}

#[test]
fn getter_works_at_the_root() {
    let data = marshal(&WrappedInt(42)).unwrap();
    assert_eq!(data, marshal(&doc! { "a" => 42i64 }).unwrap());
}

#[test]
fn setter_receives_the_raw_element() {
    #[derive(BsonRep, Clone, Debug, Default, PartialEq)]
    struct T {
        v: WrappedInt,
    }

    let data = marshal(&doc! { "v" => doc! { "a" => 42i64 } }).unwrap();
    let t: T = unmarshal(&data).unwrap();
    assert_eq!(t.v, WrappedInt(42));
}

#[test]
fn setter_receives_the_whole_document_at_the_root() {
    let data = marshal(&doc! { "a" => 7i64 }).unwrap();
    let v: WrappedInt = unmarshal(&data).unwrap();
    assert_eq!(v, WrappedInt(7));
}

/// Keeps whatever element kind it was handed.
#[derive(Clone, Debug, Default, PartialEq)]
struct AnyValue(Option<Bson>);

impl Getter for AnyValue {
    fn get_bson(&self) -> Result<Bson, ConversionError> {
        Ok(self.0.clone().unwrap_or(Bson::Null))
    }
}

impl Setter for AnyValue {
    fn set_bson(raw: RawBson) -> Result<AnyValue, ConversionError> {
        Ok(AnyValue(Some(raw.unmarshal()?)))
    }
}

hooked_rep!(AnyValue);

#[test]
fn setter_sees_every_element_kind() {
    #[derive(BsonRep, Clone, Debug, Default, PartialEq)]
    struct T {
        #[bson(rename = "_")]
        field: AnyValue,
    }

    let cases: Vec<(&[u8], Bson)> = vec![
        (b"\x01_\x00333333\x14@", Bson::Double(5.05)),
        (b"\x02_\x00\x03\x00\x00\x00yo\x00", Bson::String("yo".to_string())),
        (b"\x08_\x00\x01", Bson::Bool(true)),
        (b"\x0A_\x00", Bson::Null),
        (b"\x10_\x00\x02\x01\x00\x00", Bson::Int32(258)),
        (b"\xFF_\x00", Bson::MinKey),
    ];
    for (data, expected) in cases {
        let t: T = unmarshal(&wrap_in_doc(data)).unwrap();
        assert_eq!(t.field.0, Some(expected));
    }
}

/// Trims its own suffix on encode and appends one on decode, exercising
/// asymmetric hooks over the ordered form.
#[derive(Clone, Debug, Default, PartialEq)]
struct Suffixed(Document);

impl Getter for Suffixed {
    fn get_bson(&self) -> Result<Bson, ConversionError> {
        let mut d = self.0.clone();
        d.remove("suffix");
        Ok(Bson::Document(d))
    }
}

impl Setter for Suffixed {
    fn set_bson(raw: RawBson) -> Result<Suffixed, ConversionError> {
        let mut d: Document = raw.unmarshal()?;
        d.insert("suffix", true);
        Ok(Suffixed(d))
    }
}

hooked_rep!(Suffixed);

#[test]
fn asymmetric_hooks_compose() {
    let data = marshal(&doc! { "a" => 1i32 }).unwrap();
    let v: Suffixed = unmarshal(&data).unwrap();
    assert_eq!(v.0, doc! { "a" => 1i32, "suffix" => true });
    assert_eq!(marshal(&v).unwrap(), data);
}

/// Returns SetZero for one magic payload and an error for another.
#[derive(Clone, Debug, Default, PartialEq)]
struct Picky(String);

impl Getter for Picky {
    fn get_bson(&self) -> Result<Bson, ConversionError> {
        Ok(Bson::String(self.0.clone()))
    }
}

impl Setter for Picky {
    fn set_bson(raw: RawBson) -> Result<Picky, ConversionError> {
        let s: String = raw.unmarshal()?;
        match s.as_str() {
            "zero-me" => Err(ConversionError::SetZero),
            "boom" => Err(ConversionError::Message("BOOM".to_string())),
            _ => Ok(Picky(s)),
        }
    }
}

hooked_rep!(Picky);

#[test]
fn set_zero_zeroes_the_slot() {
    #[derive(BsonRep, Clone, Debug, Default, PartialEq)]
    struct T {
        field: Picky,
    }

    let data = marshal(&doc! { "field" => "zero-me" }).unwrap();
    let t: T = unmarshal(&data).unwrap();
    assert_eq!(t.field, Picky::default());

    let data = marshal(&doc! { "field" => "kept" }).unwrap();
    let t: T = unmarshal(&data).unwrap();
    assert_eq!(t.field, Picky("kept".to_string()));
}

#[test]
fn setter_errors_abort_the_unmarshal() {
    #[derive(BsonRep, Clone, Debug, Default, PartialEq)]
    struct T {
        field: Picky,
    }

    let data = marshal(&doc! { "field" => "boom" }).unwrap();
    let err = unmarshal::<T>(&data).unwrap_err();
    assert_eq!(
        err,
        DecodeError::Conversion(ConversionError::Message("BOOM".to_string()))
    );
}

/// A getter that can be told to fail.
#[derive(Clone, Debug, Default, PartialEq)]
struct Fallible {
    fail: bool,
}

impl Getter for Fallible {
    fn get_bson(&self) -> Result<Bson, ConversionError> {
        if self.fail {
            Err(ConversionError::Message("oops".to_string()))
        } else {
            Ok(Bson::Int32(1))
        }
    }
}

impl Setter for Fallible {
    fn set_bson(_raw: RawBson) -> Result<Fallible, ConversionError> {
        Ok(Fallible::default())
    }
}

hooked_rep!(Fallible);

#[test]
fn getter_errors_abort_the_marshal() {
    #[derive(BsonRep, Clone, Debug, Default, PartialEq)]
    struct T {
        v: Fallible,
    }

    let err = marshal(&T { v: Fallible { fail: true } }).unwrap_err();
    assert_eq!(
        err,
        EncodeError::Conversion(ConversionError::Message("oops".to_string()))
    );
    assert!(marshal(&T { v: Fallible { fail: false } }).is_ok());
}

#[test]
fn hooks_inside_collections() {
    let data = marshal(&doc! {
        "abc" => "1",
        "def" => "zero-me",
        "ghi" => "3",
    })
    .unwrap();
    let m: HashMap<String, Picky> = unmarshal(&data).unwrap();
    assert_eq!(m.get("abc"), Some(&Picky("1".to_string())));
    assert_eq!(m.get("def"), Some(&Picky::default()));
    assert_eq!(m.get("ghi"), Some(&Picky("3".to_string())));
}
