pub use crate::{
    doc,
    document::Document,
    encoding::{decode_document, encode_document, marshal, marshal_into, unmarshal},
    errors::{ConversionError, DecodeError, EncodeError},
    hooked_rep,
    oid::ObjectId,
    raw::RawBson,
    rep::{BsonRep, Getter, Minsize, Setter},
    Binary, Bson, Bytes, DbPointer, HashMap, JavaScript, RegEx, Symbol, Timestamp,
    UtcDatetime,
};

pub use crate::bson_macro::*;
