#![recursion_limit = "128"]

extern crate proc_macro;

/// Support for struct auto-derive.
mod struct_impl;

use proc_macro::TokenStream;
use syn::{parse_macro_input, Data, DeriveInput};

/// Derives `BsonRep` for a record type.
///
/// Every named field becomes a document element. The wire name is the field
/// name ASCII-lowercased, unless renamed. Field options are given as
/// `#[bson(...)]` attributes:
///
/// - `rename = "name"` — use `name` on the wire instead of the field name.
/// - `skip` — the field is neither encoded nor decoded; it decodes to its
///   `Default` value.
/// - `omitempty` — on encode, skip the field when its value is the zero of
///   its type.
/// - `minsize` — on encode, emit a 64-bit integer field as Int32 when the
///   value fits.
/// - `inline` — splice the field's own elements into the enclosing
///   document; on decode the field collects every element no sibling
///   claimed.
///
/// Wire names must be unique under ASCII case folding (decode lookups are
/// case-insensitive), and at most one field may be inlined. Violations are
/// compile errors. All field types must implement `Default`, which is what
/// absent elements decode to.
#[proc_macro_derive(BsonRep, attributes(bson))]
pub fn bson_rep_derive(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let name = ast.ident;
    match ast.data {
        Data::Struct(data) => struct_impl::bson_rep(name, data)
            .unwrap_or_else(|e| e.to_compile_error())
            .into(),
        _ => syn::Error::new_spanned(&name, "BsonRep can only be derived for structs")
            .to_compile_error()
            .into(),
    }
}
