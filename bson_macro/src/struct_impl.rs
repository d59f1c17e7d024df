use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    spanned::Spanned, DataStruct, Field, Fields, FieldsNamed, Ident, Lit, Meta,
    NestedMeta, Type,
};

#[derive(Default)]
struct FieldOpts {
    rename:    Option<String>,
    skip:      bool,
    omitempty: bool,
    minsize:   bool,
    inline:    bool,
}

struct FieldInfo<'a> {
    ident: &'a Ident,
    ty:    &'a Type,
    wire:  String,
    opts:  FieldOpts,
}

pub fn bson_rep(name: Ident, data: DataStruct) -> Result<TokenStream, syn::Error> {
    match data.fields {
        Fields::Named(fields) => named_struct(name, fields),
        Fields::Unit => Ok(unit_struct(name)),
        Fields::Unnamed(fields) => Err(syn::Error::new(
            fields.span(),
            "BsonRep requires named fields; tuple structs have no wire names",
        )),
    }
}

fn field_opts(field: &Field) -> Result<FieldOpts, syn::Error> {
    let mut opts = FieldOpts::default();
    for attr in &field.attrs {
        if !attr.path.is_ident("bson") {
            continue;
        }
        let list = match attr.parse_meta()? {
            Meta::List(list) => list,
            other => {
                return Err(syn::Error::new_spanned(other, "expected #[bson(...)]"));
            }
        };
        for nested in list.nested {
            match nested {
                NestedMeta::Meta(Meta::Path(ref p)) if p.is_ident("skip") => {
                    opts.skip = true
                }
                NestedMeta::Meta(Meta::Path(ref p)) if p.is_ident("omitempty") => {
                    opts.omitempty = true
                }
                NestedMeta::Meta(Meta::Path(ref p)) if p.is_ident("minsize") => {
                    opts.minsize = true
                }
                NestedMeta::Meta(Meta::Path(ref p)) if p.is_ident("inline") => {
                    opts.inline = true
                }
                NestedMeta::Meta(Meta::NameValue(ref nv)) if nv.path.is_ident("rename") => {
                    match &nv.lit {
                        Lit::Str(s) => opts.rename = Some(s.value()),
                        other => {
                            return Err(syn::Error::new_spanned(
                                other,
                                "rename expects a string literal",
                            ));
                        }
                    }
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "unknown bson field option",
                    ));
                }
            }
        }
    }
    Ok(opts)
}

fn named_struct(name: Ident, fields: FieldsNamed) -> Result<TokenStream, syn::Error> {
    let mut infos: Vec<FieldInfo> = Vec::new();
    for field in fields.named.iter() {
        let opts = field_opts(field)?;
        let ident = field.ident.as_ref().unwrap();
        let wire = if opts.skip {
            String::new()
        } else {
            opts.rename
                .clone()
                .unwrap_or_else(|| ident.to_string().to_ascii_lowercase())
        };
        infos.push(FieldInfo { ident, ty: &field.ty, wire, opts });
    }

    // Decode lookups fold ASCII case, so wire names must be unique under
    // the same fold.
    for (i, a) in infos.iter().enumerate() {
        if a.opts.skip || a.opts.inline {
            continue;
        }
        for b in infos[..i].iter() {
            if b.opts.skip || b.opts.inline {
                continue;
            }
            if a.wire.eq_ignore_ascii_case(&b.wire) {
                return Err(syn::Error::new(
                    a.ident.span(),
                    format!("duplicated key '{}' in struct {}", a.wire, name),
                ));
            }
        }
    }

    let mut inline_fields = infos.iter().filter(|f| f.opts.inline && !f.opts.skip);
    let has_inline = inline_fields.next().is_some();
    if let Some(second) = inline_fields.next() {
        return Err(syn::Error::new(
            second.ident.span(),
            format!("multiple inline fields in struct {}", name),
        ));
    }

    let sibling_wires: Vec<&String> = infos
        .iter()
        .filter(|f| !f.opts.skip && !f.opts.inline)
        .map(|f| &f.wire)
        .collect();

    // to_bson: elements in declared order, inline fields spliced in place.
    let field_count = infos.len();
    let encode_stmts = infos.iter().filter(|f| !f.opts.skip).map(|f| {
        let ident = f.ident;
        if f.opts.inline {
            let conflict_check = if sibling_wires.is_empty() {
                quote! {}
            } else {
                quote! {
                    if [#(#sibling_wires),*]
                        .iter()
                        .any(|&n: &&str| __k.eq_ignore_ascii_case(n))
                    {
                        return Err(ConversionError::InlineNameConflict(__k));
                    }
                }
            };
            quote! {
                match BsonRep::to_bson(&self.#ident)? {
                    Bson::Document(__inner) => {
                        for (__k, __v) in __inner {
                            #conflict_check
                            __doc.push(__k, __v);
                        }
                    }
                    Bson::Null => {}
                    __other => {
                        return Err(ConversionError::InlineMisuse(__other.kind_name()));
                    }
                }
            }
        } else {
            let wire = &f.wire;
            let value = if f.opts.minsize {
                quote! { Minsize::to_bson_minsize(&self.#ident)? }
            } else {
                quote! { BsonRep::to_bson(&self.#ident)? }
            };
            let push = quote! { __doc.push(#wire.to_string(), #value); };
            if f.opts.omitempty {
                quote! { if !BsonRep::is_zero(&self.#ident) { #push } }
            } else {
                push
            }
        }
    });

    // from_bson: one pass over the decoded elements, matching wire names
    // case-insensitively; everything unclaimed goes to the inline field or
    // is discarded.
    let name_str = name.to_string();
    let plain: Vec<&FieldInfo> = infos
        .iter()
        .filter(|f| !f.opts.skip && !f.opts.inline)
        .collect();
    let decls = plain.iter().map(|f| {
        let ident = f.ident;
        let ty = f.ty;
        quote! { let mut #ident: Option<#ty> = None; }
    });
    let arms = plain.iter().map(|f| {
        let ident = f.ident;
        let wire = &f.wire;
        quote! {
            if __name.eq_ignore_ascii_case(#wire) {
                #ident = Some(BsonRep::from_bson(__value)?);
            } else
        }
    });
    let rest_decl = if has_inline {
        quote! { let mut __rest = Document::new(); }
    } else {
        quote! {}
    };
    let tail = if has_inline {
        quote! { { __rest.push(__name, __value); } }
    } else {
        quote! { { let _ = (__name, __value); } }
    };
    let build_fields = infos.iter().map(|f| {
        let ident = f.ident;
        if f.opts.skip {
            quote! { #ident: Default::default() }
        } else if f.opts.inline {
            quote! { #ident: BsonRep::from_bson(Bson::Document(__rest))? }
        } else {
            quote! { #ident: #ident.unwrap_or_default() }
        }
    });

    let zero_probes = infos.iter().filter(|f| !f.opts.skip).map(|f| {
        let ident = f.ident;
        quote! { && BsonRep::is_zero(&self.#ident) }
    });

    Ok(quote! {
        impl BsonRep for #name {
            fn to_bson(&self) -> Result<Bson, ConversionError> {
                let mut __doc = Document::with_capacity(#field_count);
                #(#encode_stmts)*
                Ok(Bson::Document(__doc))
            }

            fn from_bson(bs: Bson) -> Result<Self, ConversionError> {
                let __doc = match bs {
                    Bson::Document(d) => d,
                    __other => {
                        return Err(ConversionError::TypeMismatch(
                            __other.kind_name(),
                            #name_str,
                        ));
                    }
                };
                #(#decls)*
                #rest_decl
                for (__name, __value) in __doc {
                    #(#arms)* #tail
                }
                Ok(#name { #(#build_fields),* })
            }

            fn is_zero(&self) -> bool { true #(#zero_probes)* }
        }
    })
}

fn unit_struct(name: Ident) -> TokenStream {
    let name_str = name.to_string();
    quote! {
        impl BsonRep for #name {
            fn to_bson(&self) -> Result<Bson, ConversionError> {
                Ok(Bson::Document(Document::new()))
            }

            fn from_bson(bs: Bson) -> Result<Self, ConversionError> {
                match bs {
                    Bson::Document(_) => Ok(#name),
                    __other => Err(ConversionError::TypeMismatch(
                        __other.kind_name(),
                        #name_str,
                    )),
                }
            }

            fn is_zero(&self) -> bool { true }
        }
    }
}
