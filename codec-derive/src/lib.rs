//! Derive macro for the bitcodec `Record` reflection capability.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields, FieldsNamed, LitStr};

/// Derive macro for the `Record` trait.
///
/// Implements `Record` (ordered field metadata plus indexed field access) and
/// `Reflect` (reporting the record kind) for structs with named fields whose
/// field types all implement `Reflect`.
///
/// # Codec Helper Attributes
///
/// Wire layout is declared per field with `#[codec(...)]` key-value
/// attributes. Values carry the textual annotation grammar and are parsed at
/// run time, once per field per encode or decode call:
///
/// - `endian = "little" | "big"` — byte order; default little
/// - `width = "<bits>"` — bit width overriding the type's natural width
/// - `slice_prefix = "<bits>[,<endian>]"` — length prefix for arrays and
///   `Vec`s
/// - `string_type = "null[,<pad_bytes>]" | "prefix,<bits>[,<endian>]"` —
///   string framing; default `prefix,8,little`
/// - `include_if = "[.]path(==|!=)?rhs?"` — conditional presence
///
/// # Example
///
/// ```
/// use bitcodec::Record;
///
/// #[derive(Debug, Default, Record)]
/// struct Header {
///     #[codec(endian = "big")]
///     source: u16,
///     secure: bool,
///     #[codec(include_if = ".secure")]
///     key: u32,
/// }
/// ```
#[proc_macro_derive(Record, attributes(codec))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_record(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_record(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, type_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields,
            Fields::Unnamed(_) | Fields::Unit => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Record derive macro requires named fields",
                ));
            }
        },
        Data::Enum(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Record derive macro does not support enums",
            ));
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Record derive macro does not support unions",
            ));
        }
    };

    let defs = expand_field_defs(fields)?;
    let (refs, muts) = expand_field_accessors(fields);

    Ok(quote! {
        impl #impl_generics ::bitcodec::Record for #name #type_generics #where_clause {
            fn fields(&self) -> &'static [::bitcodec::FieldDef] {
                const FIELDS: &[::bitcodec::FieldDef] = &[#(#defs),*];
                FIELDS
            }

            fn field(&self, index: usize) -> ::bitcodec::ValueRef<'_> {
                match index {
                    #(#refs)*
                    _ => ::core::panic!("field index out of range"),
                }
            }

            fn field_mut(&mut self, index: usize) -> ::bitcodec::ValueMut<'_> {
                match index {
                    #(#muts)*
                    _ => ::core::panic!("field index out of range"),
                }
            }
        }

        impl #impl_generics ::bitcodec::Reflect for #name #type_generics #where_clause {
            fn view(&self) -> ::bitcodec::ValueRef<'_> {
                ::bitcodec::ValueRef::Record(self)
            }

            fn view_mut(&mut self) -> ::bitcodec::ValueMut<'_> {
                ::bitcodec::ValueMut::Record(self)
            }
        }
    })
}

fn expand_field_defs(fields: &FieldsNamed) -> syn::Result<Vec<TokenStream2>> {
    fields
        .named
        .iter()
        .map(|field| {
            let name = field.ident.as_ref().unwrap().to_string();
            let annotations = parse_codec_attributes(field)?;
            let endian = option_tokens(&annotations.endian);
            let field_width = option_tokens(&annotations.field_width);
            let slice_prefix = option_tokens(&annotations.slice_prefix);
            let string_type = option_tokens(&annotations.string_type);
            let include_if = option_tokens(&annotations.include_if);
            Ok(quote! {
                ::bitcodec::FieldDef {
                    name: #name,
                    annotations: ::bitcodec::Annotations {
                        endian: #endian,
                        field_width: #field_width,
                        slice_prefix: #slice_prefix,
                        string_type: #string_type,
                        include_if: #include_if,
                    },
                }
            })
        })
        .collect()
}

fn expand_field_accessors(fields: &FieldsNamed) -> (Vec<TokenStream2>, Vec<TokenStream2>) {
    let refs = fields
        .named
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let ident = field.ident.as_ref().unwrap();
            quote! { #index => ::bitcodec::Reflect::view(&self.#ident), }
        })
        .collect();

    let muts = fields
        .named
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let ident = field.ident.as_ref().unwrap();
            quote! { #index => ::bitcodec::Reflect::view_mut(&mut self.#ident), }
        })
        .collect();

    (refs, muts)
}

// ---------- Helper Functions for Codec Attributes ----------

/// Raw annotation text collected from a field's `#[codec(...)]` attributes.
#[derive(Default)]
struct RawAnnotations {
    endian: Option<String>,
    field_width: Option<String>,
    slice_prefix: Option<String>,
    string_type: Option<String>,
    include_if: Option<String>,
}

/// Parses `#[codec(key = "value", ...)]` attributes on a field.
///
/// Values are carried through verbatim; the annotation grammar itself is
/// validated at run time by the codec crate.
fn parse_codec_attributes(field: &Field) -> syn::Result<RawAnnotations> {
    let mut annotations = RawAnnotations::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("codec") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            let value: LitStr = meta.value()?.parse()?;
            let slot = if meta.path.is_ident("endian") {
                &mut annotations.endian
            } else if meta.path.is_ident("width") {
                &mut annotations.field_width
            } else if meta.path.is_ident("slice_prefix") {
                &mut annotations.slice_prefix
            } else if meta.path.is_ident("string_type") {
                &mut annotations.string_type
            } else if meta.path.is_ident("include_if") {
                &mut annotations.include_if
            } else {
                return Err(meta.error(
                    "unknown codec attribute; expected one of \
                     endian, width, slice_prefix, string_type, include_if",
                ));
            };
            if slot.is_some() {
                return Err(meta.error("duplicate codec attribute"));
            }
            *slot = Some(value.value());
            Ok(())
        })?;
    }
    Ok(annotations)
}

fn option_tokens(value: &Option<String>) -> TokenStream2 {
    match value {
        Some(text) => quote! { ::core::option::Option::Some(#text) },
        None => quote! { ::core::option::Option::None },
    }
}
