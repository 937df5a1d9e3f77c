// Copyright © 2021 The dataitem Contributors
//
// This file is part of dataitem, distributed under the GPLv3 with
// Linking Exception. For full terms see the included LICENSE file.

//! `#[derive(Encode, Decode)]`: generates `dataitem::codec::Encode`/
//! `Decode` impls that call straight into `dataitem::writer::Writer`/
//! `reader::Reader`, the way a hand-written impl in `dataitem::codec`
//! would (no intermediate value tree is built, unlike a `Value`-returning
//! derive).
//!
//! Structs with named fields become a map keyed by field name; tuple
//! structs become an array (a single-field tuple struct is transparent —
//! it encodes as its one field, with no wrapper); unit structs encode as
//! `null`. Enum variants are tagged, either internally
//! (`#[dataitem(tag = "type")]`, the discriminant living alongside the
//! variant's own fields in one map) or adjacently (`#[dataitem(tag =
//! "type", content = "value")]`, the fields nested under `content`). The
//! discriminant is always written as the map's first entry, and decode
//! requires it first too: this crate keeps no buffered value
//! representation to re-order entries against after the fact.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input,
    parse_quote,
    Data,
    DataEnum,
    DataStruct,
    DeriveInput,
    Fields,
    FieldsNamed,
    FieldsUnnamed,
    GenericParam,
    Generics,
    Ident,
    Index,
    Path,
    Type,
    Variant,
};

mod internals;
use internals::{
    attr::{Rules, Tagged},
    case,
};

#[proc_macro_derive(Encode, attributes(dataitem))]
pub fn encode_derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let rules = match Rules::from_input(&input) {
        Ok(rules) => rules,
        Err(err) => panic!("{}", err),
    };

    let name = &input.ident;
    let generics = add_trait_bounds(input.generics.clone(), parse_quote!(dataitem::codec::Encode));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(data) => product::encode(data, &rules),
        Data::Enum(data) => coproduct::encode(name, data, &rules),
        Data::Union(_) => unimplemented!("#[derive(Encode)] does not support unions"),
    };

    let expanded = quote! {
        impl #impl_generics dataitem::codec::Encode for #name #ty_generics #where_clause {
            fn encode<__W: dataitem::writer::Writer>(&self, writer: &mut __W) -> dataitem::error::Result<()> {
                #body
            }
        }
    };

    proc_macro::TokenStream::from(expanded)
}

#[proc_macro_derive(Decode, attributes(dataitem))]
pub fn decode_derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let rules = match Rules::from_input(&input) {
        Ok(rules) => rules,
        Err(err) => panic!("{}", err),
    };

    let name = &input.ident;
    let generics = add_trait_bounds(input.generics.clone(), parse_quote!(dataitem::codec::Decode));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(data) => product::decode(name, data, &rules),
        Data::Enum(data) => coproduct::decode(name, data, &rules),
        Data::Union(_) => unimplemented!("#[derive(Decode)] does not support unions"),
    };

    let expanded = quote! {
        impl #impl_generics dataitem::codec::Decode for #name #ty_generics #where_clause {
            fn decode<__R: dataitem::reader::Reader>(reader: &mut __R) -> dataitem::error::Result<Self> {
                #body
            }
        }
    };

    proc_macro::TokenStream::from(expanded)
}

fn add_trait_bounds(mut generics: Generics, bound: Path) -> Generics {
    for param in &mut generics.params {
        if let GenericParam::Type(ref mut type_param) = *param {
            type_param.bounds.push(syn::TypeParamBound::Trait(syn::TraitBound {
                paren_token: None,
                modifier: syn::TraitBoundModifier::None,
                lifetimes: None,
                path: bound.clone(),
            }));
        }
    }
    generics
}

fn cased_key(raw: &Ident, attrs: &[syn::Attribute], casing: Option<case::Case>) -> String {
    internals::attr::field_rename(attrs).unwrap_or_else(|| case::convert(&raw.to_string(), casing))
}

/// Struct (product-type) encode/decode: named fields become a map, tuple
/// fields an array (transparent for exactly one field), unit a `null`.
mod product {
    use super::*;

    pub fn encode(data: &DataStruct, rules: &Rules) -> TokenStream {
        match &data.fields {
            Fields::Named(fields) => encode_named(fields, rules),
            Fields::Unnamed(fields) => encode_unnamed(fields),
            Fields::Unit => quote! {
                writer.write_null()?;
                Ok(())
            },
        }
    }

    pub fn decode(name: &Ident, data: &DataStruct, rules: &Rules) -> TokenStream {
        match &data.fields {
            Fields::Named(fields) => decode_named(name, fields, rules),
            Fields::Unnamed(fields) => decode_unnamed(name, fields),
            Fields::Unit => quote! {
                reader.read_null()?;
                Ok(#name)
            },
        }
    }

    fn encode_named(fields: &FieldsNamed, rules: &Rules) -> TokenStream {
        let n = fields.named.len() as u64;
        let names: Vec<&Ident> = fields.named.iter().map(|f| f.ident.as_ref().unwrap()).collect();
        let keys: Vec<String> = fields
            .named
            .iter()
            .map(|f| cased_key(f.ident.as_ref().unwrap(), &f.attrs, rules.casing))
            .collect();
        quote! {
            writer.write_map_header(#n)?;
            #( writer.write_string(#keys)?; dataitem::codec::Encode::encode(&self.#names, writer)?; )*
            Ok(())
        }
    }

    fn encode_unnamed(fields: &FieldsUnnamed) -> TokenStream {
        let n = fields.unnamed.len();
        let indices: Vec<Index> = (0..n).map(Index::from).collect();
        if n == 1 {
            quote! { dataitem::codec::Encode::encode(&self.0, writer) }
        } else {
            let n = n as u64;
            quote! {
                writer.write_array_header(#n)?;
                #( dataitem::codec::Encode::encode(&self.#indices, writer)?; )*
                Ok(())
            }
        }
    }

    fn decode_named(name: &Ident, fields: &FieldsNamed, rules: &Rules) -> TokenStream {
        let field_names: Vec<&Ident> = fields.named.iter().map(|f| f.ident.as_ref().unwrap()).collect();
        let field_types: Vec<&Type> = fields.named.iter().map(|f| &f.ty).collect();
        let keys: Vec<String> = fields
            .named
            .iter()
            .map(|f| cased_key(f.ident.as_ref().unwrap(), &f.attrs, rules.casing))
            .collect();
        let locals: Vec<Ident> = field_names.iter().map(|n| format_ident!("__field_{}", n)).collect();
        let missing: Vec<String> = keys.iter().map(|k| format!("missing field \"{}\"", k)).collect();
        quote! {
            #( let mut #locals: Option<#field_types> = None; )*
            dataitem::support::decode_map_entries(reader, |__r, __key| {
                match __key.as_str() {
                    #( #keys => { #locals = Some(dataitem::codec::Decode::decode(__r)?); } )*
                    _ => { __r.skip_element()?; }
                }
                Ok(())
            })?;
            Ok(#name {
                #( #field_names: #locals.ok_or_else(|| dataitem::error::Error::invalid_data(reader.position(), #missing))?, )*
            })
        }
    }

    fn decode_unnamed(name: &Ident, fields: &FieldsUnnamed) -> TokenStream {
        let n = fields.unnamed.len();
        if n == 1 {
            quote! { Ok(#name(dataitem::codec::Decode::decode(reader)?)) }
        } else {
            let types: Vec<&Type> = fields.unnamed.iter().map(|f| &f.ty).collect();
            let n64 = n as u64;
            quote! {
                let __len = reader.read_array_header()?;
                if __len != #n64 {
                    return Err(dataitem::error::Error::invalid_data(
                        reader.position(),
                        format!("expected {} elements, found {}", #n64, __len),
                    ));
                }
                Ok(#name( #( <#types as dataitem::codec::Decode>::decode(reader)?, )* ))
            }
        }
    }
}

/// Enum (sum-type) encode/decode: every variant carries the discriminant
/// as the first entry of a map.
mod coproduct {
    use super::*;

    pub fn encode(ident: &Ident, data: &DataEnum, rules: &Rules) -> TokenStream {
        let tagged = require_tagged(rules, "Encode");
        let arms = data.variants.iter().map(|v| variant_encode(ident, tagged, rules.casing, v));
        quote! {
            match self {
                #(#arms),*
            }
        }
    }

    pub fn decode(ident: &Ident, data: &DataEnum, rules: &Rules) -> TokenStream {
        let tagged = require_tagged(rules, "Decode");
        let tag_key = tagged.tag();
        let arms = data.variants.iter().map(|v| variant_decode(ident, tagged, rules.casing, v));
        quote! {
            let __tail = dataitem::support::open_map(reader)?;
            let __tag_key_found = reader.read_string()?;
            if __tag_key_found != #tag_key {
                return Err(dataitem::error::Error::invalid_data(
                    reader.position(),
                    format!("expected \"{}\" as the map's first entry, found \"{}\"", #tag_key, __tag_key_found),
                ));
            }
            let __variant = reader.read_string()?;
            let __tail = __tail.minus_one();
            match __variant.as_str() {
                #(#arms)*
                other => Err(dataitem::error::Error::invalid_data(
                    reader.position(),
                    format!("unknown variant \"{}\" for {}", other, stringify!(#ident)),
                )),
            }
        }
    }

    fn require_tagged<'r>(rules: &'r Rules, derive: &str) -> &'r Tagged {
        match &rules.tagged {
            Some(tagged) => tagged,
            None => panic!(
                "#[derive({})] on an enum requires #[dataitem(tag = \"...\")] or \
                 #[dataitem(tag = \"...\", content = \"...\")]",
                derive
            ),
        }
    }

    fn variant_encode(ident: &Ident, tagged: &Tagged, casing: Option<case::Case>, variant: &Variant) -> TokenStream {
        let name = &variant.ident;
        let variant_name = name.to_string();
        let tag_key = tagged.tag();

        match &variant.fields {
            Fields::Named(fields) => {
                let names: Vec<&Ident> = fields.named.iter().map(|f| f.ident.as_ref().unwrap()).collect();
                tagged.guard_fields(names.iter().copied());
                let keys: Vec<String> = fields
                    .named
                    .iter()
                    .map(|f| cased_key(f.ident.as_ref().unwrap(), &f.attrs, casing))
                    .collect();
                let n = fields.named.len() as u64;
                let body = match tagged {
                    Tagged::Internally(_) => quote! {
                        writer.write_map_header(#n + 1)?;
                        writer.write_string(#tag_key)?;
                        writer.write_string(#variant_name)?;
                        #( writer.write_string(#keys)?; dataitem::codec::Encode::encode(#names, writer)?; )*
                        Ok(())
                    },
                    Tagged::Adjacently { content, .. } => quote! {
                        writer.write_map_header(2)?;
                        writer.write_string(#tag_key)?;
                        writer.write_string(#variant_name)?;
                        writer.write_string(#content)?;
                        writer.write_map_header(#n)?;
                        #( writer.write_string(#keys)?; dataitem::codec::Encode::encode(#names, writer)?; )*
                        Ok(())
                    },
                };
                quote! { #ident::#name { #(#names),* } => { #body } }
            },
            Fields::Unnamed(fields) => {
                let n = fields.unnamed.len();
                let names: Vec<Ident> = (0..n).map(|i| format_ident!("__field{}", i)).collect();
                if n == 1 {
                    let field = &names[0];
                    let content = tagged.content().unwrap_or("0");
                    let body = quote! {
                        writer.write_map_header(2)?;
                        writer.write_string(#tag_key)?;
                        writer.write_string(#variant_name)?;
                        writer.write_string(#content)?;
                        dataitem::codec::Encode::encode(#field, writer)?;
                        Ok(())
                    };
                    quote! { #ident::#name ( #field ) => { #body } }
                } else {
                    let n64 = n as u64;
                    let indices: Vec<String> = (0..n).map(|i| i.to_string()).collect();
                    let body = match tagged {
                        Tagged::Internally(_) => quote! {
                            writer.write_map_header(#n64 + 1)?;
                            writer.write_string(#tag_key)?;
                            writer.write_string(#variant_name)?;
                            #( writer.write_string(#indices)?; dataitem::codec::Encode::encode(#names, writer)?; )*
                            Ok(())
                        },
                        Tagged::Adjacently { content, .. } => quote! {
                            writer.write_map_header(2)?;
                            writer.write_string(#tag_key)?;
                            writer.write_string(#variant_name)?;
                            writer.write_string(#content)?;
                            writer.write_array_header(#n64)?;
                            #( dataitem::codec::Encode::encode(#names, writer)?; )*
                            Ok(())
                        },
                    };
                    quote! { #ident::#name ( #(#names),* ) => { #body } }
                }
            },
            Fields::Unit => quote! {
                #ident::#name => {
                    writer.write_map_header(1)?;
                    writer.write_string(#tag_key)?;
                    writer.write_string(#variant_name)?;
                    Ok(())
                }
            },
        }
    }

    fn variant_decode(ident: &Ident, tagged: &Tagged, casing: Option<case::Case>, variant: &Variant) -> TokenStream {
        let name = &variant.ident;
        let variant_name = name.to_string();

        match &variant.fields {
            Fields::Named(fields) => {
                let field_names: Vec<&Ident> = fields.named.iter().map(|f| f.ident.as_ref().unwrap()).collect();
                let field_types: Vec<&Type> = fields.named.iter().map(|f| &f.ty).collect();
                let keys: Vec<String> = fields
                    .named
                    .iter()
                    .map(|f| cased_key(f.ident.as_ref().unwrap(), &f.attrs, casing))
                    .collect();
                let locals: Vec<Ident> = field_names.iter().map(|n| format_ident!("__field_{}", n)).collect();
                let missing: Vec<String> = keys.iter().map(|k| format!("missing field \"{}\"", k)).collect();
                let construct = quote! {
                    Ok(#ident::#name {
                        #( #field_names: #locals.ok_or_else(|| dataitem::error::Error::invalid_data(reader.position(), #missing))?, )*
                    })
                };

                match tagged {
                    Tagged::Internally(_) => quote! {
                        #variant_name => {
                            #( let mut #locals: Option<#field_types> = None; )*
                            dataitem::support::visit_map_tail(reader, __tail, |__r, __key| {
                                match __key.as_str() {
                                    #( #keys => { #locals = Some(dataitem::codec::Decode::decode(__r)?); } )*
                                    _ => { __r.skip_element()?; }
                                }
                                Ok(())
                            })?;
                            #construct
                        }
                    },
                    Tagged::Adjacently { content, .. } => quote! {
                        #variant_name => {
                            #( let mut #locals: Option<#field_types> = None; )*
                            let mut __found = false;
                            dataitem::support::visit_map_tail(reader, __tail, |__r, __key| {
                                if __key != #content {
                                    return __r.skip_element();
                                }
                                __found = true;
                                dataitem::support::decode_map_entries(__r, |__r2, __key2| {
                                    match __key2.as_str() {
                                        #( #keys => { #locals = Some(dataitem::codec::Decode::decode(__r2)?); } )*
                                        _ => { __r2.skip_element()?; }
                                    }
                                    Ok(())
                                })
                            })?;
                            if !__found {
                                return Err(dataitem::error::Error::invalid_data(
                                    reader.position(),
                                    concat!("missing \"", #content, "\" content"),
                                ));
                            }
                            #construct
                        }
                    },
                }
            },
            Fields::Unnamed(fields) => {
                let n = fields.unnamed.len();
                let types: Vec<&Type> = fields.unnamed.iter().map(|f| &f.ty).collect();

                if n == 1 {
                    let ty = types[0];
                    let content = tagged.content().unwrap_or("0");
                    quote! {
                        #variant_name => {
                            let mut __value: Option<#ty> = None;
                            dataitem::support::visit_map_tail(reader, __tail, |__r, __key| {
                                if __key == #content {
                                    __value = Some(<#ty as dataitem::codec::Decode>::decode(__r)?);
                                    Ok(())
                                } else {
                                    __r.skip_element()
                                }
                            })?;
                            Ok(#ident::#name(__value.ok_or_else(|| {
                                dataitem::error::Error::invalid_data(reader.position(), concat!("missing \"", #content, "\" content"))
                            })?))
                        }
                    }
                } else {
                    let n64 = n as u64;
                    let indices: Vec<String> = (0..n).map(|i| i.to_string()).collect();
                    let index_nums: Vec<usize> = (0..n).collect();
                    let locals: Vec<Ident> = (0..n).map(|i| format_ident!("__field{}", i)).collect();
                    let missing: Vec<String> = indices.iter().map(|k| format!("missing element {}", k)).collect();

                    match tagged {
                        Tagged::Internally(_) => quote! {
                            #variant_name => {
                                #( let mut #locals: Option<#types> = None; )*
                                dataitem::support::visit_map_tail(reader, __tail, |__r, __key| {
                                    match __key.as_str() {
                                        #( #indices => { #locals = Some(dataitem::codec::Decode::decode(__r)?); } )*
                                        _ => { __r.skip_element()?; }
                                    }
                                    Ok(())
                                })?;
                                Ok(#ident::#name( #( #locals.ok_or_else(|| dataitem::error::Error::invalid_data(reader.position(), #missing))?, )* ))
                            }
                        },
                        Tagged::Adjacently { content, .. } => quote! {
                            #variant_name => {
                                #( let mut #locals: Option<#types> = None; )*
                                let mut __found = false;
                                dataitem::support::visit_map_tail(reader, __tail, |__r, __key| {
                                    if __key != #content {
                                        return __r.skip_element();
                                    }
                                    __found = true;
                                    dataitem::support::decode_array_elements(__r, |__r2, __index| {
                                        match __index {
                                            #( #index_nums => { #locals = Some(dataitem::codec::Decode::decode(__r2)?); } )*
                                            _ => { __r2.skip_element()?; }
                                        }
                                        Ok(())
                                    })
                                })?;
                                if !__found {
                                    return Err(dataitem::error::Error::invalid_data(
                                        reader.position(),
                                        concat!("missing \"", #content, "\" content"),
                                    ));
                                }
                                Ok(#ident::#name( #( #locals.ok_or_else(|| dataitem::error::Error::invalid_data(reader.position(), #missing))?, )* ))
                            }
                        },
                    }
                }
            },
            Fields::Unit => quote! {
                #variant_name => {
                    dataitem::support::visit_map_tail(reader, __tail, |__r, _key| __r.skip_element())?;
                    Ok(#ident::#name)
                }
            },
        }
    }
}
