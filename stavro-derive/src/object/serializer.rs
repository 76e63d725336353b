// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use proc_macro2::TokenStream;
use quote::quote;
use syn::fold::Fold;
use syn::{Data, DeriveInput, Fields, Ident, Type, Visibility};

use super::field_meta::{is_option_type, parse_container_meta, parse_field_meta, AvroFieldMeta};

struct SourceField<'a> {
    ident: &'a Ident,
    ty: Type,
    public: bool,
    meta: AvroFieldMeta,
}

/// Field types end up in statics, where `Self` is not in scope.
struct ReplaceSelf<'a>(&'a Ident);

impl Fold for ReplaceSelf<'_> {
    fn fold_ident(&mut self, ident: Ident) -> Ident {
        if ident == "Self" {
            Ident::new(&self.0.to_string(), ident.span())
        } else {
            ident
        }
    }
}

impl SourceField<'_> {
    /// Field name without a raw identifier prefix.
    fn name(&self) -> String {
        let name = self.ident.to_string();
        name.strip_prefix("r#").map(str::to_string).unwrap_or(name)
    }
}

pub fn derive_avro_object(ast: &DeriveInput) -> syn::Result<TokenStream> {
    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &ast.generics,
            "AvroObject cannot be derived for generic types",
        ));
    }
    let container = parse_container_meta(&ast.attrs)?;
    if container.raw {
        return Ok(gen_raw(ast));
    }
    let Data::Struct(data) = &ast.data else {
        return Err(syn::Error::new_spanned(
            &ast.ident,
            "AvroObject needs a struct with named fields, or `#[avro(raw)]`",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &data.fields,
            "AvroObject needs named fields, or `#[avro(raw)]`",
        ));
    };
    let fields = named
        .named
        .iter()
        .map(|field| {
            Ok(SourceField {
                // named fields always carry an ident
                ident: field.ident.as_ref().ok_or_else(|| {
                    syn::Error::new_spanned(field, "expected a named field")
                })?,
                ty: ReplaceSelf(&ast.ident).fold_type(field.ty.clone()),
                public: matches!(field.vis, Visibility::Public(_)),
                meta: parse_field_meta(field)?,
            })
        })
        .collect::<syn::Result<Vec<_>>>()?;
    Ok(gen_struct(&ast.ident, &fields))
}

fn gen_struct(name: &Ident, fields: &[SourceField<'_>]) -> TokenStream {
    let name_str = name.to_string();
    let listed: Vec<&SourceField<'_>> = fields.iter().filter(|f| !f.meta.skip).collect();
    let count = listed.len();

    let descs = listed.iter().map(|f| {
        let ident = f.name();
        let ty = &f.ty;
        let public = f.public;
        let flatten = f.meta.flatten;
        let tags = f.meta.tags.iter().map(|(k, v)| quote! { (#k, #v) });
        quote! {
            stavro_core::types::FieldDesc {
                ident: #ident,
                tags: &[#(#tags),*],
                flatten: #flatten,
                public: #public,
                ty: <#ty as stavro_core::serializer::Avro>::avro_type,
            }
        }
    });

    let defaults = fields.iter().map(|f| {
        let ident = f.ident;
        let ty = &f.ty;
        if f.meta.skip {
            quote! { #ident: ::core::default::Default::default() }
        } else {
            quote! { #ident: <#ty as stavro_core::serializer::Avro>::avro_default() }
        }
    });

    // flattened options are either left out or rejected by schema derivation
    let bound = listed
        .iter()
        .enumerate()
        .filter(|(_, f)| !(f.meta.flatten && is_option_type(&f.ty)));
    let encode_fields = bound.clone().map(|(i, f)| {
        let ident = f.ident;
        let ty = &f.ty;
        if f.meta.flatten {
            quote! { b.embedded::<#ty>(|v| &v.#ident)?; }
        } else {
            quote! { b.field::<#ty>(&fields[#i], |v| &v.#ident)?; }
        }
    });
    let decode_fields = bound.map(|(i, f)| {
        let ident = f.ident;
        let ty = &f.ty;
        if f.meta.flatten {
            quote! { b.embedded::<#ty>(|v| &mut v.#ident)?; }
        } else {
            quote! { b.field::<#ty>(&fields[#i], |v| &mut v.#ident)?; }
        }
    });

    quote! {
        impl stavro_core::serializer::Avro for #name {
            fn avro_type() -> stavro_core::types::TypeDesc {
                static DESC: stavro_core::types::StructDesc = stavro_core::types::StructDesc {
                    name: #name_str,
                    module_path: ::core::module_path!(),
                    fields: <#name as stavro_core::serializer::AvroStruct>::avro_fields,
                };
                stavro_core::types::TypeDesc::of::<Self>(stavro_core::types::TypeKind::Struct(&DESC))
            }

            fn avro_default() -> Self {
                Self {
                    #(#defaults),*
                }
            }

            fn avro_encoder(
                schema: &stavro_core::schema::Schema,
                ctx: &mut stavro_core::resolver::context::BuildContext<'_>,
            ) -> ::core::result::Result<stavro_core::serializer::EncodeFn<Self>, stavro_core::error::Error> {
                stavro_core::serializer::struct_::encoder::<Self>(schema, ctx)
            }

            fn avro_decoder(
                schema: &stavro_core::schema::Schema,
                ctx: &mut stavro_core::resolver::context::BuildContext<'_>,
            ) -> ::core::result::Result<stavro_core::serializer::DecodeFn<Self>, stavro_core::error::Error> {
                stavro_core::serializer::struct_::decoder::<Self>(schema, ctx)
            }
        }

        impl stavro_core::serializer::AvroStruct for #name {
            fn avro_fields() -> &'static [stavro_core::types::FieldDesc] {
                static FIELDS: [stavro_core::types::FieldDesc; #count] = [#(#descs),*];
                &FIELDS
            }

            #[allow(unused_variables)]
            fn avro_encode_fields(
                b: &mut stavro_core::serializer::RecordEncoderBuilder<'_, '_, Self>,
            ) -> ::core::result::Result<(), stavro_core::error::Error> {
                let fields = <Self as stavro_core::serializer::AvroStruct>::avro_fields();
                #(#encode_fields)*
                ::core::result::Result::Ok(())
            }

            #[allow(unused_variables)]
            fn avro_decode_fields(
                b: &mut stavro_core::serializer::RecordDecoderBuilder<'_, '_, Self>,
            ) -> ::core::result::Result<(), stavro_core::error::Error> {
                let fields = <Self as stavro_core::serializer::AvroStruct>::avro_fields();
                #(#decode_fields)*
                ::core::result::Result::Ok(())
            }
        }
    }
}

/// Types that write their own bytes through the marshaler traits.
fn gen_raw(ast: &DeriveInput) -> TokenStream {
    let name = &ast.ident;
    let name_str = name.to_string();
    quote! {
        impl stavro_core::serializer::Avro for #name {
            fn avro_type() -> stavro_core::types::TypeDesc {
                stavro_core::types::TypeDesc::of::<Self>(stavro_core::types::TypeKind::Raw {
                    name: #name_str,
                    namespace: ::core::module_path!(),
                })
            }

            fn avro_default() -> Self {
                <Self as ::core::default::Default>::default()
            }

            fn avro_encoder(
                schema: &stavro_core::schema::Schema,
                _: &mut stavro_core::resolver::context::BuildContext<'_>,
            ) -> ::core::result::Result<stavro_core::serializer::EncodeFn<Self>, stavro_core::error::Error> {
                stavro_core::serializer::raw::encoder::<Self>(schema)
            }

            fn avro_decoder(
                schema: &stavro_core::schema::Schema,
                _: &mut stavro_core::resolver::context::BuildContext<'_>,
            ) -> ::core::result::Result<stavro_core::serializer::DecodeFn<Self>, stavro_core::error::Error> {
                stavro_core::serializer::raw::decoder::<Self>(schema)
            }
        }
    }
}
