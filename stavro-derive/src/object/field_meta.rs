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

//! Parsing of `#[avro(...)]` attributes.

use syn::{Attribute, Field, LitStr, Type};

#[derive(Debug, Default)]
pub struct AvroFieldMeta {
    /// `key = "value"` name tags, in declaration order.
    pub tags: Vec<(String, String)>,
    pub skip: bool,
    pub flatten: bool,
}

#[derive(Debug, Default)]
pub struct AvroContainerMeta {
    pub raw: bool,
}

pub fn parse_field_meta(field: &Field) -> syn::Result<AvroFieldMeta> {
    let mut meta = AvroFieldMeta::default();
    for attr in avro_attrs(&field.attrs) {
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("skip") {
                meta.skip = true;
            } else if nested.path.is_ident("flatten") {
                meta.flatten = true;
            } else if let Some(key) = nested.path.get_ident() {
                let value: LitStr = nested.value()?.parse()?;
                meta.tags.push((key.to_string(), value.value()));
            } else {
                return Err(nested.error("expected `skip`, `flatten` or `key = \"value\"`"));
            }
            Ok(())
        })?;
    }
    Ok(meta)
}

pub fn parse_container_meta(attrs: &[Attribute]) -> syn::Result<AvroContainerMeta> {
    let mut meta = AvroContainerMeta::default();
    for attr in avro_attrs(attrs) {
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("raw") {
                meta.raw = true;
                Ok(())
            } else {
                Err(nested.error("unknown container attribute, expected `raw`"))
            }
        })?;
    }
    Ok(meta)
}

fn avro_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident("avro"))
}

/// `Option<..>` by its last path segment.
pub fn is_option_type(ty: &Type) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .is_some_and(|seg| seg.ident == "Option"),
        _ => false,
    }
}
