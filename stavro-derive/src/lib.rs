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

//! Derive macro for stavro.
//!
//! `#[derive(AvroObject)]` implements `Avro` and `AvroStruct` for a struct
//! with named fields. The generated code refers to `stavro_core`, which must
//! be a dependency of the deriving crate.
//!
//! Field attributes, all under `#[avro(...)]`:
//!
//! - `key = "value"`: a name tag. The handle's tag key (default `rename`)
//!   picks which key renames the field; a value of `-` skips it.
//! - `skip`: leave the field out of the schema. It decodes as `Default::default()`.
//! - `flatten`: inline the fields of a nested struct into this record.
//!
//! Container attribute `#[avro(raw)]` makes the type write its own bytes
//! through `AvroMarshaler` and `AvroUnmarshaler`. Raw types may be enums and
//! must implement `Default`.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod object;

/// Derives `Avro` and `AvroStruct`.
///
/// # Example
///
/// ```rust,ignore
/// use stavro_derive::AvroObject;
///
/// #[derive(AvroObject, Debug, PartialEq)]
/// struct Node {
///     #[avro(rename = "value")]
///     val: String,
///     next: Option<Box<Node>>,
/// }
/// ```
#[proc_macro_derive(AvroObject, attributes(avro))]
pub fn proc_macro_derive_avro_object(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    object::derive_avro_object(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
