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

//! # Stavro
//!
//! Avro binary serialization for Rust types, with the schema inferred from
//! the type itself.
//!
//! ```rust,ignore
//! use stavro::AvroObject;
//!
//! #[derive(AvroObject, Debug, PartialEq)]
//! struct Node {
//!     value: String,
//!     next: Option<Box<Node>>,
//! }
//!
//! let node = Node {
//!     value: "a".to_string(),
//!     next: Some(Box::new(Node { value: "b".to_string(), next: None })),
//! };
//! let bytes = stavro::marshal(&node)?;
//! let decoded: Node = stavro::deserialize(&bytes)?;
//! assert_eq!(decoded, node);
//! ```
//!
//! The derive macro expands to paths under `stavro_core`, so deriving
//! crates depend on `stavro-core` alongside this crate.
//!
//! The free functions share one lazily created handle with the default
//! [`Config`]. Build a [`Stavro`] yourself for other settings.

use std::sync::OnceLock;

pub use stavro_core::{
    config::Config, error::Error, schema::Schema, serializer::Avro, serializer::AvroMarshaler,
    serializer::AvroStruct, serializer::AvroUnmarshaler, serializer::RawMessage, Stats, Stavro,
};
pub use stavro_derive::AvroObject;

fn default_handle() -> &'static Stavro {
    static HANDLE: OnceLock<Stavro> = OnceLock::new();
    HANDLE.get_or_init(Stavro::default)
}

pub fn marshal<T: Avro>(value: &T) -> Result<Vec<u8>, Error> {
    default_handle().marshal(value)
}

pub fn unmarshal<T: Avro>(bytes: &[u8], value: &mut T) -> Result<(), Error> {
    default_handle().unmarshal(bytes, value)
}

pub fn deserialize<T: Avro>(bytes: &[u8]) -> Result<T, Error> {
    default_handle().deserialize(bytes)
}

/// Derives the schema of `T` now, panicking if it has none.
pub fn register<T: Avro>() {
    default_handle().register::<T>()
}

/// JSON text of the schema of `T`.
pub fn schema_of<T: Avro>() -> Result<String, Error> {
    default_handle().schema_of::<T>()
}

pub fn must_marshal<T: Avro>(value: &T) -> Vec<u8> {
    default_handle().must_marshal(value)
}

pub fn must_unmarshal<T: Avro>(bytes: &[u8], value: &mut T) {
    default_handle().must_unmarshal(bytes, value)
}
