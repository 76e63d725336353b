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

//! Codecs for every supported Rust type.
//!
//! A codec is built once per `(schema, type, direction)` and then invoked for
//! every value. Encoders and decoders report failures through the sticky error
//! of the [`Writer`]/[`Reader`] they run on rather than returning `Result`.

use std::sync::Arc;

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::resolver::context::BuildContext;
use crate::schema::Schema;
use crate::types::{FieldDesc, TypeDesc};

mod bool;
mod box_;
mod datetime;
mod list;
mod map;
mod number;
mod option;
pub mod raw;
pub mod skip;
pub mod struct_;
mod string;
pub(crate) mod unsigned_number;

pub use raw::{AvroMarshaler, AvroUnmarshaler, RawMessage};
pub use struct_::{RecordDecoderBuilder, RecordEncoderBuilder};

/// Writes one value.
pub type EncodeFn<T> = Arc<dyn Fn(&T, &mut Writer) + Send + Sync>;
/// Reads one value into an existing target.
pub type DecodeFn<T> = Arc<dyn Fn(&mut T, &mut Reader<'_>) + Send + Sync>;

/// A type with an Avro representation.
///
/// Implemented for primitives, strings, collections, `Option`, `Box`, chrono
/// types and durations, and for structs through `#[derive(AvroObject)]`.
pub trait Avro: Sized + 'static {
    /// Shape of the type, consumed by schema inference.
    fn avro_type() -> TypeDesc;

    /// Fresh value that decoding fills in.
    fn avro_default() -> Self;

    /// Builds an encoder against `schema`, which the build context has
    /// already resolved if it was a reference.
    fn avro_encoder(schema: &Schema, ctx: &mut BuildContext<'_>) -> Result<EncodeFn<Self>, Error>;

    fn avro_decoder(schema: &Schema, ctx: &mut BuildContext<'_>) -> Result<DecodeFn<Self>, Error>;
}

/// Field-level access to a derived struct, used to build record codecs and to
/// inline `#[avro(flatten)]` members into their parent record.
pub trait AvroStruct: Avro {
    fn avro_fields() -> &'static [FieldDesc];

    fn avro_encode_fields(fields: &mut RecordEncoderBuilder<'_, '_, Self>) -> Result<(), Error>;

    fn avro_decode_fields(fields: &mut RecordDecoderBuilder<'_, '_, Self>) -> Result<(), Error>;
}

#[cold]
pub(crate) fn mismatch<T>(schema: &Schema) -> Error {
    Error::schema_error(format!(
        "schema {} cannot be used with {}",
        schema.type_name(),
        std::any::type_name::<T>()
    ))
}
