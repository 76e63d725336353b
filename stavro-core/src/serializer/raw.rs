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

//! Types that bring their own byte representation.
//!
//! A raw type's schema is [`Schema::Raw`], written on the wire as a single
//! `bytes` value holding whatever [`AvroMarshaler::marshal_avro`] returned.
//! Deriving with `#[avro(raw)]` wires both hooks into the [`Avro`] impl:
//!
//! ```rust,ignore
//! #[derive(Default, AvroObject)]
//! #[avro(raw)]
//! struct Ipv4([u8; 4]);
//!
//! impl AvroMarshaler for Ipv4 {
//!     fn marshal_avro(&self) -> Result<Vec<u8>, Error> {
//!         Ok(self.0.to_vec())
//!     }
//! }
//! ```

use std::sync::Arc;

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::resolver::context::BuildContext;
use crate::schema::{PrimitiveType, Schema};
use crate::serializer::{mismatch, Avro, DecodeFn, EncodeFn};
use crate::types::{TypeDesc, TypeKind};

pub trait AvroMarshaler {
    fn marshal_avro(&self) -> Result<Vec<u8>, Error>;
}

pub trait AvroUnmarshaler {
    fn unmarshal_avro(&mut self, bytes: &[u8]) -> Result<(), Error>;
}

fn check_raw<T>(schema: &Schema) -> Result<(), Error> {
    match schema {
        Schema::Raw => Ok(()),
        _ if schema.primitive_type() == Some(PrimitiveType::Bytes) => Ok(()),
        _ => Err(mismatch::<T>(schema)),
    }
}

pub fn encoder<T: AvroMarshaler + 'static>(schema: &Schema) -> Result<EncodeFn<T>, Error> {
    check_raw::<T>(schema)?;
    Ok(Arc::new(|v: &T, w: &mut Writer| {
        if w.has_error() {
            return;
        }
        match v.marshal_avro() {
            Ok(bytes) => w.write_bytes(&bytes),
            Err(err) => w.set_error(err),
        }
    }))
}

pub fn decoder<T: AvroUnmarshaler + 'static>(schema: &Schema) -> Result<DecodeFn<T>, Error> {
    check_raw::<T>(schema)?;
    Ok(Arc::new(|v: &mut T, r: &mut Reader<'_>| {
        let bytes = r.read_bytes();
        if r.has_error() {
            return;
        }
        if let Err(err) = v.unmarshal_avro(bytes) {
            r.set_error(err);
        }
    }))
}

/// Bytes that are already encoded, passed through unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawMessage(pub Vec<u8>);

impl AvroMarshaler for RawMessage {
    fn marshal_avro(&self) -> Result<Vec<u8>, Error> {
        Ok(self.0.clone())
    }
}

impl AvroUnmarshaler for RawMessage {
    fn unmarshal_avro(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.0.clear();
        self.0.extend_from_slice(bytes);
        Ok(())
    }
}

impl Avro for RawMessage {
    fn avro_type() -> TypeDesc {
        TypeDesc::of::<RawMessage>(TypeKind::Raw {
            name: "RawMessage",
            namespace: module_path!(),
        })
    }

    fn avro_default() -> Self {
        RawMessage::default()
    }

    fn avro_encoder(schema: &Schema, _: &mut BuildContext<'_>) -> Result<EncodeFn<Self>, Error> {
        check_raw::<Self>(schema)?;
        Ok(Arc::new(|v: &RawMessage, w: &mut Writer| w.write_bytes(&v.0)))
    }

    fn avro_decoder(schema: &Schema, _: &mut BuildContext<'_>) -> Result<DecodeFn<Self>, Error> {
        decoder::<Self>(schema)
    }
}
