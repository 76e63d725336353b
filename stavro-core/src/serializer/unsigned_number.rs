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

//! Unsigned 64-bit integers do not fit Avro's signed `long`, so they travel
//! as an 8-byte big-endian `fixed` carrying a decimal logical type.

use std::sync::Arc;

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::resolver::context::BuildContext;
use crate::schema::Schema;
use crate::serializer::{mismatch, Avro, DecodeFn, EncodeFn};
use crate::types::{TypeDesc, TypeKind};

pub(crate) const UINT_SIZE: usize = 8;
pub(crate) const UINT_NAME: &str = "uint";
/// Decimal digits of `u64::MAX`.
pub(crate) const UINT_PRECISION: usize = 20;

fn check_fixed<T>(schema: &Schema) -> Result<(), Error> {
    match schema {
        Schema::Fixed(fixed) if fixed.size() == UINT_SIZE => Ok(()),
        _ => Err(mismatch::<T>(schema)),
    }
}

#[inline(always)]
fn read_u64(r: &mut Reader<'_>) -> Option<u64> {
    let bytes = r.read_fixed(UINT_SIZE);
    <[u8; UINT_SIZE]>::try_from(bytes).ok().map(u64::from_be_bytes)
}

impl Avro for u64 {
    fn avro_type() -> TypeDesc {
        TypeDesc::of::<u64>(TypeKind::UInt64)
    }

    fn avro_default() -> Self {
        0
    }

    fn avro_encoder(schema: &Schema, _: &mut BuildContext<'_>) -> Result<EncodeFn<Self>, Error> {
        check_fixed::<u64>(schema)?;
        Ok(Arc::new(|v: &u64, w: &mut Writer| w.write_fixed(&v.to_be_bytes())))
    }

    fn avro_decoder(schema: &Schema, _: &mut BuildContext<'_>) -> Result<DecodeFn<Self>, Error> {
        check_fixed::<u64>(schema)?;
        Ok(Arc::new(|v: &mut u64, r: &mut Reader<'_>| {
            if let Some(value) = read_u64(r) {
                *v = value;
            }
        }))
    }
}

impl Avro for usize {
    fn avro_type() -> TypeDesc {
        TypeDesc::of::<usize>(TypeKind::Size)
    }

    fn avro_default() -> Self {
        0
    }

    fn avro_encoder(schema: &Schema, _: &mut BuildContext<'_>) -> Result<EncodeFn<Self>, Error> {
        check_fixed::<usize>(schema)?;
        Ok(Arc::new(|v: &usize, w: &mut Writer| {
            w.write_fixed(&(*v as u64).to_be_bytes())
        }))
    }

    fn avro_decoder(schema: &Schema, _: &mut BuildContext<'_>) -> Result<DecodeFn<Self>, Error> {
        check_fixed::<usize>(schema)?;
        Ok(Arc::new(|v: &mut usize, r: &mut Reader<'_>| {
            if let Some(value) = read_u64(r) {
                match usize::try_from(value) {
                    Ok(value) => *v = value,
                    Err(_) => r.set_error(Error::decode_error(format!(
                        "value {value} out of range for usize"
                    ))),
                }
            }
        }))
    }
}
