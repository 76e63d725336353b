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

use std::sync::Arc;

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::resolver::context::BuildContext;
use crate::schema::{PrimitiveType, Schema};
use crate::serializer::{mismatch, Avro, DecodeFn, EncodeFn};
use crate::types::{TypeDesc, TypeKind};

/// Integers travel as zigzag varints. `$encode` lists the schema kinds a value
/// may be written as; every integer may be read from `int` or `long`, with a
/// range check against the target width.
macro_rules! impl_int_serializer {
    ($ty:ty, $kind:ident, $($encode:ident)|+) => {
        impl Avro for $ty {
            #[inline(always)]
            fn avro_type() -> TypeDesc {
                TypeDesc::of::<$ty>(TypeKind::$kind)
            }

            #[inline(always)]
            fn avro_default() -> Self {
                0
            }

            fn avro_encoder(
                schema: &Schema,
                _: &mut BuildContext<'_>,
            ) -> Result<EncodeFn<Self>, Error> {
                match schema.primitive_type() {
                    Some($(PrimitiveType::$encode)|+) => {
                        Ok(Arc::new(|v: &$ty, w: &mut Writer| w.write_long(*v as i64)))
                    }
                    _ => Err(mismatch::<$ty>(schema)),
                }
            }

            fn avro_decoder(
                schema: &Schema,
                _: &mut BuildContext<'_>,
            ) -> Result<DecodeFn<Self>, Error> {
                match schema.primitive_type() {
                    Some(PrimitiveType::Int | PrimitiveType::Long) => {
                        Ok(Arc::new(|v: &mut $ty, r: &mut Reader<'_>| {
                            let raw = r.read_long();
                            match <$ty>::try_from(raw) {
                                Ok(value) => *v = value,
                                Err(_) => r.set_error(Error::decode_error(format!(
                                    "value {} out of range for {}",
                                    raw,
                                    stringify!($ty)
                                ))),
                            }
                        }))
                    }
                    _ => Err(mismatch::<$ty>(schema)),
                }
            }
        }
    };
}

impl_int_serializer!(i8, Int8, Int | Long);
impl_int_serializer!(i16, Int16, Int | Long);
impl_int_serializer!(i32, Int32, Int | Long);
impl_int_serializer!(u8, UInt8, Int | Long);
impl_int_serializer!(u16, UInt16, Int | Long);
impl_int_serializer!(u32, UInt32, Long);
impl_int_serializer!(i64, Int64, Long);
impl_int_serializer!(isize, SignedSize, Long);

impl Avro for f32 {
    fn avro_type() -> TypeDesc {
        TypeDesc::of::<f32>(TypeKind::Float32)
    }

    fn avro_default() -> Self {
        0.0
    }

    fn avro_encoder(schema: &Schema, _: &mut BuildContext<'_>) -> Result<EncodeFn<Self>, Error> {
        match schema.primitive_type() {
            Some(PrimitiveType::Float) => Ok(Arc::new(|v: &f32, w: &mut Writer| w.write_float(*v))),
            Some(PrimitiveType::Double) => {
                Ok(Arc::new(|v: &f32, w: &mut Writer| w.write_double(*v as f64)))
            }
            _ => Err(mismatch::<f32>(schema)),
        }
    }

    fn avro_decoder(schema: &Schema, _: &mut BuildContext<'_>) -> Result<DecodeFn<Self>, Error> {
        match schema.primitive_type() {
            Some(PrimitiveType::Float) => {
                Ok(Arc::new(|v: &mut f32, r: &mut Reader<'_>| *v = r.read_float()))
            }
            _ => Err(mismatch::<f32>(schema)),
        }
    }
}

impl Avro for f64 {
    fn avro_type() -> TypeDesc {
        TypeDesc::of::<f64>(TypeKind::Float64)
    }

    fn avro_default() -> Self {
        0.0
    }

    fn avro_encoder(schema: &Schema, _: &mut BuildContext<'_>) -> Result<EncodeFn<Self>, Error> {
        match schema.primitive_type() {
            Some(PrimitiveType::Double) => {
                Ok(Arc::new(|v: &f64, w: &mut Writer| w.write_double(*v)))
            }
            _ => Err(mismatch::<f64>(schema)),
        }
    }

    fn avro_decoder(schema: &Schema, _: &mut BuildContext<'_>) -> Result<DecodeFn<Self>, Error> {
        match schema.primitive_type() {
            Some(PrimitiveType::Double) => {
                Ok(Arc::new(|v: &mut f64, r: &mut Reader<'_>| *v = r.read_double()))
            }
            // float promotes to double
            Some(PrimitiveType::Float) => {
                Ok(Arc::new(|v: &mut f64, r: &mut Reader<'_>| *v = r.read_float() as f64))
            }
            _ => Err(mismatch::<f64>(schema)),
        }
    }
}

/// Types without an Avro mapping. They implement the trait so that deriving a
/// struct that holds one compiles, and schema derivation then names the field.
macro_rules! impl_unsupported {
    ($($ty:ty => $default:expr),+ $(,)?) => {
        $(
            impl Avro for $ty {
                fn avro_type() -> TypeDesc {
                    TypeDesc::of::<$ty>(TypeKind::Unsupported)
                }

                fn avro_default() -> Self {
                    $default
                }

                fn avro_encoder(
                    schema: &Schema,
                    _: &mut BuildContext<'_>,
                ) -> Result<EncodeFn<Self>, Error> {
                    Err(mismatch::<$ty>(schema))
                }

                fn avro_decoder(
                    schema: &Schema,
                    _: &mut BuildContext<'_>,
                ) -> Result<DecodeFn<Self>, Error> {
                    Err(mismatch::<$ty>(schema))
                }
            }
        )+
    };
}

impl_unsupported!(i128 => 0, u128 => 0, char => '\0', () => ());
