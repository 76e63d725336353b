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

use std::any::{Any, TypeId};
use std::sync::Arc;

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::resolver::context::BuildContext;
use crate::schema::{PrimitiveType, Schema};
use crate::serializer::{mismatch, Avro, DecodeFn, EncodeFn};
use crate::types::{TypeDesc, TypeKind};

/// Writes `items` as blocks of at most `block_length` entries followed by the
/// terminating empty block.
pub(crate) fn write_blocks<T>(items: &[T], w: &mut Writer, encode: &EncodeFn<T>) {
    let block_length = w.config().block_length().max(1);
    for chunk in items.chunks(block_length) {
        w.write_block(|w| {
            for item in chunk {
                encode(item, w);
            }
            chunk.len()
        });
    }
    w.write_block_end();
}

/// Calls `block` with the item count of every block until the terminating
/// empty block or the first error. The summed count is held to the item limit
/// before any block is handed out.
pub(crate) fn read_blocks(r: &mut Reader<'_>, mut block: impl FnMut(&mut Reader<'_>, usize)) {
    let mut total = 0usize;
    loop {
        let (count, _) = r.read_block_header();
        if count == 0 || r.has_error() {
            return;
        }
        total = total.saturating_add(count);
        if !r.ensure_items(total) {
            return;
        }
        block(r, count);
        if r.has_error() {
            return;
        }
    }
}

fn is_bytes<T: 'static>() -> bool {
    TypeId::of::<T>() == TypeId::of::<u8>()
}

impl<T: Avro> Avro for Vec<T> {
    fn avro_type() -> TypeDesc {
        TypeDesc::of::<Vec<T>>(TypeKind::Seq(T::avro_type))
    }

    fn avro_default() -> Self {
        Vec::new()
    }

    fn avro_encoder(schema: &Schema, ctx: &mut BuildContext<'_>) -> Result<EncodeFn<Self>, Error> {
        match schema {
            Schema::Primitive(p) if p.ty() == PrimitiveType::Bytes && is_bytes::<T>() => {
                Ok(Arc::new(|v: &Vec<T>, w: &mut Writer| {
                    if let Some(bytes) = (v as &dyn Any).downcast_ref::<Vec<u8>>() {
                        w.write_bytes(bytes);
                    }
                }))
            }
            Schema::Array(array) => {
                let encode = ctx.encoder::<T>(array.items())?;
                Ok(Arc::new(move |v: &Vec<T>, w: &mut Writer| {
                    write_blocks(v, w, &encode)
                }))
            }
            _ => Err(mismatch::<Self>(schema)),
        }
    }

    fn avro_decoder(schema: &Schema, ctx: &mut BuildContext<'_>) -> Result<DecodeFn<Self>, Error> {
        match schema {
            Schema::Primitive(p) if p.ty() == PrimitiveType::Bytes && is_bytes::<T>() => {
                Ok(Arc::new(|v: &mut Vec<T>, r: &mut Reader<'_>| {
                    if let Some(bytes) = (v as &mut dyn Any).downcast_mut::<Vec<u8>>() {
                        bytes.clear();
                        bytes.extend_from_slice(r.read_bytes());
                    }
                }))
            }
            Schema::Array(array) => {
                let decode = ctx.decoder::<T>(array.items())?;
                Ok(Arc::new(move |v: &mut Vec<T>, r: &mut Reader<'_>| {
                    v.clear();
                    read_blocks(r, |r, count| {
                        // a count is only a claim, never reserve past the input
                        v.reserve(count.min(r.remaining()));
                        for _ in 0..count {
                            let mut item = T::avro_default();
                            decode(&mut item, r);
                            if r.has_error() {
                                return;
                            }
                            v.push(item);
                        }
                    });
                }))
            }
            _ => Err(mismatch::<Self>(schema)),
        }
    }
}

impl<T: Avro, const N: usize> Avro for [T; N] {
    fn avro_type() -> TypeDesc {
        TypeDesc::of::<[T; N]>(TypeKind::Array(T::avro_type, N))
    }

    fn avro_default() -> Self {
        std::array::from_fn(|_| T::avro_default())
    }

    fn avro_encoder(schema: &Schema, ctx: &mut BuildContext<'_>) -> Result<EncodeFn<Self>, Error> {
        let Schema::Array(array) = schema else {
            return Err(mismatch::<Self>(schema));
        };
        let encode = ctx.encoder::<T>(array.items())?;
        Ok(Arc::new(move |v: &[T; N], w: &mut Writer| {
            write_blocks(v.as_slice(), w, &encode)
        }))
    }

    fn avro_decoder(schema: &Schema, ctx: &mut BuildContext<'_>) -> Result<DecodeFn<Self>, Error> {
        let Schema::Array(array) = schema else {
            return Err(mismatch::<Self>(schema));
        };
        let decode = ctx.decoder::<T>(array.items())?;
        Ok(Arc::new(move |v: &mut [T; N], r: &mut Reader<'_>| {
            *v = Self::avro_default();
            let mut index = 0;
            read_blocks(r, |r, count| {
                if count > N - index {
                    r.set_error(Error::decode_error(format!(
                        "array of length {N} cannot hold {} items",
                        index.saturating_add(count)
                    )));
                    return;
                }
                for _ in 0..count {
                    decode(&mut v[index], r);
                    if r.has_error() {
                        return;
                    }
                    index += 1;
                }
            });
        }))
    }
}
