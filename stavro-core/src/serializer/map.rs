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

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::Arc;

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::resolver::context::BuildContext;
use crate::schema::Schema;
use crate::serializer::list::read_blocks;
use crate::serializer::{mismatch, Avro, DecodeFn, EncodeFn};
use crate::types::{TypeDesc, TypeKind};

fn write_entries<'m, K: 'm, V: 'm>(
    entries: impl Iterator<Item = (&'m K, &'m V)>,
    w: &mut Writer,
    key: &EncodeFn<K>,
    value: &EncodeFn<V>,
) {
    let block_length = w.config().block_length().max(1);
    let mut entries = entries.peekable();
    while entries.peek().is_some() {
        w.write_block(|w| {
            let mut count = 0;
            for (k, v) in entries.by_ref().take(block_length) {
                key(k, w);
                value(v, w);
                count += 1;
            }
            count
        });
        if w.has_error() {
            return;
        }
    }
    w.write_block_end();
}

/// Map keys are always Avro strings.
macro_rules! impl_map_serializer {
    ($map:ident, $($key_bound:path),+) => {
        impl<K: Avro $(+ $key_bound)+, V: Avro> Avro for $map<K, V> {
            fn avro_type() -> TypeDesc {
                TypeDesc::of::<$map<K, V>>(TypeKind::Map(K::avro_type, V::avro_type))
            }

            fn avro_default() -> Self {
                $map::new()
            }

            fn avro_encoder(
                schema: &Schema,
                ctx: &mut BuildContext<'_>,
            ) -> Result<EncodeFn<Self>, Error> {
                let Schema::Map(map) = schema else {
                    return Err(mismatch::<Self>(schema));
                };
                let key = ctx.encoder::<K>(&Schema::string())?;
                let value = ctx.encoder::<V>(map.values())?;
                Ok(Arc::new(move |v: &$map<K, V>, w: &mut Writer| {
                    write_entries(v.iter(), w, &key, &value)
                }))
            }

            fn avro_decoder(
                schema: &Schema,
                ctx: &mut BuildContext<'_>,
            ) -> Result<DecodeFn<Self>, Error> {
                let Schema::Map(map) = schema else {
                    return Err(mismatch::<Self>(schema));
                };
                let key = ctx.decoder::<K>(&Schema::string())?;
                let value = ctx.decoder::<V>(map.values())?;
                Ok(Arc::new(move |v: &mut $map<K, V>, r: &mut Reader<'_>| {
                    v.clear();
                    read_blocks(r, |r, count| {
                        for _ in 0..count {
                            let mut k = K::avro_default();
                            key(&mut k, r);
                            let mut item = V::avro_default();
                            value(&mut item, r);
                            if r.has_error() {
                                return;
                            }
                            v.insert(k, item);
                        }
                    });
                }))
            }
        }
    };
}

impl_map_serializer!(HashMap, Eq, Hash);
impl_map_serializer!(BTreeMap, Ord);
