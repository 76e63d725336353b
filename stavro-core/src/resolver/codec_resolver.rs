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

use std::any::TypeId;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

use crate::config::Config;
use crate::error::Error;
use crate::resolver::context::{downcast, AnyCodec, BuildContext, Codec};
use crate::schema::{Fingerprint, Schema};
use crate::serializer::{Avro, DecodeFn, EncodeFn};
use crate::util::SingleFlight;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Encode,
    Decode,
}

/// Identity of a cached codec: the schema it was built against, the Rust
/// type it reads or writes, and which way it goes.
///
/// The schema is identified by its full document rather than its canonical
/// form, since codecs accept or reject schemas by logical type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CodecKey {
    pub fingerprint: Fingerprint,
    pub type_id: TypeId,
    pub direction: Direction,
}

impl CodecKey {
    pub fn new<T: 'static>(schema: &Schema, direction: Direction) -> Self {
        CodecKey {
            fingerprint: schema.document_fingerprint(),
            type_id: TypeId::of::<T>(),
            direction,
        }
    }
}

/// Process-lifetime encoder and decoder cache of one handle.
///
/// Entries are published once and never replaced. Concurrent first builds of
/// the same key run once, the other callers wait for and share the outcome.
pub struct CodecResolver {
    cache: DashMap<CodecKey, AnyCodec>,
    flight: SingleFlight<CodecKey, AnyCodec>,
    caching: bool,
    builds: AtomicUsize,
}

impl CodecResolver {
    pub fn new(caching: bool) -> Self {
        CodecResolver {
            cache: DashMap::new(),
            flight: SingleFlight::new(),
            caching,
            builds: AtomicUsize::new(0),
        }
    }

    pub fn encoder<T: Avro>(&self, config: &Config, schema: &Schema) -> Result<EncodeFn<T>, Error> {
        self.get::<EncodeFn<T>>(config, schema)
    }

    pub fn decoder<T: Avro>(&self, config: &Config, schema: &Schema) -> Result<DecodeFn<T>, Error> {
        self.get::<DecodeFn<T>>(config, schema)
    }

    /// Number of codecs constructed so far, nested ones included.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub(crate) fn record_build(&self) {
        self.builds.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn cached<C: Codec>(&self, key: &CodecKey) -> Option<C> {
        if !self.caching {
            return None;
        }
        let entry = self.cache.get(key)?;
        downcast::<C>(entry.value()).ok()
    }

    fn get<C: Codec>(&self, config: &Config, schema: &Schema) -> Result<C, Error> {
        let key = CodecKey::new::<C::Value>(schema, C::DIRECTION);
        if let Some(codec) = self.cached::<C>(&key) {
            return Ok(codec);
        }
        let (result, shared) = self.flight.work(&key, || {
            // a build may have finished between the lookup and the flight
            if let Some(codec) = self.cached::<C>(&key) {
                return Ok(Arc::new(codec) as AnyCodec);
            }
            let mut ctx = BuildContext::new(config, self, schema);
            let codec = ctx.codec::<C>(schema)?;
            if self.caching {
                for (key, codec) in ctx.finish() {
                    self.cache.entry(key).or_insert(codec);
                }
            }
            Ok(Arc::new(codec) as AnyCodec)
        });
        if shared {
            trace!(
                ty = std::any::type_name::<C::Value>(),
                direction = ?C::DIRECTION,
                "shared a coalesced codec build"
            );
        }
        downcast::<C>(&result?)
    }
}
