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

//! Per-build state for codec construction.
//!
//! A top-level build walks the schema graph once. Every nested codec it
//! produces is kept in a build-local memo and only published to the shared
//! cache after the whole build succeeded, so a failed build leaves nothing
//! half-built behind. Recursive schemas are handled with in-flight slots: a
//! codec that is requested while it is still being built gets a forwarder to
//! a slot that is filled once the outer build finishes.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, Weak};

use tracing::debug;

use crate::buffer::{Reader, Writer};
use crate::config::Config;
use crate::error::Error;
use crate::resolver::codec_resolver::{CodecKey, CodecResolver, Direction};
use crate::schema::Schema;
use crate::serializer::{Avro, DecodeFn, EncodeFn};

pub(crate) type AnyCodec = Arc<dyn Any + Send + Sync>;

/// Named records and fixeds of one schema graph, by full name.
pub type NamedSchemas = HashMap<String, Schema>;

/// An encoder or decoder for one type.
pub(crate) trait Codec: Clone + Send + Sync + 'static {
    type Value: Avro;
    const DIRECTION: Direction;

    fn build(schema: &Schema, ctx: &mut BuildContext<'_>) -> Result<Self, Error>;

    /// Forwards to a codec that is still under construction.
    fn deferred(slot: Weak<OnceLock<Self>>) -> Self;

    /// Wraps a finished recursive codec so that it owns its slot.
    fn owning(slot: Arc<OnceLock<Self>>) -> Self;
}

#[cold]
fn unfilled(direction: Direction) -> String {
    format!("recursive {direction:?} codec used before it was built")
}

impl<T: Avro> Codec for EncodeFn<T> {
    type Value = T;
    const DIRECTION: Direction = Direction::Encode;

    fn build(schema: &Schema, ctx: &mut BuildContext<'_>) -> Result<Self, Error> {
        T::avro_encoder(schema, ctx)
    }

    fn deferred(slot: Weak<OnceLock<Self>>) -> Self {
        Arc::new(move |v: &T, w: &mut Writer| {
            match slot.upgrade().as_deref().and_then(OnceLock::get) {
                Some(encode) => encode(v, w),
                None => w.set_error(Error::encode_error(unfilled(Direction::Encode))),
            }
        })
    }

    fn owning(slot: Arc<OnceLock<Self>>) -> Self {
        Arc::new(move |v: &T, w: &mut Writer| match slot.get() {
            Some(encode) => encode(v, w),
            None => w.set_error(Error::encode_error(unfilled(Direction::Encode))),
        })
    }
}

impl<T: Avro> Codec for DecodeFn<T> {
    type Value = T;
    const DIRECTION: Direction = Direction::Decode;

    fn build(schema: &Schema, ctx: &mut BuildContext<'_>) -> Result<Self, Error> {
        T::avro_decoder(schema, ctx)
    }

    fn deferred(slot: Weak<OnceLock<Self>>) -> Self {
        Arc::new(move |v: &mut T, r: &mut Reader<'_>| {
            match slot.upgrade().as_deref().and_then(OnceLock::get) {
                Some(decode) => decode(v, r),
                None => r.set_error(Error::decode_error(unfilled(Direction::Decode))),
            }
        })
    }

    fn owning(slot: Arc<OnceLock<Self>>) -> Self {
        Arc::new(move |v: &mut T, r: &mut Reader<'_>| match slot.get() {
            Some(decode) => decode(v, r),
            None => r.set_error(Error::decode_error(unfilled(Direction::Decode))),
        })
    }
}

pub struct BuildContext<'a> {
    config: &'a Config,
    codecs: &'a CodecResolver,
    named: Arc<NamedSchemas>,
    memo: HashMap<CodecKey, AnyCodec>,
    in_flight: HashMap<CodecKey, AnyCodec>,
}

impl<'a> BuildContext<'a> {
    pub(crate) fn new(config: &'a Config, codecs: &'a CodecResolver, root: &Schema) -> Self {
        let mut named = NamedSchemas::new();
        root.for_each_named(&mut |schema| {
            if let Some(name) = schema.name() {
                named
                    .entry(name.full_name().to_string())
                    .or_insert_with(|| schema.clone());
            }
        });
        BuildContext {
            config,
            codecs,
            named: Arc::new(named),
            memo: HashMap::new(),
            in_flight: HashMap::new(),
        }
    }

    #[inline(always)]
    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// The named types of the schema graph being built.
    pub fn named_schemas(&self) -> &Arc<NamedSchemas> {
        &self.named
    }

    /// Follows a reference to the schema it names. Other schemas are returned as is.
    pub fn resolve(&self, schema: &Schema) -> Result<Schema, Error> {
        match schema {
            Schema::Ref(r) => self
                .named
                .get(r.name().full_name())
                .cloned()
                .ok_or_else(|| Error::schema_error(format!("unknown named type {}", r.name()))),
            other => Ok(other.clone()),
        }
    }

    pub fn encoder<T: Avro>(&mut self, schema: &Schema) -> Result<EncodeFn<T>, Error> {
        self.codec::<EncodeFn<T>>(schema)
    }

    pub fn decoder<T: Avro>(&mut self, schema: &Schema) -> Result<DecodeFn<T>, Error> {
        self.codec::<DecodeFn<T>>(schema)
    }

    pub(crate) fn codec<C: Codec>(&mut self, schema: &Schema) -> Result<C, Error> {
        let schema = self.resolve(schema)?;
        let key = CodecKey::new::<C::Value>(&schema, C::DIRECTION);
        if let Some(codec) = self.codecs.cached::<C>(&key) {
            return Ok(codec);
        }
        if let Some(codec) = self.memo.get(&key) {
            return downcast::<C>(codec);
        }
        if let Some(slot) = self.in_flight.get(&key) {
            let slot = downcast::<Arc<OnceLock<C>>>(slot)?;
            return Ok(C::deferred(Arc::downgrade(&slot)));
        }

        let slot: Arc<OnceLock<C>> = Arc::new(OnceLock::new());
        self.in_flight.insert(key, Arc::new(Arc::clone(&slot)));
        let built = C::build(&schema, self);
        self.in_flight.remove(&key);
        let built = built.map_err(|err| {
            if err.is_build() {
                err
            } else {
                Error::build_error(std::any::type_name::<C::Value>(), err)
            }
        })?;

        self.codecs.record_build();
        debug!(
            ty = std::any::type_name::<C::Value>(),
            direction = ?C::DIRECTION,
            schema = schema.type_name(),
            fingerprint = %key.fingerprint,
            "built codec"
        );
        let codec = if Arc::weak_count(&slot) > 0 {
            // something inside the codec refers back to it
            let _ = slot.set(built);
            C::owning(slot)
        } else {
            built
        };
        self.memo.insert(key, Arc::new(codec.clone()));
        Ok(codec)
    }

    /// Every codec produced by this build.
    pub(crate) fn finish(self) -> HashMap<CodecKey, AnyCodec> {
        self.memo
    }
}

pub(crate) fn downcast<C: Clone + 'static>(codec: &AnyCodec) -> Result<C, Error> {
    codec.downcast_ref::<C>().cloned().ok_or_else(|| {
        Error::schema_error(format!(
            "cached codec is not a {}",
            std::any::type_name::<C>()
        ))
    })
}
