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
use crate::config::Config;
use crate::error::Error;
use crate::resolver::codec_resolver::CodecResolver;
use crate::resolver::pool::Pool;
use crate::resolver::schema_resolver::SchemaResolver;
use crate::schema::Schema;
use crate::serializer::Avro;

/// Build counters of a handle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// Top-level schema derivations.
    pub schema_derivations: usize,
    /// Codecs constructed, nested ones included.
    pub codec_builds: usize,
}

/// Entry point for encoding and decoding.
///
/// A handle owns the schema cache, the codec cache and the writer pool.
/// It is cheap to share between threads behind an `Arc` or a `static`.
///
/// ```rust
/// use stavro_core::Stavro;
///
/// let stavro = Stavro::default();
/// let bytes = stavro.marshal(&vec![1i64, -2, 3]).unwrap();
/// let decoded: Vec<i64> = stavro.deserialize(&bytes).unwrap();
/// assert_eq!(decoded, vec![1, -2, 3]);
/// ```
pub struct Stavro {
    config: Arc<Config>,
    schemas: SchemaResolver,
    codecs: CodecResolver,
    writers: Pool<Writer>,
}

impl Default for Stavro {
    fn default() -> Self {
        Stavro::with_config(Arc::new(Config::default()))
    }
}

impl Stavro {
    pub fn new(config: Config) -> Result<Self, Error> {
        Ok(Stavro::with_config(Arc::new(config.normalized()?)))
    }

    fn with_config(config: Arc<Config>) -> Self {
        let writer_config = Arc::clone(&config);
        Stavro {
            schemas: SchemaResolver::new(config.tag_key()),
            codecs: CodecResolver::new(config.is_caching()),
            writers: Pool::new(move || Writer::new(Arc::clone(&writer_config))),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The schema derived for `T`.
    pub fn schema<T: Avro>(&self) -> Result<Schema, Error> {
        self.schemas.schema_of::<T>()
    }

    /// The JSON text of the schema derived for `T`.
    pub fn schema_of<T: Avro>(&self) -> Result<String, Error> {
        Ok(self.schema::<T>()?.to_string())
    }

    /// Derives and caches the schema of `T` ahead of first use.
    pub fn try_register<T: Avro>(&self) -> Result<(), Error> {
        self.schema::<T>().map(|_| ())
    }

    /// Like [`Stavro::try_register`], but panics when `T` has no schema.
    /// Meant for startup code that should fail fast.
    pub fn register<T: Avro>(&self) {
        if let Err(err) = self.try_register::<T>() {
            panic!("register {} failed: {err}", std::any::type_name::<T>());
        }
    }

    pub fn marshal<T: Avro>(&self, value: &T) -> Result<Vec<u8>, Error> {
        let schema = self.schema::<T>()?;
        self.marshal_with(&schema, value)
    }

    /// Encodes `value` against an explicit schema.
    pub fn marshal_with<T: Avro>(&self, schema: &Schema, value: &T) -> Result<Vec<u8>, Error> {
        let encode = self.codecs.encoder::<T>(&self.config, schema)?;
        self.writers.borrow_mut(|writer| {
            encode(value, writer);
            writer.dump()
        })
    }

    /// Decodes `bytes` into `value`. Empty input leaves `value` untouched and
    /// is not an error. Bytes after the value are ignored.
    pub fn unmarshal<T: Avro>(&self, bytes: &[u8], value: &mut T) -> Result<(), Error> {
        let schema = self.schema::<T>()?;
        self.unmarshal_with(&schema, bytes, value)
    }

    /// Decodes `bytes`, written with `schema`, into `value`.
    pub fn unmarshal_with<T: Avro>(
        &self,
        schema: &Schema,
        bytes: &[u8],
        value: &mut T,
    ) -> Result<(), Error> {
        let decode = self.codecs.decoder::<T>(&self.config, schema)?;
        let mut reader = Reader::new(bytes, &self.config);
        decode(value, &mut reader);
        match reader.into_error() {
            Some(err) if err.is_empty_input() => Ok(()),
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Decodes a fresh `T`. The schema is resolved before a default value is
    /// built, so a type without a schema fails here rather than in its default.
    pub fn deserialize<T: Avro>(&self, bytes: &[u8]) -> Result<T, Error> {
        let schema = self.schema::<T>()?;
        let mut value = T::avro_default();
        self.unmarshal_with(&schema, bytes, &mut value)?;
        Ok(value)
    }

    /// [`Stavro::marshal`] that panics on error.
    pub fn must_marshal<T: Avro>(&self, value: &T) -> Vec<u8> {
        match self.marshal(value) {
            Ok(bytes) => bytes,
            Err(err) => panic!("marshal {} failed: {err}", std::any::type_name::<T>()),
        }
    }

    /// [`Stavro::unmarshal`] that panics on error.
    pub fn must_unmarshal<T: Avro>(&self, bytes: &[u8], value: &mut T) {
        if let Err(err) = self.unmarshal(bytes, value) {
            panic!("unmarshal {} failed: {err}", std::any::type_name::<T>());
        }
    }

    pub fn stats(&self) -> Stats {
        Stats {
            schema_derivations: self.schemas.derivations(),
            codec_builds: self.codecs.builds(),
        }
    }
}
