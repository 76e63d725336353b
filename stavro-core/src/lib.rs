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

//! # Stavro Core
//!
//! Avro binary encoding driven by Rust types. A schema is derived from the
//! shape of a type, an encoder and a decoder are built for that schema once,
//! and both are reused for every later value of the type.
//!
//! ## Modules
//!
//! - **`buffer`**: the wire format, with sticky-error [`Writer`](buffer::Writer)
//!   and [`Reader`](buffer::Reader)
//! - **`schema`**: the schema model, canonical form and fingerprints
//! - **`types`**: type descriptors consumed by schema derivation
//! - **`resolver`**: schema and codec caches, build coalescing, writer pool
//! - **`serializer`**: the [`Avro`] trait and its implementations
//! - **`stavro`**: the [`Stavro`] handle tying everything together
//!
//! ## Type mapping
//!
//! | Rust | Avro |
//! |------|------|
//! | `bool` | `boolean` |
//! | `i8`, `i16`, `i32`, `u8`, `u16` | `int` |
//! | `i64`, `isize`, `u32` | `long` |
//! | `u64`, `usize` | `fixed` named `uint`, 8 bytes, `decimal` |
//! | `f32` / `f64` | `float` / `double` |
//! | `String` | `string` |
//! | `Vec<u8>` | `bytes` |
//! | `Vec<T>`, `[T; N]` | `array` |
//! | `HashMap<String, V>`, `BTreeMap<String, V>` | `map` |
//! | `Option<T>` for a struct `T` | `["null", T]` defaulting to null |
//! | `chrono::DateTime<Utc>`, `NaiveDateTime` | `long` / `timestamp-micros` |
//! | `std::time::Duration`, `chrono::Duration` | `long` / `duration-micros` |
//! | `#[derive(AvroObject)]` struct | `record` |
//! | `#[avro(raw)]` types, [`RawMessage`] | `bytes` written by the type itself |
//!
//! This crate is normally used through the `stavro` crate, which adds the
//! derive macro and process-wide convenience functions.

pub mod buffer;
pub mod config;
pub mod error;
pub mod resolver;
pub mod schema;
pub mod serializer;
pub mod stavro;
pub mod types;
pub mod util;

pub use crate::config::Config;
pub use crate::error::Error;
pub use crate::schema::Schema;
pub use crate::serializer::{Avro, AvroMarshaler, AvroStruct, AvroUnmarshaler, RawMessage};
pub use crate::stavro::{Stats, Stavro};
