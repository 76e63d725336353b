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

//! Derivation of schemas from [`TypeDesc`]s.
//!
//! Named types (records and the `uint` fixed) are defined once per schema
//! graph. While a record is being derived it sits in the processing registry,
//! so reaching it again through a pointer, a collection or a later field
//! yields a [`Schema::Ref`] instead of another definition. That is what keeps
//! self-referential types finite.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::Error;
use crate::schema::{Field, LogicalType, Name, PrimitiveType, Schema};
use crate::serializer::unsigned_number::{UINT_NAME, UINT_PRECISION, UINT_SIZE};
use crate::serializer::Avro;
use crate::types::{StructDesc, TypeDesc, TypeKind};
use crate::util::{normalize_namespace, SingleFlight};

/// Derived-name key of a type. Types sharing a key share a schema.
pub fn schema_key(desc: &TypeDesc) -> Result<String, Error> {
    let key = match desc.kind {
        TypeKind::Bool => PrimitiveType::Boolean.as_str().to_string(),
        TypeKind::Int8
        | TypeKind::Int16
        | TypeKind::Int32
        | TypeKind::UInt8
        | TypeKind::UInt16 => PrimitiveType::Int.as_str().to_string(),
        TypeKind::Int64 | TypeKind::SignedSize | TypeKind::UInt32 => {
            PrimitiveType::Long.as_str().to_string()
        }
        TypeKind::Float32 => PrimitiveType::Float.as_str().to_string(),
        TypeKind::Float64 => PrimitiveType::Double.as_str().to_string(),
        TypeKind::String => PrimitiveType::String.as_str().to_string(),
        TypeKind::Timestamp => "long.timestamp-micros".to_string(),
        TypeKind::Duration => "long.duration-micros".to_string(),
        TypeKind::UInt64 | TypeKind::Size => "fixed.decimal".to_string(),
        TypeKind::Raw { name, namespace } => full_name(name, namespace),
        TypeKind::Struct(sd) => full_name(sd.name, sd.module_path),
        TypeKind::Pointer(elem) => {
            let elem = elem();
            if !elem.is_structure() {
                return Err(pointer_error(desc));
            }
            format!("{}_ptr", schema_key(&elem)?)
        }
        TypeKind::Seq(elem) => {
            let elem = elem();
            if matches!(elem.kind, TypeKind::UInt8) {
                PrimitiveType::Bytes.as_str().to_string()
            } else {
                format!("{}_slice", schema_key(&elem)?)
            }
        }
        TypeKind::Array(elem, _) => format!("{}_array", schema_key(&elem())?),
        TypeKind::Map(key, value) => {
            if !key().is_string() {
                return Err(map_key_error(desc));
            }
            format!("{}_map", schema_key(&value())?)
        }
        TypeKind::Unsupported => return Err(unsupported(desc)),
    };
    Ok(key)
}

fn full_name(name: &str, module_path: &str) -> String {
    format!("{}.{}", normalize_namespace(module_path), name)
}

#[cold]
fn pointer_error(desc: &TypeDesc) -> Error {
    Error::schema_error(format!(
        "only pointer to structure supported, got {}",
        desc.type_name
    ))
}

#[cold]
fn map_key_error(desc: &TypeDesc) -> Error {
    Error::schema_error(format!("key of map must be string, got {}", desc.type_name))
}

#[cold]
fn unsupported(desc: &TypeDesc) -> Error {
    Error::schema_error(format!("type {} is unsupported", desc.type_name))
}

#[cold]
fn field_error(owner: &str, ident: &str, err: Error) -> Error {
    let reason = match err {
        Error::Schema(reason) => reason.into_owned(),
        other => other.to_string(),
    };
    Error::schema_error(format!("parse {owner}.{ident} failed: {reason}"))
}

/// Schema cache of one handle.
///
/// Top-level schemas are derived once per derived name, with concurrent first
/// requests for the same name coalesced into one derivation.
pub struct SchemaResolver {
    tag_key: String,
    by_type: DashMap<TypeId, Schema>,
    by_name: DashMap<String, Schema>,
    flight: SingleFlight<String, Schema>,
    derivations: AtomicUsize,
}

impl SchemaResolver {
    pub fn new(tag_key: impl Into<String>) -> Self {
        SchemaResolver {
            tag_key: tag_key.into(),
            by_type: DashMap::new(),
            by_name: DashMap::new(),
            flight: SingleFlight::new(),
            derivations: AtomicUsize::new(0),
        }
    }

    pub fn schema_of<T: Avro>(&self) -> Result<Schema, Error> {
        self.resolve(&T::avro_type())
    }

    pub fn resolve(&self, desc: &TypeDesc) -> Result<Schema, Error> {
        if let Some(schema) = self.by_type.get(&desc.type_id) {
            return Ok(schema.clone());
        }
        let key = schema_key(desc)?;
        let cached = self.by_name.get(&key).map(|schema| schema.clone());
        let schema = match cached {
            Some(schema) => schema,
            None => {
                let (result, shared) = self.flight.work(&key, || {
                    if let Some(schema) = self.by_name.get(&key) {
                        return Ok(schema.clone());
                    }
                    let schema = Derivation::new(self).derive(desc, false)?;
                    self.derivations.fetch_add(1, Ordering::Relaxed);
                    debug!(
                        ty = desc.type_name,
                        key = %key,
                        fingerprint = %schema.fingerprint(),
                        "derived schema"
                    );
                    self.by_name.entry(key.clone()).or_insert_with(|| schema.clone());
                    Ok(schema)
                });
                if shared {
                    trace!(ty = desc.type_name, key = %key, "shared a coalesced schema derivation");
                }
                result?
            }
        };
        self.by_type.insert(desc.type_id, schema.clone());
        Ok(schema)
    }

    /// Number of top-level derivations performed.
    pub fn derivations(&self) -> usize {
        self.derivations.load(Ordering::Relaxed)
    }
}

enum Entry {
    Building,
    Done,
}

/// State of one top-level derivation.
struct Derivation<'r> {
    resolver: &'r SchemaResolver,
    /// Named types defined so far in this graph, by full name.
    registry: HashMap<String, Entry>,
    /// Structs whose fields are currently being flattened.
    flattening: Vec<TypeId>,
}

impl<'r> Derivation<'r> {
    fn new(resolver: &'r SchemaResolver) -> Self {
        Derivation {
            resolver,
            registry: HashMap::new(),
            flattening: Vec::new(),
        }
    }

    /// `indirect` is set below a pointer or collection, where a reference back
    /// to a record under construction is allowed.
    fn derive(&mut self, desc: &TypeDesc, indirect: bool) -> Result<Schema, Error> {
        let schema = match desc.kind {
            TypeKind::Bool => Schema::primitive(PrimitiveType::Boolean),
            TypeKind::Int8
            | TypeKind::Int16
            | TypeKind::Int32
            | TypeKind::UInt8
            | TypeKind::UInt16 => Schema::primitive(PrimitiveType::Int),
            TypeKind::Int64 | TypeKind::SignedSize | TypeKind::UInt32 => {
                Schema::primitive(PrimitiveType::Long)
            }
            TypeKind::Float32 => Schema::primitive(PrimitiveType::Float),
            TypeKind::Float64 => Schema::primitive(PrimitiveType::Double),
            TypeKind::String => Schema::string(),
            TypeKind::Timestamp => {
                Schema::logical(PrimitiveType::Long, LogicalType::TimestampMicros)
            }
            TypeKind::Duration => Schema::logical(PrimitiveType::Long, LogicalType::DurationMicros),
            TypeKind::UInt64 | TypeKind::Size => self.uint()?,
            TypeKind::Raw { .. } => Schema::Raw,
            TypeKind::Struct(sd) => self.record(desc, sd, indirect)?,
            TypeKind::Pointer(elem) => {
                let elem = elem();
                if !elem.is_structure() {
                    return Err(pointer_error(desc));
                }
                let target = self.derive(&elem, true)?;
                Schema::union(vec![Schema::null(), target])?
            }
            TypeKind::Seq(elem) => {
                let elem = elem();
                if matches!(elem.kind, TypeKind::UInt8) {
                    Schema::primitive(PrimitiveType::Bytes)
                } else {
                    Schema::array(self.derive(&elem, true)?)
                }
            }
            TypeKind::Array(elem, _) => Schema::array(self.derive(&elem(), true)?),
            TypeKind::Map(key, value) => {
                if !key().is_string() {
                    return Err(map_key_error(desc));
                }
                Schema::map(self.derive(&value(), true)?)
            }
            TypeKind::Unsupported => return Err(unsupported(desc)),
        };
        Ok(schema)
    }

    fn uint(&mut self) -> Result<Schema, Error> {
        let name = Name::new(UINT_NAME);
        if self.registry.contains_key(name.full_name()) {
            return Ok(Schema::reference(name));
        }
        self.registry.insert(UINT_NAME.to_string(), Entry::Done);
        Schema::fixed(
            name,
            UINT_SIZE,
            Some(LogicalType::Decimal {
                precision: UINT_PRECISION,
                scale: 0,
            }),
        )
    }

    fn record(
        &mut self,
        desc: &TypeDesc,
        sd: &'static StructDesc,
        indirect: bool,
    ) -> Result<Schema, Error> {
        let name = Name::with_namespace(sd.name, normalize_namespace(sd.module_path));
        let key = name.full_name().to_string();
        match self.registry.get(&key) {
            Some(Entry::Building) if !indirect => {
                return Err(Error::schema_error(format!(
                    "self-referential field of type {} must be behind a pointer",
                    desc.type_name
                )))
            }
            Some(_) => return Ok(Schema::reference(name)),
            None => {}
        }
        if let Some(schema) = self.reuse(&key) {
            return Ok(schema);
        }

        self.registry.insert(key.clone(), Entry::Building);
        let mut fields = Vec::new();
        self.fields(desc, sd, &mut fields)?;
        let schema = Schema::record(name, fields)?;
        self.registry.insert(key, Entry::Done);
        Ok(schema)
    }

    /// A schema cached by an earlier derivation, usable here only when none
    /// of its named types is already defined in this graph.
    fn reuse(&mut self, key: &str) -> Option<Schema> {
        let schema = self.resolver.by_name.get(key)?.clone();
        let mut names = Vec::new();
        schema.for_each_named(&mut |named| {
            if let Some(name) = named.name() {
                names.push(name.full_name().to_string());
            }
        });
        if names.iter().any(|name| self.registry.contains_key(name)) {
            return None;
        }
        for name in names {
            self.registry.insert(name, Entry::Done);
        }
        Some(schema)
    }

    fn fields(
        &mut self,
        owner: &TypeDesc,
        sd: &'static StructDesc,
        out: &mut Vec<Field>,
    ) -> Result<(), Error> {
        let resolver = self.resolver;
        let tag_key = resolver.tag_key.as_str();
        for fd in (sd.fields)() {
            let ty = (fd.ty)();
            if fd.flatten {
                match ty.kind {
                    // an embedded pointer that is not pub is left out
                    TypeKind::Pointer(_) if !fd.public => continue,
                    TypeKind::Struct(inner) => {
                        if self.flattening.contains(&ty.type_id) {
                            return Err(field_error(
                                owner.type_name,
                                fd.ident,
                                Error::schema_error("flattened struct contains itself"),
                            ));
                        }
                        self.flattening.push(ty.type_id);
                        let flattened = self.fields(&ty, inner, out);
                        self.flattening.pop();
                        flattened?;
                    }
                    _ => {
                        return Err(field_error(
                            owner.type_name,
                            fd.ident,
                            Error::schema_error(format!(
                                "{} cannot be flattened, only structs can",
                                ty.type_name
                            )),
                        ))
                    }
                }
                continue;
            }

            let Some(name) = fd.avro_name(tag_key) else {
                continue;
            };
            let schema = self
                .derive(&ty, false)
                .map_err(|err| field_error(owner.type_name, fd.ident, err))?;
            if out.iter().any(|field| field.name() == name) {
                return Err(field_error(
                    owner.type_name,
                    fd.ident,
                    Error::schema_error(format!("tag name {name} is duplicated")),
                ));
            }
            let field = Field::new(name, schema);
            out.push(match ty.kind {
                TypeKind::Pointer(_) => field.with_default(Value::Null),
                _ => field,
            });
        }
        Ok(())
    }
}
