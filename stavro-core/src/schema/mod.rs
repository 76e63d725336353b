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

//! The schema data model.
//!
//! A [`Schema`] is a cheap-to-clone handle (every variant but `Raw` is an
//! `Arc`). Recursive and repeated named types are expressed with
//! [`Schema::Ref`] nodes that point at a record or fixed defined elsewhere in
//! the same graph, so every schema is a finite tree.

mod canonical;
mod name;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use canonical::Fingerprints;
pub use canonical::Fingerprint;
pub use name::Name;

use crate::ensure;
use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
}

impl PrimitiveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::Null => "null",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Bytes => "bytes",
            PrimitiveType::String => "string",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogicalType {
    TimestampMicros,
    DurationMicros,
    Decimal { precision: usize, scale: usize },
}

impl LogicalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalType::TimestampMicros => "timestamp-micros",
            LogicalType::DurationMicros => "duration-micros",
            LogicalType::Decimal { .. } => "decimal",
        }
    }
}

#[derive(Debug)]
pub struct PrimitiveSchema {
    ty: PrimitiveType,
    logical: Option<LogicalType>,
    fingerprints: Fingerprints,
}

impl PrimitiveSchema {
    pub fn ty(&self) -> PrimitiveType {
        self.ty
    }

    pub fn logical(&self) -> Option<LogicalType> {
        self.logical
    }
}

#[derive(Debug)]
pub struct FixedSchema {
    name: Name,
    size: usize,
    logical: Option<LogicalType>,
    fingerprints: Fingerprints,
}

impl FixedSchema {
    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn logical(&self) -> Option<LogicalType> {
        self.logical
    }
}

#[derive(Clone, Debug)]
pub struct Field {
    name: String,
    schema: Schema,
    default: Option<serde_json::Value>,
}

impl Field {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Field {
            name: name.into(),
            schema,
            default: None,
        }
    }

    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn default(&self) -> Option<&serde_json::Value> {
        self.default.as_ref()
    }
}

#[derive(Debug)]
pub struct RecordSchema {
    name: Name,
    fields: Vec<Field>,
    positions: HashMap<String, usize>,
    fingerprints: Fingerprints,
}

impl RecordSchema {
    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Wire position of the field called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }
}

#[derive(Debug)]
pub struct UnionSchema {
    branches: Vec<Schema>,
    fingerprints: Fingerprints,
}

impl UnionSchema {
    pub fn branches(&self) -> &[Schema] {
        &self.branches
    }

    pub fn null_index(&self) -> Option<usize> {
        self.branches.iter().position(Schema::is_null)
    }
}

#[derive(Debug)]
pub struct ArraySchema {
    items: Schema,
    fingerprints: Fingerprints,
}

impl ArraySchema {
    pub fn items(&self) -> &Schema {
        &self.items
    }
}

#[derive(Debug)]
pub struct MapSchema {
    values: Schema,
    fingerprints: Fingerprints,
}

impl MapSchema {
    pub fn values(&self) -> &Schema {
        &self.values
    }
}

#[derive(Debug)]
pub struct RefSchema {
    name: Name,
    fingerprints: Fingerprints,
}

impl RefSchema {
    pub fn name(&self) -> &Name {
        &self.name
    }
}

#[derive(Clone, Debug)]
pub enum Schema {
    Primitive(Arc<PrimitiveSchema>),
    Fixed(Arc<FixedSchema>),
    Record(Arc<RecordSchema>),
    Union(Arc<UnionSchema>),
    Array(Arc<ArraySchema>),
    Map(Arc<MapSchema>),
    /// A record or fixed defined elsewhere in the same graph.
    Ref(Arc<RefSchema>),
    /// Opaque bytes produced and consumed by a type's own hooks.
    Raw,
}

impl Schema {
    pub fn primitive(ty: PrimitiveType) -> Schema {
        Schema::Primitive(Arc::new(PrimitiveSchema {
            ty,
            logical: None,
            fingerprints: Fingerprints::new(),
        }))
    }

    pub fn logical(ty: PrimitiveType, logical: LogicalType) -> Schema {
        Schema::Primitive(Arc::new(PrimitiveSchema {
            ty,
            logical: Some(logical),
            fingerprints: Fingerprints::new(),
        }))
    }

    pub fn null() -> Schema {
        Schema::primitive(PrimitiveType::Null)
    }

    pub fn string() -> Schema {
        Schema::primitive(PrimitiveType::String)
    }

    pub fn fixed(name: Name, size: usize, logical: Option<LogicalType>) -> Result<Schema, Error> {
        ensure!(
            size > 0,
            Error::config_error(format!("fixed {name} must have a positive size"))
        );
        match logical {
            Some(LogicalType::Decimal { precision, scale }) => {
                let max = max_decimal_precision(size);
                ensure!(
                    precision > 0 && precision <= max,
                    Error::config_error(format!(
                        "fixed {name} of {size} bytes cannot hold decimal precision {precision}"
                    ))
                );
                ensure!(
                    scale <= precision,
                    Error::config_error(format!(
                        "fixed {name}: decimal scale {scale} exceeds precision {precision}"
                    ))
                );
            }
            Some(other) => {
                return Err(Error::config_error(format!(
                    "fixed {name} cannot carry logical type {}",
                    other.as_str()
                )))
            }
            None => {}
        }
        Ok(Schema::Fixed(Arc::new(FixedSchema {
            name,
            size,
            logical,
            fingerprints: Fingerprints::new(),
        })))
    }

    pub fn record(name: Name, fields: Vec<Field>) -> Result<Schema, Error> {
        let mut positions = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            ensure!(
                positions.insert(field.name.clone(), i).is_none(),
                Error::schema_error(format!(
                    "duplicate field name {} in record {name}",
                    field.name
                ))
            );
        }
        Ok(Schema::Record(Arc::new(RecordSchema {
            name,
            fields,
            positions,
            fingerprints: Fingerprints::new(),
        })))
    }

    /// Builds a union. Unions may not nest, and no two branches may share an
    /// unnamed type or a name.
    pub fn union(branches: Vec<Schema>) -> Result<Schema, Error> {
        let mut seen = HashSet::with_capacity(branches.len());
        for branch in &branches {
            ensure!(
                !matches!(branch, Schema::Union(_)),
                Error::schema_error("union may not directly contain a union")
            );
            let key = match branch.name() {
                Some(name) => name.full_name().to_string(),
                None => branch.type_name().to_string(),
            };
            ensure!(
                seen.insert(key.clone()),
                Error::schema_error(format!("duplicate union branch {key}"))
            );
        }
        Ok(Schema::Union(Arc::new(UnionSchema {
            branches,
            fingerprints: Fingerprints::new(),
        })))
    }

    pub fn array(items: Schema) -> Schema {
        Schema::Array(Arc::new(ArraySchema {
            items,
            fingerprints: Fingerprints::new(),
        }))
    }

    pub fn map(values: Schema) -> Schema {
        Schema::Map(Arc::new(MapSchema {
            values,
            fingerprints: Fingerprints::new(),
        }))
    }

    pub fn reference(name: Name) -> Schema {
        Schema::Ref(Arc::new(RefSchema {
            name,
            fingerprints: Fingerprints::new(),
        }))
    }

    /// Short kind name used in messages: `record`, `int`, `ref`, ...
    pub fn type_name(&self) -> &'static str {
        match self {
            Schema::Primitive(p) => p.ty.as_str(),
            Schema::Fixed(_) => "fixed",
            Schema::Record(_) => "record",
            Schema::Union(_) => "union",
            Schema::Array(_) => "array",
            Schema::Map(_) => "map",
            Schema::Ref(_) => "ref",
            Schema::Raw => "raw",
        }
    }

    /// The name of a record, fixed or reference.
    pub fn name(&self) -> Option<&Name> {
        match self {
            Schema::Fixed(f) => Some(&f.name),
            Schema::Record(r) => Some(&r.name),
            Schema::Ref(r) => Some(&r.name),
            _ => None,
        }
    }

    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        match self {
            Schema::Primitive(p) => Some(p.ty),
            _ => None,
        }
    }

    pub fn logical_type(&self) -> Option<LogicalType> {
        match self {
            Schema::Primitive(p) => p.logical,
            Schema::Fixed(f) => f.logical,
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        self.primitive_type() == Some(PrimitiveType::Null)
    }

    /// Visits every record and fixed defined (not merely referenced) in this graph.
    pub fn for_each_named(&self, visit: &mut dyn FnMut(&Schema)) {
        match self {
            Schema::Fixed(_) => visit(self),
            Schema::Record(r) => {
                visit(self);
                for field in &r.fields {
                    field.schema.for_each_named(visit);
                }
            }
            Schema::Union(u) => u.branches.iter().for_each(|b| b.for_each_named(visit)),
            Schema::Array(a) => a.items.for_each_named(visit),
            Schema::Map(m) => m.values.for_each_named(visit),
            Schema::Primitive(_) | Schema::Ref(_) | Schema::Raw => {}
        }
    }
}

impl fmt::Display for Schema {
    /// The full JSON schema document.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

fn max_decimal_precision(size: usize) -> usize {
    ((8 * size) as f64 * std::f64::consts::LOG10_2).floor() as usize + 1
}
