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

//! Canonical form, fingerprints and the JSON schema document.

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

use super::{LogicalType, Schema};

/// SHA-256 of a schema's canonical form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of(canonical_form: &str) -> Self {
        Fingerprint(Sha256::digest(canonical_form.as_bytes()).into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}

/// Hashes of one schema node, each computed on first use.
#[derive(Debug)]
pub(crate) struct Fingerprints {
    canonical: OnceLock<Fingerprint>,
    document: OnceLock<Fingerprint>,
}

impl Fingerprints {
    pub(crate) const fn new() -> Self {
        Fingerprints {
            canonical: OnceLock::new(),
            document: OnceLock::new(),
        }
    }
}

impl Schema {
    /// Parsing Canonical Form: full names, no namespaces, docs, defaults or
    /// logical types, attributes in a fixed order, and each named type spelled
    /// out only at its first occurrence.
    pub fn canonical_form(&self) -> String {
        self.canonical_value(&mut HashSet::new()).to_string()
    }

    fn fingerprints(&self) -> &Fingerprints {
        match self {
            Schema::Primitive(s) => &s.fingerprints,
            Schema::Fixed(s) => &s.fingerprints,
            Schema::Record(s) => &s.fingerprints,
            Schema::Union(s) => &s.fingerprints,
            Schema::Array(s) => &s.fingerprints,
            Schema::Map(s) => &s.fingerprints,
            Schema::Ref(s) => &s.fingerprints,
            Schema::Raw => {
                static RAW: Fingerprints = Fingerprints::new();
                &RAW
            }
        }
    }

    /// Content hash of [`Schema::canonical_form`], computed once per node.
    pub fn fingerprint(&self) -> Fingerprint {
        *self
            .fingerprints()
            .canonical
            .get_or_init(|| Fingerprint::of(&self.canonical_form()))
    }

    /// Hash of the full document. Schemas that share a canonical form but
    /// differ in logical types, `Raw` against `bytes` among them, hash apart.
    pub fn document_fingerprint(&self) -> Fingerprint {
        *self
            .fingerprints()
            .document
            .get_or_init(|| Fingerprint::of(&self.to_json().to_string()))
    }

    fn canonical_value(&self, seen: &mut HashSet<String>) -> Value {
        match self {
            Schema::Primitive(p) => Value::from(p.ty.as_str()),
            Schema::Raw => Value::from("bytes"),
            Schema::Ref(r) => Value::from(r.name.full_name()),
            Schema::Fixed(f) => {
                if !seen.insert(f.name.full_name().to_string()) {
                    return Value::from(f.name.full_name());
                }
                let mut obj = Map::new();
                obj.insert("name".into(), f.name.full_name().into());
                obj.insert("type".into(), "fixed".into());
                obj.insert("size".into(), f.size.into());
                Value::Object(obj)
            }
            Schema::Record(r) => {
                if !seen.insert(r.name.full_name().to_string()) {
                    return Value::from(r.name.full_name());
                }
                let fields: Vec<Value> = r
                    .fields
                    .iter()
                    .map(|field| {
                        let mut obj = Map::new();
                        obj.insert("name".into(), field.name.as_str().into());
                        obj.insert("type".into(), field.schema.canonical_value(seen));
                        Value::Object(obj)
                    })
                    .collect();
                let mut obj = Map::new();
                obj.insert("name".into(), r.name.full_name().into());
                obj.insert("type".into(), "record".into());
                obj.insert("fields".into(), Value::Array(fields));
                Value::Object(obj)
            }
            Schema::Union(u) => Value::Array(
                u.branches
                    .iter()
                    .map(|branch| branch.canonical_value(seen))
                    .collect(),
            ),
            Schema::Array(a) => {
                let mut obj = Map::new();
                obj.insert("type".into(), "array".into());
                obj.insert("items".into(), a.items.canonical_value(seen));
                Value::Object(obj)
            }
            Schema::Map(m) => {
                let mut obj = Map::new();
                obj.insert("type".into(), "map".into());
                obj.insert("values".into(), m.values.canonical_value(seen));
                Value::Object(obj)
            }
        }
    }

    /// The full schema document, as reported by `schema_of`.
    pub fn to_json(&self) -> Value {
        self.json_value(&mut HashSet::new())
    }

    fn json_value(&self, seen: &mut HashSet<String>) -> Value {
        match self {
            Schema::Primitive(p) => match p.logical {
                None => Value::from(p.ty.as_str()),
                Some(logical) => {
                    let mut obj = Map::new();
                    obj.insert("type".into(), p.ty.as_str().into());
                    insert_logical(&mut obj, logical);
                    Value::Object(obj)
                }
            },
            Schema::Raw => json!({"type": "bytes", "logicalType": "raw"}),
            Schema::Ref(r) => Value::from(r.name.full_name()),
            Schema::Fixed(f) => {
                if !seen.insert(f.name.full_name().to_string()) {
                    return Value::from(f.name.full_name());
                }
                let mut obj = Map::new();
                obj.insert("type".into(), "fixed".into());
                obj.insert("name".into(), f.name.name().into());
                if let Some(namespace) = f.name.namespace() {
                    obj.insert("namespace".into(), namespace.into());
                }
                obj.insert("size".into(), f.size.into());
                if let Some(logical) = f.logical {
                    insert_logical(&mut obj, logical);
                }
                Value::Object(obj)
            }
            Schema::Record(r) => {
                if !seen.insert(r.name.full_name().to_string()) {
                    return Value::from(r.name.full_name());
                }
                let fields: Vec<Value> = r
                    .fields
                    .iter()
                    .map(|field| {
                        let mut obj = Map::new();
                        obj.insert("name".into(), field.name.as_str().into());
                        obj.insert("type".into(), field.schema.json_value(seen));
                        if let Some(default) = &field.default {
                            obj.insert("default".into(), default.clone());
                        }
                        Value::Object(obj)
                    })
                    .collect();
                let mut obj = Map::new();
                obj.insert("type".into(), "record".into());
                obj.insert("name".into(), r.name.name().into());
                if let Some(namespace) = r.name.namespace() {
                    obj.insert("namespace".into(), namespace.into());
                }
                obj.insert("fields".into(), Value::Array(fields));
                Value::Object(obj)
            }
            Schema::Union(u) => Value::Array(
                u.branches
                    .iter()
                    .map(|branch| branch.json_value(seen))
                    .collect(),
            ),
            Schema::Array(a) => json!({"type": "array", "items": a.items.json_value(seen)}),
            Schema::Map(m) => json!({"type": "map", "values": m.values.json_value(seen)}),
        }
    }
}

fn insert_logical(obj: &mut Map<String, Value>, logical: LogicalType) {
    obj.insert("logicalType".into(), logical.as_str().into());
    if let LogicalType::Decimal { precision, scale } = logical {
        obj.insert("precision".into(), precision.into());
        obj.insert("scale".into(), scale.into());
    }
}
