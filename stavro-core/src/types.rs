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

//! Static descriptions of Rust type shapes.
//!
//! Rust has no runtime reflection, so every [`Avro`](crate::serializer::Avro)
//! type describes itself through [`TypeDesc`]. Derived structs get a
//! [`StructDesc`] holding the field table generated by `#[derive(AvroObject)]`.
//! Element types are referenced through function pointers so that
//! self-referential types can describe themselves without infinite recursion.

use std::any::TypeId;

/// Produces the description of a type on demand.
pub type DescFn = fn() -> TypeDesc;

#[derive(Clone, Copy, Debug)]
pub enum TypeKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    /// `isize`
    SignedSize,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    /// `usize`
    Size,
    Float32,
    Float64,
    String,
    /// Wall-clock instant.
    Timestamp,
    /// Elapsed time.
    Duration,
    /// A type with its own byte representation.
    Raw {
        name: &'static str,
        namespace: &'static str,
    },
    Struct(&'static StructDesc),
    /// Nullable indirection, `Option<T>`.
    Pointer(DescFn),
    /// Growable sequence, `Vec<T>`.
    Seq(DescFn),
    /// Fixed-length array, `[T; N]`.
    Array(DescFn, usize),
    /// Keyed collection.
    Map(DescFn, DescFn),
    /// Anything without an Avro mapping.
    Unsupported,
}

#[derive(Clone, Copy, Debug)]
pub struct TypeDesc {
    pub kind: TypeKind,
    pub type_name: &'static str,
    pub type_id: TypeId,
}

impl TypeDesc {
    pub fn of<T: 'static>(kind: TypeKind) -> TypeDesc {
        TypeDesc {
            kind,
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }

    /// Targets allowed behind a pointer: derived structs, raw types and timestamps.
    pub fn is_structure(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Struct(_) | TypeKind::Raw { .. } | TypeKind::Timestamp
        )
    }

    pub fn is_string(&self) -> bool {
        matches!(self.kind, TypeKind::String)
    }
}

/// Field table of a derived struct.
#[derive(Debug)]
pub struct StructDesc {
    pub name: &'static str,
    /// `module_path!()` of the declaring module.
    pub module_path: &'static str,
    pub fields: fn() -> &'static [FieldDesc],
}

#[derive(Debug)]
pub struct FieldDesc {
    /// Declared identifier, without any `r#` prefix.
    pub ident: &'static str,
    /// `key = "value"` pairs from `#[avro(...)]`.
    pub tags: &'static [(&'static str, &'static str)],
    /// `#[avro(flatten)]`: the field's own fields are inlined into the parent.
    pub flatten: bool,
    pub public: bool,
    pub ty: DescFn,
}

impl FieldDesc {
    /// The Avro field name under `tag_key`, or `None` when the field is skipped.
    ///
    /// ```rust
    /// use stavro_core::types::{FieldDesc, TypeDesc, TypeKind};
    ///
    /// fn string() -> TypeDesc {
    ///     TypeDesc::of::<String>(TypeKind::String)
    /// }
    /// let field = FieldDesc {
    ///     ident: "value",
    ///     tags: &[("rename", "v"), ("other", "-")],
    ///     flatten: false,
    ///     public: true,
    ///     ty: string,
    /// };
    /// assert_eq!(field.avro_name("rename"), Some("v"));
    /// assert_eq!(field.avro_name("other"), None);
    /// assert_eq!(field.avro_name("missing"), Some("value"));
    /// ```
    pub fn avro_name(&self, tag_key: &str) -> Option<&'static str> {
        match self.tag(tag_key).map(str::trim) {
            Some("-") => None,
            Some(name) if !name.is_empty() => Some(name),
            _ => Some(self.ident),
        }
    }

    pub fn tag(&self, key: &str) -> Option<&'static str> {
        self.tags.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }
}
