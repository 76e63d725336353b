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

//! Schema-driven skipping of values the target type has no place for:
//! record fields missing from the type and union branches it cannot hold.

use std::sync::Arc;

use crate::buffer::Reader;
use crate::error::Error;
use crate::resolver::context::{BuildContext, NamedSchemas};
use crate::schema::{PrimitiveType, Schema};

pub type SkipFn = Arc<dyn Fn(&mut Reader<'_>) + Send + Sync>;

/// Deepest nesting a skipped value may have.
const MAX_SKIP_DEPTH: usize = 512;

/// A skipper for values written with `schema`.
pub fn skipper(schema: &Schema, ctx: &BuildContext<'_>) -> SkipFn {
    let schema = schema.clone();
    let named = Arc::clone(ctx.named_schemas());
    Arc::new(move |r: &mut Reader<'_>| skip_value(r, &schema, &named, 0))
}

pub fn skip_value(r: &mut Reader<'_>, schema: &Schema, named: &NamedSchemas, depth: usize) {
    if r.has_error() {
        return;
    }
    if depth > MAX_SKIP_DEPTH {
        r.set_error(Error::decode_error(format!(
            "skipped value nests deeper than {MAX_SKIP_DEPTH} levels"
        )));
        return;
    }
    match schema {
        Schema::Primitive(p) => match p.ty() {
            PrimitiveType::Null => {}
            PrimitiveType::Boolean => r.skip(1),
            PrimitiveType::Int | PrimitiveType::Long => {
                r.read_long();
            }
            PrimitiveType::Float => r.skip(4),
            PrimitiveType::Double => r.skip(8),
            PrimitiveType::Bytes | PrimitiveType::String => r.skip_bytes(),
        },
        Schema::Raw => r.skip_bytes(),
        Schema::Fixed(f) => r.skip(f.size()),
        Schema::Record(record) => {
            for field in record.fields() {
                skip_value(r, field.schema(), named, depth + 1);
            }
        }
        Schema::Union(union) => {
            let index = r.read_union_index();
            match union.branches().get(index) {
                Some(branch) => skip_value(r, branch, named, depth + 1),
                None if r.has_error() => {}
                None => r.set_error(Error::decode_error(format!(
                    "union index {index} out of range for {} branches",
                    union.branches().len()
                ))),
            }
        }
        Schema::Array(array) => {
            skip_blocks(r, |r| skip_value(r, array.items(), named, depth + 1))
        }
        Schema::Map(map) => skip_blocks(r, |r| {
            r.skip_bytes();
            skip_value(r, map.values(), named, depth + 1)
        }),
        Schema::Ref(reference) => match named.get(reference.name().full_name()) {
            Some(target) => skip_value(r, target, named, depth + 1),
            None => r.set_error(Error::decode_error(format!(
                "unknown named type {}",
                reference.name()
            ))),
        },
    }
}

/// Skips whole blocks by their byte size when the writer recorded one.
fn skip_blocks(r: &mut Reader<'_>, mut item: impl FnMut(&mut Reader<'_>)) {
    let mut total = 0usize;
    loop {
        let (count, size) = r.read_block_header();
        if count == 0 || r.has_error() {
            return;
        }
        total = total.saturating_add(count);
        if !r.ensure_items(total) {
            return;
        }
        match size {
            Some(size) => r.skip(size),
            None => {
                for _ in 0..count {
                    item(r);
                    if r.has_error() {
                        return;
                    }
                }
            }
        }
    }
}
