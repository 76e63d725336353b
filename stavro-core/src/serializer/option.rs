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

//! `Option<T>` is the nullable form of `T`. Against a union it writes the
//! null branch for `None` and the first branch `T` can be written as for
//! `Some`. Reading a union branch that `T` cannot hold follows the union
//! resolution settings of the [`Config`](crate::config::Config).

use std::sync::Arc;

use tracing::warn;

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::resolver::context::BuildContext;
use crate::schema::{Schema, UnionSchema};
use crate::serializer::skip::{skipper, SkipFn};
use crate::serializer::{Avro, DecodeFn, EncodeFn};
use crate::types::{TypeDesc, TypeKind};

enum Branch<T> {
    Null,
    Value(DecodeFn<T>),
    /// Fails the decode when it appears.
    Reject(Arc<str>),
    /// Skipped, leaving `None`.
    Skip(SkipFn, Arc<str>),
}

fn branch_label(schema: &Schema) -> Arc<str> {
    match schema.name() {
        Some(name) => Arc::from(name.full_name()),
        None => Arc::from(schema.type_name()),
    }
}

fn union_encoder<T: Avro>(
    union: &UnionSchema,
    ctx: &mut BuildContext<'_>,
) -> Result<EncodeFn<Option<T>>, Error> {
    let null_index = union.null_index();
    let mut resolved = None;
    let mut last_error = None;
    for (index, branch) in union.branches().iter().enumerate() {
        if branch.is_null() {
            continue;
        }
        match ctx.encoder::<T>(branch) {
            Ok(encode) => {
                resolved = Some((index, encode));
                break;
            }
            Err(err) => last_error = Some(err),
        }
    }
    let Some((index, encode)) = resolved else {
        return Err(no_branch::<T>(last_error));
    };
    Ok(Arc::new(move |v: &Option<T>, w: &mut Writer| match v {
        Some(value) => {
            w.write_union_index(index);
            encode(value, w);
        }
        None => match null_index {
            Some(null) => w.write_union_index(null),
            None => w.set_error(Error::encode_error(format!(
                "None of {} has no null branch in the union",
                std::any::type_name::<T>()
            ))),
        },
    }))
}

fn union_decoder<T: Avro>(
    union: &UnionSchema,
    ctx: &mut BuildContext<'_>,
) -> Result<DecodeFn<Option<T>>, Error> {
    let strict = ctx.config().is_union_resolution_error();
    let partial = ctx.config().is_partial_union_type_resolution();
    let mut branches = Vec::with_capacity(union.branches().len());
    let mut resolved = false;
    let mut last_error = None;
    for branch in union.branches() {
        if branch.is_null() {
            branches.push(Branch::Null);
            continue;
        }
        match ctx.decoder::<T>(branch) {
            Ok(decode) => {
                resolved = true;
                branches.push(Branch::Value(decode));
            }
            Err(err) if strict && !partial => {
                return Err(Error::build_error(
                    format!(
                        "union branch {} of {}",
                        branch_label(branch),
                        std::any::type_name::<Option<T>>()
                    ),
                    err,
                ))
            }
            Err(err) => {
                last_error = Some(err);
                if strict {
                    branches.push(Branch::Reject(branch_label(branch)));
                } else {
                    branches.push(Branch::Skip(skipper(branch, ctx), branch_label(branch)));
                }
            }
        }
    }
    if !resolved {
        return Err(no_branch::<T>(last_error));
    }
    Ok(Arc::new(move |v: &mut Option<T>, r: &mut Reader<'_>| {
        let index = r.read_union_index();
        if r.has_error() {
            return;
        }
        match branches.get(index) {
            Some(Branch::Null) => *v = None,
            Some(Branch::Value(decode)) => decode(v.get_or_insert_with(T::avro_default), r),
            Some(Branch::Reject(label)) => r.set_error(Error::decode_error(format!(
                "union branch {label} cannot be decoded into {}",
                std::any::type_name::<T>()
            ))),
            Some(Branch::Skip(skip, label)) => {
                warn!(
                    branch = %label,
                    ty = std::any::type_name::<T>(),
                    "skipping unresolved union branch"
                );
                skip(r);
                *v = None;
            }
            None => r.set_error(Error::decode_error(format!(
                "union index {index} out of range for {} branches",
                branches.len()
            ))),
        }
    }))
}

#[cold]
fn no_branch<T>(cause: Option<Error>) -> Error {
    let cause = cause.unwrap_or_else(|| Error::schema_error("union has no non-null branch"));
    Error::build_error(std::any::type_name::<Option<T>>(), cause)
}

impl<T: Avro> Avro for Option<T> {
    fn avro_type() -> TypeDesc {
        TypeDesc::of::<Option<T>>(TypeKind::Pointer(T::avro_type))
    }

    fn avro_default() -> Self {
        None
    }

    fn avro_encoder(schema: &Schema, ctx: &mut BuildContext<'_>) -> Result<EncodeFn<Self>, Error> {
        match schema {
            Schema::Union(union) => union_encoder(union, ctx),
            _ if schema.is_null() => Ok(Arc::new(|v: &Option<T>, w: &mut Writer| {
                if v.is_some() {
                    w.set_error(Error::encode_error(format!(
                        "null schema cannot hold a {}",
                        std::any::type_name::<T>()
                    )));
                }
            })),
            _ => {
                let encode = ctx.encoder::<T>(schema)?;
                Ok(Arc::new(move |v: &Option<T>, w: &mut Writer| match v {
                    Some(value) => encode(value, w),
                    None => w.set_error(Error::encode_error(format!(
                        "None of {} for non-nullable schema",
                        std::any::type_name::<T>()
                    ))),
                }))
            }
        }
    }

    fn avro_decoder(schema: &Schema, ctx: &mut BuildContext<'_>) -> Result<DecodeFn<Self>, Error> {
        match schema {
            Schema::Union(union) => union_decoder(union, ctx),
            _ if schema.is_null() => Ok(Arc::new(|v: &mut Option<T>, _: &mut Reader<'_>| {
                *v = None
            })),
            _ => {
                let decode = ctx.decoder::<T>(schema)?;
                Ok(Arc::new(move |v: &mut Option<T>, r: &mut Reader<'_>| {
                    decode(v.get_or_insert_with(T::avro_default), r)
                }))
            }
        }
    }
}
