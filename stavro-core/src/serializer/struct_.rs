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

//! Record codecs for derived structs.
//!
//! The derive macro lists a struct's fields through the builders below. Each
//! field is bound to the record field with the same resolved name, and the
//! finished codec walks the record in schema order, so the schema and not
//! the struct decides the wire layout.

use std::sync::Arc;

use serde_json::Value;

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::resolver::context::BuildContext;
use crate::schema::{Field, RecordSchema, Schema};
use crate::serializer::skip::skipper;
use crate::serializer::{mismatch, Avro, AvroStruct, DecodeFn, EncodeFn};
use crate::types::FieldDesc;

pub struct RecordEncoderBuilder<'c, 'a, T> {
    ctx: &'c mut BuildContext<'a>,
    record: Arc<RecordSchema>,
    slots: Vec<Option<EncodeFn<T>>>,
}

pub struct RecordDecoderBuilder<'c, 'a, T> {
    ctx: &'c mut BuildContext<'a>,
    record: Arc<RecordSchema>,
    slots: Vec<Option<DecodeFn<T>>>,
}

/// Position of the record field `desc` binds to, if any.
fn bind(
    record: &RecordSchema,
    desc: &FieldDesc,
    tag_key: &str,
    bound: impl Fn(usize) -> bool,
) -> Result<Option<usize>, Error> {
    let Some(name) = desc.avro_name(tag_key) else {
        return Ok(None);
    };
    let Some(position) = record.position(name) else {
        return Ok(None);
    };
    if bound(position) {
        return Err(Error::schema_error(format!(
            "field {}.{name} is bound twice",
            record.name()
        )));
    }
    Ok(Some(position))
}

#[cold]
fn field_error(record: &RecordSchema, field: &Field, err: Error) -> Error {
    Error::build_error(format!("{}.{}", record.name(), field.name()), err)
}

impl<'c, 'a, T: Avro> RecordEncoderBuilder<'c, 'a, T> {
    fn new(ctx: &'c mut BuildContext<'a>, record: Arc<RecordSchema>) -> Self {
        let slots = vec![None; record.fields().len()];
        RecordEncoderBuilder {
            ctx,
            record,
            slots,
        }
    }

    pub fn field<F: Avro>(&mut self, desc: &FieldDesc, get: fn(&T) -> &F) -> Result<(), Error> {
        let slots = &self.slots;
        let tag_key = self.ctx.config().tag_key();
        let Some(position) = bind(&self.record, desc, tag_key, |i| slots[i].is_some())? else {
            return Ok(());
        };
        let field = &self.record.fields()[position];
        let encode = self
            .ctx
            .encoder::<F>(field.schema())
            .map_err(|err| field_error(&self.record, field, err))?;
        self.slots[position] = Some(Arc::new(move |v: &T, w: &mut Writer| encode(get(v), w)));
        Ok(())
    }

    /// Binds the fields of a flattened struct as if they were declared here.
    pub fn embedded<E: AvroStruct>(&mut self, get: fn(&T) -> &E) -> Result<(), Error> {
        let mut inner = RecordEncoderBuilder::<E>::new(&mut *self.ctx, Arc::clone(&self.record));
        E::avro_encode_fields(&mut inner)?;
        for (position, slot) in inner.slots.into_iter().enumerate() {
            let Some(encode) = slot else { continue };
            if self.slots[position].is_some() {
                return Err(Error::schema_error(format!(
                    "field {}.{} is bound twice",
                    self.record.name(),
                    self.record.fields()[position].name()
                )));
            }
            self.slots[position] = Some(Arc::new(move |v: &T, w: &mut Writer| {
                encode(get(v), w)
            }));
        }
        Ok(())
    }

    fn finish(self) -> Result<EncodeFn<T>, Error> {
        let mut steps = Vec::with_capacity(self.slots.len());
        for (field, slot) in self.record.fields().iter().zip(self.slots) {
            match slot {
                Some(encode) => steps.push(encode),
                None => steps.push(null_default::<T>(&self.record, field)?),
            }
        }
        Ok(Arc::new(move |v: &T, w: &mut Writer| {
            for step in &steps {
                step(v, w);
                if w.has_error() {
                    return;
                }
            }
        }))
    }
}

/// Writes the null default of a record field the type does not have.
fn null_default<T: Avro>(record: &RecordSchema, field: &Field) -> Result<EncodeFn<T>, Error> {
    let missing = || {
        Error::schema_error(format!(
            "{} has no field for {}.{} and it has no null default",
            std::any::type_name::<T>(),
            record.name(),
            field.name()
        ))
    };
    if field.default() != Some(&Value::Null) {
        return Err(missing());
    }
    match field.schema() {
        Schema::Union(union) => match union.null_index() {
            Some(index) => Ok(Arc::new(move |_: &T, w: &mut Writer| {
                w.write_union_index(index)
            })),
            None => Err(missing()),
        },
        schema if schema.is_null() => Ok(Arc::new(|_: &T, _: &mut Writer| {})),
        _ => Err(missing()),
    }
}

impl<'c, 'a, T: Avro> RecordDecoderBuilder<'c, 'a, T> {
    fn new(ctx: &'c mut BuildContext<'a>, record: Arc<RecordSchema>) -> Self {
        let slots = vec![None; record.fields().len()];
        RecordDecoderBuilder {
            ctx,
            record,
            slots,
        }
    }

    pub fn field<F: Avro>(
        &mut self,
        desc: &FieldDesc,
        get: fn(&mut T) -> &mut F,
    ) -> Result<(), Error> {
        let slots = &self.slots;
        let tag_key = self.ctx.config().tag_key();
        let Some(position) = bind(&self.record, desc, tag_key, |i| slots[i].is_some())? else {
            return Ok(());
        };
        let field = &self.record.fields()[position];
        let decode = self
            .ctx
            .decoder::<F>(field.schema())
            .map_err(|err| field_error(&self.record, field, err))?;
        self.slots[position] = Some(Arc::new(move |v: &mut T, r: &mut Reader<'_>| {
            decode(get(v), r)
        }));
        Ok(())
    }

    pub fn embedded<E: AvroStruct>(&mut self, get: fn(&mut T) -> &mut E) -> Result<(), Error> {
        let mut inner = RecordDecoderBuilder::<E>::new(&mut *self.ctx, Arc::clone(&self.record));
        E::avro_decode_fields(&mut inner)?;
        for (position, slot) in inner.slots.into_iter().enumerate() {
            let Some(decode) = slot else { continue };
            if self.slots[position].is_some() {
                return Err(Error::schema_error(format!(
                    "field {}.{} is bound twice",
                    self.record.name(),
                    self.record.fields()[position].name()
                )));
            }
            self.slots[position] = Some(Arc::new(move |v: &mut T, r: &mut Reader<'_>| {
                decode(get(v), r)
            }));
        }
        Ok(())
    }

    /// Fields the type does not have are skipped.
    fn finish(self) -> Result<DecodeFn<T>, Error> {
        let mut steps: Vec<DecodeFn<T>> = Vec::with_capacity(self.slots.len());
        for (field, slot) in self.record.fields().iter().zip(self.slots) {
            match slot {
                Some(decode) => steps.push(decode),
                None => {
                    let skip = skipper(field.schema(), self.ctx);
                    steps.push(Arc::new(move |_: &mut T, r: &mut Reader<'_>| skip(r)));
                }
            }
        }
        Ok(Arc::new(move |v: &mut T, r: &mut Reader<'_>| {
            for step in &steps {
                step(v, r);
                if r.has_error() {
                    return;
                }
            }
        }))
    }
}

pub fn encoder<T: AvroStruct>(
    schema: &Schema,
    ctx: &mut BuildContext<'_>,
) -> Result<EncodeFn<T>, Error> {
    let Schema::Record(record) = schema else {
        return Err(mismatch::<T>(schema));
    };
    let mut builder = RecordEncoderBuilder::new(ctx, Arc::clone(record));
    T::avro_encode_fields(&mut builder)?;
    builder.finish()
}

pub fn decoder<T: AvroStruct>(
    schema: &Schema,
    ctx: &mut BuildContext<'_>,
) -> Result<DecodeFn<T>, Error> {
    let Schema::Record(record) = schema else {
        return Err(mismatch::<T>(schema));
    };
    let mut builder = RecordDecoderBuilder::new(ctx, Arc::clone(record));
    T::avro_decode_fields(&mut builder)?;
    builder.finish()
}
