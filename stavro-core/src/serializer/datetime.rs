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
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::resolver::context::BuildContext;
use crate::schema::{PrimitiveType, Schema};
use crate::serializer::{mismatch, Avro, DecodeFn, EncodeFn};
use crate::types::{TypeDesc, TypeKind};

/// Times are microsecond counts on a `long`. The logical type on the schema is
/// informational, a plain `long` is accepted as well.
fn check_long<T>(schema: &Schema) -> Result<(), Error> {
    match schema.primitive_type() {
        Some(PrimitiveType::Long) => Ok(()),
        _ => Err(mismatch::<T>(schema)),
    }
}

fn instant(micros: i64, r: &mut Reader<'_>) -> Option<DateTime<Utc>> {
    let instant = DateTime::from_timestamp_micros(micros);
    if instant.is_none() {
        r.set_error(Error::decode_error(format!(
            "timestamp {micros}us is out of range"
        )));
    }
    instant
}

impl Avro for DateTime<Utc> {
    fn avro_type() -> TypeDesc {
        TypeDesc::of::<DateTime<Utc>>(TypeKind::Timestamp)
    }

    fn avro_default() -> Self {
        DateTime::<Utc>::default()
    }

    fn avro_encoder(schema: &Schema, _: &mut BuildContext<'_>) -> Result<EncodeFn<Self>, Error> {
        check_long::<Self>(schema)?;
        Ok(Arc::new(|v: &DateTime<Utc>, w: &mut Writer| {
            w.write_long(v.timestamp_micros())
        }))
    }

    fn avro_decoder(schema: &Schema, _: &mut BuildContext<'_>) -> Result<DecodeFn<Self>, Error> {
        check_long::<Self>(schema)?;
        Ok(Arc::new(|v: &mut DateTime<Utc>, r: &mut Reader<'_>| {
            let micros = r.read_long();
            if let Some(instant) = instant(micros, r) {
                *v = instant;
            }
        }))
    }
}

impl Avro for NaiveDateTime {
    fn avro_type() -> TypeDesc {
        TypeDesc::of::<NaiveDateTime>(TypeKind::Timestamp)
    }

    fn avro_default() -> Self {
        NaiveDateTime::default()
    }

    fn avro_encoder(schema: &Schema, _: &mut BuildContext<'_>) -> Result<EncodeFn<Self>, Error> {
        check_long::<Self>(schema)?;
        Ok(Arc::new(|v: &NaiveDateTime, w: &mut Writer| {
            w.write_long(v.and_utc().timestamp_micros())
        }))
    }

    fn avro_decoder(schema: &Schema, _: &mut BuildContext<'_>) -> Result<DecodeFn<Self>, Error> {
        check_long::<Self>(schema)?;
        Ok(Arc::new(|v: &mut NaiveDateTime, r: &mut Reader<'_>| {
            let micros = r.read_long();
            if let Some(instant) = instant(micros, r) {
                *v = instant.naive_utc();
            }
        }))
    }
}

impl Avro for Duration {
    fn avro_type() -> TypeDesc {
        TypeDesc::of::<Duration>(TypeKind::Duration)
    }

    fn avro_default() -> Self {
        Duration::ZERO
    }

    fn avro_encoder(schema: &Schema, _: &mut BuildContext<'_>) -> Result<EncodeFn<Self>, Error> {
        check_long::<Self>(schema)?;
        Ok(Arc::new(|v: &Duration, w: &mut Writer| {
            match i64::try_from(v.as_micros()) {
                Ok(micros) => w.write_long(micros),
                Err(_) => w.set_error(Error::encode_error(format!(
                    "duration {v:?} overflows a microsecond long"
                ))),
            }
        }))
    }

    fn avro_decoder(schema: &Schema, _: &mut BuildContext<'_>) -> Result<DecodeFn<Self>, Error> {
        check_long::<Self>(schema)?;
        Ok(Arc::new(|v: &mut Duration, r: &mut Reader<'_>| {
            let micros = r.read_long();
            match u64::try_from(micros) {
                Ok(micros) => *v = Duration::from_micros(micros),
                Err(_) => r.set_error(Error::decode_error(format!(
                    "negative duration {micros}us cannot be represented"
                ))),
            }
        }))
    }
}

impl Avro for TimeDelta {
    fn avro_type() -> TypeDesc {
        TypeDesc::of::<TimeDelta>(TypeKind::Duration)
    }

    fn avro_default() -> Self {
        TimeDelta::zero()
    }

    fn avro_encoder(schema: &Schema, _: &mut BuildContext<'_>) -> Result<EncodeFn<Self>, Error> {
        check_long::<Self>(schema)?;
        Ok(Arc::new(|v: &TimeDelta, w: &mut Writer| {
            match v.num_microseconds() {
                Some(micros) => w.write_long(micros),
                None => w.set_error(Error::encode_error(format!(
                    "duration {v} overflows a microsecond long"
                ))),
            }
        }))
    }

    fn avro_decoder(schema: &Schema, _: &mut BuildContext<'_>) -> Result<DecodeFn<Self>, Error> {
        check_long::<Self>(schema)?;
        Ok(Arc::new(|v: &mut TimeDelta, r: &mut Reader<'_>| {
            *v = TimeDelta::microseconds(r.read_long())
        }))
    }
}
