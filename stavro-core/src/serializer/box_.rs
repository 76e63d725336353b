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
use crate::error::Error;
use crate::resolver::context::BuildContext;
use crate::schema::Schema;
use crate::serializer::{Avro, DecodeFn, EncodeFn};
use crate::types::TypeDesc;

/// `Box<T>` is encoded exactly like `T`.
impl<T: Avro> Avro for Box<T> {
    fn avro_type() -> TypeDesc {
        T::avro_type()
    }

    fn avro_default() -> Self {
        Box::new(T::avro_default())
    }

    fn avro_encoder(schema: &Schema, ctx: &mut BuildContext<'_>) -> Result<EncodeFn<Self>, Error> {
        let encoder = ctx.encoder::<T>(schema)?;
        Ok(Arc::new(move |v: &Box<T>, w: &mut Writer| encoder(v.as_ref(), w)))
    }

    fn avro_decoder(schema: &Schema, ctx: &mut BuildContext<'_>) -> Result<DecodeFn<Self>, Error> {
        let decoder = ctx.decoder::<T>(schema)?;
        Ok(Arc::new(move |v: &mut Box<T>, r: &mut Reader<'_>| {
            decoder(v.as_mut(), r)
        }))
    }
}
