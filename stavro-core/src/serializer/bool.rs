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
use crate::schema::{PrimitiveType, Schema};
use crate::serializer::{mismatch, Avro, DecodeFn, EncodeFn};
use crate::types::{TypeDesc, TypeKind};

impl Avro for bool {
    fn avro_type() -> TypeDesc {
        TypeDesc::of::<bool>(TypeKind::Bool)
    }

    fn avro_default() -> Self {
        false
    }

    fn avro_encoder(schema: &Schema, _: &mut BuildContext<'_>) -> Result<EncodeFn<Self>, Error> {
        match schema.primitive_type() {
            Some(PrimitiveType::Boolean) => Ok(Arc::new(|v: &bool, w: &mut Writer| w.write_bool(*v))),
            _ => Err(mismatch::<bool>(schema)),
        }
    }

    fn avro_decoder(schema: &Schema, _: &mut BuildContext<'_>) -> Result<DecodeFn<Self>, Error> {
        match schema.primitive_type() {
            Some(PrimitiveType::Boolean) => {
                Ok(Arc::new(|v: &mut bool, r: &mut Reader<'_>| *v = r.read_bool()))
            }
            _ => Err(mismatch::<bool>(schema)),
        }
    }
}
