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

use crate::descriptor::PrimKind;
use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::ValueSerializer;
use crate::value::Value;

fn kind_mismatch(kind: PrimKind, value: &Value) -> Error {
    Error::invalid_data(format!(
        "slot declared {} holds {}",
        kind.name(),
        value.kind_name()
    ))
}

/// Writes a scalar body. i32/i64 slots use zig-zag varints when number
/// compression is on; everything else is fixed-size little-endian.
pub fn write_prim(value: &Value, kind: PrimKind, context: &mut WriteContext) -> Result<(), Error> {
    match (kind, value) {
        (PrimKind::Bool, Value::Bool(v)) => context.writer.write_bool(*v),
        (PrimKind::Int8, Value::Int8(v)) => context.writer.write_i8(*v),
        (PrimKind::Int16, Value::Int16(v)) => context.writer.write_i16(*v),
        (PrimKind::Int32, Value::Int32(v)) => {
            if context.compress_number() {
                context.writer.write_varint32(*v);
            } else {
                context.writer.write_i32(*v);
            }
        }
        (PrimKind::Int64, Value::Int64(v)) => {
            if context.compress_number() {
                context.writer.write_varint64(*v);
            } else {
                context.writer.write_i64(*v);
            }
        }
        (PrimKind::Float32, Value::Float32(v)) => context.writer.write_f32(*v),
        (PrimKind::Float64, Value::Float64(v)) => context.writer.write_f64(*v),
        (kind, value) => return Err(kind_mismatch(kind, value)),
    }
    Ok(())
}

pub fn read_prim(kind: PrimKind, context: &mut ReadContext) -> Result<Value, Error> {
    Ok(match kind {
        PrimKind::Bool => Value::Bool(context.reader.read_bool()?),
        PrimKind::Int8 => Value::Int8(context.reader.read_i8()?),
        PrimKind::Int16 => Value::Int16(context.reader.read_i16()?),
        PrimKind::Int32 => {
            if context.compress_number() {
                Value::Int32(context.reader.read_varint32()?)
            } else {
                Value::Int32(context.reader.read_i32()?)
            }
        }
        PrimKind::Int64 => {
            if context.compress_number() {
                Value::Int64(context.reader.read_varint64()?)
            } else {
                Value::Int64(context.reader.read_i64()?)
            }
        }
        PrimKind::Float32 => Value::Float32(context.reader.read_f32()?),
        PrimKind::Float64 => Value::Float64(context.reader.read_f64()?),
    })
}

macro_rules! scalar_serializer {
    ($name:ident, $kind:expr) => {
        pub struct $name;

        impl ValueSerializer for $name {
            fn write_data(&self, value: &Value, context: &mut WriteContext) -> Result<(), Error> {
                write_prim(value, $kind, context)
            }

            fn read_data(&self, context: &mut ReadContext) -> Result<Value, Error> {
                read_prim($kind, context)
            }
        }
    };
}

scalar_serializer!(BoolSerializer, PrimKind::Bool);
scalar_serializer!(Int8Serializer, PrimKind::Int8);
scalar_serializer!(Int16Serializer, PrimKind::Int16);
scalar_serializer!(Int32Serializer, PrimKind::Int32);
scalar_serializer!(Int64Serializer, PrimKind::Int64);
scalar_serializer!(Float32Serializer, PrimKind::Float32);
scalar_serializer!(Float64Serializer, PrimKind::Float64);
