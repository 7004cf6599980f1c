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

//! Map bodies: a varuint pair count followed by `(key, value)` pairs in
//! iteration order.
//!
//! Pairs take one of four fast paths chosen once per map by whether the
//! declared key and value types are final; final sides skip per-element
//! class references entirely.

use crate::descriptor::TypeSpec;
use crate::error::Error;
use crate::generics::GenericEntry;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::{read_any, read_slot, spec_is_final, write_any, write_slot, ValueSerializer};
use crate::value::Value;

pub struct MapSerializer;

fn pair_specs(entry: Option<&GenericEntry>) -> (TypeSpec, TypeSpec) {
    match entry {
        Some(GenericEntry::Pair(key, value)) => (key.clone(), value.clone()),
        _ => (TypeSpec::Dynamic, TypeSpec::Dynamic),
    }
}

impl ValueSerializer for MapSerializer {
    fn write_data(&self, value: &Value, context: &mut WriteContext) -> Result<(), Error> {
        let pairs = match value {
            Value::Map(pairs) => pairs,
            other => {
                return Err(Error::invalid_data(format!(
                    "map slot holds {}",
                    other.kind_name()
                )))
            }
        };
        context.writer.write_varuint32(pairs.len() as u32);
        let (key_spec, value_spec) = pair_specs(context.generics.peek());
        let resolver = context.resolver();
        let key_final = spec_is_final(&key_spec, &resolver);
        let value_final = spec_is_final(&value_spec, &resolver);
        match (key_final, value_final) {
            (true, true) => {
                for (key, value) in pairs {
                    write_slot(key, &key_spec, context)?;
                    write_slot(value, &value_spec, context)?;
                }
            }
            (true, false) => {
                for (key, value) in pairs {
                    write_slot(key, &key_spec, context)?;
                    write_any(value, context)?;
                }
            }
            (false, true) => {
                for (key, value) in pairs {
                    write_any(key, context)?;
                    write_slot(value, &value_spec, context)?;
                }
            }
            (false, false) => {
                for (key, value) in pairs {
                    write_any(key, context)?;
                    write_any(value, context)?;
                }
            }
        }
        Ok(())
    }

    fn read_data(&self, context: &mut ReadContext) -> Result<Value, Error> {
        let len = context.reader.read_varuint32()? as usize;
        let (key_spec, value_spec) = pair_specs(context.generics.peek());
        let resolver = context.resolver();
        let key_final = spec_is_final(&key_spec, &resolver);
        let value_final = spec_is_final(&value_spec, &resolver);
        let mut pairs = Vec::with_capacity(len.min(4096));
        for _ in 0..len {
            let key = if key_final {
                read_slot(&key_spec, context)?
            } else {
                read_any(context)?
            };
            let value = if value_final {
                read_slot(&value_spec, context)?
            } else {
                read_any(context)?
            };
            pairs.push((key, value));
        }
        Ok(Value::Map(pairs))
    }
}
