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

//! Collection bodies: a varuint element count followed by the elements in
//! iteration order; ordinary collections carry no extra header.
//!
//! The declared element type arrives through the generics stack. When it is
//! available and final, every element is written with that type's serializer
//! and no per-element class reference; otherwise each element takes the
//! general ref-or-null plus class-reference path.

use crate::descriptor::TypeSpec;
use crate::error::Error;
use crate::generics::GenericEntry;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::{read_slot, write_slot, ValueSerializer};
use crate::value::Value;

pub struct ListSerializer;

fn element_spec(entry: Option<&GenericEntry>) -> TypeSpec {
    match entry {
        Some(GenericEntry::Elem(spec)) => spec.clone(),
        _ => TypeSpec::Dynamic,
    }
}

impl ValueSerializer for ListSerializer {
    fn write_data(&self, value: &Value, context: &mut WriteContext) -> Result<(), Error> {
        let items = match value {
            Value::List(items) => items,
            other => {
                return Err(Error::invalid_data(format!(
                    "list slot holds {}",
                    other.kind_name()
                )))
            }
        };
        context.writer.write_varuint32(items.len() as u32);
        let elem = element_spec(context.generics.peek());
        for item in items {
            write_slot(item, &elem, context)?;
        }
        Ok(())
    }

    fn read_data(&self, context: &mut ReadContext) -> Result<Value, Error> {
        let len = context.reader.read_varuint32()? as usize;
        let elem = element_spec(context.generics.peek());
        let mut items = Vec::with_capacity(len.min(4096));
        for _ in 0..len {
            items.push(read_slot(&elem, context)?);
        }
        Ok(Value::List(items))
    }
}
