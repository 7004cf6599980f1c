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

//! Decoding slots shaped by a *received* field type.
//!
//! COMPATIBLE mode reads encounter wire shapes this peer has no local
//! declaration for: removed fields, and whole classes unknown here. Both
//! decode from the received class definition alone. Removed fields are
//! decoded and discarded; unknown classes decode into [`Value::Opaque`]
//! placeholders that re-emit their definition and bodies unchanged.

use crate::error::Error;
use crate::meta::class_def::FieldType;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::ref_resolver::RefRead;
use crate::serializer::{read_any, read_slot, write_any, write_slot, ValueSerializer};
use crate::value::{obj_ref, ObjRef, OpaqueValue, Value};

/// Serializer substituted for classes with no local registration. The body
/// is fully described by the class definition riding the meta context.
pub struct OpaqueSerializer;

impl ValueSerializer for OpaqueSerializer {
    fn write_data(&self, value: &Value, context: &mut WriteContext) -> Result<(), Error> {
        let opaque = match value {
            Value::Opaque(opaque) => opaque,
            other => {
                return Err(Error::invalid_data(format!(
                    "opaque slot holds {}",
                    other.kind_name()
                )))
            }
        };
        context.write_meta(&opaque.def);
        for (field, value) in opaque.def.fields().iter().zip(&opaque.fields) {
            write_remote_slot(&field.field_type, value, context)?;
        }
        Ok(())
    }

    fn read_data(&self, context: &mut ReadContext) -> Result<Value, Error> {
        let def = context.read_meta()?;
        let mut fields = Vec::with_capacity(def.fields().len());
        for field in def.fields() {
            fields.push(read_remote_slot(&field.field_type, context)?);
        }
        Ok(Value::Opaque(OpaqueValue {
            class_name: def.class_name().to_string(),
            def,
            fields,
        }))
    }
}

/// Reads one slot shaped by a received field type, resolving to local
/// declarations where the registered id is known here.
pub fn read_remote_slot(field_type: &FieldType, context: &mut ReadContext) -> Result<ObjRef, Error> {
    match field_type {
        FieldType::Registered { class_id, .. } => {
            match context.resolver().spec_of_registered(*class_id) {
                Some(spec) => read_slot(&spec, context),
                None => Err(Error::class_not_registered(
                    *class_id,
                    context.reader.cursor(),
                )),
            }
        }
        FieldType::Object { monomorphic: true } => read_unknown_object(context),
        FieldType::Object { monomorphic: false } => read_any(context),
        FieldType::Collection { elem, .. } => read_flagged(context, |context| {
            let len = context.reader.read_varuint32()? as usize;
            let mut items = Vec::with_capacity(len.min(4096));
            for _ in 0..len {
                items.push(read_remote_slot(elem, context)?);
            }
            Ok(Value::List(items))
        }),
        FieldType::Map { key, value, .. } => read_flagged(context, |context| {
            let len = context.reader.read_varuint32()? as usize;
            let mut pairs = Vec::with_capacity(len.min(4096));
            for _ in 0..len {
                let k = read_remote_slot(key, context)?;
                let v = read_remote_slot(value, context)?;
                pairs.push((k, v));
            }
            Ok(Value::Map(pairs))
        }),
    }
}

/// Writes one slot shaped by a received field type; the exact inverse of
/// [`read_remote_slot`], used when an opaque value is re-serialized.
pub fn write_remote_slot(
    field_type: &FieldType,
    obj: &ObjRef,
    context: &mut WriteContext,
) -> Result<(), Error> {
    match field_type {
        FieldType::Registered { class_id, .. } => {
            match context.resolver().spec_of_registered(*class_id) {
                Some(spec) => write_slot(obj, &spec, context),
                None => Err(Error::invalid_data(format!(
                    "cannot re-emit field of unregistered class id {class_id}"
                ))),
            }
        }
        FieldType::Object { monomorphic: true } => {
            let track = context.config().reference_tracking;
            let complete = if track {
                context
                    .ref_writer
                    .write_ref_or_null(&mut context.writer, obj, true)
            } else {
                context
                    .ref_writer
                    .write_null_flag(&mut context.writer, obj)
            };
            if complete {
                return Ok(());
            }
            let value = obj.borrow();
            match &*value {
                Value::Opaque(_) => OpaqueSerializer.write_data(&value, context),
                Value::Object(object) => {
                    let info = context.resolver().by_name(&object.class_name).ok_or_else(|| {
                        Error::invalid_data(format!(
                            "class `{}` is not registered",
                            object.class_name
                        ))
                    })?;
                    let serializer = context.resolver().serializer_of(&info)?;
                    serializer.write_data(&value, context)
                }
                other => Err(Error::invalid_data(format!(
                    "object slot holds {}",
                    other.kind_name()
                ))),
            }
        }
        FieldType::Object { monomorphic: false } => write_any(obj, context),
        FieldType::Collection { elem, .. } => {
            let complete = write_container_flag(obj, context);
            if complete {
                return Ok(());
            }
            let value = obj.borrow();
            let items = match &*value {
                Value::List(items) => items,
                other => {
                    return Err(Error::invalid_data(format!(
                        "list slot holds {}",
                        other.kind_name()
                    )))
                }
            };
            context.writer.write_varuint32(items.len() as u32);
            for item in items {
                write_remote_slot(elem, item, context)?;
            }
            Ok(())
        }
        FieldType::Map { key, value: value_type, .. } => {
            let complete = write_container_flag(obj, context);
            if complete {
                return Ok(());
            }
            let borrowed = obj.borrow();
            let pairs = match &*borrowed {
                Value::Map(pairs) => pairs,
                other => {
                    return Err(Error::invalid_data(format!(
                        "map slot holds {}",
                        other.kind_name()
                    )))
                }
            };
            context.writer.write_varuint32(pairs.len() as u32);
            for (k, v) in pairs {
                write_remote_slot(key, k, context)?;
                write_remote_slot(value_type, v, context)?;
            }
            Ok(())
        }
    }
}

/// An object of a class unknown here, written without a class reference
/// (the sender's declared type was monomorphic): flag, then a body that
/// self-describes through its class definition.
fn read_unknown_object(context: &mut ReadContext) -> Result<ObjRef, Error> {
    read_flagged(context, |context| OpaqueSerializer.read_data(context))
}

fn read_flagged(
    context: &mut ReadContext,
    body: impl FnOnce(&mut ReadContext) -> Result<Value, Error>,
) -> Result<ObjRef, Error> {
    match context
        .ref_reader
        .try_preserve_ref_id(&mut context.reader)?
    {
        RefRead::Null => Ok(obj_ref(Value::Null)),
        RefRead::Resolved(obj) => Ok(obj),
        RefRead::Reserved { slot, .. } => {
            let value = body(context)?;
            *slot.borrow_mut() = value;
            Ok(slot)
        }
        RefRead::Untracked => Ok(obj_ref(body(context)?)),
    }
}

fn write_container_flag(obj: &ObjRef, context: &mut WriteContext) -> bool {
    let track = context.config().reference_tracking;
    if track {
        context
            .ref_writer
            .write_ref_or_null(&mut context.writer, obj, true)
    } else {
        context
            .ref_writer
            .write_null_flag(&mut context.writer, obj)
    }
}
