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

//! Serializer dispatch and the slot protocols.
//!
//! Every type's serializer is a `{write_data, read_data}` pair behind a
//! [`ValueSerializer`] handle kept in the class registry. The free functions
//! here implement the protocols around a body: the ref-or-null flag, the
//! optional class reference for polymorphic slots, and the declared-type
//! driven slot walk that containers and object layouts share.

pub mod collection;
pub mod datetime;
pub mod map;
pub mod object;
pub mod primitive;
pub mod skip;
pub mod string;

use std::sync::Arc;

use crate::descriptor::{PrimKind, TypeSpec};
use crate::error::Error;
use crate::generics::GenericEntry;
use crate::resolver::class_resolver::ClassInfo;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::ref_resolver::RefRead;
use crate::types::TypeId;
use crate::value::{obj_ref, ObjRef, Value};

/// A `{write, read}` pair for one type's body encoding. The surrounding
/// flags and class references are written by the callers below, so a body
/// can be shared by the monomorphic and polymorphic paths.
pub trait ValueSerializer: Send + Sync {
    fn write_data(&self, value: &Value, context: &mut WriteContext) -> Result<(), Error>;

    fn read_data(&self, context: &mut ReadContext) -> Result<Value, Error>;
}

/// Polymorphic slot: ref flag, class reference, body.
pub fn write_any(obj: &ObjRef, context: &mut WriteContext) -> Result<(), Error> {
    let info = {
        let value = obj.borrow();
        if value.is_null() {
            context
                .ref_writer
                .write_null_flag(&mut context.writer, obj);
            return Ok(());
        }
        context.resolver().info_of_value(&value, context.config())?
    };
    let track = info.needs_ref_tracking(context.config());
    let complete = context
        .ref_writer
        .write_ref_or_null(&mut context.writer, obj, track);
    if complete {
        return Ok(());
    }
    context.write_class_ref(&info)?;
    let serializer = context.resolver().serializer_of(&info)?;
    context.generics.push(GenericEntry::Barrier)?;
    let result = serializer.write_data(&obj.borrow(), context);
    context.generics.pop();
    result
}

/// Monomorphic slot: ref flag and body, no class reference.
pub fn write_typed(
    obj: &ObjRef,
    info: &Arc<ClassInfo>,
    context: &mut WriteContext,
) -> Result<(), Error> {
    let track = info.needs_ref_tracking(context.config());
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
    let serializer = context.resolver().serializer_of(info)?;
    serializer.write_data(&obj.borrow(), context)
}

/// Inverse of [`write_any`].
pub fn read_any(context: &mut ReadContext) -> Result<ObjRef, Error> {
    match context
        .ref_reader
        .try_preserve_ref_id(&mut context.reader)?
    {
        RefRead::Null => Ok(obj_ref(Value::Null)),
        RefRead::Resolved(obj) => Ok(obj),
        RefRead::Reserved { slot, .. } => {
            let info = context.read_class_ref()?;
            let serializer = context.resolver().serializer_of(&info)?;
            context.generics.push(GenericEntry::Barrier)?;
            let value = serializer.read_data(context);
            context.generics.pop();
            *slot.borrow_mut() = value?;
            Ok(slot)
        }
        RefRead::Untracked => {
            let info = context.read_class_ref()?;
            let serializer = context.resolver().serializer_of(&info)?;
            context.generics.push(GenericEntry::Barrier)?;
            let value = serializer.read_data(context);
            context.generics.pop();
            Ok(obj_ref(value?))
        }
    }
}

/// Inverse of [`write_typed`].
pub fn read_typed(context: &mut ReadContext, info: &Arc<ClassInfo>) -> Result<ObjRef, Error> {
    match context
        .ref_reader
        .try_preserve_ref_id(&mut context.reader)?
    {
        RefRead::Null => Ok(obj_ref(Value::Null)),
        RefRead::Resolved(obj) => Ok(obj),
        RefRead::Reserved { slot, .. } => {
            let serializer = context.resolver().serializer_of(info)?;
            let value = serializer.read_data(context)?;
            *slot.borrow_mut() = value;
            Ok(slot)
        }
        RefRead::Untracked => {
            let serializer = context.resolver().serializer_of(info)?;
            Ok(obj_ref(serializer.read_data(context)?))
        }
    }
}

fn builtin_info(context_resolver: &crate::resolver::class_resolver::ClassResolver, id: TypeId) -> Arc<ClassInfo> {
    context_resolver
        .by_id(id as u32)
        .expect("built-in kinds are pre-registered")
}

/// Writes one slot with the policy its declared static type prescribes.
pub fn write_slot(obj: &ObjRef, spec: &TypeSpec, context: &mut WriteContext) -> Result<(), Error> {
    match spec {
        TypeSpec::Prim(kind) => {
            let value = obj.borrow();
            primitive::write_prim(&value, *kind, context)
        }
        TypeSpec::Nullable(kind) => {
            let track = context.config().reference_tracking
                && !context.config().basic_types_ref_ignored;
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
            primitive::write_prim(&value, *kind, context)
        }
        TypeSpec::Str => {
            let info = builtin_info(&context.resolver(), TypeId::STRING);
            write_typed(obj, &info, context)
        }
        TypeSpec::Date => {
            let info = builtin_info(&context.resolver(), TypeId::LOCAL_DATE);
            write_typed(obj, &info, context)
        }
        TypeSpec::Timestamp => {
            let info = builtin_info(&context.resolver(), TypeId::TIMESTAMP);
            write_typed(obj, &info, context)
        }
        TypeSpec::Class(name) => {
            let info = context.resolver().by_name(name).ok_or_else(|| {
                Error::invalid_data(format!("slot class `{name}` is not registered"))
            })?;
            if info.is_monomorphic() {
                write_typed(obj, &info, context)
            } else {
                write_any(obj, context)
            }
        }
        TypeSpec::Dynamic => write_any(obj, context),
        TypeSpec::List(elem) => {
            let info = builtin_info(&context.resolver(), TypeId::LIST);
            context.generics.push(GenericEntry::Elem((**elem).clone()))?;
            let result = write_typed(obj, &info, context);
            context.generics.pop();
            result
        }
        TypeSpec::Map(key, value) => {
            let info = builtin_info(&context.resolver(), TypeId::MAP);
            context
                .generics
                .push(GenericEntry::Pair((**key).clone(), (**value).clone()))?;
            let result = write_typed(obj, &info, context);
            context.generics.pop();
            result
        }
    }
}

/// Inverse of [`write_slot`].
pub fn read_slot(spec: &TypeSpec, context: &mut ReadContext) -> Result<ObjRef, Error> {
    match spec {
        TypeSpec::Prim(kind) => Ok(obj_ref(primitive::read_prim(*kind, context)?)),
        TypeSpec::Nullable(kind) => {
            match context
                .ref_reader
                .try_preserve_ref_id(&mut context.reader)?
            {
                RefRead::Null => Ok(obj_ref(Value::Null)),
                RefRead::Resolved(obj) => Ok(obj),
                RefRead::Reserved { slot, .. } => {
                    let value = primitive::read_prim(*kind, context)?;
                    *slot.borrow_mut() = value;
                    Ok(slot)
                }
                RefRead::Untracked => Ok(obj_ref(primitive::read_prim(*kind, context)?)),
            }
        }
        TypeSpec::Str => {
            let info = builtin_info(&context.resolver(), TypeId::STRING);
            read_typed(context, &info)
        }
        TypeSpec::Date => {
            let info = builtin_info(&context.resolver(), TypeId::LOCAL_DATE);
            read_typed(context, &info)
        }
        TypeSpec::Timestamp => {
            let info = builtin_info(&context.resolver(), TypeId::TIMESTAMP);
            read_typed(context, &info)
        }
        TypeSpec::Class(name) => {
            let info = context.resolver().by_name(name).ok_or_else(|| {
                Error::invalid_data(format!("slot class `{name}` is not registered"))
            })?;
            if info.is_monomorphic() {
                read_typed(context, &info)
            } else {
                read_any(context)
            }
        }
        TypeSpec::Dynamic => read_any(context),
        TypeSpec::List(elem) => {
            let info = builtin_info(&context.resolver(), TypeId::LIST);
            context.generics.push(GenericEntry::Elem((**elem).clone()))?;
            let result = read_typed(context, &info);
            context.generics.pop();
            result
        }
        TypeSpec::Map(key, value) => {
            let info = builtin_info(&context.resolver(), TypeId::MAP);
            context
                .generics
                .push(GenericEntry::Pair((**key).clone(), (**value).clone()))?;
            let result = read_typed(context, &info);
            context.generics.pop();
            result
        }
    }
}

/// Default for a slot that was absent on the wire: zero for non-nullable
/// scalars, null for everything else.
pub fn default_of_spec(spec: &TypeSpec) -> Value {
    match spec {
        TypeSpec::Prim(kind) => match kind {
            PrimKind::Bool => Value::Bool(false),
            PrimKind::Int8 => Value::Int8(0),
            PrimKind::Int16 => Value::Int16(0),
            PrimKind::Int32 => Value::Int32(0),
            PrimKind::Int64 => Value::Int64(0),
            PrimKind::Float32 => Value::Float32(0.0),
            PrimKind::Float64 => Value::Float64(0.0),
        },
        _ => Value::Null,
    }
}

/// Whether a declared type resolves without a per-value class reference.
pub fn spec_is_final(spec: &TypeSpec, resolver: &crate::resolver::class_resolver::ClassResolver) -> bool {
    match spec {
        TypeSpec::Dynamic => false,
        TypeSpec::Class(name) => resolver.is_monomorphic_class(name),
        _ => true,
    }
}
