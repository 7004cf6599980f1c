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

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::meta::class_def::ClassDef;
use crate::types::TypeId;

/// Shared handle to a node of the object graph.
///
/// Object identity is `Rc` pointer identity: two handles to one allocation
/// are one object for reference tracking, which is what makes shared
/// subobjects and cycles expressible.
pub type ObjRef = Rc<RefCell<Value>>;

/// Wraps a value into a fresh graph node.
pub fn obj_ref(value: Value) -> ObjRef {
    Rc::new(RefCell::new(value))
}

/// A node of the dynamic object graph the engine serializes.
///
/// `List` and `Map` hold child handles; `Map` preserves insertion order so
/// repeated serializations of one value are byte-identical. `Object` is an
/// instance of a host-described class; `Opaque` is a value whose class is
/// unknown at this peer, decoded purely from its received class definition.
#[derive(Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Str(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    List(Vec<ObjRef>),
    Map(Vec<(ObjRef, ObjRef)>),
    Object(ObjectValue),
    Opaque(OpaqueValue),
}

/// An instance of a registered class: field slots in declared order.
#[derive(Debug)]
pub struct ObjectValue {
    pub class_name: String,
    pub fields: Vec<ObjRef>,
}

impl ObjectValue {
    pub fn new<S: Into<String>>(class_name: S, fields: Vec<ObjRef>) -> ObjectValue {
        ObjectValue {
            class_name: class_name.into(),
            fields,
        }
    }
}

/// An instance of a class this peer does not know.
///
/// Field slots follow the received class definition's order. Re-serializing
/// the value re-emits the same definition and the same field bodies.
#[derive(Debug)]
pub struct OpaqueValue {
    pub class_name: String,
    pub def: Arc<ClassDef>,
    pub fields: Vec<ObjRef>,
}

impl Value {
    #[inline(always)]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Wire id of the value's runtime kind; `None` for null.
    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(TypeId::BOOL),
            Value::Int8(_) => Some(TypeId::INT8),
            Value::Int16(_) => Some(TypeId::INT16),
            Value::Int32(_) => Some(TypeId::INT32),
            Value::Int64(_) => Some(TypeId::INT64),
            Value::Float32(_) => Some(TypeId::FLOAT32),
            Value::Float64(_) => Some(TypeId::FLOAT64),
            Value::Str(_) => Some(TypeId::STRING),
            Value::Date(_) => Some(TypeId::LOCAL_DATE),
            Value::Timestamp(_) => Some(TypeId::TIMESTAMP),
            Value::List(_) => Some(TypeId::LIST),
            Value::Map(_) => Some(TypeId::MAP),
            Value::Object(_) | Value::Opaque(_) => Some(TypeId::STRUCT),
        }
    }

    /// Human-readable kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int8(_) => "i8",
            Value::Int16(_) => "i16",
            Value::Int32(_) => "i32",
            Value::Int64(_) => "i64",
            Value::Float32(_) => "f32",
            Value::Float64(_) => "f64",
            Value::Str(_) => "string",
            Value::Date(_) => "date",
            Value::Timestamp(_) => "timestamp",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
            Value::Opaque(_) => "opaque",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::Str(s)
    }
}

macro_rules! value_from_scalar {
    ($(($ty:ty, $variant:ident)),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Value {
                    Value::$variant(v)
                }
            }
        )+
    };
}

value_from_scalar!(
    (bool, Bool),
    (i8, Int8),
    (i16, Int16),
    (i32, Int32),
    (i64, Int64),
    (f32, Float32),
    (f64, Float64),
);

// Structural equality, intended for acyclic graphs (tests on cyclic values
// must compare identities with `Rc::ptr_eq` instead). Maps compare pairwise
// in iteration order.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        fn ref_eq(a: &ObjRef, b: &ObjRef) -> bool {
            Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
        }
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int8(a), Value::Int8(b)) => a == b,
            (Value::Int16(a), Value::Int16(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Float32(a), Value::Float32(b)) => a.to_bits() == b.to_bits(),
            (Value::Float64(a), Value::Float64(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| ref_eq(x, y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ref_eq(ka, kb) && ref_eq(va, vb))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.class_name == b.class_name
                    && a.fields.len() == b.fields.len()
                    && a.fields.iter().zip(&b.fields).all(|(x, y)| ref_eq(x, y))
            }
            (Value::Opaque(a), Value::Opaque(b)) => {
                a.class_name == b.class_name
                    && a.def.id() == b.def.id()
                    && a.fields.len() == b.fields.len()
                    && a.fields.iter().zip(&b.fields).all(|(x, y)| ref_eq(x, y))
            }
            _ => false,
        }
    }
}
