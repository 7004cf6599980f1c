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

//! # Weft
//!
//! Weft is a cross-language object-graph serialization framework. It
//! serializes dynamic object graphs (records, collections, maps, shared
//! subobjects, cycles) into a compact binary format that peers in other
//! languages can decode, with optional schema evolution between peers that
//! declare different record layouts.
//!
//! The engine is interpretive: the host describes each record class with a
//! [`ClassDescriptor`] and exchanges graphs of [`Value`] nodes. No derive
//! macros or generated code are involved.
//!
//! ## Example
//!
//! ```
//! use weft::{obj_ref, ObjectValue, Value, Weft};
//! use weft::descriptor::{ClassDescriptor, PrimKind, TypeSpec};
//!
//! let mut weft = Weft::default();
//! let user = ClassDescriptor::builder("demo.User")
//!     .field("name", TypeSpec::Str)
//!     .field("age", TypeSpec::Prim(PrimKind::Int32))
//!     .build();
//! weft.register(user, 100).unwrap();
//!
//! let alice = obj_ref(Value::Object(ObjectValue::new(
//!     "demo.User",
//!     vec![obj_ref(Value::from("Alice")), obj_ref(Value::Int32(30))],
//! )));
//! let bytes = weft.serialize(&alice).unwrap();
//! let back = weft.deserialize(&bytes).unwrap();
//! assert_eq!(*back.borrow(), *alice.borrow());
//! ```
//!
//! ## Shared references and cycles
//!
//! With `track_ref(true)`, a subobject reachable twice is written once and
//! back-referenced, and cycles round-trip at the same shape.
//!
//! ## Schema evolution
//!
//! With `compatible(true)`, peers exchange class definitions through the
//! per-session meta context; fields added, removed or reordered on one side
//! map by name on the other, with absent fields defaulting.

pub use weft_core::buffer::{Reader, Writer};
pub use weft_core::descriptor;
pub use weft_core::descriptor::{ClassDescriptor, FieldDescriptor, PrimKind, TypeSpec};
pub use weft_core::resolver::pool::WeftPool;
pub use weft_core::{obj_ref, Config, Error, Mode, ObjRef, ObjectValue, OpaqueValue, Value, Weft};
