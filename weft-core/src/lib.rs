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

//! # Weft Core
//!
//! The core of the Weft cross-language object-graph serialization
//! framework: the binary wire format and the interpretive engine that walks
//! dynamic object graphs under host-supplied type descriptors.
//!
//! ## Architecture
//!
//! - **`weft`**: the engine and public API
//! - **`buffer`**: binary Reader/Writer with varint codecs
//! - **`value`**: the dynamic object graph (`Value` / `ObjRef`)
//! - **`descriptor`**: type descriptors and the field grouper
//! - **`serializer`**: per-kind body encodings and the slot protocols
//! - **`resolver`**: reference, class and meta resolution; sessions; pool
//! - **`meta`**: class definitions for schema evolution
//! - **`types`**: wire constants
//! - **`error`**: error type and helper macros
//!
//! ## Modes
//!
//! - **SchemaConsistent**: peers must declare identical record layouts; the
//!   wire carries no per-field metadata.
//! - **Compatible**: peers may add, remove or reorder fields independently;
//!   class definitions travel once per session through the meta context.
//!
//! ## Key properties
//!
//! - Little-endian fixed scalars, LEB128 varints, zig-zag signed mapping
//! - Identity-preserving reference tracking with cycle support
//! - Deterministic output: one value, one config, one byte sequence

pub mod buffer;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod generics;
pub mod meta;
pub mod resolver;
pub mod serializer;
pub mod types;
pub mod value;
pub mod weft;

pub use config::Config;
pub use error::Error;
pub use types::Mode;
pub use value::{obj_ref, ObjRef, ObjectValue, OpaqueValue, Value};
pub use weft::Weft;
