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

use crate::types::Mode;

/// Configuration for Weft serialization.
///
/// A single immutable record that flows by reference through a session; the
/// engine and the write/read contexts share one copy so behavior stays
/// consistent across a call.
#[derive(Clone, Debug)]
pub struct Config {
    /// Compatibility mode for record layouts.
    pub mode: Mode,
    /// Whether the cross-language frame layout is used.
    pub xlang: bool,
    /// Whether shared and circular references are tracked and preserved.
    pub reference_tracking: bool,
    /// Exclude boxed scalar values from tracking even when tracking is on.
    pub basic_types_ref_ignored: bool,
    /// Exclude strings from tracking even when tracking is on.
    pub string_ref_ignored: bool,
    /// Exclude date/timestamp values from tracking even when tracking is on.
    pub time_ref_ignored: bool,
    /// Use zig-zag varints for i32/i64 slots.
    pub compress_number: bool,
    /// Permit the LATIN1 short path for strings instead of UTF-16.
    pub compress_string: bool,
    /// Refuse to write any class lacking a pre-registered id.
    pub class_registration_required: bool,
    /// Refuse to read any class reference that is not id-registered.
    pub secure_mode: bool,
    /// Substitute a placeholder value for unknown class names on read.
    pub deserialize_unknown_class: bool,
    /// Emit/require the 4-byte class-version hash in schema-consistent mode.
    pub check_class_version: bool,
    /// Keep the class-definition dedup tables alive across calls.
    pub share_meta_context: bool,
    /// Bound on generics-stack depth and dynamic object nesting.
    pub max_depth: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mode: Mode::SchemaConsistent,
            xlang: false,
            reference_tracking: false,
            basic_types_ref_ignored: true,
            string_ref_ignored: true,
            time_ref_ignored: true,
            compress_number: false,
            compress_string: false,
            class_registration_required: false,
            secure_mode: false,
            deserialize_unknown_class: false,
            check_class_version: false,
            share_meta_context: false,
            max_depth: 64,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn is_compatible(&self) -> bool {
        self.mode == Mode::Compatible
    }

    #[inline(always)]
    pub fn is_xlang(&self) -> bool {
        self.xlang
    }

    /// The version hash is only meaningful when both sides must agree on the
    /// exact layout; any mode that lets schemas diverge suppresses it.
    #[inline(always)]
    pub fn write_class_version(&self) -> bool {
        self.check_class_version && !self.is_compatible()
    }
}
