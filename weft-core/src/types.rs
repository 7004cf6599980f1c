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

use crate::error::Error;
use anyhow::anyhow;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Reference flag byte written ahead of every trackable slot.
#[derive(Clone, Copy, Debug, PartialEq, TryFromPrimitive, IntoPrimitive)]
#[repr(i8)]
pub enum RefFlag {
    Null = -3,
    // Ref indicates a back-reference to an already written object; a
    // varuint32 reference id follows.
    Ref = -2,
    // NotNullValue indicates a non-null value that is not identity-tracked.
    NotNullValue = -1,
    // RefValue indicates a tracked object serialized here for the first time.
    RefValue = 0,
}

/// Wire class ids of the built-in value kinds.
///
/// Built-ins occupy the low id space; user classes register at
/// [`FIRST_USER_CLASS_ID`] and above. The nullable scalar ids exist so class
/// definitions can distinguish a plain scalar slot from a nullable one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[allow(non_camel_case_types)]
#[repr(u32)]
pub enum TypeId {
    BOOL = 1,
    INT8 = 2,
    INT16 = 3,
    INT32 = 4,
    INT64 = 5,
    FLOAT32 = 6,
    FLOAT64 = 7,
    NULLABLE_BOOL = 8,
    NULLABLE_INT8 = 9,
    NULLABLE_INT16 = 10,
    NULLABLE_INT32 = 11,
    NULLABLE_INT64 = 12,
    NULLABLE_FLOAT32 = 13,
    NULLABLE_FLOAT64 = 14,
    STRING = 15,
    LOCAL_DATE = 16,
    TIMESTAMP = 17,
    LIST = 18,
    MAP = 19,
    STRUCT = 20,
}

/// First class id available to user registrations.
pub const FIRST_USER_CLASS_ID: u32 = 64;

const MAX_UINT31: u64 = (1 << 31) - 1;

/// Folds one field tag into a running class-version hash, keeping the result
/// inside the positive 31-bit range every implementation can represent.
pub fn compute_field_hash(hash: u32, id: u32) -> u32 {
    let mut new_hash: u64 = (hash as u64) * 31 + (id as u64);
    while new_hash >= MAX_UINT31 {
        new_hash /= 7;
    }
    new_hash as u32
}

pub fn compute_string_hash(s: &str) -> u32 {
    let mut hash: u64 = 17;
    s.as_bytes().iter().for_each(|b| {
        hash = hash * 31 + (*b as u64);
        while hash >= MAX_UINT31 {
            hash /= 7;
        }
    });
    hash as u32
}

pub mod config_flags {
    pub const IS_NULL_FLAG: u8 = 1 << 0;
    pub const IS_LITTLE_ENDIAN_FLAG: u8 = 1 << 1;
    pub const IS_CROSS_LANGUAGE_FLAG: u8 = 1 << 2;
    pub const IS_OUT_OF_BAND_FLAG: u8 = 1 << 3;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Language {
    Xlang = 0,
    Java = 1,
    Python = 2,
    Cpp = 3,
    Go = 4,
    Javascript = 5,
    Rust = 6,
}

impl TryFrom<u8> for Language {
    type Error = Error;

    fn try_from(num: u8) -> Result<Self, Error> {
        match num {
            0 => Ok(Language::Xlang),
            1 => Ok(Language::Java),
            2 => Ok(Language::Python),
            3 => Ok(Language::Cpp),
            4 => Ok(Language::Go),
            5 => Ok(Language::Javascript),
            6 => Ok(Language::Rust),
            _ => Err(anyhow!("unsupported language code, value:{num}"))?,
        }
    }
}

/// Serialization compatibility mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    // Record layouts must be identical between serialization peer and
    // deserialization peer.
    SchemaConsistent,
    // Record layouts can differ between peers; fields can be added, removed
    // or reordered independently.
    Compatible,
}
