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

pub mod class_def;
mod hash;

pub use hash::murmurhash3_x64_128;

use crate::buffer::{Reader, Writer};
use crate::error::Error;

/// Writes a metadata string: varuint byte length + UTF-8 bytes.
///
/// Metadata strings (class names, field names, ext entries) use this fixed
/// layout rather than the configurable value-string codec so encoded class
/// definitions hash identically regardless of either peer's configuration.
pub fn write_meta_string(writer: &mut Writer, s: &str) {
    writer.write_varuint32(s.len() as u32);
    writer.write_bytes(s.as_bytes());
}

pub fn read_meta_string(reader: &mut Reader) -> Result<String, Error> {
    let len = reader.read_varuint32()? as usize;
    let offset = reader.cursor();
    let bytes = reader.read_bytes(len)?;
    String::from_utf8(bytes.to_vec())
        .map_err(|_| Error::invalid_data(format!("invalid utf-8 in meta string at offset {offset}")))
}
