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

//! String bodies: one encoding byte, a varuint byte length, the raw bytes.
//!
//! The writer picks any encoding that represents the string faithfully
//! (LATIN1 or UTF-8 with string compression on, UTF-16LE otherwise); readers
//! accept all three.

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::ValueSerializer;
use crate::value::Value;

const LATIN1: u8 = 0;
const UTF16LE: u8 = 1;
const UTF8: u8 = 2;

fn is_latin1(s: &str) -> bool {
    s.chars().all(|c| (c as u32) <= 0xFF)
}

pub struct StringSerializer;

impl ValueSerializer for StringSerializer {
    fn write_data(&self, value: &Value, context: &mut WriteContext) -> Result<(), Error> {
        let s = match value {
            Value::Str(s) => s,
            other => {
                return Err(Error::invalid_data(format!(
                    "string slot holds {}",
                    other.kind_name()
                )))
            }
        };
        if context.compress_string() {
            if is_latin1(s) {
                context.writer.write_u8(LATIN1);
                context.writer.write_varuint32(s.chars().count() as u32);
                for c in s.chars() {
                    context.writer.write_u8(c as u32 as u8);
                }
            } else {
                context.writer.write_u8(UTF8);
                context.writer.write_varuint32(s.len() as u32);
                context.writer.write_bytes(s.as_bytes());
            }
        } else {
            let units: Vec<u16> = s.encode_utf16().collect();
            context.writer.write_u8(UTF16LE);
            context.writer.write_varuint32((units.len() * 2) as u32);
            for unit in units {
                context.writer.write_u16(unit);
            }
        }
        Ok(())
    }

    fn read_data(&self, context: &mut ReadContext) -> Result<Value, Error> {
        let offset = context.reader.cursor();
        let encoding = context.reader.read_u8()?;
        let len = context.reader.read_varuint32()? as usize;
        let s = match encoding {
            LATIN1 => {
                let bytes = context.reader.read_bytes(len)?;
                bytes.iter().map(|&b| b as char).collect()
            }
            UTF16LE => {
                if len % 2 != 0 {
                    return Err(Error::invalid_data(format!(
                        "odd utf-16 byte length {len} at offset {offset}"
                    )));
                }
                let bytes = context.reader.read_bytes(len)?;
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|c| u16::from_le_bytes([c[0], c[1]]))
                    .collect();
                String::from_utf16(&units).map_err(|_| {
                    Error::invalid_data(format!("invalid utf-16 payload at offset {offset}"))
                })?
            }
            UTF8 => {
                let bytes = context.reader.read_bytes(len)?;
                String::from_utf8(bytes.to_vec()).map_err(|_| {
                    Error::invalid_data(format!("invalid utf-8 payload at offset {offset}"))
                })?
            }
            other => return Err(Error::invalid_string_encoding(other, offset)),
        };
        Ok(Value::Str(s))
    }
}
