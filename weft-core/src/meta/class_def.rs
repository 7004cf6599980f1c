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

//! Serializable class definitions for COMPATIBLE mode.
//!
//! A `ClassDef` is the portable statement of a class's field layout that one
//! peer sends to another, so the receiver can decode records whose fields
//! were added, removed or reordered relative to its own declaration. The
//! encoded blob is content-hashed; peers with identical schemas produce the
//! same id, which is the dedup key of the meta context.

use std::collections::BTreeMap;

use crate::buffer::{Reader, Writer};
use crate::descriptor::{join_qualified, split_qualified};
use crate::ensure;
use crate::error::Error;
use crate::meta::{murmurhash3_x64_128, read_meta_string, write_meta_string};

// header word: | hash:50 | ext:1 | compatible:1 | size:12 |
const SIZE_MASK: u64 = 0xfff;
const COMPATIBLE_FLAG: u64 = 1 << 12;
const EXT_FLAG: u64 = 1 << 13;
const HASH_SHIFT: u32 = 14;
const HASH_SEED: u64 = 47;

/// Shape of one field as stated on the wire.
///
/// The variant tag and the monomorphic bit share a single varuint: the low
/// bit is `monomorphic`, the upper bits are `0` Object, `1` Map, `2`
/// Collection, `3 + class_id` Registered. Nested generics recurse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldType {
    /// Unregistered, non-container reference type.
    Object { monomorphic: bool },
    Map {
        key: Box<FieldType>,
        value: Box<FieldType>,
        monomorphic: bool,
    },
    Collection {
        elem: Box<FieldType>,
        monomorphic: bool,
    },
    /// A type with a registered class id (built-in or user).
    Registered { class_id: u32, monomorphic: bool },
}

impl FieldType {
    pub fn registered(class_id: u32, monomorphic: bool) -> FieldType {
        FieldType::Registered {
            class_id,
            monomorphic,
        }
    }

    pub fn collection(elem: FieldType, monomorphic: bool) -> FieldType {
        FieldType::Collection {
            elem: Box::new(elem),
            monomorphic,
        }
    }

    pub fn map(key: FieldType, value: FieldType, monomorphic: bool) -> FieldType {
        FieldType::Map {
            key: Box::new(key),
            value: Box::new(value),
            monomorphic,
        }
    }

    pub fn is_monomorphic(&self) -> bool {
        match self {
            FieldType::Object { monomorphic }
            | FieldType::Map { monomorphic, .. }
            | FieldType::Collection { monomorphic, .. }
            | FieldType::Registered { monomorphic, .. } => *monomorphic,
        }
    }

    pub fn write(&self, writer: &mut Writer) {
        let mono = self.is_monomorphic() as u32;
        match self {
            FieldType::Object { .. } => writer.write_varuint32(mono),
            FieldType::Map { key, value, .. } => {
                writer.write_varuint32((1 << 1) | mono);
                key.write(writer);
                value.write(writer);
            }
            FieldType::Collection { elem, .. } => {
                writer.write_varuint32((2 << 1) | mono);
                elem.write(writer);
            }
            FieldType::Registered { class_id, .. } => {
                writer.write_varuint32(((3 + class_id) << 1) | mono);
            }
        }
    }

    pub fn read(reader: &mut Reader) -> Result<FieldType, Error> {
        let header = reader.read_varuint32()?;
        let monomorphic = (header & 1) != 0;
        Ok(match header >> 1 {
            0 => FieldType::Object { monomorphic },
            1 => {
                let key = Box::new(FieldType::read(reader)?);
                let value = Box::new(FieldType::read(reader)?);
                FieldType::Map {
                    key,
                    value,
                    monomorphic,
                }
            }
            2 => FieldType::Collection {
                elem: Box::new(FieldType::read(reader)?),
                monomorphic,
            },
            variant => FieldType::Registered {
                class_id: variant - 3,
                monomorphic,
            },
        })
    }
}

/// One field of a class definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDefField {
    /// Class that declared the field; disambiguates shadowed names across a
    /// flattened hierarchy.
    pub declaring_class: String,
    pub field_name: String,
    pub field_type: FieldType,
}

impl ClassDefField {
    pub fn new<D: Into<String>, N: Into<String>>(
        declaring_class: D,
        field_name: N,
        field_type: FieldType,
    ) -> ClassDefField {
        ClassDefField {
            declaring_class: declaring_class.into(),
            field_name: field_name.into(),
            field_type,
        }
    }
}

/// A class definition: name, fields, extension metadata, content-hash id and
/// the encoded blob it travels as.
#[derive(Debug)]
pub struct ClassDef {
    class_name: String,
    fields: Vec<ClassDefField>,
    ext_meta: BTreeMap<String, String>,
    id: u64,
    encoded: Vec<u8>,
}

impl ClassDef {
    pub fn new(
        class_name: String,
        fields: Vec<ClassDefField>,
        ext_meta: BTreeMap<String, String>,
    ) -> ClassDef {
        let mut body = Writer::default();
        let (package, simple) = split_qualified(&class_name);
        write_meta_string(&mut body, package);
        write_meta_string(&mut body, simple);
        body.write_varuint32(fields.len() as u32);
        for field in &fields {
            field.field_type.write(&mut body);
            // empty declaring marker means "declared by the class itself"
            if field.declaring_class == class_name {
                write_meta_string(&mut body, "");
            } else {
                write_meta_string(&mut body, &field.declaring_class);
            }
            write_meta_string(&mut body, &field.field_name);
        }
        if !ext_meta.is_empty() {
            body.write_varuint32(ext_meta.len() as u32);
            for (key, value) in &ext_meta {
                write_meta_string(&mut body, key);
                write_meta_string(&mut body, value);
            }
        }
        let body = body.dump();

        let id = murmurhash3_x64_128(&body, HASH_SEED).0 >> (64 - 50);
        let size = body.len() as u64;
        let mut header = size.min(SIZE_MASK) | COMPATIBLE_FLAG | (id << HASH_SHIFT);
        if !ext_meta.is_empty() {
            header |= EXT_FLAG;
        }
        let mut encoded = Writer::default();
        encoded.write_u64(header);
        if size >= SIZE_MASK {
            encoded.write_varuint32((size - SIZE_MASK) as u32);
        }
        encoded.write_bytes(&body);

        ClassDef {
            class_name,
            fields,
            ext_meta,
            id,
            encoded: encoded.dump(),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn fields(&self) -> &[ClassDefField] {
        &self.fields
    }

    pub fn ext_meta(&self) -> &BTreeMap<String, String> {
        &self.ext_meta
    }

    /// Content hash of the encoded blob; identical schemas share an id.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    /// Appends the encoded blob to `writer`.
    pub fn write(&self, writer: &mut Writer) {
        writer.write_bytes(&self.encoded);
    }

    /// Decodes a definition from the reader, verifying the declared size.
    pub fn read(reader: &mut Reader) -> Result<ClassDef, Error> {
        let start = reader.cursor();
        let header = reader.read_u64()?;
        let mut size = header & SIZE_MASK;
        if size == SIZE_MASK {
            size += reader.read_varuint32()? as u64;
        }
        ensure!(
            (header & COMPATIBLE_FLAG) != 0,
            Error::invalid_data(format!(
                "class definition at offset {start} lacks the schema-compatible flag"
            ))
        );
        let has_ext = (header & EXT_FLAG) != 0;
        let id = header >> HASH_SHIFT;

        let body_start = reader.cursor();
        let package = read_meta_string(reader)?;
        let simple = read_meta_string(reader)?;
        let class_name = join_qualified(&package, &simple);
        let field_count = reader.read_varuint32()? as usize;
        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            let field_type = FieldType::read(reader)?;
            let declaring = read_meta_string(reader)?;
            let field_name = read_meta_string(reader)?;
            let declaring_class = if declaring.is_empty() {
                class_name.clone()
            } else {
                declaring
            };
            fields.push(ClassDefField {
                declaring_class,
                field_name,
                field_type,
            });
        }
        let mut ext_meta = BTreeMap::new();
        if has_ext {
            let count = reader.read_varuint32()? as usize;
            for _ in 0..count {
                let key = read_meta_string(reader)?;
                let value = read_meta_string(reader)?;
                ext_meta.insert(key, value);
            }
        }
        let consumed = (reader.cursor() - body_start) as u64;
        ensure!(
            consumed == size,
            Error::invalid_data(format!(
                "class definition size mismatch at offset {start}: declared {size}, read {consumed}"
            ))
        );

        // Re-encoding is deterministic, so rebuilding yields the blob the
        // sender hashed; a diverging id means the payload was corrupted.
        let def = ClassDef::new(class_name, fields, ext_meta);
        ensure!(
            def.id == id,
            Error::invalid_data(format!(
                "class definition hash mismatch at offset {start}"
            ))
        );
        Ok(def)
    }
}
