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

//! Per-call sessions: the scratch state a serialize or deserialize call
//! works in. A context owns the buffer cursor, the reference table, the
//! generics stack, the meta context and the session name tables, and is
//! reset on every exit path so instances can be reused.

use std::collections::HashMap;
use std::sync::Arc;

use crate::buffer::{Reader, Writer};
use crate::config::Config;
use crate::descriptor::{join_qualified, split_qualified};
use crate::error::Error;
use crate::generics::GenericsStack;
use crate::meta::class_def::ClassDef;
use crate::meta::{read_meta_string, write_meta_string};
use crate::resolver::class_resolver::{ClassInfo, ClassResolver};
use crate::resolver::meta_resolver::{MetaReaderResolver, MetaWriterResolver};
use crate::resolver::ref_resolver::{RefReader, RefWriter};

pub struct WriteContext {
    pub writer: Writer,
    resolver: Arc<ClassResolver>,
    config: Config,
    pub ref_writer: RefWriter,
    pub generics: GenericsStack,
    meta: MetaWriterResolver,
    // session-local indexes of name-encoded classes
    names: HashMap<String, u32>,
}

impl WriteContext {
    pub fn new(resolver: Arc<ClassResolver>, config: Config) -> WriteContext {
        let generics = GenericsStack::new(config.max_depth as usize);
        WriteContext {
            writer: Writer::default(),
            resolver,
            config,
            ref_writer: RefWriter::new(),
            generics,
            meta: MetaWriterResolver::default(),
            names: HashMap::new(),
        }
    }

    #[inline(always)]
    pub fn resolver(&self) -> Arc<ClassResolver> {
        self.resolver.clone()
    }

    #[inline(always)]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline(always)]
    pub fn is_compatible(&self) -> bool {
        self.config.is_compatible()
    }

    #[inline(always)]
    pub fn compress_number(&self) -> bool {
        self.config.compress_number
    }

    #[inline(always)]
    pub fn compress_string(&self) -> bool {
        self.config.compress_string
    }

    /// Encodes a class reference: a single varuint whose low bit
    /// distinguishes a registered id (`1`) from the name path (`0`). On the
    /// name path the upper bits are `0` for a first sighting, followed by
    /// the package and simple-name strings, or `session_index + 1` for a
    /// repeat.
    pub fn write_class_ref(&mut self, info: &ClassInfo) -> Result<(), Error> {
        if let Some(id) = info.class_id() {
            self.writer.write_varuint32((id << 1) | 1);
            return Ok(());
        }
        if let Some(&index) = self.names.get(info.name()) {
            self.writer.write_varuint32((index + 1) << 1);
        } else {
            self.writer.write_varuint32(0);
            let (package, simple) = split_qualified(info.name());
            write_meta_string(&mut self.writer, package);
            write_meta_string(&mut self.writer, simple);
            let index = self.names.len() as u32;
            self.names.insert(info.name().to_string(), index);
        }
        Ok(())
    }

    /// Emits the meta-context reference for `def`: its session index, plus
    /// the encoded blob inline when this is the first sighting.
    pub fn write_meta(&mut self, def: &Arc<ClassDef>) {
        let (index, fresh) = self.meta.push(def);
        self.writer.write_varuint32(index);
        if fresh {
            def.write(&mut self.writer);
        }
    }

    pub fn reset(&mut self) {
        self.writer.reset();
        self.ref_writer.reset();
        self.generics.reset();
        self.names.clear();
        if !self.config.share_meta_context {
            self.meta.reset();
        }
    }
}

/// Read-side session state that survives across calls (reset in place).
#[derive(Default)]
pub struct ReadScratch {
    pub ref_reader: RefReader,
    pub generics: GenericsStack,
    pub meta: MetaReaderResolver,
    pub names: Vec<Arc<ClassInfo>>,
}

pub struct ReadContext<'a> {
    pub reader: Reader<'a>,
    resolver: Arc<ClassResolver>,
    config: Config,
    pub ref_reader: RefReader,
    pub generics: GenericsStack,
    meta: MetaReaderResolver,
    names: Vec<Arc<ClassInfo>>,
}

impl<'a> ReadContext<'a> {
    pub fn new(
        reader: Reader<'a>,
        resolver: Arc<ClassResolver>,
        config: Config,
        mut scratch: ReadScratch,
    ) -> ReadContext<'a> {
        scratch.generics = GenericsStack::new(config.max_depth as usize);
        ReadContext {
            reader,
            resolver,
            config,
            ref_reader: scratch.ref_reader,
            generics: scratch.generics,
            meta: scratch.meta,
            names: scratch.names,
        }
    }

    #[inline(always)]
    pub fn resolver(&self) -> Arc<ClassResolver> {
        self.resolver.clone()
    }

    #[inline(always)]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline(always)]
    pub fn is_compatible(&self) -> bool {
        self.config.is_compatible()
    }

    #[inline(always)]
    pub fn compress_number(&self) -> bool {
        self.config.compress_number
    }

    /// Decodes a class reference written by [`WriteContext::write_class_ref`].
    pub fn read_class_ref(&mut self) -> Result<Arc<ClassInfo>, Error> {
        let offset = self.reader.cursor();
        let encoded = self.reader.read_varuint32()?;
        if encoded & 1 == 1 {
            let class_id = encoded >> 1;
            return self
                .resolver
                .by_id(class_id)
                .ok_or_else(|| Error::class_not_registered(class_id, offset));
        }
        let index = encoded >> 1;
        if index == 0 {
            if self.config.secure_mode {
                return Err(Error::insecure_type(format!(
                    "secure mode refuses name-encoded classes (offset {offset})"
                )));
            }
            let package = read_meta_string(&mut self.reader)?;
            let simple = read_meta_string(&mut self.reader)?;
            let name = join_qualified(&package, &simple);
            let info = match self.resolver.by_name(&name) {
                Some(info) => info,
                None => {
                    if self.config.deserialize_unknown_class && self.config.is_compatible() {
                        self.resolver.placeholder_info(&name)
                    } else {
                        return Err(Error::unknown_class_name(name, offset));
                    }
                }
            };
            self.names.push(info.clone());
            Ok(info)
        } else {
            self.names
                .get((index - 1) as usize)
                .cloned()
                .ok_or_else(|| {
                    Error::invalid_data(format!(
                        "class session index {index} out of range at offset {offset}"
                    ))
                })
        }
    }

    /// Reads the meta-context reference: a session index, with the encoded
    /// definition following inline exactly when the index is fresh.
    pub fn read_meta(&mut self) -> Result<Arc<ClassDef>, Error> {
        let offset = self.reader.cursor();
        let index = self.reader.read_varuint32()? as usize;
        if index == self.meta.len() {
            let def = Arc::new(ClassDef::read(&mut self.reader)?);
            self.meta.push(def.clone());
            return Ok(def);
        }
        self.meta.get(index).cloned().ok_or_else(|| {
            Error::invalid_data(format!(
                "class definition index {index} out of range at offset {offset}"
            ))
        })
    }

    /// Tears the context down into reusable scratch, resetting tables in
    /// place. The meta context survives only when the session shares it.
    pub fn into_scratch(mut self) -> ReadScratch {
        self.ref_reader.reset();
        self.generics.reset();
        self.names.clear();
        if !self.config.share_meta_context {
            self.meta.reset();
        }
        ReadScratch {
            ref_reader: self.ref_reader,
            generics: self.generics,
            meta: self.meta,
            names: self.names,
        }
    }
}
