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

//! The meta context: per-session deduplication of class definitions.
//!
//! Each distinct definition crosses the wire at most once per session. The
//! writer emits the definition's session index before every compatible-mode
//! object body; a first sighting is followed inline by the encoded blob, and
//! the reader mirrors that by decoding a blob exactly when the index equals
//! the number of definitions received so far.

use std::collections::HashMap;
use std::sync::Arc;

use crate::meta::class_def::ClassDef;

#[derive(Default)]
pub struct MetaWriterResolver {
    defs: Vec<Arc<ClassDef>>,
    index_by_id: HashMap<u64, u32>,
}

impl MetaWriterResolver {
    /// Set-if-absent: returns the session index of `def` and whether this
    /// call inserted it (meaning the caller must emit the blob inline).
    pub fn push(&mut self, def: &Arc<ClassDef>) -> (u32, bool) {
        match self.index_by_id.get(&def.id()) {
            Some(&index) => (index, false),
            None => {
                let index = self.defs.len() as u32;
                self.defs.push(def.clone());
                self.index_by_id.insert(def.id(), index);
                (index, true)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn reset(&mut self) {
        self.defs.clear();
        self.index_by_id.clear();
    }
}

#[derive(Default)]
pub struct MetaReaderResolver {
    defs: Vec<Arc<ClassDef>>,
}

impl MetaReaderResolver {
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<ClassDef>> {
        self.defs.get(index)
    }

    pub fn push(&mut self, def: Arc<ClassDef>) {
        self.defs.push(def);
    }

    pub fn reset(&mut self) {
        self.defs.clear();
    }
}
