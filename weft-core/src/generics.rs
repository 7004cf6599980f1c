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

use crate::descriptor::TypeSpec;
use crate::error::Error;

/// One generics entry: the expected static type(s) of the container the
/// engine is about to descend into.
#[derive(Clone, Debug)]
pub enum GenericEntry {
    /// Collection element type.
    Elem(TypeSpec),
    /// Map key and value types.
    Pair(TypeSpec, TypeSpec),
    /// Pushed around a runtime-dispatched body so a container inside it does
    /// not pick up an enclosing container's entry.
    Barrier,
}

/// Bounded stack propagating declared element types downward past erased
/// containers. A container slot pushes before dispatching into the container
/// serializer and pops on the way back up; the serializer peeks its entry.
#[derive(Debug, Default)]
pub struct GenericsStack {
    entries: Vec<GenericEntry>,
    max_depth: usize,
}

impl GenericsStack {
    pub fn new(max_depth: usize) -> GenericsStack {
        GenericsStack {
            entries: Vec::new(),
            max_depth,
        }
    }

    pub fn push(&mut self, entry: GenericEntry) -> Result<(), Error> {
        if self.entries.len() >= self.max_depth {
            return Err(Error::depth_exceeded(format!(
                "generics stack exceeded max depth {}",
                self.max_depth
            )));
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn pop(&mut self) {
        self.entries.pop();
    }

    pub fn peek(&self) -> Option<&GenericEntry> {
        self.entries.last()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }
}
