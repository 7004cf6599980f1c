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

use std::collections::HashMap;
use std::rc::Rc;

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::types::RefFlag;
use crate::value::{obj_ref, ObjRef, Value};

/// Write-side reference table.
///
/// Maps object identity (the `Rc` allocation address) to a dense reference
/// id assigned in first-seen pre-order over the graph. Lives for one
/// top-level call; `reset` clears it in place.
#[derive(Default)]
pub struct RefWriter {
    refs: HashMap<usize, u32>,
    next_ref_id: u32,
}

impl RefWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the reference flag for `obj` and returns whether the slot is
    /// complete.
    ///
    /// Null writes `Null` and completes. A tracked, already-seen object
    /// writes `Ref` plus its id and completes. A tracked first sighting
    /// writes `RefValue`, assigns the next id and leaves the body to the
    /// caller; an untracked value writes `NotNullValue` and likewise leaves
    /// the body to the caller.
    #[inline]
    pub fn write_ref_or_null(&mut self, writer: &mut Writer, obj: &ObjRef, track: bool) -> bool {
        if obj.borrow().is_null() {
            writer.write_i8(RefFlag::Null as i8);
            return true;
        }
        if !track {
            writer.write_i8(RefFlag::NotNullValue as i8);
            return false;
        }
        let addr = Rc::as_ptr(obj) as *const () as usize;
        if let Some(&ref_id) = self.refs.get(&addr) {
            writer.write_i8(RefFlag::Ref as i8);
            writer.write_varuint32(ref_id);
            true
        } else {
            let ref_id = self.next_ref_id;
            self.next_ref_id += 1;
            self.refs.insert(addr, ref_id);
            writer.write_i8(RefFlag::RefValue as i8);
            false
        }
    }

    /// Null-or-value flag only; never records identity. Used by types the
    /// tracking policy excludes.
    #[inline]
    pub fn write_null_flag(&mut self, writer: &mut Writer, obj: &ObjRef) -> bool {
        if obj.borrow().is_null() {
            writer.write_i8(RefFlag::Null as i8);
            true
        } else {
            writer.write_i8(RefFlag::NotNullValue as i8);
            false
        }
    }

    #[inline(always)]
    pub fn reset(&mut self) {
        self.refs.clear();
        self.next_ref_id = 0;
    }
}

/// Outcome of consuming one reference flag on the read side.
#[derive(Debug)]
pub enum RefRead {
    /// The slot holds null; nothing follows.
    Null,
    /// A back-reference; the object resolved from the read table.
    Resolved(ObjRef),
    /// A tracked first sighting: the body follows and must be decoded into
    /// `slot`, which is already registered under `id`.
    Reserved { id: u32, slot: ObjRef },
    /// An untracked value; the body follows.
    Untracked,
}

/// Read-side reference table: id N yields the Nth materialized object.
///
/// A slot is reserved *before* its body is decoded, so a back-reference
/// reached recursively from inside the body resolves to the final object.
#[derive(Default)]
pub struct RefReader {
    refs: Vec<ObjRef>,
}

// The table is empty between calls (reset on every exit path), so moving the
// owning instance across threads between calls is sound.
unsafe impl Send for RefReader {}

impl RefReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one reference flag and classifies the slot.
    pub fn try_preserve_ref_id(&mut self, reader: &mut Reader) -> Result<RefRead, Error> {
        let offset = reader.cursor();
        let flag = reader.read_i8()?;
        if flag == RefFlag::Null as i8 {
            Ok(RefRead::Null)
        } else if flag == RefFlag::Ref as i8 {
            let id = reader.read_varuint32()?;
            Ok(RefRead::Resolved(self.get_read_object(id, offset)?))
        } else if flag == RefFlag::RefValue as i8 {
            let (id, slot) = self.reserve();
            Ok(RefRead::Reserved { id, slot })
        } else if flag == RefFlag::NotNullValue as i8 {
            Ok(RefRead::Untracked)
        } else {
            Err(Error::invalid_ref_flag(flag, offset))
        }
    }

    /// Reserves the next id with a placeholder node. The caller fills the
    /// node in place once the body is decoded.
    pub fn reserve(&mut self) -> (u32, ObjRef) {
        let id = self.refs.len() as u32;
        let slot = obj_ref(Value::Null);
        self.refs.push(slot.clone());
        (id, slot)
    }

    pub fn get_read_object(&self, id: u32, offset: usize) -> Result<ObjRef, Error> {
        self.refs.get(id as usize).cloned().ok_or_else(|| {
            Error::invalid_data(format!(
                "reference id {id} out of range at offset {offset}"
            ))
        })
    }

    pub fn set_read_object(&mut self, id: u32, obj: ObjRef) {
        self.refs[id as usize] = obj;
    }

    #[inline(always)]
    pub fn reset(&mut self) {
        self.refs.clear();
    }
}
