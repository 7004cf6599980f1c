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

use std::cell::RefCell;
use std::sync::Arc;

use crate::buffer::{Reader, Writer};
use crate::config::Config;
use crate::descriptor::ClassDescriptor;
use crate::ensure;
use crate::error::Error;
use crate::resolver::class_resolver::ClassResolver;
use crate::resolver::context::{ReadContext, ReadScratch, WriteContext};
use crate::serializer::{read_any, write_any};
use crate::types::config_flags::{
    IS_CROSS_LANGUAGE_FLAG, IS_LITTLE_ENDIAN_FLAG, IS_NULL_FLAG, IS_OUT_OF_BAND_FLAG,
};
use crate::types::{Language, Mode};
use crate::value::{obj_ref, ObjRef, Value};

/// The Weft serialization engine.
///
/// One instance is single-threaded: it owns a reference table and a generics
/// stack that are reused across calls after reset. For concurrent workloads,
/// put instances in a [`crate::resolver::pool::WeftPool`].
///
/// # Examples
///
/// ```
/// use weft_core::descriptor::{ClassDescriptor, PrimKind, TypeSpec};
/// use weft_core::value::{obj_ref, ObjectValue, Value};
/// use weft_core::weft::Weft;
///
/// let mut weft = Weft::default();
/// let point = ClassDescriptor::builder("demo.Point")
///     .field("x", TypeSpec::Prim(PrimKind::Int32))
///     .field("y", TypeSpec::Prim(PrimKind::Int32))
///     .build();
/// weft.register(point, 100).unwrap();
///
/// let value = obj_ref(Value::Object(ObjectValue::new(
///     "demo.Point",
///     vec![obj_ref(Value::Int32(3)), obj_ref(Value::Int32(4))],
/// )));
/// let bytes = weft.serialize(&value).unwrap();
/// let back = weft.deserialize(&bytes).unwrap();
/// assert_eq!(*back.borrow(), *value.borrow());
/// ```
pub struct Weft {
    config: Config,
    resolver: Arc<ClassResolver>,
    write_context: RefCell<Option<WriteContext>>,
    read_scratch: RefCell<ReadScratch>,
}

impl Default for Weft {
    fn default() -> Self {
        Weft {
            config: Config::default(),
            resolver: Arc::new(ClassResolver::new()),
            write_context: RefCell::new(None),
            read_scratch: RefCell::new(ReadScratch::default()),
        }
    }
}

impl Weft {
    /// Sets the compatibility mode. COMPATIBLE lets peers add, remove and
    /// reorder record fields independently, at the cost of shipping class
    /// definitions through the meta context.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        if self.config.is_compatible() {
            self.config.check_class_version = false;
        }
        self
    }

    /// Sugar for [`Weft::mode`].
    pub fn compatible(self, compatible: bool) -> Self {
        self.mode(if compatible {
            Mode::Compatible
        } else {
            Mode::SchemaConsistent
        })
    }

    /// Enables the cross-language frame layout (language byte after the
    /// head byte).
    pub fn xlang(mut self, xlang: bool) -> Self {
        self.config.xlang = xlang;
        self
    }

    /// Enables identity tracking, preserving shared references and cycles.
    pub fn track_ref(mut self, track_ref: bool) -> Self {
        self.config.reference_tracking = track_ref;
        self
    }

    /// Excludes boxed scalars from identity tracking (on by default).
    pub fn basic_types_ref_ignored(mut self, ignored: bool) -> Self {
        self.config.basic_types_ref_ignored = ignored;
        self
    }

    /// Excludes strings from identity tracking (on by default).
    pub fn string_ref_ignored(mut self, ignored: bool) -> Self {
        self.config.string_ref_ignored = ignored;
        self
    }

    /// Excludes date/timestamp values from identity tracking (on by
    /// default).
    pub fn time_ref_ignored(mut self, ignored: bool) -> Self {
        self.config.time_ref_ignored = ignored;
        self
    }

    /// Uses zig-zag varints for i32/i64 slots.
    pub fn compress_number(mut self, compress: bool) -> Self {
        self.config.compress_number = compress;
        self
    }

    /// Permits the LATIN1 short path for strings instead of UTF-16.
    pub fn compress_string(mut self, compress: bool) -> Self {
        self.config.compress_string = compress;
        self
    }

    /// Refuses to write any class lacking a pre-registered id.
    pub fn class_registration_required(mut self, required: bool) -> Self {
        self.config.class_registration_required = required;
        self
    }

    /// Refuses to read name-encoded class references.
    pub fn secure_mode(mut self, secure: bool) -> Self {
        self.config.secure_mode = secure;
        self
    }

    /// Substitutes placeholder values for unknown class names on read
    /// (COMPATIBLE mode only; their bodies re-emit unchanged).
    pub fn deserialize_unknown_class(mut self, enabled: bool) -> Self {
        self.config.deserialize_unknown_class = enabled;
        self
    }

    /// Emits/requires the 4-byte class-version hash. Ignored in COMPATIBLE
    /// mode, where schemas are allowed to diverge.
    pub fn check_class_version(mut self, check: bool) -> Self {
        if !self.config.is_compatible() {
            self.config.check_class_version = check;
        }
        self
    }

    /// Keeps class-definition dedup tables alive across calls, so a
    /// definition crosses a long-lived stream once rather than once per
    /// call. Both peers must then consume the stream in write order.
    pub fn share_meta_context(mut self, share: bool) -> Self {
        self.config.share_meta_context = share;
        self
    }

    /// Bounds the generics stack and dynamic nesting.
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn resolver(&self) -> &Arc<ClassResolver> {
        &self.resolver
    }

    pub fn is_compatible(&self) -> bool {
        self.config.is_compatible()
    }

    /// Pre-binds a class layout to an integer id.
    pub fn register(&mut self, descriptor: Arc<ClassDescriptor>, id: u32) -> Result<(), Error> {
        self.resolver.register(descriptor, id)
    }

    /// Registers a class layout by name; the wire carries the qualified
    /// name on first sight and a session index afterwards.
    pub fn register_by_name(&mut self, descriptor: Arc<ClassDescriptor>) -> Result<(), Error> {
        self.resolver.register_by_name(descriptor)
    }

    /// Serializes an object graph into a fresh byte vector.
    pub fn serialize(&self, root: &ObjRef) -> Result<Vec<u8>, Error> {
        let mut cell = self.write_context.borrow_mut();
        let context = cell.get_or_insert_with(|| {
            WriteContext::new(self.resolver.clone(), self.config.clone())
        });
        let result = self.serialize_with_context(root, context);
        let out = result.map(|_| context.writer.dump());
        context.reset();
        out
    }

    /// Serializes an object graph, appending to `buf`; returns the number
    /// of bytes written.
    pub fn serialize_to(&self, buf: &mut Vec<u8>, root: &ObjRef) -> Result<usize, Error> {
        let bytes = self.serialize(root)?;
        buf.extend_from_slice(&bytes);
        Ok(bytes.len())
    }

    fn serialize_with_context(
        &self,
        root: &ObjRef,
        context: &mut WriteContext,
    ) -> Result<(), Error> {
        let is_none = root.borrow().is_null();
        self.write_head(is_none, &mut context.writer);
        if is_none {
            return Ok(());
        }
        write_any(root, context)
    }

    fn write_head(&self, is_none: bool, writer: &mut Writer) {
        let mut bitmap: u8 = IS_LITTLE_ENDIAN_FLAG;
        if self.config.xlang {
            bitmap |= IS_CROSS_LANGUAGE_FLAG;
        }
        if is_none {
            bitmap |= IS_NULL_FLAG;
        }
        writer.write_u8(bitmap);
        if is_none {
            return;
        }
        if self.config.xlang {
            writer.write_u8(Language::Rust as u8);
        }
    }

    /// Deserializes an object graph from a byte slice.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<ObjRef, Error> {
        let scratch = std::mem::take(&mut *self.read_scratch.borrow_mut());
        let mut context = ReadContext::new(
            Reader::new(bytes),
            self.resolver.clone(),
            self.config.clone(),
            scratch,
        );
        let result = self.deserialize_with_context(&mut context);
        *self.read_scratch.borrow_mut() = context.into_scratch();
        result
    }

    /// Deserializes from the reader's cursor, advancing it past the frame.
    /// The paired read operation for [`Weft::serialize_to`].
    pub fn deserialize_from(&self, reader: &mut Reader) -> Result<ObjRef, Error> {
        let scratch = std::mem::take(&mut *self.read_scratch.borrow_mut());
        let mut context = ReadContext::new(
            Reader::new(reader.slice_after_cursor()),
            self.resolver.clone(),
            self.config.clone(),
            scratch,
        );
        let result = self.deserialize_with_context(&mut context);
        let consumed = context.reader.cursor();
        *self.read_scratch.borrow_mut() = context.into_scratch();
        let root = result?;
        reader.skip(consumed)?;
        Ok(root)
    }

    fn deserialize_with_context(&self, context: &mut ReadContext) -> Result<ObjRef, Error> {
        let is_none = self.read_head(context)?;
        if is_none {
            return Ok(obj_ref(Value::Null));
        }
        read_any(context)
    }

    fn read_head(&self, context: &mut ReadContext) -> Result<bool, Error> {
        let offset = context.reader.cursor();
        let head = context.reader.read_u8()?;
        ensure!(
            head & IS_LITTLE_ENDIAN_FLAG != 0,
            Error::UnsupportedByteOrder { head, offset }
        );
        ensure!(
            head & IS_OUT_OF_BAND_FLAG == 0,
            Error::UnsupportedOutOfBand { head, offset }
        );
        let peer_xlang = head & IS_CROSS_LANGUAGE_FLAG != 0;
        ensure!(
            peer_xlang == self.config.xlang,
            Error::UnsupportedCrossLanguageMode { head, offset }
        );
        if head & IS_NULL_FLAG != 0 {
            return Ok(true);
        }
        if peer_xlang {
            let language = context.reader.read_u8()?;
            Language::try_from(language)?;
        }
        Ok(false)
    }
}
