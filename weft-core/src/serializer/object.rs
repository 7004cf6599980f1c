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

//! The generic object serializer: walks a class's grouped field layout.
//!
//! Built once per class from its descriptor. Schema-consistent bodies are
//! the bare slot sequence (optionally led by the class-version hash);
//! compatible bodies are led by the meta-context reference to the class
//! definition, and reading maps the received definition's fields onto the
//! local layout by name, defaulting what is missing and discarding what is
//! unknown.

use std::sync::Arc;

use crate::descriptor::{ClassDescriptor, DescriptorGrouper};
use crate::ensure;
use crate::error::Error;
use crate::meta::class_def::{ClassDef, FieldType};
use crate::resolver::class_resolver::ClassResolver;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::{default_of_spec, read_slot, skip, write_slot, ValueSerializer};
use crate::value::{obj_ref, ObjRef, ObjectValue, Value};

pub struct ObjectSerializer {
    descriptor: Arc<ClassDescriptor>,
    grouper: DescriptorGrouper,
    version_hash: u32,
    class_def: Arc<ClassDef>,
    // wire shape per declared field index, for mapping received definitions
    local_field_types: Vec<FieldType>,
}

impl ObjectSerializer {
    pub fn new(descriptor: Arc<ClassDescriptor>, resolver: &ClassResolver) -> ObjectSerializer {
        let grouper = DescriptorGrouper::group(descriptor.fields(), &|name| {
            resolver.is_monomorphic_class(name)
        });
        let version_hash = grouper.version_hash();
        let class_def = Arc::new(resolver.class_def_of(&descriptor, grouper.slots()));
        let local_field_types = descriptor
            .fields()
            .iter()
            .map(|f| resolver.field_type_of_spec(&f.spec))
            .collect();
        ObjectSerializer {
            descriptor,
            grouper,
            version_hash,
            class_def,
            local_field_types,
        }
    }

    pub fn version_hash(&self) -> u32 {
        self.version_hash
    }

    pub fn class_def(&self) -> &Arc<ClassDef> {
        &self.class_def
    }

    fn read_consistent(&self, context: &mut ReadContext) -> Result<Value, Error> {
        let mut fields: Vec<ObjRef> = (0..self.descriptor.fields().len())
            .map(|_| obj_ref(Value::Null))
            .collect();
        for slot in self.grouper.slots() {
            fields[slot.declared_index] = read_slot(&slot.spec, context)?;
        }
        Ok(Value::Object(ObjectValue::new(
            self.descriptor.name().to_string(),
            fields,
        )))
    }

    // The received definition differs from ours: walk its fields in
    // definition order, land shared fields by name, discard the rest.
    fn read_compatible(&self, context: &mut ReadContext, def: &ClassDef) -> Result<Value, Error> {
        let field_count = self.descriptor.fields().len();
        let mut fields: Vec<Option<ObjRef>> = vec![None; field_count];
        for remote in def.fields() {
            match self.local_index_of(&remote.field_name, &remote.declaring_class) {
                Some(local_index) => {
                    let local_type = &self.local_field_types[local_index];
                    if *local_type != remote.field_type {
                        return Err(Error::incompatible_schema(format!(
                            "field `{}` of `{}` changed shape between peers (offset {})",
                            remote.field_name,
                            def.class_name(),
                            context.reader.cursor()
                        )));
                    }
                    let spec = &self.descriptor.fields()[local_index].spec;
                    fields[local_index] = Some(read_slot(spec, context)?);
                }
                None => {
                    // removed locally: decode by the received shape, discard
                    skip::read_remote_slot(&remote.field_type, context)?;
                }
            }
        }
        let fields = fields
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    obj_ref(default_of_spec(&self.descriptor.fields()[index].spec))
                })
            })
            .collect();
        Ok(Value::Object(ObjectValue::new(
            self.descriptor.name().to_string(),
            fields,
        )))
    }

    fn local_index_of(&self, field_name: &str, declaring_class: &str) -> Option<usize> {
        let fields = self.descriptor.fields();
        fields
            .iter()
            .position(|f| f.name == field_name && f.declaring_class == declaring_class)
            .or_else(|| fields.iter().position(|f| f.name == field_name))
    }
}

impl ValueSerializer for ObjectSerializer {
    fn write_data(&self, value: &Value, context: &mut WriteContext) -> Result<(), Error> {
        let object = match value {
            Value::Object(object) => object,
            other => {
                return Err(Error::invalid_data(format!(
                    "object slot holds {}",
                    other.kind_name()
                )))
            }
        };
        ensure!(
            object.class_name == self.descriptor.name(),
            Error::invalid_data(format!(
                "value of class `{}` written through serializer of `{}`",
                object.class_name,
                self.descriptor.name()
            ))
        );
        ensure!(
            object.fields.len() == self.descriptor.fields().len(),
            Error::construction_failure(format!(
                "instance of `{}` has {} fields, layout declares {}",
                object.class_name,
                object.fields.len(),
                self.descriptor.fields().len()
            ))
        );
        if context.is_compatible() {
            context.write_meta(&self.class_def);
        } else if context.config().write_class_version() {
            context.writer.write_u32(self.version_hash);
        }
        for slot in self.grouper.slots() {
            write_slot(&object.fields[slot.declared_index], &slot.spec, context)?;
        }
        Ok(())
    }

    fn read_data(&self, context: &mut ReadContext) -> Result<Value, Error> {
        if context.is_compatible() {
            let def = context.read_meta()?;
            if def.id() == self.class_def.id() {
                self.read_consistent(context)
            } else {
                self.read_compatible(context, &def)
            }
        } else {
            if context.config().write_class_version() {
                let offset = context.reader.cursor();
                let remote = context.reader.read_u32()?;
                ensure!(
                    remote == self.version_hash,
                    Error::class_version_mismatch(
                        self.descriptor.name(),
                        self.version_hash,
                        remote,
                        offset
                    )
                );
            }
            self.read_consistent(context)
        }
    }
}
