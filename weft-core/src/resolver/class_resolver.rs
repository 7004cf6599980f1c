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

//! Bidirectional mapping between runtime type identity and wire identity.
//!
//! A class reaches the wire either as a small pre-registered integer id or,
//! for name-registered classes, as its qualified name on first sight and a
//! session-local index afterwards. Built-in value kinds are pre-registered
//! in the low id space at construction.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::config::Config;
use crate::descriptor::{ClassDescriptor, PrimKind, TypeSpec};
use crate::ensure;
use crate::error::Error;
use crate::meta::class_def::{ClassDef, FieldType};
use crate::serializer::collection::ListSerializer;
use crate::serializer::datetime::{DateSerializer, TimestampSerializer};
use crate::serializer::map::MapSerializer;
use crate::serializer::object::ObjectSerializer;
use crate::serializer::primitive::{
    BoolSerializer, Float32Serializer, Float64Serializer, Int16Serializer, Int32Serializer,
    Int64Serializer, Int8Serializer,
};
use crate::serializer::skip::OpaqueSerializer;
use crate::serializer::string::StringSerializer;
use crate::serializer::ValueSerializer;
use crate::types::{TypeId, FIRST_USER_CLASS_ID};
use crate::value::Value;

pub type SerializerHandle = Arc<dyn ValueSerializer + Send + Sync>;

/// Cached per-type record: wire identity, layout, serializer and policy
/// flags. Registered classes are cached process-wide; classes discovered by
/// name during a read live only in the session tables.
pub struct ClassInfo {
    class_id: Option<u32>,
    name: String,
    type_id: TypeId,
    descriptor: Option<Arc<ClassDescriptor>>,
    serializer: OnceLock<SerializerHandle>,
    monomorphic: bool,
}

impl ClassInfo {
    fn builtin(type_id: TypeId, name: &str, serializer: SerializerHandle) -> Arc<ClassInfo> {
        let info = ClassInfo {
            class_id: Some(type_id as u32),
            name: name.to_string(),
            type_id,
            descriptor: None,
            serializer: OnceLock::new(),
            monomorphic: true,
        };
        let _ = info.serializer.set(serializer);
        Arc::new(info)
    }

    /// Registered class id; absent for name-registered classes.
    pub fn class_id(&self) -> Option<u32> {
        self.class_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn descriptor(&self) -> Option<&Arc<ClassDescriptor>> {
        self.descriptor.as_ref()
    }

    pub fn is_monomorphic(&self) -> bool {
        self.monomorphic
    }

    /// Tracking policy: the global switch gated by the per-kind exclusions.
    pub fn needs_ref_tracking(&self, config: &Config) -> bool {
        if !config.reference_tracking {
            return false;
        }
        match self.type_id {
            TypeId::BOOL
            | TypeId::INT8
            | TypeId::INT16
            | TypeId::INT32
            | TypeId::INT64
            | TypeId::FLOAT32
            | TypeId::FLOAT64
            | TypeId::NULLABLE_BOOL
            | TypeId::NULLABLE_INT8
            | TypeId::NULLABLE_INT16
            | TypeId::NULLABLE_INT32
            | TypeId::NULLABLE_INT64
            | TypeId::NULLABLE_FLOAT32
            | TypeId::NULLABLE_FLOAT64 => !config.basic_types_ref_ignored,
            TypeId::STRING => !config.string_ref_ignored,
            TypeId::LOCAL_DATE | TypeId::TIMESTAMP => !config.time_ref_ignored,
            TypeId::LIST | TypeId::MAP | TypeId::STRUCT => true,
        }
    }
}

/// The resolver. Registration tables are append-only and behind `RwLock`, so
/// they are safe to consult concurrently once setup has completed.
pub struct ClassResolver {
    by_id: RwLock<HashMap<u32, Arc<ClassInfo>>>,
    by_name: RwLock<HashMap<String, Arc<ClassInfo>>>,
}

impl Default for ClassResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassResolver {
    pub fn new() -> ClassResolver {
        let resolver = ClassResolver {
            by_id: RwLock::new(HashMap::new()),
            by_name: RwLock::new(HashMap::new()),
        };
        resolver.register_builtins();
        resolver
    }

    fn register_builtins(&self) {
        let builtins: [(TypeId, &str, SerializerHandle); 12] = [
            (TypeId::BOOL, "bool", Arc::new(BoolSerializer)),
            (TypeId::INT8, "i8", Arc::new(Int8Serializer)),
            (TypeId::INT16, "i16", Arc::new(Int16Serializer)),
            (TypeId::INT32, "i32", Arc::new(Int32Serializer)),
            (TypeId::INT64, "i64", Arc::new(Int64Serializer)),
            (TypeId::FLOAT32, "f32", Arc::new(Float32Serializer)),
            (TypeId::FLOAT64, "f64", Arc::new(Float64Serializer)),
            (TypeId::STRING, "String", Arc::new(StringSerializer)),
            (TypeId::LOCAL_DATE, "NaiveDate", Arc::new(DateSerializer)),
            (
                TypeId::TIMESTAMP,
                "NaiveDateTime",
                Arc::new(TimestampSerializer),
            ),
            (TypeId::LIST, "Vec", Arc::new(ListSerializer)),
            (TypeId::MAP, "HashMap", Arc::new(MapSerializer)),
        ];
        let mut by_id = self.by_id.write().unwrap();
        let mut by_name = self.by_name.write().unwrap();
        for (type_id, name, serializer) in builtins {
            let info = ClassInfo::builtin(type_id, name, serializer);
            by_id.insert(type_id as u32, info.clone());
            by_name.insert(name.to_string(), info);
        }
    }

    /// Pre-binds a class to an integer id. Ids below
    /// [`FIRST_USER_CLASS_ID`] are reserved for built-ins.
    pub fn register(&self, descriptor: Arc<ClassDescriptor>, id: u32) -> Result<(), Error> {
        ensure!(
            id >= FIRST_USER_CLASS_ID,
            Error::invalid_data(format!(
                "class id {id} is reserved; user ids start at {FIRST_USER_CLASS_ID}"
            ))
        );
        ensure!(
            !self.by_id.read().unwrap().contains_key(&id),
            Error::invalid_data(format!("class id {id} is already registered"))
        );
        let info = Arc::new(ClassInfo {
            class_id: Some(id),
            name: descriptor.name().to_string(),
            type_id: TypeId::STRUCT,
            monomorphic: descriptor.is_monomorphic(),
            descriptor: Some(descriptor),
            serializer: OnceLock::new(),
        });
        self.by_id.write().unwrap().insert(id, info.clone());
        self.by_name
            .write()
            .unwrap()
            .insert(info.name.clone(), info);
        Ok(())
    }

    /// Registers a class by name only; the wire carries the name on first
    /// sight and a session index afterwards.
    pub fn register_by_name(&self, descriptor: Arc<ClassDescriptor>) -> Result<(), Error> {
        ensure!(
            !self
                .by_name
                .read()
                .unwrap()
                .contains_key(descriptor.name()),
            Error::invalid_data(format!(
                "class `{}` is already registered",
                descriptor.name()
            ))
        );
        let info = Arc::new(ClassInfo {
            class_id: None,
            name: descriptor.name().to_string(),
            type_id: TypeId::STRUCT,
            monomorphic: descriptor.is_monomorphic(),
            descriptor: Some(descriptor),
            serializer: OnceLock::new(),
        });
        self.by_name
            .write()
            .unwrap()
            .insert(info.name.clone(), info);
        Ok(())
    }

    pub fn by_id(&self, id: u32) -> Option<Arc<ClassInfo>> {
        self.by_id.read().unwrap().get(&id).cloned()
    }

    pub fn by_name(&self, name: &str) -> Option<Arc<ClassInfo>> {
        self.by_name.read().unwrap().get(name).cloned()
    }

    pub fn is_monomorphic_class(&self, name: &str) -> bool {
        self.by_name(name).map(|i| i.monomorphic).unwrap_or(false)
    }

    /// Write-side dispatch: the class info for a value's runtime type.
    pub fn info_of_value(&self, value: &Value, config: &Config) -> Result<Arc<ClassInfo>, Error> {
        let info = match value {
            Value::Null => {
                return Err(Error::invalid_data("null has no class info"));
            }
            Value::Object(object) => self.by_name(&object.class_name).ok_or_else(|| {
                Error::invalid_data(format!("class `{}` is not registered", object.class_name))
            })?,
            Value::Opaque(opaque) => Arc::new(ClassInfo {
                class_id: None,
                name: opaque.class_name.clone(),
                type_id: TypeId::STRUCT,
                descriptor: None,
                serializer: {
                    let cell = OnceLock::new();
                    let _ = cell.set(Arc::new(OpaqueSerializer) as SerializerHandle);
                    cell
                },
                monomorphic: false,
            }),
            other => {
                let type_id = other.type_id().expect("non-null value has a type id");
                self.by_id(type_id as u32)
                    .expect("built-in kinds are pre-registered")
            }
        };
        if config.class_registration_required && info.class_id.is_none() {
            return Err(Error::insecure_type(format!(
                "class `{}` has no registered id and registration is required",
                info.name
            )));
        }
        Ok(info)
    }

    /// Placeholder info substituted for an unknown class name on read.
    pub fn placeholder_info(&self, name: &str) -> Arc<ClassInfo> {
        let serializer = OnceLock::new();
        let _ = serializer.set(Arc::new(OpaqueSerializer) as SerializerHandle);
        Arc::new(ClassInfo {
            class_id: None,
            name: name.to_string(),
            type_id: TypeId::STRUCT,
            descriptor: None,
            serializer,
            monomorphic: false,
        })
    }

    /// The serializer for `info`, building and caching the object serializer
    /// of a registered class on first use.
    pub fn serializer_of(&self, info: &Arc<ClassInfo>) -> Result<SerializerHandle, Error> {
        if let Some(serializer) = info.serializer.get() {
            return Ok(serializer.clone());
        }
        let descriptor = info.descriptor.as_ref().ok_or_else(|| {
            Error::invalid_data(format!("class `{}` has no layout descriptor", info.name))
        })?;
        let built: SerializerHandle = Arc::new(ObjectSerializer::new(descriptor.clone(), self));
        Ok(info.serializer.get_or_init(|| built).clone())
    }

    /// Encodes a declared slot type as the wire field-type of a class
    /// definition.
    pub fn field_type_of_spec(&self, spec: &TypeSpec) -> FieldType {
        match spec {
            TypeSpec::Prim(k) => FieldType::registered(k.type_id() as u32, true),
            TypeSpec::Nullable(k) => FieldType::registered(k.nullable_type_id() as u32, true),
            TypeSpec::Str => FieldType::registered(TypeId::STRING as u32, true),
            TypeSpec::Date => FieldType::registered(TypeId::LOCAL_DATE as u32, true),
            TypeSpec::Timestamp => FieldType::registered(TypeId::TIMESTAMP as u32, true),
            TypeSpec::Class(name) => match self.by_name(name) {
                Some(info) => match info.class_id {
                    Some(id) => FieldType::registered(id, info.monomorphic),
                    None => FieldType::Object {
                        monomorphic: info.monomorphic,
                    },
                },
                None => FieldType::Object { monomorphic: false },
            },
            TypeSpec::Dynamic => FieldType::Object { monomorphic: false },
            TypeSpec::List(elem) => FieldType::collection(self.field_type_of_spec(elem), true),
            TypeSpec::Map(key, value) => FieldType::map(
                self.field_type_of_spec(key),
                self.field_type_of_spec(value),
                true,
            ),
        }
    }

    /// Maps a registered wire id back to a declared slot type, when this
    /// peer knows the id.
    pub fn spec_of_registered(&self, class_id: u32) -> Option<TypeSpec> {
        match TypeId::try_from(class_id) {
            Ok(TypeId::BOOL) => Some(TypeSpec::Prim(PrimKind::Bool)),
            Ok(TypeId::INT8) => Some(TypeSpec::Prim(PrimKind::Int8)),
            Ok(TypeId::INT16) => Some(TypeSpec::Prim(PrimKind::Int16)),
            Ok(TypeId::INT32) => Some(TypeSpec::Prim(PrimKind::Int32)),
            Ok(TypeId::INT64) => Some(TypeSpec::Prim(PrimKind::Int64)),
            Ok(TypeId::FLOAT32) => Some(TypeSpec::Prim(PrimKind::Float32)),
            Ok(TypeId::FLOAT64) => Some(TypeSpec::Prim(PrimKind::Float64)),
            Ok(TypeId::NULLABLE_BOOL) => Some(TypeSpec::Nullable(PrimKind::Bool)),
            Ok(TypeId::NULLABLE_INT8) => Some(TypeSpec::Nullable(PrimKind::Int8)),
            Ok(TypeId::NULLABLE_INT16) => Some(TypeSpec::Nullable(PrimKind::Int16)),
            Ok(TypeId::NULLABLE_INT32) => Some(TypeSpec::Nullable(PrimKind::Int32)),
            Ok(TypeId::NULLABLE_INT64) => Some(TypeSpec::Nullable(PrimKind::Int64)),
            Ok(TypeId::NULLABLE_FLOAT32) => Some(TypeSpec::Nullable(PrimKind::Float32)),
            Ok(TypeId::NULLABLE_FLOAT64) => Some(TypeSpec::Nullable(PrimKind::Float64)),
            Ok(TypeId::STRING) => Some(TypeSpec::Str),
            Ok(TypeId::LOCAL_DATE) => Some(TypeSpec::Date),
            Ok(TypeId::TIMESTAMP) => Some(TypeSpec::Timestamp),
            Ok(TypeId::LIST) => Some(TypeSpec::list(TypeSpec::Dynamic)),
            Ok(TypeId::MAP) => Some(TypeSpec::map(TypeSpec::Dynamic, TypeSpec::Dynamic)),
            Ok(TypeId::STRUCT) | Err(_) => self
                .by_id(class_id)
                .map(|info| TypeSpec::Class(info.name.clone())),
        }
    }

    /// Builds the class definition a registered class travels as in
    /// COMPATIBLE mode. Fields are emitted in grouped slot order, so the
    /// receiver decodes in definition order with no re-sorting.
    pub fn class_def_of(
        &self,
        descriptor: &ClassDescriptor,
        slots: &[crate::descriptor::Slot],
    ) -> ClassDef {
        let fields = slots
            .iter()
            .map(|slot| {
                crate::meta::class_def::ClassDefField::new(
                    slot.declaring_class.clone(),
                    slot.name.clone(),
                    self.field_type_of_spec(&slot.spec),
                )
            })
            .collect();
        ClassDef::new(
            descriptor.name().to_string(),
            fields,
            descriptor.ext_meta().clone(),
        )
    }
}
