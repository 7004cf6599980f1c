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

//! Type descriptors supplied by the host's Type Provider.
//!
//! The engine is purely interpretive: it never inspects host types itself.
//! A [`ClassDescriptor`] is the complete statement of a class's layout, and
//! the [`DescriptorGrouper`] derives from it the fixed slot order both peers
//! walk, which is what lets schema-consistent mode write no per-field tags.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::types::{compute_field_hash, compute_string_hash, TypeId};

/// Scalar kinds usable in primitive and boxed slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
}

impl PrimKind {
    /// Fixed encoded width, the primary sort key of the primitive groups.
    pub fn byte_width(self) -> usize {
        match self {
            PrimKind::Bool | PrimKind::Int8 => 1,
            PrimKind::Int16 => 2,
            PrimKind::Int32 | PrimKind::Float32 => 4,
            PrimKind::Int64 | PrimKind::Float64 => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimKind::Bool => "bool",
            PrimKind::Int8 => "i8",
            PrimKind::Int16 => "i16",
            PrimKind::Int32 => "i32",
            PrimKind::Int64 => "i64",
            PrimKind::Float32 => "f32",
            PrimKind::Float64 => "f64",
        }
    }

    pub fn type_id(self) -> TypeId {
        match self {
            PrimKind::Bool => TypeId::BOOL,
            PrimKind::Int8 => TypeId::INT8,
            PrimKind::Int16 => TypeId::INT16,
            PrimKind::Int32 => TypeId::INT32,
            PrimKind::Int64 => TypeId::INT64,
            PrimKind::Float32 => TypeId::FLOAT32,
            PrimKind::Float64 => TypeId::FLOAT64,
        }
    }

    pub fn nullable_type_id(self) -> TypeId {
        match self {
            PrimKind::Bool => TypeId::NULLABLE_BOOL,
            PrimKind::Int8 => TypeId::NULLABLE_INT8,
            PrimKind::Int16 => TypeId::NULLABLE_INT16,
            PrimKind::Int32 => TypeId::NULLABLE_INT32,
            PrimKind::Int64 => TypeId::NULLABLE_INT64,
            PrimKind::Float32 => TypeId::NULLABLE_FLOAT32,
            PrimKind::Float64 => TypeId::NULLABLE_FLOAT64,
        }
    }
}

/// Declared static type of a field slot. Nested generics recurse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeSpec {
    /// Non-nullable scalar.
    Prim(PrimKind),
    /// Nullable (boxed) scalar.
    Nullable(PrimKind),
    Str,
    Date,
    Timestamp,
    /// A registered class by qualified name.
    Class(String),
    /// A polymorphic slot: any value, runtime-typed on the wire.
    Dynamic,
    List(Box<TypeSpec>),
    Map(Box<TypeSpec>, Box<TypeSpec>),
}

impl TypeSpec {
    pub fn list(elem: TypeSpec) -> TypeSpec {
        TypeSpec::List(Box::new(elem))
    }

    pub fn map(key: TypeSpec, value: TypeSpec) -> TypeSpec {
        TypeSpec::Map(Box::new(key), Box::new(value))
    }

    pub fn class<S: Into<String>>(name: S) -> TypeSpec {
        TypeSpec::Class(name.into())
    }

    /// Stable declared-type name, the secondary sort key of the reference
    /// groups.
    pub fn type_name(&self) -> String {
        match self {
            TypeSpec::Prim(k) => k.name().to_string(),
            TypeSpec::Nullable(k) => format!("Option<{}>", k.name()),
            TypeSpec::Str => "String".to_string(),
            TypeSpec::Date => "NaiveDate".to_string(),
            TypeSpec::Timestamp => "NaiveDateTime".to_string(),
            TypeSpec::Class(name) => name.clone(),
            TypeSpec::Dynamic => "any".to_string(),
            TypeSpec::List(elem) => format!("Vec<{}>", elem.type_name()),
            TypeSpec::Map(k, v) => format!("HashMap<{}, {}>", k.type_name(), v.type_name()),
        }
    }

    /// Tag folded into the class-version hash.
    pub fn version_tag(&self) -> u32 {
        match self {
            TypeSpec::Prim(k) => k.type_id() as u32,
            TypeSpec::Nullable(k) => k.nullable_type_id() as u32,
            TypeSpec::Str => TypeId::STRING as u32,
            TypeSpec::Date => TypeId::LOCAL_DATE as u32,
            TypeSpec::Timestamp => TypeId::TIMESTAMP as u32,
            TypeSpec::Class(_) | TypeSpec::Dynamic => TypeId::STRUCT as u32,
            TypeSpec::List(_) => TypeId::LIST as u32,
            TypeSpec::Map(_, _) => TypeId::MAP as u32,
        }
    }
}

/// One field of a class, tagged with the class that declared it so shadowed
/// names stay unambiguous when inherited layouts are flattened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub declaring_class: String,
    pub name: String,
    pub spec: TypeSpec,
}

/// Complete layout of a class as stated by the host's Type Provider.
#[derive(Clone, Debug)]
pub struct ClassDescriptor {
    name: String,
    fields: Vec<FieldDescriptor>,
    monomorphic: bool,
    ext_meta: BTreeMap<String, String>,
}

impl ClassDescriptor {
    pub fn builder<S: Into<String>>(name: S) -> ClassDescriptorBuilder {
        ClassDescriptorBuilder {
            name: name.into(),
            fields: Vec::new(),
            monomorphic: true,
            ext_meta: BTreeMap::new(),
        }
    }

    /// Qualified class name, `package.Simple`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declared order, inherited fields flattened in.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Whether no subtype of this class can appear at runtime.
    pub fn is_monomorphic(&self) -> bool {
        self.monomorphic
    }

    pub fn ext_meta(&self) -> &BTreeMap<String, String> {
        &self.ext_meta
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Splits the qualified name into `(package, simple_name)`.
    pub fn split_name(&self) -> (&str, &str) {
        split_qualified(&self.name)
    }
}

pub fn split_qualified(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) => (&name[..pos], &name[pos + 1..]),
        None => ("", name),
    }
}

pub fn join_qualified(package: &str, simple: &str) -> String {
    if package.is_empty() {
        simple.to_string()
    } else {
        format!("{package}.{simple}")
    }
}

pub struct ClassDescriptorBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
    monomorphic: bool,
    ext_meta: BTreeMap<String, String>,
}

impl ClassDescriptorBuilder {
    /// Adds a field declared by the class itself.
    pub fn field<S: Into<String>>(mut self, name: S, spec: TypeSpec) -> Self {
        let declaring_class = self.name.clone();
        self.fields.push(FieldDescriptor {
            declaring_class,
            name: name.into(),
            spec,
        });
        self
    }

    /// Adds a field inherited from `declaring_class`.
    pub fn inherited_field<D: Into<String>, S: Into<String>>(
        mut self,
        declaring_class: D,
        name: S,
        spec: TypeSpec,
    ) -> Self {
        self.fields.push(FieldDescriptor {
            declaring_class: declaring_class.into(),
            name: name.into(),
            spec,
        });
        self
    }

    /// Marks the class as extensible at runtime.
    pub fn polymorphic(mut self) -> Self {
        self.monomorphic = false;
        self
    }

    pub fn meta<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.ext_meta.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Arc<ClassDescriptor> {
        Arc::new(ClassDescriptor {
            name: self.name,
            fields: self.fields,
            monomorphic: self.monomorphic,
            ext_meta: self.ext_meta,
        })
    }
}

/// The six slot groups, written and read strictly in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SlotGroup {
    Primitive,
    Boxed,
    FinalRef,
    OtherRef,
    Collection,
    Map,
}

/// One grouped field slot. `declared_index` points back into the declared
/// field order of the descriptor (and of `ObjectValue::fields`).
#[derive(Clone, Debug)]
pub struct Slot {
    pub declared_index: usize,
    pub name: String,
    pub declaring_class: String,
    pub spec: TypeSpec,
    pub group: SlotGroup,
}

/// Orders a class's fields into the six groups with a total order, so both
/// peers reconstruct the same slot sequence from the same descriptor.
#[derive(Debug, Default)]
pub struct DescriptorGrouper {
    slots: Vec<Slot>,
}

impl DescriptorGrouper {
    /// Groups `fields`; `is_monomorphic` classifies a class name as final.
    pub fn group(fields: &[FieldDescriptor], is_monomorphic: &dyn Fn(&str) -> bool) -> Self {
        let mut slots: Vec<Slot> = fields
            .iter()
            .enumerate()
            .map(|(declared_index, f)| Slot {
                declared_index,
                name: f.name.clone(),
                declaring_class: f.declaring_class.clone(),
                spec: f.spec.clone(),
                group: group_of(&f.spec, is_monomorphic),
            })
            .collect();
        slots.sort_by(compare_slots);
        DescriptorGrouper { slots }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// 32-bit layout hash used by schema-consistent peers to detect drift
    /// early. Folds every slot's type tag and name in slot order.
    pub fn version_hash(&self) -> u32 {
        let mut hash = 17u32;
        for slot in &self.slots {
            hash = compute_field_hash(hash, slot.spec.version_tag());
            hash = compute_field_hash(hash, compute_string_hash(&slot.name));
        }
        hash
    }
}

fn group_of(spec: &TypeSpec, is_monomorphic: &dyn Fn(&str) -> bool) -> SlotGroup {
    match spec {
        TypeSpec::Prim(_) => SlotGroup::Primitive,
        TypeSpec::Nullable(_) => SlotGroup::Boxed,
        TypeSpec::Str | TypeSpec::Date | TypeSpec::Timestamp => SlotGroup::FinalRef,
        TypeSpec::Class(name) => {
            if is_monomorphic(name) {
                SlotGroup::FinalRef
            } else {
                SlotGroup::OtherRef
            }
        }
        TypeSpec::Dynamic => SlotGroup::OtherRef,
        TypeSpec::List(_) => SlotGroup::Collection,
        TypeSpec::Map(_, _) => SlotGroup::Map,
    }
}

// Primitive groups: width descending, then name; reference groups: declared
// type name, then name. Declaring class is the final tiebreaker so shadowed
// fields from flattened hierarchies still order strictly.
fn compare_slots(a: &Slot, b: &Slot) -> Ordering {
    a.group.cmp(&b.group).then_with(|| {
        let by_kind = match (&a.spec, &b.spec) {
            (TypeSpec::Prim(ka), TypeSpec::Prim(kb))
            | (TypeSpec::Nullable(ka), TypeSpec::Nullable(kb)) => kb
                .byte_width()
                .cmp(&ka.byte_width())
                .then_with(|| ka.name().cmp(kb.name())),
            _ => a.spec.type_name().cmp(&b.spec.type_name()),
        };
        by_kind
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.declaring_class.cmp(&b.declaring_class))
    })
}
