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

use std::rc::Rc;
use std::sync::Arc;

use weft::descriptor::{ClassDescriptor, PrimKind, TypeSpec};
use weft::{obj_ref, Error, ObjRef, ObjectValue, Value, Weft};

fn animal_v1() -> Arc<ClassDescriptor> {
    ClassDescriptor::builder("demo.Animal")
        .field("a", TypeSpec::Prim(PrimKind::Int32))
        .field("b", TypeSpec::Str)
        .field("legacy", TypeSpec::list(TypeSpec::Prim(PrimKind::Int8)))
        .build()
}

fn animal_v2() -> Arc<ClassDescriptor> {
    ClassDescriptor::builder("demo.Animal")
        .field("b", TypeSpec::Str)
        .field("c", TypeSpec::Prim(PrimKind::Int64))
        .build()
}

fn animal_v1_value() -> ObjRef {
    obj_ref(Value::Object(ObjectValue::new(
        "demo.Animal",
        vec![
            obj_ref(Value::Int32(11)),
            obj_ref(Value::from("rex")),
            obj_ref(Value::List(vec![
                obj_ref(Value::Int8(1)),
                obj_ref(Value::Int8(2)),
            ])),
        ],
    )))
}

#[test]
fn test_schema_drift_maps_shared_fields_and_defaults_the_rest() {
    let mut writer = Weft::default().compatible(true);
    writer.register(animal_v1(), 999).unwrap();
    let mut reader = Weft::default().compatible(true);
    reader.register(animal_v2(), 999).unwrap();

    let bytes = writer.serialize(&animal_v1_value()).unwrap();
    let back = reader.deserialize(&bytes).unwrap();
    match &*back.borrow() {
        Value::Object(object) => {
            assert_eq!(object.class_name, "demo.Animal");
            assert_eq!(object.fields.len(), 2);
            // b preserved, a and legacy dropped, c defaulted
            assert_eq!(*object.fields[0].borrow(), Value::from("rex"));
            assert_eq!(*object.fields[1].borrow(), Value::Int64(0));
        }
        other => panic!("unexpected {other:?}"),
    };
}

#[test]
fn test_reordered_fields_round_trip() {
    let forward = ClassDescriptor::builder("demo.Pair")
        .field("left", TypeSpec::Str)
        .field("right", TypeSpec::Prim(PrimKind::Int32))
        .build();
    let reordered = ClassDescriptor::builder("demo.Pair")
        .field("right", TypeSpec::Prim(PrimKind::Int32))
        .field("left", TypeSpec::Str)
        .build();
    let mut writer = Weft::default().compatible(true);
    writer.register(forward, 500).unwrap();
    let mut reader = Weft::default().compatible(true);
    reader.register(reordered, 500).unwrap();

    let value = obj_ref(Value::Object(ObjectValue::new(
        "demo.Pair",
        vec![obj_ref(Value::from("L")), obj_ref(Value::Int32(9))],
    )));
    let bytes = writer.serialize(&value).unwrap();
    let back = reader.deserialize(&bytes).unwrap();
    match &*back.borrow() {
        Value::Object(object) => {
            assert_eq!(*object.fields[0].borrow(), Value::Int32(9));
            assert_eq!(*object.fields[1].borrow(), Value::from("L"));
        }
        other => panic!("unexpected {other:?}"),
    };
}

#[test]
fn test_identical_schemas_round_trip_in_compatible_mode() {
    let mut weft = Weft::default().compatible(true);
    weft.register(animal_v1(), 999).unwrap();
    let value = animal_v1_value();
    let bytes = weft.serialize(&value).unwrap();
    let back = weft.deserialize(&bytes).unwrap();
    assert_eq!(*back.borrow(), *value.borrow());
}

#[test]
fn test_changed_field_shape_is_incompatible() {
    let v1 = ClassDescriptor::builder("demo.Conf")
        .field("timeout", TypeSpec::Prim(PrimKind::Int32))
        .build();
    let v2 = ClassDescriptor::builder("demo.Conf")
        .field("timeout", TypeSpec::Str)
        .build();
    let mut writer = Weft::default().compatible(true);
    writer.register(v1, 700).unwrap();
    let mut reader = Weft::default().compatible(true);
    reader.register(v2, 700).unwrap();

    let value = obj_ref(Value::Object(ObjectValue::new(
        "demo.Conf",
        vec![obj_ref(Value::Int32(30))],
    )));
    let bytes = writer.serialize(&value).unwrap();
    assert!(matches!(
        reader.deserialize(&bytes),
        Err(Error::IncompatibleSchema(_))
    ));
}

#[test]
fn test_class_definition_crosses_the_wire_once_per_session() {
    let mut weft = Weft::default().compatible(true);
    weft.register(animal_v1(), 999).unwrap();
    let list = obj_ref(Value::List(vec![animal_v1_value(), animal_v1_value()]));
    let bytes = weft.serialize(&list).unwrap();

    // the definition blob carries the simple class name; two instances must
    // not ship it twice
    let needle = b"Animal";
    let count = bytes.windows(needle.len()).filter(|w| w == needle).count();
    assert_eq!(count, 1);

    let back = weft.deserialize(&bytes).unwrap();
    assert_eq!(*back.borrow(), *list.borrow());
}

#[test]
fn test_shared_meta_context_spans_calls() {
    let mut writer = Weft::default().compatible(true).share_meta_context(true);
    writer.register(animal_v1(), 999).unwrap();
    let first = writer.serialize(&animal_v1_value()).unwrap();
    let second = writer.serialize(&animal_v1_value()).unwrap();
    // the second call reuses the session index instead of resending the blob
    assert!(second.len() < first.len());

    let mut reader = Weft::default().compatible(true).share_meta_context(true);
    reader.register(animal_v1(), 999).unwrap();
    assert!(reader.deserialize(&first).is_ok());
    assert!(reader.deserialize(&second).is_ok());
}

#[test]
fn test_unknown_class_becomes_a_placeholder_and_re_emits() {
    let extra = ClassDescriptor::builder("demo.Extra")
        .field("tag", TypeSpec::Str)
        .field("count", TypeSpec::Prim(PrimKind::Int32))
        .build();
    let mut writer = Weft::default().compatible(true);
    writer.register_by_name(extra).unwrap();
    let value = obj_ref(Value::Object(ObjectValue::new(
        "demo.Extra",
        vec![obj_ref(Value::from("t")), obj_ref(Value::Int32(4))],
    )));
    let bytes = writer.serialize(&value).unwrap();

    // peer that has never heard of demo.Extra
    let relay = Weft::default()
        .compatible(true)
        .deserialize_unknown_class(true);
    let opaque = relay.deserialize(&bytes).unwrap();
    match &*opaque.borrow() {
        Value::Opaque(o) => assert_eq!(o.class_name, "demo.Extra"),
        other => panic!("expected a placeholder, got {other:?}"),
    }

    // the placeholder re-serializes into a stream the original peer decodes
    let relayed = relay.serialize(&opaque).unwrap();
    let back = writer.deserialize(&relayed).unwrap();
    assert_eq!(*back.borrow(), *value.borrow());
}

#[test]
fn test_unknown_class_without_the_flag_is_an_error() {
    let extra = ClassDescriptor::builder("demo.Extra")
        .field("tag", TypeSpec::Str)
        .build();
    let mut writer = Weft::default().compatible(true);
    writer.register_by_name(extra).unwrap();
    let value = obj_ref(Value::Object(ObjectValue::new(
        "demo.Extra",
        vec![obj_ref(Value::from("t"))],
    )));
    let bytes = writer.serialize(&value).unwrap();

    let reader = Weft::default().compatible(true);
    assert!(matches!(
        reader.deserialize(&bytes),
        Err(Error::UnknownClassName { .. })
    ));
}

#[test]
fn test_cycles_survive_compatible_mode() {
    let node = ClassDescriptor::builder("demo.Node")
        .field("next", TypeSpec::Dynamic)
        .build();
    let mut weft = Weft::default().compatible(true).track_ref(true);
    weft.register(node, 100).unwrap();

    let n = obj_ref(Value::Object(ObjectValue::new(
        "demo.Node",
        vec![obj_ref(Value::Null)],
    )));
    match &mut *n.borrow_mut() {
        Value::Object(object) => object.fields[0] = n.clone(),
        _ => unreachable!(),
    }
    let bytes = weft.serialize(&n).unwrap();
    let back = weft.deserialize(&bytes).unwrap();
    match &*back.borrow() {
        Value::Object(object) => assert!(Rc::ptr_eq(&object.fields[0], &back)),
        other => panic!("unexpected {other:?}"),
    };
}

#[test]
fn test_version_hash_is_suppressed_when_schemas_may_diverge() {
    // check_class_version is ignored in compatible mode: peers with
    // different layouts still interoperate
    let mut writer = Weft::default().compatible(true).check_class_version(true);
    writer.register(animal_v1(), 999).unwrap();
    let mut reader = Weft::default().compatible(true).check_class_version(true);
    reader.register(animal_v2(), 999).unwrap();
    let bytes = writer.serialize(&animal_v1_value()).unwrap();
    assert!(reader.deserialize(&bytes).is_ok());
}
