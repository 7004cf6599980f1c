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
use std::sync::Arc;

use weft::descriptor::{ClassDescriptor, PrimKind, TypeSpec};
use weft::{obj_ref, ObjRef, ObjectValue, Value, Weft};

fn map_of(pairs: Vec<(Value, Value)>) -> ObjRef {
    obj_ref(Value::Map(
        pairs
            .into_iter()
            .map(|(k, v)| (obj_ref(k), obj_ref(v)))
            .collect(),
    ))
}

fn as_string_int_map(value: &Value) -> HashMap<String, i64> {
    match value {
        Value::Map(pairs) => pairs
            .iter()
            .map(|(k, v)| {
                let key = match &*k.borrow() {
                    Value::Str(s) => s.clone(),
                    other => panic!("non-string key {other:?}"),
                };
                let val = match &*v.borrow() {
                    Value::Int32(v) => *v as i64,
                    Value::Int64(v) => *v,
                    other => panic!("non-int value {other:?}"),
                };
                (key, val)
            })
            .collect(),
        other => panic!("not a map: {other:?}"),
    }
}

#[test]
fn test_dynamic_map_round_trips_as_unordered_map() {
    let weft = Weft::default().compress_number(true);
    let map = map_of(vec![
        (Value::from("a"), Value::Int32(1)),
        (Value::from("b"), Value::Int32(2)),
    ]);
    let bytes = weft.serialize(&map).unwrap();
    let back = weft.deserialize(&bytes).unwrap();
    match &*back.borrow() {
        value @ Value::Map(pairs) => {
            assert_eq!(pairs.len(), 2);
            let expected: HashMap<String, i64> =
                [("a".to_string(), 1), ("b".to_string(), 2)].into();
            assert_eq!(as_string_int_map(value), expected);
        }
        other => panic!("unexpected {other:?}"),
    };
}

#[test]
fn test_pair_order_is_iteration_order() {
    let weft = Weft::default();
    let map = map_of(vec![
        (Value::from("z"), Value::Int64(26)),
        (Value::from("a"), Value::Int64(1)),
    ]);
    let bytes = weft.serialize(&map).unwrap();
    let back = weft.deserialize(&bytes).unwrap();
    match &*back.borrow() {
        Value::Map(pairs) => {
            assert_eq!(*pairs[0].0.borrow(), Value::from("z"));
            assert_eq!(*pairs[1].0.borrow(), Value::from("a"));
        }
        other => panic!("unexpected {other:?}"),
    };
}

fn scores_class() -> Arc<ClassDescriptor> {
    ClassDescriptor::builder("demo.Scores")
        .field(
            "by_name",
            TypeSpec::map(TypeSpec::Str, TypeSpec::Prim(PrimKind::Int64)),
        )
        .build()
}

#[test]
fn test_final_final_fast_path_round_trip() {
    let mut weft = Weft::default();
    weft.register(scores_class(), 100).unwrap();
    let value = obj_ref(Value::Object(ObjectValue::new(
        "demo.Scores",
        vec![map_of(vec![
            (Value::from("alice"), Value::Int64(10)),
            (Value::from("bob"), Value::Int64(20)),
        ])],
    )));
    let bytes = weft.serialize(&value).unwrap();
    let back = weft.deserialize(&bytes).unwrap();
    assert_eq!(*back.borrow(), *value.borrow());
}

#[test]
fn test_final_poly_fast_path_round_trip() {
    let mut weft = Weft::default();
    let class = ClassDescriptor::builder("demo.Mixed")
        .field("attrs", TypeSpec::map(TypeSpec::Str, TypeSpec::Dynamic))
        .build();
    weft.register(class, 100).unwrap();
    let value = obj_ref(Value::Object(ObjectValue::new(
        "demo.Mixed",
        vec![map_of(vec![
            (Value::from("n"), Value::Int32(5)),
            (Value::from("s"), Value::from("five")),
            (Value::from("nothing"), Value::Null),
        ])],
    )));
    let bytes = weft.serialize(&value).unwrap();
    let back = weft.deserialize(&bytes).unwrap();
    assert_eq!(*back.borrow(), *value.borrow());
}

#[test]
fn test_poly_keys_round_trip() {
    let weft = Weft::default();
    let map = map_of(vec![
        (Value::Int32(1), Value::from("one")),
        (Value::from("two"), Value::Int32(2)),
    ]);
    let bytes = weft.serialize(&map).unwrap();
    let back = weft.deserialize(&bytes).unwrap();
    assert_eq!(*back.borrow(), *map.borrow());
}

#[test]
fn test_empty_map() {
    let weft = Weft::default();
    let map = map_of(vec![]);
    let bytes = weft.serialize(&map).unwrap();
    let back = weft.deserialize(&bytes).unwrap();
    assert_eq!(*back.borrow(), Value::Map(vec![]));
}

#[test]
fn test_map_inside_map() {
    let mut weft = Weft::default();
    let class = ClassDescriptor::builder("demo.Nested")
        .field(
            "outer",
            TypeSpec::map(
                TypeSpec::Str,
                TypeSpec::map(TypeSpec::Str, TypeSpec::Prim(PrimKind::Int32)),
            ),
        )
        .build();
    weft.register(class, 100).unwrap();
    let inner = map_of(vec![(Value::from("k"), Value::Int32(7))]);
    let value = obj_ref(Value::Object(ObjectValue::new(
        "demo.Nested",
        vec![obj_ref(Value::Map(vec![(obj_ref(Value::from("m")), inner)]))],
    )));
    let bytes = weft.serialize(&value).unwrap();
    let back = weft.deserialize(&bytes).unwrap();
    assert_eq!(*back.borrow(), *value.borrow());
}
