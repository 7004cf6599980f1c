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

use chrono::{NaiveDate, NaiveDateTime};
use weft::descriptor::{ClassDescriptor, TypeSpec};
use weft::{obj_ref, ObjectValue, Value, Weft};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn timestamp(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, min, s).unwrap()
}

#[test]
fn test_date_round_trip() {
    let weft = Weft::default();
    for d in [date(1970, 1, 1), date(2024, 2, 29), date(1969, 12, 31), date(1, 1, 1)] {
        let bytes = weft.serialize(&obj_ref(Value::Date(d))).unwrap();
        let back = weft.deserialize(&bytes).unwrap();
        assert_eq!(*back.borrow(), Value::Date(d));
    }
}

#[test]
fn test_timestamp_round_trip_microsecond_precision() {
    let weft = Weft::default();
    let ts = timestamp(2023, 7, 14, 9, 30, 15)
        .checked_add_signed(chrono::Duration::microseconds(123_456))
        .unwrap();
    let bytes = weft.serialize(&obj_ref(Value::Timestamp(ts))).unwrap();
    let back = weft.deserialize(&bytes).unwrap();
    assert_eq!(*back.borrow(), Value::Timestamp(ts));
}

#[test]
fn test_time_fields_in_structs() {
    let mut weft = Weft::default();
    let event = ClassDescriptor::builder("demo.Event")
        .field("day", TypeSpec::Date)
        .field("at", TypeSpec::Timestamp)
        .field("note", TypeSpec::Str)
        .build();
    weft.register(event, 100).unwrap();

    let value = obj_ref(Value::Object(ObjectValue::new(
        "demo.Event",
        vec![
            obj_ref(Value::Date(date(2022, 11, 5))),
            obj_ref(Value::Timestamp(timestamp(2022, 11, 5, 18, 0, 0))),
            obj_ref(Value::from("launch")),
        ],
    )));
    let bytes = weft.serialize(&value).unwrap();
    let back = weft.deserialize(&bytes).unwrap();
    assert_eq!(*back.borrow(), *value.borrow());
}

#[test]
fn test_time_values_excluded_from_tracking_by_default() {
    let weft = Weft::default().track_ref(true);
    let shared = obj_ref(Value::Date(date(2000, 1, 1)));
    let list = obj_ref(Value::List(vec![shared.clone(), shared]));
    let bytes = weft.serialize(&list).unwrap();
    let back = weft.deserialize(&bytes).unwrap();
    match &*back.borrow() {
        Value::List(items) => {
            assert!(!std::rc::Rc::ptr_eq(&items[0], &items[1]));
            assert_eq!(*items[0].borrow(), *items[1].borrow());
        }
        other => panic!("unexpected {other:?}"),
    };
}
