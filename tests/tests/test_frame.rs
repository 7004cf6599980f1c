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

use weft::{obj_ref, Error, Value, Weft};

#[test]
fn test_null_root_is_one_byte() {
    let weft = Weft::default();
    let bytes = weft.serialize(&obj_ref(Value::Null)).unwrap();
    // is_null | is_little_endian
    assert_eq!(bytes, vec![0b11]);
    let back = weft.deserialize(&bytes).unwrap();
    assert!(back.borrow().is_null());
}

#[test]
fn test_head_sets_little_endian_bit() {
    let weft = Weft::default();
    let bytes = weft.serialize(&obj_ref(Value::Bool(true))).unwrap();
    assert_eq!(bytes[0], 0b10);
}

#[test]
fn test_big_endian_head_is_rejected() {
    let weft = Weft::default();
    let mut bytes = weft.serialize(&obj_ref(Value::Bool(true))).unwrap();
    bytes[0] &= !0b10;
    match weft.deserialize(&bytes) {
        Err(Error::UnsupportedByteOrder { offset, .. }) => assert_eq!(offset, 0),
        other => panic!("expected byte-order rejection, got {other:?}"),
    }
}

#[test]
fn test_out_of_band_head_is_rejected() {
    let weft = Weft::default();
    let mut bytes = weft.serialize(&obj_ref(Value::Bool(true))).unwrap();
    bytes[0] |= 0b1000;
    assert!(matches!(
        weft.deserialize(&bytes),
        Err(Error::UnsupportedOutOfBand { .. })
    ));
}

#[test]
fn test_cross_language_mode_must_match() {
    let writer = Weft::default().xlang(true);
    let reader = Weft::default();
    let bytes = writer.serialize(&obj_ref(Value::Int32(5))).unwrap();
    assert!(matches!(
        reader.deserialize(&bytes),
        Err(Error::UnsupportedCrossLanguageMode { .. })
    ));
}

#[test]
fn test_xlang_frame_carries_language_byte() {
    let weft = Weft::default().xlang(true);
    let bytes = weft.serialize(&obj_ref(Value::Int32(5))).unwrap();
    assert_eq!(bytes[0] & 0b100, 0b100);
    // language byte follows the head; Rust = 6
    assert_eq!(bytes[1], 6);
    let back = weft.deserialize(&bytes).unwrap();
    assert_eq!(*back.borrow(), Value::Int32(5));
}

#[test]
fn test_truncated_frame_fails() {
    let weft = Weft::default();
    let bytes = weft.serialize(&obj_ref(Value::Int64(-1))).unwrap();
    for cut in 1..bytes.len() {
        assert!(
            weft.deserialize(&bytes[..cut]).is_err(),
            "prefix of {cut} bytes should not decode"
        );
    }
}

#[test]
fn test_serialize_to_and_deserialize_from_chain() {
    let weft = Weft::default();
    let mut buf = Vec::new();
    let first = weft.serialize_to(&mut buf, &obj_ref(Value::Int32(1))).unwrap();
    let second = weft
        .serialize_to(&mut buf, &obj_ref(Value::from("two")))
        .unwrap();
    assert_eq!(buf.len(), first + second);

    let mut reader = weft::Reader::new(&buf);
    let a = weft.deserialize_from(&mut reader).unwrap();
    let b = weft.deserialize_from(&mut reader).unwrap();
    assert_eq!(*a.borrow(), Value::Int32(1));
    assert_eq!(*b.borrow(), Value::from("two"));
    assert_eq!(reader.remaining(), 0);
}
