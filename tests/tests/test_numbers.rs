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

use weft::{obj_ref, Value, Weft};

fn round_trip(weft: &Weft, value: Value) -> Value {
    let bytes = weft.serialize(&obj_ref(value)).unwrap();
    let back = weft.deserialize(&bytes).unwrap();
    let out = back.borrow().clone_scalar();
    out
}

trait CloneScalar {
    fn clone_scalar(&self) -> Value;
}

impl CloneScalar for Value {
    fn clone_scalar(&self) -> Value {
        match self {
            Value::Bool(v) => Value::Bool(*v),
            Value::Int8(v) => Value::Int8(*v),
            Value::Int16(v) => Value::Int16(*v),
            Value::Int32(v) => Value::Int32(*v),
            Value::Int64(v) => Value::Int64(*v),
            Value::Float32(v) => Value::Float32(*v),
            Value::Float64(v) => Value::Float64(*v),
            other => panic!("not a scalar: {other:?}"),
        }
    }
}

#[test]
fn test_scalar_round_trips() {
    let weft = Weft::default();
    assert_eq!(round_trip(&weft, Value::Bool(true)), Value::Bool(true));
    assert_eq!(round_trip(&weft, Value::Int8(-100)), Value::Int8(-100));
    assert_eq!(round_trip(&weft, Value::Int16(1234)), Value::Int16(1234));
    assert_eq!(
        round_trip(&weft, Value::Int32(i32::MIN)),
        Value::Int32(i32::MIN)
    );
    assert_eq!(
        round_trip(&weft, Value::Int64(i64::MAX)),
        Value::Int64(i64::MAX)
    );
    assert_eq!(
        round_trip(&weft, Value::Float32(-3.25)),
        Value::Float32(-3.25)
    );
    assert_eq!(
        round_trip(&weft, Value::Float64(6.25e300)),
        Value::Float64(6.25e300)
    );
}

#[test]
fn test_nan_payload_survives() {
    let weft = Weft::default();
    let payload = f64::from_bits(0x7FF8_0000_0000_BEEF);
    match round_trip(&weft, Value::Float64(payload)) {
        Value::Float64(out) => assert_eq!(out.to_bits(), 0x7FF8_0000_0000_BEEF),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_compressed_i32_frame_layout() {
    let weft = Weft::default().compress_number(true);
    let bytes = weft.serialize(&obj_ref(Value::Int32(0x1234_5678))).unwrap();
    // head, ref flag, class ref, then a five-byte zig-zag varint
    assert_eq!(bytes[0], 0b10);
    assert_eq!(bytes[1] as i8, -1);
    assert_eq!(bytes[2], (4 << 1) | 1);
    assert_eq!(bytes.len(), 3 + 5);
    assert_eq!(bytes[3], 0xF0); // low seven bits of zigzag(0x12345678), continued

    let back = weft.deserialize(&bytes).unwrap();
    assert_eq!(*back.borrow(), Value::Int32(305_419_896));
}

#[test]
fn test_small_compressed_numbers_shrink() {
    let plain = Weft::default();
    let compressed = Weft::default().compress_number(true);
    let value = obj_ref(Value::Int64(7));
    assert!(compressed.serialize(&value).unwrap().len() < plain.serialize(&value).unwrap().len());
}

#[test]
fn test_uncompressed_numbers_are_fixed_width() {
    let weft = Weft::default();
    let bytes = weft.serialize(&obj_ref(Value::Int64(-2))).unwrap();
    // head + flag + class ref + eight raw bytes
    assert_eq!(bytes.len(), 3 + 8);
    assert_eq!(&bytes[3..], &(-2i64).to_le_bytes()[..]);
}
