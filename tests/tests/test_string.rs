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

fn string_round_trip(weft: &Weft, s: &str) -> Vec<u8> {
    let bytes = weft.serialize(&obj_ref(Value::from(s))).unwrap();
    let back = weft.deserialize(&bytes).unwrap();
    assert_eq!(*back.borrow(), Value::from(s), "round trip of {s:?}");
    bytes
}

// body starts after head, ref flag and class ref
const BODY: usize = 3;

#[test]
fn test_utf16_is_the_uncompressed_default() {
    let weft = Weft::default();
    let bytes = string_round_trip(&weft, "hello");
    assert_eq!(bytes[BODY], 1); // UTF-16LE discriminator
    assert_eq!(bytes[BODY + 1], 10); // byte length
    assert_eq!(bytes[BODY + 2], b'h');
    assert_eq!(bytes[BODY + 3], 0);
}

#[test]
fn test_latin1_short_path_with_compression() {
    let weft = Weft::default().compress_string(true);
    let bytes = string_round_trip(&weft, "héllo");
    assert_eq!(bytes[BODY], 0); // LATIN1 discriminator
    assert_eq!(bytes[BODY + 1], 5);
    assert_eq!(bytes[BODY + 2], b'h');
    assert_eq!(bytes[BODY + 3], 0xE9); // é
}

#[test]
fn test_utf8_fallback_with_compression() {
    let weft = Weft::default().compress_string(true);
    let s = "καλημέρα";
    let bytes = string_round_trip(&weft, s);
    assert_eq!(bytes[BODY], 2); // UTF-8 discriminator
    assert_eq!(bytes[BODY + 1] as usize, s.len());
}

#[test]
fn test_empty_string() {
    for weft in [Weft::default(), Weft::default().compress_string(true)] {
        let bytes = string_round_trip(&weft, "");
        assert_eq!(bytes[BODY + 1], 0);
    }
}

#[test]
fn test_supplementary_plane_round_trips_in_all_encodings() {
    let s = "𝕨eft \u{1F980} 編む";
    string_round_trip(&Weft::default(), s);
    string_round_trip(&Weft::default().compress_string(true), s);
}

#[test]
fn test_unknown_encoding_discriminator_is_rejected() {
    let weft = Weft::default();
    let mut bytes = weft.serialize(&obj_ref(Value::from("abc"))).unwrap();
    bytes[BODY] = 9;
    match weft.deserialize(&bytes) {
        Err(Error::InvalidStringEncoding { encoding, offset }) => {
            assert_eq!(encoding, 9);
            assert_eq!(offset, BODY);
        }
        other => panic!("expected encoding rejection, got {other:?}"),
    }
}

#[test]
fn test_all_three_encodings_decode_the_same_string() {
    // readers must accept every encoding a writer may choose
    let utf16 = Weft::default();
    let latin = Weft::default().compress_string(true);
    let s = "weft";
    let a = utf16.serialize(&obj_ref(Value::from(s))).unwrap();
    let b = latin.serialize(&obj_ref(Value::from(s))).unwrap();
    assert_ne!(a, b);
    assert_eq!(*latin.deserialize(&a).unwrap().borrow(), Value::from(s));
    assert_eq!(*utf16.deserialize(&b).unwrap().borrow(), Value::from(s));
}
