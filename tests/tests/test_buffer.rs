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

use weft_core::buffer::{Reader, Writer};
use weft_core::error::Error;

#[test]
fn test_varuint32_boundary_lengths() {
    // (value, encoded length)
    let table: Vec<(u32, usize)> = vec![
        (0, 1),
        (1, 1),
        (127, 1),
        (128, 2),
        (16_383, 2),
        (16_384, 3),
        (2_097_151, 3),
        (2_097_152, 4),
        (268_435_455, 4),
        (268_435_456, 5),
        (u32::MAX, 5),
    ];
    for &(value, expected_len) in &table {
        let mut writer = Writer::default();
        writer.write_varuint32(value);
        let bytes = writer.dump();
        assert_eq!(bytes.len(), expected_len, "length for {value}");
        let mut reader = Reader::new(&bytes);
        assert_eq!(reader.read_varuint32().unwrap(), value);
        assert_eq!(reader.remaining(), 0);
    }
}

#[test]
fn test_varuint64_boundary_lengths() {
    let table: Vec<(u64, usize)> = vec![
        (0, 1),
        (127, 1),
        (128, 2),
        (1 << 14, 3),
        ((1 << 21) - 1, 3),
        (1 << 21, 4),
        ((1 << 28) - 1, 4),
        (1 << 28, 5),
        ((1 << 35) - 1, 5),
        (1 << 35, 6),
        (1 << 42, 7),
        (1 << 49, 8),
        (1 << 56, 9),
        (u64::MAX, 9),
    ];
    for &(value, expected_len) in &table {
        let mut writer = Writer::default();
        writer.write_varuint64(value);
        let bytes = writer.dump();
        assert_eq!(bytes.len(), expected_len, "length for {value}");
        let mut reader = Reader::new(&bytes);
        assert_eq!(reader.read_varuint64().unwrap(), value);
    }
}

#[test]
fn test_varint_zigzag_round_trip() {
    let values: Vec<i32> = vec![0, -1, 1, -64, 64, i32::MIN, i32::MAX];
    for &value in &values {
        let mut writer = Writer::default();
        writer.write_varint32(value);
        let bytes = writer.dump();
        let mut reader = Reader::new(&bytes);
        assert_eq!(reader.read_varint32().unwrap(), value);
    }
    let values64: Vec<i64> = vec![0, -1, 1, i64::MIN, i64::MAX, -(1 << 40)];
    for &value in &values64 {
        let mut writer = Writer::default();
        writer.write_varint64(value);
        let bytes = writer.dump();
        let mut reader = Reader::new(&bytes);
        assert_eq!(reader.read_varint64().unwrap(), value);
    }
}

#[test]
fn test_small_magnitudes_stay_short() {
    for value in [-1i32, 1, -63, 63] {
        let mut writer = Writer::default();
        writer.write_varint32(value);
        assert_eq!(writer.len(), 1, "zig-zag should keep {value} in one byte");
    }
}

#[test]
fn test_fixed_scalars_bit_identical() {
    let f32_bits: Vec<u32> = vec![
        0,
        f32::NAN.to_bits(),
        0x7FC0_0001, // NaN with payload
        f32::INFINITY.to_bits(),
        (-0.0f32).to_bits(),
        1.5f32.to_bits(),
    ];
    for &bits in &f32_bits {
        let mut writer = Writer::default();
        writer.write_f32(f32::from_bits(bits));
        let bytes = writer.dump();
        let mut reader = Reader::new(&bytes);
        assert_eq!(reader.read_f32().unwrap().to_bits(), bits);
    }
    let f64_bits: Vec<u64> = vec![
        0,
        f64::NAN.to_bits(),
        0x7FF8_0000_0000_BEEF, // NaN with payload
        (-0.0f64).to_bits(),
        std::f64::consts::PI.to_bits(),
    ];
    for &bits in &f64_bits {
        let mut writer = Writer::default();
        writer.write_f64(f64::from_bits(bits));
        let bytes = writer.dump();
        let mut reader = Reader::new(&bytes);
        assert_eq!(reader.read_f64().unwrap().to_bits(), bits);
    }
}

#[test]
fn test_read_past_end_reports_offset() {
    let bytes = [1u8, 2, 3];
    let mut reader = Reader::new(&bytes);
    reader.skip(2).unwrap();
    match reader.read_u32() {
        Err(Error::UnexpectedEndOfBuffer {
            offset,
            needed,
            limit,
        }) => {
            assert_eq!(offset, 2);
            assert_eq!(needed, 4);
            assert_eq!(limit, 3);
        }
        other => panic!("expected end-of-buffer error, got {other:?}"),
    }
}

#[test]
fn test_malformed_varint_reports_offset() {
    let bytes = [0x00, 0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
    let mut reader = Reader::new(&bytes);
    reader.read_u8().unwrap();
    match reader.read_varuint32() {
        Err(Error::MalformedVarint { offset }) => assert_eq!(offset, 1),
        other => panic!("expected malformed-varint error, got {other:?}"),
    }
}
