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

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::error::Error;

const MAX_VARUINT32_BYTES: usize = 5;
const MAX_VARUINT64_BYTES: usize = 9;

/// Growable write-side byte window.
///
/// All multi-byte scalars are written little-endian. Growth is the amortized
/// doubling of the backing `Vec`; `reserve` can be used to pre-size before a
/// burst of writes.
#[derive(Default)]
pub struct Writer {
    bf: Vec<u8>,
    reserved: usize,
}

impl Writer {
    pub fn new() -> Writer {
        Writer::default()
    }

    pub fn dump(&self) -> Vec<u8> {
        self.bf.clone()
    }

    pub fn len(&self) -> usize {
        self.bf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bf.is_empty()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.reserved += additional;
        if self.bf.capacity() < self.reserved {
            self.bf.reserve(self.reserved);
        }
    }

    /// Resets the write cursor while keeping the allocation for reuse.
    pub fn reset(&mut self) {
        self.bf.clear();
        self.reserved = 0;
    }

    /// Appends `len` zero bytes and returns the offset of the first one, for
    /// later back-patching through `set_bytes`.
    pub fn skip(&mut self, len: usize) -> usize {
        let offset = self.bf.len();
        self.bf.resize(offset + len, 0);
        offset
    }

    /// Overwrites previously written bytes at `offset`. Used to patch length
    /// prefixes once the final size is known.
    pub fn set_bytes(&mut self, offset: usize, data: &[u8]) {
        self.bf[offset..offset + data.len()].copy_from_slice(data);
    }

    pub fn write_bytes(&mut self, v: &[u8]) {
        self.bf.extend_from_slice(v);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(value as u8);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.bf.write_u8(value).unwrap();
    }

    pub fn write_i8(&mut self, value: i8) {
        self.bf.write_i8(value).unwrap();
    }

    pub fn write_u16(&mut self, value: u16) {
        self.bf.write_u16::<LittleEndian>(value).unwrap();
    }

    pub fn write_i16(&mut self, value: i16) {
        self.bf.write_i16::<LittleEndian>(value).unwrap();
    }

    pub fn write_u32(&mut self, value: u32) {
        self.bf.write_u32::<LittleEndian>(value).unwrap();
    }

    pub fn write_i32(&mut self, value: i32) {
        self.bf.write_i32::<LittleEndian>(value).unwrap();
    }

    pub fn write_u64(&mut self, value: u64) {
        self.bf.write_u64::<LittleEndian>(value).unwrap();
    }

    pub fn write_i64(&mut self, value: i64) {
        self.bf.write_i64::<LittleEndian>(value).unwrap();
    }

    pub fn write_f32(&mut self, value: f32) {
        self.bf.write_f32::<LittleEndian>(value).unwrap();
    }

    pub fn write_f64(&mut self, value: f64) {
        self.bf.write_f64::<LittleEndian>(value).unwrap();
    }

    /// LEB128 with the continuation bit in the MSB, at most 5 bytes.
    pub fn write_varuint32(&mut self, value: u32) {
        let mut v = value;
        while v >= 0x80 {
            self.write_u8((v as u8 & 0x7F) | 0x80);
            v >>= 7;
        }
        self.write_u8(v as u8);
    }

    /// LEB128 with the continuation bit in the MSB, at most 9 bytes: the
    /// ninth byte carries the top eight value bits without a continuation bit.
    pub fn write_varuint64(&mut self, value: u64) {
        let mut v = value;
        let mut written = 0;
        while v >= 0x80 && written < MAX_VARUINT64_BYTES - 1 {
            self.write_u8((v as u8 & 0x7F) | 0x80);
            v >>= 7;
            written += 1;
        }
        self.write_u8(v as u8);
    }

    /// Zig-zag mapped `write_varuint32`.
    pub fn write_varint32(&mut self, value: i32) {
        let zigzag = ((value << 1) ^ (value >> 31)) as u32;
        self.write_varuint32(zigzag);
    }

    /// Zig-zag mapped `write_varuint64`.
    pub fn write_varint64(&mut self, value: i64) {
        let zigzag = ((value << 1) ^ (value >> 63)) as u64;
        self.write_varuint64(zigzag);
    }
}

/// Read-side window over a borrowed byte slice.
///
/// Every read is bounds-checked against the written region; reading past it
/// reports the cursor offset at which the shortfall was detected.
pub struct Reader<'bf> {
    bf: &'bf [u8],
    cursor: usize,
}

impl<'bf> Reader<'bf> {
    pub fn new(bf: &'bf [u8]) -> Reader<'bf> {
        Reader { bf, cursor: 0 }
    }

    #[inline(always)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
    }

    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.bf.len() - self.cursor
    }

    #[inline(always)]
    fn check(&self, len: usize) -> Result<(), Error> {
        if self.cursor + len > self.bf.len() {
            Err(Error::unexpected_end(self.cursor, len, self.bf.len()))
        } else {
            Ok(())
        }
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'bf [u8], Error> {
        self.check(len)?;
        let result = &self.bf[self.cursor..self.cursor + len];
        self.cursor += len;
        Ok(result)
    }

    pub fn read_bool(&mut self) -> Result<bool, Error> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        self.check(1)?;
        let result = self.bf[self.cursor];
        self.cursor += 1;
        Ok(result)
    }

    pub fn read_i8(&mut self) -> Result<i8, Error> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16, Error> {
        self.check(2)?;
        let result = LittleEndian::read_u16(&self.bf[self.cursor..]);
        self.cursor += 2;
        Ok(result)
    }

    pub fn read_i16(&mut self) -> Result<i16, Error> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32, Error> {
        self.check(4)?;
        let result = LittleEndian::read_u32(&self.bf[self.cursor..]);
        self.cursor += 4;
        Ok(result)
    }

    pub fn read_i32(&mut self) -> Result<i32, Error> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_u64(&mut self) -> Result<u64, Error> {
        self.check(8)?;
        let result = LittleEndian::read_u64(&self.bf[self.cursor..]);
        self.cursor += 8;
        Ok(result)
    }

    pub fn read_i64(&mut self) -> Result<i64, Error> {
        Ok(self.read_u64()? as i64)
    }

    pub fn read_f32(&mut self) -> Result<f32, Error> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_f64(&mut self) -> Result<f64, Error> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    pub fn read_varuint32(&mut self) -> Result<u32, Error> {
        let start = self.cursor;
        let mut result: u32 = 0;
        for i in 0..MAX_VARUINT32_BYTES {
            let b = self.read_u8()?;
            result |= ((b & 0x7F) as u32) << (7 * i);
            if b < 0x80 {
                return Ok(result);
            }
        }
        Err(Error::malformed_varint(start))
    }

    pub fn read_varuint64(&mut self) -> Result<u64, Error> {
        let mut result: u64 = 0;
        for i in 0..MAX_VARUINT64_BYTES - 1 {
            let b = self.read_u8()?;
            result |= ((b & 0x7F) as u64) << (7 * i);
            if b < 0x80 {
                return Ok(result);
            }
        }
        // ninth byte: all eight bits are data, no continuation
        let b = self.read_u8()?;
        result |= (b as u64) << 56;
        Ok(result)
    }

    pub fn read_varint32(&mut self) -> Result<i32, Error> {
        let encoded = self.read_varuint32()?;
        Ok(((encoded >> 1) as i32) ^ -((encoded & 1) as i32))
    }

    pub fn read_varint64(&mut self) -> Result<i64, Error> {
        let encoded = self.read_varuint64()?;
        Ok(((encoded >> 1) as i64) ^ -((encoded & 1) as i64))
    }

    pub fn skip(&mut self, len: usize) -> Result<(), Error> {
        self.check(len)?;
        self.cursor += len;
        Ok(())
    }

    pub fn slice_after_cursor(&self) -> &'bf [u8] {
        &self.bf[self.cursor..]
    }
}
