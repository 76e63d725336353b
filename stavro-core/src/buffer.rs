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

//! Byte-level Avro wire codecs.
//!
//! Both [`Writer`] and [`Reader`] keep a sticky first error: once an operation
//! fails every later call is a no-op, so a codec can run a whole sequence of
//! writes or reads and inspect the outcome once at the end.

use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::config::Config;
use crate::error::Error;

/// Longest zigzag varint for a 64-bit value.
const MAX_VARINT_LEN: usize = 10;

#[inline(always)]
fn zigzag_long(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

#[inline(always)]
fn unzigzag(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Writes the zigzag varint of `value` into `out`, returning the number of bytes used.
#[inline(always)]
fn put_long(value: i64, out: &mut [u8]) -> usize {
    let mut v = zigzag_long(value);
    let mut i = 0;
    while v >= 0x80 {
        out[i] = (v as u8) | 0x80;
        v >>= 7;
        i += 1;
    }
    out[i] = v as u8;
    i + 1
}

pub struct Writer {
    pub(crate) bf: Vec<u8>,
    config: Arc<Config>,
    error: Option<Error>,
}

impl Default for Writer {
    fn default() -> Self {
        Writer::new(Arc::new(Config::default()))
    }
}

impl Writer {
    pub fn new(config: Arc<Config>) -> Self {
        Writer {
            bf: Vec::new(),
            config,
            error: None,
        }
    }

    /// Drops accumulated bytes and the sticky error, keeping the allocation.
    pub fn reset(&mut self) {
        self.bf.clear();
        self.error = None;
    }

    #[inline(always)]
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.bf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bf
    }

    /// Copies the written bytes out, or returns the first error.
    pub fn dump(&self) -> Result<Vec<u8>, Error> {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(self.bf.clone()),
        }
    }

    #[inline(always)]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Records `err` unless an earlier error is already recorded.
    #[cold]
    pub fn set_error(&mut self, err: Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    #[inline(always)]
    pub fn write_null(&mut self) {}

    #[inline(always)]
    pub fn write_bool(&mut self, value: bool) {
        if self.error.is_none() {
            self.bf.push(value as u8);
        }
    }

    #[inline(always)]
    pub fn write_int(&mut self, value: i32) {
        self.write_long(value as i64)
    }

    #[inline(always)]
    pub fn write_long(&mut self, value: i64) {
        if self.error.is_some() {
            return;
        }
        let mut v = zigzag_long(value);
        while v >= 0x80 {
            self.bf.push((v as u8) | 0x80);
            v >>= 7;
        }
        self.bf.push(v as u8);
    }

    pub fn write_float(&mut self, value: f32) {
        if self.error.is_none() {
            // writing into a Vec cannot fail
            let _ = self.bf.write_f32::<LittleEndian>(value);
        }
    }

    pub fn write_double(&mut self, value: f64) {
        if self.error.is_none() {
            let _ = self.bf.write_f64::<LittleEndian>(value);
        }
    }

    /// Length-prefixed bytes.
    pub fn write_bytes(&mut self, value: &[u8]) {
        self.write_long(value.len() as i64);
        self.write_fixed(value);
    }

    pub fn write_string(&mut self, value: &str) {
        self.write_bytes(value.as_bytes())
    }

    /// Raw bytes with no length prefix.
    #[inline(always)]
    pub fn write_fixed(&mut self, value: &[u8]) {
        if self.error.is_none() {
            self.bf.extend_from_slice(value);
        }
    }

    #[inline(always)]
    pub fn write_union_index(&mut self, index: usize) {
        self.write_long(index as i64)
    }

    /// Writes a block header. With size headers enabled and a non-empty block
    /// the count is negated and followed by the block's byte size.
    pub fn write_block_header(&mut self, count: usize, size: usize) {
        if count > 0 && self.config.is_block_size_header() {
            self.write_long(-(count as i64));
            self.write_long(size as i64);
        } else {
            self.write_long(count as i64);
        }
    }

    /// Runs `items`, which writes a block's payload and returns its item count,
    /// then inserts the matching block header in front of the payload.
    /// A block with no items leaves nothing behind.
    pub fn write_block(&mut self, items: impl FnOnce(&mut Writer) -> usize) {
        if self.error.is_some() {
            return;
        }
        let start = self.bf.len();
        let count = items(self);
        if self.error.is_some() || count == 0 {
            self.bf.truncate(start);
            return;
        }
        let size = self.bf.len() - start;
        let mut header = [0u8; 2 * MAX_VARINT_LEN];
        let n = if self.config.is_block_size_header() {
            let n = put_long(-(count as i64), &mut header);
            n + put_long(size as i64, &mut header[n..])
        } else {
            put_long(count as i64, &mut header)
        };
        self.bf.splice(start..start, header[..n].iter().copied());
    }

    /// The zero-count block closing an array or map.
    #[inline(always)]
    pub fn write_block_end(&mut self) {
        self.write_long(0)
    }
}

pub struct Reader<'a> {
    bf: &'a [u8],
    cursor: usize,
    config: &'a Config,
    error: Option<Error>,
}

impl<'a> Reader<'a> {
    pub fn new(bf: &'a [u8], config: &'a Config) -> Reader<'a> {
        Reader {
            bf,
            cursor: 0,
            config,
            error: None,
        }
    }

    #[inline(always)]
    pub fn config(&self) -> &'a Config {
        self.config
    }

    #[inline(always)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.bf.len() - self.cursor
    }

    #[inline(always)]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn into_error(self) -> Option<Error> {
        self.error
    }

    /// Records `err` unless an earlier error is already recorded.
    #[cold]
    pub fn set_error(&mut self, err: Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    #[inline(always)]
    fn ensure(&mut self, len: usize) -> bool {
        if self.error.is_some() {
            return false;
        }
        if self.bf.len() - self.cursor < len {
            self.set_error(Error::buffer_out_of_bound(self.cursor, len, self.bf.len()));
            return false;
        }
        true
    }

    fn read_varuint64(&mut self) -> u64 {
        if self.error.is_some() {
            return 0;
        }
        let mut result = 0u64;
        let mut shift = 0u32;
        loop {
            let Some(&b) = self.bf.get(self.cursor) else {
                self.set_error(Error::buffer_out_of_bound(self.cursor, 1, self.bf.len()));
                return 0;
            };
            self.cursor += 1;
            if shift == 63 && b > 1 {
                self.set_error(Error::decode_error("varint overflows 64 bits"));
                return 0;
            }
            result |= ((b & 0x7f) as u64) << shift;
            if b & 0x80 == 0 {
                return result;
            }
            shift += 7;
        }
    }

    pub fn read_bool(&mut self) -> bool {
        if !self.ensure(1) {
            return false;
        }
        let b = self.bf[self.cursor];
        self.cursor += 1;
        match b {
            0 => false,
            1 => true,
            _ => {
                self.set_error(Error::decode_error(format!("invalid boolean byte {b}")));
                false
            }
        }
    }

    pub fn read_int(&mut self) -> i32 {
        let value = self.read_long();
        match i32::try_from(value) {
            Ok(v) => v,
            Err(_) => {
                self.set_error(Error::decode_error(format!("int value {value} out of range")));
                0
            }
        }
    }

    #[inline(always)]
    pub fn read_long(&mut self) -> i64 {
        unzigzag(self.read_varuint64())
    }

    pub fn read_float(&mut self) -> f32 {
        if !self.ensure(4) {
            return 0.0;
        }
        let v = LittleEndian::read_f32(&self.bf[self.cursor..]);
        self.cursor += 4;
        v
    }

    pub fn read_double(&mut self) -> f64 {
        if !self.ensure(8) {
            return 0.0;
        }
        let v = LittleEndian::read_f64(&self.bf[self.cursor..]);
        self.cursor += 8;
        v
    }

    /// Reads a length prefix and checks it against the configured maximum
    /// before anything is allocated.
    fn read_len(&mut self) -> Option<usize> {
        let len = self.read_long();
        if self.error.is_some() {
            return None;
        }
        if len < 0 {
            self.set_error(Error::decode_error(format!("negative length {len}")));
            return None;
        }
        if let Some(max) = self.config.max_byte_slice_size() {
            if len as u64 > max as u64 {
                self.set_error(Error::decode_error(format!(
                    "length {len} exceeds the maximum of {max} bytes"
                )));
                return None;
            }
        }
        Some(len as usize)
    }

    /// Checks the running item count of one collection against the
    /// configured limit.
    pub fn ensure_items(&mut self, total: usize) -> bool {
        if self.error.is_some() {
            return false;
        }
        if let Some(max) = self.config.max_slice_alloc_size() {
            if total > max {
                self.set_error(Error::decode_error(format!(
                    "collection of {total} items exceeds the maximum of {max}"
                )));
                return false;
            }
        }
        true
    }

    /// Length-prefixed bytes, borrowed from the input.
    pub fn read_bytes(&mut self) -> &'a [u8] {
        match self.read_len() {
            Some(len) => self.read_fixed(len),
            None => &[],
        }
    }

    pub fn read_string(&mut self) -> String {
        let bytes = self.read_bytes();
        match std::str::from_utf8(bytes) {
            Ok(s) => s.to_owned(),
            Err(e) => {
                self.set_error(Error::decode_error(format!("invalid utf-8 string: {e}")));
                String::new()
            }
        }
    }

    /// Exactly `len` raw bytes.
    pub fn read_fixed(&mut self, len: usize) -> &'a [u8] {
        if !self.ensure(len) {
            return &[];
        }
        let bf: &'a [u8] = self.bf;
        let v = &bf[self.cursor..self.cursor + len];
        self.cursor += len;
        v
    }

    pub fn skip(&mut self, len: usize) {
        if self.ensure(len) {
            self.cursor += len;
        }
    }

    /// Skips a length-prefixed value without copying it.
    pub fn skip_bytes(&mut self) {
        if let Some(len) = self.read_len() {
            self.skip(len);
        }
    }

    /// Reads an array or map block header, returning the item count and, when
    /// the writer supplied one, the block's byte size. A count of zero ends
    /// the collection.
    pub fn read_block_header(&mut self) -> (usize, Option<usize>) {
        let count = self.read_long();
        if self.error.is_some() {
            return (0, None);
        }
        if count >= 0 {
            return (count as usize, None);
        }
        let size = self.read_long();
        if count == i64::MIN || size < 0 {
            self.set_error(Error::decode_error(format!(
                "corrupt block framing: count {count}, size {size}"
            )));
            return (0, None);
        }
        (count.unsigned_abs() as usize, Some(size as usize))
    }

    pub fn read_union_index(&mut self) -> usize {
        let index = self.read_long();
        if index < 0 {
            self.set_error(Error::decode_error(format!("negative union index {index}")));
            return 0;
        }
        index as usize
    }
}
