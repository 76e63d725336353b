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


use std::sync::Arc;

use proptest::prelude::*;
use stavro_core::buffer::{Reader, Writer};
use stavro_core::config::Config;
use stavro_core::Stavro;
use stavro_derive::AvroObject;

#[derive(AvroObject, Debug, Default, PartialEq)]
struct Hollow {
    #[avro(skip)]
    note: String,
}

fn writer() -> Writer {
    Writer::new(Arc::new(Config::default()))
}

#[test]
fn test_zigzag_varints() {
    let cases: [(i64, &[u8]); 7] = [
        (0, &[0x00]),
        (-1, &[0x01]),
        (1, &[0x02]),
        (-64, &[0x7f]),
        (64, &[0x80, 0x01]),
        (i64::MAX, &[0xfe, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]),
        (i64::MIN, &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]),
    ];
    let config = Config::default();
    for (value, expected) in cases {
        let mut w = writer();
        w.write_long(value);
        assert_eq!(w.as_slice(), expected, "{value}");
        let mut r = Reader::new(expected, &config);
        assert_eq!(r.read_long(), value);
        assert!(!r.has_error());
    }
}

#[test]
fn test_floats_are_little_endian() {
    let mut w = writer();
    w.write_float(1.0);
    w.write_double(1.0);
    assert_eq!(
        w.dump().unwrap(),
        vec![0x00, 0x00, 0x80, 0x3f, 0, 0, 0, 0, 0, 0, 0xf0, 0x3f]
    );
}

#[test]
fn test_varint_overflow() {
    let config = Config::default();
    let bytes = [0xff; 11];
    let mut r = Reader::new(&bytes, &config);
    r.read_long();
    assert!(r.error().unwrap().is_decode());
}

#[test]
fn test_errors_are_sticky() {
    let config = Config::default();
    let bytes = [0x02, 0x05];
    let mut r = Reader::new(&bytes, &config);
    assert!(!r.read_bool());
    assert!(r.has_error());
    // nothing is consumed once an error is recorded
    assert_eq!(r.read_long(), 0);
    assert_eq!(r.cursor(), 1);
    assert!(r.into_error().unwrap().to_string().contains("invalid boolean"));
}

#[test]
fn test_length_guard() {
    let config = Config::default().with_max_byte_slice_size(4);
    // a length of 5 followed by five bytes
    let bytes = [0x0a, 1, 2, 3, 4, 5];
    let mut r = Reader::new(&bytes, &config);
    r.read_bytes();
    assert!(r.error().unwrap().to_string().contains("exceeds the maximum"));

    let unlimited = Config::default().with_max_byte_slice_size(-1);
    let mut r = Reader::new(&bytes, &unlimited);
    assert_eq!(r.read_bytes(), &[1u8, 2, 3, 4, 5][..]);
}

#[test]
fn test_huge_length_prefix_is_rejected_before_allocation() {
    let stavro = Stavro::default();
    // zigzag(i64::MAX) as a string length
    let bytes = [0xfe, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01];
    let err = stavro.deserialize::<String>(&bytes).unwrap_err();
    assert!(err.is_decode());
    let err = stavro.deserialize::<Vec<u8>>(&bytes).unwrap_err();
    assert!(err.is_decode());
}

#[test]
fn test_item_count_of_zero_sized_items_is_bounded() {
    let stavro = Stavro::default();
    // one block claiming 20 million items that take no bytes
    let mut w = writer();
    w.write_long(20_000_000);
    w.write_block_end();
    let bytes = w.dump().unwrap();
    assert_eq!(bytes.len(), 5);
    let err = stavro.deserialize::<Vec<Hollow>>(&bytes).unwrap_err();
    assert!(err.is_decode());
    assert!(err.to_string().contains("exceeds the maximum"));
}

#[test]
fn test_item_limit_sums_blocks() {
    let stavro = Stavro::new(Config::default().with_max_slice_alloc_size(5)).unwrap();
    let mut w = writer();
    w.write_long(3);
    w.write_long(3);
    w.write_block_end();
    let err = stavro
        .deserialize::<Vec<Hollow>>(&w.dump().unwrap())
        .unwrap_err();
    assert!(err.is_decode());

    let mut w = writer();
    w.write_long(2);
    w.write_long(3);
    w.write_block_end();
    let items = stavro.deserialize::<Vec<Hollow>>(&w.dump().unwrap()).unwrap();
    assert_eq!(items.len(), 5);

    let mut w = writer();
    w.write_long(6);
    w.write_block_end();
    let err = stavro
        .deserialize::<std::collections::HashMap<String, Hollow>>(&w.dump().unwrap())
        .unwrap_err();
    assert!(err.is_decode());
}

#[test]
fn test_negative_item_limit_disables_guard() {
    let stavro = Stavro::new(Config::default().with_max_slice_alloc_size(-1)).unwrap();
    let mut w = writer();
    w.write_long(1_100_000);
    w.write_block_end();
    let items = stavro.deserialize::<Vec<Hollow>>(&w.dump().unwrap()).unwrap();
    assert_eq!(items.len(), 1_100_000);
}

#[test]
fn test_negative_length() {
    let config = Config::default();
    let bytes = [0x01];
    let mut r = Reader::new(&bytes, &config);
    r.read_bytes();
    assert!(r.error().unwrap().to_string().contains("negative length"));
}

#[test]
fn test_block_framing() {
    let config = Config::default();
    let mut w = writer();
    w.write_block(|w| {
        w.write_long(1);
        w.write_long(2);
        2
    });
    w.write_block(|_| 0);
    w.write_block_end();
    let bytes = w.dump().unwrap();
    assert_eq!(bytes, vec![0x03, 0x04, 0x02, 0x04, 0x00]);

    let mut r = Reader::new(&bytes, &config);
    assert_eq!(r.read_block_header(), (2, Some(2)));
    r.skip(2);
    assert_eq!(r.read_block_header(), (0, None));
}

#[test]
fn test_writer_reset() {
    let mut w = writer();
    w.write_string("abc");
    w.set_error(stavro_core::error::Error::encode_error("boom"));
    assert!(w.dump().is_err());
    w.reset();
    assert!(w.is_empty());
    assert!(!w.has_error());
    w.write_bool(true);
    assert_eq!(w.dump().unwrap(), vec![1]);
}

proptest! {
    #[test]
    fn prop_long_round_trip(value in any::<i64>()) {
        let mut w = writer();
        w.write_long(value);
        let bytes = w.dump().unwrap();
        prop_assert!(bytes.len() <= 10);
        let config = Config::default();
        let mut r = Reader::new(&bytes, &config);
        prop_assert_eq!(r.read_long(), value);
        prop_assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn prop_string_round_trip(value in ".*") {
        let stavro = Stavro::default();
        let bytes = stavro.marshal(&value).unwrap();
        let decoded: String = stavro.deserialize(&bytes).unwrap();
        prop_assert_eq!(decoded, value);
    }

    #[test]
    fn prop_corrupt_input_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let stavro = Stavro::default();
        let _ = stavro.deserialize::<Vec<String>>(&bytes);
        let _ = stavro.deserialize::<std::collections::HashMap<String, i64>>(&bytes);
    }
}
