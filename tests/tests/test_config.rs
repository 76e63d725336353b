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


use stavro_core::config::Config;
use stavro_core::Stavro;
use stavro_derive::AvroObject;

#[derive(AvroObject, Debug, PartialEq)]
struct Batch {
    id: i32,
    values: Vec<i64>,
}

fn batch() -> Batch {
    Batch {
        id: 1,
        values: vec![1, 2],
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.tag_key(), "rename");
    assert_eq!(config.block_length(), 100);
    assert!(config.is_block_size_header());
    assert!(config.is_union_resolution_error());
    assert!(!config.is_partial_union_type_resolution());
    assert!(config.is_caching());
    assert_eq!(config.max_byte_slice_size(), Some(1024 * 1024));
    assert_eq!(config.max_slice_alloc_size(), Some(1024 * 1024));
}

#[test]
fn test_zero_values_fall_back_to_defaults() {
    let stavro = Config::new()
        .with_tag_key("")
        .with_block_length(0)
        .with_max_byte_slice_size(0)
        .with_max_slice_alloc_size(0)
        .freeze()
        .unwrap();
    assert_eq!(stavro.config().tag_key(), "rename");
    assert_eq!(stavro.config().block_length(), 100);
    assert_eq!(stavro.config().max_byte_slice_size(), Some(1024 * 1024));
    assert_eq!(stavro.config().max_slice_alloc_size(), Some(1024 * 1024));
}

#[test]
fn test_invalid_config() {
    let err = Config::new().with_tag_key("not a key").freeze().err().unwrap();
    assert!(err.is_config());
    let err = Config::new()
        .with_block_length(i32::MAX as usize + 1)
        .freeze()
        .err()
        .unwrap();
    assert!(err.is_config());
}

#[test]
fn test_block_size_header() {
    let with_header = Stavro::default();
    assert_eq!(
        with_header.marshal(&batch()).unwrap(),
        vec![0x02, 0x03, 0x04, 0x02, 0x04, 0x00]
    );

    let without = Config::new().with_block_size_header(false).freeze().unwrap();
    let bytes = without.marshal(&batch()).unwrap();
    assert_eq!(bytes, vec![0x02, 0x04, 0x02, 0x04, 0x00]);
    // readers accept both framings
    assert_eq!(with_header.deserialize::<Batch>(&bytes).unwrap(), batch());
}

#[test]
fn test_block_length() {
    let stavro = Config::new().with_block_length(1).freeze().unwrap();
    let bytes = stavro.marshal(&batch()).unwrap();
    assert_eq!(bytes, vec![0x02, 0x01, 0x02, 0x02, 0x01, 0x02, 0x04, 0x00]);
    assert_eq!(stavro.deserialize::<Batch>(&bytes).unwrap(), batch());

    let empty = Batch {
        id: 0,
        values: vec![],
    };
    assert_eq!(stavro.marshal(&empty).unwrap(), vec![0x00, 0x00]);
}

#[test]
fn test_disabled_caching_produces_identical_bytes() {
    let cached = Stavro::default();
    let uncached = Config::new().with_caching(false).freeze().unwrap();
    assert!(!uncached.config().is_caching());
    for _ in 0..3 {
        assert_eq!(
            cached.marshal(&batch()).unwrap(),
            uncached.marshal(&batch()).unwrap()
        );
    }
    let bytes = cached.marshal(&batch()).unwrap();
    assert_eq!(uncached.deserialize::<Batch>(&bytes).unwrap(), batch());

    // every call rebuilds its codecs
    let before = uncached.stats().codec_builds;
    uncached.marshal(&batch()).unwrap();
    assert!(uncached.stats().codec_builds > before);

    let before = cached.stats().codec_builds;
    cached.marshal(&batch()).unwrap();
    assert_eq!(cached.stats().codec_builds, before);
}
