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


use stavro_core::Stavro;
use stavro_derive::AvroObject;

#[test]
fn test_vec_bytes() {
    let stavro = Stavro::default();
    assert_eq!(
        stavro.marshal(&vec![1i64, 2]).unwrap(),
        vec![0x03, 0x04, 0x02, 0x04, 0x00]
    );
    assert_eq!(stavro.marshal(&Vec::<i64>::new()).unwrap(), vec![0x00]);
    assert_eq!(stavro.schema_of::<Vec<i64>>().unwrap(), r#"{"type":"array","items":"long"}"#);
}

#[test]
fn test_byte_vec_is_bytes() {
    let stavro = Stavro::default();
    let bytes = stavro.marshal(&vec![0xdeu8, 0xad]).unwrap();
    assert_eq!(bytes, vec![0x04, 0xde, 0xad]);
    assert_eq!(stavro.deserialize::<Vec<u8>>(&bytes).unwrap(), vec![0xde, 0xad]);
}

#[test]
fn test_fixed_length_arrays() {
    let stavro = Stavro::default();
    let value = [1i32, 2, 3];
    let bytes = stavro.marshal(&value).unwrap();
    assert_eq!(bytes, vec![0x05, 0x06, 0x02, 0x04, 0x06, 0x00]);
    assert_eq!(stavro.deserialize::<[i32; 3]>(&bytes).unwrap(), value);

    // a short array leaves the tail at its default
    let short = stavro.marshal(&vec![9i32]).unwrap();
    assert_eq!(stavro.deserialize::<[i32; 3]>(&short).unwrap(), [9, 0, 0]);

    let long = stavro.marshal(&vec![1i32, 2, 3, 4]).unwrap();
    assert!(stavro.deserialize::<[i32; 3]>(&long).unwrap_err().is_decode());

    // byte arrays are still arrays, only Vec<u8> is bytes
    assert_eq!(stavro.schema_of::<[u8; 2]>().unwrap(), r#"{"type":"array","items":"int"}"#);
}

#[test]
fn test_nested_collections() {
    #[derive(AvroObject, Debug, PartialEq)]
    struct Cell {
        value: f64,
    }

    #[derive(AvroObject, Debug, PartialEq)]
    struct Grid {
        rows: Vec<Vec<Cell>>,
        names: Vec<Option<Box<Cell>>>,
    }

    let stavro = Stavro::default();
    let grid = Grid {
        rows: vec![
            vec![Cell { value: 1.0 }, Cell { value: 2.5 }],
            vec![],
            vec![Cell { value: -3.0 }],
        ],
        names: vec![None, Some(Box::new(Cell { value: 0.5 }))],
    };
    let bytes = stavro.marshal(&grid).unwrap();
    assert_eq!(stavro.deserialize::<Grid>(&bytes).unwrap(), grid);

    let schema = stavro.schema_of::<Grid>().unwrap();
    // Cell is defined inside rows and referenced by name afterwards
    assert!(schema.contains(r#"{"type":"array","items":["null","test_collection.Cell"]}"#));
}

#[test]
fn test_skipping_unknown_collections() {
    #[derive(AvroObject, Debug, PartialEq)]
    struct Wide {
        id: i32,
        tags: Vec<String>,
        scores: std::collections::HashMap<String, Vec<i64>>,
        tail: i32,
    }

    #[derive(AvroObject, Debug, PartialEq)]
    struct Narrow {
        id: i32,
        tail: i32,
    }

    let stavro = Stavro::default();
    let wide = Wide {
        id: 1,
        tags: vec!["a".to_string(), "b".to_string()],
        scores: [("x".to_string(), vec![1, 2, 3])].into_iter().collect(),
        tail: 7,
    };
    let bytes = stavro.marshal(&wide).unwrap();
    let schema = stavro.schema::<Wide>().unwrap();
    let mut narrow = Narrow { id: 0, tail: 0 };
    stavro.unmarshal_with(&schema, &bytes, &mut narrow).unwrap();
    assert_eq!(narrow, Narrow { id: 1, tail: 7 });
}
