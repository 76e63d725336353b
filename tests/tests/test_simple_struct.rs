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
fn test_one_field_primitive() {
    #[derive(AvroObject, Debug, PartialEq)]
    struct Data {
        value: i32,
    }

    let stavro = Stavro::default();
    let data = Data { value: 42 };
    let bytes = stavro.marshal(&data).unwrap();
    assert_eq!(bytes, vec![84]);
    let result: Data = stavro.deserialize(&bytes).unwrap();
    assert_eq!(data, result);
}

#[test]
fn test_one_field_string() {
    #[derive(AvroObject, Debug, PartialEq)]
    struct Data {
        name: String,
    }

    let stavro = Stavro::default();
    let data = Data {
        name: String::from("foo"),
    };
    let bytes = stavro.marshal(&data).unwrap();
    assert_eq!(bytes, vec![6, b'f', b'o', b'o']);
    let result: Data = stavro.deserialize(&bytes).unwrap();
    assert_eq!(data, result);
}

#[test]
fn test_fields_in_declaration_order() {
    #[derive(AvroObject, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    let stavro = Stavro::default();
    assert_eq!(
        stavro.schema_of::<Point>().unwrap(),
        r#"{"type":"record","name":"Point","namespace":"test_simple_struct","fields":[{"name":"x","type":"int"},{"name":"y","type":"int"}]}"#
    );
    let bytes = stavro.marshal(&Point { x: 1, y: -1 }).unwrap();
    assert_eq!(bytes, vec![2, 1]);
}

#[test]
fn test_every_primitive() {
    #[derive(AvroObject, Debug, PartialEq)]
    struct Primitives {
        flag: bool,
        tiny: i8,
        small: i16,
        int: i32,
        long: i64,
        size: isize,
        byte: u8,
        short: u16,
        word: u32,
        float: f32,
        double: f64,
        text: String,
        blob: Vec<u8>,
    }

    let stavro = Stavro::default();
    let data = Primitives {
        flag: true,
        tiny: -8,
        small: -300,
        int: i32::MIN,
        long: i64::MAX,
        size: -1,
        byte: 255,
        short: u16::MAX,
        word: u32::MAX,
        float: 1.5,
        double: -0.25,
        text: "héllo".to_string(),
        blob: vec![0, 1, 2, 255],
    };
    let bytes = stavro.marshal(&data).unwrap();
    let result: Primitives = stavro.deserialize(&bytes).unwrap();
    assert_eq!(data, result);

    let schema = stavro.schema_of::<Primitives>().unwrap();
    assert!(schema.contains(r#"{"name":"word","type":"long"}"#));
    assert!(schema.contains(r#"{"name":"byte","type":"int"}"#));
    assert!(schema.contains(r#"{"name":"float","type":"float"}"#));
    assert!(schema.contains(r#"{"name":"blob","type":"bytes"}"#));
}

#[test]
fn test_nested_struct() {
    #[derive(AvroObject, Debug, PartialEq)]
    struct Address {
        city: String,
        zip: i32,
    }

    #[derive(AvroObject, Debug, PartialEq)]
    struct Person {
        name: String,
        home: Address,
        tags: Vec<String>,
    }

    let stavro = Stavro::default();
    let person = Person {
        name: "ann".to_string(),
        home: Address {
            city: "oslo".to_string(),
            zip: 150,
        },
        tags: vec!["a".to_string(), "b".to_string()],
    };
    let bytes = stavro.marshal(&person).unwrap();
    let result: Person = stavro.deserialize(&bytes).unwrap();
    assert_eq!(person, result);

    let doc: serde_json::Value = serde_json::from_str(&stavro.schema_of::<Person>().unwrap()).unwrap();
    assert_eq!(doc["fields"][1]["type"]["name"], "Address");
    assert_eq!(doc["fields"][1]["type"]["namespace"], "test_simple_struct");
    assert_eq!(doc["fields"][2]["type"]["items"], "string");
}

#[test]
fn test_unmarshal_into_existing_value() {
    #[derive(AvroObject, Debug, PartialEq)]
    struct Counter {
        hits: i64,
        labels: Vec<String>,
    }

    let stavro = Stavro::default();
    let bytes = stavro
        .marshal(&Counter {
            hits: 7,
            labels: vec!["x".to_string()],
        })
        .unwrap();
    let mut counter = Counter {
        hits: 1,
        labels: vec!["old".to_string(), "older".to_string()],
    };
    stavro.unmarshal(&bytes, &mut counter).unwrap();
    assert_eq!(counter.hits, 7);
    assert_eq!(counter.labels, vec!["x".to_string()]);
}

#[test]
fn test_empty_input_leaves_value_untouched() {
    #[derive(AvroObject, Debug, PartialEq)]
    struct Data {
        value: i32,
    }

    let stavro = Stavro::default();
    let mut data = Data { value: 9 };
    stavro.unmarshal(&[], &mut data).unwrap();
    assert_eq!(data.value, 9);
}

#[test]
fn test_truncated_input_is_an_error() {
    #[derive(AvroObject, Debug, PartialEq)]
    struct Data {
        name: String,
        value: i64,
    }

    let stavro = Stavro::default();
    let bytes = stavro
        .marshal(&Data {
            name: "abcdef".to_string(),
            value: 1 << 40,
        })
        .unwrap();
    let err = stavro
        .deserialize::<Data>(&bytes[..bytes.len() - 2])
        .unwrap_err();
    assert!(err.is_decode());
}

#[test]
fn test_trailing_bytes_are_ignored() {
    let stavro = Stavro::default();
    let value: i32 = stavro.deserialize(&[4, 0xff, 0xff]).unwrap();
    assert_eq!(value, 2);
}

#[test]
fn test_facade_functions() {
    #[derive(stavro::AvroObject, Debug, PartialEq)]
    struct Facade {
        id: i64,
        name: String,
    }

    stavro::register::<Facade>();
    let value = Facade {
        id: 3,
        name: "x".to_string(),
    };
    let bytes = stavro::must_marshal(&value);
    assert_eq!(bytes, stavro::marshal(&value).unwrap());
    let mut decoded = Facade {
        id: 0,
        name: String::new(),
    };
    stavro::must_unmarshal(&bytes, &mut decoded);
    assert_eq!(decoded, value);
    assert_eq!(stavro::deserialize::<Facade>(&bytes).unwrap(), value);
    assert!(stavro::schema_of::<Facade>()
        .unwrap()
        .starts_with(r#"{"type":"record","name":"Facade""#));
}

#[test]
#[should_panic]
fn test_must_marshal_panics_on_schema_error() {
    let stavro = Stavro::default();
    stavro.must_marshal(&1i128);
}
