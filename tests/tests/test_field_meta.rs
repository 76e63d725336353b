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

#[test]
fn test_rename() {
    #[derive(AvroObject, Debug, PartialEq)]
    struct Renamed {
        #[avro(rename = "userId")]
        user_id: i64,
        #[avro(rename = "")]
        plain: i32,
    }

    let stavro = Stavro::default();
    assert_eq!(
        stavro.schema_of::<Renamed>().unwrap(),
        r#"{"type":"record","name":"Renamed","namespace":"test_field_meta","fields":[{"name":"userId","type":"long"},{"name":"plain","type":"int"}]}"#
    );
    let value = Renamed {
        user_id: 5,
        plain: 6,
    };
    let bytes = stavro.marshal(&value).unwrap();
    assert_eq!(stavro.deserialize::<Renamed>(&bytes).unwrap(), value);
}

#[test]
fn test_dash_and_skip_leave_fields_out() {
    #[derive(AvroObject, Debug, PartialEq)]
    struct Session {
        id: i32,
        #[avro(rename = "-")]
        token: String,
        #[avro(skip)]
        cache: Vec<u8>,
    }

    let stavro = Stavro::default();
    let schema = stavro.schema_of::<Session>().unwrap();
    assert!(!schema.contains("token"));
    assert!(!schema.contains("cache"));

    let session = Session {
        id: 1,
        token: "secret".to_string(),
        cache: vec![1, 2, 3],
    };
    let bytes = stavro.marshal(&session).unwrap();
    assert_eq!(bytes, vec![2]);
    let decoded: Session = stavro.deserialize(&bytes).unwrap();
    assert_eq!(
        decoded,
        Session {
            id: 1,
            token: String::new(),
            cache: vec![],
        }
    );
}

#[test]
fn test_custom_tag_key() {
    #[derive(AvroObject, Debug, PartialEq)]
    struct Tagged {
        #[avro(avro = "a", rename = "ignored")]
        first: i32,
        #[avro(avro = "-")]
        second: i32,
    }

    let stavro = Config::new().with_tag_key("avro").freeze().unwrap();
    assert_eq!(
        stavro.schema_of::<Tagged>().unwrap(),
        r#"{"type":"record","name":"Tagged","namespace":"test_field_meta","fields":[{"name":"a","type":"int"}]}"#
    );

    let default_key = Stavro::default();
    assert!(default_key
        .schema_of::<Tagged>()
        .unwrap()
        .contains(r#"{"name":"ignored","type":"int"},{"name":"second","type":"int"}"#));
}

#[test]
fn test_raw_identifiers() {
    #[derive(AvroObject, Debug, PartialEq)]
    struct Keywords {
        r#type: String,
        r#match: bool,
    }

    let stavro = Stavro::default();
    let schema = stavro.schema_of::<Keywords>().unwrap();
    assert!(schema.contains(r#"{"name":"type","type":"string"}"#));
    assert!(schema.contains(r#"{"name":"match","type":"boolean"}"#));
    let value = Keywords {
        r#type: "t".to_string(),
        r#match: true,
    };
    let bytes = stavro.marshal(&value).unwrap();
    assert_eq!(stavro.deserialize::<Keywords>(&bytes).unwrap(), value);
}

#[derive(AvroObject, Debug, PartialEq, Default)]
pub struct Audit {
    created_by: String,
    version: i32,
}

#[derive(AvroObject, Debug, PartialEq)]
struct Document {
    title: String,
    #[avro(flatten)]
    audit: Audit,
    pages: i32,
}

#[test]
fn test_flatten_inlines_fields() {
    let stavro = Stavro::default();
    assert_eq!(
        stavro.schema_of::<Document>().unwrap(),
        r#"{"type":"record","name":"Document","namespace":"test_field_meta","fields":[{"name":"title","type":"string"},{"name":"created_by","type":"string"},{"name":"version","type":"int"},{"name":"pages","type":"int"}]}"#
    );
    let doc = Document {
        title: "t".to_string(),
        audit: Audit {
            created_by: "me".to_string(),
            version: 2,
        },
        pages: 10,
    };
    let bytes = stavro.marshal(&doc).unwrap();
    assert_eq!(bytes, vec![2, b't', 4, b'm', b'e', 4, 20]);
    assert_eq!(stavro.deserialize::<Document>(&bytes).unwrap(), doc);
}

#[test]
fn test_flatten_conflicts_with_own_field() {
    #[derive(AvroObject, Debug)]
    struct Conflict {
        version: i32,
        #[avro(flatten)]
        audit: Audit,
    }

    let stavro = Stavro::default();
    let err = stavro.schema_of::<Conflict>().unwrap_err();
    assert!(err.to_string().contains("tag name version is duplicated"));
}

#[test]
fn test_flatten_pointers() {
    #[derive(AvroObject, Debug)]
    struct Hidden {
        id: i32,
        #[avro(flatten)]
        audit: Option<Box<Audit>>,
    }

    #[derive(AvroObject, Debug)]
    struct Exposed {
        id: i32,
        #[avro(flatten)]
        pub audit: Option<Box<Audit>>,
    }

    let stavro = Stavro::default();
    assert_eq!(
        stavro.schema_of::<Hidden>().unwrap(),
        r#"{"type":"record","name":"Hidden","namespace":"test_field_meta","fields":[{"name":"id","type":"int"}]}"#
    );
    let bytes = stavro
        .marshal(&Hidden {
            id: 3,
            audit: Some(Box::default()),
        })
        .unwrap();
    assert_eq!(bytes, vec![6]);

    let err = stavro.schema_of::<Exposed>().unwrap_err();
    assert!(err.is_schema());
    assert!(err.to_string().contains("cannot be flattened"));
}

#[test]
fn test_private_fields_are_encoded() {
    mod inner {
        use stavro_derive::AvroObject;

        #[derive(AvroObject, Debug, PartialEq)]
        pub struct Secretive {
            pub id: i32,
            hidden: i32,
        }

        impl Secretive {
            pub fn new(id: i32, hidden: i32) -> Self {
                Secretive { id, hidden }
            }
        }
    }

    let stavro = Stavro::default();
    let value = inner::Secretive::new(1, 2);
    let bytes = stavro.marshal(&value).unwrap();
    assert_eq!(bytes, vec![2, 4]);
    assert_eq!(stavro.deserialize::<inner::Secretive>(&bytes).unwrap(), value);
}
