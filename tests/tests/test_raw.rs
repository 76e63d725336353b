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


use stavro_core::error::Error;
use stavro_core::schema::Schema;
use stavro_core::serializer::{AvroMarshaler, AvroUnmarshaler, RawMessage};
use stavro_core::Stavro;
use stavro_derive::AvroObject;

/// Written as `major.minor` text.
#[derive(AvroObject, Debug, Default, PartialEq)]
#[avro(raw)]
struct Version {
    major: u32,
    minor: u32,
}

impl AvroMarshaler for Version {
    fn marshal_avro(&self) -> Result<Vec<u8>, Error> {
        Ok(format!("{}.{}", self.major, self.minor).into_bytes())
    }
}

impl AvroUnmarshaler for Version {
    fn unmarshal_avro(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let text = std::str::from_utf8(bytes).map_err(|e| Error::decode_error(e.to_string()))?;
        let (major, minor) = text
            .split_once('.')
            .ok_or_else(|| Error::decode_error(format!("bad version {text}")))?;
        self.major = major
            .parse()
            .map_err(|_| Error::decode_error(format!("bad major {major}")))?;
        self.minor = minor
            .parse()
            .map_err(|_| Error::decode_error(format!("bad minor {minor}")))?;
        Ok(())
    }
}

#[derive(AvroObject, Debug, PartialEq)]
struct Package {
    name: String,
    version: Version,
    previous: Option<Version>,
}

#[test]
fn test_raw_schema() {
    let stavro = Stavro::default();
    assert_eq!(
        stavro.schema_of::<Version>().unwrap(),
        r#"{"type":"bytes","logicalType":"raw"}"#
    );
    let schema = stavro.schema_of::<Package>().unwrap();
    assert!(schema.contains(r#"{"name":"version","type":{"type":"bytes","logicalType":"raw"}}"#));
    assert!(schema.contains(r#"["null",{"type":"bytes","logicalType":"raw"}]"#));
}

#[test]
fn test_raw_hooks_own_the_bytes() {
    let stavro = Stavro::default();
    let version = Version { major: 1, minor: 2 };
    assert_eq!(stavro.marshal(&version).unwrap(), vec![6, b'1', b'.', b'2']);

    let package = Package {
        name: "stavro".to_string(),
        version,
        previous: Some(Version { major: 0, minor: 9 }),
    };
    let bytes = stavro.marshal(&package).unwrap();
    let result: Package = stavro.deserialize(&bytes).unwrap();
    assert_eq!(package, result);
}

#[test]
fn test_raw_hook_errors_propagate() {
    let stavro = Stavro::default();
    // a length-prefixed "x"
    let err = stavro.deserialize::<Version>(&[2, b'x']).unwrap_err();
    assert!(err.is_decode());
    assert!(err.to_string().contains("bad version x"));
}

#[test]
fn test_raw_message_passes_bytes_through() {
    let stavro = Stavro::default();
    let inner = stavro.marshal(&vec![1i64, 2, 3]).unwrap();
    let raw = RawMessage(inner.clone());
    let bytes = stavro.marshal(&raw).unwrap();
    assert_eq!(bytes[0] as usize, inner.len() * 2);
    assert_eq!(&bytes[1..], inner.as_slice());

    let decoded: RawMessage = stavro.deserialize(&bytes).unwrap();
    assert_eq!(decoded, raw);
    let values: Vec<i64> = stavro.deserialize(&decoded.0).unwrap();
    assert_eq!(values, vec![1, 2, 3]);
}

#[test]
fn test_raw_against_plain_bytes() {
    let stavro = Stavro::default();
    let bytes_schema = stavro.schema::<Vec<u8>>().unwrap();
    let encoded = stavro
        .marshal_with(&bytes_schema, &Version { major: 3, minor: 4 })
        .unwrap();
    let mut version = Version::default();
    stavro
        .unmarshal_with(&bytes_schema, &encoded, &mut version)
        .unwrap();
    assert_eq!(version, Version { major: 3, minor: 4 });
}

#[test]
fn test_plain_bytes_codec_is_not_reused_for_raw() {
    let stavro = Stavro::default();
    let payload = vec![1u8, 2, 3];
    assert_eq!(stavro.marshal(&payload).unwrap(), vec![6, 1, 2, 3]);

    let err = stavro.marshal_with(&Schema::Raw, &payload).unwrap_err();
    assert!(err.is_build());
    let mut decoded: Vec<u8> = Vec::new();
    let err = stavro
        .unmarshal_with(&Schema::Raw, &[6, 1, 2, 3], &mut decoded)
        .unwrap_err();
    assert!(err.is_build());

    // raw types still take either schema
    let raw = RawMessage(payload.clone());
    assert_eq!(stavro.marshal_with(&Schema::Raw, &raw).unwrap(), vec![6, 1, 2, 3]);
}
