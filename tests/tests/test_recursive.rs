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

#[derive(AvroObject, Debug, PartialEq)]
struct Node {
    value: String,
    next: Option<Box<Node>>,
}

fn chain(values: &[&str]) -> Option<Box<Node>> {
    let mut head = None;
    for value in values.iter().rev() {
        head = Some(Box::new(Node {
            value: value.to_string(),
            next: head,
        }));
    }
    head
}

#[test]
fn test_linked_list_schema() {
    let stavro = Stavro::default();
    assert_eq!(
        stavro.schema_of::<Node>().unwrap(),
        r#"{"type":"record","name":"Node","namespace":"test_recursive","fields":[{"name":"value","type":"string"},{"name":"next","type":["null","test_recursive.Node"],"default":null}]}"#
    );
}

#[test]
fn test_linked_list_round_trip() {
    let stavro = Stavro::default();
    for values in [&["a"][..], &["a", "b", "c"][..]] {
        let node = *chain(values).unwrap();
        let bytes = stavro.marshal(&node).unwrap();
        let result: Node = stavro.deserialize(&bytes).unwrap();
        assert_eq!(node, result);
    }
}

#[test]
fn test_linked_list_bytes() {
    let stavro = Stavro::default();
    let single = Node {
        value: "a".to_string(),
        next: None,
    };
    assert_eq!(stavro.marshal(&single).unwrap(), vec![2, b'a', 0]);

    let pair = *chain(&["a", "b"]).unwrap();
    assert_eq!(
        stavro.marshal(&pair).unwrap(),
        vec![2, b'a', 2, 2, b'b', 0]
    );
}

#[test]
fn test_optional_head() {
    let stavro = Stavro::default();
    let empty: Option<Box<Node>> = None;
    let bytes = stavro.marshal(&empty).unwrap();
    assert_eq!(bytes, vec![0]);
    let result: Option<Box<Node>> = stavro.deserialize(&bytes).unwrap();
    assert_eq!(result, None);

    let head = chain(&["x", "y"]);
    let bytes = stavro.marshal(&head).unwrap();
    let result: Option<Box<Node>> = stavro.deserialize(&bytes).unwrap();
    assert_eq!(result, head);
}

#[derive(AvroObject, Debug, PartialEq)]
struct Tree {
    label: String,
    children: Vec<Tree>,
}

#[test]
fn test_recursion_through_a_collection() {
    let stavro = Stavro::default();
    let tree = Tree {
        label: "root".to_string(),
        children: vec![
            Tree {
                label: "left".to_string(),
                children: vec![],
            },
            Tree {
                label: "right".to_string(),
                children: vec![Tree {
                    label: "leaf".to_string(),
                    children: vec![],
                }],
            },
        ],
    };
    let schema = stavro.schema_of::<Tree>().unwrap();
    assert!(schema.contains(r#"{"type":"array","items":"test_recursive.Tree"}"#));
    let bytes = stavro.marshal(&tree).unwrap();
    let result: Tree = stavro.deserialize(&bytes).unwrap();
    assert_eq!(tree, result);
}

#[derive(AvroObject, Debug, PartialEq)]
struct Foo {
    bar: Option<Box<Bar>>,
}

#[derive(AvroObject, Debug, PartialEq)]
struct Bar {
    name: String,
    foo: Option<Box<Foo>>,
}

#[test]
fn test_mutual_recursion() {
    let stavro = Stavro::default();
    let bar = Bar {
        name: "outer".to_string(),
        foo: Some(Box::new(Foo {
            bar: Some(Box::new(Bar {
                name: "inner".to_string(),
                foo: None,
            })),
        })),
    };
    let schema = stavro.schema_of::<Bar>().unwrap();
    assert!(schema.contains(r#"["null","test_recursive.Bar"]"#));
    let bytes = stavro.marshal(&bar).unwrap();
    let result: Bar = stavro.deserialize(&bytes).unwrap();
    assert_eq!(bar, result);

    // Foo was derived as part of Bar's graph, it still gets a schema of its own
    let foo_schema = stavro.schema_of::<Foo>().unwrap();
    assert!(foo_schema.starts_with(r#"{"type":"record","name":"Foo""#));
}

#[derive(AvroObject, Debug)]
struct Direct {
    inner: Box<Direct>,
}

#[test]
fn test_direct_self_reference_is_rejected() {
    let stavro = Stavro::default();
    let err = stavro.schema_of::<Direct>().unwrap_err();
    assert!(err.is_schema());
    assert!(err.to_string().contains("must be behind a pointer"));

    // the schema error surfaces before any default value is built
    for bytes in [&[][..], &[0x02, 0x00][..]] {
        let err = stavro.deserialize::<Direct>(bytes).unwrap_err();
        assert!(err.is_schema());
    }
    let err = stavro::deserialize::<Direct>(&[]).unwrap_err();
    assert!(err.is_schema());
}

#[test]
fn test_codecs_are_built_once_per_type() {
    let stavro = Stavro::default();
    let node = *chain(&["a", "b"]).unwrap();
    stavro.marshal(&node).unwrap();
    let after_first = stavro.stats();
    stavro.marshal(&node).unwrap();
    assert_eq!(stavro.stats(), after_first);
    assert_eq!(after_first.schema_derivations, 1);
}
