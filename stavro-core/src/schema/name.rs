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

use std::fmt;

/// Identity of a named schema (record or fixed).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Name {
    name: String,
    namespace: Option<String>,
    full: String,
}

impl Name {
    /// Parses a possibly qualified name; everything before the last `.` is the namespace.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.rsplit_once('.') {
            Some((namespace, local)) => Self::with_namespace(local, namespace),
            None => Self::with_namespace(name, ""),
        }
    }

    pub fn with_namespace(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        let name = name.into();
        let namespace = namespace.into();
        if namespace.is_empty() {
            Name {
                full: name.clone(),
                name,
                namespace: None,
            }
        } else {
            Name {
                full: format!("{namespace}.{name}"),
                name,
                namespace: Some(namespace),
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// `namespace.name`, or just the name when there is no namespace.
    pub fn full_name(&self) -> &str {
        &self.full
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}
