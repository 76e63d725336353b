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

use crate::ensure;
use crate::error::Error;
use crate::stavro::Stavro;

pub const DEFAULT_TAG_KEY: &str = "rename";
pub const DEFAULT_BLOCK_LENGTH: usize = 100;
pub const DEFAULT_MAX_BYTE_SLICE_SIZE: i64 = 1024 * 1024;
pub const DEFAULT_MAX_SLICE_ALLOC_SIZE: i64 = 1024 * 1024;

/// Construction-time options of a [`Stavro`] handle.
///
/// The same `Config` is shared by the handle, its writers and its readers so
/// that nested codecs agree on block framing and length limits.
#[derive(Clone, Debug)]
pub struct Config {
    /// Key inside `#[avro(...)]` whose string value renames a field.
    /// A value of exactly `-` skips the field.
    pub tag_key: String,
    /// Maximum number of items per array or map block. Zero means the default.
    pub block_length: usize,
    /// Write plain item counts instead of the negative count plus byte size header.
    pub disable_block_size_header: bool,
    /// Fail when a union branch cannot be resolved into the target type.
    /// When false, such branches are skipped and decode as `None`.
    pub union_resolution_error: bool,
    /// Accept unions where only some branches resolve into the target type.
    pub partial_union_type_resolution: bool,
    /// Rebuild codecs on every call instead of caching them.
    pub disable_caching: bool,
    /// Largest accepted length prefix for bytes and strings.
    /// Zero means the default, a negative value disables the check.
    pub max_byte_slice_size: i64,
    /// Largest item count accepted for one decoded array or map, summed over
    /// its blocks. Zero means the default, a negative value disables the check.
    pub max_slice_alloc_size: i64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tag_key: DEFAULT_TAG_KEY.to_string(),
            block_length: DEFAULT_BLOCK_LENGTH,
            disable_block_size_header: false,
            union_resolution_error: true,
            partial_union_type_resolution: false,
            disable_caching: false,
            max_byte_slice_size: DEFAULT_MAX_BYTE_SLICE_SIZE,
            max_slice_alloc_size: DEFAULT_MAX_SLICE_ALLOC_SIZE,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag_key(mut self, tag_key: impl Into<String>) -> Self {
        self.tag_key = tag_key.into();
        self
    }

    pub fn with_block_length(mut self, block_length: usize) -> Self {
        self.block_length = block_length;
        self
    }

    pub fn with_block_size_header(mut self, enabled: bool) -> Self {
        self.disable_block_size_header = !enabled;
        self
    }

    pub fn with_union_resolution_error(mut self, strict: bool) -> Self {
        self.union_resolution_error = strict;
        self
    }

    pub fn with_partial_union_type_resolution(mut self, partial: bool) -> Self {
        self.partial_union_type_resolution = partial;
        self
    }

    pub fn with_caching(mut self, enabled: bool) -> Self {
        self.disable_caching = !enabled;
        self
    }

    pub fn with_max_byte_slice_size(mut self, max: i64) -> Self {
        self.max_byte_slice_size = max;
        self
    }

    pub fn with_max_slice_alloc_size(mut self, max: i64) -> Self {
        self.max_slice_alloc_size = max;
        self
    }

    /// Validates the options and builds a handle from them.
    pub fn freeze(self) -> Result<Stavro, Error> {
        Stavro::new(self)
    }

    /// Fills zero values with defaults and rejects malformed options.
    pub(crate) fn normalized(mut self) -> Result<Self, Error> {
        if self.tag_key.is_empty() {
            self.tag_key = DEFAULT_TAG_KEY.to_string();
        }
        ensure!(
            is_identifier(&self.tag_key),
            Error::config_error(format!(
                "tag key {:?} is not a valid attribute identifier",
                self.tag_key
            ))
        );
        if self.block_length == 0 {
            self.block_length = DEFAULT_BLOCK_LENGTH;
        }
        ensure!(
            self.block_length <= i32::MAX as usize,
            Error::config_error(format!("block length {} is too large", self.block_length))
        );
        if self.max_byte_slice_size == 0 {
            self.max_byte_slice_size = DEFAULT_MAX_BYTE_SLICE_SIZE;
        }
        if self.max_slice_alloc_size == 0 {
            self.max_slice_alloc_size = DEFAULT_MAX_SLICE_ALLOC_SIZE;
        }
        Ok(self)
    }

    #[inline(always)]
    pub fn tag_key(&self) -> &str {
        &self.tag_key
    }

    #[inline(always)]
    pub fn block_length(&self) -> usize {
        self.block_length
    }

    #[inline(always)]
    pub fn is_block_size_header(&self) -> bool {
        !self.disable_block_size_header
    }

    #[inline(always)]
    pub fn is_union_resolution_error(&self) -> bool {
        self.union_resolution_error
    }

    #[inline(always)]
    pub fn is_partial_union_type_resolution(&self) -> bool {
        self.partial_union_type_resolution
    }

    #[inline(always)]
    pub fn is_caching(&self) -> bool {
        !self.disable_caching
    }

    /// The byte limit for length-prefixed values, `None` when unlimited.
    #[inline(always)]
    pub fn max_byte_slice_size(&self) -> Option<usize> {
        if self.max_byte_slice_size < 0 {
            None
        } else {
            Some(self.max_byte_slice_size as usize)
        }
    }

    /// The item limit for one decoded collection, `None` when unlimited.
    #[inline(always)]
    pub fn max_slice_alloc_size(&self) -> Option<usize> {
        usize::try_from(self.max_slice_alloc_size).ok()
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
