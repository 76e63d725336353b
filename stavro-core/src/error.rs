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

//! Error type shared by every stage of the engine.
//!
//! Constructors are marked `#[cold]` so the happy path of the buffer and codec
//! code stays compact. Build errors must be cloneable because a single failed
//! build is handed to every caller that was waiting on it.

use std::borrow::Cow;

use thiserror::Error;

/// Set `STAVRO_PANIC_ON_ERROR=1` at compile time to panic where an error is created.
pub const PANIC_ON_ERROR: bool = option_env!("STAVRO_PANIC_ON_ERROR").is_some();

#[inline(always)]
pub const fn should_panic_on_error() -> bool {
    PANIC_ON_ERROR
}

/// Error type for schema derivation, codec construction, encoding and decoding.
///
/// Always build errors through the static constructor functions
/// ([`Error::schema_error`], [`Error::build_error`], ...) rather than the
/// variants, so that `STAVRO_PANIC_ON_ERROR` can point at the origin.
///
/// ```rust
/// use stavro_core::error::Error;
///
/// let err = Error::schema_error("key of map must be string");
/// assert!(err.is_schema());
/// ```
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// A type cannot be described by a schema.
    #[error("schema error: {0}")]
    Schema(Cow<'static, str>),

    /// A codec could not be constructed for `target`.
    #[error("build codec for {target} failed: {source}")]
    Build {
        target: Cow<'static, str>,
        #[source]
        source: Box<Error>,
    },

    /// Encoding failed, including failures reported by custom hooks.
    #[error("encode error: {0}")]
    Encode(Cow<'static, str>),

    /// Input could not be decoded.
    #[error("decode error: {0}")]
    Decode(Cow<'static, str>),

    /// Input ended before a value was complete.
    #[error("unexpected end of input: {0} + {1} > {2}")]
    BufferOutOfBound(usize, usize, usize),

    /// Invalid construction options.
    #[error("config error: {0}")]
    Config(Cow<'static, str>),
}

impl Error {
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn schema_error<S: Into<Cow<'static, str>>>(s: S) -> Self {
        Self::checked(Error::Schema(s.into()))
    }

    /// Wraps `source` as the reason a codec for `target` could not be built.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn build_error<S: Into<Cow<'static, str>>>(target: S, source: Error) -> Self {
        Self::checked(Error::Build {
            target: target.into(),
            source: Box::new(source),
        })
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn encode_error<S: Into<Cow<'static, str>>>(s: S) -> Self {
        Self::checked(Error::Encode(s.into()))
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn decode_error<S: Into<Cow<'static, str>>>(s: S) -> Self {
        Self::checked(Error::Decode(s.into()))
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn buffer_out_of_bound(offset: usize, length: usize, capacity: usize) -> Self {
        Self::checked(Error::BufferOutOfBound(offset, length, capacity))
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn config_error<S: Into<Cow<'static, str>>>(s: S) -> Self {
        Self::checked(Error::Config(s.into()))
    }

    #[inline(always)]
    #[track_caller]
    fn checked(err: Error) -> Self {
        if PANIC_ON_ERROR {
            panic!("STAVRO_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// True for schema errors, including those wrapped by a build error.
    pub fn is_schema(&self) -> bool {
        match self {
            Error::Schema(_) => true,
            Error::Build { source, .. } => source.is_schema(),
            _ => false,
        }
    }

    pub fn is_build(&self) -> bool {
        matches!(self, Error::Build { .. })
    }

    /// True for every decode-side failure: corrupt input, truncated input, length guard.
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode(_) | Error::BufferOutOfBound(..))
    }

    pub fn is_encode(&self) -> bool {
        matches!(self, Error::Encode(_))
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// The input was empty when the first read happened.
    pub(crate) fn is_empty_input(&self) -> bool {
        matches!(self, Error::BufferOutOfBound(0, _, 0))
    }
}

/// Returns early with `$err` unless `$cond` holds.
///
/// ```rust
/// use stavro_core::ensure;
/// use stavro_core::error::Error;
///
/// fn check(size: usize) -> Result<(), Error> {
///     ensure!(size > 0, Error::config_error("fixed size must be positive"));
///     Ok(())
/// }
/// assert!(check(0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}

/// Returns early with a schema error built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::error::Error::schema_error(format!($($arg)*)))
    };
}
