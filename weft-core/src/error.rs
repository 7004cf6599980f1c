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

use std::borrow::Cow;

use thiserror::Error;

/// Error type for Weft serialization and deserialization operations.
///
/// Errors are never recovered or retried inside the engine; they propagate to
/// the caller, who owns the buffer. Every decode-side variant carries the
/// buffer offset at which it was raised to support diagnosis.
///
/// Prefer the static constructor functions over building variants directly:
/// they keep construction uniform and accept anything convertible into a
/// `Cow<'static, str>`.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The frame head did not have the little-endian bit set.
    #[error("unsupported byte order in frame head 0x{head:02x} at offset {offset}")]
    UnsupportedByteOrder { head: u8, offset: usize },

    /// The frame head had the reserved out-of-band bit set.
    #[error("unsupported out-of-band flag in frame head 0x{head:02x} at offset {offset}")]
    UnsupportedOutOfBand { head: u8, offset: usize },

    /// The frame's cross-language bit does not match this instance's mode.
    #[error("cross-language mode mismatch in frame head 0x{head:02x} at offset {offset}")]
    UnsupportedCrossLanguageMode { head: u8, offset: usize },

    /// A read ran past the written region of the buffer.
    #[error("unexpected end of buffer: {offset} + {needed} > {limit}")]
    UnexpectedEndOfBuffer {
        offset: usize,
        needed: usize,
        limit: usize,
    },

    /// A varint continuation chain exceeded its maximum length.
    #[error("malformed varint at offset {offset}")]
    MalformedVarint { offset: usize },

    /// A string payload carried an unknown encoding discriminator.
    #[error("invalid string encoding {encoding} at offset {offset}")]
    InvalidStringEncoding { encoding: u8, offset: usize },

    /// A reference flag byte was outside the defined range.
    #[error("invalid reference flag {flag} at offset {offset}")]
    InvalidRefFlag { flag: i8, offset: usize },

    /// A class id on the wire has no registration at this peer.
    #[error("class id {class_id} is not registered (offset {offset})")]
    ClassNotRegistered { class_id: u32, offset: usize },

    /// A class name on the wire has no registration at this peer.
    #[error("unknown class name `{name}` (offset {offset})")]
    UnknownClassName { name: String, offset: usize },

    /// Schema-consistent mode saw differing class-version hashes.
    #[error("class version mismatch for `{class}`: local {local:#010x}, remote {remote:#010x} (offset {offset})")]
    ClassVersionMismatch {
        class: String,
        local: u32,
        remote: u32,
        offset: usize,
    },

    /// A received class definition cannot be mapped without type loss.
    #[error("{0}")]
    IncompatibleSchema(Cow<'static, str>),

    /// Secure mode refused a type.
    #[error("{0}")]
    InsecureType(Cow<'static, str>),

    /// An instance of a class could not be constructed.
    #[error("{0}")]
    ConstructionFailure(Cow<'static, str>),

    /// The generics stack or dynamic nesting bound was exceeded.
    #[error("{0}")]
    DepthExceeded(Cow<'static, str>),

    /// Corrupted or inconsistent input data.
    #[error("{0}")]
    InvalidData(Cow<'static, str>),
}

impl Error {
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unexpected_end(offset: usize, needed: usize, limit: usize) -> Self {
        Error::UnexpectedEndOfBuffer {
            offset,
            needed,
            limit,
        }
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn malformed_varint(offset: usize) -> Self {
        Error::MalformedVarint { offset }
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn invalid_string_encoding(encoding: u8, offset: usize) -> Self {
        Error::InvalidStringEncoding { encoding, offset }
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn invalid_ref_flag(flag: i8, offset: usize) -> Self {
        Error::InvalidRefFlag { flag, offset }
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn class_not_registered(class_id: u32, offset: usize) -> Self {
        Error::ClassNotRegistered { class_id, offset }
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unknown_class_name<S: Into<String>>(name: S, offset: usize) -> Self {
        Error::UnknownClassName {
            name: name.into(),
            offset,
        }
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn class_version_mismatch<S: Into<String>>(
        class: S,
        local: u32,
        remote: u32,
        offset: usize,
    ) -> Self {
        Error::ClassVersionMismatch {
            class: class.into(),
            local,
            remote,
            offset,
        }
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn incompatible_schema<S: Into<Cow<'static, str>>>(s: S) -> Self {
        Error::IncompatibleSchema(s.into())
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn insecure_type<S: Into<Cow<'static, str>>>(s: S) -> Self {
        Error::InsecureType(s.into())
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn construction_failure<S: Into<Cow<'static, str>>>(s: S) -> Self {
        Error::ConstructionFailure(s.into())
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn depth_exceeded<S: Into<Cow<'static, str>>>(s: S) -> Self {
        Error::DepthExceeded(s.into())
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn invalid_data<S: Into<Cow<'static, str>>>(s: S) -> Self {
        Error::InvalidData(s.into())
    }
}

impl From<anyhow::Error> for Error {
    #[cold]
    fn from(err: anyhow::Error) -> Self {
        Error::InvalidData(err.to_string().into())
    }
}

/// Ensures a condition holds; otherwise returns the given [`enum@Error`].
///
/// ```
/// use weft_core::ensure;
/// use weft_core::error::Error;
///
/// fn check(n: i32) -> Result<(), Error> {
///     ensure!(n > 0, Error::invalid_data("value must be positive"));
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}

/// Returns early with an [`Error::InvalidData`].
#[macro_export]
macro_rules! bail {
    ($err:expr) => {
        return Err($crate::error::Error::invalid_data($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::invalid_data(format!($fmt, $($arg)*)))
    };
}
