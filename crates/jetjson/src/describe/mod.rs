// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Format descriptions: precomputed decode/encode plans for structured
//! types.
//!
//! A type is described once, up front, as an object format (named
//! properties), an array format (positional values) or both. Decoding
//! dispatches on precomputed name hashes instead of building a member map
//! per document, and encoding writes precomputed `"name":` prefixes.

mod array;
mod mixin;
mod object;
mod property;

pub use array::ArrayFormatDescription;
pub use mixin::MixinDescription;
pub use object::{ObjectFormatBuilder, ObjectFormatDescription};
pub use property::Property;

use crate::error::{Error, Result};
use crate::reader::JsonReader;
use crate::writer::JsonWriter;

/// A single-format converter for `T`.
///
/// `read`/`write` handle the value with its delimiters; the `content`
/// variants operate inside delimiters already consumed by a wrapper (the
/// mixin discriminator path). The minimal content form writes a trailing
/// comma after every emitted property and reports whether anything was
/// emitted, so the wrapper can patch the final byte.
pub trait FormatConverter<T>: Send + Sync {
    fn read(&self, rd: &mut JsonReader<'_>) -> Result<T>;
    fn read_content(&self, rd: &mut JsonReader<'_>) -> Result<T>;

    /// Decode into an existing instance. Object formats support this;
    /// other formats refuse.
    fn bind(&self, rd: &mut JsonReader<'_>, instance: &mut T) -> Result<()> {
        let _ = (rd, instance);
        Err(Error::Configuration {
            reason: "this format does not support binding".into(),
        })
    }

    fn write(&self, wr: &mut JsonWriter, value: &T) -> Result<()>;
    fn write_content_full(&self, wr: &mut JsonWriter, value: &T) -> Result<()>;
    fn write_content_minimal(&self, wr: &mut JsonWriter, value: &T) -> Result<bool>;
}

/// Pairs a type's object and array formats under one name.
///
/// Decoding picks the format from the first token; encoding uses the
/// primary format. Mixins reference these per variant.
pub struct FormatDescription<T> {
    type_name: Box<str>,
    pub(crate) type_name_bytes: Box<[u8]>,
    pub(crate) quoted_type_name: Box<[u8]>,
    pub(crate) type_hash: u32,
    pub(crate) object_format: Option<std::sync::Arc<dyn FormatConverter<T>>>,
    pub(crate) array_format: Option<std::sync::Arc<dyn FormatConverter<T>>>,
    pub(crate) object_first: bool,
}

impl<T> FormatDescription<T> {
    /// `object_first` selects the encode format when both are present.
    /// When the registry disallows the array format an object format is
    /// required and always primary.
    pub fn new(
        type_name: &str,
        object_format: Option<std::sync::Arc<dyn FormatConverter<T>>>,
        array_format: Option<std::sync::Arc<dyn FormatConverter<T>>>,
        object_first: bool,
        allow_array_format: bool,
    ) -> Result<Self> {
        if object_format.is_none() && array_format.is_none() {
            return Err(Error::Configuration {
                reason: format!("'{}' needs at least one format", type_name),
            });
        }
        if !allow_array_format && object_format.is_none() {
            return Err(Error::Configuration {
                reason: format!(
                    "array format is not allowed, so '{}' must define an object format",
                    type_name
                ),
            });
        }
        if object_first && object_format.is_none() {
            return Err(Error::Configuration {
                reason: format!(
                    "object format is primary for '{}' but is not defined",
                    type_name
                ),
            });
        }
        let bytes = type_name.as_bytes();
        let mut quoted = Vec::with_capacity(bytes.len() + 2);
        quoted.push(b'"');
        quoted.extend_from_slice(bytes);
        quoted.push(b'"');
        Ok(FormatDescription {
            type_name: type_name.into(),
            type_name_bytes: bytes.into(),
            quoted_type_name: quoted.into_boxed_slice(),
            type_hash: property::calc_hash(bytes),
            object_format,
            array_format,
            object_first: object_first || !allow_array_format,
        })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn read(&self, rd: &mut JsonReader<'_>) -> Result<T> {
        match rd.last() {
            b'{' => match &self.object_format {
                Some(f) => f.read(rd),
                None => Err(self.format_missing("object")),
            },
            b'[' => match &self.array_format {
                Some(f) => f.read(rd),
                None => Err(self.format_missing("array")),
            },
            _ => Err(rd.expecting(self.start_expectation())),
        }
    }

    pub fn bind(&self, rd: &mut JsonReader<'_>, instance: &mut T) -> Result<()> {
        match rd.last() {
            b'{' => match &self.object_format {
                Some(f) => f.bind(rd, instance),
                None => Err(self.format_missing("object")),
            },
            b'[' => match &self.array_format {
                Some(f) => f.bind(rd, instance),
                None => Err(self.format_missing("array")),
            },
            _ => Err(rd.expecting(self.start_expectation())),
        }
    }

    pub fn write(&self, wr: &mut JsonWriter, value: &T) -> Result<()> {
        if self.object_first {
            match &self.object_format {
                Some(f) => f.write(wr, value),
                None => Err(self.format_missing("object")),
            }
        } else {
            match &self.array_format {
                Some(f) => f.write(wr, value),
                None => Err(self.format_missing("array")),
            }
        }
    }

    fn start_expectation(&self) -> &'static str {
        match (&self.object_format, &self.array_format) {
            (Some(_), Some(_)) => "'{' or '['",
            (Some(_), None) => "'{'",
            _ => "'['",
        }
    }

    fn format_missing(&self, kind: &str) -> Error {
        Error::Configuration {
            reason: format!("{} format for '{}' is not defined", kind, self.type_name),
        }
    }
}
