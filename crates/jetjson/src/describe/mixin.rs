// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Mixin: closed polymorphic decoding over a `"$type"` discriminator.
//!
//! The discriminator must be the first member (object form) or the first
//! element (array form). Variant lookup hashes the discriminator value and
//! falls back to exact byte comparison only when two variant names share a
//! hash.

use std::sync::Arc;

use super::property::calc_hash;
use super::FormatDescription;
use crate::error::{Error, Result};
use crate::reader::JsonReader;
use crate::writer::JsonWriter;

const DEFAULT_DISCRIMINATOR: &str = "$type";

/// Closed set of variant descriptions decoded and encoded through one
/// converter. `select` maps a value to its variant index, taking the place
/// of runtime class identity.
pub struct MixinDescription<T> {
    type_name: Box<str>,
    variants: Box<[Arc<FormatDescription<T>>]>,
    select: Arc<dyn Fn(&T) -> usize + Send + Sync>,
    always_serialize: bool,
    exact_match: bool,
    can_object: bool,
    can_array: bool,
    discriminator: Box<str>,
    discriminator_hash: u32,
    object_start: Box<[u8]>,
}

impl<T> MixinDescription<T> {
    pub fn new(
        type_name: &str,
        variants: Vec<Arc<FormatDescription<T>>>,
        select: impl Fn(&T) -> usize + Send + Sync + 'static,
        omit_defaults: bool,
    ) -> Result<Arc<Self>> {
        Self::with_discriminator(type_name, DEFAULT_DISCRIMINATOR, variants, select, omit_defaults)
    }

    /// Same as [`MixinDescription::new`] with a custom discriminator key.
    pub fn with_discriminator(
        type_name: &str,
        discriminator: &str,
        variants: Vec<Arc<FormatDescription<T>>>,
        select: impl Fn(&T) -> usize + Send + Sync + 'static,
        omit_defaults: bool,
    ) -> Result<Arc<Self>> {
        if variants.is_empty() {
            return Err(Error::Configuration {
                reason: format!("mixin '{}' needs at least one variant", type_name),
            });
        }
        if discriminator.is_empty() || discriminator.bytes().any(|b| b == b'"' || b == b'\\') {
            return Err(Error::Configuration {
                reason: format!(
                    "invalid discriminator key '{}' for mixin '{}'",
                    discriminator, type_name
                ),
            });
        }
        let mut hashes: Vec<u32> = variants.iter().map(|v| v.type_hash).collect();
        hashes.sort_unstable();
        hashes.dedup();
        let exact_match = hashes.len() != variants.len();
        let can_object = variants.iter().any(|v| v.object_format.is_some());
        let can_array = variants.iter().any(|v| v.array_format.is_some());
        let mut object_start = Vec::with_capacity(discriminator.len() + 4);
        object_start.extend_from_slice(b"{\"");
        object_start.extend_from_slice(discriminator.as_bytes());
        object_start.extend_from_slice(b"\":");
        Ok(Arc::new(MixinDescription {
            type_name: type_name.into(),
            variants: variants.into_boxed_slice(),
            select: Arc::new(select),
            always_serialize: !omit_defaults,
            exact_match,
            can_object,
            can_array,
            discriminator_hash: calc_hash(discriminator.as_bytes()),
            discriminator: discriminator.into(),
            object_start: object_start.into_boxed_slice(),
        }))
    }

    pub fn read(&self, rd: &mut JsonReader<'_>) -> Result<T> {
        if rd.last() == b'{' && self.can_object {
            return self.read_object_format(rd);
        }
        if rd.last() == b'[' && self.can_array {
            return self.read_array_format(rd);
        }
        Err(rd.expecting(match (self.can_object, self.can_array) {
            (true, true) => "'{' or '['",
            (true, false) => "'{'",
            _ => "'['",
        }))
    }

    fn read_object_format(&self, rd: &mut JsonReader<'_>) -> Result<T> {
        if rd.next_token()? != b'"' {
            return Err(Error::Parse {
                offset: rd.position(),
                reason: format!(
                    "expecting \"{}\" attribute as first member of mixin '{}'",
                    self.discriminator, self.type_name
                ),
            });
        }
        if rd.fill_name()? != self.discriminator_hash {
            return Err(Error::Parse {
                offset: rd.position(),
                reason: format!(
                    "expecting \"{}\" attribute as first member of mixin '{}', found: '{}'",
                    self.discriminator,
                    self.type_name,
                    rd.last_name()
                ),
            });
        }
        rd.next_token()?;
        let hash = rd.calc_hash()?;
        for variant in self.variants.iter() {
            let Some(format) = &variant.object_format else {
                continue;
            };
            if variant.type_hash != hash {
                continue;
            }
            if self.exact_match && !rd.was_last_name(&variant.type_name_bytes) {
                continue;
            }
            if rd.next_token()? == b',' {
                rd.next_token()?;
            }
            return format.read_content(rd);
        }
        Err(self.unknown_variant(rd))
    }

    fn read_array_format(&self, rd: &mut JsonReader<'_>) -> Result<T> {
        if rd.next_token()? != b'"' {
            return Err(Error::Parse {
                offset: rd.position(),
                reason: format!(
                    "expecting the type name as first element of mixin '{}'",
                    self.type_name
                ),
            });
        }
        let hash = rd.calc_hash()?;
        for variant in self.variants.iter() {
            let Some(format) = &variant.array_format else {
                continue;
            };
            if variant.type_hash != hash {
                continue;
            }
            if self.exact_match && !rd.was_last_name(&variant.type_name_bytes) {
                continue;
            }
            return match rd.next_token()? {
                b',' => {
                    rd.next_token()?;
                    format.read_content(rd)
                }
                b']' => format.read_content(rd),
                _ => Err(rd.expecting("']'")),
            };
        }
        Err(self.unknown_variant(rd))
    }

    fn unknown_variant(&self, rd: &JsonReader<'_>) -> Error {
        Error::Configuration {
            reason: format!(
                "unable to find decoder for '{}' in mixin '{}'",
                rd.last_name(),
                self.type_name
            ),
        }
    }

    pub fn write(&self, wr: &mut JsonWriter, value: &T) -> Result<()> {
        let index = (self.select)(value);
        let Some(variant) = self.variants.get(index) else {
            return Err(Error::Serialization {
                reason: format!(
                    "variant index {} out of range for mixin '{}'",
                    index, self.type_name
                ),
            });
        };
        if variant.object_first {
            let Some(format) = &variant.object_format else {
                return Err(Error::Serialization {
                    reason: format!(
                        "object format for '{}' is not defined",
                        variant.type_name()
                    ),
                });
            };
            wr.write_ascii(&self.object_start);
            wr.write_ascii(&variant.quoted_type_name);
            wr.write_byte(b',');
            if self.always_serialize {
                let pos = wr.size();
                let flushed = wr.flushed();
                format.write_content_full(wr, value)?;
                if pos != wr.size() || flushed != wr.flushed() {
                    wr.write_byte(b'}');
                } else {
                    wr.patch_last(b'}');
                }
            } else {
                format.write_content_minimal(wr, value)?;
                wr.patch_last(b'}');
            }
        } else {
            let Some(format) = &variant.array_format else {
                return Err(Error::Serialization {
                    reason: format!("array format for '{}' is not defined", variant.type_name()),
                });
            };
            wr.write_byte(b'[');
            wr.write_ascii(&variant.quoted_type_name);
            wr.write_byte(b',');
            let pos = wr.size();
            let flushed = wr.flushed();
            format.write_content_full(wr, value)?;
            if pos != wr.size() || flushed != wr.flushed() {
                wr.write_byte(b']');
            } else {
                wr.patch_last(b']');
            }
        }
        Ok(())
    }
}
