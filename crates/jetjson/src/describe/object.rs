// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object format: named-property decoding with a two-tier dispatch.
//!
//! The fast path assumes properties arrive in declared order and verifies
//! each name with the cheap weak hash plus an exact byte compare. On the
//! first mismatch decoding drops to the slow path, which dispatches every
//! remaining property through its full hash, in any order, skipping or
//! rejecting unknown names per configuration.

use std::sync::Arc;

use super::property::{prepare, Property};
use super::FormatConverter;
use crate::error::{Error, Result};
use crate::json::Json;
use crate::reader::JsonReader;
use crate::writer::JsonWriter;

pub struct ObjectFormatDescription<T> {
    type_name: Box<str>,
    new_instance: Arc<dyn Fn() -> T + Send + Sync>,
    props: Box<[Property<T>]>,
    mandatory_flag: u64,
    fail_on_unknown: bool,
    omit_defaults: bool,
}

pub struct ObjectFormatBuilder<T> {
    type_name: String,
    new_instance: Arc<dyn Fn() -> T + Send + Sync>,
    props: Vec<Property<T>>,
    fail_on_unknown: Option<bool>,
}

impl<T> ObjectFormatDescription<T> {
    pub fn builder(
        type_name: &str,
        new_instance: impl Fn() -> T + Send + Sync + 'static,
    ) -> ObjectFormatBuilder<T> {
        ObjectFormatBuilder {
            type_name: type_name.to_owned(),
            new_instance: Arc::new(new_instance),
            props: Vec::new(),
            fail_on_unknown: None,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    fn bind_content(&self, rd: &mut JsonReader<'_>, instance: &mut T) -> Result<()> {
        if rd.last() == b'}' {
            if self.mandatory_flag != 0 {
                return Err(self.mandatory_error(rd, self.mandatory_flag));
            }
            return Ok(());
        }
        let mut mandatory = self.mandatory_flag;
        let mut i = 0;
        while i < self.props.len() {
            let p = &self.props[i];
            i += 1;
            let weak = rd.fill_name_weak_hash()?;
            if weak != p.weak_hash || !rd.was_last_name(&p.name_bytes) {
                return self.bind_slow(rd, instance, mandatory);
            }
            rd.next_token()?;
            (p.bind_value)(rd, instance)?;
            mandatory &= p.mandatory_mask;
            if rd.next_token()? == b',' && i != self.props.len() {
                rd.next_token()?;
            } else {
                break;
            }
        }
        self.final_checks(rd, instance, mandatory)
    }

    fn bind_slow(&self, rd: &mut JsonReader<'_>, instance: &mut T, mandatory: u64) -> Result<()> {
        // the name span was already scanned by the caller
        let mut mandatory = mandatory;
        let mut hash = rd.last_name_hash();
        loop {
            let mut processed = false;
            for p in self.props.iter() {
                if p.hash != hash {
                    continue;
                }
                if p.exact_name && !rd.was_last_name(&p.name_bytes) {
                    continue;
                }
                rd.next_token()?;
                (p.bind_value)(rd, instance)?;
                mandatory &= p.mandatory_mask;
                processed = true;
                break;
            }
            if processed {
                rd.next_token()?;
            } else {
                self.skip_unknown(rd)?;
            }
            if rd.last() != b',' {
                break;
            }
            rd.next_token()?;
            hash = rd.fill_name()?;
        }
        self.final_checks(rd, instance, mandatory)
    }

    fn skip_unknown(&self, rd: &mut JsonReader<'_>) -> Result<()> {
        if self.fail_on_unknown {
            return Err(Error::UnknownProperty {
                offset: rd.position(),
                name: rd.last_name(),
            });
        }
        rd.next_token()?;
        rd.skip()?;
        Ok(())
    }

    fn final_checks(&self, rd: &mut JsonReader<'_>, instance: &mut T, mandatory: u64) -> Result<()> {
        if rd.last() != b'}' {
            if rd.last() == b',' {
                rd.next_token()?;
                rd.fill_name_weak_hash()?;
                return self.bind_slow(rd, instance, mandatory);
            }
            return Err(rd.expecting("'}' or ','"));
        }
        if mandatory != 0 {
            return Err(self.mandatory_error(rd, mandatory));
        }
        Ok(())
    }

    /// Lists every mandatory property whose bit is still set.
    fn mandatory_error(&self, rd: &JsonReader<'_>, flag: u64) -> Error {
        let names = self
            .props
            .iter()
            .filter(|p| p.mandatory && flag & !p.mandatory_mask != 0)
            .map(|p| p.name().to_owned())
            .collect();
        Error::MissingMandatory {
            offset: rd.position(),
            names,
        }
    }
}

impl<T> FormatConverter<T> for ObjectFormatDescription<T> {
    fn read(&self, rd: &mut JsonReader<'_>) -> Result<T> {
        if rd.last() != b'{' {
            return Err(rd.expecting("'{'"));
        }
        rd.next_token()?;
        self.read_content(rd)
    }

    fn read_content(&self, rd: &mut JsonReader<'_>) -> Result<T> {
        let mut instance = (self.new_instance)();
        self.bind_content(rd, &mut instance)?;
        Ok(instance)
    }

    fn bind(&self, rd: &mut JsonReader<'_>, instance: &mut T) -> Result<()> {
        if rd.last() != b'{' {
            return Err(rd.expecting("'{'"));
        }
        rd.next_token()?;
        self.bind_content(rd, instance)
    }

    fn write(&self, wr: &mut JsonWriter, value: &T) -> Result<()> {
        wr.write_byte(b'{');
        if self.omit_defaults {
            if self.write_content_minimal(wr, value)? {
                wr.patch_last(b'}');
            } else {
                wr.write_byte(b'}');
            }
        } else {
            self.write_content_full(wr, value)?;
            wr.write_byte(b'}');
        }
        Ok(())
    }

    fn write_content_full(&self, wr: &mut JsonWriter, value: &T) -> Result<()> {
        for (i, p) in self.props.iter().enumerate() {
            if i > 0 {
                wr.write_byte(b',');
            }
            wr.write_ascii(&p.prefix);
            (p.write_value)(wr, value)?;
        }
        Ok(())
    }

    fn write_content_minimal(&self, wr: &mut JsonWriter, value: &T) -> Result<bool> {
        let mut wrote = false;
        for p in self.props.iter() {
            if let Some(skip) = &p.skip_default {
                if skip(value) {
                    continue;
                }
            }
            wr.write_ascii(&p.prefix);
            (p.write_value)(wr, value)?;
            wr.write_byte(b',');
            wrote = true;
        }
        Ok(wrote)
    }
}

impl<T> ObjectFormatBuilder<T> {
    pub fn property(mut self, p: Property<T>) -> Self {
        self.props.push(p);
        self
    }

    /// Override the registry-wide unknown-property policy for this type.
    pub fn fail_on_unknown(mut self, fail: bool) -> Self {
        self.fail_on_unknown = Some(fail);
        self
    }

    pub fn build(self, json: &Json) -> Result<Arc<ObjectFormatDescription<T>>> {
        let (props, mandatory_flag) = prepare(self.props)?;
        Ok(Arc::new(ObjectFormatDescription {
            type_name: self.type_name.into_boxed_str(),
            new_instance: self.new_instance,
            props,
            mandatory_flag,
            fail_on_unknown: self.fail_on_unknown.unwrap_or_else(|| json.fail_on_unknown()),
            omit_defaults: json.omit_defaults(),
        }))
    }
}
