// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Array format: positional, name-free encoding for compact payloads.
//!
//! Element order and count are fixed by the description. Every element is
//! always written, including defaults, so positions stay stable.

use std::sync::Arc;

use super::FormatConverter;
use crate::convert::{BindFn, WriteFn};
use crate::error::{Error, Result};
use crate::reader::JsonReader;
use crate::writer::JsonWriter;

pub struct ArrayFormatDescription<T> {
    type_name: Box<str>,
    new_instance: Arc<dyn Fn() -> T + Send + Sync>,
    encoders: Box<[WriteFn<T>]>,
    decoders: Box<[BindFn<T>]>,
}

impl<T> ArrayFormatDescription<T> {
    pub fn new(
        type_name: &str,
        new_instance: impl Fn() -> T + Send + Sync + 'static,
        encoders: Vec<WriteFn<T>>,
        decoders: Vec<BindFn<T>>,
    ) -> Result<Arc<Self>> {
        if encoders.len() != decoders.len() {
            return Err(Error::Configuration {
                reason: format!(
                    "'{}': decoders must match encoders ({} != {})",
                    type_name,
                    decoders.len(),
                    encoders.len()
                ),
            });
        }
        Ok(Arc::new(ArrayFormatDescription {
            type_name: type_name.into(),
            new_instance: Arc::new(new_instance),
            encoders: encoders.into_boxed_slice(),
            decoders: decoders.into_boxed_slice(),
        }))
    }

    fn bind_content(&self, rd: &mut JsonReader<'_>, instance: &mut T) -> Result<()> {
        let mut i = 0;
        while i < self.decoders.len() {
            (self.decoders[i])(rd, instance)?;
            i += 1;
            if rd.next_token()? == b',' {
                rd.next_token()?;
            } else {
                break;
            }
        }
        if i != self.decoders.len() {
            return Err(Error::Parse {
                offset: rd.position(),
                reason: format!(
                    "expecting to read {} elements in the array while decoding '{}', read only {}",
                    self.decoders.len(),
                    self.type_name,
                    i
                ),
            });
        }
        if rd.last() != b']' {
            return Err(rd.expecting("']'"));
        }
        Ok(())
    }
}

impl<T> FormatConverter<T> for ArrayFormatDescription<T> {
    fn read(&self, rd: &mut JsonReader<'_>) -> Result<T> {
        if rd.last() != b'[' {
            return Err(rd.expecting("'['"));
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
        if rd.last() != b'[' {
            return Err(rd.expecting("'['"));
        }
        rd.next_token()?;
        self.bind_content(rd, instance)
    }

    fn write(&self, wr: &mut JsonWriter, value: &T) -> Result<()> {
        wr.write_byte(b'[');
        self.write_content_full(wr, value)?;
        wr.write_byte(b']');
        Ok(())
    }

    fn write_content_full(&self, wr: &mut JsonWriter, value: &T) -> Result<()> {
        for (i, enc) in self.encoders.iter().enumerate() {
            if i > 0 {
                wr.write_byte(b',');
            }
            enc(wr, value)?;
        }
        Ok(())
    }

    /// Positional elements can never be omitted, so minimal form equals
    /// full form and reports no trailing comma.
    fn write_content_minimal(&self, wr: &mut JsonWriter, value: &T) -> Result<bool> {
        self.write_content_full(wr, value)?;
        Ok(false)
    }
}
