// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Enum analysis: string constants with an optional wire alias.

use std::sync::Arc;

use crate::convert::{JsonValue, ReadFn, WriteFn};
use crate::error::Error;
use crate::json::Json;
use crate::registry::{Erased, TypeSignature};

/// Declarative description of a closed set of string constants.
///
/// Each constant carries the name used on the value side and the form it
/// takes on the wire. Decoding accepts either spelling and always yields
/// the constant name; encoding always emits the wire form.
#[derive(Debug, Clone)]
pub struct EnumSchema {
    name: Arc<str>,
    constants: Vec<(String, String)>,
}

impl EnumSchema {
    pub fn new(name: &str) -> Self {
        EnumSchema {
            name: Arc::from(name),
            constants: Vec::new(),
        }
    }

    /// Adds a constant whose wire form equals its name.
    pub fn constant(self, name: &str) -> Self {
        self.constant_as(name, name)
    }

    /// Adds a constant with a distinct wire spelling.
    pub fn constant_as(mut self, name: &str, wire: &str) -> Self {
        self.constants.push((name.to_owned(), wire.to_owned()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn schema_for(sig: &TypeSignature, json: &Arc<Json>) -> Option<Arc<EnumSchema>> {
    json.enum_schema(sig.name()?)
}

pub(crate) fn reader_factory(sig: &TypeSignature, json: &Arc<Json>) -> Option<Erased> {
    let schema = schema_for(sig, json)?;
    let reader: ReadFn<JsonValue> = Arc::new(move |rd| {
        let start = rd.position();
        let value = rd.read_string()?;
        for (name, wire) in &schema.constants {
            if value == wire || value == name {
                return Ok(JsonValue::String(name.clone()));
            }
        }
        Err(Error::Parse {
            offset: start,
            reason: format!("unknown constant '{}' for enum '{}'", value, schema.name),
        })
    });
    Some(Arc::new(reader) as Erased)
}

pub(crate) fn writer_factory(sig: &TypeSignature, json: &Arc<Json>) -> Option<Erased> {
    let schema = schema_for(sig, json)?;
    let writer: WriteFn<JsonValue> = Arc::new(move |wr, value| {
        let text = match value {
            JsonValue::String(s) => s,
            other => {
                return Err(Error::Serialization {
                    reason: format!(
                        "expecting a string constant for enum '{}', found {:?}",
                        schema.name, other
                    ),
                })
            }
        };
        for (name, wire) in &schema.constants {
            if text == name {
                wr.write_string(wire);
                return Ok(());
            }
        }
        Err(Error::Serialization {
            reason: format!("unknown constant '{}' for enum '{}'", text, schema.name),
        })
    });
    Some(Arc::new(writer) as Erased)
}
