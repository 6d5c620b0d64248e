// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema-free JSON tree and its codec.
//!
//! [`JsonValue`] is the decode target when no description is known:
//! numbers stay as [`Decimal`] so nothing is rounded, and object members
//! keep their document order, which makes round-tripping byte stable for
//! unescaped input.

use std::sync::Arc;

use super::{ReadFn, WriteFn};
use crate::error::Result;
use crate::num::{self, Decimal};
use crate::reader::JsonReader;
use crate::writer::JsonWriter;

/// Dynamically typed JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Number(Decimal),
    String(String),
    Array(Vec<JsonValue>),
    /// Members in document order. Duplicate keys are kept as read.
    Object(Vec<(String, JsonValue)>),
}

impl JsonValue {
    /// Member lookup on objects; `None` for other shapes.
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        match self {
            JsonValue::Object(members) => members
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Replaces or appends a member on objects. No-op on other shapes.
    pub fn set(&mut self, name: &str, value: JsonValue) {
        if let JsonValue::Object(members) = self {
            if let Some(slot) = members.iter_mut().find(|(k, _)| k == name) {
                slot.1 = value;
            } else {
                members.push((name.to_owned(), value));
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, JsonValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JsonValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            JsonValue::Number(d) => d.to_i64_exact(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            JsonValue::Number(d) => Some(d.to_f64()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            JsonValue::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for JsonValue {
    fn from(v: &str) -> Self {
        JsonValue::String(v.to_owned())
    }
}

impl From<i64> for JsonValue {
    fn from(v: i64) -> Self {
        JsonValue::Number(Decimal::from(v))
    }
}

impl From<bool> for JsonValue {
    fn from(v: bool) -> Self {
        JsonValue::Bool(v)
    }
}

/// Decodes whatever value sits at the cursor.
pub fn read_value(rd: &mut JsonReader<'_>) -> Result<JsonValue> {
    match rd.last() {
        b'"' => Ok(JsonValue::String(rd.read_string()?.to_owned())),
        b'{' => {
            let mut members = Vec::new();
            if rd.next_token()? == b'}' {
                return Ok(JsonValue::Object(members));
            }
            loop {
                let key = rd.read_key()?;
                members.push((key, read_value(rd)?));
                match rd.next_token()? {
                    b',' => {
                        rd.next_token()?;
                    }
                    b'}' => return Ok(JsonValue::Object(members)),
                    _ => return Err(rd.expecting("'}'")),
                }
            }
        }
        b'[' => {
            let mut items = Vec::new();
            if rd.next_token()? == b']' {
                return Ok(JsonValue::Array(items));
            }
            loop {
                items.push(read_value(rd)?);
                match rd.next_token()? {
                    b',' => {
                        rd.next_token()?;
                    }
                    b']' => return Ok(JsonValue::Array(items)),
                    _ => return Err(rd.expecting("']'")),
                }
            }
        }
        b'n' => {
            rd.was_null()?;
            Ok(JsonValue::Null)
        }
        b't' | b'f' => {
            if rd.was_true()? {
                Ok(JsonValue::Bool(true))
            } else {
                rd.was_false()?;
                Ok(JsonValue::Bool(false))
            }
        }
        _ => Ok(JsonValue::Number(num::read_decimal(rd)?)),
    }
}

/// Encodes a [`JsonValue`] tree.
pub fn write_value(wr: &mut JsonWriter, v: &JsonValue) -> Result<()> {
    match v {
        JsonValue::Null => wr.write_null(),
        JsonValue::Bool(true) => wr.write_ascii(b"true"),
        JsonValue::Bool(false) => wr.write_ascii(b"false"),
        JsonValue::Number(d) => num::write_decimal(wr, d),
        JsonValue::String(s) => wr.write_string(s),
        JsonValue::Array(items) => {
            wr.write_byte(b'[');
            let mut first = true;
            for item in items {
                if !first {
                    wr.write_byte(b',');
                }
                first = false;
                write_value(wr, item)?;
                wr.maybe_flush()?;
            }
            wr.write_byte(b']');
        }
        JsonValue::Object(members) => {
            wr.write_byte(b'{');
            let mut first = true;
            for (key, member) in members {
                if !first {
                    wr.write_byte(b',');
                }
                first = false;
                wr.write_string(key);
                wr.write_byte(b':');
                write_value(wr, member)?;
                wr.maybe_flush()?;
            }
            wr.write_byte(b'}');
        }
    }
    Ok(())
}

pub fn value_reader() -> ReadFn<JsonValue> {
    Arc::new(read_value)
}

pub fn value_writer() -> WriteFn<JsonValue> {
    Arc::new(|wr, v| write_value(wr, v))
}
