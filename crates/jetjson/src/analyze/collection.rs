// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sequence and map analysis over the erased value model.
//!
//! A `List` signature turns into a converter that reads a JSON array with
//! the element converter and yields [`JsonValue::Array`]; a `Map`
//! signature reads string keyed objects into [`JsonValue::Object`]. Open
//! element signatures fall back to the schema-free value codec.

use std::sync::Arc;

use crate::convert::value::{value_reader, value_writer};
use crate::convert::{JsonValue, ReadFn, WriteFn};
use crate::error::Error;
use crate::json::Json;
use crate::registry::{Erased, TypeKey, TypeSignature};

fn element_reader(elem: &TypeSignature, json: &Arc<Json>) -> Option<ReadFn<JsonValue>> {
    let inner = if elem.is_open() {
        value_reader()
    } else if let Some((read, _)) = super::scalar_value_codec(elem) {
        read
    } else {
        json.try_find_reader::<JsonValue>(elem)?
    };
    // elements are always nullable in the erased model
    Some(Arc::new(move |rd| {
        if rd.was_null()? {
            Ok(JsonValue::Null)
        } else {
            inner(rd)
        }
    }))
}

fn element_writer(elem: &TypeSignature, json: &Arc<Json>) -> Option<WriteFn<JsonValue>> {
    let inner = if elem.is_open() {
        value_writer()
    } else if let Some((_, write)) = super::scalar_value_codec(elem) {
        write
    } else {
        json.try_find_writer::<JsonValue>(elem)?
    };
    Some(Arc::new(move |wr, v| match v {
        JsonValue::Null => {
            wr.write_null();
            Ok(())
        }
        other => inner(wr, other),
    }))
}

pub(crate) fn reader_factory(sig: &TypeSignature, json: &Arc<Json>) -> Option<Erased> {
    match sig.key() {
        TypeKey::List => {
            let elem = element_reader(sig.args().first()?, json)?;
            let reader: ReadFn<JsonValue> = Arc::new(move |rd| {
                if rd.last() != b'[' {
                    return Err(rd.expecting("'['"));
                }
                if rd.next_token()? == b']' {
                    return Ok(JsonValue::Array(Vec::new()));
                }
                let mut res = Vec::with_capacity(4);
                res.push(elem(rd)?);
                while rd.next_token()? == b',' {
                    rd.next_token()?;
                    res.push(elem(rd)?);
                }
                rd.check_array_end()?;
                Ok(JsonValue::Array(res))
            });
            Some(Arc::new(reader) as Erased)
        }
        TypeKey::Map => {
            let val = element_reader(sig.args().get(1)?, json)?;
            let reader: ReadFn<JsonValue> = Arc::new(move |rd| {
                if rd.last() != b'{' {
                    return Err(rd.expecting("'{'"));
                }
                let mut res = Vec::new();
                if rd.next_token()? == b'}' {
                    return Ok(JsonValue::Object(res));
                }
                loop {
                    let key = rd.read_key()?;
                    res.push((key, val(rd)?));
                    match rd.next_token()? {
                        b',' => {
                            rd.next_token()?;
                        }
                        b'}' => return Ok(JsonValue::Object(res)),
                        _ => return Err(rd.expecting("'}'")),
                    }
                }
            });
            Some(Arc::new(reader) as Erased)
        }
        _ => None,
    }
}

pub(crate) fn writer_factory(sig: &TypeSignature, json: &Arc<Json>) -> Option<Erased> {
    match sig.key() {
        TypeKey::List => {
            let elem = element_writer(sig.args().first()?, json)?;
            let label = sig.to_string();
            let writer: WriteFn<JsonValue> = Arc::new(move |wr, v| {
                let items = match v {
                    JsonValue::Array(items) => items,
                    other => return Err(shape_error(&label, "an array", other)),
                };
                wr.write_byte(b'[');
                let mut first = true;
                for item in items {
                    if !first {
                        wr.write_byte(b',');
                    }
                    first = false;
                    elem(wr, item)?;
                    wr.maybe_flush()?;
                }
                wr.write_byte(b']');
                Ok(())
            });
            Some(Arc::new(writer) as Erased)
        }
        TypeKey::Map => {
            let val = element_writer(sig.args().get(1)?, json)?;
            let label = sig.to_string();
            let writer: WriteFn<JsonValue> = Arc::new(move |wr, v| {
                let entries = match v {
                    JsonValue::Object(entries) => entries,
                    other => return Err(shape_error(&label, "an object", other)),
                };
                wr.write_byte(b'{');
                let mut first = true;
                for (key, item) in entries {
                    if !first {
                        wr.write_byte(b',');
                    }
                    first = false;
                    wr.write_string(key);
                    wr.write_byte(b':');
                    val(wr, item)?;
                    wr.maybe_flush()?;
                }
                wr.write_byte(b'}');
                Ok(())
            });
            Some(Arc::new(writer) as Erased)
        }
        _ => None,
    }
}

fn shape_error(label: &str, expected: &str, found: &JsonValue) -> Error {
    Error::Serialization {
        reason: format!("expecting {} for '{}', found {:?}", expected, label, found),
    }
}
