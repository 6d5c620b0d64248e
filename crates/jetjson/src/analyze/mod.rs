// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fallback analyzers: build format descriptions from declarative schemas.
//!
//! When a lookup misses every explicit registration, these factories try
//! to manufacture a converter for the signature: enums and objects from
//! registered schemas, sequences and maps from their element signatures,
//! and erased content through the schema-free value codec. Results are
//! cached in the registry, so analysis runs once per signature.

mod collection;
mod enums;
mod object;

pub use enums::EnumSchema;
pub use object::{FieldSchema, TypeSchema};

use std::any::TypeId;
use std::sync::Arc;

use crate::convert::{scalars, JsonValue, ReadFn, WriteFn};
use crate::error::Error;
use crate::json::Settings;
use crate::num::Decimal;
use crate::registry::{TypeKey, TypeSignature};

/// Wires every analyzer into the factory chain of a [`Settings`] under
/// construction.
pub(crate) fn install(settings: &mut Settings) {
    settings.reader_factories.push(Arc::new(enums::reader_factory));
    settings.writer_factories.push(Arc::new(enums::writer_factory));

    settings
        .reader_factories
        .push(Arc::new(collection::reader_factory));
    settings
        .writer_factories
        .push(Arc::new(collection::writer_factory));

    settings.reader_factories.push(Arc::new(object::reader_factory));
    settings.writer_factories.push(Arc::new(object::writer_factory));
    settings.binder_factories.push(Arc::new(object::binder_factory));
}

/// Bridges a scalar field signature into the erased value model.
///
/// Registry slots hold converters typed to the signature's Rust type, so
/// dynamic descriptions cannot reuse them directly. Integers read
/// through the digit-exact integer parser and floats and decimals read
/// as [`Decimal`], keeping the written digits reproducible.
pub(crate) fn scalar_value_codec(
    sig: &TypeSignature,
) -> Option<(ReadFn<JsonValue>, WriteFn<JsonValue>)> {
    let TypeKey::Rust(id) = sig.key() else {
        return None;
    };
    let id = *id;

    if id == TypeId::of::<bool>() {
        let read = scalars::bool_reader();
        let write = scalars::bool_writer();
        let label = sig.to_string();
        return Some((
            Arc::new(move |rd| read(rd).map(JsonValue::Bool)),
            Arc::new(move |wr, v| match v {
                JsonValue::Bool(b) => write(wr, b),
                other => Err(mismatch(&label, "a boolean", other)),
            }),
        ));
    }
    if id == TypeId::of::<String>() {
        let read = scalars::string_reader();
        let write = scalars::string_writer();
        let label = sig.to_string();
        return Some((
            Arc::new(move |rd| read(rd).map(JsonValue::String)),
            Arc::new(move |wr, v| match v {
                JsonValue::String(s) => write(wr, s),
                other => Err(mismatch(&label, "a string", other)),
            }),
        ));
    }
    if id == TypeId::of::<i64>()
        || id == TypeId::of::<i32>()
        || id == TypeId::of::<u32>()
        || id == TypeId::of::<u64>()
    {
        let read = scalars::i64_reader();
        let write = scalars::i64_writer();
        let label = sig.to_string();
        let write_label = label.clone();
        return Some((
            Arc::new(move |rd| read(rd).map(|n| JsonValue::Number(Decimal::from(n)))),
            Arc::new(move |wr, v| match v {
                JsonValue::Number(n) => match n.to_i64_exact() {
                    Some(i) => write(wr, &i),
                    None => Err(mismatch(&write_label, "an integer", v)),
                },
                other => Err(mismatch(&write_label, "an integer", other)),
            }),
        ));
    }
    if id == TypeId::of::<f64>() || id == TypeId::of::<f32>() || id == TypeId::of::<Decimal>() {
        let read = scalars::decimal_reader();
        let write = scalars::decimal_writer();
        let label = sig.to_string();
        return Some((
            Arc::new(move |rd| read(rd).map(JsonValue::Number)),
            Arc::new(move |wr, v| match v {
                JsonValue::Number(n) => write(wr, n),
                other => Err(mismatch(&label, "a number", other)),
            }),
        ));
    }
    None
}

fn mismatch(label: &str, expected: &str, found: &JsonValue) -> Error {
    Error::Serialization {
        reason: format!("expecting {} for '{}', found {:?}", expected, label, found),
    }
}
