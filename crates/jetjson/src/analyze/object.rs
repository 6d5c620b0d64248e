// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object analysis: object format descriptions built from declarative
//! type schemas over the erased value model.
//!
//! Analysis is two-phase so that self referential and mutually recursive
//! schemas resolve without deadlock: a lazy handle is registered under
//! the signature before any field converter is looked up, then the real
//! description is built, registered and published into the handle.

use std::sync::Arc;

use crate::convert::value::{value_reader, value_writer};
use crate::convert::{BindFn, JsonValue, ReadFn, WriteFn};
use crate::describe::{FormatConverter, ObjectFormatDescription, Property};
use crate::error::Error;
use crate::json::Json;
use crate::registry::lazy::LazyConverter;
use crate::registry::{Erased, TypeSignature};

/// Declarative description of an object type: an ordered list of named
/// fields, each with its own signature.
#[derive(Clone)]
pub struct TypeSchema {
    name: Arc<str>,
    fields: Vec<FieldSchema>,
    fail_on_unknown: Option<bool>,
}

/// One field of a [`TypeSchema`].
#[derive(Clone)]
pub struct FieldSchema {
    name: String,
    signature: TypeSignature,
    mandatory: bool,
    non_null: bool,
}

impl TypeSchema {
    pub fn new(name: &str) -> Self {
        TypeSchema {
            name: Arc::from(name),
            fields: Vec::new(),
            fail_on_unknown: None,
        }
    }

    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Overrides the instance-wide unknown-property policy for this type.
    pub fn fail_on_unknown(mut self, fail: bool) -> Self {
        self.fail_on_unknown = Some(fail);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FieldSchema {
    pub fn new(name: &str, signature: TypeSignature) -> Self {
        FieldSchema {
            name: name.to_owned(),
            signature,
            mandatory: false,
            non_null: false,
        }
    }

    /// Decoding fails when the field never appears in the document.
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Rejects an explicit `null` for this field.
    pub fn non_null(mut self) -> Self {
        self.non_null = true;
        self
    }
}

struct Analyzed {
    read: ReadFn<JsonValue>,
    write: WriteFn<JsonValue>,
    bind: BindFn<JsonValue>,
}

pub(crate) fn reader_factory(sig: &TypeSignature, json: &Arc<Json>) -> Option<Erased> {
    analyze(sig, json).map(|a| Arc::new(a.read) as Erased)
}

pub(crate) fn writer_factory(sig: &TypeSignature, json: &Arc<Json>) -> Option<Erased> {
    analyze(sig, json).map(|a| Arc::new(a.write) as Erased)
}

pub(crate) fn binder_factory(sig: &TypeSignature, json: &Arc<Json>) -> Option<Erased> {
    analyze(sig, json).map(|a| Arc::new(a.bind) as Erased)
}

fn analyze(sig: &TypeSignature, json: &Arc<Json>) -> Option<Analyzed> {
    let schema = json.schema(sig.name()?)?;
    let lazy = LazyConverter::<JsonValue>::new(schema.name());

    // register the forwarding handle first so recursive field lookups
    // resolve to it instead of re-entering analysis
    if !json.has_reader(sig) {
        json.register_reader(sig.clone(), lazy.reader());
    }
    if !json.has_writer(sig) {
        json.register_writer(sig.clone(), lazy.writer());
    }
    if !json.has_binder(sig) {
        json.register_binder(sig.clone(), lazy.binder());
    }

    match build(&schema, json) {
        Ok(desc) => {
            let d = desc.clone();
            let read: ReadFn<JsonValue> = Arc::new(move |rd| d.read(rd));
            let d = desc.clone();
            let write: WriteFn<JsonValue> = Arc::new(move |wr, v| d.write(wr, v));
            let d = desc;
            let bind: BindFn<JsonValue> = Arc::new(move |rd, v| d.bind(rd, v));
            lazy.publish(read.clone(), write.clone(), Some(bind.clone()));
            Some(Analyzed { read, write, bind })
        }
        Err(err) => {
            log::warn!("[analyze] failed to build description for '{}': {}", schema.name(), err);
            let reason: Arc<str> = Arc::from(format!("analysis of '{}' failed: {}", schema.name(), err));
            let r = reason.clone();
            let read: ReadFn<JsonValue> = Arc::new(move |_| Err(broken(&r)));
            let r = reason;
            let write: WriteFn<JsonValue> = Arc::new(move |_, _| Err(broken(&r)));
            lazy.publish(read, write, None);
            None
        }
    }
}

fn broken(reason: &str) -> Error {
    Error::Configuration {
        reason: reason.to_owned(),
    }
}

fn build(schema: &TypeSchema, json: &Arc<Json>) -> Result<Arc<ObjectFormatDescription<JsonValue>>, Error> {
    let mut builder =
        ObjectFormatDescription::builder(schema.name(), || JsonValue::Object(Vec::new()));
    for field in &schema.fields {
        builder = builder.property(field_property(schema.name(), field, json)?);
    }
    if let Some(fail) = schema.fail_on_unknown {
        builder = builder.fail_on_unknown(fail);
    }
    builder.build(json)
}

fn field_property(
    type_name: &str,
    field: &FieldSchema,
    json: &Arc<Json>,
) -> Result<Property<JsonValue>, Error> {
    let (read, write) = if field.signature.is_open() {
        (value_reader(), value_writer())
    } else if let Some(codec) = super::scalar_value_codec(&field.signature) {
        codec
    } else {
        let read = json
            .try_find_reader::<JsonValue>(&field.signature)
            .ok_or_else(|| unresolved(type_name, field, "decoder"))?;
        let write = json
            .try_find_writer::<JsonValue>(&field.signature)
            .ok_or_else(|| unresolved(type_name, field, "encoder"))?;
        (read, write)
    };

    let name = field.name.clone();
    let non_null = field.non_null;
    let owner: Arc<str> = Arc::from(type_name);
    let bind: BindFn<JsonValue> = {
        let name = name.clone();
        let owner = owner.clone();
        Arc::new(move |rd, instance| {
            let value = if rd.was_null()? {
                if non_null {
                    return Err(Error::Parse {
                        offset: rd.position(),
                        reason: format!("null found for non-null property '{}' of '{}'", name, owner),
                    });
                }
                JsonValue::Null
            } else {
                read(rd)?
            };
            instance.set(&name, value);
            Ok(())
        })
    };

    let write_value: WriteFn<JsonValue> = {
        let name = name.clone();
        Arc::new(move |wr, instance| match instance.get(&name) {
            Some(value) if !value.is_null() => write(wr, value),
            _ if non_null => Err(Error::Serialization {
                reason: format!("null value for non-null property '{}' of '{}'", name, owner),
            }),
            _ => {
                wr.write_null();
                Ok(())
            }
        })
    };

    let mut prop = Property::new(&field.name, write_value, bind);
    if field.mandatory {
        prop = prop.mandatory();
    }
    let skip_name = name;
    prop = prop.skip_when(move |instance: &JsonValue| {
        matches!(instance.get(&skip_name), None | Some(JsonValue::Null))
    });
    Ok(prop)
}

fn unresolved(type_name: &str, field: &FieldSchema, kind: &str) -> Error {
    Error::Configuration {
        reason: format!(
            "unable to resolve {} for property '{}' of '{}' with signature '{}'",
            kind, field.name, type_name, field.signature
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeKey;

    #[test]
    fn schema_builder_collects_fields() {
        let schema = TypeSchema::new("Point")
            .field(FieldSchema::new("x", TypeSignature::of::<i64>()).mandatory())
            .field(FieldSchema::new("y", TypeSignature::of::<i64>()))
            .fail_on_unknown(true);
        assert_eq!(schema.name(), "Point");
        assert_eq!(schema.fields.len(), 2);
        assert!(schema.fields[0].mandatory);
        assert!(!schema.fields[1].mandatory);
        assert_eq!(schema.fail_on_unknown, Some(true));
    }

    #[test]
    fn open_signatures_are_detected() {
        let open = FieldSchema::new("extra", TypeSignature::unknown());
        assert!(open.signature.is_open());
        let closed = FieldSchema::new("id", TypeSignature::of::<i64>());
        assert!(matches!(closed.signature.key(), TypeKey::Rust(_)));
    }
}
