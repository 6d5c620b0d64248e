// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Central codec instance: converter registry, factory chain and the
//! top-level serialize/deserialize entry points.
//!
//! A [`Json`] is configured once through [`Settings`] and then shared
//! behind an `Arc`. Lookups first consult the registry; on a miss the
//! factory chain gets a chance to manufacture a converter, and a
//! successful result is cached so each signature is analyzed at most
//! once.

use std::io;
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::analyze::{self, EnumSchema, TypeSchema};
use crate::convert::value::{value_reader, value_writer};
use crate::convert::{collections, scalars, BindFn, JsonValue, ReadFn, WriteFn};
use crate::describe::{FormatConverter, FormatDescription, MixinDescription};
use crate::error::{Error, Result};
use crate::num::{DateTime, Decimal};
use crate::reader::JsonReader;
use crate::registry::{Erased, Registry, TypeSignature};
use crate::writer::{JsonWriter, DEFAULT_CHUNK_SIZE};

/// Manufactures a converter for a signature the registry has no entry
/// for. Returning `None` passes the signature on to the next factory.
pub type ConverterFactory =
    Arc<dyn Fn(&TypeSignature, &Arc<Json>) -> Option<Erased> + Send + Sync>;

/// Configuration collected before a [`Json`] instance is frozen.
pub struct Settings {
    omit_defaults: bool,
    fail_on_unknown: bool,
    allow_array_format: bool,
    max_string_size: usize,
    dynamic_fallback: bool,
    pub(crate) reader_factories: Vec<ConverterFactory>,
    pub(crate) writer_factories: Vec<ConverterFactory>,
    pub(crate) binder_factories: Vec<ConverterFactory>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            omit_defaults: false,
            fail_on_unknown: true,
            allow_array_format: true,
            max_string_size: crate::reader::DEFAULT_MAX_STRING_SIZE,
            dynamic_fallback: false,
            reader_factories: Vec::new(),
            writer_factories: Vec::new(),
            binder_factories: Vec::new(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Settings::default()
    }

    /// Skip properties holding their default value when encoding.
    pub fn omit_defaults(mut self, omit: bool) -> Self {
        self.omit_defaults = omit;
        self
    }

    /// Reject documents containing properties no description knows about.
    /// On by default; turning it off skips unknown values instead.
    pub fn fail_on_unknown(mut self, fail: bool) -> Self {
        self.fail_on_unknown = fail;
        self
    }

    /// Allow positional array formats. When off, every description must
    /// define an object format and it is always primary.
    pub fn allow_array_format(mut self, allow: bool) -> Self {
        self.allow_array_format = allow;
        self
    }

    /// Upper bound for a single decoded string, in bytes.
    pub fn max_string_size(mut self, limit: usize) -> Self {
        self.max_string_size = limit;
        self
    }

    /// Install the schema analyzers so signatures without an explicit
    /// registration resolve through registered [`TypeSchema`]s and
    /// [`EnumSchema`]s into the erased value model.
    pub fn with_dynamic_fallback(mut self) -> Self {
        self.dynamic_fallback = true;
        self
    }

    /// Append a custom reader factory to the resolution chain.
    pub fn resolve_reader_with(mut self, factory: ConverterFactory) -> Self {
        self.reader_factories.push(factory);
        self
    }

    /// Append a custom writer factory to the resolution chain.
    pub fn resolve_writer_with(mut self, factory: ConverterFactory) -> Self {
        self.writer_factories.push(factory);
        self
    }

    /// Append a custom binder factory to the resolution chain.
    pub fn resolve_binder_with(mut self, factory: ConverterFactory) -> Self {
        self.binder_factories.push(factory);
        self
    }

    /// Freezes the configuration and builds the shared instance with all
    /// built-in converters registered.
    pub fn finish(mut self) -> Arc<Json> {
        if self.dynamic_fallback {
            analyze::install(&mut self);
        }
        let json = Arc::new_cyclic(|me| Json {
            me: me.clone(),
            registry: Registry::new(),
            schemas: DashMap::new(),
            enums: DashMap::new(),
            reader_factories: RwLock::new(self.reader_factories),
            writer_factories: RwLock::new(self.writer_factories),
            binder_factories: RwLock::new(self.binder_factories),
            omit_defaults: self.omit_defaults,
            fail_on_unknown: self.fail_on_unknown,
            allow_array_format: self.allow_array_format,
            max_string_size: self.max_string_size,
        });
        register_defaults(&json);
        json
    }
}

/// Shared codec state: the converter registry, declarative schemas and
/// the frozen configuration.
pub struct Json {
    me: Weak<Json>,
    registry: Registry,
    schemas: DashMap<Arc<str>, Arc<TypeSchema>>,
    enums: DashMap<Arc<str>, Arc<EnumSchema>>,
    reader_factories: RwLock<Vec<ConverterFactory>>,
    writer_factories: RwLock<Vec<ConverterFactory>>,
    binder_factories: RwLock<Vec<ConverterFactory>>,
    omit_defaults: bool,
    fail_on_unknown: bool,
    allow_array_format: bool,
    max_string_size: usize,
}

impl Json {
    /// Builds an instance with the default settings.
    pub fn standard() -> Arc<Json> {
        Settings::new().finish()
    }

    /// Builds an instance with the schema analyzers installed.
    pub fn dynamic() -> Arc<Json> {
        Settings::new().with_dynamic_fallback().finish()
    }

    pub fn omit_defaults(&self) -> bool {
        self.omit_defaults
    }

    pub fn fail_on_unknown(&self) -> bool {
        self.fail_on_unknown
    }

    pub fn allow_array_format(&self) -> bool {
        self.allow_array_format
    }

    // ---- registration ----

    pub fn register_reader<T: 'static>(&self, sig: TypeSignature, reader: ReadFn<T>) {
        self.registry.put_reader(sig, Arc::new(reader));
    }

    pub fn register_writer<T: 'static>(&self, sig: TypeSignature, writer: WriteFn<T>) {
        self.registry.put_writer(sig, Arc::new(writer));
    }

    pub fn register_binder<T: 'static>(&self, sig: TypeSignature, binder: BindFn<T>) {
        self.registry.put_binder(sig, Arc::new(binder));
    }

    /// Registers a single-format converter under all three roles.
    pub fn register_format<T: 'static>(
        &self,
        sig: TypeSignature,
        format: Arc<dyn FormatConverter<T>>,
    ) {
        let f = format.clone();
        self.register_reader::<T>(sig.clone(), Arc::new(move |rd| f.read(rd)));
        let f = format.clone();
        self.register_writer::<T>(sig.clone(), Arc::new(move |wr, v| f.write(wr, v)));
        self.register_binder::<T>(sig, Arc::new(move |rd, v| format.bind(rd, v)));
    }

    /// Registers a dual object/array description under all three roles.
    pub fn register_description<T: 'static>(
        &self,
        sig: TypeSignature,
        desc: Arc<FormatDescription<T>>,
    ) {
        let d = desc.clone();
        self.register_reader::<T>(sig.clone(), Arc::new(move |rd| d.read(rd)));
        let d = desc.clone();
        self.register_writer::<T>(sig.clone(), Arc::new(move |wr, v| d.write(wr, v)));
        self.register_binder::<T>(sig, Arc::new(move |rd, v| desc.bind(rd, v)));
    }

    /// Registers a mixin for decoding through the `$type` discriminator
    /// and encoding through the selected variant.
    pub fn register_mixin<T: 'static>(&self, sig: TypeSignature, mixin: Arc<MixinDescription<T>>) {
        let m = mixin.clone();
        self.register_reader::<T>(sig.clone(), Arc::new(move |rd| m.read(rd)));
        self.register_writer::<T>(sig, Arc::new(move |wr, v| mixin.write(wr, v)));
    }

    /// Registers a declarative object schema for the dynamic fallback.
    pub fn register_schema(&self, schema: TypeSchema) {
        self.schemas.insert(Arc::from(schema.name()), Arc::new(schema));
    }

    /// Registers an enum schema for the dynamic fallback.
    pub fn register_enum(&self, schema: EnumSchema) {
        self.enums.insert(Arc::from(schema.name()), Arc::new(schema));
    }

    pub(crate) fn schema(&self, name: &str) -> Option<Arc<TypeSchema>> {
        self.schemas.get(name).map(|s| s.value().clone())
    }

    pub(crate) fn enum_schema(&self, name: &str) -> Option<Arc<EnumSchema>> {
        self.enums.get(name).map(|s| s.value().clone())
    }

    pub(crate) fn has_reader(&self, sig: &TypeSignature) -> bool {
        self.registry.has_reader(sig)
    }

    pub(crate) fn has_writer(&self, sig: &TypeSignature) -> bool {
        self.registry.has_writer(sig)
    }

    pub(crate) fn has_binder(&self, sig: &TypeSignature) -> bool {
        self.registry.has_binder(sig)
    }

    // ---- lookup ----

    pub fn try_find_reader<T: 'static>(&self, sig: &TypeSignature) -> Option<ReadFn<T>> {
        if let Some(erased) = self.registry.reader(sig) {
            return downcast::<ReadFn<T>>(sig, "reader", &erased);
        }
        let me = self.me.upgrade()?;
        let factories = self.reader_factories.read().clone();
        for factory in &factories {
            if let Some(erased) = factory(sig, &me) {
                self.registry.put_reader(sig.clone(), erased.clone());
                return downcast::<ReadFn<T>>(sig, "reader", &erased);
            }
        }
        None
    }

    pub fn try_find_writer<T: 'static>(&self, sig: &TypeSignature) -> Option<WriteFn<T>> {
        if let Some(erased) = self.registry.writer(sig) {
            return downcast::<WriteFn<T>>(sig, "writer", &erased);
        }
        let me = self.me.upgrade()?;
        let factories = self.writer_factories.read().clone();
        for factory in &factories {
            if let Some(erased) = factory(sig, &me) {
                self.registry.put_writer(sig.clone(), erased.clone());
                return downcast::<WriteFn<T>>(sig, "writer", &erased);
            }
        }
        None
    }

    pub fn try_find_binder<T: 'static>(&self, sig: &TypeSignature) -> Option<BindFn<T>> {
        if let Some(erased) = self.registry.binder(sig) {
            return downcast::<BindFn<T>>(sig, "binder", &erased);
        }
        let me = self.me.upgrade()?;
        let factories = self.binder_factories.read().clone();
        for factory in &factories {
            if let Some(erased) = factory(sig, &me) {
                self.registry.put_binder(sig.clone(), erased.clone());
                return downcast::<BindFn<T>>(sig, "binder", &erased);
            }
        }
        None
    }

    // ---- entry points ----

    pub fn new_reader<'a>(&self, input: &'a [u8]) -> JsonReader<'a> {
        JsonReader::with_limit(input, self.max_string_size)
    }

    pub fn new_writer(&self) -> JsonWriter {
        JsonWriter::new()
    }

    /// Encodes a value into an existing writer.
    pub fn serialize<T: 'static>(&self, wr: &mut JsonWriter, value: &T) -> Result<()> {
        let sig = TypeSignature::of::<T>();
        let writer = self
            .try_find_writer::<T>(&sig)
            .ok_or_else(|| no_converter("writer", &sig))?;
        writer(wr, value)
    }

    /// Encodes a value into a fresh byte vector.
    pub fn to_bytes<T: 'static>(&self, value: &T) -> Result<Vec<u8>> {
        let mut wr = self.new_writer();
        self.serialize(&mut wr, value)?;
        Ok(wr.into_vec())
    }

    /// Encodes a value into an output stream in chunks, returning the
    /// total number of bytes written.
    pub fn serialize_into<T: 'static>(
        &self,
        value: &T,
        sink: impl io::Write + 'static,
    ) -> Result<u64> {
        let mut wr = JsonWriter::bind_target(Box::new(sink), DEFAULT_CHUNK_SIZE);
        self.serialize(&mut wr, value)?;
        wr.final_flush()?;
        Ok(wr.total_written())
    }

    /// Decodes a complete value from a slice.
    pub fn deserialize<T: 'static>(&self, input: &[u8]) -> Result<T> {
        let sig = TypeSignature::of::<T>();
        let reader = self
            .try_find_reader::<T>(&sig)
            .ok_or_else(|| no_converter("reader", &sig))?;
        let mut rd = self.new_reader(input);
        rd.next_token()?;
        let value = reader(&mut rd)?;
        expect_end(&mut rd)?;
        Ok(value)
    }

    /// Decodes into an existing instance through the registered binder.
    pub fn bind_into<T: 'static>(&self, input: &[u8], instance: &mut T) -> Result<()> {
        let sig = TypeSignature::of::<T>();
        let binder = self
            .try_find_binder::<T>(&sig)
            .ok_or_else(|| no_converter("binder", &sig))?;
        let mut rd = self.new_reader(input);
        rd.next_token()?;
        binder(&mut rd, instance)?;
        expect_end(&mut rd)
    }

    /// Decodes a value for a named dynamic signature.
    pub fn deserialize_named(&self, name: &str, input: &[u8]) -> Result<JsonValue> {
        let sig = TypeSignature::named(name);
        let reader = self
            .try_find_reader::<JsonValue>(&sig)
            .ok_or_else(|| no_converter("reader", &sig))?;
        let mut rd = self.new_reader(input);
        rd.next_token()?;
        let value = reader(&mut rd)?;
        expect_end(&mut rd)?;
        Ok(value)
    }

    /// Encodes a value through a named dynamic signature.
    pub fn to_bytes_named(&self, name: &str, value: &JsonValue) -> Result<Vec<u8>> {
        let sig = TypeSignature::named(name);
        let writer = self
            .try_find_writer::<JsonValue>(&sig)
            .ok_or_else(|| no_converter("writer", &sig))?;
        let mut wr = self.new_writer();
        writer(&mut wr, value)?;
        Ok(wr.into_vec())
    }
}

fn expect_end(rd: &mut JsonReader<'_>) -> Result<()> {
    if rd.at_end() {
        Ok(())
    } else {
        Err(rd.parse_error("expecting end of input"))
    }
}

fn downcast<C: Clone + 'static>(sig: &TypeSignature, kind: &str, erased: &Erased) -> Option<C> {
    match erased.downcast_ref::<C>() {
        Some(c) => Some(c.clone()),
        None => {
            log::warn!("[Json] registered {} for '{}' does not match the requested type", kind, sig);
            None
        }
    }
}

fn no_converter(kind: &str, sig: &TypeSignature) -> Error {
    Error::Configuration {
        reason: format!("unable to find {} for '{}'", kind, sig),
    }
}

fn register_defaults(json: &Arc<Json>) {
    macro_rules! builtin {
        ($t:ty, $reader:expr, $writer:expr) => {{
            let r: ReadFn<$t> = $reader;
            let w: WriteFn<$t> = $writer;
            json.register_reader(TypeSignature::of::<$t>(), r.clone());
            json.register_writer(TypeSignature::of::<$t>(), w.clone());
            json.register_reader(
                TypeSignature::of::<Option<$t>>(),
                collections::option_reader(r.clone()),
            );
            json.register_writer(
                TypeSignature::of::<Option<$t>>(),
                collections::option_writer(w.clone()),
            );
            json.register_reader(TypeSignature::of::<Vec<$t>>(), collections::vec_reader(r));
            json.register_writer(TypeSignature::of::<Vec<$t>>(), collections::vec_writer(w));
        }};
    }

    builtin!(bool, scalars::bool_reader(), scalars::bool_writer());
    builtin!(i32, scalars::i32_reader(), scalars::i32_writer());
    builtin!(i64, scalars::i64_reader(), scalars::i64_writer());
    builtin!(u32, scalars::u32_reader(), scalars::u32_writer());
    builtin!(u64, scalars::u64_reader(), scalars::u64_writer());
    builtin!(f32, scalars::f32_reader(), scalars::f32_writer());
    builtin!(f64, scalars::f64_reader(), scalars::f64_writer());
    builtin!(String, scalars::string_reader(), scalars::string_writer());
    builtin!(Decimal, scalars::decimal_reader(), scalars::decimal_writer());
    builtin!(DateTime, scalars::datetime_reader(), scalars::datetime_writer());
    builtin!(JsonValue, value_reader(), value_writer());

    // the open signature resolves to the schema-free value codec
    json.register_reader(TypeSignature::unknown(), value_reader());
    json.register_writer(TypeSignature::unknown(), value_writer());
}
