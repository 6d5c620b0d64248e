// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Converter building blocks.
//!
//! Converters are plain function objects behind `Arc`, so a registered
//! codec, a lambda and a description-layer format all share one calling
//! convention. The adapters here lift a value codec into a property codec
//! (getter on write, setter on bind), including lazy variants that resolve
//! through the registry on first use for self referential types.

pub mod collections;
pub mod scalars;
pub mod value;

pub use value::JsonValue;

use std::sync::{Arc, Weak};

use arc_swap::ArcSwapOption;

use crate::error::{Error, Result};
use crate::json::Json;
use crate::reader::JsonReader;
use crate::registry::TypeSignature;
use crate::writer::JsonWriter;

/// Decodes a value; the cursor sits on the value's first token byte.
pub type ReadFn<T> = Arc<dyn Fn(&mut JsonReader<'_>) -> Result<T> + Send + Sync>;

/// Encodes a value into the writer.
pub type WriteFn<T> = Arc<dyn Fn(&mut JsonWriter, &T) -> Result<()> + Send + Sync>;

/// Decodes into an existing instance instead of producing a fresh one.
pub type BindFn<T> = Arc<dyn Fn(&mut JsonReader<'_>, &mut T) -> Result<()> + Send + Sync>;

/// Property writer from a borrowing getter and a value codec.
pub fn write_property<T, R, G>(get: G, codec: WriteFn<R>) -> WriteFn<T>
where
    R: 'static,
    G: for<'x> Fn(&'x T) -> &'x R + Send + Sync + 'static,
{
    Arc::new(move |wr, v| codec(wr, get(v)))
}

/// Property writer for getters that produce the value (projections,
/// derived fields).
pub fn write_computed<T, R, G>(get: G, codec: WriteFn<R>) -> WriteFn<T>
where
    R: 'static,
    G: Fn(&T) -> R + Send + Sync + 'static,
{
    Arc::new(move |wr, v| codec(wr, &get(v)))
}

/// Property writer that refuses to encode an absent value.
pub fn write_property_not_null<T, R, G>(name: &str, get: G, codec: WriteFn<R>) -> WriteFn<T>
where
    R: 'static,
    G: for<'x> Fn(&'x T) -> &'x Option<R> + Send + Sync + 'static,
{
    let name = name.to_owned();
    Arc::new(move |wr, v| match get(v) {
        Some(inner) => codec(wr, inner),
        None => Err(Error::Serialization {
            reason: format!("property '{}' is marked not-null but holds no value", name),
        }),
    })
}

/// Property binder from a setter and a value codec.
pub fn bind_property<T, R, S>(set: S, codec: ReadFn<R>) -> BindFn<T>
where
    R: 'static,
    S: Fn(&mut T, R) + Send + Sync + 'static,
{
    Arc::new(move |rd, v| {
        set(v, codec(rd)?);
        Ok(())
    })
}

/// Property binder that rejects an explicit `null` for the value,
/// reporting the property by name.
pub fn bind_property_not_null<T, R, S>(name: &str, set: S, codec: ReadFn<R>) -> BindFn<T>
where
    R: 'static,
    S: Fn(&mut T, R) + Send + Sync + 'static,
{
    let name = name.to_owned();
    Arc::new(move |rd, v| {
        if rd.was_null()? {
            return Err(rd.parse_error(format!("null found for non-null property '{}'", name)));
        }
        set(v, codec(rd)?);
        Ok(())
    })
}

struct CachedWrite<R>(WriteFn<R>);
struct CachedRead<R>(ReadFn<R>);

/// Property writer whose value codec is looked up in the registry on first
/// use and cached. Needed when the value type's converter is registered
/// after this one (self referential or mutually recursive types).
pub fn write_property_lazy<T, R, G>(json: &Arc<Json>, sig: TypeSignature, get: G) -> WriteFn<T>
where
    R: 'static,
    G: for<'x> Fn(&'x T) -> &'x R + Send + Sync + 'static,
{
    let registry: Weak<Json> = Arc::downgrade(json);
    let cache: ArcSwapOption<CachedWrite<R>> = ArcSwapOption::empty();
    Arc::new(move |wr, v| {
        let codec = match cache.load_full() {
            Some(c) => c,
            None => {
                let json = registry.upgrade().ok_or_else(registry_gone)?;
                let w = json
                    .try_find_writer::<R>(&sig)
                    .ok_or_else(|| unresolved("writer", &sig))?;
                let c = Arc::new(CachedWrite(w));
                cache.store(Some(c.clone()));
                c
            }
        };
        (codec.0)(wr, get(v))
    })
}

/// Binder counterpart of [`write_property_lazy`].
pub fn bind_property_lazy<T, R, S>(json: &Arc<Json>, sig: TypeSignature, set: S) -> BindFn<T>
where
    R: 'static,
    S: Fn(&mut T, R) + Send + Sync + 'static,
{
    let registry: Weak<Json> = Arc::downgrade(json);
    let cache: ArcSwapOption<CachedRead<R>> = ArcSwapOption::empty();
    Arc::new(move |rd, v| {
        let codec = match cache.load_full() {
            Some(c) => c,
            None => {
                let json = registry.upgrade().ok_or_else(registry_gone)?;
                let r = json
                    .try_find_reader::<R>(&sig)
                    .ok_or_else(|| unresolved("reader", &sig))?;
                let c = Arc::new(CachedRead(r));
                cache.store(Some(c.clone()));
                c
            }
        };
        set(v, (codec.0)(rd)?);
        Ok(())
    })
}

fn registry_gone() -> Error {
    Error::Configuration {
        reason: "converter registry was dropped".into(),
    }
}

fn unresolved(kind: &str, sig: &TypeSignature) -> Error {
    Error::Configuration {
        reason: format!("unable to find {} for {}", kind, sig),
    }
}
