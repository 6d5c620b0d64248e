// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Concurrent converter storage.
//!
//! Converters are erased to `Arc<dyn Any>` for storage and downcast back
//! to their typed form on lookup. Registration is last-wins; lookups are
//! lock-free reads on the sharded map.

pub(crate) mod lazy;
mod signature;

pub use signature::{TypeKey, TypeSignature};

use std::any::Any;
use std::sync::Arc;

use dashmap::DashMap;

/// Type-erased converter as stored in a slot.
pub type Erased = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
struct Slot {
    reader: Option<Erased>,
    writer: Option<Erased>,
    binder: Option<Erased>,
}

#[derive(Default)]
pub(crate) struct Registry {
    slots: DashMap<TypeSignature, Slot>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    pub fn put_reader(&self, sig: TypeSignature, converter: Erased) {
        self.slots.entry(sig).or_default().reader = Some(converter);
    }

    pub fn put_writer(&self, sig: TypeSignature, converter: Erased) {
        self.slots.entry(sig).or_default().writer = Some(converter);
    }

    pub fn put_binder(&self, sig: TypeSignature, converter: Erased) {
        self.slots.entry(sig).or_default().binder = Some(converter);
    }

    pub fn reader(&self, sig: &TypeSignature) -> Option<Erased> {
        self.slots.get(sig).and_then(|s| s.reader.clone())
    }

    pub fn writer(&self, sig: &TypeSignature) -> Option<Erased> {
        self.slots.get(sig).and_then(|s| s.writer.clone())
    }

    pub fn binder(&self, sig: &TypeSignature) -> Option<Erased> {
        self.slots.get(sig).and_then(|s| s.binder.clone())
    }

    pub fn has_reader(&self, sig: &TypeSignature) -> bool {
        self.slots.get(sig).is_some_and(|s| s.reader.is_some())
    }

    pub fn has_writer(&self, sig: &TypeSignature) -> bool {
        self.slots.get(sig).is_some_and(|s| s.writer.is_some())
    }

    pub fn has_binder(&self, sig: &TypeSignature) -> bool {
        self.slots.get(sig).is_some_and(|s| s.binder.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{scalars, ReadFn};
    use crate::reader::JsonReader;

    #[test]
    fn test_last_registration_wins() {
        let reg = Registry::new();
        let sig = TypeSignature::of::<i32>();
        let first: ReadFn<i32> = scalars::i32_reader();
        let second: ReadFn<i32> = Arc::new(|rd| {
            rd.scan_number();
            Ok(-1)
        });
        reg.put_reader(sig.clone(), Arc::new(first));
        reg.put_reader(sig.clone(), Arc::new(second));

        let stored = reg.reader(&sig).expect("slot should hold a reader");
        let typed = stored
            .downcast_ref::<ReadFn<i32>>()
            .expect("stored converter should downcast")
            .clone();
        let mut rd = JsonReader::new(b"5");
        rd.next_token().expect("token");
        assert_eq!(typed(&mut rd).expect("parse"), -1);
    }

    #[test]
    fn test_reader_and_writer_slots_are_independent() {
        let reg = Registry::new();
        let sig = TypeSignature::of::<i32>();
        reg.put_reader(sig.clone(), Arc::new(scalars::i32_reader()));
        assert!(reg.has_reader(&sig));
        assert!(!reg.has_writer(&sig));
        assert!(reg.writer(&sig).is_none());
    }
}
