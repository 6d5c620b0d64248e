// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Two-phase registration for recursive type graphs.
//!
//! Building a description for a self referential type needs a converter
//! for that same type before it exists. The analyzer first registers a
//! forwarding handle, then builds the real converter and publishes it into
//! the handle. Calls arriving before publication block on a condvar with a
//! bounded wait; once published, delegation is a single atomic load.

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use parking_lot::{Condvar, Mutex};

use crate::convert::{BindFn, ReadFn, WriteFn};
use crate::error::{Error, Result};
use crate::reader::JsonReader;
use crate::writer::JsonWriter;

/// How long a call waits for the real converter before giving up. Only
/// relevant when another thread uses the registry mid registration.
const RESOLUTION_WAIT: Duration = Duration::from_secs(5);

pub(crate) struct Resolved<T> {
    pub read: ReadFn<T>,
    pub write: WriteFn<T>,
    pub bind: Option<BindFn<T>>,
}

pub(crate) struct LazyConverter<T> {
    type_name: Box<str>,
    resolved: ArcSwapOption<Resolved<T>>,
    lock: Mutex<()>,
    cond: Condvar,
}

impl<T: 'static> LazyConverter<T> {
    pub fn new(type_name: &str) -> Arc<Self> {
        Arc::new(LazyConverter {
            type_name: type_name.into(),
            resolved: ArcSwapOption::empty(),
            lock: Mutex::new(()),
            cond: Condvar::new(),
        })
    }

    /// Installs the real converter and wakes blocked callers.
    pub fn publish(&self, read: ReadFn<T>, write: WriteFn<T>, bind: Option<BindFn<T>>) {
        self.resolved
            .store(Some(Arc::new(Resolved { read, write, bind })));
        let _guard = self.lock.lock();
        self.cond.notify_all();
    }

    fn get(&self) -> Result<Arc<Resolved<T>>> {
        if let Some(r) = self.resolved.load_full() {
            return Ok(r);
        }
        let mut guard = self.lock.lock();
        let deadline = Instant::now() + RESOLUTION_WAIT;
        loop {
            if let Some(r) = self.resolved.load_full() {
                return Ok(r);
            }
            if Instant::now() >= deadline
                || self.cond.wait_until(&mut guard, deadline).timed_out()
            {
                if let Some(r) = self.resolved.load_full() {
                    return Ok(r);
                }
                return Err(Error::Configuration {
                    reason: format!(
                        "converter for '{}' was not published within {:?}",
                        self.type_name, RESOLUTION_WAIT
                    ),
                });
            }
        }
    }

    pub fn reader(self: &Arc<Self>) -> ReadFn<T> {
        let me = Arc::clone(self);
        Arc::new(move |rd: &mut JsonReader<'_>| (me.get()?.read)(rd))
    }

    pub fn writer(self: &Arc<Self>) -> WriteFn<T> {
        let me = Arc::clone(self);
        Arc::new(move |wr: &mut JsonWriter, v: &T| (me.get()?.write)(wr, v))
    }

    pub fn binder(self: &Arc<Self>) -> BindFn<T> {
        let me = Arc::clone(self);
        Arc::new(move |rd: &mut JsonReader<'_>, v: &mut T| {
            let resolved = me.get()?;
            match &resolved.bind {
                Some(bind) => bind(rd, v),
                None => Err(Error::Configuration {
                    reason: format!("'{}' does not support binding", me.type_name),
                }),
            }
        })
    }
}
