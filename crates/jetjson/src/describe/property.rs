// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-property decode/encode metadata.
//!
//! Each property carries two precomputed hashes of its name: a byte-sum
//! weak hash for the in-order fast path and an FNV-1a hash for randomized
//! order dispatch. `prepare` resolves hash collisions (forcing exact byte
//! comparison on the involved properties) and assigns mandatory bits.

use std::sync::Arc;

use crate::convert::{BindFn, WriteFn};
use crate::error::Error;

pub(crate) fn calc_hash(name: &[u8]) -> u32 {
    let mut hash = 0x811c_9dc5u32;
    for &b in name {
        hash ^= u32::from(b);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

pub(crate) fn calc_weak_hash(name: &[u8]) -> u32 {
    let mut hash = 0u32;
    for &b in name {
        hash = hash.wrapping_add(u32::from(b));
    }
    hash
}

/// One named member of an object format.
pub struct Property<T> {
    pub(crate) name: Box<str>,
    pub(crate) name_bytes: Box<[u8]>,
    /// `"name":` including the quotes and separator.
    pub(crate) prefix: Box<[u8]>,
    pub(crate) hash: u32,
    pub(crate) weak_hash: u32,
    pub(crate) exact_name: bool,
    pub(crate) mandatory: bool,
    /// AND mask that clears this property's mandatory bit. All ones when
    /// the property is optional.
    pub(crate) mandatory_mask: u64,
    pub(crate) write_value: WriteFn<T>,
    pub(crate) bind_value: BindFn<T>,
    /// In omit-defaults mode the whole property is skipped when this
    /// returns true.
    pub(crate) skip_default: Option<Arc<dyn Fn(&T) -> bool + Send + Sync>>,
}

impl<T> Property<T> {
    pub fn new(name: &str, write_value: WriteFn<T>, bind_value: BindFn<T>) -> Self {
        let bytes = name.as_bytes();
        let mut prefix = Vec::with_capacity(bytes.len() + 3);
        prefix.push(b'"');
        prefix.extend_from_slice(bytes);
        prefix.extend_from_slice(b"\":");
        Property {
            name: name.into(),
            name_bytes: bytes.into(),
            prefix: prefix.into_boxed_slice(),
            hash: calc_hash(bytes),
            weak_hash: calc_weak_hash(bytes),
            exact_name: false,
            mandatory: false,
            mandatory_mask: u64::MAX,
            write_value,
            bind_value,
            skip_default: None,
        }
    }

    /// Decoding fails when this property never appears in the object.
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Skip the property entirely in omit-defaults mode when the predicate
    /// holds.
    pub fn skip_when(mut self, pred: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.skip_default = Some(Arc::new(pred));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Finalizes a property list: marks collision groups for exact matching
/// and hands out mandatory bits. At most 64 mandatory properties fit the
/// tracking bitmask.
pub(crate) fn prepare<T>(mut props: Vec<Property<T>>) -> Result<(Box<[Property<T>]>, u64), Error> {
    for i in 0..props.len() {
        let collides = props
            .iter()
            .enumerate()
            .any(|(j, p)| j != i && p.hash == props[i].hash);
        if collides {
            props[i].exact_name = true;
        }
    }
    let mut mandatory_index = 0u32;
    let mut flag = 0u64;
    for p in &mut props {
        if p.mandatory {
            if mandatory_index > 63 {
                return Err(Error::Configuration {
                    reason: "only up to 64 mandatory properties are supported".into(),
                });
            }
            p.mandatory_mask = !(1u64 << mandatory_index);
            flag |= 1u64 << mandatory_index;
            mandatory_index += 1;
        }
    }
    Ok((props.into_boxed_slice(), flag))
}
