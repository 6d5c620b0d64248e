// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural type signatures: the registry's lookup key.
//!
//! A signature is a head kind plus ordered arguments, so `List(Named(A))`
//! and `List(Named(B))` occupy distinct slots. Rust types key on their
//! `TypeId`; dynamic (schema-driven) types key on a name. Placeholders let
//! generic registrations be specialized per use site, and the unknown
//! marker routes to the schema-free value codec.

use std::any::{type_name, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKey {
    /// A concrete Rust type.
    Rust(TypeId),
    /// A dynamic type known only by name.
    Named(Arc<str>),
    /// Homogeneous sequence; the element is the only argument.
    List,
    /// String keyed map; arguments are key and value.
    Map,
    /// Erased content, decoded as a schema-free value.
    Unknown,
    /// Placeholder resolved by [`TypeSignature::bind_params`].
    Param(u8),
}

/// Registry lookup key. Equality and hashing ignore the display label.
#[derive(Clone, Debug)]
pub struct TypeSignature {
    key: TypeKey,
    args: Vec<TypeSignature>,
    label: Cow<'static, str>,
}

impl PartialEq for TypeSignature {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.args == other.args
    }
}

impl Eq for TypeSignature {}

impl Hash for TypeSignature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.args.hash(state);
    }
}

impl TypeSignature {
    /// Signature of a concrete Rust type.
    pub fn of<T: 'static>() -> Self {
        TypeSignature {
            key: TypeKey::Rust(TypeId::of::<T>()),
            args: Vec::new(),
            label: Cow::Borrowed(type_name::<T>()),
        }
    }

    /// Signature of a dynamic type known by name.
    pub fn named(name: &str) -> Self {
        TypeSignature {
            key: TypeKey::Named(Arc::from(name)),
            args: Vec::new(),
            label: Cow::Owned(name.to_owned()),
        }
    }

    pub fn list(element: TypeSignature) -> Self {
        let label = format!("list<{}>", element.label);
        TypeSignature {
            key: TypeKey::List,
            args: vec![element],
            label: Cow::Owned(label),
        }
    }

    pub fn map(key: TypeSignature, value: TypeSignature) -> Self {
        let label = format!("map<{}, {}>", key.label, value.label);
        TypeSignature {
            key: TypeKey::Map,
            args: vec![key, value],
            label: Cow::Owned(label),
        }
    }

    pub fn unknown() -> Self {
        TypeSignature {
            key: TypeKey::Unknown,
            args: Vec::new(),
            label: Cow::Borrowed("unknown"),
        }
    }

    pub fn param(index: u8) -> Self {
        TypeSignature {
            key: TypeKey::Param(index),
            args: Vec::new(),
            label: Cow::Owned(format!("${}", index)),
        }
    }

    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    pub fn args(&self) -> &[TypeSignature] {
        &self.args
    }

    /// The dynamic type name, when this is a named signature.
    pub fn name(&self) -> Option<&str> {
        match &self.key {
            TypeKey::Named(n) => Some(n),
            _ => None,
        }
    }

    /// Substitutes placeholders with the given actual signatures.
    /// Placeholders without a matching actual stay in place.
    pub fn bind_params(&self, actual: &[TypeSignature]) -> TypeSignature {
        match self.key {
            TypeKey::Param(i) => actual
                .get(i as usize)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            _ => TypeSignature {
                key: self.key.clone(),
                args: self.args.iter().map(|a| a.bind_params(actual)).collect(),
                label: self.label.clone(),
            },
        }
    }

    /// True when the signature tree contains an unknown or placeholder
    /// marker anywhere.
    pub fn is_open(&self) -> bool {
        matches!(self.key, TypeKey::Unknown | TypeKey::Param(_))
            || self.args.iter().any(TypeSignature::is_open)
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}
