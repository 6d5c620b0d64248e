// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # jetjson - High-throughput JSON codec
//!
//! A JSON codec built around precomputed per-type format descriptions
//! instead of per-document reflection or intermediate trees. Types are
//! described once (named properties, positional arrays or both under a
//! `$type` discriminator) and every document after that decodes through
//! precomputed name hashes and encodes through precomputed key prefixes.
//!
//! ## Quick Start
//!
//! ```rust
//! use jetjson::{Json, Result};
//!
//! fn main() -> Result<()> {
//!     let json = Json::standard();
//!
//!     let numbers: Vec<i64> = json.deserialize(b"[1,2,3]")?;
//!     let bytes = json.to_bytes(&numbers)?;
//!     assert_eq!(bytes, b"[1,2,3]");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------+
//! |                        Json instance                          |
//! |   Settings | registry lookup | factory chain | entry points   |
//! +---------------------------------------------------------------+
//! |                     Description layer                         |
//! |   ObjectFormat | ArrayFormat | FormatDescription | Mixin      |
//! +---------------------------------------------------------------+
//! |                      Converter layer                          |
//! |   scalars | collections | erased JsonValue | lazy adapters    |
//! +---------------------------------------------------------------+
//! |                        Byte engine                            |
//! |   JsonReader | JsonWriter | digit tables | Decimal | DateTime |
//! +---------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Json`] | Shared codec instance, entry point for all conversions |
//! | [`Settings`] | Configuration builder frozen into a [`Json`] |
//! | [`ObjectFormatDescription`] | Named-property decode/encode plan |
//! | [`MixinDescription`] | Variant dispatch through a `$type` discriminator |
//! | [`JsonValue`] | Schema-free value model for dynamic content |
//! | [`Decimal`] | Digit-exact fixed point number, up to 38 digits |

pub mod analyze;
pub mod convert;
pub mod describe;
pub mod error;
pub mod json;
pub mod num;
pub mod reader;
pub mod registry;
pub mod writer;

pub use analyze::{EnumSchema, FieldSchema, TypeSchema};
pub use convert::{BindFn, JsonValue, ReadFn, WriteFn};
pub use describe::{
    ArrayFormatDescription, FormatConverter, FormatDescription, MixinDescription,
    ObjectFormatBuilder, ObjectFormatDescription, Property,
};
pub use error::{Error, Result};
pub use json::{ConverterFactory, Json, Settings};
pub use num::{DateTime, Decimal};
pub use reader::JsonReader;
pub use registry::{TypeKey, TypeSignature};
pub use writer::JsonWriter;
