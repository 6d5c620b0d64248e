// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy shared by the reader, writer and registry layers.
//!
//! Decode errors carry the absolute input offset (bytes consumed across
//! flushed chunks plus the position inside the current buffer) so callers
//! can point at the offending byte in the original document.

use std::fmt;
use std::io;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error raised while encoding, decoding or configuring converters.
#[derive(Debug, Clone)]
pub enum Error {
    /// Malformed input that does not fit a more specific variant.
    Parse { offset: u64, reason: String },
    /// A structural token differed from what the grammar requires.
    UnexpectedToken {
        offset: u64,
        expected: &'static str,
        found: u8,
    },
    /// Input ended inside a token or an unfinished structure.
    UnexpectedEnd { offset: u64 },
    /// Strict decoding met a property the description does not know.
    UnknownProperty { offset: u64, name: String },
    /// One or more mandatory properties never appeared in the object.
    MissingMandatory { offset: u64, names: Vec<String> },
    /// Registry misuse: unresolved converter, bad registration, timeout.
    Configuration { reason: String },
    /// Encoding failure, including not-null violations and sink errors.
    Serialization { reason: String },
}

impl Error {
    /// Absolute input offset for decode errors, `None` for config/encode errors.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Error::Parse { offset, .. }
            | Error::UnexpectedToken { offset, .. }
            | Error::UnexpectedEnd { offset }
            | Error::UnknownProperty { offset, .. }
            | Error::MissingMandatory { offset, .. } => Some(*offset),
            Error::Configuration { .. } | Error::Serialization { .. } => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse { offset, reason } => {
                write!(f, "{} at position: {}", reason, offset)
            }
            Error::UnexpectedToken {
                offset,
                expected,
                found,
            } => {
                if found.is_ascii_graphic() {
                    write!(
                        f,
                        "expecting {} at position: {}, found: '{}'",
                        expected, offset, *found as char
                    )
                } else {
                    write!(
                        f,
                        "expecting {} at position: {}, found byte: 0x{:02x}",
                        expected, offset, found
                    )
                }
            }
            Error::UnexpectedEnd { offset } => {
                write!(f, "unexpected end of input at position: {}", offset)
            }
            Error::UnknownProperty { offset, name } => {
                write!(f, "unknown property '{}' at position: {}", name, offset)
            }
            Error::MissingMandatory { offset, names } => {
                write!(
                    f,
                    "mandatory properties ({}) not found at position: {}",
                    names.join(", "),
                    offset
                )
            }
            Error::Configuration { reason } => write!(f, "configuration error: {}", reason),
            Error::Serialization { reason } => write!(f, "serialization error: {}", reason),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Serialization {
            reason: format!("target write failed: {}", e),
        }
    }
}
