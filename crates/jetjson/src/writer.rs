// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte-level JSON writer.
//!
//! [`JsonWriter`] appends into a growable byte buffer through an explicit
//! position, so converters can reserve capacity up front and write digits
//! directly into the buffer. When bound to an output sink the accumulated
//! bytes are handed off in chunks at value boundaries; the running
//! `flushed` count plus the buffer position lets a wrapper converter detect
//! whether a nested write emitted anything at all.

use std::fmt;
use std::io;

use crate::error::Result;

const ESCAPE: [bool; 256] = {
    let mut t = [false; 256];
    let mut i = 0;
    while i < 0x20 {
        t[i] = true;
        i += 1;
    }
    t[b'"' as usize] = true;
    t[b'\\' as usize] = true;
    t
};

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Default chunk size before bytes are pushed to a bound sink.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Append-only JSON output buffer, optionally bound to an [`io::Write`] sink.
pub struct JsonWriter {
    buf: Vec<u8>,
    pos: usize,
    flushed: u64,
    target: Option<Box<dyn io::Write>>,
    chunk_size: usize,
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonWriter {
    pub fn new() -> Self {
        Self::with_capacity(512)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        JsonWriter {
            buf: vec![0; capacity.max(64)],
            pos: 0,
            flushed: 0,
            target: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Binds the writer to a sink. Bytes are pushed whenever the buffered
    /// amount crosses the chunk size and a converter reaches a value
    /// boundary; call [`Self::final_flush`] once the document is complete.
    pub fn bind_target(target: Box<dyn io::Write>, chunk_size: usize) -> Self {
        JsonWriter {
            buf: vec![0; chunk_size.max(64) * 2],
            pos: 0,
            flushed: 0,
            target: Some(target),
            chunk_size: chunk_size.max(64),
        }
    }

    /// Bytes currently buffered (not yet flushed).
    #[inline]
    pub fn size(&self) -> usize {
        self.pos
    }

    /// Bytes already pushed to the bound sink.
    #[inline]
    pub fn flushed(&self) -> u64 {
        self.flushed
    }

    /// Total bytes produced for the current document.
    #[inline]
    pub fn total_written(&self) -> u64 {
        self.flushed + self.pos as u64
    }

    fn grow(&mut self, free: usize) {
        let add = (self.buf.len() / 2).max(free);
        self.buf.resize(self.buf.len() + add, 0);
    }

    /// Guarantees `free` writable bytes past the current position and
    /// returns the whole buffer. Pair with [`Self::advance`].
    #[inline]
    pub fn ensure_capacity(&mut self, free: usize) -> &mut [u8] {
        if self.pos + free > self.buf.len() {
            self.grow(free);
        }
        &mut self.buf
    }

    /// Current write position inside the buffer returned by
    /// [`Self::ensure_capacity`].
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Commits `n` bytes written directly into the buffer.
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        if self.pos == self.buf.len() {
            self.grow(1);
        }
        self.buf[self.pos] = b;
        self.pos += 1;
    }

    /// Overwrites the most recently written byte. Used by wrapper
    /// converters to turn a trailing comma into a closing brace.
    #[inline]
    pub fn patch_last(&mut self, b: u8) {
        self.buf[self.pos - 1] = b;
    }

    /// Appends raw bytes that need no escaping.
    pub fn write_ascii(&mut self, bytes: &[u8]) {
        if self.pos + bytes.len() > self.buf.len() {
            self.grow(bytes.len());
        }
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    pub fn write_null(&mut self) {
        self.write_ascii(b"null");
    }

    /// Writes a quoted, escaped JSON string. Non-ASCII bytes pass through
    /// as UTF-8; only control characters, quotes and backslashes escape.
    pub fn write_string(&mut self, value: &str) {
        let bytes = value.as_bytes();
        // worst case is \u00xx for every byte, plus the quotes
        if self.pos + bytes.len() * 6 + 2 > self.buf.len() {
            self.grow(bytes.len() * 6 + 2);
        }
        self.buf[self.pos] = b'"';
        self.pos += 1;
        let mut start = 0;
        for (i, &b) in bytes.iter().enumerate() {
            if ESCAPE[b as usize] {
                let run = &bytes[start..i];
                self.buf[self.pos..self.pos + run.len()].copy_from_slice(run);
                self.pos += run.len();
                self.write_escaped(b);
                start = i + 1;
            }
        }
        let run = &bytes[start..];
        self.buf[self.pos..self.pos + run.len()].copy_from_slice(run);
        self.pos += run.len();
        self.buf[self.pos] = b'"';
        self.pos += 1;
    }

    fn write_escaped(&mut self, b: u8) {
        self.buf[self.pos] = b'\\';
        self.pos += 1;
        let short = match b {
            b'"' => b'"',
            b'\\' => b'\\',
            8 => b'b',
            9 => b't',
            10 => b'n',
            12 => b'f',
            13 => b'r',
            _ => {
                self.buf[self.pos..self.pos + 5]
                    .copy_from_slice(&[b'u', b'0', b'0', HEX[(b >> 4) as usize], HEX[(b & 15) as usize]]);
                self.pos += 5;
                return;
            }
        };
        self.buf[self.pos] = short;
        self.pos += 1;
    }

    /// Pushes buffered bytes to the bound sink when past the chunk size.
    /// No-op without a sink. Converters call this at value boundaries.
    pub fn maybe_flush(&mut self) -> Result<()> {
        if self.target.is_some() && self.pos >= self.chunk_size {
            self.flush_buffer()?;
        }
        Ok(())
    }

    /// Pushes all remaining bytes to the bound sink and flushes it.
    pub fn final_flush(&mut self) -> Result<()> {
        if self.target.is_some() {
            self.flush_buffer()?;
            if let Some(t) = self.target.as_mut() {
                t.flush()?;
            }
        }
        Ok(())
    }

    fn flush_buffer(&mut self) -> Result<()> {
        if let Some(t) = self.target.as_mut() {
            t.write_all(&self.buf[..self.pos])?;
            self.flushed += self.pos as u64;
            self.pos = 0;
        }
        Ok(())
    }

    /// View of the buffered document. Only meaningful without a sink.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.pos]
    }

    /// Consumes the writer, returning the buffered document.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.buf.truncate(self.pos);
        self.buf
    }

    /// Clears the buffer for the next document. Keeps the allocation.
    pub fn reset(&mut self) {
        self.pos = 0;
        self.flushed = 0;
    }
}

// Lets converters format through `write!` without an intermediate String.
impl fmt::Write for JsonWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_ascii(s.as_bytes());
        Ok(())
    }
}
