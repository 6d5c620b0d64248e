// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte-level JSON tokenizer.
//!
//! [`JsonReader`] walks a borrowed byte slice one significant byte at a
//! time. The last significant byte stays available through [`JsonReader::last`]
//! so converters can dispatch on it without re-reading, and object keys are
//! hashed in place (no allocation) for the property dispatch in the
//! description layer.
//!
//! Conventions shared with the converters built on top:
//! - [`JsonReader::next_token`] skips ASCII whitespace and leaves the token
//!   byte in `last`.
//! - after a number scan the cursor points at the delimiter byte, so the
//!   following `next_token` re-reads it.
//! - after a string parse the cursor points just past the closing quote.

use crate::error::{Error, Result};

const WHITESPACE: [bool; 256] = {
    let mut t = [false; 256];
    t[b' ' as usize] = true;
    t[b'\t' as usize] = true;
    t[b'\n' as usize] = true;
    t[b'\r' as usize] = true;
    t
};

/// Default cap for a single decoded string, in bytes.
pub const DEFAULT_MAX_STRING_SIZE: usize = 64 * 1024 * 1024;

/// Forward-only cursor over a JSON document held in memory.
pub struct JsonReader<'a> {
    buf: &'a [u8],
    index: usize,
    last: u8,
    /// First byte of the most recent name/string span (past the quote).
    token_start: usize,
    /// One past the closing quote of that span.
    name_end: usize,
    scratch: Vec<u8>,
    max_string_size: usize,
}

impl<'a> JsonReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_limit(buf, DEFAULT_MAX_STRING_SIZE)
    }

    /// Creates a reader with an explicit per-string size cap.
    pub fn with_limit(buf: &'a [u8], max_string_size: usize) -> Self {
        JsonReader {
            buf,
            index: 0,
            last: b' ',
            token_start: 0,
            name_end: 0,
            scratch: Vec::with_capacity(64),
            max_string_size,
        }
    }

    /// Last significant byte consumed.
    #[inline]
    pub fn last(&self) -> u8 {
        self.last
    }

    /// Bytes consumed so far. Used as the offset in decode errors.
    #[inline]
    pub fn position(&self) -> u64 {
        self.index as u64
    }

    /// Offset of the `last` byte, for errors that point at the current token.
    #[inline]
    fn token_position(&self) -> u64 {
        self.index.saturating_sub(1) as u64
    }

    /// Consumes and returns the next byte.
    #[inline]
    pub fn read(&mut self) -> Result<u8> {
        if self.index >= self.buf.len() {
            return Err(Error::UnexpectedEnd {
                offset: self.index as u64,
            });
        }
        self.last = self.buf[self.index];
        self.index += 1;
        Ok(self.last)
    }

    /// Advances past ASCII whitespace and returns the next token byte.
    pub fn next_token(&mut self) -> Result<u8> {
        let mut b = self.read()?;
        while WHITESPACE[b as usize] {
            b = self.read()?;
        }
        Ok(b)
    }

    /// True when no significant bytes remain.
    pub fn at_end(&mut self) -> bool {
        while self.index < self.buf.len() {
            if !WHITESPACE[self.buf[self.index] as usize] {
                return false;
            }
            self.index += 1;
        }
        true
    }

    /// Error for a structural mismatch at the current token.
    pub fn expecting(&self, expected: &'static str) -> Error {
        Error::UnexpectedToken {
            offset: self.token_position(),
            expected,
            found: self.last,
        }
    }

    /// Error with a free-form reason at the current position.
    pub fn parse_error(&self, reason: impl Into<String>) -> Error {
        Error::Parse {
            offset: self.token_position(),
            reason: reason.into(),
        }
    }

    /// If the current token starts a `null` literal, consumes it.
    pub fn was_null(&mut self) -> Result<bool> {
        if self.last != b'n' {
            return Ok(false);
        }
        if self.buf.len() >= self.index + 3 && &self.buf[self.index..self.index + 3] == b"ull" {
            self.index += 3;
            self.last = b'l';
            Ok(true)
        } else {
            Err(self.parse_error("invalid null literal"))
        }
    }

    /// If the current token starts a `true` literal, consumes it.
    pub fn was_true(&mut self) -> Result<bool> {
        if self.last != b't' {
            return Ok(false);
        }
        if self.buf.len() >= self.index + 3 && &self.buf[self.index..self.index + 3] == b"rue" {
            self.index += 3;
            self.last = b'e';
            Ok(true)
        } else {
            Err(self.parse_error("invalid true literal"))
        }
    }

    /// If the current token starts a `false` literal, consumes it.
    pub fn was_false(&mut self) -> Result<bool> {
        if self.last != b'f' {
            return Ok(false);
        }
        if self.buf.len() >= self.index + 4 && &self.buf[self.index..self.index + 4] == b"alse" {
            self.index += 4;
            self.last = b'e';
            Ok(true)
        } else {
            Err(self.parse_error("invalid false literal"))
        }
    }

    /// Scans a number token. `last` must hold its first byte.
    ///
    /// Returns the raw span and the offset of its first byte. The cursor is
    /// left AT the delimiter, so the next `next_token` consumes it.
    pub fn scan_number(&mut self) -> (&'a [u8], u64) {
        let start = self.index - 1;
        let mut ci = self.index;
        while ci < self.buf.len() {
            match self.buf[ci] {
                b',' | b'}' | b']' | b' ' | b'\t' | b'\n' | b'\r' => break,
                _ => ci += 1,
            }
        }
        self.index = ci;
        (&self.buf[start..ci], start as u64)
    }

    /// Decodes a JSON string into the internal scratch buffer.
    ///
    /// `last` must be the opening quote. Escapes (including `\uXXXX` with
    /// surrogate pairs) are resolved; the result is validated as UTF-8.
    pub fn read_string(&mut self) -> Result<&str> {
        self.parse_string()?;
        std::str::from_utf8(&self.scratch)
            .map_err(|_| self.parse_error("string is not valid UTF-8"))
    }

    /// Reads an object key: string, then the `:` separator, then positions
    /// the cursor at the first byte of the value.
    pub fn read_key(&mut self) -> Result<String> {
        let key = self.read_string()?.to_owned();
        if self.next_token()? != b':' {
            return Err(self.expecting("':'"));
        }
        self.next_token()?;
        Ok(key)
    }

    fn parse_string(&mut self) -> Result<()> {
        if self.last != b'"' {
            return Err(self.expecting("'\"'"));
        }
        self.scratch.clear();
        loop {
            let b = self.read()?;
            match b {
                b'"' => return Ok(()),
                b'\\' => {
                    let esc = self.read()?;
                    match esc {
                        b'"' | b'\\' | b'/' => self.scratch.push(esc),
                        b'b' => self.scratch.push(8),
                        b't' => self.scratch.push(9),
                        b'n' => self.scratch.push(10),
                        b'f' => self.scratch.push(12),
                        b'r' => self.scratch.push(13),
                        b'u' => {
                            let cp = self.read_unicode_escape()?;
                            let mut tmp = [0u8; 4];
                            self.scratch
                                .extend_from_slice(cp.encode_utf8(&mut tmp).as_bytes());
                        }
                        _ => return Err(self.parse_error("invalid escape sequence")),
                    }
                }
                _ => self.scratch.push(b),
            }
            if self.scratch.len() > self.max_string_size {
                return Err(self.parse_error("maximum string size limit exceeded"));
            }
        }
    }

    fn read_unicode_escape(&mut self) -> Result<char> {
        let high = self.read_hex4()?;
        let cp = if (0xD800..=0xDBFF).contains(&high) {
            // High surrogate; a low surrogate escape must follow.
            if self.read()? != b'\\' || self.read()? != b'u' {
                return Err(self.parse_error("truncated surrogate pair in \\u escape"));
            }
            let low = self.read_hex4()?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(self.parse_error("invalid low surrogate in \\u escape"));
            }
            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
        } else if (0xDC00..=0xDFFF).contains(&high) {
            return Err(self.parse_error("unpaired low surrogate in \\u escape"));
        } else {
            high
        };
        char::from_u32(cp).ok_or_else(|| self.parse_error("invalid \\u escape"))
    }

    fn read_hex4(&mut self) -> Result<u32> {
        let mut v = 0u32;
        for _ in 0..4 {
            let b = self.read()?;
            let d = match b {
                b'0'..=b'9' => u32::from(b - b'0'),
                b'a'..=b'f' => u32::from(b - b'a' + 10),
                b'A'..=b'F' => u32::from(b - b'A' + 10),
                _ => return Err(self.parse_error("invalid hex digit in \\u escape")),
            };
            v = (v << 4) | d;
        }
        Ok(v)
    }

    /// Span of a quoted token that is assumed escape-free (numbers in
    /// quotes, timestamps). Much cheaper than a full string parse.
    pub fn read_simple_span(&mut self) -> Result<&'a [u8]> {
        if self.last != b'"' {
            return Err(self.expecting("'\"'"));
        }
        let start = self.index;
        loop {
            if self.read()? == b'"' {
                return Ok(&self.buf[start..self.index - 1]);
            }
        }
    }

    /// Hashes an object key with the full FNV-1a hash and consumes the
    /// trailing `':'`. `last` must be the opening quote.
    pub fn fill_name(&mut self) -> Result<u32> {
        let hash = self.calc_hash()?;
        if self.next_token()? != b':' {
            return Err(self.expecting("':'"));
        }
        Ok(hash)
    }

    /// Hashes an object key with the cheap byte-sum hash and consumes the
    /// trailing `':'`. The span is retained for [`Self::last_name_hash`] and
    /// [`Self::was_last_name`].
    pub fn fill_name_weak_hash(&mut self) -> Result<u32> {
        if self.last != b'"' {
            return Err(self.expecting("'\"'"));
        }
        self.token_start = self.index;
        let mut hash = 0u32;
        loop {
            let b = self.read()?;
            if b == b'"' {
                break;
            }
            hash = hash.wrapping_add(u32::from(b));
        }
        self.name_end = self.index;
        if self.next_token()? != b':' {
            return Err(self.expecting("':'"));
        }
        Ok(hash)
    }

    /// FNV-1a hash of the quoted token at the cursor, without consuming a
    /// `':'`. Used for keys (via [`Self::fill_name`]) and for mixin
    /// discriminator values.
    pub fn calc_hash(&mut self) -> Result<u32> {
        if self.last != b'"' {
            return Err(self.expecting("'\"'"));
        }
        self.token_start = self.index;
        let mut hash = 0x811c_9dc5u32;
        loop {
            let b = self.read()?;
            if b == b'"' {
                break;
            }
            hash ^= u32::from(b);
            hash = hash.wrapping_mul(0x0100_0193);
        }
        self.name_end = self.index;
        Ok(hash)
    }

    /// Strong hash of the span captured by the last weak-hash scan.
    pub fn last_name_hash(&self) -> u32 {
        let mut hash = 0x811c_9dc5u32;
        for &b in &self.buf[self.token_start..self.name_end - 1] {
            hash ^= u32::from(b);
            hash = hash.wrapping_mul(0x0100_0193);
        }
        hash
    }

    /// Exact byte comparison against the span captured by the last name scan.
    pub fn was_last_name(&self, name: &[u8]) -> bool {
        self.name_end > self.token_start && &self.buf[self.token_start..self.name_end - 1] == name
    }

    /// The last scanned name, for error messages.
    pub fn last_name(&self) -> String {
        String::from_utf8_lossy(&self.buf[self.token_start..self.name_end.saturating_sub(1)])
            .into_owned()
    }

    /// Skips one whole value (scalar, object or array) and returns the token
    /// after it.
    pub fn skip(&mut self) -> Result<u8> {
        match self.last {
            b'"' => {
                self.parse_string()?;
                self.next_token()
            }
            b'{' => {
                let mut next = self.next_token()?;
                if next == b'}' {
                    return self.next_token();
                }
                loop {
                    if next != b'"' {
                        return Err(self.expecting("'\"'"));
                    }
                    self.fill_name_weak_hash()?;
                    self.next_token()?;
                    next = self.skip()?;
                    if next != b',' {
                        break;
                    }
                    next = self.next_token()?;
                }
                if next != b'}' {
                    return Err(self.expecting("'}'"));
                }
                self.next_token()
            }
            b'[' => {
                let mut next = self.next_token()?;
                if next == b']' {
                    return self.next_token();
                }
                loop {
                    next = self.skip()?;
                    if next != b',' {
                        break;
                    }
                    self.next_token()?;
                }
                if next != b']' {
                    return Err(self.expecting("']'"));
                }
                self.next_token()
            }
            b'n' => {
                self.was_null()?;
                self.next_token()
            }
            b't' => {
                self.was_true()?;
                self.next_token()
            }
            b'f' => {
                self.was_false()?;
                self.next_token()
            }
            _ => {
                // numbers end at a delimiter
                self.scan_number();
                self.next_token()
            }
        }
    }

    /// Verifies the current token closes an array.
    pub fn check_array_end(&self) -> Result<()> {
        if self.last != b']' {
            if self.index >= self.buf.len() {
                return Err(Error::UnexpectedEnd {
                    offset: self.index as u64,
                });
            }
            return Err(self.expecting("']'"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_token_skips_whitespace() {
        let mut rd = JsonReader::new(b"  \t\n {");
        assert_eq!(rd.next_token().expect("token should parse"), b'{');
        assert_eq!(rd.last(), b'{');
    }

    #[test]
    fn test_read_past_end_fails() {
        let mut rd = JsonReader::new(b"1");
        rd.next_token().expect("first byte should read");
        assert!(matches!(rd.read(), Err(Error::UnexpectedEnd { offset: 1 })));
    }

    #[test]
    fn test_literals() {
        let mut rd = JsonReader::new(b"null true false");
        rd.next_token().expect("token");
        assert!(rd.was_null().expect("null should parse"));
        rd.next_token().expect("token");
        assert!(rd.was_true().expect("true should parse"));
        rd.next_token().expect("token");
        assert!(rd.was_false().expect("false should parse"));
    }

    #[test]
    fn test_truncated_null_is_an_error() {
        let mut rd = JsonReader::new(b"nul");
        rd.next_token().expect("token");
        assert!(rd.was_null().is_err());
    }

    #[test]
    fn test_scan_number_leaves_cursor_at_delimiter() {
        let mut rd = JsonReader::new(b"123, 4");
        rd.next_token().expect("token");
        let (span, offset) = rd.scan_number();
        assert_eq!(span, b"123");
        assert_eq!(offset, 0);
        // the delimiter comma is re-read by the next token scan
        assert_eq!(rd.next_token().expect("token"), b',');
    }

    #[test]
    fn test_read_string_plain_and_escaped() {
        let mut rd = JsonReader::new(br#""a\tb\"c\\dA""#);
        rd.next_token().expect("token");
        assert_eq!(rd.read_string().expect("string should parse"), "a\tb\"c\\dA");
    }

    #[test]
    fn test_read_string_surrogate_pair() {
        let mut rd = JsonReader::new(br#""\ud83d\ude00""#);
        rd.next_token().expect("token");
        assert_eq!(rd.read_string().expect("string should parse"), "\u{1F600}");

        // the same code point as raw UTF-8 passes through untouched
        let doc = "\"\u{1F600}\"".to_owned();
        let mut rd = JsonReader::new(doc.as_bytes());
        rd.next_token().expect("token");
        assert_eq!(rd.read_string().expect("string should parse"), "\u{1F600}");
    }

    #[test]
    fn test_unpaired_surrogate_is_an_error() {
        let mut rd = JsonReader::new(br#""\ud83d x""#);
        rd.next_token().expect("token");
        assert!(rd.read_string().is_err());
    }

    #[test]
    fn test_string_limit_enforced() {
        let doc = br#""aaaaaaaaaa""#;
        let mut rd = JsonReader::with_limit(doc, 4);
        rd.next_token().expect("token");
        assert!(rd.read_string().is_err());
    }

    #[test]
    fn test_unterminated_string_reports_end() {
        let mut rd = JsonReader::new(br#""abc"#);
        rd.next_token().expect("token");
        assert!(matches!(
            rd.read_string(),
            Err(Error::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn test_fill_name_hashes_and_consumes_colon() {
        let mut rd = JsonReader::new(br#""abc": 1"#);
        rd.next_token().expect("token");
        let strong = rd.fill_name().expect("name should parse");
        // FNV-1a of "abc"
        assert_eq!(strong, 0x1a47_e90b);
        assert_eq!(rd.next_token().expect("token"), b'1');
    }

    #[test]
    fn test_weak_hash_retains_span() {
        let mut rd = JsonReader::new(br#""abc":1"#);
        rd.next_token().expect("token");
        let weak = rd.fill_name_weak_hash().expect("name should parse");
        assert_eq!(weak, u32::from(b'a') + u32::from(b'b') + u32::from(b'c'));
        assert!(rd.was_last_name(b"abc"));
        assert!(!rd.was_last_name(b"abd"));
        assert_eq!(rd.last_name_hash(), 0x1a47_e90b);
        assert_eq!(rd.last_name(), "abc");
    }

    #[test]
    fn test_skip_whole_values() {
        let mut rd = JsonReader::new(br#"{"a":[1,{"b":"x"},null],"c":2} "#);
        rd.next_token().expect("token");
        assert_eq!(rd.next_token().expect("token"), b'"');
        rd.fill_name_weak_hash().expect("name");
        rd.next_token().expect("token");
        // skip the array value of "a"; next token is the comma before "c"
        assert_eq!(rd.skip().expect("skip should succeed"), b',');
    }

    #[test]
    fn test_skip_rejects_misspelled_literals() {
        for doc in [&b"nul,"[..], b"ture,", b"fals,"] {
            let mut rd = JsonReader::new(doc);
            rd.next_token().expect("token");
            assert!(rd.skip().is_err(), "skip accepted {:?}", doc);
        }
        let mut rd = JsonReader::new(b"[null,true,false],");
        rd.next_token().expect("token");
        assert_eq!(rd.skip().expect("skip should succeed"), b',');
    }

    #[test]
    fn test_read_simple_span() {
        let mut rd = JsonReader::new(br#""2026-01-02""#);
        rd.next_token().expect("token");
        assert_eq!(
            rd.read_simple_span().expect("span should parse"),
            b"2026-01-02"
        );
    }

    #[test]
    fn test_at_end() {
        let mut rd = JsonReader::new(b"1  \n ");
        rd.next_token().expect("token");
        rd.scan_number();
        assert!(rd.at_end());
    }
}
