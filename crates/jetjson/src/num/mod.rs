// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Digit-exact numeric codec.
//!
//! Integers are written through a precomputed three-digit group table
//! straight into the writer's buffer, and parsed from the raw number span
//! with an accumulator fast path. Spans that exceed the fast-path digit
//! budget, or that carry a fraction or exponent, fall back to the
//! arbitrary-precision [`Decimal`] path so no value is silently rounded.

mod date;
mod decimal;

pub use date::DateTime;
pub use decimal::Decimal;

use std::fmt::Write as _;

use crate::error::{Error, Result};
use crate::reader::JsonReader;
use crate::writer::JsonWriter;

/// Packed three-digit groups: high byte holds how many leading digits of
/// the group are insignificant when it is the first group of a number.
const DIGITS: [u32; 1000] = build_digits();

const fn build_digits() -> [u32; 1000] {
    let mut t = [0u32; 1000];
    let mut i = 0usize;
    while i < 1000 {
        let marker: u32 = if i < 10 {
            2
        } else if i < 100 {
            1
        } else {
            0
        };
        t[i] = (marker << 24)
            | (((i / 100) as u32 + b'0' as u32) << 16)
            | ((((i / 10) % 10) as u32 + b'0' as u32) << 8)
            | ((i % 10) as u32 + b'0' as u32);
        i += 1;
    }
    t
}

#[inline]
fn write_first_group(buf: &mut [u8], pos: usize, g: u32) -> usize {
    let skip = (g >> 24) as usize;
    let mut p = pos;
    if skip == 0 {
        buf[p] = (g >> 16) as u8;
        buf[p + 1] = (g >> 8) as u8;
        p += 2;
    } else if skip == 1 {
        buf[p] = (g >> 8) as u8;
        p += 1;
    }
    buf[p] = g as u8;
    p + 1
}

#[inline]
fn write_group(buf: &mut [u8], pos: usize, g: u32) {
    buf[pos] = (g >> 16) as u8;
    buf[pos + 1] = (g >> 8) as u8;
    buf[pos + 2] = g as u8;
}

/// Writes the decimal digits of `v` at `pos`, returning the new position.
pub(crate) fn put_u64(buf: &mut [u8], pos: usize, mut v: u64) -> usize {
    let mut groups = [0u32; 7];
    let mut n = 0;
    loop {
        groups[n] = DIGITS[(v % 1000) as usize];
        v /= 1000;
        n += 1;
        if v == 0 {
            break;
        }
    }
    let mut p = write_first_group(buf, pos, groups[n - 1]);
    let mut i = n - 1;
    while i > 0 {
        i -= 1;
        write_group(buf, p, groups[i]);
        p += 3;
    }
    p
}

/// Two digits, zero padded. `v` must be below 100.
pub(crate) fn put2(buf: &mut [u8], pos: usize, v: u32) {
    let g = DIGITS[v as usize];
    buf[pos] = (g >> 8) as u8;
    buf[pos + 1] = g as u8;
}

/// Three digits, zero padded. `v` must be below 1000.
pub(crate) fn put3(buf: &mut [u8], pos: usize, v: u32) {
    write_group(buf, pos, DIGITS[v as usize]);
}

/// Four digits, zero padded. `v` must be below 10000.
pub(crate) fn put4(buf: &mut [u8], pos: usize, v: u32) {
    put2(buf, pos, v / 100);
    put2(buf, pos + 2, v % 100);
}

pub fn write_u64(wr: &mut JsonWriter, v: u64) {
    let pos = wr.pos();
    let buf = wr.ensure_capacity(20);
    let end = put_u64(buf, pos, v);
    wr.advance(end - pos);
}

pub fn write_u32(wr: &mut JsonWriter, v: u32) {
    write_u64(wr, u64::from(v));
}

pub fn write_i64(wr: &mut JsonWriter, v: i64) {
    let mut pos = wr.pos();
    let buf = wr.ensure_capacity(21);
    if v < 0 {
        buf[pos] = b'-';
        pos += 1;
    }
    let end = put_u64(buf, pos, v.unsigned_abs());
    wr.advance(end - wr.pos());
}

pub fn write_i32(wr: &mut JsonWriter, v: i32) {
    write_i64(wr, i64::from(v));
}

/// Finite doubles print in shortest round-trip form; non-finite values are
/// written as quoted literals so the document stays valid JSON.
pub fn write_f64(wr: &mut JsonWriter, v: f64) {
    if v.is_finite() {
        let _ = write!(wr, "{}", v);
    } else if v.is_nan() {
        wr.write_ascii(b"\"NaN\"");
    } else if v > 0.0 {
        wr.write_ascii(b"\"Infinity\"");
    } else {
        wr.write_ascii(b"\"-Infinity\"");
    }
}

pub fn write_f32(wr: &mut JsonWriter, v: f32) {
    if v.is_finite() {
        let _ = write!(wr, "{}", v);
    } else {
        write_f64(wr, f64::from(v));
    }
}

pub fn write_decimal(wr: &mut JsonWriter, v: &Decimal) {
    let _ = write!(wr, "{}", v);
}

/// Number span at the cursor; quoted numbers are accepted for interop with
/// writers that quote to avoid precision loss downstream.
fn number_span<'a>(rd: &mut JsonReader<'a>) -> Result<(&'a [u8], u64)> {
    if rd.last() == b'"' {
        let start = rd.position();
        let span = rd.read_simple_span()?;
        Ok((span, start))
    } else {
        Ok(rd.scan_number())
    }
}

fn parse_err(offset: u64, reason: &str) -> Error {
    Error::Parse {
        offset,
        reason: reason.into(),
    }
}

/// Digit budget below which the integer fast path cannot overflow an u64
/// accumulator.
const FAST_INT_DIGITS: usize = 18;

pub fn read_i64(rd: &mut JsonReader<'_>) -> Result<i64> {
    let (span, offset) = number_span(rd)?;
    parse_i64(span, offset)
}

fn parse_i64(span: &[u8], offset: u64) -> Result<i64> {
    let (digits, negative) = match span.split_first() {
        Some((b'-', rest)) => (rest, true),
        _ => (span, false),
    };
    if digits.is_empty() {
        return Err(parse_err(offset, "expecting digit"));
    }
    if digits[0] == b'0' && digits.len() > 1 && digits[1].is_ascii_digit() {
        return Err(parse_err(offset, "leading zero is not allowed"));
    }
    if digits.len() <= FAST_INT_DIGITS {
        let mut value = 0u64;
        let mut fast = true;
        for &b in digits {
            if b.is_ascii_digit() {
                value = value * 10 + u64::from(b - b'0');
            } else {
                fast = false;
                break;
            }
        }
        if fast {
            let v = value as i64;
            return Ok(if negative { -v } else { v });
        }
    }
    parse_i64_slow(span, offset)
}

/// Long spans and spans with a fraction or exponent go through [`Decimal`]
/// so 19-digit values near the i64 range still parse exactly.
fn parse_i64_slow(span: &[u8], offset: u64) -> Result<i64> {
    let d = Decimal::parse_bytes(span).map_err(|reason| parse_err(offset, reason))?;
    if d.scale() > 0 {
        return Err(parse_err(offset, "expecting int but found decimal value"));
    }
    i64::try_from(d.unscaled()).map_err(|_| parse_err(offset, "integer overflow"))
}

pub fn read_i32(rd: &mut JsonReader<'_>) -> Result<i32> {
    let (span, offset) = number_span(rd)?;
    let v = parse_i64(span, offset)?;
    i32::try_from(v).map_err(|_| parse_err(offset, "integer overflow"))
}

pub fn read_u64(rd: &mut JsonReader<'_>) -> Result<u64> {
    let (span, offset) = number_span(rd)?;
    parse_u64(span, offset)
}

fn parse_u64(span: &[u8], offset: u64) -> Result<u64> {
    if span.first() == Some(&b'-') {
        return Err(parse_err(offset, "unsigned number may not be negative"));
    }
    if span.is_empty() {
        return Err(parse_err(offset, "expecting digit"));
    }
    if span[0] == b'0' && span.len() > 1 && span[1].is_ascii_digit() {
        return Err(parse_err(offset, "leading zero is not allowed"));
    }
    let mut value = 0u64;
    for &b in span {
        if b.is_ascii_digit() {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(u64::from(b - b'0')))
                .ok_or_else(|| parse_err(offset, "integer overflow"))?;
        } else {
            // fraction or exponent form
            let d = Decimal::parse_bytes(span).map_err(|reason| parse_err(offset, reason))?;
            if d.scale() > 0 {
                return Err(parse_err(offset, "expecting int but found decimal value"));
            }
            return u64::try_from(d.unscaled())
                .map_err(|_| parse_err(offset, "integer overflow"));
        }
    }
    Ok(value)
}

pub fn read_u32(rd: &mut JsonReader<'_>) -> Result<u32> {
    let (span, offset) = number_span(rd)?;
    let v = parse_u64(span, offset)?;
    u32::try_from(v).map_err(|_| parse_err(offset, "integer overflow"))
}

/// Digit budget for the exact double fast path: numerator and divisor both
/// stay exactly representable, so the single division rounds once.
const FAST_FLOAT_DIGITS: usize = 15;

const POW10: [f64; 16] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15,
];

pub fn read_f64(rd: &mut JsonReader<'_>) -> Result<f64> {
    if rd.last() == b'"' {
        let start = rd.position();
        let span = rd.read_simple_span()?;
        return match span {
            b"NaN" => Ok(f64::NAN),
            b"Infinity" => Ok(f64::INFINITY),
            b"-Infinity" => Ok(f64::NEG_INFINITY),
            _ => parse_f64(span, start),
        };
    }
    let (span, offset) = rd.scan_number();
    parse_f64(span, offset)
}

pub fn read_f32(rd: &mut JsonReader<'_>) -> Result<f32> {
    Ok(read_f64(rd)? as f32)
}

fn parse_f64(span: &[u8], offset: u64) -> Result<f64> {
    let (digits, negative) = match span.split_first() {
        Some((b'-', rest)) => (rest, true),
        _ => (span, false),
    };
    if digits.is_empty() {
        return Err(parse_err(offset, "expecting digit"));
    }
    if digits[0] == b'0' && digits.len() > 1 && digits[1].is_ascii_digit() {
        return Err(parse_err(offset, "leading zero is not allowed"));
    }
    let mut value = 0u64;
    let mut total_digits = 0usize;
    let mut frac_digits = 0usize;
    let mut seen_dot = false;
    let mut fast = true;
    for (i, &b) in digits.iter().enumerate() {
        match b {
            b'0'..=b'9' => {
                total_digits += 1;
                if total_digits > FAST_FLOAT_DIGITS {
                    fast = false;
                    break;
                }
                value = value * 10 + u64::from(b - b'0');
                if seen_dot {
                    frac_digits += 1;
                }
            }
            b'.' => {
                if seen_dot
                    || total_digits == 0
                    || i + 1 == digits.len()
                    || !digits[i + 1].is_ascii_digit()
                {
                    return Err(parse_err(offset, "expecting digit after decimal point"));
                }
                seen_dot = true;
            }
            b'e' | b'E' => {
                fast = false;
                break;
            }
            _ => return Err(parse_err(offset, "expecting digit")),
        }
    }
    if fast && total_digits > 0 {
        let v = value as f64 / POW10[frac_digits];
        return Ok(if negative { -v } else { v });
    }
    parse_f64_generic(span, offset)
}

fn parse_f64_generic(span: &[u8], offset: u64) -> Result<f64> {
    // validate shape before delegating, std parsing accepts more than JSON
    let mut digit = false;
    let mut dot = false;
    let mut exp = false;
    let mut exp_digit = false;
    for (i, &b) in span.iter().enumerate() {
        match b {
            b'0'..=b'9' => {
                if exp {
                    exp_digit = true;
                } else {
                    digit = true;
                }
            }
            b'-' if i == 0 => {}
            b'.' if digit && !dot && !exp => dot = true,
            b'e' | b'E' if digit && !exp => exp = true,
            b'+' | b'-' if exp && matches!(span[i - 1], b'e' | b'E') => {}
            _ => return Err(parse_err(offset, "expecting digit")),
        }
    }
    if !digit || (exp && !exp_digit) {
        return Err(parse_err(offset, "expecting digit"));
    }
    let text = std::str::from_utf8(span).map_err(|_| parse_err(offset, "expecting digit"))?;
    text.parse::<f64>()
        .map_err(|_| parse_err(offset, "number parse failed"))
}

pub fn read_decimal(rd: &mut JsonReader<'_>) -> Result<Decimal> {
    let (span, offset) = number_span(rd)?;
    Decimal::parse_bytes(span).map_err(|reason| parse_err(offset, reason))
}

pub fn read_datetime(rd: &mut JsonReader<'_>) -> Result<DateTime> {
    let start = rd.position();
    let span = rd.read_simple_span()?;
    DateTime::parse_bytes(span).map_err(|reason| parse_err(start, reason))
}

pub fn write_datetime(wr: &mut JsonWriter, v: &DateTime) {
    v.write_quoted(wr);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_i64(v: i64) -> String {
        let mut wr = JsonWriter::new();
        write_i64(&mut wr, v);
        String::from_utf8(wr.into_vec()).expect("digits are ascii")
    }

    fn render_u64(v: u64) -> String {
        let mut wr = JsonWriter::new();
        write_u64(&mut wr, v);
        String::from_utf8(wr.into_vec()).expect("digits are ascii")
    }

    fn parse<T>(doc: &str, f: impl Fn(&mut JsonReader<'_>) -> crate::error::Result<T>) -> T {
        let mut rd = JsonReader::new(doc.as_bytes());
        rd.next_token().expect("token");
        f(&mut rd).expect("number should parse")
    }

    #[test]
    fn test_write_i64_matches_display() {
        for v in [
            0,
            1,
            -1,
            9,
            10,
            99,
            100,
            999,
            1000,
            -1000,
            123_456_789,
            i64::MAX,
            i64::MIN,
            i64::MIN + 1,
        ] {
            assert_eq!(render_i64(v), v.to_string());
        }
    }

    #[test]
    fn test_write_u64_matches_display() {
        for v in [0u64, 7, 1_000_000, u64::MAX, u64::MAX - 1] {
            assert_eq!(render_u64(v), v.to_string());
        }
    }

    #[test]
    fn test_write_random_longs() {
        for _ in 0..2000 {
            let v = fastrand::i64(..);
            assert_eq!(render_i64(v), v.to_string());
        }
    }

    #[test]
    fn test_read_i64_fast_and_slow() {
        assert_eq!(parse("123", read_i64), 123);
        assert_eq!(parse("-42", read_i64), -42);
        // 19 digits near the range limit takes the slow path
        assert_eq!(parse("9223372036854775807", read_i64), i64::MAX);
        assert_eq!(parse("-9223372036854775808", read_i64), i64::MIN);
        // 18 digits stays on the fast path
        assert_eq!(parse("999999999999999999", read_i64), 999_999_999_999_999_999);
    }

    #[test]
    fn test_read_i64_overflow() {
        let mut rd = JsonReader::new(b"9223372036854775808");
        rd.next_token().expect("token");
        assert!(read_i64(&mut rd).is_err());
    }

    #[test]
    fn test_read_int_rejects_decimal_value() {
        let mut rd = JsonReader::new(b"123.5");
        rd.next_token().expect("token");
        assert!(read_i64(&mut rd).is_err());
    }

    #[test]
    fn test_read_int_with_exponent_that_is_whole() {
        assert_eq!(parse("12e2", read_i64), 1200);
    }

    #[test]
    fn test_leading_zero_rejected() {
        let mut rd = JsonReader::new(b"0123");
        rd.next_token().expect("token");
        assert!(read_i64(&mut rd).is_err());
    }

    #[test]
    fn test_read_u64_boundaries() {
        assert_eq!(parse("18446744073709551615", read_u64), u64::MAX);
        let mut rd = JsonReader::new(b"18446744073709551616");
        rd.next_token().expect("token");
        assert!(read_u64(&mut rd).is_err());
        let mut rd = JsonReader::new(b"-1");
        rd.next_token().expect("token");
        assert!(read_u64(&mut rd).is_err());
    }

    #[test]
    fn test_read_f64_fast_path_exact() {
        assert_eq!(parse("0.1", read_f64), 0.1);
        assert_eq!(parse("-2.5", read_f64), -2.5);
        assert_eq!(parse("3", read_f64), 3.0);
    }

    #[test]
    fn test_read_f64_generic_path() {
        assert_eq!(parse("1e3", read_f64), 1000.0);
        assert_eq!(parse("2.2250738585072014e-308", read_f64), f64::MIN_POSITIVE);
        // 16+ significant digits leaves the fast path
        assert_eq!(parse("1234567890.1234567", read_f64), 1234567890.1234567);
    }

    #[test]
    fn test_f64_round_trip_shortest_form() {
        for _ in 0..2000 {
            let v = f64::from_bits(fastrand::u64(..));
            if !v.is_finite() {
                continue;
            }
            let mut wr = JsonWriter::new();
            write_f64(&mut wr, v);
            let doc = wr.into_vec();
            let mut rd = JsonReader::new(&doc);
            rd.next_token().expect("token");
            assert_eq!(read_f64(&mut rd).expect("round trip"), v, "doc: {:?}", doc);
        }
    }

    #[test]
    fn test_f64_non_finite_round_trip() {
        let mut wr = JsonWriter::new();
        write_f64(&mut wr, f64::INFINITY);
        assert_eq!(wr.as_slice(), b"\"Infinity\"");
        let mut rd = JsonReader::new(b"\"-Infinity\"");
        rd.next_token().expect("token");
        assert_eq!(read_f64(&mut rd).expect("parse"), f64::NEG_INFINITY);
        let mut rd = JsonReader::new(b"\"NaN\"");
        rd.next_token().expect("token");
        assert!(read_f64(&mut rd).expect("parse").is_nan());
    }

    #[test]
    fn test_quoted_number_accepted() {
        assert_eq!(parse("\"123\"", read_i64), 123);
    }

    #[test]
    fn test_malformed_numbers_rejected() {
        for doc in ["-", "1.2.3", "1e", "1e+", ".5", "+1", "1x"] {
            let mut rd = JsonReader::new(doc.as_bytes());
            rd.next_token().expect("token");
            assert!(read_f64(&mut rd).is_err(), "should reject {:?}", doc);
        }
    }
}
