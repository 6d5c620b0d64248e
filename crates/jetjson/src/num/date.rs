// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ISO-8601 timestamp codec with fixed-position field parsing.
//!
//! Timestamps are written as `"YYYY-MM-DDTHH:MM:SS[.fff]Z"` (or an explicit
//! `+HH:MM` offset) and parsed straight out of the raw span without going
//! through the string decoder. The fraction keeps nanosecond precision and
//! is trimmed to the shortest of 3, 6 or 9 digits on output.

use std::fmt;

use super::{put2, put3, put4};
use crate::writer::JsonWriter;

/// Calendar timestamp with a UTC offset in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateTime {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    nanos: u32,
    offset_minutes: i16,
}

const DAYS_IN_MONTH: [u8; 13] = [0, 31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

impl DateTime {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        nanos: u32,
        offset_minutes: i16,
    ) -> Result<Self, &'static str> {
        let dt = DateTime {
            year,
            month,
            day,
            hour,
            minute,
            second,
            nanos,
            offset_minutes,
        };
        dt.validate()?;
        Ok(dt)
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.year > 9999 {
            return Err("year out of range");
        }
        if self.month < 1 || self.month > 12 {
            return Err("month out of range");
        }
        if self.day < 1 || self.day > DAYS_IN_MONTH[self.month as usize] {
            return Err("day out of range");
        }
        if self.hour > 23 || self.minute > 59 || self.second > 59 {
            return Err("time out of range");
        }
        if self.nanos > 999_999_999 {
            return Err("fraction out of range");
        }
        if self.offset_minutes.abs() > 18 * 60 {
            return Err("utc offset out of range");
        }
        Ok(())
    }

    pub fn year(&self) -> u16 {
        self.year
    }
    pub fn month(&self) -> u8 {
        self.month
    }
    pub fn day(&self) -> u8 {
        self.day
    }
    pub fn hour(&self) -> u8 {
        self.hour
    }
    pub fn minute(&self) -> u8 {
        self.minute
    }
    pub fn second(&self) -> u8 {
        self.second
    }
    pub fn nanos(&self) -> u32 {
        self.nanos
    }
    pub fn offset_minutes(&self) -> i16 {
        self.offset_minutes
    }

    /// Parses the span between the quotes of a timestamp literal.
    pub fn parse_bytes(span: &[u8]) -> Result<Self, &'static str> {
        if span.len() < 20 {
            return Err("timestamp too short");
        }
        if span[4] != b'-'
            || span[7] != b'-'
            || (span[10] != b'T' && span[10] != b' ')
            || span[13] != b':'
            || span[16] != b':'
        {
            return Err("malformed timestamp");
        }
        let year = fixed_digits(span, 0, 4)? as u16;
        let month = fixed_digits(span, 5, 2)? as u8;
        let day = fixed_digits(span, 8, 2)? as u8;
        let hour = fixed_digits(span, 11, 2)? as u8;
        let minute = fixed_digits(span, 14, 2)? as u8;
        let second = fixed_digits(span, 17, 2)? as u8;
        let mut i = 19;
        let mut nanos = 0u32;
        if span[i] == b'.' {
            i += 1;
            let start = i;
            while i < span.len() && span[i].is_ascii_digit() {
                if i - start < 9 {
                    nanos = nanos * 10 + u32::from(span[i] - b'0');
                }
                i += 1;
            }
            let digits = (i - start).min(9);
            if digits == 0 {
                return Err("expecting digit after fraction point");
            }
            nanos *= 10u32.pow(9 - digits as u32);
        }
        if i >= span.len() {
            return Err("missing utc offset");
        }
        let offset_minutes = match span[i] {
            b'Z' | b'z' => {
                i += 1;
                0
            }
            sign @ (b'+' | b'-') => {
                if span.len() < i + 6 || span[i + 3] != b':' {
                    return Err("malformed utc offset");
                }
                let hours = fixed_digits(span, i + 1, 2)? as i16;
                let minutes = fixed_digits(span, i + 4, 2)? as i16;
                i += 6;
                let total = hours * 60 + minutes;
                if sign == b'-' {
                    -total
                } else {
                    total
                }
            }
            _ => return Err("malformed utc offset"),
        };
        if i != span.len() {
            return Err("trailing bytes in timestamp");
        }
        DateTime::new(year, month, day, hour, minute, second, nanos, offset_minutes)
    }

    /// Writes the quoted timestamp directly into the writer's buffer.
    pub fn write_quoted(&self, wr: &mut JsonWriter) {
        let mut pos = wr.pos();
        let start = pos;
        let buf = wr.ensure_capacity(38);
        buf[pos] = b'"';
        put4(buf, pos + 1, u32::from(self.year));
        buf[pos + 5] = b'-';
        put2(buf, pos + 6, u32::from(self.month));
        buf[pos + 8] = b'-';
        put2(buf, pos + 9, u32::from(self.day));
        buf[pos + 11] = b'T';
        put2(buf, pos + 12, u32::from(self.hour));
        buf[pos + 14] = b':';
        put2(buf, pos + 15, u32::from(self.minute));
        buf[pos + 17] = b':';
        put2(buf, pos + 18, u32::from(self.second));
        pos += 20;
        if self.nanos > 0 {
            buf[pos] = b'.';
            if self.nanos % 1_000_000 == 0 {
                put3(buf, pos + 1, self.nanos / 1_000_000);
                pos += 4;
            } else if self.nanos % 1_000 == 0 {
                put3(buf, pos + 1, self.nanos / 1_000_000);
                put3(buf, pos + 4, (self.nanos / 1_000) % 1_000);
                pos += 7;
            } else {
                put3(buf, pos + 1, self.nanos / 1_000_000);
                put3(buf, pos + 4, (self.nanos / 1_000) % 1_000);
                put3(buf, pos + 7, self.nanos % 1_000);
                pos += 10;
            }
        }
        if self.offset_minutes == 0 {
            buf[pos] = b'Z';
            pos += 1;
        } else {
            let (sign, abs) = if self.offset_minutes < 0 {
                (b'-', -self.offset_minutes)
            } else {
                (b'+', self.offset_minutes)
            };
            buf[pos] = sign;
            put2(buf, pos + 1, u32::from(abs as u16 / 60));
            buf[pos + 3] = b':';
            put2(buf, pos + 4, u32::from(abs as u16 % 60));
            pos += 6;
        }
        buf[pos] = b'"';
        pos += 1;
        wr.advance(pos - start);
    }
}

fn fixed_digits(span: &[u8], start: usize, len: usize) -> Result<u32, &'static str> {
    let mut v = 0u32;
    for &b in &span[start..start + len] {
        if !b.is_ascii_digit() {
            return Err("expecting digit in timestamp");
        }
        v = v * 10 + u32::from(b - b'0');
    }
    Ok(v)
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wr = JsonWriter::with_capacity(40);
        self.write_quoted(&mut wr);
        let bytes = wr.into_vec();
        // strip the quotes added for the JSON form
        match std::str::from_utf8(&bytes[1..bytes.len() - 1]) {
            Ok(s) => f.write_str(s),
            Err(_) => Err(fmt::Error),
        }
    }
}
