// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Exact decimal value: an i128 unscaled magnitude plus a base-10 scale.
//!
//! Up to 38 significant digits parse without rounding, which covers every
//! i64/u64 and all doubles written in shortest form. Negative exponents in
//! the source normalize into the scale; positive exponents multiply out so
//! the scale is never negative and formatting never needs scientific
//! notation.

use std::fmt;

/// Arbitrary-fixed-point decimal number.
///
/// Equality and hashing are scale sensitive, matching the textual form:
/// `1.0` and `1.00` differ. Use [`Decimal::to_i64_exact`] or
/// [`Decimal::to_f64`] for value comparisons across scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal {
    unscaled: i128,
    scale: u32,
}

const EXPONENT_LIMIT: i64 = 100_000;

impl Decimal {
    pub const ZERO: Decimal = Decimal {
        unscaled: 0,
        scale: 0,
    };

    pub fn new(unscaled: i128, scale: u32) -> Self {
        Decimal { unscaled, scale }
    }

    #[inline]
    pub fn unscaled(&self) -> i128 {
        self.unscaled
    }

    /// Number of digits after the decimal point. Zero for whole values.
    #[inline]
    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.unscaled == 0
    }

    /// Exact conversion to i64: succeeds only when the fractional part is
    /// all zeros and the value is in range.
    pub fn to_i64_exact(&self) -> Option<i64> {
        if self.scale == 0 {
            return i64::try_from(self.unscaled).ok();
        }
        let pow = 10i128.checked_pow(self.scale)?;
        if self.unscaled % pow != 0 {
            return None;
        }
        i64::try_from(self.unscaled / pow).ok()
    }

    /// Nearest double. Lossy for more than 15-16 significant digits.
    pub fn to_f64(&self) -> f64 {
        self.unscaled as f64 / 10f64.powi(self.scale as i32)
    }

    /// Parses a raw number span: optional minus, digits, optional fraction
    /// and exponent. Trailing fraction zeros are preserved in the scale.
    pub fn parse_bytes(span: &[u8]) -> Result<Self, &'static str> {
        let (body, negative) = match span.split_first() {
            Some((b'-', rest)) => (rest, true),
            _ => (span, false),
        };
        if body.is_empty() {
            return Err("expecting digit");
        }
        let mut mag: u128 = 0;
        let mut int_digits = 0usize;
        let mut frac_digits = 0i64;
        let mut seen_dot = false;
        let mut i = 0usize;
        while i < body.len() {
            match body[i] {
                b @ b'0'..=b'9' => {
                    if mag > (i128::MAX as u128 - 9) / 10 {
                        return Err("numeric overflow");
                    }
                    mag = mag * 10 + u128::from(b - b'0');
                    if seen_dot {
                        frac_digits += 1;
                    } else {
                        int_digits += 1;
                    }
                }
                b'.' => {
                    if seen_dot || int_digits == 0 {
                        return Err("unexpected decimal point");
                    }
                    if i + 1 == body.len() || !body[i + 1].is_ascii_digit() {
                        return Err("expecting digit after decimal point");
                    }
                    seen_dot = true;
                }
                b'e' | b'E' => {
                    if int_digits == 0 {
                        return Err("expecting digit");
                    }
                    if body[0] == b'0' && int_digits > 1 {
                        return Err("leading zero is not allowed");
                    }
                    let exp = parse_exponent(&body[i + 1..])?;
                    return Self::assemble(mag, negative, frac_digits - exp);
                }
                _ => return Err("expecting digit"),
            }
            i += 1;
        }
        if int_digits == 0 {
            return Err("expecting digit");
        }
        if body[0] == b'0' && int_digits > 1 {
            return Err("leading zero is not allowed");
        }
        Self::assemble(mag, negative, frac_digits)
    }

    fn assemble(mut mag: u128, negative: bool, scale: i64) -> Result<Self, &'static str> {
        let scale = if scale < 0 {
            // positive effective exponent: multiply out, keep scale at zero
            let mut left = -scale;
            while left > 0 {
                let step = left.min(38) as u32;
                mag = mag
                    .checked_mul(10u128.pow(step))
                    .filter(|m| *m <= i128::MAX as u128)
                    .ok_or("numeric overflow")?;
                left -= i64::from(step);
            }
            0
        } else {
            u32::try_from(scale).map_err(|_| "exponent out of range")?
        };
        if mag > i128::MAX as u128 {
            return Err("numeric overflow");
        }
        let unscaled = if negative {
            -(mag as i128)
        } else {
            mag as i128
        };
        Ok(Decimal { unscaled, scale })
    }
}

fn parse_exponent(span: &[u8]) -> Result<i64, &'static str> {
    let (digits, negative) = match span.split_first() {
        Some((b'-', rest)) => (rest, true),
        Some((b'+', rest)) => (rest, false),
        _ => (span, false),
    };
    if digits.is_empty() {
        return Err("expecting digit in exponent");
    }
    let mut exp = 0i64;
    for &b in digits {
        if !b.is_ascii_digit() {
            return Err("expecting digit in exponent");
        }
        exp = exp * 10 + i64::from(b - b'0');
        if exp > EXPONENT_LIMIT {
            return Err("exponent out of range");
        }
    }
    Ok(if negative { -exp } else { exp })
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.unscaled);
        }
        if self.unscaled < 0 {
            f.write_str("-")?;
        }
        let digits = self.unscaled.unsigned_abs().to_string();
        let scale = self.scale as usize;
        if digits.len() > scale {
            let (int, frac) = digits.split_at(digits.len() - scale);
            write!(f, "{}.{}", int, frac)
        } else {
            write!(f, "0.{}{}", "0".repeat(scale - digits.len()), digits)
        }
    }
}

impl std::str::FromStr for Decimal {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::parse_bytes(s.as_bytes())
    }
}

impl From<i64> for Decimal {
    fn from(v: i64) -> Self {
        Decimal::new(i128::from(v), 0)
    }
}

impl From<i32> for Decimal {
    fn from(v: i32) -> Self {
        Decimal::new(i128::from(v), 0)
    }
}

impl From<u64> for Decimal {
    fn from(v: u64) -> Self {
        Decimal::new(i128::from(v), 0)
    }
}
