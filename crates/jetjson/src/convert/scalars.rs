// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Value codecs for the primitive types registered by default.

use std::sync::Arc;

use super::{ReadFn, WriteFn};
use crate::num::{self, DateTime, Decimal};

pub fn bool_reader() -> ReadFn<bool> {
    Arc::new(|rd| {
        if rd.was_true()? {
            Ok(true)
        } else if rd.was_false()? {
            Ok(false)
        } else {
            Err(rd.expecting("'true' or 'false'"))
        }
    })
}

pub fn bool_writer() -> WriteFn<bool> {
    Arc::new(|wr, v| {
        wr.write_ascii(if *v { b"true" } else { b"false" });
        Ok(())
    })
}

pub fn i32_reader() -> ReadFn<i32> {
    Arc::new(|rd| num::read_i32(rd))
}

pub fn i32_writer() -> WriteFn<i32> {
    Arc::new(|wr, v| {
        num::write_i32(wr, *v);
        Ok(())
    })
}

pub fn i64_reader() -> ReadFn<i64> {
    Arc::new(|rd| num::read_i64(rd))
}

pub fn i64_writer() -> WriteFn<i64> {
    Arc::new(|wr, v| {
        num::write_i64(wr, *v);
        Ok(())
    })
}

pub fn u32_reader() -> ReadFn<u32> {
    Arc::new(|rd| num::read_u32(rd))
}

pub fn u32_writer() -> WriteFn<u32> {
    Arc::new(|wr, v| {
        num::write_u32(wr, *v);
        Ok(())
    })
}

pub fn u64_reader() -> ReadFn<u64> {
    Arc::new(|rd| num::read_u64(rd))
}

pub fn u64_writer() -> WriteFn<u64> {
    Arc::new(|wr, v| {
        num::write_u64(wr, *v);
        Ok(())
    })
}

pub fn f32_reader() -> ReadFn<f32> {
    Arc::new(|rd| num::read_f32(rd))
}

pub fn f32_writer() -> WriteFn<f32> {
    Arc::new(|wr, v| {
        num::write_f32(wr, *v);
        Ok(())
    })
}

pub fn f64_reader() -> ReadFn<f64> {
    Arc::new(|rd| num::read_f64(rd))
}

pub fn f64_writer() -> WriteFn<f64> {
    Arc::new(|wr, v| {
        num::write_f64(wr, *v);
        Ok(())
    })
}

pub fn string_reader() -> ReadFn<String> {
    Arc::new(|rd| Ok(rd.read_string()?.to_owned()))
}

pub fn string_writer() -> WriteFn<String> {
    Arc::new(|wr, v| {
        wr.write_string(v);
        Ok(())
    })
}

pub fn decimal_reader() -> ReadFn<Decimal> {
    Arc::new(|rd| num::read_decimal(rd))
}

pub fn decimal_writer() -> WriteFn<Decimal> {
    Arc::new(|wr, v| {
        num::write_decimal(wr, v);
        Ok(())
    })
}

pub fn datetime_reader() -> ReadFn<DateTime> {
    Arc::new(|rd| num::read_datetime(rd))
}

pub fn datetime_writer() -> WriteFn<DateTime> {
    Arc::new(|wr, v| {
        num::write_datetime(wr, v);
        Ok(())
    })
}
