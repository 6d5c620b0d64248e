// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generic combinators that lift a value codec over options, sequences and
//! string keyed maps. Composing them covers nested shapes like
//! `Vec<Option<T>>` without dedicated converters.

use std::collections::HashMap;
use std::sync::Arc;

use super::{ReadFn, WriteFn};

pub fn option_reader<T: 'static>(inner: ReadFn<T>) -> ReadFn<Option<T>> {
    Arc::new(move |rd| {
        if rd.was_null()? {
            Ok(None)
        } else {
            inner(rd).map(Some)
        }
    })
}

pub fn option_writer<T: 'static>(inner: WriteFn<T>) -> WriteFn<Option<T>> {
    Arc::new(move |wr, v| match v {
        Some(inner_v) => inner(wr, inner_v),
        None => {
            wr.write_null();
            Ok(())
        }
    })
}

pub fn vec_reader<T: 'static>(elem: ReadFn<T>) -> ReadFn<Vec<T>> {
    Arc::new(move |rd| {
        if rd.last() != b'[' {
            return Err(rd.expecting("'['"));
        }
        if rd.next_token()? == b']' {
            return Ok(Vec::new());
        }
        let mut res = Vec::with_capacity(4);
        res.push(elem(rd)?);
        while rd.next_token()? == b',' {
            rd.next_token()?;
            res.push(elem(rd)?);
        }
        rd.check_array_end()?;
        Ok(res)
    })
}

pub fn vec_writer<T: 'static>(elem: WriteFn<T>) -> WriteFn<Vec<T>> {
    Arc::new(move |wr, v| {
        wr.write_byte(b'[');
        let mut first = true;
        for item in v {
            if !first {
                wr.write_byte(b',');
            }
            first = false;
            elem(wr, item)?;
            wr.maybe_flush()?;
        }
        wr.write_byte(b']');
        Ok(())
    })
}

pub fn map_reader<T: 'static>(val: ReadFn<T>) -> ReadFn<HashMap<String, T>> {
    Arc::new(move |rd| {
        if rd.last() != b'{' {
            return Err(rd.expecting("'{'"));
        }
        let mut res = HashMap::new();
        if rd.next_token()? == b'}' {
            return Ok(res);
        }
        loop {
            let key = rd.read_key()?;
            res.insert(key, val(rd)?);
            match rd.next_token()? {
                b',' => {
                    rd.next_token()?;
                }
                b'}' => return Ok(res),
                _ => return Err(rd.expecting("'}'")),
            }
        }
    })
}

pub fn map_writer<T: 'static>(val: WriteFn<T>) -> WriteFn<HashMap<String, T>> {
    Arc::new(move |wr, v| {
        wr.write_byte(b'{');
        let mut first = true;
        for (key, item) in v {
            if !first {
                wr.write_byte(b',');
            }
            first = false;
            wr.write_string(key);
            wr.write_byte(b':');
            val(wr, item)?;
            wr.maybe_flush()?;
        }
        wr.write_byte(b'}');
        Ok(())
    })
}
