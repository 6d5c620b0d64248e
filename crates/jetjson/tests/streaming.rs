// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Chunked streaming output: bound targets must produce the same bytes as
// in-memory encoding, across flush boundaries.

#![allow(clippy::unreadable_literal)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]

use std::fs;
use std::io::Write as _;

use jetjson::{Json, JsonValue};

fn large_strings(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("payload-{i}-{}", "x".repeat(i % 97)))
        .collect()
}

#[test]
fn stream_to_file_matches_in_memory_encoding() {
    let json = Json::standard();
    let value = large_strings(2000);

    let expected = json.to_bytes(&value).expect("encode");
    assert!(expected.len() > 64 * 1024, "fixture should span many chunks");

    let tmp = tempfile::NamedTempFile::new().expect("temp file");
    let handle = tmp.reopen().expect("reopen");
    let written = json.serialize_into(&value, handle).expect("stream encode");

    let bytes = fs::read(tmp.path()).expect("read back");
    assert_eq!(written, bytes.len() as u64);
    assert_eq!(bytes, expected);

    let back: Vec<String> = json.deserialize(&bytes).expect("decode");
    assert_eq!(back, value);
}

#[test]
fn stream_small_value_still_flushes() {
    let json = Json::standard();
    let tmp = tempfile::NamedTempFile::new().expect("temp file");
    let handle = tmp.reopen().expect("reopen");
    let written = json.serialize_into(&42i64, handle).expect("stream encode");
    assert_eq!(written, 2);
    assert_eq!(fs::read(tmp.path()).expect("read back"), b"42");
}

#[test]
fn stream_dynamic_document() {
    let json = Json::standard();
    let doc = {
        let mut doc = Vec::new();
        doc.push(b'[');
        for i in 0..5000 {
            if i > 0 {
                doc.push(b',');
            }
            write!(doc, r#"{{"i":{i},"f":{i}.250}}"#).expect("fixture");
        }
        doc.push(b']');
        doc
    };
    let value: JsonValue = json.deserialize(&doc).expect("decode");

    let tmp = tempfile::NamedTempFile::new().expect("temp file");
    let handle = tmp.reopen().expect("reopen");
    json.serialize_into(&value, handle).expect("stream encode");

    // digit preservation survives the chunked path
    assert_eq!(fs::read(tmp.path()).expect("read back"), doc);
}

#[test]
fn sink_errors_surface() {
    struct FailingSink;
    impl std::io::Write for FailingSink {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let json = Json::standard();
    let value = large_strings(2000);
    assert!(json.serialize_into(&value, FailingSink).is_err());
}
