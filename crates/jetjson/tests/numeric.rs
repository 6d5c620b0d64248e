// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Numeric boundaries and digit-exact behavior through the public entry
// points.

#![allow(clippy::unreadable_literal)]
#![allow(clippy::float_cmp)]
#![allow(clippy::missing_panics_doc)]

use jetjson::{DateTime, Decimal, Json, JsonValue};

#[test]
fn integer_boundaries_round_trip() {
    let json = Json::standard();
    for v in [0i64, 1, -1, i64::MAX, i64::MIN, 1_000_000_007, -999] {
        let bytes = json.to_bytes(&v).expect("encode");
        assert_eq!(bytes, v.to_string().into_bytes());
        let back: i64 = json.deserialize(&bytes).expect("decode");
        assert_eq!(back, v);
    }
    let back: u64 = json
        .deserialize(u64::MAX.to_string().as_bytes())
        .expect("decode");
    assert_eq!(back, u64::MAX);
}

#[test]
fn integer_overflow_and_shape_errors() {
    let json = Json::standard();
    assert!(json.deserialize::<i64>(b"9223372036854775808").is_err());
    assert!(json.deserialize::<i32>(b"2147483648").is_err());
    assert!(json.deserialize::<u64>(b"-1").is_err());
    // a decimal point is not an integer
    assert!(json.deserialize::<i64>(b"1.5").is_err());
    for doc in [&b"-"[..], b"1e", b"1e+", b"+1", b"01", b"1x"] {
        assert!(json.deserialize::<i64>(doc).is_err(), "doc {:?}", doc);
    }
}

#[test]
fn quoted_numbers_are_accepted() {
    let json = Json::standard();
    let v: i64 = json.deserialize(br#""123""#).expect("decode");
    assert_eq!(v, 123);
    let v: f64 = json.deserialize(br#""1.25""#).expect("decode");
    assert_eq!(v, 1.25);
}

#[test]
fn exponents_normalize_for_integers() {
    let json = Json::standard();
    let v: i64 = json.deserialize(b"12e2").expect("decode");
    assert_eq!(v, 1200);
    // a fractional tail that does not cancel is rejected
    assert!(json.deserialize::<i64>(b"1.25e1").is_err());
}

#[test]
fn float_round_trips_shortest_form() {
    let json = Json::standard();
    for v in [0.0f64, 1.5, -2.25, 0.1, 1e300, -1e-300, f64::MAX, f64::MIN] {
        let bytes = json.to_bytes(&v).expect("encode");
        let back: f64 = json.deserialize(&bytes).expect("decode");
        assert_eq!(back, v, "value {v}");
    }
}

#[test]
fn non_finite_floats_use_quoted_literals() {
    let json = Json::standard();
    assert_eq!(json.to_bytes(&f64::INFINITY).expect("encode"), br#""Infinity""#);
    assert_eq!(
        json.to_bytes(&f64::NEG_INFINITY).expect("encode"),
        br#""-Infinity""#
    );
    assert_eq!(json.to_bytes(&f64::NAN).expect("encode"), br#""NaN""#);

    let v: f64 = json.deserialize(br#""Infinity""#).expect("decode");
    assert!(v.is_infinite() && v.is_sign_positive());
    let v: f64 = json.deserialize(br#""NaN""#).expect("decode");
    assert!(v.is_nan());
}

#[test]
fn decimal_keeps_scale() {
    let json = Json::standard();
    let d: Decimal = json.deserialize(b"1.500").expect("decode");
    assert_eq!(json.to_bytes(&d).expect("encode"), b"1.500");
    assert_ne!(d, Decimal::new(15, 1));

    let d: Decimal = json.deserialize(b"-0.001").expect("decode");
    assert_eq!(d.to_string(), "-0.001");

    // 38 significant digits survive
    let doc = b"12345678901234567890123456789012345678";
    let d: Decimal = json.deserialize(doc).expect("decode");
    assert_eq!(json.to_bytes(&d).expect("encode"), doc);
}

#[test]
fn dynamic_values_preserve_digits() {
    let json = Json::standard();
    let doc = br#"{"a":1.500,"b":[0.10,2e2],"c":-0.001}"#;
    let value: JsonValue = json.deserialize(doc).expect("decode");
    let bytes = json.to_bytes(&value).expect("encode");
    // exponents normalize at parse, everything else is byte stable
    assert_eq!(bytes, br#"{"a":1.500,"b":[0.10,200],"c":-0.001}"#);
}

#[test]
fn datetime_round_trip() {
    let json = Json::standard();
    for doc in [
        &br#""2025-08-30T12:34:56Z""#[..],
        br#""2025-08-30T12:34:56.123Z""#,
        br#""2025-08-30T12:34:56.123456789Z""#,
        br#""2025-08-30T12:34:56+02:00""#,
        br#""2025-08-30T12:34:56-05:30""#,
    ] {
        let dt: DateTime = json.deserialize(doc).expect("decode");
        assert_eq!(json.to_bytes(&dt).expect("encode"), doc, "doc {:?}", doc);
    }
}

#[test]
fn datetime_validation() {
    let json = Json::standard();
    for doc in [
        &br#""2025-13-01T00:00:00Z""#[..],
        br#""2025-02-30T00:00:00Z""#,
        br#""2025-02-28T24:00:00Z""#,
        br#""2025-02-28 XX:00:00Z""#,
        br#""2025-02-28T00:00:00""#,
    ] {
        assert!(json.deserialize::<DateTime>(doc).is_err(), "doc {:?}", doc);
    }
    // leap day is valid
    assert!(json
        .deserialize::<DateTime>(br#""2024-02-29T00:00:00Z""#)
        .is_ok());
}
