// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Positional array formats and mixin dispatch through the `$type`
// discriminator.

#![allow(clippy::unreadable_literal)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::match_wildcard_for_single_variants)]

use std::sync::Arc;

use jetjson::convert::{bind_property, scalars, write_computed};
use jetjson::{
    ArrayFormatDescription, Error, FormatDescription, Json, MixinDescription,
    ObjectFormatDescription, Property, Settings, TypeSignature,
};

#[derive(Debug, Default, Clone, PartialEq)]
struct Point {
    x: i64,
    y: i64,
    z: i64,
}

fn point_array() -> Arc<ArrayFormatDescription<Point>> {
    ArrayFormatDescription::new(
        "Point",
        Point::default,
        vec![
            write_computed(|p: &Point| p.x, scalars::i64_writer()),
            write_computed(|p: &Point| p.y, scalars::i64_writer()),
            write_computed(|p: &Point| p.z, scalars::i64_writer()),
        ],
        vec![
            bind_property(|p: &mut Point, v| p.x = v, scalars::i64_reader()),
            bind_property(|p: &mut Point, v| p.y = v, scalars::i64_reader()),
            bind_property(|p: &mut Point, v| p.z = v, scalars::i64_reader()),
        ],
    )
    .expect("array description should build")
}

fn point_registry() -> Arc<Json> {
    let json = Settings::new().finish();
    json.register_format(TypeSignature::of::<Point>(), point_array());
    json
}

#[test]
fn array_format_round_trip() {
    let json = point_registry();
    let value = Point { x: 1, y: -2, z: 30 };
    let bytes = json.to_bytes(&value).expect("encode");
    assert_eq!(bytes, b"[1,-2,30]");
    let back: Point = json.deserialize(&bytes).expect("decode");
    assert_eq!(back, value);
}

#[test]
fn array_format_tolerates_whitespace() {
    let json = point_registry();
    let back: Point = json.deserialize(b"[ 1 , 2 , 3 ]").expect("decode");
    assert_eq!(back, Point { x: 1, y: 2, z: 3 });
}

#[test]
fn too_few_elements_is_an_error() {
    let json = point_registry();
    assert!(json.deserialize::<Point>(b"[]").is_err());
    let err = json.deserialize::<Point>(b"[1,2]").unwrap_err();
    let text = err.to_string();
    assert!(text.contains("Point"), "message was: {text}");
}

#[test]
fn too_many_elements_is_an_error() {
    let json = point_registry();
    assert!(json.deserialize::<Point>(b"[1,2,3,4]").is_err());
}

#[test]
fn element_type_mismatch_is_an_error() {
    let json = point_registry();
    assert!(json.deserialize::<Point>(br#"[1,"two",3]"#).is_err());
}

// ---- mixin over an enum ----

#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Circle { radius: i64 },
    Rect { width: i64, height: i64 },
}

impl Default for Shape {
    fn default() -> Self {
        Shape::Circle { radius: 0 }
    }
}

fn circle_format(json: &Arc<Json>) -> Arc<ObjectFormatDescription<Shape>> {
    ObjectFormatDescription::builder("Circle", || Shape::Circle { radius: 0 })
        .property(Property::new(
            "radius",
            write_computed(
                |v: &Shape| match v {
                    Shape::Circle { radius } => *radius,
                    _ => 0,
                },
                scalars::i64_writer(),
            ),
            bind_property(
                |v: &mut Shape, r| {
                    if let Shape::Circle { radius } = v {
                        *radius = r;
                    }
                },
                scalars::i64_reader(),
            ),
        ))
        .build(json)
        .expect("circle format")
}

fn rect_format(json: &Arc<Json>) -> Arc<ObjectFormatDescription<Shape>> {
    ObjectFormatDescription::builder("Rect", || {
        Shape::Rect {
            width: 0,
            height: 0,
        }
    })
    .property(Property::new(
        "width",
        write_computed(
            |v: &Shape| match v {
                Shape::Rect { width, .. } => *width,
                _ => 0,
            },
            scalars::i64_writer(),
        ),
        bind_property(
            |v: &mut Shape, x| {
                if let Shape::Rect { width, .. } = v {
                    *width = x;
                }
            },
            scalars::i64_reader(),
        ),
    ))
    .property(Property::new(
        "height",
        write_computed(
            |v: &Shape| match v {
                Shape::Rect { height, .. } => *height,
                _ => 0,
            },
            scalars::i64_writer(),
        ),
        bind_property(
            |v: &mut Shape, x| {
                if let Shape::Rect { height, .. } = v {
                    *height = x;
                }
            },
            scalars::i64_reader(),
        ),
    ))
    .build(json)
    .expect("rect format")
}

fn shape_registry(settings: Settings) -> Arc<Json> {
    let json = settings.finish();
    let circle = Arc::new(
        FormatDescription::new(
            "Circle",
            Some(circle_format(&json)),
            None,
            true,
            json.allow_array_format(),
        )
        .expect("circle description"),
    );
    let rect = Arc::new(
        FormatDescription::new(
            "Rect",
            Some(rect_format(&json)),
            None,
            true,
            json.allow_array_format(),
        )
        .expect("rect description"),
    );
    let mixin = MixinDescription::new(
        "Shape",
        vec![circle, rect],
        |v: &Shape| match v {
            Shape::Circle { .. } => 0,
            Shape::Rect { .. } => 1,
        },
        json.omit_defaults(),
    )
    .expect("mixin");
    json.register_mixin(TypeSignature::of::<Shape>(), mixin);
    json
}

#[test]
fn mixin_round_trip_both_variants() {
    let json = shape_registry(Settings::new());

    let circle = Shape::Circle { radius: 5 };
    let bytes = json.to_bytes(&circle).expect("encode");
    assert_eq!(bytes, br#"{"$type":"Circle","radius":5}"#);
    assert_eq!(json.deserialize::<Shape>(&bytes).expect("decode"), circle);

    let rect = Shape::Rect {
        width: 2,
        height: 3,
    };
    let bytes = json.to_bytes(&rect).expect("encode");
    assert_eq!(bytes, br#"{"$type":"Rect","width":2,"height":3}"#);
    assert_eq!(json.deserialize::<Shape>(&bytes).expect("decode"), rect);
}

#[test]
fn discriminator_must_come_first() {
    let json = shape_registry(Settings::new());
    let err = json
        .deserialize::<Shape>(br#"{"radius":5,"$type":"Circle"}"#)
        .unwrap_err();
    assert!(err.to_string().contains("$type"), "was: {err}");
}

#[test]
fn missing_discriminator_is_an_error() {
    let json = shape_registry(Settings::new());
    assert!(json.deserialize::<Shape>(b"{}").is_err());
    assert!(json.deserialize::<Shape>(br#"{"radius":5}"#).is_err());
}

#[test]
fn unknown_variant_is_an_error() {
    let json = shape_registry(Settings::new());
    let err = json
        .deserialize::<Shape>(br#"{"$type":"Triangle","a":1}"#)
        .unwrap_err();
    match err {
        Error::Configuration { reason } => {
            assert!(reason.contains("Triangle"), "was: {reason}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn custom_discriminator_key() {
    let json = Settings::new().finish();
    let circle = Arc::new(
        FormatDescription::new(
            "Circle",
            Some(circle_format(&json)),
            None,
            true,
            json.allow_array_format(),
        )
        .expect("circle description"),
    );
    let mixin = MixinDescription::with_discriminator(
        "Shape",
        "kind",
        vec![circle],
        |_: &Shape| 0,
        json.omit_defaults(),
    )
    .expect("mixin");
    json.register_mixin(TypeSignature::of::<Shape>(), mixin);

    let value = Shape::Circle { radius: 8 };
    let bytes = json.to_bytes(&value).expect("encode");
    assert_eq!(bytes, br#"{"kind":"Circle","radius":8}"#);
    assert_eq!(json.deserialize::<Shape>(&bytes).expect("decode"), value);

    let err = json
        .deserialize::<Shape>(br#"{"$type":"Circle","radius":8}"#)
        .unwrap_err();
    assert!(err.to_string().contains("kind"), "was: {err}");
}

// ---- mixin over array-form variants ----

fn circle_array() -> Arc<ArrayFormatDescription<Shape>> {
    ArrayFormatDescription::new(
        "Circle",
        || Shape::Circle { radius: 0 },
        vec![write_computed(
            |v: &Shape| match v {
                Shape::Circle { radius } => *radius,
                _ => 0,
            },
            scalars::i64_writer(),
        )],
        vec![bind_property(
            |v: &mut Shape, r| {
                if let Shape::Circle { radius } = v {
                    *radius = r;
                }
            },
            scalars::i64_reader(),
        )],
    )
    .expect("circle array description")
}

#[test]
fn mixin_array_form_round_trip() {
    let json = Settings::new().finish();
    let circle = Arc::new(
        FormatDescription::new("Circle", None, Some(circle_array()), false, true)
            .expect("circle description"),
    );
    let rect = Arc::new(
        FormatDescription::new("Rect", Some(rect_format(&json)), None, true, true)
            .expect("rect description"),
    );
    let mixin = MixinDescription::new(
        "Shape",
        vec![circle, rect],
        |v: &Shape| match v {
            Shape::Circle { .. } => 0,
            Shape::Rect { .. } => 1,
        },
        json.omit_defaults(),
    )
    .expect("mixin");
    json.register_mixin(TypeSignature::of::<Shape>(), mixin);

    let circle = Shape::Circle { radius: 5 };
    let bytes = json.to_bytes(&circle).expect("encode");
    assert_eq!(bytes, br#"["Circle",5]"#);
    assert_eq!(json.deserialize::<Shape>(&bytes).expect("decode"), circle);

    assert_eq!(
        json.deserialize::<Shape>(br#"[ "Circle" , 9 ]"#)
            .expect("decode"),
        Shape::Circle { radius: 9 }
    );

    // the object-primary variant still encodes and decodes in object form
    let rect = Shape::Rect {
        width: 2,
        height: 3,
    };
    let bytes = json.to_bytes(&rect).expect("encode");
    assert_eq!(bytes, br#"{"$type":"Rect","width":2,"height":3}"#);
    assert_eq!(json.deserialize::<Shape>(&bytes).expect("decode"), rect);
}

#[derive(Debug, Clone, PartialEq)]
enum Marker {
    Dot,
}

#[test]
fn mixin_array_form_with_no_elements() {
    let json = Settings::new().finish();
    let dot = Arc::new(
        FormatDescription::new(
            "Dot",
            None,
            Some(
                ArrayFormatDescription::new("Dot", || Marker::Dot, vec![], vec![])
                    .expect("dot array description"),
            ),
            false,
            true,
        )
        .expect("dot description"),
    );
    let mixin = MixinDescription::new("Marker", vec![dot], |_: &Marker| 0, json.omit_defaults())
        .expect("mixin");
    json.register_mixin(TypeSignature::of::<Marker>(), mixin);

    let bytes = json.to_bytes(&Marker::Dot).expect("encode");
    assert_eq!(bytes, br#"["Dot"]"#);
    assert_eq!(
        json.deserialize::<Marker>(&bytes).expect("decode"),
        Marker::Dot
    );
    assert_eq!(
        json.deserialize::<Marker>(br#"[ "Dot" ]"#).expect("decode"),
        Marker::Dot
    );
}

#[test]
fn dual_form_variant_reads_both_openers() {
    let json = Settings::new().finish();
    let circle = Arc::new(
        FormatDescription::new(
            "Circle",
            Some(circle_format(&json)),
            Some(circle_array()),
            true,
            true,
        )
        .expect("circle description"),
    );
    let mixin = MixinDescription::new("Shape", vec![circle], |_: &Shape| 0, json.omit_defaults())
        .expect("mixin");
    json.register_mixin(TypeSignature::of::<Shape>(), mixin);

    let expected = Shape::Circle { radius: 5 };
    assert_eq!(
        json.deserialize::<Shape>(br#"{"$type":"Circle","radius":5}"#)
            .expect("decode"),
        expected
    );
    assert_eq!(
        json.deserialize::<Shape>(br#"["Circle",5]"#).expect("decode"),
        expected
    );
    // object form is primary on encode
    assert_eq!(
        json.to_bytes(&expected).expect("encode"),
        br#"{"$type":"Circle","radius":5}"#
    );
}

fn point_object(json: &Arc<Json>) -> Arc<ObjectFormatDescription<Point>> {
    ObjectFormatDescription::builder("Point", Point::default)
        .property(Property::new(
            "x",
            write_computed(|p: &Point| p.x, scalars::i64_writer()),
            bind_property(|p: &mut Point, v| p.x = v, scalars::i64_reader()),
        ))
        .property(Property::new(
            "y",
            write_computed(|p: &Point| p.y, scalars::i64_writer()),
            bind_property(|p: &mut Point, v| p.y = v, scalars::i64_reader()),
        ))
        .property(Property::new(
            "z",
            write_computed(|p: &Point| p.z, scalars::i64_writer()),
            bind_property(|p: &mut Point, v| p.z = v, scalars::i64_reader()),
        ))
        .build(json)
        .expect("point object description")
}

#[test]
fn dual_format_description_reads_both_openers() {
    let json = Settings::new().finish();
    let desc = Arc::new(
        FormatDescription::new(
            "Point",
            Some(point_object(&json)),
            Some(point_array()),
            true,
            true,
        )
        .expect("dual description"),
    );
    let sig = TypeSignature::of::<Point>();
    let d = desc.clone();
    json.register_reader::<Point>(sig.clone(), Arc::new(move |rd| d.read(rd)));
    json.register_writer::<Point>(sig, Arc::new(move |wr, v| desc.write(wr, v)));

    let from_object: Point = json.deserialize(br#"{"x":1,"y":2,"z":3}"#).expect("decode");
    let from_array: Point = json.deserialize(b"[1,2,3]").expect("decode");
    assert_eq!(from_object, from_array);
    assert_eq!(
        json.to_bytes(&from_array).expect("encode"),
        br#"{"x":1,"y":2,"z":3}"#
    );
}

#[test]
fn mixin_minimal_writing_patches_the_discriminator_comma() {
    let json = shape_registry(Settings::new().omit_defaults(true));
    let circle = Shape::Circle { radius: 5 };
    let bytes = json.to_bytes(&circle).expect("encode");
    assert_eq!(bytes, br#"{"$type":"Circle","radius":5}"#);
    assert_eq!(json.deserialize::<Shape>(&bytes).expect("decode"), circle);
}
