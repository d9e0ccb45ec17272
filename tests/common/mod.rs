#![allow(dead_code)]

use msdf_text_bench::FontAtlasMeta;

/// 100x50 atlas with 'A', 'B', a tab and a space without bounds, and one
/// astral-plane glyph.
pub const SAMPLE_META: &str = r#"{
    "atlas": {
        "type": "msdf",
        "distanceRange": 4,
        "size": 32,
        "width": 100,
        "height": 50,
        "yOrigin": "bottom"
    },
    "metrics": { "emSize": 1, "lineHeight": 1.2, "ascender": 0.9, "descender": -0.2 },
    "glyphs": [
        { "unicode": 32, "advance": 0.25 },
        { "unicode": 9, "advance": 1.0 },
        {
            "unicode": 65,
            "advance": 0.6,
            "planeBounds": { "left": 0, "bottom": 0, "right": 0.5, "top": 0.7 },
            "atlasBounds": { "left": 0, "bottom": 0, "right": 20, "top": 30 }
        },
        {
            "unicode": 66,
            "advance": 0.55,
            "planeBounds": { "left": 0.05, "bottom": 0, "right": 0.5, "top": 0.7 },
            "atlasBounds": { "left": 20, "bottom": 0, "right": 40, "top": 30 }
        },
        {
            "unicode": 128512,
            "advance": 1.0,
            "planeBounds": { "left": 0, "bottom": -0.1, "right": 0.9, "top": 0.8 },
            "atlasBounds": { "left": 40, "bottom": 10, "right": 60, "top": 50 }
        }
    ]
}"#;

pub fn sample_meta() -> FontAtlasMeta {
    FontAtlasMeta::from_json(SAMPLE_META).expect("sample metrics are valid")
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-5,
        "expected {expected}, got {actual}"
    );
}
