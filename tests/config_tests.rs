use msdf_text_bench::render_style::MAX_SMOOTHNESS;
use msdf_text_bench::{ConfigError, RenderStyle, TextParams, ViewerConfig};

#[test]
fn default_config_draws_sample_text() {
    let config = ViewerConfig::default();

    assert_eq!(config.text.text, "abcdefghijklmopq 1234567890");
    assert_eq!(config.text.font_sizes, vec![128.0]);
    assert_eq!(config.text.line_spacing, 1.2);
    assert_eq!(config.text.style, RenderStyle::Basic);
    assert_eq!((config.window.width, config.window.height), (1280, 720));
    let color = config.clear_color();
    assert_eq!((color.r, color.g, color.b, color.a), (1.0, 0.0, 1.0, 1.0));
}

#[test]
fn partial_config_keeps_defaults() {
    let config = ViewerConfig::from_json(
        r#"{
            "window": { "title": "bench" },
            "text": { "font_sizes": [96, 48, 24], "style": { "kind": "smooth", "smoothness": 0.2 } }
        }"#,
    )
    .unwrap();

    assert_eq!(config.window.title, "bench");
    assert_eq!(config.window.width, 1280);
    assert_eq!(config.text.font_sizes, vec![96.0, 48.0, 24.0]);
    assert_eq!(config.text.text, TextParams::default().text);
    assert_eq!(config.text.style, RenderStyle::Smooth { smoothness: 0.2 });
    assert_eq!(config.atlas, ViewerConfig::default().atlas);
}

#[test]
fn unit_styles_parse_by_kind() {
    let params: TextParams = serde_json::from_str(r#"{ "style": { "kind": "adaptive" } }"#).unwrap();

    assert_eq!(params.style, RenderStyle::Adaptive);
}

#[test]
fn invalid_config_is_a_json_error() {
    let err = ViewerConfig::from_json(r#"{ "window": { "width": "wide" } }"#).unwrap_err();

    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn missing_config_file_reports_path() {
    let err = ViewerConfig::load("no/such/viewer.json").unwrap_err();

    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("viewer.json"));
}

#[test]
fn smoothness_is_clamped() {
    assert_eq!(
        RenderStyle::smooth(0.9),
        RenderStyle::Smooth {
            smoothness: MAX_SMOOTHNESS
        }
    );
    assert_eq!(
        RenderStyle::smooth(-1.0),
        RenderStyle::Smooth { smoothness: 0.0 }
    );
}

#[test]
fn uniform_params_carry_range_and_smoothness() {
    assert_eq!(RenderStyle::Basic.uniform_params(4.0), [4.0, 0.0, 0.0, 0.0]);
    assert_eq!(
        RenderStyle::smooth(0.1).uniform_params(6.0),
        [6.0, 0.1, 0.0, 0.0]
    );
    assert_eq!(
        RenderStyle::Smooth { smoothness: 2.0 }.uniform_params(4.0),
        [4.0, MAX_SMOOTHNESS, 0.0, 0.0]
    );
}

#[test]
fn each_style_has_its_own_fragment_entry() {
    let entries = [
        RenderStyle::Basic.fragment_entry(),
        RenderStyle::smooth(0.1).fragment_entry(),
        RenderStyle::Adaptive.fragment_entry(),
    ];

    assert_eq!(entries, ["fs_basic", "fs_smooth", "fs_adaptive"]);
    assert_eq!(RenderStyle::Adaptive.name(), "adaptive");
}
