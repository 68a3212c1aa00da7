use super::*;
use serde_json::json;

#[test]
fn parses_short_and_long_hex() {
    assert_eq!(Color::parse("#999").unwrap(), Color::rgb8(0x99, 0x99, 0x99));
    assert_eq!(
        Color::parse("#ff6470").unwrap(),
        Color::rgb8(0xff, 0x64, 0x70)
    );
    let c = Color::parse("#0000ff80").unwrap();
    assert!((c.b - 1.0).abs() < 1e-9);
    assert!((c.a - (128.0 / 255.0)).abs() < 1e-9);
}

#[test]
fn parses_named_colors_case_insensitively() {
    assert_eq!(Color::parse("gold").unwrap(), Color::rgb8(255, 215, 0));
    assert_eq!(Color::parse("DarkRed").unwrap(), Color::rgb8(139, 0, 0));
    assert!(Color::parse("nope").is_err());
    assert!(Color::parse("#12345").is_err());
}

#[test]
fn deserializes_string_and_object() {
    let c: Color = serde_json::from_value(json!("#68ABDF")).unwrap();
    assert_eq!(c.to_rgba8(), [0x68, 0xab, 0xdf, 255]);

    let c: Color = serde_json::from_value(json!({"r": 0.25, "g": 0.5, "b": 0.75})).unwrap();
    assert_eq!(c, Color::rgba(0.25, 0.5, 0.75, 1.0));
}
