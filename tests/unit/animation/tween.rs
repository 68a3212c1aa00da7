use super::*;
use crate::foundation::{color::Color, core::Vec2, error::FlowError};

#[test]
fn endpoints_are_exact_for_every_ease() {
    for ease in [Ease::Linear, Ease::InOutCubic, Ease::OutSine, Ease::InQuad] {
        let mut d = TweenDriver::new(0.1_f64, 0.7, 0.3, ease).unwrap();
        assert_eq!(d.value(), 0.1);
        for _ in 0..7 {
            d.advance(0.1 / 3.0);
        }
        // Accumulated float steps overshoot or undershoot; seek to the exact end.
        d.finish();
        assert_eq!(d.value(), 0.7);
        assert!(d.is_finished());
    }
}

#[test]
fn linear_midpoint() {
    let mut d = TweenDriver::new(0.0_f64, 10.0, 2.0, Ease::Linear).unwrap();
    assert_eq!(d.seek(1.0), 5.0);
    assert_eq!(d.progress(), 0.5);
}

#[test]
fn elapsed_is_clamped_into_duration() {
    let mut d = TweenDriver::new(0.0_f64, 1.0, 1.0, Ease::Linear).unwrap();
    assert_eq!(d.seek(-5.0), 0.0);
    assert_eq!(d.elapsed(), 0.0);
    assert_eq!(d.seek(99.0), 1.0);
    assert_eq!(d.elapsed(), 1.0);
    assert_eq!(d.advance(1.0), 1.0);
    assert_eq!(d.elapsed(), 1.0);
}

#[test]
fn zero_duration_is_instant_and_negative_is_rejected() {
    let d = TweenDriver::new(3.0_f64, 4.0, 0.0, Ease::Linear).unwrap();
    assert!(d.is_finished());
    assert_eq!(d.value(), 4.0);
    assert_eq!(d.progress(), 1.0);

    let err = TweenDriver::new(3.0_f64, 4.0, -1.0, Ease::Linear).unwrap_err();
    assert!(matches!(err, FlowError::InvalidDuration(_)));
}

#[test]
fn vectors_and_colors_interpolate_component_wise() {
    let mut d =
        TweenDriver::new(Vec2::new(0.0, 10.0), Vec2::new(10.0, 0.0), 1.0, Ease::Linear).unwrap();
    assert_eq!(d.seek(0.25), Vec2::new(2.5, 7.5));

    let mut d = TweenDriver::new(
        Color::rgba(0.0, 0.0, 0.0, 1.0),
        Color::rgba(1.0, 0.5, 0.0, 1.0),
        1.0,
        Ease::Linear,
    )
    .unwrap();
    assert_eq!(d.seek(0.5), Color::rgba(0.5, 0.25, 0.0, 1.0));
}

#[test]
fn strings_step_at_completion() {
    let mut d = TweenDriver::new("a".to_owned(), "b".to_owned(), 1.0, Ease::Linear).unwrap();
    assert_eq!(d.seek(0.99), "a");
    assert_eq!(d.seek(1.0), "b");
    assert!(!<String as Animatable>::SMOOTH);
    assert!(<f64 as Animatable>::SMOOTH);
}
