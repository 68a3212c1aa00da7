use super::*;

const ALL: [Ease; 10] = [
    Ease::Linear,
    Ease::InQuad,
    Ease::OutQuad,
    Ease::InOutQuad,
    Ease::InCubic,
    Ease::OutCubic,
    Ease::InOutCubic,
    Ease::InSine,
    Ease::OutSine,
    Ease::InOutSine,
];

#[test]
fn endpoints_are_exact() {
    for e in ALL {
        assert_eq!(e.apply(0.0), 0.0, "{e:?}");
        assert_eq!(e.apply(1.0), 1.0, "{e:?}");
        assert_eq!(e.apply(-3.0), 0.0, "{e:?}");
        assert_eq!(e.apply(7.0), 1.0, "{e:?}");
    }
}

#[test]
fn symmetric_curves_pass_through_half() {
    for e in [
        Ease::Linear,
        Ease::InOutQuad,
        Ease::InOutCubic,
        Ease::InOutSine,
    ] {
        assert!((e.apply(0.5) - 0.5).abs() < 1e-12, "{e:?}");
    }
}

#[test]
fn curves_are_monotonic() {
    for e in ALL {
        let mut prev = 0.0;
        for i in 1..=100 {
            let v = e.apply(f64::from(i) / 100.0);
            assert!(v >= prev, "{e:?} at {i}");
            prev = v;
        }
    }
}

#[test]
fn default_and_serde_names() {
    assert_eq!(Ease::default(), Ease::InOutCubic);
    let e: Ease = serde_json::from_str("\"in_out_sine\"").unwrap();
    assert_eq!(e, Ease::InOutSine);
}
