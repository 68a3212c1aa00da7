use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FlowError::cycle("x")
            .to_string()
            .contains("dependency cycle detected:")
    );
    assert!(
        FlowError::invalid_duration("x")
            .to_string()
            .contains("invalid duration:")
    );
    assert!(
        FlowError::group_child_failure("x")
            .to_string()
            .contains("group child failure:")
    );
    assert!(
        FlowError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(FlowError::stalled("x").to_string().contains("thread stalled:"));
    assert!(
        FlowError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FlowError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn fatal_classification() {
    assert!(FlowError::cycle("a").is_fatal());
    assert!(FlowError::group_child_failure("a").is_fatal());
    assert!(!FlowError::invalid_duration("a").is_fatal());
    assert!(!FlowError::validation("a").is_fatal());
}

#[test]
fn check_duration_accepts_zero_rejects_negative_and_nan() {
    assert_eq!(check_duration("tween", 0.0).unwrap(), 0.0);
    assert_eq!(check_duration("tween", 1.5).unwrap(), 1.5);
    assert!(matches!(
        check_duration("tween", -0.1),
        Err(FlowError::InvalidDuration(_))
    ));
    assert!(matches!(
        check_duration("tween", f64::NAN),
        Err(FlowError::InvalidDuration(_))
    ));
    assert!(matches!(
        check_duration("tween", f64::INFINITY),
        Err(FlowError::InvalidDuration(_))
    ));
}
