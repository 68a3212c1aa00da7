use super::*;

#[test]
fn reached_at_and_after_cue_time() {
    let cues = CueTimeline::new().with_cue("initSound", 1.5).unwrap();
    assert!(!cues.has_reached("initSound", 1.4));
    assert!(cues.has_reached("initSound", 1.5));
    assert!(cues.has_reached("initSound", 9.0));
    assert!(!cues.has_reached("missing", 9.0));
    assert_eq!(cues.cue_time("initSound"), Some(1.5));
}

#[test]
fn no_cues_never_fires() {
    assert!(!NoCues.has_reached("anything", f64::MAX));
    assert_eq!(NoCues.cue_time("anything"), None);
}

#[test]
fn json_roundtrip_sorted_by_time() {
    let json = r#"{"cues":[{"name":"mutateStart","time":4.0},{"name":"initSound","time":0.5}]}"#;
    let cues = CueTimeline::from_json(json).unwrap();
    assert_eq!(cues.len(), 2);
    let names: Vec<String> = cues.cues().into_iter().map(|c| c.name).collect();
    assert_eq!(names, ["initSound", "mutateStart"]);

    let back = CueTimeline::from_json(&cues.to_json().unwrap()).unwrap();
    assert_eq!(back, cues);
}

#[test]
fn rejects_bad_times_and_duplicates() {
    assert!(CueTimeline::new().with_cue("a", -1.0).is_err());
    assert!(CueTimeline::new().with_cue("a", f64::NAN).is_err());

    let dup = r#"{"cues":[{"name":"a","time":1.0},{"name":"a","time":2.0}]}"#;
    assert!(matches!(
        CueTimeline::from_json(dup),
        Err(FlowError::Validation(_))
    ));
    assert!(matches!(
        CueTimeline::from_json("{not json"),
        Err(FlowError::Serde(_))
    ));
}
