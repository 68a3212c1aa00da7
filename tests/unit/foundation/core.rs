use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert!(Fps { num: 30, den: 0 }.validate().is_err());
    assert!(Fps::new(30000, 1001).is_ok());
}

#[test]
fn fps_frames_secs_roundtrip_floor() {
    let fps = Fps::new(30000, 1001).unwrap();
    let secs = fps.frames_to_secs(123);
    assert_eq!(fps.secs_to_frames_floor(secs), 123);
    assert_eq!(fps.secs_to_frames_ceil(secs), 123);
}

#[test]
fn summed_durations_land_on_frame_boundaries() {
    let fps = Fps::new(10, 1).unwrap();
    let t = 0.1 + 0.2;
    assert_eq!(fps.secs_to_frames_ceil(t), 3);
    assert!(fps.reached(FrameIndex(3), t));
    assert!(!fps.reached(FrameIndex(2), t));

    let t = 0.2 + 0.2 + 0.2;
    assert_eq!(fps.secs_to_frames_ceil(t), 6);
}

#[test]
fn targets_between_frames_round_up() {
    let fps = Fps::new(30, 1).unwrap();
    // 0.05s is 1.5 frames: reached on frame 2.
    assert!(!fps.reached(FrameIndex(1), 0.05));
    assert!(fps.reached(FrameIndex(2), 0.05));
    assert_eq!(fps.secs_to_frames_floor(0.05), 1);
}

#[test]
fn frame_time_is_not_accumulated() {
    let fps = Fps::new(60, 1).unwrap();
    assert_eq!(fps.frames_to_secs(120), 2.0);
    assert_eq!(fps.frame_duration_secs(), 1.0 / 60.0);
    assert_eq!(FrameIndex(4).next(), FrameIndex(5));
}
