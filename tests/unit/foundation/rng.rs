use super::*;

#[test]
fn rng_is_deterministic() {
    let mut a = Rng64::new(123);
    let mut b = Rng64::new(123);
    for _ in 0..10 {
        assert_eq!(a.next_u64(), b.next_u64());
    }
}

#[test]
fn next_int_stays_in_half_open_range() {
    let mut rng = Rng64::new(7);
    let mut seen = [false; 9];
    for _ in 0..2000 {
        let v = rng.next_int(-4, 5);
        assert!((-4..5).contains(&v));
        seen[(v + 4) as usize] = true;
    }
    assert!(seen.iter().all(|s| *s));
    assert_eq!(rng.next_int(3, 3), 3);
}

#[test]
fn floats_are_bounded() {
    let mut rng = Rng64::new(0);
    for _ in 0..100 {
        let v = rng.next_f64_01();
        assert!((0.0..1.0).contains(&v));
        let w = rng.next_float(-2.0, 2.0);
        assert!((-2.0..2.0).contains(&w));
    }
}
