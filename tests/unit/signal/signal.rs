use super::*;
use crate::foundation::error::FlowError;

fn sum_of(a: &Signal<f64>, b: &Signal<f64>) -> Signal<f64> {
    let (a, b) = (a.clone(), b.clone());
    Signal::computed(move |d| Ok(d.read(&a)? + d.read(&b)?)).named("sum")
}

#[test]
fn constant_read_write() {
    let s = Signal::new(1.5).named("opacity");
    assert_eq!(s.label(), "opacity");
    assert_eq!(s.kind(), SignalKind::Constant);
    assert_eq!(s.read().unwrap(), 1.5);
    s.write(2.5);
    assert_eq!(s.read().unwrap(), 2.5);
}

#[test]
fn computed_is_memoized_and_recomputed_once_per_change() {
    let a = Signal::new(1.0);
    let b = Signal::new(2.0);
    let sum = sum_of(&a, &b);
    assert_eq!(sum.kind(), SignalKind::Computed);
    assert_eq!(sum.evaluations(), 0);

    assert_eq!(sum.read().unwrap(), 3.0);
    assert_eq!(sum.read().unwrap(), 3.0);
    assert_eq!(sum.evaluations(), 1);

    a.write(5.0);
    // Invalidation is lazy: nothing runs until the next read.
    assert_eq!(sum.evaluations(), 1);
    assert_eq!(sum.read().unwrap(), 7.0);
    assert_eq!(sum.read().unwrap(), 7.0);
    assert_eq!(sum.evaluations(), 2);

    a.write(6.0);
    b.write(0.0);
    assert_eq!(sum.read().unwrap(), 6.0);
    assert_eq!(sum.evaluations(), 3);
}

#[test]
fn invalidation_is_transitive() {
    let a = Signal::new(1.0);
    let b = Signal::new(2.0);
    let sum = sum_of(&a, &b);
    let doubled = {
        let sum = sum.clone();
        Signal::computed(move |d| Ok(d.read(&sum)? * 2.0))
    };
    assert_eq!(doubled.read().unwrap(), 6.0);

    a.write(10.0);
    assert_eq!(doubled.read().unwrap(), 24.0);
    assert_eq!(doubled.evaluations(), 2);
    assert_eq!(sum.evaluations(), 2);
}

#[test]
fn diamond_recomputes_each_vertex_once() {
    let base = Signal::new(1.0);
    let left = {
        let base = base.clone();
        Signal::computed(move |d| Ok(d.read(&base)? + 1.0))
    };
    let right = {
        let base = base.clone();
        Signal::computed(move |d| Ok(d.read(&base)? * 2.0))
    };
    let top = sum_of(&left, &right);
    assert_eq!(top.read().unwrap(), 4.0);

    base.write(3.0);
    assert_eq!(top.read().unwrap(), 10.0);
    assert_eq!(top.evaluations(), 2);
    assert_eq!(left.evaluations(), 2);
    assert_eq!(right.evaluations(), 2);
}

#[test]
fn dependencies_follow_the_last_evaluation() {
    let flag = Signal::new(true);
    let x = Signal::new(1.0);
    let y = Signal::new(2.0);
    let pick = {
        let (flag, x, y) = (flag.clone(), x.clone(), y.clone());
        Signal::computed(move |d| if d.read(&flag)? { d.read(&x) } else { d.read(&y) })
    };
    assert_eq!(pick.read().unwrap(), 1.0);
    assert_eq!(pick.dependency_count(), 2);

    flag.write(false);
    assert_eq!(pick.read().unwrap(), 2.0);
    assert_eq!(x.dependent_count(), 0);
    assert_eq!(y.dependent_count(), 1);

    x.write(50.0);
    assert_eq!(pick.read().unwrap(), 2.0);
    assert_eq!(pick.evaluations(), 2);
}

#[test]
fn repeated_reads_register_one_dependency() {
    let a = Signal::new(2.0);
    let square = {
        let a = a.clone();
        Signal::computed(move |d| Ok(d.read(&a)? * d.read(&a)?))
    };
    assert_eq!(square.read().unwrap(), 4.0);
    assert_eq!(square.dependency_count(), 1);
    assert_eq!(a.dependent_count(), 1);
}

#[test]
fn mutual_dependency_fails_with_cycle_error() {
    let a = Signal::new(0.0).named("a");
    let b = {
        let a = a.clone();
        Signal::computed(move |d| Ok(d.read(&a)? + 1.0)).named("b")
    };
    {
        let b = b.clone();
        a.write_computed(move |d| Ok(d.read(&b)? + 1.0));
    }

    assert!(matches!(a.read(), Err(FlowError::CycleDetected(_))));
    assert!(matches!(b.read(), Err(FlowError::CycleDetected(_))));
}

#[test]
fn self_dependency_fails_with_cycle_error() {
    let s = Signal::new(1.0);
    {
        let me = s.clone();
        s.write_computed(move |d| d.read(&me));
    }
    let err = s.read().unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn writing_a_computed_signal_stops_tracking() {
    let a = Signal::new(1.0);
    let b = Signal::new(1.0);
    let sum = sum_of(&a, &b);
    assert_eq!(sum.read().unwrap(), 2.0);

    sum.write(9.0);
    assert_eq!(sum.kind(), SignalKind::Constant);
    assert_eq!(a.dependent_count(), 0);
    a.write(100.0);
    assert_eq!(sum.read().unwrap(), 9.0);
}

#[test]
fn reset_restores_the_initial_source() {
    let s = Signal::new(1.0);
    s.write(3.0);
    s.reset();
    assert_eq!(s.read().unwrap(), 1.0);

    let a = Signal::new(1.0);
    let b = Signal::new(2.0);
    let sum = sum_of(&a, &b);
    sum.write(0.0);
    a.write(4.0);
    sum.reset();
    assert_eq!(sum.kind(), SignalKind::Computed);
    assert_eq!(sum.read().unwrap(), 6.0);
}

#[test]
fn writes_invalidate_dependents_of_a_reset_signal() {
    let a = Signal::new(1.0);
    let twice = {
        let a = a.clone();
        Signal::computed(move |d| Ok(d.read(&a)? * 2.0))
    };
    a.write(5.0);
    assert_eq!(twice.read().unwrap(), 10.0);
    a.reset();
    assert_eq!(twice.read().unwrap(), 2.0);
}

#[test]
fn snapshot_is_an_independent_cell() {
    let a = Signal::new(1.0);
    let b = Signal::new(2.0);
    let sum = sum_of(&a, &b);

    let frozen = sum.snapshot().unwrap();
    assert_eq!(frozen.kind(), SignalKind::Constant);
    assert_eq!(frozen.label(), "sum");
    assert!(!frozen.same_cell(&sum));
    assert!(sum.clone().same_cell(&sum));

    a.write(10.0);
    assert_eq!(frozen.read().unwrap(), 3.0);
    frozen.write(-1.0);
    assert_eq!(sum.read().unwrap(), 12.0);
}

#[test]
fn newest_driver_owns_the_signal() {
    let s = Signal::new(0.0);
    let first = s.claim_driver();
    assert_eq!(s.kind(), SignalKind::Animated);
    let second = s.claim_driver();
    assert!(!s.owns_driver(first));
    assert!(s.owns_driver(second));

    s.release_driver(first);
    assert_eq!(s.kind(), SignalKind::Animated);
    s.release_driver(second);
    assert_eq!(s.kind(), SignalKind::Constant);
}

#[test]
fn animate_to_builds_a_labelled_thread() {
    let s = Signal::new(0.0).named("x");
    let t = s.animate_to(1.0, 0.5, Ease::Linear).unwrap();
    assert_eq!(t.label(), "animate x");
    assert!(matches!(
        s.animate_to(1.0, -0.5, Ease::Linear),
        Err(FlowError::InvalidDuration(_))
    ));
}
