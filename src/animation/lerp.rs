use crate::foundation::{color::Color, core::Vec2};

/// Interpolation contract for values a signal can tween.
///
/// Smooth types interpolate component-wise. Types with no meaningful in-between value set
/// [`Animatable::SMOOTH`] to `false`: their tweens hold the start value and switch to the target
/// at completion.
pub trait Animatable: Clone + PartialEq + 'static {
    /// Whether [`Animatable::interpolate`] produces intermediate values.
    const SMOOTH: bool = true;

    /// Interpolate from `a` to `b` with eased factor `t` in `[0, 1]`.
    fn interpolate(a: &Self, b: &Self, t: f64) -> Self;
}

/// Step interpolation shared by the non-smooth impls.
fn step<T: Clone>(a: &T, b: &T, t: f64) -> T {
    if t >= 1.0 { b.clone() } else { a.clone() }
}

impl Animatable for f64 {
    fn interpolate(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Animatable for f32 {
    fn interpolate(a: &Self, b: &Self, t: f64) -> Self {
        (f64::from(*a) + ((f64::from(*b) - f64::from(*a)) * t)) as f32
    }
}

impl Animatable for Vec2 {
    fn interpolate(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

impl Animatable for Color {
    fn interpolate(a: &Self, b: &Self, t: f64) -> Self {
        Color::rgba(
            a.r + (b.r - a.r) * t,
            a.g + (b.g - a.g) * t,
            a.b + (b.b - a.b) * t,
            a.a + (b.a - a.a) * t,
        )
    }
}

impl Animatable for String {
    const SMOOTH: bool = false;

    fn interpolate(a: &Self, b: &Self, t: f64) -> Self {
        step(a, b, t)
    }
}

impl Animatable for bool {
    const SMOOTH: bool = false;

    fn interpolate(a: &Self, b: &Self, t: f64) -> Self {
        step(a, b, t)
    }
}
