/// Easing curves mapping normalized progress `[0, 1]` onto `[0, 1]`.
///
/// Every curve returns exactly `0.0` at `t <= 0` and exactly `1.0` at `t >= 1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    /// Constant speed.
    Linear,
    /// Quadratic acceleration.
    InQuad,
    /// Quadratic deceleration.
    OutQuad,
    /// Quadratic acceleration, then deceleration.
    InOutQuad,
    /// Cubic acceleration.
    InCubic,
    /// Cubic deceleration.
    OutCubic,
    #[default]
    /// Cubic acceleration, then deceleration.
    InOutCubic,
    /// Sinusoidal acceleration.
    InSine,
    /// Sinusoidal deceleration.
    OutSine,
    /// Sinusoidal acceleration, then deceleration.
    InOutSine,
}

impl Ease {
    /// Eased progress for linear progress `t`, clamped to `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        if t.is_nan() || t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::InSine => 1.0 - (t * std::f64::consts::FRAC_PI_2).cos(),
            Self::OutSine => (t * std::f64::consts::FRAC_PI_2).sin(),
            Self::InOutSine => -((std::f64::consts::PI * t).cos() - 1.0) / 2.0,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
