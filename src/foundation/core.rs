use crate::foundation::error::{FlowError, FlowResult};

pub use kurbo::Vec2;

/// Tolerance, in frames, used when mapping a scene time onto the frame grid.
///
/// Scene times come from sums of user durations (`0.2 + 0.2 + ...`); this absorbs the last-bit
/// error of those sums so a target that lands on a frame boundary is reached on that frame.
pub const FRAME_EPSILON: f64 = 1e-6;

/// Absolute 0-based frame index on the scheduler clock.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// The frame after this one.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 60, den: 1 }
    }
}

impl Fps {
    /// Create a validated frame rate with non-zero numerator and denominator.
    pub fn new(num: u32, den: u32) -> FlowResult<Self> {
        if den == 0 {
            return Err(FlowError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(FlowError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Re-check invariants of a value built without [`Fps::new`] (e.g. deserialized).
    pub fn validate(self) -> FlowResult<()> {
        Self::new(self.num, self.den).map(|_| ())
    }

    /// Frames per second as a float.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Length of one frame (`Δt`) in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Scene time of frame `frames`.
    ///
    /// Computed from the frame index directly, never accumulated, so frame `k` always maps to the
    /// same time.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * f64::from(self.den) / f64::from(self.num)
    }

    /// Last frame whose time is `<= secs`.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64() + FRAME_EPSILON).floor().max(0.0) as u64
    }

    /// First frame whose time is `>= secs` (within [`FRAME_EPSILON`]).
    pub fn secs_to_frames_ceil(self, secs: f64) -> u64 {
        (secs * self.as_f64() - FRAME_EPSILON).ceil().max(0.0) as u64
    }

    /// Return `true` once frame `frame` has reached scene time `secs`.
    pub fn reached(self, frame: FrameIndex, secs: f64) -> bool {
        frame.0 >= self.secs_to_frames_ceil(secs)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
