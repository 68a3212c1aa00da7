use crate::{
    animation::{ease::Ease, lerp::Animatable},
    foundation::error::{FlowResult, check_duration},
};

/// Value trajectory from `start` to `end` over `duration` seconds.
///
/// Invariant: `0 <= elapsed <= duration`. At `elapsed == 0` the output is `start` and at
/// `elapsed == duration` it is `end`, both returned by clone rather than computed.
#[derive(Clone, Debug, PartialEq)]
pub struct TweenDriver<T> {
    start: T,
    end: T,
    duration: f64,
    ease: Ease,
    elapsed: f64,
}

impl<T> TweenDriver<T>
where
    T: Animatable,
{
    /// Create a driver. Zero durations are allowed and complete immediately.
    pub fn new(start: T, end: T, duration: f64, ease: Ease) -> FlowResult<Self> {
        let duration = check_duration("tween", duration)?;
        Ok(Self {
            start,
            end,
            duration,
            ease,
            elapsed: 0.0,
        })
    }

    /// Value at the current elapsed time.
    pub fn value(&self) -> T {
        if self.is_finished() {
            return self.end.clone();
        }
        if self.elapsed <= 0.0 {
            return self.start.clone();
        }
        let t = self.ease.apply(self.elapsed / self.duration);
        T::interpolate(&self.start, &self.end, t)
    }

    /// Jump to `elapsed` seconds after the start (clamped) and return the value there.
    pub fn seek(&mut self, elapsed: f64) -> T {
        self.elapsed = if elapsed.is_nan() {
            0.0
        } else {
            elapsed.clamp(0.0, self.duration)
        };
        self.value()
    }

    /// Advance by `dt` seconds and return the new value.
    pub fn advance(&mut self, dt: f64) -> T {
        self.seek(self.elapsed + dt)
    }

    /// Force completion.
    pub fn finish(&mut self) -> T {
        self.seek(self.duration)
    }

    /// `true` once elapsed time has reached the duration.
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Normalized, un-eased progress in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        }
    }

    /// Value at elapsed time zero.
    pub fn start(&self) -> &T {
        &self.start
    }

    /// Target value.
    pub fn end(&self) -> &T {
        &self.end
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Elapsed time in seconds, within `[0, duration]`.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Easing curve.
    pub fn ease(&self) -> Ease {
        self.ease
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
