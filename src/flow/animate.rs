use crate::{
    animation::{ease::Ease, lerp::Animatable, tween::TweenDriver},
    flow::thread::{Procedure, Step, ThreadCtx},
    foundation::error::{FlowResult, check_duration},
    signal::signal::Signal,
};

enum Phase<T> {
    Idle,
    Running {
        driver: TweenDriver<T>,
        start_time: f64,
        token: u64,
    },
    Done,
}

/// Coroutine body that drives a signal with a [`TweenDriver`].
///
/// The start value is read on the first resume. Every step writes the value at
/// `now - start_time`; the step that reaches `start_time + duration` writes the target exactly,
/// moves the thread's logical time to that end and completes.
pub(crate) struct Animate<T> {
    signal: Signal<T>,
    target: T,
    duration: f64,
    ease: Ease,
    phase: Phase<T>,
}

impl<T> Animate<T>
where
    T: Animatable,
{
    pub(crate) fn new(signal: Signal<T>, target: T, duration: f64, ease: Ease) -> FlowResult<Self> {
        let duration = check_duration("animation", duration)?;
        if !T::SMOOTH {
            tracing::warn!(
                signal = %signal.label(),
                value_type = std::any::type_name::<T>(),
                "type has no smooth interpolation; value switches at completion"
            );
        }
        Ok(Self {
            signal,
            target,
            duration,
            ease,
            phase: Phase::Idle,
        })
    }

    fn write(&self, token: u64, value: T) {
        // A newer tween took the signal over: keep timing, stop writing.
        if self.signal.owns_driver(token) {
            self.signal.write(value);
        }
    }
}

impl<T> Procedure for Animate<T>
where
    T: Animatable,
{
    fn resume(&mut self, cx: &mut ThreadCtx<'_>) -> FlowResult<Step> {
        if let Phase::Idle = self.phase {
            let start = self.signal.read()?;
            let driver = TweenDriver::new(start, self.target.clone(), self.duration, self.ease)?;
            let token = self.signal.claim_driver();
            self.phase = Phase::Running {
                driver,
                start_time: cx.time(),
                token,
            };
        }

        let Phase::Running {
            driver,
            start_time,
            token,
        } = &mut self.phase
        else {
            return Ok(Step::Complete);
        };
        let (start_time, token) = (*start_time, *token);
        let end_time = start_time + driver.duration();

        if driver.duration() == 0.0 || cx.reached(end_time) {
            let value = driver.finish();
            self.write(token, value);
            self.signal.release_driver(token);
            cx.set_time(end_time);
            self.phase = Phase::Done;
            return Ok(Step::Complete);
        }

        let value = driver.seek(cx.now() - start_time);
        self.write(token, value);
        Ok(Step::next_frame())
    }

    fn on_cancel(&mut self) {
        if let Phase::Running { token, .. } = self.phase {
            self.signal.release_driver(token);
        }
        self.phase = Phase::Done;
    }
}
