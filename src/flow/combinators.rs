use crate::{
    flow::thread::{Step, Thread, ThreadCtx, ThreadId},
    foundation::error::{FlowResult, check_duration},
};
use std::collections::VecDeque;

/// Suspend for `secs` of scene time. Zero completes without suspending.
pub fn wait_for(secs: f64) -> FlowResult<Thread> {
    let secs = check_duration("wait", secs)?;
    let mut waited = false;
    Ok(Thread::from_fn(
        format!("wait_for {secs}"),
        move |_cx: &mut ThreadCtx<'_>| {
            if waited || secs == 0.0 {
                return Ok(Step::Complete);
            }
            waited = true;
            Ok(Step::wait_for(secs))
        },
    ))
}

/// Suspend until the cue source reports `label`.
///
/// A cue that never fires leaves the thread suspended; the scheduler reports it as an
/// unresolved wait when the scene ends.
pub fn wait_until(label: impl Into<String>) -> Thread {
    let label = label.into();
    let mut waited = false;
    Thread::from_fn(
        format!("wait_until {label}"),
        move |cx: &mut ThreadCtx<'_>| {
            if waited || cx.cue_reached(&label) {
                return Ok(Step::Complete);
            }
            waited = true;
            Ok(Step::until_cue(label.clone()))
        },
    )
}

/// Run every thread in parallel, starting on the same step; complete when all have finished.
pub fn all(threads: impl IntoIterator<Item = Thread>) -> Thread {
    let mut pending: Option<Vec<Thread>> = Some(threads.into_iter().collect());
    Thread::from_fn("all", move |cx: &mut ThreadCtx<'_>| {
        let Some(threads) = pending.take() else {
            return Ok(Step::Complete);
        };
        if threads.is_empty() {
            return Ok(Step::Complete);
        }
        let ids = threads
            .into_iter()
            .map(|t| cx.spawn(t))
            .collect::<FlowResult<Vec<ThreadId>>>()?;
        Ok(Step::join(ids))
    })
}

/// Run threads one after another; each starts on the step the previous one completes.
pub fn sequence(threads: impl IntoIterator<Item = Thread>) -> Thread {
    let mut queue: VecDeque<Thread> = threads.into_iter().collect();
    Thread::from_fn("sequence", move |cx: &mut ThreadCtx<'_>| {
        let Some(next) = queue.pop_front() else {
            return Ok(Step::Complete);
        };
        let id = cx.spawn(next)?;
        Ok(Step::join([id]))
    })
}

/// Alias of [`sequence`].
pub fn chain(threads: impl IntoIterator<Item = Thread>) -> Thread {
    sequence(threads).named("chain")
}

/// Sequence with a start-to-start delay.
///
/// Thread `i` starts `i * delay` seconds after the first one, whether or not earlier threads
/// have finished, so threads overlap when they last longer than `delay`. Completes when every
/// thread has finished.
pub fn stagger(delay: f64, threads: impl IntoIterator<Item = Thread>) -> FlowResult<Thread> {
    let delay = check_duration("stagger delay", delay)?;
    let mut queue: VecDeque<Thread> = threads.into_iter().collect();
    let mut started: Vec<ThreadId> = Vec::with_capacity(queue.len());
    let mut joined = false;
    Ok(Thread::from_fn(
        format!("stagger {delay}"),
        move |cx: &mut ThreadCtx<'_>| {
            if let Some(next) = queue.pop_front() {
                started.push(cx.spawn(next)?);
                if !queue.is_empty() {
                    return Ok(Step::wait_for(delay));
                }
            }
            if joined || started.is_empty() {
                return Ok(Step::Complete);
            }
            joined = true;
            Ok(Step::join(started.iter().copied()))
        },
    ))
}

/// Start `thread` after `secs` of scene time.
pub fn delay(secs: f64, thread: Thread) -> FlowResult<Thread> {
    Ok(sequence([wait_for(secs)?, thread]).named(format!("delay {secs}")))
}

/// Run `factory(0)`, `factory(1)`, ... `factory(count - 1)` one after another.
///
/// Each thread is built when its turn comes, so it sees the state left by the previous one.
pub fn repeat(
    count: usize,
    mut factory: impl FnMut(usize) -> FlowResult<Thread> + 'static,
) -> Thread {
    let mut i = 0;
    Thread::from_fn(format!("repeat {count}"), move |cx: &mut ThreadCtx<'_>| {
        if i >= count {
            return Ok(Step::Complete);
        }
        let next = factory(i)?;
        i += 1;
        let id = cx.spawn(next)?;
        Ok(Step::join([id]))
    })
}

/// Zero-time step: run `f` once when the thread starts, then complete.
pub fn run(f: impl FnOnce(&mut ThreadCtx<'_>) -> FlowResult<()> + 'static) -> Thread {
    let mut f = Some(f);
    Thread::from_fn("run", move |cx: &mut ThreadCtx<'_>| {
        if let Some(f) = f.take() {
            f(cx)?;
        }
        Ok(Step::Complete)
    })
}

/// Build a thread when this one starts, run it, and complete with it.
///
/// Use it for steps whose construction depends on state reached earlier in the scene, such as
/// cloning a node after it was animated.
pub fn defer(f: impl FnOnce(&mut ThreadCtx<'_>) -> FlowResult<Thread> + 'static) -> Thread {
    let mut f = Some(f);
    Thread::from_fn("defer", move |cx: &mut ThreadCtx<'_>| {
        let Some(f) = f.take() else {
            return Ok(Step::Complete);
        };
        let inner = f(cx)?;
        let id = cx.spawn(inner)?;
        Ok(Step::join([id]))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/flow/combinators.rs"]
mod tests;
