use crate::{
    flow::cue::CueSource,
    foundation::{
        core::{Fps, FrameIndex},
        error::FlowResult,
        rng::Rng64,
    },
    scheduler::arena::Arena,
};
use smallvec::SmallVec;
use std::fmt;

/// Stable identifier of a spawned thread.
///
/// Ids are allocated in spawn order and never reused within one scheduler, so the state of a
/// finished thread stays queryable.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ThreadId(pub u32);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a thread.
///
/// `Pending -> Running -> Suspended -> ... -> Completed`, with `Cancelled` reachable from every
/// non-terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ThreadState {
    /// Spawned, not resumed yet.
    Pending,
    /// Currently executing its synchronous section.
    Running,
    /// Waiting on a [`Suspend`] condition.
    Suspended,
    /// Ran to the end.
    Completed,
    /// Cancelled directly or through an ancestor.
    Cancelled,
}

impl ThreadState {
    /// `true` for `Completed` and `Cancelled`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// The single condition a suspended thread waits on.
#[derive(Clone, Debug, PartialEq)]
pub enum Suspend {
    /// Resume once scene time reaches the thread's logical time plus this many seconds.
    For(f64),
    /// Resume once the cue source reports the label as reached.
    UntilCue(String),
    /// Resume once every listed thread is completed or cancelled.
    UntilChildren(SmallVec<[ThreadId; 4]>),
    /// Resume on the next scheduler step.
    NextFrame,
}

/// Outcome of one [`Procedure::resume`] call.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// Stop here until the condition holds.
    Suspend(Suspend),
    /// The body ran to the end.
    Complete,
}

impl Step {
    /// Suspend for `secs` of scene time.
    pub fn wait_for(secs: f64) -> Self {
        Self::Suspend(Suspend::For(secs))
    }

    /// Suspend until cue `label` is reached.
    pub fn until_cue(label: impl Into<String>) -> Self {
        Self::Suspend(Suspend::UntilCue(label.into()))
    }

    /// Suspend until every thread in `ids` has finished.
    pub fn join(ids: impl IntoIterator<Item = ThreadId>) -> Self {
        Self::Suspend(Suspend::UntilChildren(ids.into_iter().collect()))
    }

    /// Suspend for exactly one step.
    pub fn next_frame() -> Self {
        Self::Suspend(Suspend::NextFrame)
    }
}

/// A resumable animation procedure.
///
/// Each call runs synchronous code up to the next suspension point and reports it. Locals that
/// must survive a suspension live in the implementing type.
pub trait Procedure {
    /// Run until the next suspension point or the end of the body.
    fn resume(&mut self, cx: &mut ThreadCtx<'_>) -> FlowResult<Step>;

    /// Called once when the thread is cancelled before completing.
    fn on_cancel(&mut self) {}
}

impl<F> Procedure for F
where
    F: FnMut(&mut ThreadCtx<'_>) -> FlowResult<Step>,
{
    fn resume(&mut self, cx: &mut ThreadCtx<'_>) -> FlowResult<Step> {
        self(cx)
    }
}

/// An unspawned coroutine: a label plus its body.
pub struct Thread {
    pub(crate) label: String,
    pub(crate) body: Box<dyn Procedure>,
}

impl Thread {
    /// Wrap `body` under `label`.
    pub fn new(label: impl Into<String>, body: impl Procedure + 'static) -> Self {
        Self {
            label: label.into(),
            body: Box::new(body),
        }
    }

    /// Build a thread from a closure state machine.
    pub fn from_fn(
        label: impl Into<String>,
        f: impl FnMut(&mut ThreadCtx<'_>) -> FlowResult<Step> + 'static,
    ) -> Self {
        Self::new(label, f)
    }

    /// Label used in logs and diagnostics.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Replace the label used in logs and diagnostics.
    pub fn named(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

impl fmt::Debug for Thread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thread").field("label", &self.label).finish()
    }
}

/// Execution context handed to a resuming procedure.
pub struct ThreadCtx<'a> {
    pub(crate) id: ThreadId,
    pub(crate) frame: FrameIndex,
    pub(crate) fps: Fps,
    pub(crate) time: f64,
    pub(crate) arena: &'a mut Arena,
    pub(crate) cues: &'a dyn CueSource,
    pub(crate) rng: &'a mut Rng64,
    pub(crate) spawned: Vec<ThreadId>,
}

impl ThreadCtx<'_> {
    /// Id of the resuming thread.
    pub fn id(&self) -> ThreadId {
        self.id
    }

    /// Frame being evaluated.
    pub fn frame(&self) -> FrameIndex {
        self.frame
    }

    /// Scheduler frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Scene time of the frame being evaluated.
    pub fn now(&self) -> f64 {
        self.fps.frames_to_secs(self.frame.0)
    }

    /// Logical time of this thread.
    ///
    /// Waits set it to their exact target, so it can trail [`ThreadCtx::now`] by less than one
    /// frame. Durations are measured from here.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Move this thread's logical time, e.g. to the exact end of a tween.
    pub fn set_time(&mut self, secs: f64) {
        self.time = secs;
    }

    /// Return `true` once the frame clock has reached scene time `secs`.
    pub fn reached(&self, secs: f64) -> bool {
        self.fps.reached(self.frame, secs)
    }

    /// Spawn a child thread.
    ///
    /// The child starts at this thread's logical time and gets its first resume in the same step,
    /// right after this thread suspends. Children spawned in one resume run in spawn order.
    ///
    /// Fails with [`FlowError::Validation`](crate::FlowError::Validation) once the scheduler's
    /// thread limit is reached.
    pub fn spawn(&mut self, thread: Thread) -> FlowResult<ThreadId> {
        let id = self
            .arena
            .insert(thread, Some(self.id), self.time, self.frame)?;
        tracing::debug!(thread = %id, parent = %self.id, label = %self.arena.label(id), "spawn");
        self.spawned.push(id);
        Ok(id)
    }

    /// Cancel a thread and all of its descendants immediately.
    pub fn cancel(&mut self, id: ThreadId) {
        self.arena.cancel(id, self.frame);
    }

    /// State of any thread spawned so far.
    pub fn state_of(&self, id: ThreadId) -> Option<ThreadState> {
        self.arena.state(id)
    }

    /// Poll the cue source.
    pub fn cue_reached(&self, label: &str) -> bool {
        self.cues.has_reached(label, self.now())
    }

    /// Scene-wide seeded random source.
    pub fn rng(&mut self) -> &mut Rng64 {
        self.rng
    }
}
