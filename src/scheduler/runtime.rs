use crate::{
    flow::{
        cue::{CueSource, NoCues},
        thread::{Step, Suspend, Thread, ThreadCtx, ThreadId, ThreadState},
    },
    foundation::{
        core::{Fps, FrameIndex},
        error::{FlowError, FlowResult, check_duration},
        rng::Rng64,
    },
    scheduler::{
        arena::Arena,
        report::{Diagnostic, SceneEnd, SceneReport, StepReport},
        trace::{Probe, Recorder},
    },
};
use smallvec::SmallVec;

/// Upper bound on resumes of one thread within one step.
///
/// A thread that keeps suspending on already-satisfied conditions (zero waits, finished joins)
/// is resumed again in the same step; past this bound the run fails with
/// [`FlowError::Stalled`].
pub const MAX_RESUMES_PER_STEP: u32 = 10_000;

/// What an `all`/`sequence`-style join does when one of the joined threads is cancelled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupPolicy {
    /// A cancelled child counts as finished; the group carries on.
    #[default]
    IgnoreCancelled,
    /// A cancelled child fails the run with [`FlowError::GroupChildFailure`].
    FailGroup,
}

/// Scheduler configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Frame rate fixing `Δt`.
    pub fps: Fps,
    /// Scene end when the root has not completed by then. `None` lets [`Scheduler::run`] loop
    /// until the root completes.
    pub max_duration_secs: Option<f64>,
    /// Join behavior for cancelled children.
    pub group_policy: GroupPolicy,
    /// Seed of the scene-wide [`Rng64`].
    pub seed: u64,
    /// Most threads one run may spawn, root included. Spawning past it fails the step.
    pub max_threads: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            fps: Fps::default(),
            max_duration_secs: Some(600.0),
            group_policy: GroupPolicy::default(),
            seed: 0,
            max_threads: u32::MAX,
        }
    }
}

impl SchedulerConfig {
    /// Default configuration at the given frame rate.
    pub fn at_fps(num: u32, den: u32) -> FlowResult<Self> {
        Ok(Self {
            fps: Fps::new(num, den)?,
            ..Self::default()
        })
    }

    /// Reject a zero frame rate, a zero thread limit and non-positive time limits.
    pub fn validate(&self) -> FlowResult<()> {
        self.fps.validate()?;
        if self.max_threads == 0 {
            return Err(FlowError::validation("max_threads must be > 0"));
        }
        if let Some(max) = self.max_duration_secs {
            if !max.is_finite() || max <= 0.0 {
                return Err(FlowError::validation(format!(
                    "max_duration_secs must be finite and > 0, got {max}"
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing fields take their defaults.
    pub fn from_json(s: &str) -> FlowResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Drives a tree of threads forward one frame per [`Scheduler::step`].
///
/// Each step visits the tree depth-first from the root. At every thread, live children are
/// visited first in spawn order, then the thread itself resumes if its condition holds.
/// Children spawned during a resume run right after it, in the same step. The order depends
/// only on the script and the cue input, so two runs produce identical signal values.
pub struct Scheduler {
    cfg: SchedulerConfig,
    arena: Arena,
    root: ThreadId,
    cues: Box<dyn CueSource>,
    rng: Rng64,
    next_frame: FrameIndex,
    current: Option<FrameIndex>,
    end: Option<SceneEnd>,
    diagnostics: Vec<Diagnostic>,
    recorder: Recorder,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("cfg", &self.cfg)
            .field("threads", &self.arena.len())
            .field("current", &self.current)
            .field("end", &self.end)
            .finish()
    }
}

impl Scheduler {
    /// Create a scheduler whose root thread starts at scene time 0.
    pub fn new(root: Thread, cfg: SchedulerConfig) -> FlowResult<Self> {
        cfg.validate()?;
        let mut arena = Arena::new(cfg.max_threads);
        let root = arena.insert(root, None, 0.0, FrameIndex(0))?;
        Ok(Self {
            rng: Rng64::new(cfg.seed),
            cfg,
            arena,
            root,
            cues: Box::new(NoCues),
            next_frame: FrameIndex(0),
            current: None,
            end: None,
            diagnostics: Vec::new(),
            recorder: Recorder::default(),
        })
    }

    /// Use `cues` to resolve `wait_until`.
    pub fn with_cues(mut self, cues: impl CueSource + 'static) -> Self {
        self.cues = Box::new(cues);
        self
    }

    /// Record `probe` (typically a [`Signal`](crate::Signal)) after every step.
    pub fn watch(&mut self, probe: impl Probe + 'static) {
        self.recorder.watch(Box::new(probe));
    }

    /// Configuration this scheduler runs with.
    pub fn config(&self) -> &SchedulerConfig {
        &self.cfg
    }

    /// Id of the root thread.
    pub fn root(&self) -> ThreadId {
        self.root
    }

    /// Last evaluated frame.
    pub fn frame(&self) -> Option<FrameIndex> {
        self.current
    }

    /// Scene time of the last evaluated frame.
    pub fn time(&self) -> f64 {
        self.current
            .map_or(0.0, |f| self.cfg.fps.frames_to_secs(f.0))
    }

    /// `true` once the scene has ended.
    pub fn is_finished(&self) -> bool {
        self.end.is_some()
    }

    /// State of any thread spawned so far.
    pub fn state_of(&self, id: ThreadId) -> Option<ThreadState> {
        self.arena.state(id)
    }

    /// Label of thread `id`.
    pub fn label_of(&self, id: ThreadId) -> Option<&str> {
        self.arena.get(id).map(|s| s.label.as_str())
    }

    /// Live children of `id`, in spawn order.
    pub fn children_of(&self, id: ThreadId) -> Vec<ThreadId> {
        self.arena
            .get(id)
            .map(|s| s.children.to_vec())
            .unwrap_or_default()
    }

    /// Frame on which `id` was spawned.
    pub fn spawned_at(&self, id: ThreadId) -> Option<FrameIndex> {
        self.arena.get(id).map(|s| s.spawned_at)
    }

    /// Frame on which `id` completed or was cancelled.
    pub fn finished_at(&self, id: ThreadId) -> Option<FrameIndex> {
        self.arena.get(id).and_then(|s| s.finished_at)
    }

    /// Number of threads spawned so far, root included.
    pub fn thread_count(&self) -> usize {
        self.arena.len()
    }

    /// Diagnostics collected so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Cancel `id` and its descendants immediately. Cancelling the root ends the scene.
    pub fn cancel(&mut self, id: ThreadId) {
        let frame = self.current.unwrap_or_default();
        if id == self.root {
            self.end_scene(SceneEnd::Cancelled, frame);
            return;
        }
        self.arena.cancel(id, frame);
    }

    /// Evaluate the next frame.
    ///
    /// An error from any thread ends the scene with [`SceneEnd::Failed`]: live threads are
    /// cancelled, the error is kept as a [`Diagnostic::Failed`] and later calls are rejected.
    pub fn step(&mut self) -> FlowResult<StepReport> {
        if self.end.is_some() {
            return Err(FlowError::validation("scheduler already finished"));
        }
        let frame = self.next_frame;
        let time = self.cfg.fps.frames_to_secs(frame.0);
        self.current = Some(frame);
        self.next_frame = frame.next();
        tracing::trace!(frame = frame.0, time, "step");

        if let Err(err) = self.tick(self.root) {
            self.fail(frame, &err);
            return Err(err);
        }
        if let Err(err) = self.recorder.sample(frame, time) {
            self.fail(frame, &err);
            return Err(err);
        }

        match self.arena.state(self.root) {
            Some(ThreadState::Completed) => self.end_scene(SceneEnd::Completed, frame),
            Some(ThreadState::Cancelled) => self.end_scene(SceneEnd::Cancelled, frame),
            _ => {
                let limit = self.cfg.max_duration_secs;
                if limit.is_some_and(|max| self.cfg.fps.reached(frame, max)) {
                    self.end_scene(SceneEnd::TimeLimit, frame);
                }
            }
        }

        Ok(StepReport {
            frame,
            time,
            finished: self.end.is_some(),
        })
    }

    /// Step until the scene ends and return the teardown report.
    #[tracing::instrument(skip(self), fields(fps = self.cfg.fps.as_f64()))]
    pub fn run(&mut self) -> FlowResult<SceneReport> {
        while self.end.is_none() {
            self.step()?;
        }
        Ok(self.report())
    }

    /// End the scene now: report unresolved waits, cancel every live thread and return the
    /// teardown report. A scene that already ended keeps its end reason.
    pub fn finish(&mut self) -> SceneReport {
        let frame = self.frame_now();
        self.end_scene(SceneEnd::Cancelled, frame);
        self.report()
    }

    /// Teardown summary. Before the scene ends it describes the run so far.
    pub fn report(&self) -> SceneReport {
        let root_done = self.arena.state(self.root) == Some(ThreadState::Completed);
        let duration_secs = match self.arena.get(self.root) {
            Some(slot) if root_done => slot.time,
            _ => self.time(),
        };
        SceneReport {
            end: self.end.unwrap_or(SceneEnd::TimeLimit),
            frames: self.current.map_or(0, |f| f.0 + 1),
            duration_secs,
            diagnostics: self.diagnostics.clone(),
            trace: (!self.recorder.is_empty()).then(|| self.recorder.trace().clone()),
        }
    }

    fn end_scene(&mut self, end: SceneEnd, frame: FrameIndex) {
        if self.end.is_some() {
            return;
        }
        if self.arena.is_live(self.root) {
            self.collect_unresolved();
            self.arena.cancel(self.root, frame);
        }
        self.end = Some(end);
        tracing::debug!(?end, frame = frame.0, "scene finished");
    }

    fn fail(&mut self, frame: FrameIndex, err: &FlowError) {
        tracing::error!(frame = frame.0, error = %err, "scene aborted");
        self.end_scene(SceneEnd::Failed, frame);
        self.diagnostics.push(Diagnostic::Failed {
            frame,
            error: err.to_string(),
        });
    }

    fn collect_unresolved(&mut self) {
        let pending: Vec<Diagnostic> = self
            .arena
            .ids()
            .filter_map(|id| {
                let slot = self.arena.get(id)?;
                if slot.state.is_terminal() {
                    return None;
                }
                let Some(Suspend::UntilCue(cue)) = &slot.condition else {
                    return None;
                };
                Some(Diagnostic::UnresolvedWait {
                    thread: id,
                    label: slot.label.clone(),
                    cue: cue.clone(),
                    since: slot.suspended_at,
                })
            })
            .collect();
        for d in &pending {
            tracing::warn!("{d}");
        }
        self.diagnostics.extend(pending);
    }

    fn frame_now(&self) -> FrameIndex {
        self.current.unwrap_or_default()
    }

    fn tick(&mut self, id: ThreadId) -> FlowResult<()> {
        let children: SmallVec<[ThreadId; 4]> = match self.arena.get(id) {
            Some(slot) => slot.children.clone(),
            None => return Ok(()),
        };
        for child in children {
            if self.arena.is_live(child) {
                self.tick(child)?;
            }
        }
        self.drive(id)
    }

    fn drive(&mut self, id: ThreadId) -> FlowResult<()> {
        let mut resumes = 0u32;
        while self.ready(id)? {
            resumes += 1;
            if resumes > MAX_RESUMES_PER_STEP {
                return Err(FlowError::stalled(format!(
                    "thread {id} ({}) resumed {MAX_RESUMES_PER_STEP} times in frame {}",
                    self.arena.label(id),
                    self.frame_now().0
                )));
            }
            let spawned = self.resume(id)?;
            for child in spawned {
                if self.arena.is_live(child) {
                    self.tick(child)?;
                }
            }
        }
        Ok(())
    }

    fn ready(&self, id: ThreadId) -> FlowResult<bool> {
        let Some(slot) = self.arena.get(id) else {
            return Ok(false);
        };
        let frame = self.frame_now();
        match slot.state {
            ThreadState::Pending => Ok(true),
            ThreadState::Running | ThreadState::Completed | ThreadState::Cancelled => Ok(false),
            ThreadState::Suspended => match &slot.condition {
                None => Ok(true),
                Some(Suspend::For(_)) => Ok(self.cfg.fps.reached(frame, slot.wake_at)),
                Some(Suspend::NextFrame) => Ok(frame > slot.suspended_at),
                Some(Suspend::UntilCue(label)) => Ok(self
                    .cues
                    .has_reached(label, self.cfg.fps.frames_to_secs(frame.0))),
                Some(Suspend::UntilChildren(ids)) => self.join_ready(id, ids),
            },
        }
    }

    fn join_ready(&self, id: ThreadId, joined: &[ThreadId]) -> FlowResult<bool> {
        let mut done = true;
        for &child in joined {
            match self.arena.state(child) {
                None => {
                    return Err(FlowError::validation(format!(
                        "thread {id} ({}) joins unknown thread {child}",
                        self.arena.label(id)
                    )));
                }
                Some(ThreadState::Cancelled)
                    if self.cfg.group_policy == GroupPolicy::FailGroup =>
                {
                    return Err(FlowError::group_child_failure(format!(
                        "thread {child} ({}) joined by {id} ({}) was cancelled",
                        self.arena.label(child),
                        self.arena.label(id)
                    )));
                }
                Some(s) if s.is_terminal() => {}
                Some(_) => done = false,
            }
        }
        Ok(done)
    }

    /// Logical time a thread takes when its current condition releases it.
    fn resume_time(&self, id: ThreadId, now: f64) -> f64 {
        let Some(slot) = self.arena.get(id) else {
            return now;
        };
        match &slot.condition {
            None => slot.time,
            Some(Suspend::For(_)) => slot.wake_at,
            Some(Suspend::NextFrame) => slot.time.max(now),
            Some(Suspend::UntilCue(label)) => self
                .cues
                .cue_time(label)
                .map_or(now, |t| t.max(slot.time)),
            // A cancelled child ends at the frame it was cancelled on.
            Some(Suspend::UntilChildren(ids)) => ids
                .iter()
                .filter_map(|c| self.arena.get(*c))
                .filter_map(|c| match (c.state, c.finished_at) {
                    (ThreadState::Completed, _) => Some(c.time),
                    (ThreadState::Cancelled, Some(f)) => {
                        Some(c.time.max(self.cfg.fps.frames_to_secs(f.0)))
                    }
                    _ => None,
                })
                .fold(slot.time, f64::max),
        }
    }

    /// Resume `id` once and apply the outcome. Returns the children it spawned.
    fn resume(&mut self, id: ThreadId) -> FlowResult<Vec<ThreadId>> {
        let frame = self.frame_now();
        let now = self.cfg.fps.frames_to_secs(frame.0);
        let time = self.resume_time(id, now);

        let Some(slot) = self.arena.get_mut(id) else {
            return Ok(Vec::new());
        };
        let Some(mut body) = slot.body.take() else {
            return Ok(Vec::new());
        };
        slot.condition = None;
        slot.state = ThreadState::Running;
        slot.time = time;

        let mut cx = ThreadCtx {
            id,
            frame,
            fps: self.cfg.fps,
            time,
            arena: &mut self.arena,
            cues: self.cues.as_ref(),
            rng: &mut self.rng,
            spawned: Vec::new(),
        };
        let result = body.resume(&mut cx);
        let ThreadCtx { time, spawned, .. } = cx;

        let Some(slot) = self.arena.get_mut(id) else {
            return Ok(spawned);
        };
        slot.time = time;
        if slot.state == ThreadState::Cancelled {
            body.on_cancel();
            return Ok(spawned);
        }

        match result? {
            Step::Complete => {
                drop(body);
                self.complete(id, frame);
            }
            Step::Suspend(cond) => {
                if let Suspend::For(secs) = cond {
                    slot.wake_at = time + check_duration("suspend", secs)?;
                }
                slot.state = ThreadState::Suspended;
                slot.suspended_at = frame;
                slot.condition = Some(cond);
                slot.body = Some(body);
            }
        }
        Ok(spawned)
    }

    fn complete(&mut self, id: ThreadId, frame: FrameIndex) {
        if id == self.root {
            self.collect_unresolved();
        }
        let children = match self.arena.get_mut(id) {
            Some(slot) => {
                slot.state = ThreadState::Completed;
                slot.finished_at = Some(frame);
                std::mem::take(&mut slot.children)
            }
            None => return,
        };
        for child in children {
            self.arena.cancel(child, frame);
        }
        self.arena.detach(id);
        tracing::debug!(
            thread = %id,
            label = %self.arena.label(id),
            frame = frame.0,
            "complete"
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scheduler/runtime.rs"]
mod tests;
