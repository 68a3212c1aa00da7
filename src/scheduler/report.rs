use crate::flow::thread::ThreadId;
use crate::foundation::core::FrameIndex;
use crate::scheduler::trace::Trace;

/// Non-fatal timeline inconsistency collected during a run and reported at teardown.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Diagnostic {
    /// A `wait_until` was still pending when the scene ended.
    UnresolvedWait {
        /// The waiting thread.
        thread: ThreadId,
        /// Label of the waiting thread.
        label: String,
        /// Cue it was waiting for.
        cue: String,
        /// Frame on which it suspended.
        since: FrameIndex,
    },
    /// A thread returned an error and the scene was aborted.
    Failed {
        /// Frame being evaluated when the error surfaced.
        frame: FrameIndex,
        /// Rendered error.
        error: String,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnresolvedWait {
                thread,
                label,
                cue,
                since,
            } => write!(
                f,
                "unresolved wait: thread {thread} ({label}) waited for cue \"{cue}\" since frame {}",
                since.0
            ),
            Self::Failed { frame, error } => {
                write!(f, "scene aborted at frame {}: {error}", frame.0)
            }
        }
    }
}

/// Why a scene stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SceneEnd {
    /// The root thread ran to the end.
    Completed,
    /// The root thread was cancelled.
    Cancelled,
    /// `max_duration_secs` elapsed before the root completed.
    TimeLimit,
    /// A thread returned an error; see [`Diagnostic::Failed`].
    Failed,
}

/// Result of one [`Scheduler::step`](crate::Scheduler::step).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReport {
    /// Frame that was evaluated.
    pub frame: FrameIndex,
    /// Scene time of that frame.
    pub time: f64,
    /// `true` once the scene has ended.
    pub finished: bool,
}

/// Summary produced at scene teardown.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneReport {
    /// Why the scene stopped.
    pub end: SceneEnd,
    /// Number of evaluated frames.
    pub frames: u64,
    /// Scene length in seconds: the root's logical end time when it completed, otherwise the
    /// time of the last evaluated frame.
    pub duration_secs: f64,
    /// Non-fatal findings, in the order they were collected.
    pub diagnostics: Vec<Diagnostic>,
    /// Per-frame samples of watched signals, when any were registered.
    pub trace: Option<Trace>,
}

impl SceneReport {
    /// `true` when any `wait_until` never resolved.
    pub fn has_unresolved_waits(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::UnresolvedWait { .. }))
    }
}
