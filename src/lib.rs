//! Reelflow is the timeline core of a programmatic animation engine.
//!
//! A scene script is a tree of coroutines ([`Thread`]) that read and write reactive values
//! ([`Signal`]). A [`Scheduler`] advances that tree one frame at a time on a fixed clock, so the
//! same script with the same cue input always produces the same per-frame values:
//!
//! - Build signals and nodes ([`Signal::new`], [`Signal::computed`], [`Node`])
//! - Compose coroutines ([`Signal::animate_to`], [`all`], [`sequence`], [`stagger`],
//!   [`wait_for`], [`wait_until`])
//! - Drive them with [`Scheduler::step`] or [`Scheduler::run`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod flow;
mod foundation;
mod scene;
mod scheduler;
mod signal;

pub use crate::foundation::color::Color;
pub use crate::foundation::core::{FRAME_EPSILON, Fps, FrameIndex, Vec2};
pub use crate::foundation::error::{FlowError, FlowResult};
pub use crate::foundation::rng::Rng64;

pub use crate::animation::ease::Ease;
pub use crate::animation::lerp::Animatable;
pub use crate::animation::tween::TweenDriver;

pub use crate::signal::graph::Deps;
pub use crate::signal::signal::{Signal, SignalKind};

pub use crate::flow::combinators::{
    all, chain, defer, delay, repeat, run, sequence, stagger, wait_for, wait_until,
};
pub use crate::flow::cue::{Cue, CueSource, CueTimeline, NoCues};
pub use crate::flow::thread::{
    Procedure, Step, Suspend, Thread, ThreadCtx, ThreadId, ThreadState,
};

pub use crate::scheduler::report::{Diagnostic, SceneEnd, SceneReport, StepReport};
pub use crate::scheduler::runtime::{
    GroupPolicy, MAX_RESUMES_PER_STEP, Scheduler, SchedulerConfig,
};
pub use crate::scheduler::trace::{FrameSample, Probe, Trace, TraceFingerprint};

pub use crate::scene::node::{Node, Property, PropertyValue};
