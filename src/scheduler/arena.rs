use crate::flow::thread::{Procedure, Suspend, Thread, ThreadId, ThreadState};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{FlowError, FlowResult};
use smallvec::SmallVec;

pub(crate) struct Slot {
    pub(crate) label: String,
    pub(crate) state: ThreadState,
    pub(crate) parent: Option<ThreadId>,
    /// Live children in spawn order. Terminal children are pruned.
    pub(crate) children: SmallVec<[ThreadId; 4]>,
    pub(crate) condition: Option<Suspend>,
    /// Absolute target of a `Suspend::For`, resolved when the thread suspends.
    pub(crate) wake_at: f64,
    /// Logical time in seconds.
    pub(crate) time: f64,
    /// `None` while the body is out for a resume, or once the thread is terminal.
    pub(crate) body: Option<Box<dyn Procedure>>,
    pub(crate) spawned_at: FrameIndex,
    pub(crate) suspended_at: FrameIndex,
    pub(crate) finished_at: Option<FrameIndex>,
}

/// Storage for every thread of one scheduler, indexed by [`ThreadId`].
pub(crate) struct Arena {
    slots: Vec<Slot>,
    /// Largest number of threads the arena accepts.
    limit: u32,
}

impl Arena {
    pub(crate) fn new(limit: u32) -> Self {
        Self {
            slots: Vec::new(),
            limit,
        }
    }

    /// Allocate the next id. Fails once `limit` threads exist.
    pub(crate) fn insert(
        &mut self,
        thread: Thread,
        parent: Option<ThreadId>,
        time: f64,
        frame: FrameIndex,
    ) -> FlowResult<ThreadId> {
        let next = u32::try_from(self.slots.len())
            .ok()
            .filter(|n| *n < self.limit)
            .ok_or_else(|| {
                FlowError::validation(format!(
                    "thread limit of {} reached while spawning \"{}\"",
                    self.limit, thread.label
                ))
            })?;
        let id = ThreadId(next);
        self.slots.push(Slot {
            label: thread.label,
            state: ThreadState::Pending,
            parent,
            children: SmallVec::new(),
            condition: None,
            wake_at: time,
            time,
            body: Some(thread.body),
            spawned_at: frame,
            suspended_at: frame,
            finished_at: None,
        });
        if let Some(p) = parent.and_then(|p| self.slots.get_mut(p.0 as usize)) {
            p.children.push(id);
        }
        Ok(id)
    }

    pub(crate) fn get(&self, id: ThreadId) -> Option<&Slot> {
        self.slots.get(id.0 as usize)
    }

    pub(crate) fn get_mut(&mut self, id: ThreadId) -> Option<&mut Slot> {
        self.slots.get_mut(id.0 as usize)
    }

    pub(crate) fn state(&self, id: ThreadId) -> Option<ThreadState> {
        self.get(id).map(|s| s.state)
    }

    pub(crate) fn is_live(&self, id: ThreadId) -> bool {
        self.state(id).is_some_and(|s| !s.is_terminal())
    }

    pub(crate) fn label(&self, id: ThreadId) -> &str {
        self.get(id).map_or("?", |s| s.label.as_str())
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = ThreadId> + '_ {
        (0..self.slots.len())
            .map_while(|i| u32::try_from(i).ok())
            .map(ThreadId)
    }

    /// Remove `id` from its parent's live-children list.
    pub(crate) fn detach(&mut self, id: ThreadId) {
        let Some(parent) = self.get(id).and_then(|s| s.parent) else {
            return;
        };
        if let Some(p) = self.get_mut(parent) {
            p.children.retain(|c| *c != id);
        }
    }

    /// Cancel `id` and, top-down, all of its live descendants. Takes effect immediately.
    ///
    /// Returns the cancelled ids in cancellation order.
    pub(crate) fn cancel(&mut self, id: ThreadId, frame: FrameIndex) -> Vec<ThreadId> {
        let mut out = Vec::new();
        self.cancel_rec(id, frame, &mut out);
        self.detach(id);
        if !out.is_empty() {
            tracing::debug!(thread = %id, cancelled = out.len(), "cancel");
        }
        out
    }

    fn cancel_rec(&mut self, id: ThreadId, frame: FrameIndex, out: &mut Vec<ThreadId>) {
        let Some(slot) = self.get_mut(id) else {
            return;
        };
        if slot.state.is_terminal() {
            return;
        }
        slot.state = ThreadState::Cancelled;
        slot.condition = None;
        slot.finished_at = Some(frame);
        if let Some(mut body) = slot.body.take() {
            body.on_cancel();
        }
        let children = std::mem::take(&mut slot.children);
        out.push(id);
        for c in children {
            self.cancel_rec(c, frame, out);
        }
    }
}
