use crate::foundation::error::{FlowError, FlowResult};
use crate::signal::signal::Signal;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Type-erased vertex of the signal dependency graph.
///
/// Edges point both ways: `sources` are the vertices read during the last evaluation and
/// `subscribers` are the vertices that read this one. Both are weak; the signal handles captured
/// by compute functions are what keep inputs alive.
#[derive(Debug)]
pub(crate) struct GraphNode {
    label: RefCell<String>,
    dirty: Cell<bool>,
    evaluating: Cell<bool>,
    evaluations: Cell<u64>,
    sources: RefCell<Vec<Weak<GraphNode>>>,
    subscribers: RefCell<Vec<Weak<GraphNode>>>,
}

impl GraphNode {
    pub(crate) fn new(label: &str, dirty: bool) -> Rc<Self> {
        Rc::new(Self {
            label: RefCell::new(label.to_owned()),
            dirty: Cell::new(dirty),
            evaluating: Cell::new(false),
            evaluations: Cell::new(0),
            sources: RefCell::new(Vec::new()),
            subscribers: RefCell::new(Vec::new()),
        })
    }

    pub(crate) fn label(&self) -> String {
        self.label.borrow().clone()
    }

    pub(crate) fn set_label(&self, label: &str) {
        *self.label.borrow_mut() = label.to_owned();
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub(crate) fn set_dirty(&self, dirty: bool) {
        self.dirty.set(dirty);
    }

    pub(crate) fn evaluations(&self) -> u64 {
        self.evaluations.get()
    }

    /// Flag every transitive subscriber dirty. Nothing is recomputed here.
    ///
    /// Propagation stops at vertices that are already dirty: their subscribers were flagged when
    /// they became dirty and nothing has read them since.
    pub(crate) fn invalidate_subscribers(&self) {
        let subs: Vec<Rc<GraphNode>> = {
            let mut subs = self.subscribers.borrow_mut();
            subs.retain(|w| w.strong_count() > 0);
            subs.iter().filter_map(Weak::upgrade).collect()
        };
        for sub in subs {
            if !sub.dirty.replace(true) {
                sub.invalidate_subscribers();
            }
        }
    }

    /// Drop all edges to the sources recorded by the previous evaluation.
    pub(crate) fn unsubscribe_all(self: &Rc<Self>) {
        let sources = std::mem::take(&mut *self.sources.borrow_mut());
        let me = Rc::downgrade(self);
        for src in sources.iter().filter_map(Weak::upgrade) {
            src.subscribers
                .borrow_mut()
                .retain(|w| w.strong_count() > 0 && !w.ptr_eq(&me));
        }
    }

    fn subscribe_all(self: &Rc<Self>, sources: Vec<Rc<GraphNode>>) {
        let me = Rc::downgrade(self);
        for src in &sources {
            src.subscribers.borrow_mut().push(me.clone());
        }
        *self.sources.borrow_mut() = sources.iter().map(Rc::downgrade).collect();
    }

    /// Run a computed evaluation with re-entry detection and dependency re-registration.
    ///
    /// Sources read by `eval` replace the previous ones even when `eval` fails, so a later write
    /// to any of them still reaches this vertex.
    pub(crate) fn evaluate<T>(
        self: &Rc<Self>,
        eval: impl FnOnce(&mut Deps) -> FlowResult<T>,
    ) -> FlowResult<T> {
        if self.evaluating.get() {
            return Err(FlowError::cycle(format!(
                "signal `{}` depends on itself",
                self.label()
            )));
        }

        struct Reentry<'a>(&'a Cell<bool>);
        impl Drop for Reentry<'_> {
            fn drop(&mut self) {
                self.0.set(false);
            }
        }

        self.unsubscribe_all();
        let mut deps = Deps::default();
        let out = {
            self.evaluating.set(true);
            let _guard = Reentry(&self.evaluating);
            eval(&mut deps)
        };
        self.subscribe_all(deps.sources);
        self.evaluations.set(self.evaluations.get() + 1);
        if out.is_ok() {
            self.dirty.set(false);
        }
        out
    }

    pub(crate) fn source_count(&self) -> usize {
        self.sources
            .borrow()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }
}

/// Dependency recorder handed to computed signal functions.
///
/// Reading through [`Deps::read`] registers the signal as an input of the computed signal being
/// evaluated; reading a signal directly does not.
#[derive(Debug, Default)]
pub struct Deps {
    sources: Vec<Rc<GraphNode>>,
}

impl Deps {
    /// Read `signal` and record it as a dependency.
    pub fn read<T>(&mut self, signal: &Signal<T>) -> FlowResult<T>
    where
        T: Clone + 'static,
    {
        let node = signal.graph_node();
        if !self.sources.iter().any(|s| Rc::ptr_eq(s, node)) {
            self.sources.push(Rc::clone(node));
        }
        signal.read()
    }

    /// Number of distinct signals read so far.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// `true` before any signal was read.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
