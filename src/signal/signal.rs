use crate::{
    animation::{ease::Ease, lerp::Animatable},
    flow::{animate::Animate, thread::Thread},
    foundation::error::FlowResult,
    signal::graph::{Deps, GraphNode},
};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

type ComputeFn<T> = Rc<dyn Fn(&mut Deps) -> FlowResult<T>>;

/// How a signal currently produces its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SignalKind {
    /// Holds a plain value set at creation or by the last [`Signal::write`].
    Constant,
    /// Derives its value from other signals; memoized until an input changes.
    Computed,
    /// A tween currently drives the value.
    Animated,
}

#[derive(Clone)]
enum Source<T> {
    Value(T),
    Computed(ComputeFn<T>),
}

struct SignalCell<T> {
    node: Rc<GraphNode>,
    initial: Source<T>,
    source: RefCell<Source<T>>,
    cache: RefCell<Option<T>>,
    driver: Cell<Option<u64>>,
    driver_seq: Cell<u64>,
}

/// Reactive value cell.
///
/// `Signal` is a cheap handle: cloning it shares the same cell, which is how several coroutines
/// animate one property. [`Signal::snapshot`] allocates an independent cell instead.
///
/// Reads of a computed signal are lazy: a write only flags dependents dirty, and each dirty
/// computed signal re-evaluates once on its next read.
pub struct Signal<T> {
    cell: Rc<SignalCell<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("label", &self.cell.node.label())
            .field("dirty", &self.cell.node.is_dirty())
            .field("animated", &self.cell.driver.get().is_some())
            .finish()
    }
}

impl<T> Signal<T>
where
    T: Clone + 'static,
{
    fn from_source(source: Source<T>, dirty: bool) -> Self {
        Self {
            cell: Rc::new(SignalCell {
                node: GraphNode::new("signal", dirty),
                initial: source.clone(),
                source: RefCell::new(source),
                cache: RefCell::new(None),
                driver: Cell::new(None),
                driver_seq: Cell::new(0),
            }),
        }
    }

    /// Create a value signal.
    pub fn new(value: T) -> Self {
        Self::from_source(Source::Value(value), false)
    }

    /// Create a computed signal. Inputs must be read through the provided [`Deps`].
    pub fn computed(f: impl Fn(&mut Deps) -> FlowResult<T> + 'static) -> Self {
        Self::from_source(Source::Computed(Rc::new(f)), true)
    }

    /// Attach a label used in diagnostics and traces.
    pub fn named(self, label: &str) -> Self {
        self.cell.node.set_label(label);
        self
    }

    /// Label set with [`Signal::named`], or `signal`.
    pub fn label(&self) -> String {
        self.cell.node.label()
    }

    pub(crate) fn graph_node(&self) -> &Rc<GraphNode> {
        &self.cell.node
    }

    /// Whether the value is constant, computed or driven by a tween.
    pub fn kind(&self) -> SignalKind {
        if self.cell.driver.get().is_some() {
            return SignalKind::Animated;
        }
        match &*self.cell.source.borrow() {
            Source::Value(_) => SignalKind::Constant,
            Source::Computed(_) => SignalKind::Computed,
        }
    }

    /// Current value, re-evaluating a computed signal if an input changed since the last read.
    ///
    /// Fails with [`FlowError::CycleDetected`](crate::FlowError::CycleDetected) when the signal
    /// is reached again while it is being evaluated.
    pub fn read(&self) -> FlowResult<T> {
        let f = match &*self.cell.source.borrow() {
            Source::Value(v) => return Ok(v.clone()),
            Source::Computed(f) => Rc::clone(f),
        };

        if !self.cell.node.is_dirty() {
            if let Some(v) = &*self.cell.cache.borrow() {
                return Ok(v.clone());
            }
        }

        let v = self.cell.node.evaluate(|deps| f(deps))?;
        *self.cell.cache.borrow_mut() = Some(v.clone());
        Ok(v)
    }

    /// Set a plain value and flag every transitive dependent dirty.
    ///
    /// A computed signal written this way stops tracking its inputs.
    pub fn write(&self, value: T) {
        let was_computed = matches!(&*self.cell.source.borrow(), Source::Computed(_));
        if was_computed {
            self.cell.node.unsubscribe_all();
            self.cell.cache.borrow_mut().take();
        }
        *self.cell.source.borrow_mut() = Source::Value(value);
        self.cell.node.set_dirty(false);
        self.cell.node.invalidate_subscribers();
    }

    /// Replace the value with a computed binding.
    pub fn write_computed(&self, f: impl Fn(&mut Deps) -> FlowResult<T> + 'static) {
        self.install(Source::Computed(Rc::new(f)));
    }

    /// Restore the source the signal was created with.
    pub fn reset(&self) {
        self.install(self.cell.initial.clone());
    }

    fn install(&self, source: Source<T>) {
        match source {
            Source::Value(v) => self.write(v),
            Source::Computed(f) => {
                self.cell.node.unsubscribe_all();
                self.cell.cache.borrow_mut().take();
                *self.cell.source.borrow_mut() = Source::Computed(f);
                self.cell.node.set_dirty(true);
                self.cell.node.invalidate_subscribers();
            }
        }
    }

    /// New, unconnected signal holding this signal's current value.
    pub fn snapshot(&self) -> FlowResult<Self> {
        let value = self.read()?;
        Ok(Self::new(value).named(&self.label()))
    }

    /// Return `true` when both handles point at the same cell.
    pub fn same_cell(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }

    /// How many times the computed function has run.
    pub fn evaluations(&self) -> u64 {
        self.cell.node.evaluations()
    }

    /// Signals read by the last evaluation.
    pub fn dependency_count(&self) -> usize {
        self.cell.node.source_count()
    }

    /// Computed signals that read this one during their last evaluation.
    pub fn dependent_count(&self) -> usize {
        self.cell.node.subscriber_count()
    }

    /// Install a new tween driver, replacing any previous one, and return its token.
    pub(crate) fn claim_driver(&self) -> u64 {
        let token = self.cell.driver_seq.get() + 1;
        self.cell.driver_seq.set(token);
        self.cell.driver.set(Some(token));
        token
    }

    pub(crate) fn owns_driver(&self, token: u64) -> bool {
        self.cell.driver.get() == Some(token)
    }

    pub(crate) fn release_driver(&self, token: u64) {
        if self.owns_driver(token) {
            self.cell.driver.set(None);
        }
    }
}

impl<T> Signal<T>
where
    T: Animatable,
{
    /// Build a coroutine that tweens this signal to `target` over `duration` seconds.
    ///
    /// The start value is read when the coroutine first runs. A zero duration assigns `target`
    /// without suspending.
    pub fn animate_to(&self, target: T, duration: f64, ease: Ease) -> FlowResult<Thread> {
        let label = format!("animate {}", self.label());
        Ok(Thread::new(label, Animate::new(self.clone(), target, duration, ease)?))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/signal/signal.rs"]
mod tests;
