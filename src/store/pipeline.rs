//! Deferred-flush core shared by screen stores and the app store.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use crate::reactive::{ReadOnly, ReplayLast, ReplayOneSubject};

pub(crate) type Completion = Box<dyn FnOnce()>;

/// Committed state, its replaying subject, and the guard that parks events
/// dispatched while a reducer runs.
pub(crate) struct Core<S, E> {
    state: RefCell<Option<S>>,
    states: ReplayOneSubject<S>,
    reducing: Cell<bool>,
    spill: RefCell<VecDeque<E>>,
}

impl<S: Clone + 'static, E> Core<S, E> {
    pub(crate) fn new() -> Self {
        Self {
            state: RefCell::new(None),
            states: ReplayOneSubject::empty(),
            reducing: Cell::new(false),
            spill: RefCell::new(VecDeque::new()),
        }
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.state.borrow().is_some()
    }

    pub(crate) fn current(&self) -> Option<S> {
        self.state.borrow().clone()
    }

    pub(crate) fn states(&self) -> ReadOnly<S, ReplayLast<S>> {
        self.states.as_observable()
    }

    pub(crate) fn commit(&self, state: S) {
        *self.state.borrow_mut() = Some(state.clone());
        self.states.next(state);
    }

    /// Run `f` with the reduction guard raised.
    pub(crate) fn reduce<T>(&self, f: impl FnOnce() -> T) -> T {
        self.reducing.set(true);
        let _reset = scopeguard::guard(&self.reducing, |flag| flag.set(false));
        f()
    }

    /// Park `event` if a reduction is running. Otherwise hand it back so the
    /// caller runs it now.
    pub(crate) fn park(&self, event: E) -> Option<E> {
        if !self.reducing.get() {
            return Some(event);
        }
        self.spill.borrow_mut().push_back(event);
        None
    }

    /// `pending` followed by everything parked during the last reduction.
    pub(crate) fn with_spill(&self, mut pending: VecDeque<E>) -> VecDeque<E> {
        pending.extend(self.spill.borrow_mut().drain(..));
        pending
    }
}

/// A store handle whose events go through the middleware pipeline one at a
/// time.
pub(crate) trait Pipeline: Sized + 'static {
    type Event: 'static;
    type Weak: 'static;

    /// Send one event through the pipeline. `done` runs once the event and
    /// everything it caused have been processed.
    fn run(&self, event: Self::Event, done: Completion);

    fn weak(&self) -> Self::Weak;

    fn upgrade(weak: &Self::Weak) -> Option<Self>;
}

/// Process `pending` front to back, each item to completion before the next
/// one starts, then call `done`.
pub(crate) fn flush<P: Pipeline>(store: &P, mut pending: VecDeque<P::Event>, done: Completion) {
    let Some(next) = pending.pop_front() else {
        done();
        return;
    };
    let weak = store.weak();
    store.run(
        next,
        Box::new(move || match P::upgrade(&weak) {
            Some(store) => flush(&store, pending, done),
            None => done(),
        }),
    );
}
