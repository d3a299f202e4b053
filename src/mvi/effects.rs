//! Emission buffer handed to reducers.

use std::fmt;

use super::reducer::Reducer;
use crate::store::{Queues, WeakStore};

/// Collects what a reduction wants to happen next.
///
/// Nothing pushed here is processed until the store has committed the state
/// returned by the reducer. The store then drains actions first, then output
/// actions, then transitions, each one fully before the next.
pub struct Effects<R: Reducer> {
    queues: Queues<R>,
    handle: WeakStore<R>,
}

impl<R: Reducer> Effects<R> {
    pub(crate) fn new(handle: WeakStore<R>) -> Self {
        Self {
            queues: Queues::default(),
            handle,
        }
    }

    /// Effects not attached to any store, for calling reducers directly in
    /// unit tests.
    pub fn detached() -> Self {
        Self::new(WeakStore::detached())
    }

    /// Queue a follow-up action for this store.
    pub fn action(&mut self, action: R::Action) {
        self.queues.actions.push_back(action);
    }

    /// Queue an output action for the parent's listener.
    pub fn output(&mut self, output: R::OutputAction) {
        self.queues.outputs.push_back(output);
    }

    /// Queue a transition for the router.
    pub fn transition(&mut self, transition: R::Transition) {
        self.queues.transitions.push_back(transition);
    }

    /// Handle for emitting after the reduction has returned, e.g. from a
    /// timer or a completed request. Anything sent through it while the
    /// reduction is still running is processed after this buffer.
    pub fn later(&self) -> WeakStore<R> {
        self.handle.clone()
    }

    pub fn actions(&self) -> impl Iterator<Item = &R::Action> {
        self.queues.actions.iter()
    }

    pub fn outputs(&self) -> impl Iterator<Item = &R::OutputAction> {
        self.queues.outputs.iter()
    }

    pub fn transitions(&self) -> impl Iterator<Item = &R::Transition> {
        self.queues.transitions.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    pub(crate) fn into_queues(self) -> Queues<R> {
        self.queues
    }
}

impl<R: Reducer> fmt::Debug for Effects<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effects")
            .field("actions", &self.queues.actions)
            .field("outputs", &self.queues.outputs)
            .field("transitions", &self.queues.transitions)
            .finish()
    }
}

