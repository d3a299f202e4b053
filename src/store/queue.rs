//! Deferred-flush queues.

use std::collections::VecDeque;

use crate::middleware::{Envelope, EventKind};
use crate::mvi::Reducer;

/// Per-kind FIFO buffers filled while a reduction is running.
pub(crate) struct Queues<R: Reducer> {
    pub(crate) actions: VecDeque<R::Action>,
    pub(crate) outputs: VecDeque<R::OutputAction>,
    pub(crate) transitions: VecDeque<R::Transition>,
}

impl<R: Reducer> Default for Queues<R> {
    fn default() -> Self {
        Self {
            actions: VecDeque::new(),
            outputs: VecDeque::new(),
            transitions: VecDeque::new(),
        }
    }
}

impl<R: Reducer> Queues<R> {
    pub(crate) fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.outputs.is_empty() && self.transitions.is_empty()
    }

    /// Flatten into processing order: every action, then every output
    /// action, then every transition.
    pub(crate) fn into_pending(self) -> VecDeque<Pending<R>> {
        self.actions
            .into_iter()
            .map(Pending::Action)
            .chain(self.outputs.into_iter().map(Pending::Output))
            .chain(self.transitions.into_iter().map(Pending::Transition))
            .collect()
    }
}

/// One event waiting to go through the pipeline.
pub(crate) enum Pending<R: Reducer> {
    Action(R::Action),
    Input(R::InputAction),
    Output(R::OutputAction),
    Transition(R::Transition),
}

impl<R: Reducer> Pending<R> {
    pub(crate) fn envelope(&self, screen: &'static str) -> Envelope {
        match self {
            Pending::Action(a) => Envelope::of(EventKind::Action, screen, a),
            Pending::Input(a) => Envelope::of(EventKind::InputAction, screen, a),
            Pending::Output(a) => Envelope::of(EventKind::OutputAction, screen, a),
            Pending::Transition(t) => Envelope::of(EventKind::Transition, screen, t),
        }
    }
}
