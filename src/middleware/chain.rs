//! Sequential gate pipeline.

use std::fmt;
use std::rc::Rc;

use super::{Envelope, Gate, GateDecision, Middleware};

/// Snapshot of the dispatcher's middleware taken when an event starts.
///
/// Middleware added while an event is in flight only sees later events.
#[derive(Clone, Default)]
pub(crate) struct MiddlewareChain {
    items: Rc<[Rc<dyn Middleware>]>,
}

/// How the gate sequence ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
    Proceeded,
    /// Name of the middleware that cancelled.
    Cancelled(String),
}

/// An event whose gate sequence has finished.
pub(crate) struct Decided {
    event: Rc<Envelope>,
    chain: MiddlewareChain,
    outcome: Outcome,
}

impl Decided {
    pub(crate) fn event(&self) -> &Envelope {
        &self.event
    }

    pub(crate) fn cancelled(&self) -> bool {
        matches!(self.outcome, Outcome::Cancelled(_))
    }

    /// Cancelled events still run when they tolerate cancellation.
    pub(crate) fn should_run(&self) -> bool {
        !self.cancelled() || self.event.process_if_cancelled
    }

    pub(crate) fn cancelled_by(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Cancelled(name) => Some(name),
            Outcome::Proceeded => None,
        }
    }

    pub(crate) fn after(&self, state: &dyn fmt::Debug) {
        self.chain.after(&self.event, state);
    }
}

impl MiddlewareChain {
    pub(crate) fn new(items: Vec<Rc<dyn Middleware>>) -> Self {
        Self {
            items: items.into(),
        }
    }

    pub(crate) fn before(&self, event: &Envelope, state: &dyn fmt::Debug) {
        for middleware in self.items.iter() {
            middleware.before(event, state);
        }
    }

    pub(crate) fn after(&self, event: &Envelope, state: &dyn fmt::Debug) {
        for middleware in self.items.iter() {
            middleware.after(event, state);
        }
    }

    /// Run `before` hooks, then the gates in order, then hand the result to
    /// `on_decided`. The callback may run later if a gate resolves
    /// asynchronously, and never runs if a gate is dropped unresolved.
    pub(crate) fn process(
        &self,
        event: Envelope,
        state: &dyn fmt::Debug,
        on_decided: impl FnOnce(Decided) + 'static,
    ) {
        self.before(&event, state);
        let event = Rc::new(event);
        let chain = self.clone();
        let decided_event = Rc::clone(&event);
        Self::step(
            Rc::clone(&self.items),
            0,
            event,
            Box::new(move |outcome| {
                on_decided(Decided {
                    event: decided_event,
                    chain,
                    outcome,
                })
            }),
        );
    }

    fn step(
        items: Rc<[Rc<dyn Middleware>]>,
        index: usize,
        event: Rc<Envelope>,
        done: Box<dyn FnOnce(Outcome)>,
    ) {
        let Some(middleware) = items.get(index).cloned() else {
            done(Outcome::Proceeded);
            return;
        };

        let name = middleware.name().to_string();
        let label = name.clone();
        let next_event = Rc::clone(&event);
        let gate = Gate::new(&label, move |decision| match decision {
            GateDecision::Proceed => Self::step(items, index + 1, next_event, done),
            GateDecision::Cancel => {
                tracing::debug!(middleware = %name, event = %next_event, "event cancelled");
                done(Outcome::Cancelled(name));
            }
        });
        middleware.gate(&event, gate);
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }
}
