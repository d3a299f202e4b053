//! Middleware that holds events back for the delay they request.

use std::rc::Rc;

use super::{Envelope, Gate, Middleware};
use crate::scheduler::Scheduler;

/// Defers the gate continuation by [`Intent::delay`](crate::mvi::Intent::delay).
///
/// Events without a delay pass straight through. Only the delayed event
/// waits; other events keep flowing in the meantime.
pub struct DelayMiddleware {
    scheduler: Rc<dyn Scheduler>,
}

impl DelayMiddleware {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self { scheduler }
    }
}

impl Middleware for DelayMiddleware {
    fn name(&self) -> &str {
        "delay"
    }

    fn gate(&self, event: &Envelope, gate: Gate) {
        match event.delay {
            Some(delay) => {
                tracing::trace!(event = %event, ?delay, "delaying event");
                self.scheduler.schedule(delay, Box::new(move || gate.proceed()));
            }
            None => gate.proceed(),
        }
    }
}
