//! Middleware: interceptors around every event a store processes.
//!
//! ```text
//! before(all) ──→ gate[0] ──→ gate[1] ──→ … ──→ apply ──→ after(all)
//!                   │           │
//!                   └── cancel ─┴──→ dropped (or applied with cancelled = true)
//! ```
//!
//! `before` and `after` are inspection only. `gate` decides whether the event
//! goes on and may take its time doing so: the [`Gate`] can be moved into a
//! timer callback and resolved later.

mod chain;
mod delay;
mod logging;

pub(crate) use chain::{Decided, MiddlewareChain};
pub use delay::DelayMiddleware;
pub use logging::LoggingMiddleware;

use std::fmt;
use std::time::Duration;

use crate::mvi::Intent;

/// Which entry point an event came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Initialize,
    Action,
    InputAction,
    OutputAction,
    Transition,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Initialize => "initialize",
            EventKind::Action => "action",
            EventKind::InputAction => "input",
            EventKind::OutputAction => "output",
            EventKind::Transition => "transition",
        };
        f.write_str(name)
    }
}

/// Type-erased view of an event, as seen by middleware.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub kind: EventKind,
    /// Name of the store processing the event.
    pub screen: &'static str,
    /// Rust type of the event value.
    pub type_name: &'static str,
    /// `Debug` rendering of the event value.
    pub description: String,
    pub process_if_cancelled: bool,
    pub delay: Option<Duration>,
}

impl Envelope {
    pub fn of<I: Intent>(kind: EventKind, screen: &'static str, intent: &I) -> Self {
        Self {
            kind,
            screen,
            type_name: std::any::type_name::<I>(),
            description: format!("{intent:?}"),
            process_if_cancelled: intent.process_if_cancelled(),
            delay: intent.delay(),
        }
    }

    /// Synthetic event reported to `after` hooks once a store is initialized.
    pub fn initialize(screen: &'static str) -> Self {
        Self {
            kind: EventKind::Initialize,
            screen,
            type_name: screen,
            description: format!("Initialize {screen}"),
            process_if_cancelled: false,
            delay: None,
        }
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} {}", self.screen, self.kind, self.description)
    }
}

/// Decision a middleware hands back through its [`Gate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    Cancel,
}

/// One-shot continuation for a middleware's gate.
///
/// Consuming the gate advances the chain (`proceed`) or stops it (`cancel`).
/// Dropping it unresolved stalls the event for good; that is logged.
pub struct Gate {
    resolve: Option<Box<dyn FnOnce(GateDecision)>>,
    middleware: String,
}

impl Gate {
    pub(crate) fn new(middleware: &str, resolve: impl FnOnce(GateDecision) + 'static) -> Self {
        Self {
            resolve: Some(Box::new(resolve)),
            middleware: middleware.to_string(),
        }
    }

    pub fn proceed(self) {
        self.resolve(GateDecision::Proceed);
    }

    pub fn cancel(self) {
        self.resolve(GateDecision::Cancel);
    }

    pub fn resolve(mut self, decision: GateDecision) {
        if let Some(resolve) = self.resolve.take() {
            resolve(decision);
        }
    }
}

impl Drop for Gate {
    fn drop(&mut self) {
        if self.resolve.is_some() {
            tracing::warn!(
                middleware = %self.middleware,
                "gate dropped without a decision, event will never complete"
            );
        }
    }
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate")
            .field("middleware", &self.middleware)
            .field("resolved", &self.resolve.is_none())
            .finish()
    }
}

/// Interceptor installed on a [`Dispatcher`](crate::Dispatcher).
///
/// `state` arguments are the store's current state rendered through `Debug`.
/// `before` sees the state the event was dispatched against, `after` sees
/// the state committed by it.
pub trait Middleware {
    fn name(&self) -> &str;

    fn before(&self, _event: &Envelope, _state: &dyn fmt::Debug) {}

    fn gate(&self, _event: &Envelope, gate: Gate) {
        gate.proceed();
    }

    fn after(&self, _event: &Envelope, _state: &dyn fmt::Debug) {}
}
