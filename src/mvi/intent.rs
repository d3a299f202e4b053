//! Base trait for every event value a store processes.

use std::convert::Infallible;
use std::fmt;
use std::time::Duration;

/// Common behavior of actions, input actions, output actions and transitions.
///
/// The `Debug` rendering is what middleware sees and logs.
pub trait Intent: fmt::Debug + 'static {
    /// Whether the event still takes effect after a middleware cancels it.
    ///
    /// When `true` the reducer (or router) runs with `cancelled = true` and
    /// can apply a compensating change.
    fn process_if_cancelled(&self) -> bool {
        false
    }

    /// Requested delay before the event is processed.
    ///
    /// Honored by [`DelayMiddleware`](crate::middleware::DelayMiddleware)
    /// when it is installed, ignored otherwise.
    fn delay(&self) -> Option<Duration> {
        None
    }
}

/// Kinds a screen does not use (no inputs, no outputs, no transitions).
impl Intent for Infallible {}
