//! Middleware that reports every event through `tracing`.

use std::fmt;

use super::{Envelope, Middleware};

/// Logs events as they enter the pipeline and the state they produced.
#[derive(Debug, Clone)]
pub struct LoggingMiddleware {
    log_state: bool,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self { log_state: true }
    }

    /// Log events without rendering the state, for large or sensitive states.
    pub fn without_state() -> Self {
        Self { log_state: false }
    }

    pub fn with_state(log_state: bool) -> Self {
        Self { log_state }
    }
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for LoggingMiddleware {
    fn name(&self) -> &str {
        "logging"
    }

    fn before(&self, event: &Envelope, _state: &dyn fmt::Debug) {
        tracing::debug!(
            screen = event.screen,
            kind = %event.kind,
            event = %event.description,
            "dispatching"
        );
    }

    fn after(&self, event: &Envelope, state: &dyn fmt::Debug) {
        if self.log_state {
            tracing::info!(
                screen = event.screen,
                kind = %event.kind,
                event = %event.description,
                state = ?state,
                "processed"
            );
        } else {
            tracing::info!(
                screen = event.screen,
                kind = %event.kind,
                event = %event.description,
                "processed"
            );
        }
    }
}
