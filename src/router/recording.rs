//! Surface that records routing calls instead of performing them.

use std::cell::RefCell;
use std::rc::Rc;

use super::surface::{Animation, PendingScreen, RouteSurface};
use crate::dispatcher::Dispatcher;

/// One call received by a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteCall {
    Embed {
        screen: &'static str,
        container: String,
    },
    Replace {
        screen: &'static str,
        animation: Animation,
    },
    Show {
        screen: &'static str,
    },
    Present {
        screen: &'static str,
    },
    Close,
    Dismiss,
    Pop,
    PopToRoot,
}

/// Test double for [`RouteSurface`]. Child screens are never started, so
/// input handles returned for them are dead.
#[derive(Debug)]
pub struct RecordingSurface {
    dispatcher: Rc<Dispatcher>,
    calls: RefCell<Vec<RouteCall>>,
}

impl RecordingSurface {
    pub fn new(dispatcher: Rc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RouteCall> {
        self.calls.borrow().clone()
    }

    /// Return the recorded calls and start over.
    pub fn take_calls(&self) -> Vec<RouteCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    fn record(&self, call: RouteCall) {
        tracing::trace!(?call, "route call recorded");
        self.calls.borrow_mut().push(call);
    }
}

impl RouteSurface for RecordingSurface {
    fn dispatcher(&self) -> Rc<Dispatcher> {
        Rc::clone(&self.dispatcher)
    }

    fn embed(&self, screen: PendingScreen, container: &str) {
        self.record(RouteCall::Embed {
            screen: screen.name(),
            container: container.to_string(),
        });
    }

    fn replace(&self, screen: PendingScreen, animation: Animation) {
        self.record(RouteCall::Replace {
            screen: screen.name(),
            animation,
        });
    }

    fn show(&self, screen: PendingScreen) {
        self.record(RouteCall::Show {
            screen: screen.name(),
        });
    }

    fn present(&self, screen: PendingScreen) {
        self.record(RouteCall::Present {
            screen: screen.name(),
        });
    }

    fn close(&self) {
        self.record(RouteCall::Close);
    }

    fn dismiss(&self) {
        self.record(RouteCall::Dismiss);
    }

    fn pop(&self) {
        self.record(RouteCall::Pop);
    }

    fn pop_to_root(&self) {
        self.record(RouteCall::PopToRoot);
    }
}
