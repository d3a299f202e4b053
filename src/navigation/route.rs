//! Per-screen routing surface backed by the navigator.

use std::fmt;
use std::rc::{Rc, Weak};

use super::error::NavigationError;
use super::navigator::Navigator;
use super::registry::ScreenId;
use crate::dispatcher::Dispatcher;
use crate::router::{Animation, PendingScreen, RouteSurface};

/// Non-owning handle from a screen back to its navigator.
///
/// Once the screen (or the whole navigator) is gone every call is a no-op.
/// Calls that do not fit the screen's placement, such as `pop` outside a
/// navigation stack, are logged and ignored.
pub struct ScreenRoute {
    navigator: Weak<Navigator>,
    id: ScreenId,
    dispatcher: Rc<Dispatcher>,
}

impl ScreenRoute {
    pub(crate) fn new(
        navigator: Weak<Navigator>,
        id: ScreenId,
        dispatcher: Rc<Dispatcher>,
    ) -> Self {
        Self {
            navigator,
            id,
            dispatcher,
        }
    }

    pub fn id(&self) -> ScreenId {
        self.id
    }

    fn perform<T>(
        &self,
        verb: &str,
        call: impl FnOnce(&Navigator) -> Result<T, NavigationError>,
    ) {
        let Some(navigator) = self.navigator.upgrade() else {
            tracing::debug!(id = %self.id, verb, "navigator gone, ignoring");
            return;
        };
        match call(&navigator) {
            Ok(_) => {}
            Err(NavigationError::ScreenGone(id)) => {
                tracing::debug!(id = %id, verb, "screen gone, ignoring");
            }
            Err(error) => {
                tracing::warn!(id = %self.id, verb, %error, "navigation call ignored");
            }
        }
    }
}

impl RouteSurface for ScreenRoute {
    fn dispatcher(&self) -> Rc<Dispatcher> {
        Rc::clone(&self.dispatcher)
    }

    fn embed(&self, screen: PendingScreen, container: &str) {
        self.perform("embed", |nav| nav.try_embed(self.id, screen, container));
    }

    fn replace(&self, screen: PendingScreen, animation: Animation) {
        self.perform("replace", |nav| nav.try_replace(self.id, screen, animation));
    }

    fn show(&self, screen: PendingScreen) {
        self.perform("show", |nav| nav.try_show(self.id, screen));
    }

    fn present(&self, screen: PendingScreen) {
        self.perform("present", |nav| nav.try_present(self.id, screen));
    }

    fn close(&self) {
        self.perform("close", |nav| nav.try_close(self.id));
    }

    fn dismiss(&self) {
        self.perform("dismiss", |nav| nav.try_dismiss(self.id));
    }

    fn pop(&self) {
        self.perform("pop", |nav| nav.try_pop(self.id));
    }

    fn pop_to_root(&self) {
        self.perform("pop_to_root", |nav| nav.try_pop_to_root(self.id));
    }
}

impl fmt::Debug for ScreenRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenRoute")
            .field("id", &self.id)
            .field("navigator_alive", &(self.navigator.strong_count() > 0))
            .finish()
    }
}
