//! Shared middleware registry handed to every store.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::app_store::{AppReducer, AppStore};
use crate::config::FrameworkConfig;
use crate::middleware::{DelayMiddleware, LoggingMiddleware, Middleware, MiddlewareChain};
use crate::scheduler::Scheduler;

/// Process-wide pipeline configuration, passed explicitly by `Rc`.
///
/// Every store built from the same dispatcher runs its events through the
/// same middleware list. Middleware is snapshotted per event, so adding
/// middleware while events are in flight affects only later events.
#[derive(Default)]
pub struct Dispatcher {
    middleware: RefCell<Vec<Rc<dyn Middleware>>>,
    app_store: RefCell<Option<Rc<dyn Any>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatcher with the built-in middleware enabled by `config`.
    pub fn from_config(config: &FrameworkConfig, scheduler: Rc<dyn Scheduler>) -> Self {
        let dispatcher = Self::new();
        if config.logging.enabled {
            dispatcher.add_middleware(LoggingMiddleware::with_state(config.logging.log_state));
        }
        if config.middleware.delay {
            dispatcher.add_middleware(DelayMiddleware::new(scheduler));
        }
        tracing::debug!(middleware = ?dispatcher.middleware_names(), "dispatcher configured");
        dispatcher
    }

    /// Append a middleware. It runs after the ones already installed.
    pub fn add_middleware(&self, middleware: impl Middleware + 'static) {
        self.add_shared_middleware(Rc::new(middleware));
    }

    /// Append a middleware the caller keeps a handle to.
    pub fn add_shared_middleware(&self, middleware: Rc<dyn Middleware>) {
        self.middleware.borrow_mut().push(middleware);
    }

    pub fn middleware_names(&self) -> Vec<String> {
        self.middleware
            .borrow()
            .iter()
            .map(|m| m.name().to_string())
            .collect()
    }

    pub(crate) fn chain(&self) -> MiddlewareChain {
        MiddlewareChain::new(self.middleware.borrow().clone())
    }

    /// Register the application-wide store. Replaces any previous one.
    pub fn set_app_store<R: AppReducer>(&self, store: AppStore<R>) {
        *self.app_store.borrow_mut() = Some(Rc::new(store));
    }

    /// The registered app store, if one with reducer `R` was set.
    pub fn app_store<R: AppReducer>(&self) -> Option<AppStore<R>> {
        self.app_store
            .borrow()
            .as_ref()
            .and_then(|store| store.downcast_ref::<AppStore<R>>())
            .cloned()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("middleware", &self.middleware_names())
            .field("app_store", &self.app_store.borrow().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LoggingConfig, MiddlewareConfig};
    use crate::scheduler::ManualScheduler;

    #[test]
    fn from_config_installs_enabled_middleware_in_order() {
        let config = FrameworkConfig {
            logging: LoggingConfig {
                enabled: true,
                ..LoggingConfig::default()
            },
            middleware: MiddlewareConfig { delay: true },
        };
        let dispatcher = Dispatcher::from_config(&config, Rc::new(ManualScheduler::new()));
        assert_eq!(dispatcher.middleware_names(), vec!["logging", "delay"]);
    }

    #[test]
    fn from_config_can_install_nothing() {
        let config = FrameworkConfig {
            logging: LoggingConfig {
                enabled: false,
                ..LoggingConfig::default()
            },
            middleware: MiddlewareConfig { delay: false },
        };
        let dispatcher = Dispatcher::from_config(&config, Rc::new(ManualScheduler::new()));
        assert!(dispatcher.middleware_names().is_empty());
    }
}
