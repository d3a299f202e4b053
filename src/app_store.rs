//! Application-wide store.
//!
//! Same pipeline as a screen [`Store`](crate::Store): dispatcher middleware,
//! deferred flush, replayed state. It has no router, no outputs and no
//! inputs, and it is registered on the [`Dispatcher`] so any screen can reach
//! it.

use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::dispatcher::Dispatcher;
use crate::middleware::{Decided, Envelope, EventKind, MiddlewareChain};
use crate::mvi::{Intent, ScreenState};
use crate::reactive::{ReadOnly, ReplayLast};
use crate::store::{flush, Completion, Core, Pipeline, StoreError};

const APP: &str = "app";

/// Reducer for the application store.
pub trait AppReducer: Sized + 'static {
    type State: ScreenState;
    type Action: Intent;

    fn initialize(&self, _state: &Self::State, _effects: &mut AppEffects<Self>) {}

    fn reduce(
        &self,
        action: Self::Action,
        state: &Self::State,
        cancelled: bool,
        effects: &mut AppEffects<Self>,
    ) -> Self::State;
}

/// Follow-up actions emitted by an [`AppReducer`], processed after commit.
pub struct AppEffects<R: AppReducer> {
    actions: VecDeque<R::Action>,
}

impl<R: AppReducer> AppEffects<R> {
    pub fn new() -> Self {
        Self {
            actions: VecDeque::new(),
        }
    }

    pub fn action(&mut self, action: R::Action) {
        self.actions.push_back(action);
    }

    pub fn actions(&self) -> impl Iterator<Item = &R::Action> {
        self.actions.iter()
    }
}

impl<R: AppReducer> Default for AppEffects<R> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct AppStore<R: AppReducer> {
    inner: Rc<AppInner<R>>,
}

pub(crate) struct AppInner<R: AppReducer> {
    reducer: R,
    // Weak: the dispatcher owns the registered app store.
    dispatcher: Weak<Dispatcher>,
    core: Core<R::State, R::Action>,
}

impl<R: AppReducer> Clone for AppStore<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<R: AppReducer> AppStore<R> {
    pub fn new(dispatcher: &Rc<Dispatcher>, reducer: R) -> Self {
        Self {
            inner: Rc::new(AppInner {
                reducer,
                dispatcher: Rc::downgrade(dispatcher),
                core: Core::new(),
            }),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.core.is_initialized()
    }

    /// Build the initial state. Only the first call has any effect.
    pub fn initialize(&self, payload: <R::State as ScreenState>::Payload) {
        if self.is_initialized() {
            tracing::debug!("app store already initialized, ignoring");
            return;
        }
        let state = R::State::from_payload(payload);
        self.inner.core.commit(state.clone());

        let mut effects = AppEffects::new();
        self.inner
            .core
            .reduce(|| self.inner.reducer.initialize(&state, &mut effects));
        self.chain().after(&Envelope::initialize(APP), &state);

        let pending = self.inner.core.with_spill(effects.actions);
        flush(self, pending, Box::new(|| {}));
    }

    pub fn dispatch(&self, action: R::Action) {
        self.run(action, Box::new(|| {}));
    }

    /// # Panics
    ///
    /// If the app store has not been initialized.
    pub fn current_state(&self) -> R::State {
        match self.try_current_state() {
            Ok(state) => state,
            Err(error) => panic!("{error}"),
        }
    }

    pub fn try_current_state(&self) -> Result<R::State, StoreError> {
        self.inner
            .core
            .current()
            .ok_or(StoreError::NotInitialized { screen: APP })
    }

    pub fn state(&self) -> ReadOnly<R::State, ReplayLast<R::State>> {
        self.inner.core.states()
    }

    fn chain(&self) -> MiddlewareChain {
        self.inner
            .dispatcher
            .upgrade()
            .map(|dispatcher| dispatcher.chain())
            .unwrap_or_default()
    }

    fn apply(&self, action: R::Action, decided: Decided, done: Completion) {
        if !decided.should_run() {
            tracing::debug!(event = %decided.event(), "app action dropped");
            done();
            return;
        }
        let cancelled = decided.cancelled();
        let state = self.current_state();
        let mut effects = AppEffects::new();
        let next = self.inner.core.reduce(|| {
            self.inner
                .reducer
                .reduce(action, &state, cancelled, &mut effects)
        });
        self.inner.core.commit(next.clone());
        decided.after(&next);

        let pending = self.inner.core.with_spill(effects.actions);
        flush(self, pending, done);
    }
}

impl<R: AppReducer> Pipeline for AppStore<R> {
    type Event = R::Action;
    type Weak = Weak<AppInner<R>>;

    fn run(&self, action: R::Action, done: Completion) {
        let Some(action) = self.inner.core.park(action) else {
            done();
            return;
        };
        let state = self.current_state();
        let envelope = Envelope::of(EventKind::Action, APP, &action);
        let store = Rc::downgrade(&self.inner);
        self.chain().process(envelope, &state, move |decided| match store.upgrade() {
            Some(inner) => AppStore { inner }.apply(action, decided, done),
            None => done(),
        });
    }

    fn weak(&self) -> Self::Weak {
        Rc::downgrade(&self.inner)
    }

    fn upgrade(weak: &Self::Weak) -> Option<Self> {
        weak.upgrade().map(|inner| AppStore { inner })
    }
}

impl<R: AppReducer> fmt::Debug for AppStore<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppStore")
            .field("state", &self.inner.core.current())
            .finish()
    }
}
