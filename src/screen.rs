//! Screen modules: a reducer, a router and a name bundled as one type.

use std::fmt;
use std::rc::Rc;

use crate::dispatcher::Dispatcher;
use crate::mvi::{Reducer, ScreenState};
use crate::router::{LiveScreen, NoRoutes, PendingScreen, Router};
use crate::store::{InputHandle, Store};

type Payload<S> = <<<S as Screen>::Reducer as Reducer>::State as ScreenState>::Payload;
type Output<S> = <<S as Screen>::Reducer as Reducer>::OutputAction;

/// Everything needed to build a screen's store.
pub trait Screen: 'static {
    type Reducer: Reducer;

    /// Name used in logs, middleware envelopes and navigation snapshots.
    /// Defaults to the type's own name without its module path.
    fn name() -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    fn reducer() -> Self::Reducer;

    fn router() -> Box<dyn Router<Self::Reducer>> {
        Box::new(NoRoutes)
    }
}

/// Build an uninitialized store for `S`.
pub fn build<S: Screen>(dispatcher: Rc<Dispatcher>) -> Store<S::Reducer> {
    Store::new(S::name(), dispatcher, S::reducer(), S::router())
}

/// A request to open screen `S`: its payload, an optional listener for its
/// output actions, and whether it gets its own navigation stack.
pub struct ScreenLaunch<S: Screen> {
    payload: Payload<S>,
    output: Option<Rc<dyn Fn(Output<S>)>>,
    navigation: bool,
}

impl<S: Screen> ScreenLaunch<S> {
    pub fn new(payload: Payload<S>) -> Self {
        Self {
            payload,
            output: None,
            navigation: false,
        }
    }

    /// Deliver the child's output actions to `listener`.
    pub fn on_output(mut self, listener: impl Fn(Output<S>) + 'static) -> Self {
        self.output = Some(Rc::new(listener));
        self
    }

    /// Wrap the screen in a navigation stack when it is presented or
    /// installed as a root, so it can `show` further screens by pushing.
    pub fn in_navigation(mut self) -> Self {
        self.navigation = true;
        self
    }

    /// Build the store and package it for a surface.
    pub fn prepare(
        self,
        dispatcher: Rc<Dispatcher>,
    ) -> (PendingScreen, InputHandle<S::Reducer>) {
        let store = build::<S>(dispatcher);
        if let Some(output) = self.output {
            store.set_output_listener(move |action| output(action));
        }
        let input = store.input_handle();
        let payload = self.payload;
        let screen = PendingScreen::new(S::name(), self.navigation, move |surface| {
            store.initialize(surface, payload);
            Box::new(store) as Box<dyn LiveScreen>
        });
        (screen, input)
    }
}

impl<S: Screen> ScreenLaunch<S>
where
    <S::Reducer as Reducer>::State: ScreenState<Payload = ()>,
{
    /// Launch for a screen that needs no payload.
    pub fn empty() -> Self {
        Self::new(())
    }
}

impl<S: Screen> fmt::Debug for ScreenLaunch<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenLaunch")
            .field("screen", &S::name())
            .field("has_output", &self.output.is_some())
            .field("navigation", &self.navigation)
            .finish()
    }
}
