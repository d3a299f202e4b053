//! Routers: turning transitions into navigation.
//!
//! A [`Router`] decides *which* routing call a transition maps to. The
//! [`RouteSurface`] it calls is the navigation collaborator: the headless
//! [`Navigator`](crate::navigation::Navigator) in an app, a
//! [`RecordingSurface`] in tests.

mod recording;
mod surface;

pub use recording::{RecordingSurface, RouteCall};
pub use surface::{Animation, LiveScreen, PendingScreen, RouteSurface, RouteSurfaceExt};

use std::collections::VecDeque;
use std::fmt;

use crate::mvi::Reducer;
use crate::store::WeakStore;

/// Lets a router feed actions back into its own screen.
pub struct RouteDispatch<R: Reducer> {
    queued: VecDeque<R::Action>,
    handle: WeakStore<R>,
}

impl<R: Reducer> RouteDispatch<R> {
    pub(crate) fn new(handle: WeakStore<R>) -> Self {
        Self {
            queued: VecDeque::new(),
            handle,
        }
    }

    /// Detached dispatch for calling a router directly in unit tests.
    pub fn detached() -> Self {
        Self::new(WeakStore::detached())
    }

    /// Queue an action. Queued actions run after the transition's `after`
    /// hooks, in order.
    pub fn action(&mut self, action: R::Action) {
        self.queued.push_back(action);
    }

    /// Handle for dispatching later, e.g. from a child's output listener.
    pub fn later(&self) -> WeakStore<R> {
        self.handle.clone()
    }

    pub fn queued(&self) -> impl Iterator<Item = &R::Action> {
        self.queued.iter()
    }

    pub(crate) fn into_queued(self) -> VecDeque<R::Action> {
        self.queued
    }
}

/// Maps a screen's transitions to calls on its routing surface.
///
/// Actions pushed into `dispatch` are processed after the transition's
/// `after` hooks, in the order given.
pub trait Router<R: Reducer> {
    fn route(
        &self,
        transition: R::Transition,
        state: &R::State,
        cancelled: bool,
        surface: &dyn RouteSurface,
        reducer: &R,
        dispatch: &mut RouteDispatch<R>,
    );
}

/// Router for screens that never emit transitions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRoutes;

impl<R: Reducer> Router<R> for NoRoutes {
    fn route(
        &self,
        transition: R::Transition,
        _state: &R::State,
        _cancelled: bool,
        _surface: &dyn RouteSurface,
        _reducer: &R,
        _dispatch: &mut RouteDispatch<R>,
    ) {
        tracing::debug!(transition = ?transition, "no router installed, transition ignored");
    }
}

/// Router backed by a closure.
pub struct FnRouter<F> {
    route: F,
}

impl<F> FnRouter<F> {
    pub fn new(route: F) -> Self {
        Self { route }
    }
}

impl<F> fmt::Debug for FnRouter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRouter").finish_non_exhaustive()
    }
}

impl<R, F> Router<R> for FnRouter<F>
where
    R: Reducer,
    F: Fn(R::Transition, &R::State, bool, &dyn RouteSurface, &R, &mut RouteDispatch<R>),
{
    fn route(
        &self,
        transition: R::Transition,
        state: &R::State,
        cancelled: bool,
        surface: &dyn RouteSurface,
        reducer: &R,
        dispatch: &mut RouteDispatch<R>,
    ) {
        (self.route)(transition, state, cancelled, surface, reducer, dispatch);
    }
}
