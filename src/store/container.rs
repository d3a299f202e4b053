//! Per-screen state container.

use std::cell::{OnceCell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use super::error::StoreError;
use super::handle::{InputHandle, WeakStore};
use super::pipeline::{self, Completion, Core, Pipeline};
use super::queue::Pending;
use crate::dispatcher::Dispatcher;
use crate::middleware::{Decided, Envelope};
use crate::mvi::{Effects, Reducer, ScreenState};
use crate::reactive::{
    DisposeBag, Mailbox, Observable, ObservableExt, PublishSubject, ReadOnly, ReplayLast,
    Subscription,
};
use crate::router::{LiveScreen, RecordingSurface, RouteDispatch, RouteSurface, Router};

type OutputListener<R> = Rc<dyn Fn(<R as Reducer>::OutputAction)>;

/// Owns one screen's state and sequences every event through the
/// dispatcher's middleware, the reducer and the router.
///
/// Cloning a `Store` yields another handle to the same container.
pub struct Store<R: Reducer> {
    inner: Rc<StoreInner<R>>,
}

pub(crate) struct StoreInner<R: Reducer> {
    name: &'static str,
    reducer: R,
    router: Box<dyn Router<R>>,
    dispatcher: Rc<Dispatcher>,
    core: Core<R::State, Pending<R>>,
    surface: OnceCell<Rc<dyn RouteSurface>>,
    output_listener: RefCell<Option<OutputListener<R>>>,
    bag: DisposeBag,
}

impl<R: Reducer> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<R: Reducer> Store<R> {
    pub fn new(
        name: &'static str,
        dispatcher: Rc<Dispatcher>,
        reducer: R,
        router: Box<dyn Router<R>>,
    ) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                name,
                reducer,
                router,
                dispatcher,
                core: Core::new(),
                surface: OnceCell::new(),
                output_listener: RefCell::new(None),
                bag: DisposeBag::new(),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<StoreInner<R>>) -> Self {
        Self { inner }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    pub fn dispatcher(&self) -> &Rc<Dispatcher> {
        &self.inner.dispatcher
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.core.is_initialized()
    }

    /// Build the initial state and run the reducer's `initialize` hook.
    ///
    /// Only the first call has any effect.
    pub fn initialize(
        &self,
        surface: Rc<dyn RouteSurface>,
        payload: <R::State as ScreenState>::Payload,
    ) {
        if self.is_initialized() {
            tracing::debug!(screen = self.name(), "already initialized, ignoring");
            return;
        }
        // Cannot fail: the surface is only ever set here, guarded above.
        let _ = self.inner.surface.set(surface);

        let state = R::State::from_payload(payload);
        self.inner.core.commit(state.clone());
        tracing::debug!(screen = self.name(), "store initialized");

        let mut effects = Effects::new(self.downgrade());
        self.inner
            .core
            .reduce(|| self.inner.reducer.initialize(&state, &mut effects));
        self.inner
            .dispatcher
            .chain()
            .after(&Envelope::initialize(self.name()), &state);

        let pending = self.collect_pending(effects);
        pipeline::flush(self, pending, Box::new(|| {}));
    }

    /// Initialize against a [`RecordingSurface`] and return it, so routing
    /// can be asserted without a navigator.
    pub fn initialize_recorded(
        &self,
        payload: <R::State as ScreenState>::Payload,
    ) -> Rc<RecordingSurface> {
        let surface = Rc::new(RecordingSurface::new(Rc::clone(&self.inner.dispatcher)));
        self.initialize(surface.clone(), payload);
        surface
    }

    pub fn dispatch(&self, action: R::Action) {
        self.run(Pending::Action(action), Box::new(|| {}));
    }

    pub fn dispatch_input(&self, action: R::InputAction) {
        self.run(Pending::Input(action), Box::new(|| {}));
    }

    pub fn dispatch_output(&self, action: R::OutputAction) {
        self.run(Pending::Output(action), Box::new(|| {}));
    }

    pub fn dispatch_transition(&self, transition: R::Transition) {
        self.run(Pending::Transition(transition), Box::new(|| {}));
    }

    /// Dispatch every action queued in `mailbox`. Returns how many there were.
    pub fn drain_mailbox(&self, mailbox: &Mailbox<R::Action>) -> usize {
        let actions = mailbox.drain();
        let count = actions.len();
        for action in actions {
            self.dispatch(action);
        }
        count
    }

    /// The committed state.
    ///
    /// # Panics
    ///
    /// If the store has not been initialized. That is a wiring bug: the
    /// screen must call `initialize` before anything reads or dispatches.
    pub fn current_state(&self) -> R::State {
        match self.try_current_state() {
            Ok(state) => state,
            Err(_) => not_initialized(self.name()),
        }
    }

    pub fn try_current_state(&self) -> Result<R::State, StoreError> {
        self.inner
            .core
            .current()
            .ok_or(StoreError::NotInitialized { screen: self.name() })
    }

    /// Committed states, replaying the latest one to new subscribers.
    pub fn state(&self) -> ReadOnly<R::State, ReplayLast<R::State>> {
        self.inner.core.states()
    }

    /// A projection of the state that only emits when the projected value
    /// changes.
    pub fn field<T>(&self, extract: impl Fn(R::State) -> T + 'static) -> impl Observable<T>
    where
        T: PartialEq + Clone + 'static,
    {
        self.state().map(extract).distinct_until_changed()
    }

    /// Subject whose values are dispatched as actions.
    pub fn action_sink(&self) -> PublishSubject<R::Action>
    where
        R::Action: Clone,
    {
        let sink = PublishSubject::new();
        let store = self.downgrade();
        sink.subscribe(move |action: R::Action| store.dispatch(action))
            .dispose_in(&self.inner.bag);
        sink
    }

    /// Subject whose values are dispatched as output actions.
    pub fn output_sink(&self) -> PublishSubject<R::OutputAction>
    where
        R::OutputAction: Clone,
    {
        let sink = PublishSubject::new();
        let store = self.downgrade();
        sink.subscribe(move |action: R::OutputAction| store.dispatch_output(action))
            .dispose_in(&self.inner.bag);
        sink
    }

    /// Subject whose values are dispatched as transitions.
    pub fn transition_sink(&self) -> PublishSubject<R::Transition>
    where
        R::Transition: Clone,
    {
        let sink = PublishSubject::new();
        let store = self.downgrade();
        sink.subscribe(move |transition: R::Transition| {
            store.dispatch_transition(transition)
        })
        .dispose_in(&self.inner.bag);
        sink
    }

    /// Dispatch `map(value)` for every value `source` emits.
    ///
    /// The binding lives as long as the store unless the returned
    /// subscription is ended first.
    pub fn bind_actions<T, S>(
        &self,
        source: &S,
        map: impl Fn(T) -> R::Action + 'static,
    ) -> Subscription
    where
        S: Observable<T>,
        T: 'static,
    {
        let store = self.downgrade();
        let subscription =
            source.subscribe_boxed(Box::new(move |value: T| store.dispatch(map(value))));
        self.inner.bag.add(subscription.clone());
        subscription
    }

    /// Dispatch `map(value)` as a transition for every value `source` emits.
    pub fn bind_transitions<T, S>(
        &self,
        source: &S,
        map: impl Fn(T) -> R::Transition + 'static,
    ) -> Subscription
    where
        S: Observable<T>,
        T: 'static,
    {
        let store = self.downgrade();
        let subscription = source
            .subscribe_boxed(Box::new(move |value: T| store.dispatch_transition(map(value))));
        self.inner.bag.add(subscription.clone());
        subscription
    }

    /// Register the listener output actions are delivered to. Replaces any
    /// previous listener.
    pub fn set_output_listener(&self, listener: impl Fn(R::OutputAction) + 'static) {
        *self.inner.output_listener.borrow_mut() = Some(Rc::new(listener));
    }

    pub fn input_handle(&self) -> InputHandle<R> {
        InputHandle::new(self.downgrade())
    }

    pub fn downgrade(&self) -> WeakStore<R> {
        WeakStore::new(&self.inner)
    }

    fn surface(&self) -> Rc<dyn RouteSurface> {
        self.inner
            .surface
            .get()
            .cloned()
            .unwrap_or_else(|| not_initialized(self.name()))
    }

    fn apply(&self, event: Pending<R>, decided: Decided, done: Completion) {
        if !decided.should_run() {
            tracing::debug!(
                screen = self.name(),
                event = %decided.event(),
                cancelled_by = decided.cancelled_by().unwrap_or_default(),
                "event dropped"
            );
            done();
            return;
        }

        let cancelled = decided.cancelled();
        match event {
            Pending::Action(action) => self.change_state(decided, done, |reducer, state, effects| {
                reducer.reduce(action, state, cancelled, effects)
            }),
            Pending::Input(action) => self.change_state(decided, done, |reducer, state, effects| {
                reducer.reduce_input(action, state, cancelled, effects)
            }),
            Pending::Output(action) => {
                if cancelled {
                    tracing::debug!(
                        screen = self.name(),
                        event = %decided.event(),
                        cancelled_by = decided.cancelled_by().unwrap_or_default(),
                        "cancelled output action delivered, it tolerates cancellation"
                    );
                }
                let listener = self.inner.output_listener.borrow().clone();
                match listener {
                    Some(listener) => listener(action),
                    None => tracing::trace!(screen = self.name(), "no output listener"),
                }
                decided.after(&self.current_state());
                done();
            }
            Pending::Transition(transition) => {
                let state = self.current_state();
                let surface = self.surface();
                let mut dispatch = RouteDispatch::new(self.downgrade());
                self.inner.router.route(
                    transition,
                    &state,
                    cancelled,
                    surface.as_ref(),
                    &self.inner.reducer,
                    &mut dispatch,
                );
                decided.after(&self.current_state());
                let routed = dispatch.into_queued().into_iter().map(Pending::Action).collect();
                pipeline::flush(self, routed, done);
            }
        }
    }

    fn change_state(
        &self,
        decided: Decided,
        done: Completion,
        reduce: impl FnOnce(&R, &R::State, &mut Effects<R>) -> R::State,
    ) {
        let state = self.current_state();
        let mut effects = Effects::new(self.downgrade());
        let next = self
            .inner
            .core
            .reduce(|| reduce(&self.inner.reducer, &state, &mut effects));

        self.inner.core.commit(next.clone());
        decided.after(&next);

        let pending = self.collect_pending(effects);
        pipeline::flush(self, pending, done);
    }

    fn collect_pending(&self, effects: Effects<R>) -> VecDeque<Pending<R>> {
        self.inner
            .core
            .with_spill(effects.into_queues().into_pending())
    }
}

impl<R: Reducer> Pipeline for Store<R> {
    type Event = Pending<R>;
    type Weak = WeakStore<R>;

    fn run(&self, event: Pending<R>, done: Completion) {
        let Some(event) = self.inner.core.park(event) else {
            tracing::trace!(screen = self.name(), "dispatch during reduction, deferred");
            done();
            return;
        };

        let state = self.current_state();
        let envelope = event.envelope(self.name());
        let chain = self.inner.dispatcher.chain();
        tracing::trace!(
            screen = self.name(),
            event = %envelope,
            middleware = chain.len(),
            "event entering pipeline"
        );

        let store = self.downgrade();
        chain.process(envelope, &state, move |decided| match store.upgrade() {
            Some(store) => store.apply(event, decided, done),
            None => {
                tracing::debug!(event = %decided.event(), "store gone before event was decided");
                done();
            }
        });
    }

    fn weak(&self) -> WeakStore<R> {
        self.downgrade()
    }

    fn upgrade(weak: &WeakStore<R>) -> Option<Self> {
        weak.upgrade()
    }
}

impl<R: Reducer> Store<R>
where
    R::State: ScreenState<Payload = ()>,
{
    /// Initialize a screen that needs no payload.
    pub fn initialize_default(&self, surface: Rc<dyn RouteSurface>) {
        self.initialize(surface, ());
    }
}

impl<R: Reducer> LiveScreen for Store<R> {
    fn name(&self) -> &str {
        self.inner.name
    }

    fn state_description(&self) -> Option<String> {
        self.try_current_state().ok().map(|state| format!("{state:?}"))
    }
}

impl<R: Reducer> fmt::Debug for Store<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.inner.name)
            .field("state", &self.inner.core.current())
            .finish()
    }
}

impl<R: Reducer> Drop for StoreInner<R> {
    fn drop(&mut self) {
        tracing::trace!(screen = self.name, "store dropped");
    }
}

fn not_initialized(screen: &str) -> ! {
    panic!("store '{screen}' used before initialize(); initialize the screen before dispatching")
}
