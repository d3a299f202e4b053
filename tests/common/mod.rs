//! Shared fixtures: a counter screen, a family of navigation pages and a
//! few recording middleware.

#![allow(dead_code, unused_imports)]

use screenflow::middleware::{Envelope, EventKind, Gate, Middleware};
use screenflow::mvi::{Effects, Intent, Reducer, ScreenState};
use screenflow::router::{RouteDispatch, RouteSurface, RouteSurfaceExt, Router};
use screenflow::{Dispatcher, InputHandle, Screen, ScreenLaunch, Store};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::io;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Counter screen
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CounterState {
    pub count: i32,
    pub history: Vec<String>,
}

impl ScreenState for CounterState {
    type Payload = i32;

    fn from_payload(start: i32) -> Self {
        Self {
            count: start,
            history: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CounterAction {
    Increment,
    Add(i32),
    /// Reduced even when cancelled; records how it was applied.
    Tolerant,
    /// Waits the given number of milliseconds in the delay middleware.
    Delayed(u64),
    /// Records its label, then emits the nested actions.
    Emit(&'static str, Vec<CounterAction>),
    /// Emits the output `Finished(count)`.
    Finish,
    /// Emits the `Open` transition.
    Open,
    /// Emits an action, an output and a transition from one reduction.
    Mixed,
    /// Emits through the `later()` handle while still reducing.
    EmitLater,
    Record(&'static str),
}

impl Intent for CounterAction {
    fn process_if_cancelled(&self) -> bool {
        matches!(self, CounterAction::Tolerant)
    }

    fn delay(&self) -> Option<Duration> {
        match self {
            CounterAction::Delayed(ms) => Some(Duration::from_millis(*ms)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CounterInput {
    Reset,
}

impl Intent for CounterInput {}

#[derive(Debug, Clone, PartialEq)]
pub enum CounterOutput {
    Finished(i32),
    /// Still delivered when a middleware cancels it.
    Dismissed,
}

impl Intent for CounterOutput {
    fn process_if_cancelled(&self) -> bool {
        matches!(self, CounterOutput::Dismissed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CounterTransition {
    Open,
    Close,
}

impl Intent for CounterTransition {}

/// Counter reducer that also counts its own invocations.
#[derive(Default)]
pub struct CounterReducer {
    pub reductions: Rc<Cell<usize>>,
    pub emit_on_init: bool,
}

impl Reducer for CounterReducer {
    type State = CounterState;
    type Action = CounterAction;
    type InputAction = CounterInput;
    type OutputAction = CounterOutput;
    type Transition = CounterTransition;

    fn initialize(&self, _state: &CounterState, effects: &mut Effects<Self>) {
        if self.emit_on_init {
            effects.action(CounterAction::Record("init"));
        }
    }

    fn reduce(
        &self,
        action: CounterAction,
        state: &CounterState,
        cancelled: bool,
        effects: &mut Effects<Self>,
    ) -> CounterState {
        self.reductions.set(self.reductions.get() + 1);
        let mut next = state.clone();
        match action {
            CounterAction::Increment => next.count += 1,
            CounterAction::Add(n) => next.count += n,
            CounterAction::Tolerant => {
                let label = if cancelled { "tolerant:cancelled" } else { "tolerant" };
                next.history.push(label.to_string());
            }
            CounterAction::Delayed(ms) => next.history.push(format!("delayed:{ms}")),
            CounterAction::Emit(label, then) => {
                next.history.push(label.to_string());
                for action in then {
                    effects.action(action);
                }
            }
            CounterAction::Finish => effects.output(CounterOutput::Finished(state.count)),
            CounterAction::Open => effects.transition(CounterTransition::Open),
            CounterAction::Mixed => {
                effects.transition(CounterTransition::Close);
                effects.output(CounterOutput::Finished(state.count));
                effects.action(CounterAction::Record("follow-up"));
            }
            CounterAction::EmitLater => {
                effects.later().dispatch(CounterAction::Record("later"));
                next.history.push("emit-later".to_string());
            }
            CounterAction::Record(label) => next.history.push(label.to_string()),
        }
        next
    }

    fn reduce_input(
        &self,
        action: CounterInput,
        state: &CounterState,
        _cancelled: bool,
        _effects: &mut Effects<Self>,
    ) -> CounterState {
        match action {
            CounterInput::Reset => CounterState {
                count: 0,
                history: state.history.clone(),
            },
        }
    }
}

/// Routes `Open` to a `Show` of [`Detail`] and queues a `Record("routed")`.
pub struct CounterRouter;

impl Router<CounterReducer> for CounterRouter {
    fn route(
        &self,
        transition: CounterTransition,
        _state: &CounterState,
        cancelled: bool,
        surface: &dyn RouteSurface,
        _reducer: &CounterReducer,
        dispatch: &mut RouteDispatch<CounterReducer>,
    ) {
        if cancelled {
            return;
        }
        match transition {
            CounterTransition::Open => {
                surface.show_screen(ScreenLaunch::<Detail>::empty());
                dispatch.action(CounterAction::Record("routed"));
            }
            CounterTransition::Close => surface.close(),
        }
    }
}

pub struct Counter;

impl Screen for Counter {
    type Reducer = CounterReducer;

    fn reducer() -> CounterReducer {
        CounterReducer::default()
    }

    fn router() -> Box<dyn Router<CounterReducer>> {
        Box::new(CounterRouter)
    }
}

/// Counter store initialized against a recording surface.
pub fn counter_store(dispatcher: &Rc<Dispatcher>) -> Store<CounterReducer> {
    let store = screenflow::screen::build::<Counter>(Rc::clone(dispatcher));
    store.initialize_recorded(0);
    store
}

/// Counter store whose reducer shares its invocation counter with the test.
pub fn counting_store(
    dispatcher: &Rc<Dispatcher>,
) -> (Store<CounterReducer>, Rc<Cell<usize>>) {
    let reductions = Rc::new(Cell::new(0));
    let reducer = CounterReducer {
        reductions: reductions.clone(),
        emit_on_init: false,
    };
    let store = Store::new("Counter", Rc::clone(dispatcher), reducer, Box::new(CounterRouter));
    store.initialize_recorded(0);
    (store, reductions)
}

// ---------------------------------------------------------------------------
// Navigation pages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Home,
    Detail,
    Modal,
    Banner,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTransition {
    Show(Target),
    Present(Target),
    PresentInNavigation(Target),
    Embed(Target, &'static str),
    Replace(Target),
    Pop,
    PopToRoot,
    Dismiss,
    Close,
}

impl Intent for PageTransition {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageInput {
    Go(PageTransition),
    Finish,
}

impl Intent for PageInput {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutput {
    Finished(u32),
}

impl Intent for PageOutput {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
    ChildFinished(u32),
}

impl Intent for PageAction {}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageState {
    pub visits: u32,
    pub finished_children: Vec<u32>,
}

impl ScreenState for PageState {
    type Payload = ();

    fn from_payload(_: ()) -> Self {
        Self::default()
    }
}

pub struct PageReducer;

impl Reducer for PageReducer {
    type State = PageState;
    type Action = PageAction;
    type InputAction = PageInput;
    type OutputAction = PageOutput;
    type Transition = PageTransition;

    fn reduce(
        &self,
        action: PageAction,
        state: &PageState,
        _cancelled: bool,
        _effects: &mut Effects<Self>,
    ) -> PageState {
        match action {
            PageAction::ChildFinished(visits) => {
                let mut next = state.clone();
                next.finished_children.push(visits);
                next
            }
        }
    }

    fn reduce_input(
        &self,
        action: PageInput,
        state: &PageState,
        _cancelled: bool,
        effects: &mut Effects<Self>,
    ) -> PageState {
        let mut next = state.clone();
        next.visits += 1;
        match action {
            PageInput::Go(transition) => effects.transition(transition),
            PageInput::Finish => effects.output(PageOutput::Finished(next.visits)),
        }
        next
    }
}

thread_local! {
    /// Input handles of every page a [`PageRouter`] opened on this thread.
    static OPENED: RefCell<Vec<(&'static str, InputHandle<PageReducer>)>> =
        const { RefCell::new(Vec::new()) };
}

/// Input handle of the most recently opened page named `name`.
pub fn opened(name: &str) -> InputHandle<PageReducer> {
    OPENED.with(|opened| {
        opened
            .borrow()
            .iter()
            .rev()
            .find(|(n, _)| *n == name)
            .map(|(_, input)| input.clone())
            .unwrap_or_else(|| panic!("no page named {name} was opened"))
    })
}

/// Opens pages and wires each child's output back into the opener.
pub struct PageRouter;

fn launch<S: Screen<Reducer = PageReducer>>(
    dispatch: &RouteDispatch<PageReducer>,
    navigation: bool,
) -> ScreenLaunch<S> {
    let parent = dispatch.later();
    let launch = ScreenLaunch::<S>::empty().on_output(move |output| match output {
        PageOutput::Finished(visits) => parent.dispatch(PageAction::ChildFinished(visits)),
    });
    if navigation {
        launch.in_navigation()
    } else {
        launch
    }
}

fn open(
    surface: &dyn RouteSurface,
    dispatch: &RouteDispatch<PageReducer>,
    target: Target,
    how: &PageTransition,
) {
    macro_rules! go {
        ($screen:ty) => {{
            let input = match how {
                PageTransition::Show(_) => {
                    Some(surface.show_screen(launch::<$screen>(dispatch, false)))
                }
                PageTransition::Present(_) => {
                    Some(surface.present_screen(launch::<$screen>(dispatch, false)))
                }
                PageTransition::PresentInNavigation(_) => {
                    Some(surface.present_screen(launch::<$screen>(dispatch, true)))
                }
                PageTransition::Embed(_, container) => {
                    Some(surface.embed_screen(launch::<$screen>(dispatch, false), container))
                }
                PageTransition::Replace(_) => {
                    surface.replace_screen(
                        launch::<$screen>(dispatch, true),
                        screenflow::router::Animation::default(),
                    );
                    None
                }
                _ => None,
            };
            if let Some(input) = input {
                OPENED.with(|opened| {
                    opened
                        .borrow_mut()
                        .push((<$screen as Screen>::name(), input))
                });
            }
        }};
    }
    match target {
        Target::Home => go!(Home),
        Target::Detail => go!(Detail),
        Target::Modal => go!(Modal),
        Target::Banner => go!(Banner),
    }
}

impl Router<PageReducer> for PageRouter {
    fn route(
        &self,
        transition: PageTransition,
        _state: &PageState,
        _cancelled: bool,
        surface: &dyn RouteSurface,
        _reducer: &PageReducer,
        dispatch: &mut RouteDispatch<PageReducer>,
    ) {
        match &transition {
            PageTransition::Show(target)
            | PageTransition::Present(target)
            | PageTransition::PresentInNavigation(target)
            | PageTransition::Embed(target, _)
            | PageTransition::Replace(target) => open(surface, dispatch, *target, &transition),
            PageTransition::Pop => surface.pop(),
            PageTransition::PopToRoot => surface.pop_to_root(),
            PageTransition::Dismiss => surface.dismiss(),
            PageTransition::Close => surface.close(),
        }
    }
}

macro_rules! page {
    ($name:ident) => {
        pub struct $name;

        impl Screen for $name {
            type Reducer = PageReducer;

            fn reducer() -> PageReducer {
                PageReducer
            }

            fn router() -> Box<dyn Router<PageReducer>> {
                Box::new(PageRouter)
            }
        }
    };
}

page!(Home);
page!(Modal);
page!(Banner);

/// Detail doubles as the child the counter router opens.
pub struct Detail;

impl Screen for Detail {
    type Reducer = PageReducer;

    fn reducer() -> PageReducer {
        PageReducer
    }

    fn router() -> Box<dyn Router<PageReducer>> {
        Box::new(PageRouter)
    }
}

// ---------------------------------------------------------------------------
// Middleware
// ---------------------------------------------------------------------------

/// Records every hook call as `"<hook>:<kind>:<description>"`.
#[derive(Clone, Default)]
pub struct Recorder {
    pub log: Rc<RefCell<Vec<String>>>,
    pub states: Rc<RefCell<Vec<String>>>,
}

impl Recorder {
    pub fn entries(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}

impl Middleware for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn before(&self, event: &Envelope, state: &dyn fmt::Debug) {
        self.log
            .borrow_mut()
            .push(format!("before:{}:{}", event.kind, event.description));
        self.states.borrow_mut().push(format!("before {state:?}"));
    }

    fn after(&self, event: &Envelope, state: &dyn fmt::Debug) {
        self.log
            .borrow_mut()
            .push(format!("after:{}:{}", event.kind, event.description));
        self.states.borrow_mut().push(format!("after {state:?}"));
    }
}

/// Cancels every event whose kind matches.
pub struct CancelKind(pub EventKind);

impl Middleware for CancelKind {
    fn name(&self) -> &str {
        "cancel"
    }

    fn gate(&self, event: &Envelope, gate: Gate) {
        if event.kind == self.0 {
            gate.cancel();
        } else {
            gate.proceed();
        }
    }
}

/// Holds every gate until the test releases it.
#[derive(Clone, Default)]
pub struct Holding {
    pub held: Rc<RefCell<Vec<(String, Gate)>>>,
}

impl Holding {
    /// Proceed the oldest held event.
    pub fn release_next(&self) -> bool {
        let next = {
            let mut held = self.held.borrow_mut();
            if held.is_empty() {
                None
            } else {
                Some(held.remove(0))
            }
        };
        match next {
            Some((_, gate)) => {
                gate.proceed();
                true
            }
            None => false,
        }
    }

    pub fn held_descriptions(&self) -> Vec<String> {
        self.held.borrow().iter().map(|(d, _)| d.clone()).collect()
    }
}

impl Middleware for Holding {
    fn name(&self) -> &str {
        "holding"
    }

    fn gate(&self, event: &Envelope, gate: Gate) {
        self.held.borrow_mut().push((event.description.clone(), gate));
    }
}

// ---------------------------------------------------------------------------
// Log capture
// ---------------------------------------------------------------------------

/// Collects formatted tracing output for assertions.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<parking_lot::Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    /// Run `f` with a debug-level fmt subscriber writing into this buffer.
    pub fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> LogBuffer {
        self.clone()
    }
}
