mod common;

use common::*;
use screenflow::mvi::{Intent, ScreenState};
use screenflow::reactive::ObservableExt;
use screenflow::{AppEffects, AppReducer, AppStore, Dispatcher, StoreError};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Default)]
struct Session {
    user: Option<String>,
    audit: Vec<String>,
}

impl ScreenState for Session {
    type Payload = Option<String>;

    fn from_payload(user: Option<String>) -> Self {
        Self {
            user,
            audit: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SessionAction {
    Login(String),
    Logout,
    Audit(&'static str),
}

impl Intent for SessionAction {
    fn process_if_cancelled(&self) -> bool {
        matches!(self, SessionAction::Audit(_))
    }
}

struct SessionReducer;

impl AppReducer for SessionReducer {
    type State = Session;
    type Action = SessionAction;

    fn initialize(&self, state: &Session, effects: &mut AppEffects<Self>) {
        if state.user.is_some() {
            effects.action(SessionAction::Audit("restored"));
        }
    }

    fn reduce(
        &self,
        action: SessionAction,
        state: &Session,
        _cancelled: bool,
        effects: &mut AppEffects<Self>,
    ) -> Session {
        let mut next = state.clone();
        match action {
            SessionAction::Login(user) => {
                next.user = Some(user);
                effects.action(SessionAction::Audit("login"));
            }
            SessionAction::Logout => {
                next.user = None;
                effects.action(SessionAction::Audit("logout"));
            }
            SessionAction::Audit(entry) => next.audit.push(entry.to_string()),
        }
        next
    }
}

fn app(dispatcher: &Rc<Dispatcher>, user: Option<&str>) -> AppStore<SessionReducer> {
    let store = AppStore::new(dispatcher, SessionReducer);
    store.initialize(user.map(str::to_string));
    store
}

#[test]
fn dispatch_reduces_and_flushes_follow_ups() {
    let dispatcher = Rc::new(Dispatcher::new());
    let store = app(&dispatcher, None);

    store.dispatch(SessionAction::Login("ada".into()));
    store.dispatch(SessionAction::Logout);

    let state = store.current_state();
    assert_eq!(state.user, None);
    assert_eq!(state.audit, vec!["login", "logout"]);
}

#[test]
fn initialize_runs_once_and_flushes_its_effects() {
    let dispatcher = Rc::new(Dispatcher::new());
    let store = app(&dispatcher, Some("ada"));
    store.initialize(None);

    let state = store.current_state();
    assert_eq!(state.user.as_deref(), Some("ada"));
    assert_eq!(state.audit, vec!["restored"]);
}

#[test]
fn uninitialized_app_store_reports_an_error() {
    let dispatcher = Rc::new(Dispatcher::new());
    let store = AppStore::new(&dispatcher, SessionReducer);
    assert!(!store.is_initialized());
    assert_eq!(
        store.try_current_state(),
        Err(StoreError::NotInitialized { screen: "app" })
    );
}

#[test]
fn registered_store_is_reachable_from_any_screen() {
    let dispatcher = Rc::new(Dispatcher::new());
    dispatcher.set_app_store(app(&dispatcher, None));
    let screen = counter_store(&dispatcher);

    let shared = screen
        .dispatcher()
        .app_store::<SessionReducer>()
        .expect("app store registered");
    shared.dispatch(SessionAction::Login("grace".into()));

    let again = dispatcher.app_store::<SessionReducer>().expect("still registered");
    assert_eq!(again.current_state().user.as_deref(), Some("grace"));
}

#[test]
fn lookup_with_another_reducer_type_finds_nothing() {
    struct Other;
    impl AppReducer for Other {
        type State = Session;
        type Action = SessionAction;

        fn reduce(
            &self,
            _action: SessionAction,
            state: &Session,
            _cancelled: bool,
            _effects: &mut AppEffects<Self>,
        ) -> Session {
            state.clone()
        }
    }

    let dispatcher = Rc::new(Dispatcher::new());
    assert!(dispatcher.app_store::<SessionReducer>().is_none());
    dispatcher.set_app_store(app(&dispatcher, None));
    assert!(dispatcher.app_store::<Other>().is_none());
}

#[test]
fn app_actions_run_through_dispatcher_middleware() {
    let dispatcher = Rc::new(Dispatcher::new());
    let recorder = Recorder::default();
    dispatcher.add_middleware(recorder.clone());
    dispatcher.add_middleware(CancelKind(screenflow::middleware::EventKind::Action));
    let store = app(&dispatcher, None);

    store.dispatch(SessionAction::Login("ada".into()));
    store.dispatch(SessionAction::Audit("manual"));

    assert_eq!(store.current_state().user, None);
    assert_eq!(store.current_state().audit, vec!["manual"]);
    assert_eq!(recorder.count("before:action:Login(\"ada\")"), 1);
    assert_eq!(recorder.count("after:initialize:Initialize app"), 1);
}

#[test]
fn state_replays_latest_value() {
    let dispatcher = Rc::new(Dispatcher::new());
    let store = app(&dispatcher, None);
    store.dispatch(SessionAction::Login("ada".into()));

    let users = Rc::new(RefCell::new(Vec::new()));
    let sink = users.clone();
    store
        .state()
        .subscribe(move |state: Session| sink.borrow_mut().push(state.user));

    assert_eq!(*users.borrow(), vec![Some("ada".to_string())]);
}
