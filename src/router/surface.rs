//! The routing surface: navigation verbs a host must provide.

use std::fmt;
use std::rc::Rc;

use crate::dispatcher::Dispatcher;
use crate::screen::{Screen, ScreenLaunch};
use crate::store::InputHandle;

/// Visual style of a root replacement. Headless surfaces only record it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Animation {
    #[default]
    CrossDissolve,
    FlipFromLeft,
    FlipFromRight,
    None,
}

/// A started screen as the navigation layer holds it.
///
/// Dropping the box drops the screen's store.
pub trait LiveScreen {
    fn name(&self) -> &str;

    /// `Debug` rendering of the current state, if initialized.
    fn state_description(&self) -> Option<String>;
}

/// A screen that has been built but not started yet.
///
/// The surface decides where the screen goes, then calls
/// [`start`](Self::start) with the surface the new screen should route
/// through. A surface that never starts it (such as
/// [`RecordingSurface`](super::RecordingSurface)) simply drops it.
pub struct PendingScreen {
    name: &'static str,
    navigation: bool,
    start: Box<dyn FnOnce(Rc<dyn RouteSurface>) -> Box<dyn LiveScreen>>,
}

impl PendingScreen {
    pub fn new(
        name: &'static str,
        navigation: bool,
        start: impl FnOnce(Rc<dyn RouteSurface>) -> Box<dyn LiveScreen> + 'static,
    ) -> Self {
        Self {
            name,
            navigation,
            start: Box::new(start),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the screen should be wrapped in its own navigation stack
    /// when presented or installed as a root.
    pub fn wants_navigation(&self) -> bool {
        self.navigation
    }

    /// Initialize the screen against `surface`.
    pub fn start(self, surface: Rc<dyn RouteSurface>) -> Box<dyn LiveScreen> {
        (self.start)(surface)
    }
}

impl fmt::Debug for PendingScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingScreen")
            .field("name", &self.name)
            .field("navigation", &self.navigation)
            .finish()
    }
}

/// Navigation verbs available to a screen's router.
///
/// Every call is relative to the screen that owns the surface.
pub trait RouteSurface {
    /// Dispatcher new child screens are built with.
    fn dispatcher(&self) -> Rc<Dispatcher>;

    /// Host `screen` inside the named container of this screen.
    fn embed(&self, screen: PendingScreen, container: &str);

    /// Tear everything down and make `screen` the new root.
    fn replace(&self, screen: PendingScreen, animation: Animation);

    /// Push onto this screen's navigation stack, or present if there is none.
    fn show(&self, screen: PendingScreen);

    /// Present modally above everything.
    fn present(&self, screen: PendingScreen);

    /// Go away by whatever means fits how this screen was opened.
    fn close(&self);

    fn dismiss(&self);

    fn pop(&self);

    fn pop_to_root(&self);
}

/// Typed helpers for opening [`Screen`]s on any surface.
///
/// Each helper builds the child's store, wires its output listener if one
/// was given, hands it to the surface, and returns a handle for sending the
/// child input actions.
pub trait RouteSurfaceExt: RouteSurface {
    fn show_screen<S: Screen>(&self, launch: ScreenLaunch<S>) -> InputHandle<S::Reducer> {
        let (screen, input) = launch.prepare(self.dispatcher());
        self.show(screen);
        input
    }

    fn present_screen<S: Screen>(&self, launch: ScreenLaunch<S>) -> InputHandle<S::Reducer> {
        let (screen, input) = launch.prepare(self.dispatcher());
        self.present(screen);
        input
    }

    fn embed_screen<S: Screen>(
        &self,
        launch: ScreenLaunch<S>,
        container: &str,
    ) -> InputHandle<S::Reducer> {
        let (screen, input) = launch.prepare(self.dispatcher());
        self.embed(screen, container);
        input
    }

    fn replace_screen<S: Screen>(&self, launch: ScreenLaunch<S>, animation: Animation) {
        let (screen, _) = launch.prepare(self.dispatcher());
        self.replace(screen, animation);
    }
}

impl<T: RouteSurface + ?Sized> RouteSurfaceExt for T {}
