//! Unidirectional screen architecture.
//!
//! Each screen owns a [`Store`]: a state container that runs every event
//! through the [`Dispatcher`]'s middleware, reduces it, commits the new
//! state and only then processes whatever the reduction emitted. Transitions
//! go to the screen's [`Router`](router::Router), which drives a
//! [`RouteSurface`](router::RouteSurface) such as the headless
//! [`Navigator`](navigation::Navigator).
//!
//! # Architecture
//!
//! ```text
//! view ──action──→ Store ──→ middleware ──→ Reducer ──→ commit ──→ state observers
//!   ▲                │                         │
//!   │                │                    Effects (actions, outputs, transitions)
//!   │                ▼                         │
//!   │          output listener ◄───────────────┤
//!   │           (parent store)                 ▼
//!   └──────── RouteSurface ◄──────────────── Router
//! ```
//!
//! Everything here is single-threaded (`Rc`/`RefCell`). Work finishing on
//! other threads hands results back through a [`reactive::Mailbox`].

pub mod app_store;
pub mod config;
pub mod dispatcher;
pub mod logging;
pub mod middleware;
pub mod mvi;
pub mod navigation;
pub mod reactive;
pub mod router;
pub mod scheduler;
pub mod screen;
pub mod store;

pub use app_store::{AppEffects, AppReducer, AppStore};
pub use config::{ConfigError, FrameworkConfig};
pub use dispatcher::Dispatcher;
pub use mvi::{Effects, Intent, Reducer, ScreenState};
pub use screen::{Screen, ScreenLaunch};
pub use store::{InputHandle, Store, StoreError, WeakStore};

/// Imports most screens need.
pub mod prelude {
    pub use crate::dispatcher::Dispatcher;
    pub use crate::middleware::{Envelope, EventKind, Gate, Middleware};
    pub use crate::mvi::{Effects, Intent, Reducer, ScreenState};
    pub use crate::navigation::{Navigator, ScreenId};
    pub use crate::reactive::{Observable, ObservableExt, Observer};
    pub use crate::router::{
        Animation, FnRouter, NoRoutes, RouteDispatch, RouteSurface, RouteSurfaceExt, Router,
    };
    pub use crate::screen::{Screen, ScreenLaunch};
    pub use crate::store::{InputHandle, Store};
}
