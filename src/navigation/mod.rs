//! In-memory navigation collaborator.
//!
//! ```text
//! layer 2 (modal)        [ Picker ]
//! layer 1 (modal, nav)   [ Settings ─→ Profile ]
//! layer 0 (root, nav)    [ Home ─→ Detail ]
//!                            └─ embedded "header": Banner
//! ```
//!
//! [`Navigator`] implements the routing verbs without a UI toolkit, so
//! routers can be exercised end to end: screens are real stores, started
//! when placed and dropped when removed.

mod error;
mod navigator;
mod registry;
mod route;

pub use error::NavigationError;
pub use navigator::{LayerInfo, Navigator};
pub use registry::ScreenId;
pub use route::ScreenRoute;
