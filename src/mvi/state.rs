//! Base trait for screen state.

use std::fmt;

/// State owned by one store.
///
/// Built once from the screen's payload and replaced wholesale by every
/// reduction. `Debug` is used by the logging middleware.
pub trait ScreenState: Clone + fmt::Debug + 'static {
    /// Data the screen is opened with. Use `()` for screens that need none.
    type Payload: 'static;

    fn from_payload(payload: Self::Payload) -> Self;
}
