//! Screen stores and the deferred-flush dispatch protocol.
//!
//! ```text
//! dispatch ──→ before hooks ──→ gates ──→ reduce ──→ commit ──→ after hooks
//!                                            │                       │
//!                                            └── Effects ──→ flush ◄─┘
//!                                                (actions, outputs, transitions)
//! ```
//!
//! Emissions made while a reducer runs are buffered and only processed once
//! the state the reducer returned has been committed. Each buffered event
//! goes through the whole pipeline, including its own flush, before the next
//! one starts, even when a middleware gate resolves asynchronously.

mod container;
mod error;
mod handle;
mod pipeline;
mod queue;

pub use container::Store;
pub use error::StoreError;
pub use handle::{InputHandle, WeakStore};
pub(crate) use pipeline::{flush, Completion, Core, Pipeline};
pub(crate) use queue::Queues;
