//! Reducer contract for screen stores.
//!
//! # Architecture
//!
//! ```text
//!            ┌──────────── Effects ────────────┐
//!            │ actions   outputs   transitions │
//!            ▼                                 │
//! Action ──→ Reducer ──→ State (committed) ────┘
//!                          │
//!                          ▼
//!                     observers / view
//! ```
//!
//! - **State**: immutable value built once from a payload, replaced wholesale
//! - **Intent**: any event value flowing through a store
//! - **Reducer**: pure function `(intent, state) -> state`; emissions go
//!   through [`Effects`] and are flushed only after the new state is committed

mod effects;
mod intent;
mod reducer;
mod state;

pub use effects::Effects;
pub use intent::Intent;
pub use reducer::Reducer;
pub use state::ScreenState;
