//! Reducer trait for screen stores.

use super::effects::Effects;
use super::intent::Intent;
use super::state::ScreenState;

/// Computes a screen's next state.
///
/// A reducer never touches the store directly. Everything it wants to happen
/// next (follow-up actions, output actions for the parent, transitions for
/// the router) is pushed into `effects` and runs after the returned state has
/// been committed.
pub trait Reducer: Sized + 'static {
    type State: ScreenState;
    type Action: Intent;
    type InputAction: Intent;
    type OutputAction: Intent;
    type Transition: Intent;

    /// Runs once, right after the initial state is built.
    fn initialize(&self, _state: &Self::State, _effects: &mut Effects<Self>) {}

    /// Process a local action and return the new state.
    fn reduce(
        &self,
        action: Self::Action,
        state: &Self::State,
        cancelled: bool,
        effects: &mut Effects<Self>,
    ) -> Self::State;

    /// Process an action sent in by the parent. Defaults to keeping the state.
    fn reduce_input(
        &self,
        _action: Self::InputAction,
        state: &Self::State,
        _cancelled: bool,
        _effects: &mut Effects<Self>,
    ) -> Self::State {
        state.clone()
    }
}
