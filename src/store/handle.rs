//! Non-owning handles to a store.

use std::fmt;
use std::rc::{Rc, Weak};

use super::container::{Store, StoreInner};
use crate::mvi::Reducer;

/// Weak reference to a [`Store`].
///
/// Dispatching through a handle whose store is gone does nothing.
pub struct WeakStore<R: Reducer> {
    inner: Weak<StoreInner<R>>,
}

impl<R: Reducer> Clone for WeakStore<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<R: Reducer> WeakStore<R> {
    pub(crate) fn new(inner: &Rc<StoreInner<R>>) -> Self {
        Self {
            inner: Rc::downgrade(inner),
        }
    }

    /// A handle that never points to a store.
    pub fn detached() -> Self {
        Self { inner: Weak::new() }
    }

    pub fn upgrade(&self) -> Option<Store<R>> {
        self.inner.upgrade().map(Store::from_inner)
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub fn dispatch(&self, action: R::Action) {
        if let Some(store) = self.upgrade() {
            store.dispatch(action);
        }
    }

    pub fn dispatch_input(&self, action: R::InputAction) {
        if let Some(store) = self.upgrade() {
            store.dispatch_input(action);
        }
    }

    pub fn dispatch_output(&self, action: R::OutputAction) {
        if let Some(store) = self.upgrade() {
            store.dispatch_output(action);
        }
    }

    pub fn dispatch_transition(&self, transition: R::Transition) {
        if let Some(store) = self.upgrade() {
            store.dispatch_transition(transition);
        }
    }
}

impl<R: Reducer> fmt::Debug for WeakStore<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakStore")
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// What a parent gets back after opening a child screen: a way to send the
/// child input actions without keeping it alive.
pub struct InputHandle<R: Reducer> {
    store: WeakStore<R>,
}

impl<R: Reducer> Clone for InputHandle<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<R: Reducer> InputHandle<R> {
    pub(crate) fn new(store: WeakStore<R>) -> Self {
        Self { store }
    }

    /// A handle whose sends go nowhere, as returned by surfaces that never
    /// start the child.
    pub fn detached() -> Self {
        Self::new(WeakStore::detached())
    }

    pub fn send(&self, action: R::InputAction) {
        if !self.store.is_alive() {
            tracing::trace!(action = ?action, "input dropped, screen is gone");
            return;
        }
        self.store.dispatch_input(action);
    }

    pub fn is_alive(&self) -> bool {
        self.store.is_alive()
    }
}

impl<R: Reducer> fmt::Debug for InputHandle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}
