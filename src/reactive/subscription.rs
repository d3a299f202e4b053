//! Subscription handles and dispose bags.
//!
//! A [`Subscription`] owns an rxrust [`BoxedSubscription`]; teardown closures
//! are adapted to rxrust's subscription trait so both kinds unsubscribe the
//! same way.

use rxrust::prelude::{BoxedSubscription, Subscription as RxSubscription};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Handle returned by `subscribe`.
///
/// Dropping a `Subscription` does not end it: the observer stays attached
/// until `unsubscribe` is called, either directly or through a
/// [`DisposeBag`]. Clones share the same underlying registration.
#[derive(Clone)]
pub struct Subscription {
    inner: Rc<RefCell<Option<BoxedSubscription>>>,
}

struct Teardown(Option<Box<dyn FnOnce()>>);

impl RxSubscription for Teardown {
    fn unsubscribe(self) {
        if let Some(teardown) = self.0 {
            teardown();
        }
    }

    fn is_closed(&self) -> bool {
        self.0.is_none()
    }
}

impl Subscription {
    /// Create a subscription that runs `teardown` on the first `unsubscribe`.
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        let teardown = Teardown(Some(Box::new(teardown)));
        Self {
            inner: Rc::new(RefCell::new(Some(BoxedSubscription::new(teardown)))),
        }
    }

    /// A subscription that is already closed.
    pub fn closed() -> Self {
        Self {
            inner: Rc::new(RefCell::new(None)),
        }
    }

    /// Detach the observer. Calling this more than once is a no-op.
    pub fn unsubscribe(&self) {
        let taken = self.inner.borrow_mut().take();
        if let Some(subscription) = taken {
            subscription.unsubscribe();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner
            .borrow()
            .as_ref()
            .is_none_or(|subscription| subscription.is_closed())
    }

    /// Hand ownership of this subscription to `bag`.
    pub fn dispose_in(self, bag: &DisposeBag) {
        bag.add(self);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("is_closed", &self.is_closed())
            .finish()
    }
}

/// Collects subscriptions and unsubscribes all of them when disposed or
/// dropped.
#[derive(Default)]
pub struct DisposeBag {
    subscriptions: RefCell<SmallVec<[Subscription; 4]>>,
}

impl DisposeBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscription. Closed entries are pruned on every insert.
    pub fn add(&self, subscription: Subscription) {
        let mut subscriptions = self.subscriptions.borrow_mut();
        subscriptions.retain(|s| !s.is_closed());
        subscriptions.push(subscription);
    }

    /// Number of subscriptions still open.
    pub fn len(&self) -> usize {
        self.subscriptions
            .borrow()
            .iter()
            .filter(|s| !s.is_closed())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unsubscribe everything collected so far. The bag stays usable.
    pub fn dispose(&self) {
        let drained: SmallVec<[Subscription; 4]> =
            std::mem::take(&mut *self.subscriptions.borrow_mut());
        for subscription in drained {
            subscription.unsubscribe();
        }
    }
}

impl Drop for DisposeBag {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for DisposeBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisposeBag")
            .field("open", &self.len())
            .finish()
    }
}
