//! Broadcast hub: the rxrust local subject every [`Subject`](super::Subject)
//! multicasts through.

use std::convert::Infallible;

use rxrust::prelude::*;

pub(super) struct Hub<T> {
    subject: LocalSubject<'static, T, Infallible>,
}

impl<T> Hub<T> {
    pub(super) fn new() -> Self {
        Self {
            subject: Local::subject::<T, Infallible>(),
        }
    }
}

impl<T> Clone for Hub<T> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject.clone(),
        }
    }
}

impl<T: Clone + 'static> Hub<T> {

    /// Register `deliver`. It receives every value emitted after this call.
    pub(super) fn attach(&self, mut deliver: impl FnMut(T) + 'static) -> BoxedSubscription {
        BoxedSubscription::new(self.subject.clone().subscribe(move |value: T| deliver(value)))
    }

    /// Must not be called while a previous `emit` is still delivering.
    pub(super) fn emit(&self, value: T) {
        self.subject.clone().next(value);
    }
}

pub(super) fn detach(link: BoxedSubscription) {
    link.unsubscribe();
}
