//! Multicast subjects.
//!
//! A subject is both an entry point (`next`, `complete`) and an
//! [`Observable`]. Delivery goes through an rxrust local subject; this layer
//! adds replay policies and serializes emissions. Values emitted while a
//! broadcast or a replay is running (for example from inside an observer) are
//! queued and delivered afterwards, so each observer sees every value exactly
//! once and in emission order.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use rxrust::prelude::BoxedSubscription;
use scopeguard::ScopeGuard;

use super::hub::{self, Hub};
use super::observer::BoxedObserver;
use super::ops::Observable;
use super::replay::{NoReplay, ReplayAll, ReplayLast, ReplayLastPerKey, ReplayPolicy};
use super::subscription::Subscription;

/// Subject without replay.
pub type PublishSubject<T> = Subject<T, NoReplay>;
/// Subject replaying every value (or the newest `limit`) to new subscribers.
pub type ReplaySubject<T> = Subject<T, ReplayAll<T>>;
/// Subject replaying the latest value to new subscribers.
pub type ReplayOneSubject<T> = Subject<T, ReplayLast<T>>;
/// Subject replaying the latest value of each category.
pub type KeyedReplaySubject<T, K> = Subject<T, ReplayLastPerKey<K, T>>;

enum Notification<T> {
    Next(T),
    Complete,
}

/// A subscriber's observer. `active` drops to false on unsubscribe so a
/// broadcast already in flight skips it.
struct Link<T> {
    observer: RefCell<BoxedObserver<T>>,
    active: Cell<bool>,
}

impl<T> Link<T> {
    fn next(&self, value: T) {
        if self.active.get() {
            self.observer.borrow_mut().next(value);
        }
    }

    fn complete(&self) {
        if self.active.replace(false) {
            self.observer.borrow_mut().complete();
        }
    }
}

struct Attached<T> {
    id: usize,
    link: Rc<Link<T>>,
    hub_link: BoxedSubscription,
}

struct SubjectCore<T, P> {
    hub: Hub<T>,
    attached: Vec<Attached<T>>,
    /// Subscribed during a broadcast; attached to the hub once it returns.
    joining: Vec<(usize, Rc<Link<T>>)>,
    /// Unsubscribed during a broadcast; detached from the hub once it returns.
    leaving: Vec<BoxedSubscription>,
    next_id: usize,
    policy: P,
    completed: bool,
    emitting: bool,
    pending: VecDeque<Notification<T>>,
}

type Core<T, P> = Rc<RefCell<SubjectCore<T, P>>>;

/// Multicast subject parameterized by its replay policy.
pub struct Subject<T, P = NoReplay> {
    core: Core<T, P>,
}

impl<T, P> Clone for Subject<T, P> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
        }
    }
}

impl<T, P> Subject<T, P> {
    pub fn with_policy(policy: P) -> Self {
        Self {
            core: Rc::new(RefCell::new(SubjectCore {
                hub: Hub::new(),
                attached: Vec::new(),
                joining: Vec::new(),
                leaving: Vec::new(),
                next_id: 0,
                policy,
                completed: false,
                emitting: false,
                pending: VecDeque::new(),
            })),
        }
    }

    /// Number of attached observers.
    pub fn observer_count(&self) -> usize {
        let core = self.core.borrow();
        core.attached.len() + core.joining.len()
    }

    pub fn is_completed(&self) -> bool {
        self.core.borrow().completed
    }
}

impl<T: Clone + 'static, P: ReplayPolicy<T> + 'static> Subject<T, P> {
    /// Emit a value to every observer.
    pub fn next(&self, value: T) {
        self.enqueue(Notification::Next(value));
    }

    /// Complete the subject. Observers are notified and detached; later
    /// values are ignored.
    pub fn complete(&self) {
        self.enqueue(Notification::Complete);
    }

    fn enqueue(&self, notification: Notification<T>) {
        {
            let mut core = self.core.borrow_mut();
            if core.completed {
                return;
            }
            core.pending.push_back(notification);
            if core.emitting {
                return;
            }
            core.emitting = true;
        }
        let _reset = self.emission_guard();
        self.drain();
    }

    /// Clears `emitting` when dropped. Only the frame that set the flag
    /// holds one.
    fn emission_guard(&self) -> ScopeGuard<Core<T, P>, fn(Core<T, P>)> {
        scopeguard::guard(Rc::clone(&self.core), |core| {
            core.borrow_mut().emitting = false;
        })
    }

    fn drain(&self) {
        loop {
            self.settle_membership();
            let notification = {
                let mut core = self.core.borrow_mut();
                let Some(notification) = core.pending.pop_front() else {
                    break;
                };
                match &notification {
                    Notification::Next(value) => core.policy.record(value),
                    Notification::Complete => {
                        core.completed = true;
                        core.pending.clear();
                    }
                }
                notification
            };

            match notification {
                Notification::Next(value) => {
                    let hub = self.core.borrow().hub.clone();
                    hub.emit(value);
                }
                Notification::Complete => self.finish(),
            }
        }
    }

    /// Apply subscribes and unsubscribes that happened while the hub was
    /// delivering.
    fn settle_membership(&self) {
        let (joining, leaving) = {
            let mut core = self.core.borrow_mut();
            (
                std::mem::take(&mut core.joining),
                std::mem::take(&mut core.leaving),
            )
        };
        for hub_link in leaving {
            hub::detach(hub_link);
        }
        for (id, link) in joining {
            self.attach(id, link);
        }
    }

    fn attach(&self, id: usize, link: Rc<Link<T>>) {
        let hub = self.core.borrow().hub.clone();
        let deliver = Rc::clone(&link);
        let hub_link = hub.attach(move |value: T| deliver.next(value));
        self.core.borrow_mut().attached.push(Attached { id, link, hub_link });
    }

    fn finish(&self) {
        let (attached, joining) = {
            let mut core = self.core.borrow_mut();
            (
                std::mem::take(&mut core.attached),
                std::mem::take(&mut core.joining),
            )
        };
        let mut links = Vec::with_capacity(attached.len() + joining.len());
        for entry in attached {
            hub::detach(entry.hub_link);
            links.push(entry.link);
        }
        links.extend(joining.into_iter().map(|(_, link)| link));
        for link in links {
            link.complete();
        }
    }

    fn detach(&self, id: usize) {
        let hub_link = {
            let mut core = self.core.borrow_mut();
            core.joining.retain(|(i, _)| *i != id);
            let Some(position) = core.attached.iter().position(|entry| entry.id == id) else {
                return;
            };
            let entry = core.attached.remove(position);
            if core.emitting {
                core.leaving.push(entry.hub_link);
                return;
            }
            entry.hub_link
        };
        hub::detach(hub_link);
    }

    /// Read-only view that can be subscribed to but not emitted into.
    pub fn as_observable(&self) -> ReadOnly<T, P> {
        ReadOnly {
            subject: self.clone(),
        }
    }
}

impl<T: Clone + 'static, P: ReplayPolicy<T> + 'static> Observable<T> for Subject<T, P> {
    fn subscribe_boxed(&self, observer: BoxedObserver<T>) -> Subscription {
        let link = Rc::new(Link {
            observer: RefCell::new(observer),
            active: Cell::new(true),
        });
        let (id, replay, completed, owns_emission) = {
            let mut core = self.core.borrow_mut();
            let id = core.next_id;
            core.next_id += 1;
            let owns_emission = !core.completed && !core.emitting;
            if owns_emission {
                core.emitting = true;
            }
            (id, core.policy.replay(), core.completed, owns_emission)
        };

        if completed {
            for value in replay {
                link.next(value);
            }
            link.complete();
            return Subscription::closed();
        }

        if owns_emission {
            // Emissions made by the observer while it is being replayed are
            // queued and reach it once it is attached.
            let _reset = self.emission_guard();
            for value in replay {
                link.next(value);
            }
            self.attach(id, Rc::clone(&link));
            self.drain();
        } else {
            for value in replay {
                link.next(value);
            }
            self.core
                .borrow_mut()
                .joining
                .push((id, Rc::clone(&link)));
        }

        let core = Rc::downgrade(&self.core);
        Subscription::new(move || {
            link.active.set(false);
            if let Some(core) = core.upgrade() {
                Subject { core }.detach(id);
            }
        })
    }
}

impl<T> Subject<T, NoReplay> {
    pub fn new() -> Self {
        Self::with_policy(NoReplay)
    }
}

impl<T> Default for Subject<T, NoReplay> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Subject<T, ReplayAll<T>> {
    pub fn unbounded() -> Self {
        Self::with_policy(ReplayAll::unbounded())
    }

    pub fn bounded(limit: usize) -> Self {
        Self::with_policy(ReplayAll::bounded(limit))
    }
}

impl<T: Clone> Subject<T, ReplayLast<T>> {
    pub fn empty() -> Self {
        Self::with_policy(ReplayLast::empty())
    }

    pub fn with_value(value: T) -> Self {
        Self::with_policy(ReplayLast::with_value(value))
    }

    /// Latest delivered value, if any.
    pub fn value(&self) -> Option<T> {
        self.core.borrow().policy.last().cloned()
    }
}

impl<T, K> Subject<T, ReplayLastPerKey<K, T>> {
    pub fn keyed(key: impl Fn(&T) -> K + 'static) -> Self {
        Self::with_policy(ReplayLastPerKey::new(key))
    }
}

impl<T, P> fmt::Debug for Subject<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.core.borrow();
        f.debug_struct("Subject")
            .field("observers", &core.attached.len())
            .field("completed", &core.completed)
            .finish()
    }
}

/// Subscribe-only view of a subject.
pub struct ReadOnly<T, P> {
    subject: Subject<T, P>,
}

impl<T, P> Clone for ReadOnly<T, P> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject.clone(),
        }
    }
}

impl<T: Clone + 'static, P: ReplayPolicy<T> + 'static> Observable<T> for ReadOnly<T, P> {
    fn subscribe_boxed(&self, observer: BoxedObserver<T>) -> Subscription {
        self.subject.subscribe_boxed(observer)
    }
}
