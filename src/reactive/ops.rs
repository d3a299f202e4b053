//! Observable trait and the few operators the store bindings need.

use std::marker::PhantomData;
use std::rc::Rc;

use super::observer::{BoxedObserver, Observer};
use super::subscription::Subscription;

/// A source of values that observers can subscribe to.
pub trait Observable<T> {
    fn subscribe_boxed(&self, observer: BoxedObserver<T>) -> Subscription;
}

/// Convenience combinators available on every [`Observable`].
pub trait ObservableExt<T>: Observable<T> + Sized {
    fn subscribe<O>(&self, observer: O) -> Subscription
    where
        O: Observer<T> + 'static,
    {
        self.subscribe_boxed(Box::new(observer))
    }

    fn map<U, F>(self, f: F) -> Map<Self, F, T>
    where
        F: Fn(T) -> U + 'static,
    {
        Map {
            source: self,
            f: Rc::new(f),
            _item: PhantomData,
        }
    }

    fn filter<F>(self, predicate: F) -> Filter<Self, F>
    where
        F: Fn(&T) -> bool + 'static,
    {
        Filter {
            source: self,
            predicate: Rc::new(predicate),
        }
    }

    /// Skip values equal to the previously delivered one.
    fn distinct_until_changed(self) -> DistinctUntilChanged<Self>
    where
        T: PartialEq + Clone,
    {
        DistinctUntilChanged { source: self }
    }
}

impl<T, O: Observable<T>> ObservableExt<T> for O {}

pub struct Map<S, F, T> {
    source: S,
    f: Rc<F>,
    _item: PhantomData<fn(T)>,
}

struct MapObserver<U, F> {
    inner: BoxedObserver<U>,
    f: Rc<F>,
}

impl<T, U, F> Observer<T> for MapObserver<U, F>
where
    F: Fn(T) -> U,
{
    fn next(&mut self, value: T) {
        self.inner.next((self.f)(value));
    }

    fn complete(&mut self) {
        self.inner.complete();
    }
}

impl<T, U, S, F> Observable<U> for Map<S, F, T>
where
    S: Observable<T>,
    F: Fn(T) -> U + 'static,
    T: 'static,
    U: 'static,
{
    fn subscribe_boxed(&self, observer: BoxedObserver<U>) -> Subscription {
        self.source.subscribe_boxed(Box::new(MapObserver {
            inner: observer,
            f: Rc::clone(&self.f),
        }))
    }
}

pub struct Filter<S, F> {
    source: S,
    predicate: Rc<F>,
}

struct FilterObserver<T, F> {
    inner: BoxedObserver<T>,
    predicate: Rc<F>,
}

impl<T, F> Observer<T> for FilterObserver<T, F>
where
    F: Fn(&T) -> bool,
{
    fn next(&mut self, value: T) {
        if (self.predicate)(&value) {
            self.inner.next(value);
        }
    }

    fn complete(&mut self) {
        self.inner.complete();
    }
}

impl<T, S, F> Observable<T> for Filter<S, F>
where
    S: Observable<T>,
    F: Fn(&T) -> bool + 'static,
    T: 'static,
{
    fn subscribe_boxed(&self, observer: BoxedObserver<T>) -> Subscription {
        self.source.subscribe_boxed(Box::new(FilterObserver {
            inner: observer,
            predicate: Rc::clone(&self.predicate),
        }))
    }
}

pub struct DistinctUntilChanged<S> {
    source: S,
}

struct DistinctObserver<T> {
    inner: BoxedObserver<T>,
    last: Option<T>,
}

impl<T: PartialEq + Clone> Observer<T> for DistinctObserver<T> {
    fn next(&mut self, value: T) {
        if self.last.as_ref() == Some(&value) {
            return;
        }
        self.last = Some(value.clone());
        self.inner.next(value);
    }

    fn complete(&mut self) {
        self.inner.complete();
    }
}

impl<T, S> Observable<T> for DistinctUntilChanged<S>
where
    S: Observable<T>,
    T: PartialEq + Clone + 'static,
{
    fn subscribe_boxed(&self, observer: BoxedObserver<T>) -> Subscription {
        self.source.subscribe_boxed(Box::new(DistinctObserver {
            inner: observer,
            last: None,
        }))
    }
}
