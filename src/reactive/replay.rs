//! Replay policies for subjects.
//!
//! A policy decides which already-delivered values a new subscriber receives
//! before live values.

use std::collections::VecDeque;
use std::rc::Rc;

/// Records delivered values and produces the replay for new subscribers.
pub trait ReplayPolicy<T> {
    /// Record a value that is being delivered to subscribers.
    fn record(&mut self, value: &T);

    /// Values a new subscriber receives, oldest first.
    fn replay(&self) -> Vec<T>;
}

/// Nothing is replayed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoReplay;

impl<T> ReplayPolicy<T> for NoReplay {
    fn record(&mut self, _value: &T) {}

    fn replay(&self) -> Vec<T> {
        Vec::new()
    }
}

/// Replays every delivered value, optionally keeping only the newest `limit`.
#[derive(Debug, Clone)]
pub struct ReplayAll<T> {
    buffer: VecDeque<T>,
    limit: Option<usize>,
}

impl<T> ReplayAll<T> {
    pub fn unbounded() -> Self {
        Self {
            buffer: VecDeque::new(),
            limit: None,
        }
    }

    pub fn bounded(limit: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(limit),
            limit: Some(limit),
        }
    }
}

impl<T: Clone> ReplayPolicy<T> for ReplayAll<T> {
    fn record(&mut self, value: &T) {
        if self.limit == Some(0) {
            return;
        }
        self.buffer.push_back(value.clone());
        if let Some(limit) = self.limit {
            while self.buffer.len() > limit {
                self.buffer.pop_front();
            }
        }
    }

    fn replay(&self) -> Vec<T> {
        self.buffer.iter().cloned().collect()
    }
}

/// Replays only the most recent value.
#[derive(Debug, Clone)]
pub struct ReplayLast<T> {
    last: Option<T>,
}

impl<T> ReplayLast<T> {
    pub fn empty() -> Self {
        Self { last: None }
    }

    pub fn with_value(value: T) -> Self {
        Self { last: Some(value) }
    }

    pub fn last(&self) -> Option<&T> {
        self.last.as_ref()
    }
}

impl<T: Clone> ReplayPolicy<T> for ReplayLast<T> {
    fn record(&mut self, value: &T) {
        self.last = Some(value.clone());
    }

    fn replay(&self) -> Vec<T> {
        self.last.iter().cloned().collect()
    }
}

/// Replays the most recent value of each category.
///
/// Categories are derived with the key function and replayed in the order
/// they were first seen.
pub struct ReplayLastPerKey<K, T> {
    key: Rc<dyn Fn(&T) -> K>,
    entries: Vec<(K, T)>,
}

impl<K, T> ReplayLastPerKey<K, T> {
    pub fn new(key: impl Fn(&T) -> K + 'static) -> Self {
        Self {
            key: Rc::new(key),
            entries: Vec::new(),
        }
    }
}

impl<K: PartialEq, T: Clone> ReplayPolicy<T> for ReplayLastPerKey<K, T> {
    fn record(&mut self, value: &T) {
        let key = (self.key)(value);
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value.clone(),
            None => self.entries.push((key, value.clone())),
        }
    }

    fn replay(&self) -> Vec<T> {
        self.entries.iter().map(|(_, v)| v.clone()).collect()
    }
}
