//! Cross-thread hand-off queue.
//!
//! Stores are `!Send`. Work that finishes on another thread pushes its
//! result through a [`MailboxSender`]; the owning context drains the
//! [`Mailbox`] and dispatches what it finds.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

pub struct Mailbox<T> {
    queue: Arc<Mutex<VecDeque<T>>>,
}

/// Sending half of a [`Mailbox`]. Cheap to clone and `Send` when `T` is.
pub struct MailboxSender<T> {
    queue: Arc<Mutex<VecDeque<T>>>,
}

impl<T> Clone for MailboxSender<T> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
        }
    }
}

impl<T> MailboxSender<T> {
    pub fn send(&self, value: T) {
        self.queue.lock().push_back(value);
    }
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn sender(&self) -> MailboxSender<T> {
        MailboxSender {
            queue: Arc::clone(&self.queue),
        }
    }

    /// Take everything queued so far, oldest first.
    ///
    /// The lock is released before the values are returned, so senders are
    /// never blocked by whatever the caller does with them.
    pub fn drain(&self) -> Vec<T> {
        let mut queue = self.queue.lock();
        queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Mailbox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailbox").field("len", &self.len()).finish()
    }
}
