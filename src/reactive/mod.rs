//! Reactive-subject substrate.
//!
//! Single-threaded multicast primitives used as event plumbing between
//! views, stores and parents. [`Mailbox`] is the one `Send` piece: worker
//! threads push into it and the UI context drains it.

mod hub;
mod mailbox;
mod observer;
mod ops;
mod replay;
mod subject;
mod subscription;

pub use mailbox::{Mailbox, MailboxSender};
pub use observer::{BoxedObserver, Observer};
pub use ops::{DistinctUntilChanged, Filter, Map, Observable, ObservableExt};
pub use replay::{NoReplay, ReplayAll, ReplayLast, ReplayLastPerKey, ReplayPolicy};
pub use subject::{
    KeyedReplaySubject, PublishSubject, ReadOnly, ReplayOneSubject, ReplaySubject, Subject,
};
pub use subscription::{DisposeBag, Subscription};
