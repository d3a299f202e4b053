//! Timers for middleware that resolve their gate later.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::time::Duration;

/// Runs a task once `delay` has elapsed, on the caller's thread.
pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>);
}

/// Scheduler driven by hand, with a virtual clock.
///
/// Nothing runs until [`advance`](Self::advance) or
/// [`run_due`](Self::run_due) is called. Tasks due at the same instant run in
/// the order they were scheduled.
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<Duration>,
    seq: Cell<u64>,
    queue: RefCell<Vec<Scheduled>>,
}

struct Scheduled {
    due: Duration,
    seq: u64,
    task: Box<dyn FnOnce()>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on the virtual clock.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Number of tasks still waiting.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Move the clock forward and run everything that became due, including
    /// tasks scheduled by those tasks if they fall within the window.
    pub fn advance(&self, by: Duration) -> usize {
        self.now.set(self.now.get() + by);
        self.run_due()
    }

    /// Run every task due at the current time. Returns how many ran.
    pub fn run_due(&self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.pop_due() {
            task();
            ran += 1;
        }
        ran
    }

    fn pop_due(&self) -> Option<Box<dyn FnOnce()>> {
        let now = self.now.get();
        let mut queue = self.queue.borrow_mut();
        let index = queue
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due <= now)
            .min_by_key(|(_, s)| (s.due, s.seq))
            .map(|(i, _)| i)?;
        Some(queue.remove(index).task)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let seq = self.seq.get();
        self.seq.set(seq + 1);
        self.queue.borrow_mut().push(Scheduled {
            due: self.now.get() + delay,
            seq,
            task,
        });
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("now", &self.now.get())
            .field("pending", &self.pending())
            .finish()
    }
}

/// Scheduler backed by tokio timers.
///
/// Tasks are spawned with [`tokio::task::spawn_local`], so scheduling must
/// happen inside a [`tokio::task::LocalSet`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl TokioScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn runs_in_due_then_schedule_order() {
        let scheduler = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (delay, tag) in [(20, "late"), (10, "first"), (10, "second")] {
            let log = log.clone();
            scheduler.schedule(
                Duration::from_millis(delay),
                Box::new(move || log.borrow_mut().push(tag)),
            );
        }

        assert_eq!(scheduler.advance(Duration::from_millis(10)), 2);
        assert_eq!(*log.borrow(), vec!["first", "second"]);
        assert_eq!(scheduler.pending(), 1);

        scheduler.advance(Duration::from_millis(10));
        assert_eq!(*log.borrow(), vec!["first", "second", "late"]);
        assert_eq!(scheduler.now(), Duration::from_millis(20));
    }

    #[test]
    fn tasks_may_schedule_more_work() {
        let scheduler = Rc::new(ManualScheduler::new());
        let hits = Rc::new(Cell::new(0));
        let (s, h) = (scheduler.clone(), hits.clone());
        scheduler.schedule(
            Duration::ZERO,
            Box::new(move || {
                h.set(h.get() + 1);
                let h = h.clone();
                s.schedule(Duration::ZERO, Box::new(move || h.set(h.get() + 1)));
            }),
        );
        assert_eq!(scheduler.run_due(), 2);
        assert_eq!(hits.get(), 2);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn tokio_scheduler_fires_after_delay() {
        let local = tokio::task::LocalSet::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        local
            .run_until(async move {
                TokioScheduler::new()
                    .schedule(Duration::from_secs(1), Box::new(move || flag.set(true)));
                tokio::time::sleep(Duration::from_millis(500)).await;
                assert!(!fired.get());
                tokio::time::sleep(Duration::from_millis(600)).await;
                assert!(fired.get());
            })
            .await;
    }
}
