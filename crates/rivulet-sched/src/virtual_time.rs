//! Deterministic virtual-time scheduler.
//!
//! Work is ordered by due tick, ties broken by scheduling order. The
//! clock only moves when `advance_to`/`run` executes queued work, which
//! makes every schedule observable and reproducible in tests.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;

use tracing::trace;

use rivulet_core::Disposable;

use crate::scheduler::{Scheduler, SharedScheduler};

type ActionSlot = Rc<RefCell<Option<Box<dyn FnOnce()>>>>;

struct Entry {
    due: u64,
    seq: u64,
    slot: ActionSlot,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed so the max-oriented BinaryHeap pops the earliest entry.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.due, other.seq).cmp(&(self.due, self.seq))
    }
}

struct Inner {
    clock: u64,
    next_seq: u64,
    queue: BinaryHeap<Entry>,
}

/// Virtual-time scheduler. Clones share one clock and queue.
#[derive(Clone)]
pub struct VirtualScheduler {
    inner: Rc<RefCell<Inner>>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                clock: 0,
                next_seq: 0,
                queue: BinaryHeap::new(),
            })),
        }
    }

    pub fn shared(&self) -> SharedScheduler {
        Rc::new(self.clone())
    }

    /// Schedule at an absolute tick. A due tick in the past runs at the
    /// current clock, after work already queued for it.
    pub fn schedule_at(&self, due: u64, action: Box<dyn FnOnce()>) -> Disposable {
        let slot: ActionSlot = Rc::new(RefCell::new(Some(action)));
        {
            let mut inner = self.inner.borrow_mut();
            let due = due.max(inner.clock);
            let seq = inner.next_seq;
            inner.next_seq += 1;
            inner.queue.push(Entry {
                due,
                seq,
                slot: slot.clone(),
            });
        }
        Disposable::new(move || {
            slot.borrow_mut().take();
        })
    }

    /// Execute queued work due at or before `target`, then park the clock
    /// at `target`.
    pub fn advance_to(&self, target: u64) {
        loop {
            let entry = {
                let mut inner = self.inner.borrow_mut();
                match inner.queue.peek() {
                    Some(e) if e.due <= target => inner.queue.pop(),
                    _ => None,
                }
            };
            let Some(entry) = entry else { break };
            {
                let mut inner = self.inner.borrow_mut();
                inner.clock = inner.clock.max(entry.due);
            }
            let action = entry.slot.borrow_mut().take();
            if let Some(action) = action {
                trace!(tick = entry.due, "virtual: executing");
                action();
            }
        }
        let mut inner = self.inner.borrow_mut();
        inner.clock = inner.clock.max(target);
    }

    /// Execute all queued work, including work queued while running.
    pub fn run(&self) {
        loop {
            let entry = {
                let mut inner = self.inner.borrow_mut();
                inner.queue.pop()
            };
            let Some(entry) = entry else { break };
            {
                let mut inner = self.inner.borrow_mut();
                inner.clock = inner.clock.max(entry.due);
            }
            let action = entry.slot.borrow_mut().take();
            if let Some(action) = action {
                trace!(tick = entry.due, "virtual: executing");
                action();
            }
        }
    }
}

impl Default for VirtualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for VirtualScheduler {
    // One tick past the clock, so consecutive schedule-now calls from a
    // replay land on consecutive ticks.
    fn schedule_now(&self, action: Box<dyn FnOnce()>) -> Disposable {
        let due = self.inner.borrow().clock + 1;
        self.schedule_at(due, action)
    }

    fn schedule_after(&self, ticks: u64, action: Box<dyn FnOnce()>) -> Disposable {
        let due = self.inner.borrow().clock + ticks;
        self.schedule_at(due, action)
    }

    fn now(&self) -> u64 {
        self.inner.borrow().clock
    }
}
