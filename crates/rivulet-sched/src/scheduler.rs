//! Scheduler contract and the synchronous default.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use rivulet_core::Disposable;

type ActionSlot = Rc<RefCell<Option<Box<dyn FnOnce()>>>>;

/// Decides when a unit of work runs.
///
/// Disposing the returned handle cancels an action that has not run yet;
/// actions already executed are unaffected. Time is measured in abstract
/// ticks whose meaning is scheduler-specific.
pub trait Scheduler {
    fn schedule_now(&self, action: Box<dyn FnOnce()>) -> Disposable;

    fn schedule_after(&self, ticks: u64, action: Box<dyn FnOnce()>) -> Disposable;

    /// Current position on this scheduler's clock.
    fn now(&self) -> u64;
}

pub type SharedScheduler = Rc<dyn Scheduler>;

/// Synchronous scheduler: actions run on the caller's stack in FIFO order.
///
/// A trampoline queue flattens recursive scheduling, so replaying a large
/// drained sequence does not recurse. `schedule_after` ignores the delay;
/// virtual delays need a time-aware scheduler.
///
/// This is the default replay scheduler of the ordering operators.
#[derive(Default)]
pub struct ImmediateScheduler {
    queue: RefCell<VecDeque<ActionSlot>>,
    draining: Cell<bool>,
}

impl ImmediateScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedScheduler {
        Rc::new(Self::new())
    }

    fn enqueue(&self, action: Box<dyn FnOnce()>) -> Disposable {
        let slot: ActionSlot = Rc::new(RefCell::new(Some(action)));
        self.queue.borrow_mut().push_back(slot.clone());

        if !self.draining.get() {
            self.draining.set(true);
            loop {
                let next = self.queue.borrow_mut().pop_front();
                let Some(next) = next else { break };
                let action = next.borrow_mut().take();
                if let Some(action) = action {
                    action();
                }
            }
            self.draining.set(false);
        }

        let cancel = slot;
        Disposable::new(move || {
            cancel.borrow_mut().take();
        })
    }
}

impl Scheduler for ImmediateScheduler {
    fn schedule_now(&self, action: Box<dyn FnOnce()>) -> Disposable {
        self.enqueue(action)
    }

    fn schedule_after(&self, _ticks: u64, action: Box<dyn FnOnce()>) -> Disposable {
        self.enqueue(action)
    }

    fn now(&self) -> u64 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trampoline_flattens_recursive_scheduling() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let sched = Rc::new(ImmediateScheduler::new());

        let o = order.clone();
        let s = sched.clone();
        sched.schedule_now(Box::new(move || {
            o.borrow_mut().push(1);
            let o2 = o.clone();
            s.schedule_now(Box::new(move || o2.borrow_mut().push(3)));
            o.borrow_mut().push(2);
        }));

        assert_eq!(*order.borrow(), vec![1, 2, 3]);
    }
}
