//! Scheduler-driven drain of an ordered result.
//!
//! One element per scheduled tick, completion on the tick after the last
//! element. Each tick schedules the next, so disposing the returned
//! handle between ticks stops the drain with no further notifications.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use rivulet_core::{Disposable, Observer, SerialDisposable};
use rivulet_sched::SharedScheduler;

struct ReplayState<T> {
    queue: RefCell<VecDeque<T>>,
    observer: RefCell<Box<dyn Observer<T>>>,
    tick: SerialDisposable,
    scheduler: SharedScheduler,
}

/// Deliver `items` one per tick, then complete.
pub fn replay<T: 'static>(
    items: Vec<T>,
    observer: Box<dyn Observer<T>>,
    scheduler: &SharedScheduler,
) -> Disposable {
    let state = Rc::new(ReplayState {
        queue: RefCell::new(VecDeque::from(items)),
        observer: RefCell::new(observer),
        tick: SerialDisposable::new(),
        scheduler: scheduler.clone(),
    });
    schedule_tick(&state);
    state.tick.to_disposable()
}

fn schedule_tick<T: 'static>(state: &Rc<ReplayState<T>>) {
    let s = state.clone();
    let handle = state.scheduler.schedule_now(Box::new(move || {
        let next = s.queue.borrow_mut().pop_front();
        match next {
            Some(value) => {
                s.observer.borrow_mut().on_next(value);
                schedule_tick(&s);
            }
            None => s.observer.borrow_mut().on_completed(),
        }
    }));
    state.tick.set(handle);
}
