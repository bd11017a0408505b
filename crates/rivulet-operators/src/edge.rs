//! Edge-delay debouncing over boolean streams.
//!
//! `delay_on` postpones the false→true transition by a number of ticks;
//! switching back to false happens immediately and cancels a pending
//! transition. `delay_off` is the mirror image. Both suppress duplicate
//! states on input and output. Modeled after the TON/TOF functions of
//! PLC runtimes.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use rivulet_core::{
    Disposable, Observable, Observer, SerialDisposable, SharedObservable, StreamError,
};
use rivulet_sched::SharedScheduler;

use crate::dedup::distinct_until_changed;

struct EdgeState {
    last_input: Option<bool>,
    last_output: Option<bool>,
    pending: bool,
    completed: bool,
    timer: SerialDisposable,
    downstream: Option<Box<dyn Observer<bool>>>,
}

impl EdgeState {
    fn emit(&mut self, value: bool) {
        if self.last_output == Some(value) {
            return;
        }
        self.last_output = Some(value);
        if let Some(downstream) = self.downstream.as_mut() {
            downstream.on_next(value);
        }
    }
}

struct EdgeDelay {
    source: SharedObservable<bool>,
    ticks: u64,
    scheduler: SharedScheduler,
    /// The state whose arrival is postponed: `true` for TON, `false` for TOF.
    delayed: bool,
}

struct EdgeObserver {
    state: Rc<RefCell<EdgeState>>,
    ticks: u64,
    scheduler: SharedScheduler,
    delayed: bool,
}

impl Observer<bool> for EdgeObserver {
    fn on_next(&mut self, value: bool) {
        {
            let mut state = self.state.borrow_mut();
            if state.downstream.is_none() || state.last_input == Some(value) {
                return;
            }
            state.last_input = Some(value);

            if value != self.delayed {
                // The immediate edge cancels a pending transition.
                state.pending = false;
                state.timer.set(Disposable::empty());
                state.emit(value);
                return;
            }
            state.pending = true;
        }

        trace!(ticks = self.ticks, delayed = self.delayed, "edge: transition armed");
        let armed = self.state.clone();
        let handle = self.scheduler.schedule_after(
            self.ticks,
            Box::new(move || {
                let mut state = armed.borrow_mut();
                state.pending = false;
                state.emit(value);
                if state.completed {
                    if let Some(mut downstream) = state.downstream.take() {
                        downstream.on_completed();
                    }
                }
            }),
        );
        self.state.borrow().timer.set(handle);
    }

    fn on_error(&mut self, error: StreamError) {
        let mut state = self.state.borrow_mut();
        let Some(mut downstream) = state.downstream.take() else {
            return;
        };
        state.timer.dispose();
        downstream.on_error(error);
    }

    fn on_completed(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.downstream.is_none() {
            return;
        }
        if state.pending {
            // A transition is still in flight; completion follows it.
            state.completed = true;
            return;
        }
        if let Some(mut downstream) = state.downstream.take() {
            downstream.on_completed();
        }
    }
}

impl Observable<bool> for EdgeDelay {
    fn subscribe(&self, observer: Box<dyn Observer<bool>>) -> Disposable {
        let state = Rc::new(RefCell::new(EdgeState {
            last_input: None,
            last_output: None,
            pending: false,
            completed: false,
            timer: SerialDisposable::new(),
            downstream: Some(observer),
        }));
        let upstream = self.source.subscribe(Box::new(EdgeObserver {
            state: state.clone(),
            ticks: self.ticks,
            scheduler: self.scheduler.clone(),
            delayed: self.delayed,
        }));
        Disposable::new(move || {
            let mut s = state.borrow_mut();
            s.downstream = None;
            s.timer.dispose();
            drop(s);
            upstream.dispose();
        })
    }
}

fn edge_delay(
    source: &SharedObservable<bool>,
    ticks: u64,
    scheduler: SharedScheduler,
    delayed: bool,
) -> SharedObservable<bool> {
    if ticks == 0 {
        return distinct_until_changed(source);
    }
    Rc::new(EdgeDelay {
        source: source.clone(),
        ticks,
        scheduler,
        delayed,
    })
}

/// Delays the false→true transition by `ticks`; true→false passes
/// immediately and cancels a pending transition.
pub fn delay_on(
    source: &SharedObservable<bool>,
    ticks: u64,
    scheduler: SharedScheduler,
) -> SharedObservable<bool> {
    edge_delay(source, ticks, scheduler, true)
}

/// Delays the true→false transition by `ticks`; false→true passes
/// immediately and cancels a pending transition.
pub fn delay_off(
    source: &SharedObservable<bool>,
    ticks: u64,
    scheduler: SharedScheduler,
) -> SharedObservable<bool> {
    edge_delay(source, ticks, scheduler, false)
}
