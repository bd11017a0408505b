//! First-wins switching over a stream of streams.
//!
//! The first inner stream is subscribed immediately. While an inner is
//! running, newly arriving inners overwrite a single pending slot (most
//! recent wins); when the running inner completes, the pending one takes
//! over. The output completes once the outer has completed and nothing is
//! running or pending. Inner and outer errors both tear the output down.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use rivulet_core::{
    Disposable, Observable, Observer, SerialDisposable, SharedObservable, StreamError,
};

struct SwitchState<T> {
    inner_running: bool,
    pending: Option<SharedObservable<T>>,
    outer_completed: bool,
    /// Bumped whenever an inner starts, so a synchronously completing
    /// inner cannot have its stale handle clobber its successor's.
    epoch: u64,
    inner_subscription: SerialDisposable,
    downstream: Option<Box<dyn Observer<T>>>,
}

struct SwitchFirst<T> {
    source: SharedObservable<SharedObservable<T>>,
}

fn subscribe_inner<T: 'static>(state: &Rc<RefCell<SwitchState<T>>>, inner: SharedObservable<T>) {
    let epoch = {
        let mut s = state.borrow_mut();
        s.epoch += 1;
        s.epoch
    };
    let observer = InnerObserver {
        state: state.clone(),
    };
    let handle = inner.subscribe(Box::new(observer));
    let still_current = {
        let s = state.borrow();
        s.inner_running && s.epoch == epoch
    };
    if still_current {
        state.borrow().inner_subscription.set(handle);
    } else {
        handle.dispose();
    }
}

struct InnerObserver<T> {
    state: Rc<RefCell<SwitchState<T>>>,
}

impl<T: 'static> Observer<T> for InnerObserver<T> {
    fn on_next(&mut self, value: T) {
        let mut state = self.state.borrow_mut();
        if let Some(downstream) = state.downstream.as_mut() {
            downstream.on_next(value);
        }
    }

    fn on_error(&mut self, error: StreamError) {
        let mut state = self.state.borrow_mut();
        state.pending = None;
        if let Some(mut downstream) = state.downstream.take() {
            downstream.on_error(error);
        }
    }

    fn on_completed(&mut self) {
        let next = {
            let mut state = self.state.borrow_mut();
            state.inner_running = false;
            state.inner_subscription.set(Disposable::empty());
            match state.pending.take() {
                Some(next) => {
                    state.inner_running = true;
                    Some(next)
                }
                None => {
                    if state.outer_completed {
                        if let Some(mut downstream) = state.downstream.take() {
                            downstream.on_completed();
                        }
                    }
                    None
                }
            }
        };
        if let Some(next) = next {
            debug!("switch_first: running inner completed, switching to pending");
            subscribe_inner(&self.state, next);
        }
    }
}

struct OuterObserver<T> {
    state: Rc<RefCell<SwitchState<T>>>,
}

impl<T: 'static> Observer<SharedObservable<T>> for OuterObserver<T> {
    fn on_next(&mut self, inner: SharedObservable<T>) {
        let start = {
            let mut state = self.state.borrow_mut();
            if state.downstream.is_none() {
                return;
            }
            if state.inner_running {
                // Keep exactly one pending inner; the most recent wins.
                state.pending = Some(inner);
                None
            } else {
                state.inner_running = true;
                Some(inner)
            }
        };
        if let Some(inner) = start {
            subscribe_inner(&self.state, inner);
        }
    }

    fn on_error(&mut self, error: StreamError) {
        let mut state = self.state.borrow_mut();
        state.pending = None;
        state.inner_subscription.dispose();
        if let Some(mut downstream) = state.downstream.take() {
            downstream.on_error(error);
        }
    }

    fn on_completed(&mut self) {
        let mut state = self.state.borrow_mut();
        state.outer_completed = true;
        if !state.inner_running {
            if let Some(mut downstream) = state.downstream.take() {
                downstream.on_completed();
            }
        }
    }
}

impl<T: 'static> Observable<T> for SwitchFirst<T> {
    fn subscribe(&self, observer: Box<dyn Observer<T>>) -> Disposable {
        let state = Rc::new(RefCell::new(SwitchState {
            inner_running: false,
            pending: None,
            outer_completed: false,
            epoch: 0,
            inner_subscription: SerialDisposable::new(),
            downstream: Some(observer),
        }));
        let outer = self.source.subscribe(Box::new(OuterObserver {
            state: state.clone(),
        }));
        Disposable::new(move || {
            let mut s = state.borrow_mut();
            s.downstream = None;
            s.pending = None;
            s.inner_subscription.dispose();
            drop(s);
            outer.dispose();
        })
    }
}

/// Switches to the first inner stream and queues at most one pending
/// successor while it runs.
pub fn switch_first<T: 'static>(
    source: &SharedObservable<SharedObservable<T>>,
) -> SharedObservable<T> {
    Rc::new(SwitchFirst {
        source: source.clone(),
    })
}
