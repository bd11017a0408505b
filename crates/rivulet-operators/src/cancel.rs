//! Cancellation tokens and the bridge into the stream world.
//!
//! A `CancelSource` fires at most once; its tokens run registered
//! callbacks immediately when already canceled. `take_until_canceled`
//! turns cancellation into a completion notification.

use std::cell::RefCell;
use std::rc::Rc;

use rivulet_core::{
    sources, Disposable, Observable, Observer, SharedObservable, StreamError,
};

struct CancelInner {
    canceled: bool,
    callbacks: Vec<Rc<RefCell<Option<Box<dyn FnOnce()>>>>>,
}

/// Owner side: create tokens, fire once.
pub struct CancelSource {
    inner: Rc<RefCell<CancelInner>>,
}

impl CancelSource {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(CancelInner {
                canceled: false,
                callbacks: Vec::new(),
            })),
        }
    }

    pub fn token(&self) -> CancelToken {
        CancelToken {
            inner: self.inner.clone(),
        }
    }

    /// Run all registered callbacks. Later calls are no-ops.
    pub fn cancel(&self) {
        let callbacks = {
            let mut inner = self.inner.borrow_mut();
            if inner.canceled {
                return;
            }
            inner.canceled = true;
            std::mem::take(&mut inner.callbacks)
        };
        for slot in callbacks {
            let callback = slot.borrow_mut().take();
            if let Some(callback) = callback {
                callback();
            }
        }
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side of a `CancelSource`.
#[derive(Clone)]
pub struct CancelToken {
    inner: Rc<RefCell<CancelInner>>,
}

impl CancelToken {
    pub fn is_canceled(&self) -> bool {
        self.inner.borrow().canceled
    }

    /// Register a callback; runs immediately if already canceled.
    /// Disposing the handle deregisters it.
    pub fn register(&self, callback: impl FnOnce() + 'static) -> Disposable {
        let already = self.inner.borrow().canceled;
        if already {
            callback();
            return Disposable::empty();
        }
        let slot: Rc<RefCell<Option<Box<dyn FnOnce()>>>> =
            Rc::new(RefCell::new(Some(Box::new(callback))));
        self.inner.borrow_mut().callbacks.push(slot.clone());
        Disposable::new(move || {
            slot.borrow_mut().take();
        })
    }
}

struct TakeUntilCanceled<T> {
    source: SharedObservable<T>,
    token: CancelToken,
}

struct GateObserver<T> {
    downstream: Rc<RefCell<Option<Box<dyn Observer<T>>>>>,
}

impl<T: 'static> Observer<T> for GateObserver<T> {
    fn on_next(&mut self, value: T) {
        if let Some(downstream) = self.downstream.borrow_mut().as_mut() {
            downstream.on_next(value);
        }
    }

    fn on_error(&mut self, error: StreamError) {
        if let Some(mut downstream) = self.downstream.borrow_mut().take() {
            downstream.on_error(error);
        }
    }

    fn on_completed(&mut self) {
        if let Some(mut downstream) = self.downstream.borrow_mut().take() {
            downstream.on_completed();
        }
    }
}

impl<T: 'static> Observable<T> for TakeUntilCanceled<T> {
    fn subscribe(&self, observer: Box<dyn Observer<T>>) -> Disposable {
        let downstream = Rc::new(RefCell::new(Some(observer)));
        let upstream = self.source.subscribe(Box::new(GateObserver {
            downstream: downstream.clone(),
        }));

        let gate = downstream.clone();
        let up = upstream.clone();
        let registration = self.token.register(move || {
            // Cancellation finishes the sequence with a completion.
            if let Some(mut downstream) = gate.borrow_mut().take() {
                downstream.on_completed();
            }
            up.dispose();
        });

        Disposable::new(move || {
            downstream.borrow_mut().take();
            registration.dispose();
            upstream.dispose();
        })
    }
}

/// Forwards the source until `token` fires, then completes. An already
/// canceled token yields an immediately completing sequence.
pub fn take_until_canceled<T: 'static>(
    source: &SharedObservable<T>,
    token: &CancelToken,
) -> SharedObservable<T> {
    if token.is_canceled() {
        return sources::empty();
    }
    Rc::new(TakeUntilCanceled {
        source: source.clone(),
        token: token.clone(),
    })
}
