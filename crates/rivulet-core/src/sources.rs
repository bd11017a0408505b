//! Primitive sources: in-memory stand-ins used by tests and compositions.
//!
//! All of these deliver synchronously on the subscribing call stack.
//! Time-scripted sources live in `rivulet-sched::testing`.

use std::marker::PhantomData;
use std::rc::Rc;

use crate::disposable::Disposable;
use crate::error::StreamError;
use crate::observable::{Observable, SharedObservable};
use crate::observer::Observer;

struct FromVec<T> {
    values: Vec<T>,
}

impl<T: Clone + 'static> Observable<T> for FromVec<T> {
    fn subscribe(&self, mut observer: Box<dyn Observer<T>>) -> Disposable {
        for value in &self.values {
            observer.on_next(value.clone());
        }
        observer.on_completed();
        Disposable::empty()
    }
}

/// Emits each value in order, then completes.
pub fn from_vec<T: Clone + 'static>(values: Vec<T>) -> SharedObservable<T> {
    Rc::new(FromVec { values })
}

struct Empty<T> {
    _marker: PhantomData<T>,
}

impl<T: 'static> Observable<T> for Empty<T> {
    fn subscribe(&self, mut observer: Box<dyn Observer<T>>) -> Disposable {
        observer.on_completed();
        Disposable::empty()
    }
}

/// Completes immediately without emitting.
pub fn empty<T: 'static>() -> SharedObservable<T> {
    Rc::new(Empty {
        _marker: PhantomData,
    })
}

struct Never<T> {
    _marker: PhantomData<T>,
}

impl<T: 'static> Observable<T> for Never<T> {
    fn subscribe(&self, _observer: Box<dyn Observer<T>>) -> Disposable {
        Disposable::empty()
    }
}

/// Emits nothing and never terminates.
pub fn never<T: 'static>() -> SharedObservable<T> {
    Rc::new(Never {
        _marker: PhantomData,
    })
}

struct Throw<T> {
    error: StreamError,
    _marker: PhantomData<T>,
}

impl<T: 'static> Observable<T> for Throw<T> {
    fn subscribe(&self, mut observer: Box<dyn Observer<T>>) -> Disposable {
        observer.on_error(self.error.clone());
        Disposable::empty()
    }
}

/// Fails immediately with the given error.
pub fn throw<T: 'static>(error: StreamError) -> SharedObservable<T> {
    Rc::new(Throw {
        error,
        _marker: PhantomData,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::FnObserver;
    use std::cell::RefCell;

    #[test]
    fn from_vec_replays_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let completed = Rc::new(RefCell::new(false));

        let s = seen.clone();
        let c = completed.clone();
        from_vec(vec![3, 1, 2]).subscribe(Box::new(FnObserver::new(
            move |v| s.borrow_mut().push(v),
            |_| {},
            move || *c.borrow_mut() = true,
        )));

        assert_eq!(*seen.borrow(), vec![3, 1, 2]);
        assert!(*completed.borrow());
    }

    #[test]
    fn throw_forwards_the_error() {
        let seen = Rc::new(RefCell::new(None));

        let s = seen.clone();
        throw::<i32>(StreamError::source("boom")).subscribe(Box::new(FnObserver::new(
            |_| {},
            move |e| *s.borrow_mut() = Some(e),
            || {},
        )));

        assert_eq!(*seen.borrow(), Some(StreamError::source("boom")));
    }
}
