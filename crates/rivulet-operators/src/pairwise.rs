//! Pairs each element with its predecessor.

use std::rc::Rc;

use rivulet_core::{Disposable, Observable, Observer, SharedObservable, StreamError};

struct Pairwise<T> {
    source: SharedObservable<T>,
}

struct PairwiseObserver<T> {
    previous: Option<T>,
    downstream: Box<dyn Observer<(T, T)>>,
}

impl<T: Clone + 'static> Observer<T> for PairwiseObserver<T> {
    fn on_next(&mut self, value: T) {
        if let Some(previous) = self.previous.replace(value.clone()) {
            self.downstream.on_next((previous, value));
        }
    }

    fn on_error(&mut self, error: StreamError) {
        self.previous = None;
        self.downstream.on_error(error);
    }

    fn on_completed(&mut self) {
        self.previous = None;
        self.downstream.on_completed();
    }
}

impl<T: Clone + 'static> Observable<(T, T)> for Pairwise<T> {
    fn subscribe(&self, observer: Box<dyn Observer<(T, T)>>) -> Disposable {
        self.source.subscribe(Box::new(PairwiseObserver {
            previous: None,
            downstream: observer,
        }))
    }
}

/// Emits `(previous, current)` for every element after the first. A
/// single-element sequence completes without emitting.
pub fn pairwise<T: Clone + 'static>(source: &SharedObservable<T>) -> SharedObservable<(T, T)> {
    Rc::new(Pairwise {
        source: source.clone(),
    })
}
