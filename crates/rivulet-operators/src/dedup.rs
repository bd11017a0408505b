//! Duplicate suppression.

use std::rc::Rc;

use rivulet_core::{Disposable, Observable, Observer, SharedObservable, StreamError};

struct Dedup<T> {
    source: SharedObservable<T>,
}

struct DedupObserver<T> {
    last: Option<T>,
    downstream: Box<dyn Observer<T>>,
}

impl<T: Clone + PartialEq + 'static> Observer<T> for DedupObserver<T> {
    fn on_next(&mut self, value: T) {
        if self.last.as_ref() == Some(&value) {
            return;
        }
        self.last = Some(value.clone());
        self.downstream.on_next(value);
    }

    fn on_error(&mut self, error: StreamError) {
        self.last = None;
        self.downstream.on_error(error);
    }

    fn on_completed(&mut self) {
        self.last = None;
        self.downstream.on_completed();
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> for Dedup<T> {
    fn subscribe(&self, observer: Box<dyn Observer<T>>) -> Disposable {
        self.source.subscribe(Box::new(DedupObserver {
            last: None,
            downstream: observer,
        }))
    }
}

/// Forwards only elements that differ from their immediate predecessor.
pub fn distinct_until_changed<T: Clone + PartialEq + 'static>(
    source: &SharedObservable<T>,
) -> SharedObservable<T> {
    Rc::new(Dedup {
        source: source.clone(),
    })
}
