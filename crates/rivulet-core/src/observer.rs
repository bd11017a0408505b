use crate::error::StreamError;
use crate::notification::Notification;

/// Consumer side of a subscription.
///
/// Invariants the caller must uphold:
/// - calls are serialized; no overlapping or reentrant delivery,
/// - nothing is delivered after `on_error` or `on_completed`.
pub trait Observer<T> {
    fn on_next(&mut self, value: T);
    fn on_error(&mut self, error: StreamError);
    fn on_completed(&mut self);

    fn on_notification(&mut self, notification: Notification<T>) {
        match notification {
            Notification::Next(value) => self.on_next(value),
            Notification::Error(error) => self.on_error(error),
            Notification::Completed => self.on_completed(),
        }
    }
}

/// Observer assembled from closures.
pub struct FnObserver<T> {
    next: Box<dyn FnMut(T)>,
    error: Box<dyn FnMut(StreamError)>,
    completed: Box<dyn FnMut()>,
}

impl<T> FnObserver<T> {
    pub fn new(
        next: impl FnMut(T) + 'static,
        error: impl FnMut(StreamError) + 'static,
        completed: impl FnMut() + 'static,
    ) -> Self {
        Self {
            next: Box::new(next),
            error: Box::new(error),
            completed: Box::new(completed),
        }
    }

    /// Observer that reacts to values only and ignores the terminal
    /// notification.
    pub fn on_values(next: impl FnMut(T) + 'static) -> Self {
        Self::new(next, |_| {}, || {})
    }
}

impl<T> Observer<T> for FnObserver<T> {
    fn on_next(&mut self, value: T) {
        (self.next)(value);
    }

    fn on_error(&mut self, error: StreamError) {
        (self.error)(error);
    }

    fn on_completed(&mut self) {
        (self.completed)();
    }
}
