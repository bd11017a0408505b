//! Cancellation handles for subscriptions and scheduled work.
//!
//! Single-threaded by design: handles are `Rc`-shared and may be disposed
//! from inside a notification callback.

use std::cell::RefCell;
use std::rc::Rc;

type Action = Box<dyn FnOnce()>;

/// Idempotent cancellation handle. Cloning shares the underlying action;
/// the first `dispose` on any clone runs it, later calls are no-ops.
#[derive(Clone)]
pub struct Disposable {
    action: Rc<RefCell<Option<Action>>>,
}

impl Disposable {
    pub fn new(action: impl FnOnce() + 'static) -> Self {
        Self {
            action: Rc::new(RefCell::new(Some(Box::new(action)))),
        }
    }

    /// Handle with nothing to cancel.
    pub fn empty() -> Self {
        Self {
            action: Rc::new(RefCell::new(None)),
        }
    }

    /// Handle that disposes all parts in order.
    pub fn composite(parts: Vec<Disposable>) -> Self {
        Self::new(move || {
            for part in &parts {
                part.dispose();
            }
        })
    }

    pub fn dispose(&self) {
        // Take the action out before running it, so reentrant disposal
        // through the action itself finds the slot already empty.
        let action = self.action.borrow_mut().take();
        if let Some(action) = action {
            action();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.action.borrow().is_none()
    }
}

struct SerialState {
    disposed: bool,
    current: Option<Disposable>,
}

/// Holds at most one inner disposable. Assigning a new inner disposes the
/// previous one; disposing the serial disposes the current inner and every
/// inner assigned afterwards.
#[derive(Clone)]
pub struct SerialDisposable {
    state: Rc<RefCell<SerialState>>,
}

impl SerialDisposable {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(SerialState {
                disposed: false,
                current: None,
            })),
        }
    }

    pub fn set(&self, inner: Disposable) {
        let replaced = {
            let mut state = self.state.borrow_mut();
            if state.disposed {
                Some(inner)
            } else {
                state.current.replace(inner)
            }
        };
        if let Some(disposable) = replaced {
            disposable.dispose();
        }
    }

    pub fn dispose(&self) {
        let taken = {
            let mut state = self.state.borrow_mut();
            state.disposed = true;
            state.current.take()
        };
        if let Some(disposable) = taken {
            disposable.dispose();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    /// Plain handle that forwards to `dispose`.
    pub fn to_disposable(&self) -> Disposable {
        let this = self.clone();
        Disposable::new(move || this.dispose())
    }
}

impl Default for SerialDisposable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn dispose_runs_once() {
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let d = Disposable::new(move || h.set(h.get() + 1));
        let clone = d.clone();

        d.dispose();
        clone.dispose();

        assert_eq!(hits.get(), 1);
        assert!(d.is_disposed());
    }

    #[test]
    fn serial_replaces_and_disposes_previous() {
        let first = Rc::new(Cell::new(false));
        let second = Rc::new(Cell::new(false));

        let serial = SerialDisposable::new();
        let f = first.clone();
        serial.set(Disposable::new(move || f.set(true)));
        let s = second.clone();
        serial.set(Disposable::new(move || s.set(true)));

        assert!(first.get());
        assert!(!second.get());

        serial.dispose();
        assert!(second.get());
    }

    #[test]
    fn serial_disposes_future_assignments_once_disposed() {
        let hit = Rc::new(Cell::new(false));

        let serial = SerialDisposable::new();
        serial.dispose();

        let h = hit.clone();
        serial.set(Disposable::new(move || h.set(true)));
        assert!(hit.get());
    }
}
