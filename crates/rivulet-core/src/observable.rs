use std::rc::Rc;

use crate::disposable::Disposable;
use crate::observer::Observer;

/// Producer side of the contract.
///
/// `subscribe` wires an observer to this sequence and returns the handle
/// that cancels the subscription. Each subscription owns independent
/// state; subscribing twice to a cold source replays it twice.
pub trait Observable<T> {
    fn subscribe(&self, observer: Box<dyn Observer<T>>) -> Disposable;
}

/// Shared handle operators use to store and re-subscribe sources.
pub type SharedObservable<T> = Rc<dyn Observable<T>>;
