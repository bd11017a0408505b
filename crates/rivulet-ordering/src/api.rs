//! Combinator surface: `order_by`, `largest_by`, `smallest_by`, and their
//! `then_by` refinements.
//!
//! Every refinement appends one level to the pipeline's level list; the
//! source is subscribed once per downstream subscription, never per
//! level. Variants: bare (natural order, synchronous replay), `_on`
//! (explicit scheduler), `_with` (explicit comparator and scheduler),
//! resolved at configuration time.

use std::cmp::Ordering;
use std::rc::Rc;

use rivulet_core::{EngineConfig, Observable, SharedObservable};
use rivulet_sched::{ImmediateScheduler, SharedScheduler};

use crate::capped::CappedStream;
use crate::chain::{KeyLevel, LevelSpec};
use crate::full::OrderedStream;

/// An ordered sequence that can take further `then_by` refinements
/// without re-subscribing the source.
pub trait OrderedObservable<T>: Observable<T> {
    fn refine(&self, level: Rc<dyn LevelSpec<T>>) -> SharedOrdered<T>;
}

pub type SharedOrdered<T> = Rc<dyn OrderedObservable<T>>;

/// Ordering entry points over any shared observable.
pub trait OrderingExt<T> {
    /// Stable full sort, ascending by the selected key; replays
    /// synchronously on completion.
    fn order_by<K: Ord + 'static>(&self, selector: impl Fn(&T) -> K + 'static)
        -> SharedOrdered<T>;

    fn order_by_descending<K: Ord + 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
    ) -> SharedOrdered<T>;

    fn order_by_on<K: Ord + 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
        scheduler: SharedScheduler,
    ) -> SharedOrdered<T>;

    fn order_by_descending_on<K: Ord + 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
        scheduler: SharedScheduler,
    ) -> SharedOrdered<T>;

    fn order_by_with<K: 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
        comparer: impl Fn(&K, &K) -> Ordering + 'static,
        scheduler: SharedScheduler,
    ) -> SharedOrdered<T>;

    fn order_by_descending_with<K: 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
        comparer: impl Fn(&K, &K) -> Ordering + 'static,
        scheduler: SharedScheduler,
    ) -> SharedOrdered<T>;

    /// The `count` largest elements by the selected key, drained in
    /// ascending order.
    fn largest_by<K: Ord + 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
        count: usize,
    ) -> SharedOrdered<T>;

    fn largest_by_on<K: Ord + 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
        count: usize,
        scheduler: SharedScheduler,
    ) -> SharedOrdered<T>;

    fn largest_by_with<K: 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
        count: usize,
        comparer: impl Fn(&K, &K) -> Ordering + 'static,
        scheduler: SharedScheduler,
    ) -> SharedOrdered<T>;

    /// The `count` smallest elements by the selected key, drained in
    /// descending order.
    fn smallest_by<K: Ord + 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
        count: usize,
    ) -> SharedOrdered<T>;

    fn smallest_by_on<K: Ord + 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
        count: usize,
        scheduler: SharedScheduler,
    ) -> SharedOrdered<T>;

    fn smallest_by_with<K: 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
        count: usize,
        comparer: impl Fn(&K, &K) -> Ordering + 'static,
        scheduler: SharedScheduler,
    ) -> SharedOrdered<T>;
}

impl<T: 'static> OrderingExt<T> for SharedObservable<T> {
    fn order_by<K: Ord + 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
    ) -> SharedOrdered<T> {
        self.order_by_on(selector, ImmediateScheduler::shared())
    }

    fn order_by_descending<K: Ord + 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
    ) -> SharedOrdered<T> {
        self.order_by_descending_on(selector, ImmediateScheduler::shared())
    }

    fn order_by_on<K: Ord + 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
        scheduler: SharedScheduler,
    ) -> SharedOrdered<T> {
        OrderedStream::new(
            self.clone(),
            KeyLevel::natural(selector, false),
            scheduler,
            EngineConfig::default(),
        )
    }

    fn order_by_descending_on<K: Ord + 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
        scheduler: SharedScheduler,
    ) -> SharedOrdered<T> {
        OrderedStream::new(
            self.clone(),
            KeyLevel::natural(selector, true),
            scheduler,
            EngineConfig::default(),
        )
    }

    fn order_by_with<K: 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
        comparer: impl Fn(&K, &K) -> Ordering + 'static,
        scheduler: SharedScheduler,
    ) -> SharedOrdered<T> {
        OrderedStream::new(
            self.clone(),
            KeyLevel::with_comparer(selector, comparer, false),
            scheduler,
            EngineConfig::default(),
        )
    }

    fn order_by_descending_with<K: 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
        comparer: impl Fn(&K, &K) -> Ordering + 'static,
        scheduler: SharedScheduler,
    ) -> SharedOrdered<T> {
        OrderedStream::new(
            self.clone(),
            KeyLevel::with_comparer(selector, comparer, true),
            scheduler,
            EngineConfig::default(),
        )
    }

    fn largest_by<K: Ord + 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
        count: usize,
    ) -> SharedOrdered<T> {
        self.largest_by_on(selector, count, ImmediateScheduler::shared())
    }

    fn largest_by_on<K: Ord + 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
        count: usize,
        scheduler: SharedScheduler,
    ) -> SharedOrdered<T> {
        CappedStream::new(
            self.clone(),
            KeyLevel::natural(selector, false),
            count,
            scheduler,
            EngineConfig::default(),
        )
    }

    fn largest_by_with<K: 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
        count: usize,
        comparer: impl Fn(&K, &K) -> Ordering + 'static,
        scheduler: SharedScheduler,
    ) -> SharedOrdered<T> {
        CappedStream::new(
            self.clone(),
            KeyLevel::with_comparer(selector, comparer, false),
            count,
            scheduler,
            EngineConfig::default(),
        )
    }

    fn smallest_by<K: Ord + 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
        count: usize,
    ) -> SharedOrdered<T> {
        self.smallest_by_on(selector, count, ImmediateScheduler::shared())
    }

    fn smallest_by_on<K: Ord + 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
        count: usize,
        scheduler: SharedScheduler,
    ) -> SharedOrdered<T> {
        // Same engine as largest_by with the direction inverted: the heap
        // minimum becomes the largest retained element.
        CappedStream::new(
            self.clone(),
            KeyLevel::natural(selector, true),
            count,
            scheduler,
            EngineConfig::default(),
        )
    }

    fn smallest_by_with<K: 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
        count: usize,
        comparer: impl Fn(&K, &K) -> Ordering + 'static,
        scheduler: SharedScheduler,
    ) -> SharedOrdered<T> {
        CappedStream::new(
            self.clone(),
            KeyLevel::with_comparer(selector, comparer, true),
            count,
            scheduler,
            EngineConfig::default(),
        )
    }
}

/// Refinements over an already-ordered sequence.
pub trait OrderedExt<T> {
    /// View as a plain observable, e.g. to feed a non-ordering operator.
    fn observable(&self) -> SharedObservable<T>;

    fn then_by<K: Ord + 'static>(&self, selector: impl Fn(&T) -> K + 'static)
        -> SharedOrdered<T>;

    fn then_by_descending<K: Ord + 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
    ) -> SharedOrdered<T>;

    fn then_by_with<K: 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
        comparer: impl Fn(&K, &K) -> Ordering + 'static,
    ) -> SharedOrdered<T>;

    fn then_by_descending_with<K: 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
        comparer: impl Fn(&K, &K) -> Ordering + 'static,
    ) -> SharedOrdered<T>;
}

struct PlainView<T> {
    ordered: SharedOrdered<T>,
}

impl<T> Observable<T> for PlainView<T> {
    fn subscribe(
        &self,
        observer: Box<dyn rivulet_core::Observer<T>>,
    ) -> rivulet_core::Disposable {
        self.ordered.subscribe(observer)
    }
}

impl<T: 'static> OrderedExt<T> for SharedOrdered<T> {
    fn observable(&self) -> SharedObservable<T> {
        Rc::new(PlainView {
            ordered: self.clone(),
        })
    }

    fn then_by<K: Ord + 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
    ) -> SharedOrdered<T> {
        self.refine(KeyLevel::natural(selector, false))
    }

    fn then_by_descending<K: Ord + 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
    ) -> SharedOrdered<T> {
        self.refine(KeyLevel::natural(selector, true))
    }

    fn then_by_with<K: 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
        comparer: impl Fn(&K, &K) -> Ordering + 'static,
    ) -> SharedOrdered<T> {
        self.refine(KeyLevel::with_comparer(selector, comparer, false))
    }

    fn then_by_descending_with<K: 'static>(
        &self,
        selector: impl Fn(&T) -> K + 'static,
        comparer: impl Fn(&K, &K) -> Ordering + 'static,
    ) -> SharedOrdered<T> {
        self.refine(KeyLevel::with_comparer(selector, comparer, true))
    }
}
