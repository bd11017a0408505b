//! Bounded top-K retention.
//!
//! At most `count` elements stay resident, tracked by an index heap whose
//! minimum is the current worst retained element. A new candidate is
//! evaluated into the scratch slot (index `count`); if it beats the worst
//! resident, that resident is evicted and the candidate takes over its
//! slot with a fresh heap sequence number. Draining pops worst-first,
//! which yields ascending order for `largest_by` and descending for
//! `smallest_by` (the chain carries the inverted direction).

use std::cmp::Ordering;
use std::rc::Rc;

use tracing::{debug, trace};

use rivulet_core::{
    Disposable, EngineConfig, Observable, Observer, SerialDisposable, StreamError,
    SubscriptionId,
};
use rivulet_sched::SharedScheduler;

use crate::api::{OrderedObservable, SharedOrdered};
use crate::chain::{compare_slots, instantiate_chain, LevelSpec, SlotComparer};
use crate::heap::IndexedHeap;
use crate::replay::replay;

/// `largest_by` / `smallest_by` pipeline over a source sequence.
pub struct CappedStream<T> {
    source: Rc<dyn Observable<T>>,
    levels: Vec<Rc<dyn LevelSpec<T>>>,
    count: usize,
    scheduler: SharedScheduler,
    config: EngineConfig,
}

impl<T: 'static> CappedStream<T> {
    pub fn new(
        source: Rc<dyn Observable<T>>,
        level: Rc<dyn LevelSpec<T>>,
        count: usize,
        scheduler: SharedScheduler,
        config: EngineConfig,
    ) -> Rc<Self> {
        Rc::new(Self {
            source,
            levels: vec![level],
            count,
            scheduler,
            config,
        })
    }
}

impl<T: 'static> Observable<T> for CappedStream<T> {
    fn subscribe(&self, observer: Box<dyn Observer<T>>) -> Disposable {
        let id = SubscriptionId::new();
        debug!(
            subscription = %id,
            levels = self.levels.len(),
            count = self.count,
            "capped: subscribed"
        );

        let upstream = SerialDisposable::new();
        let drain = SerialDisposable::new();
        let mut values = Vec::new();
        values.resize_with(self.count, || None);
        let engine = CappedObserver {
            // One extra slot: index `count` is scratch for the candidate.
            chain: instantiate_chain(&self.levels, self.count + 1),
            heap: IndexedHeap::with_capacity(self.count + 1),
            values,
            count: self.count,
            scheduler: self.scheduler.clone(),
            upstream: upstream.clone(),
            drain: drain.clone(),
            downstream: Some(observer),
            id,
            trace: self.config.trace_notifications,
        };
        // A synchronously completing source disposes `upstream` before
        // this assignment; the serial then discards the handle on entry.
        upstream.set(self.source.subscribe(Box::new(engine)));
        Disposable::composite(vec![upstream.to_disposable(), drain.to_disposable()])
    }
}

impl<T: 'static> OrderedObservable<T> for CappedStream<T> {
    fn refine(&self, level: Rc<dyn LevelSpec<T>>) -> SharedOrdered<T> {
        let mut levels = self.levels.clone();
        levels.push(level);
        Rc::new(Self {
            source: self.source.clone(),
            levels,
            count: self.count,
            scheduler: self.scheduler.clone(),
            config: self.config.clone(),
        })
    }
}

/// States: Collecting (downstream present), Draining (downstream handed
/// to the replay), Terminated (downstream gone).
struct CappedObserver<T> {
    chain: Option<Box<dyn SlotComparer<T>>>,
    heap: IndexedHeap,
    values: Vec<Option<T>>,
    count: usize,
    scheduler: SharedScheduler,
    upstream: SerialDisposable,
    drain: SerialDisposable,
    downstream: Option<Box<dyn Observer<T>>>,
    id: SubscriptionId,
    trace: bool,
}

impl<T: 'static> CappedObserver<T> {
    fn fail(&mut self, error: StreamError) {
        let Some(mut downstream) = self.downstream.take() else {
            return;
        };
        self.discard();
        debug!(subscription = %self.id, %error, "capped: failed, retained set discarded");
        downstream.on_error(error);
        self.upstream.dispose();
    }

    fn discard(&mut self) {
        self.values.clear();
        self.heap = IndexedHeap::new();
        self.chain = None;
    }

    fn admit(&mut self, value: T) -> Result<(), StreamError> {
        let retained = self.heap.len();

        if retained < self.count {
            if let Some(chain) = self.chain.as_mut() {
                chain.evaluate(&value, retained)?;
            }
            self.values[retained] = Some(value);
            let chain = &self.chain;
            self.heap.push(retained, |a, b| compare_slots(chain, a, b));
            return Ok(());
        }

        // At capacity: evaluate into the scratch slot and challenge the
        // current worst resident.
        let scratch = self.count;
        if let Some(chain) = self.chain.as_mut() {
            chain.evaluate(&value, scratch)?;
        }
        let Some(worst) = self.heap.peek() else {
            return Ok(());
        };

        if compare_slots(&self.chain, worst, scratch) == Ordering::Less {
            let chain = &self.chain;
            let evicted = self.heap.pop(|a, b| compare_slots(chain, a, b));
            if let Some(slot) = evicted {
                if let Some(chain) = self.chain.as_mut() {
                    chain.move_slot(scratch, slot);
                }
                self.values[slot] = Some(value);
                // Fresh sequence number: the replacement counts as newly
                // arrived for future exact-tie eviction.
                let chain = &self.chain;
                self.heap.push(slot, |a, b| compare_slots(chain, a, b));
                if self.trace {
                    trace!(subscription = %self.id, slot, "capped: evicted and replaced");
                }
            }
        } else if let Some(chain) = self.chain.as_mut() {
            chain.remove(scratch);
        }
        Ok(())
    }
}

impl<T: 'static> Observer<T> for CappedObserver<T> {
    fn on_next(&mut self, value: T) {
        if self.downstream.is_none() {
            return;
        }
        // Zero capacity retains nothing and completes empty.
        if self.count == 0 {
            return;
        }
        if let Err(error) = self.admit(value) {
            self.fail(error);
        }
    }

    fn on_error(&mut self, error: StreamError) {
        self.fail(error);
    }

    fn on_completed(&mut self) {
        let Some(downstream) = self.downstream.take() else {
            return;
        };

        let mut drained = Vec::with_capacity(self.heap.len());
        loop {
            let popped = {
                let chain = &self.chain;
                self.heap.pop(|a, b| compare_slots(chain, a, b))
            };
            let Some(slot) = popped else { break };
            if let Some(value) = self.values.get_mut(slot).and_then(Option::take) {
                drained.push(value);
            }
        }
        debug!(subscription = %self.id, drained = drained.len(), "capped: draining");
        self.values.clear();

        // The source is done; release it before the replay starts.
        self.upstream.dispose();
        self.drain.set(replay(drained, downstream, &self.scheduler));
    }
}
