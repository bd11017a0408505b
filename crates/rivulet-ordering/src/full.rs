//! Full ordering: buffer the entire sequence, stable-sort at completion.
//!
//! Projection is deferred to drain time; a multi-key stable sort needs
//! every element present before any comparison is meaningful. Errors
//! discard the buffer without emitting, so an errored source contributes
//! zero output elements.

use std::rc::Rc;

use tracing::{debug, trace};

use rivulet_core::{
    Disposable, EngineConfig, Observable, Observer, SerialDisposable, StreamError,
    SubscriptionId,
};
use rivulet_sched::SharedScheduler;

use crate::api::{OrderedObservable, SharedOrdered};
use crate::chain::{instantiate_chain, LevelSpec};
use crate::replay::replay;

/// `order_by` / `then_by` pipeline over a source sequence.
pub struct OrderedStream<T> {
    source: Rc<dyn Observable<T>>,
    levels: Vec<Rc<dyn LevelSpec<T>>>,
    scheduler: SharedScheduler,
    config: EngineConfig,
}

impl<T: 'static> OrderedStream<T> {
    pub fn new(
        source: Rc<dyn Observable<T>>,
        level: Rc<dyn LevelSpec<T>>,
        scheduler: SharedScheduler,
        config: EngineConfig,
    ) -> Rc<Self> {
        Rc::new(Self {
            source,
            levels: vec![level],
            scheduler,
            config,
        })
    }
}

impl<T: 'static> Observable<T> for OrderedStream<T> {
    fn subscribe(&self, observer: Box<dyn Observer<T>>) -> Disposable {
        let id = SubscriptionId::new();
        debug!(subscription = %id, levels = self.levels.len(), "order: subscribed");

        let upstream = SerialDisposable::new();
        let drain = SerialDisposable::new();
        let engine = BufferingObserver {
            values: Vec::with_capacity(self.config.buffer_capacity_hint),
            levels: self.levels.clone(),
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

impl<T: 'static> OrderedObservable<T> for OrderedStream<T> {
    fn refine(&self, level: Rc<dyn LevelSpec<T>>) -> SharedOrdered<T> {
        let mut levels = self.levels.clone();
        levels.push(level);
        Rc::new(Self {
            source: self.source.clone(),
            levels,
            scheduler: self.scheduler.clone(),
            config: self.config.clone(),
        })
    }
}

/// States: Buffering (downstream present, collecting values), Draining
/// (downstream handed to the replay), Terminated (downstream gone).
struct BufferingObserver<T> {
    values: Vec<T>,
    levels: Vec<Rc<dyn LevelSpec<T>>>,
    scheduler: SharedScheduler,
    upstream: SerialDisposable,
    drain: SerialDisposable,
    downstream: Option<Box<dyn Observer<T>>>,
    id: SubscriptionId,
    trace: bool,
}

impl<T: 'static> Observer<T> for BufferingObserver<T> {
    fn on_next(&mut self, value: T) {
        if self.downstream.is_none() {
            return;
        }
        if self.trace {
            trace!(subscription = %self.id, buffered = self.values.len() + 1, "order: buffered element");
        }
        self.values.push(value);
    }

    fn on_error(&mut self, error: StreamError) {
        let Some(mut downstream) = self.downstream.take() else {
            return;
        };
        self.values.clear();
        debug!(subscription = %self.id, %error, "order: source failed, buffer discarded");
        downstream.on_error(error);
        self.upstream.dispose();
    }

    fn on_completed(&mut self) {
        let Some(mut downstream) = self.downstream.take() else {
            return;
        };
        let values = std::mem::take(&mut self.values);
        debug!(subscription = %self.id, buffered = values.len(), "order: draining");

        let mut chain = instantiate_chain(&self.levels, values.len());
        if let Some(chain) = chain.as_mut() {
            for (slot, value) in values.iter().enumerate() {
                if let Err(error) = chain.evaluate(value, slot) {
                    downstream.on_error(error);
                    self.upstream.dispose();
                    return;
                }
            }
        }

        let mut permutation: Vec<usize> = (0..values.len()).collect();
        if let Some(chain) = chain.as_ref() {
            // Stable sort: slots tied on the whole chain keep arrival order.
            permutation.sort_by(|&a, &b| chain.compare(a, b));
        }

        let mut slots: Vec<Option<T>> = values.into_iter().map(Some).collect();
        let ordered: Vec<T> = permutation
            .into_iter()
            .filter_map(|slot| slots[slot].take())
            .collect();

        // The source is done; release it before the replay starts.
        self.upstream.dispose();
        self.drain.set(replay(ordered, downstream, &self.scheduler));
    }
}
