//! Scripted sources and a recording harness for deterministic operator
//! tests.
//!
//! A `TestScheduler` drives a `VirtualScheduler`; hot and cold sources
//! replay scripted notifications at virtual ticks; a recording observer
//! stamps everything it sees with the virtual clock. The default run
//! creates the pipeline at 100, subscribes at 200, and disposes at 1000.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rivulet_core::{
    Disposable, Notification, Observable, Observer, SharedObservable, StreamError,
};

use crate::scheduler::{Scheduler, SharedScheduler};
use crate::virtual_time::VirtualScheduler;

pub const CREATE_AT: u64 = 100;
pub const SUBSCRIBE_AT: u64 = 200;
pub const DISPOSE_AT: u64 = 1000;

/// A notification stamped with the virtual tick it was observed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded<T> {
    pub time: u64,
    pub notification: Notification<T>,
}

pub fn on_next<T>(time: u64, value: T) -> Recorded<T> {
    Recorded {
        time,
        notification: Notification::Next(value),
    }
}

pub fn on_error<T>(time: u64, error: StreamError) -> Recorded<T> {
    Recorded {
        time,
        notification: Notification::Error(error),
    }
}

pub fn on_completed<T>(time: u64) -> Recorded<T> {
    Recorded {
        time,
        notification: Notification::Completed,
    }
}

/// Lifetime of one subscription to a scripted source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionLog {
    pub subscribed: u64,
    pub unsubscribed: Option<u64>,
}

/// Log entry for a subscription released at `unsubscribed`.
pub fn subscription(subscribed: u64, unsubscribed: u64) -> SubscriptionLog {
    SubscriptionLog {
        subscribed,
        unsubscribed: Some(unsubscribed),
    }
}

struct ObserverSlot<T> {
    active: Rc<Cell<bool>>,
    observer: Rc<RefCell<Box<dyn Observer<T>>>>,
}

struct ScriptedCore<T> {
    scheduler: VirtualScheduler,
    script: Vec<Recorded<T>>,
    hot: bool,
    observers: RefCell<Vec<ObserverSlot<T>>>,
    logs: RefCell<Vec<SubscriptionLog>>,
}

impl<T: Clone + 'static> ScriptedCore<T> {
    fn fire(&self, notification: &Notification<T>) {
        // Snapshot first; delivery may subscribe or dispose concurrently
        // registered observers.
        let targets: Vec<ObserverSlot<T>> = self
            .observers
            .borrow()
            .iter()
            .map(|slot| ObserverSlot {
                active: slot.active.clone(),
                observer: slot.observer.clone(),
            })
            .collect();
        for slot in targets {
            if slot.active.get() {
                slot.observer.borrow_mut().on_notification(notification.clone());
            }
        }
    }
}

/// Transparent newtype so the `Observable` impl attaches to a local
/// type; coherence forbids `impl Observable for Rc<ScriptedCore<T>>`
/// because `Rc` is a non-fundamental foreign type.
struct ScriptedObservable<T>(Rc<ScriptedCore<T>>);

impl<T: Clone + 'static> Observable<T> for ScriptedObservable<T> {
    fn subscribe(&self, observer: Box<dyn Observer<T>>) -> Disposable {
        let this = &self.0;
        let active = Rc::new(Cell::new(true));
        let observer = Rc::new(RefCell::new(observer));
        let log_index = {
            let mut logs = this.logs.borrow_mut();
            logs.push(SubscriptionLog {
                subscribed: this.scheduler.now(),
                unsubscribed: None,
            });
            logs.len() - 1
        };

        let mut scheduled = Vec::new();
        if this.hot {
            this.observers.borrow_mut().push(ObserverSlot {
                active: active.clone(),
                observer,
            });
        } else {
            // Cold: replay the script relative to this subscription.
            let base = this.scheduler.now();
            for recorded in &this.script {
                let notification = recorded.notification.clone();
                let target = observer.clone();
                let armed = active.clone();
                scheduled.push(this.scheduler.schedule_at(
                    base + recorded.time,
                    Box::new(move || {
                        if armed.get() {
                            target.borrow_mut().on_notification(notification);
                        }
                    }),
                ));
            }
        }

        let core = self.0.clone();
        Disposable::new(move || {
            active.set(false);
            for handle in &scheduled {
                handle.dispose();
            }
            // Drop released observers so disposal frees their state.
            core.observers.borrow_mut().retain(|slot| slot.active.get());
            let mut logs = core.logs.borrow_mut();
            if let Some(entry) = logs.get_mut(log_index) {
                entry.unsubscribed = Some(core.scheduler.now());
            }
        })
    }
}

/// Handle to a scripted hot or cold source; observable plus its
/// subscription log.
pub struct ScriptedSource<T> {
    core: Rc<ScriptedCore<T>>,
}

impl<T: Clone + 'static> ScriptedSource<T> {
    pub fn observable(&self) -> SharedObservable<T> {
        Rc::new(ScriptedObservable(self.core.clone()))
    }

    pub fn subscriptions(&self) -> Vec<SubscriptionLog> {
        self.core.logs.borrow().clone()
    }
}

struct RecordingObserver<T> {
    scheduler: VirtualScheduler,
    messages: Rc<RefCell<Vec<Recorded<T>>>>,
}

impl<T> Observer<T> for RecordingObserver<T> {
    fn on_next(&mut self, value: T) {
        self.messages.borrow_mut().push(Recorded {
            time: self.scheduler.now(),
            notification: Notification::Next(value),
        });
    }

    fn on_error(&mut self, error: StreamError) {
        self.messages.borrow_mut().push(Recorded {
            time: self.scheduler.now(),
            notification: Notification::Error(error),
        });
    }

    fn on_completed(&mut self) {
        self.messages.borrow_mut().push(Recorded {
            time: self.scheduler.now(),
            notification: Notification::Completed,
        });
    }
}

/// Virtual-time driver for operator tests.
pub struct TestScheduler {
    sched: VirtualScheduler,
}

impl TestScheduler {
    pub fn new() -> Self {
        Self {
            sched: VirtualScheduler::new(),
        }
    }

    /// The scheduler handle operators should be constructed with.
    pub fn scheduler(&self) -> SharedScheduler {
        self.sched.shared()
    }

    pub fn now(&self) -> u64 {
        self.sched.now()
    }

    pub fn advance_to(&self, target: u64) {
        self.sched.advance_to(target)
    }

    /// Source that fires its script at absolute ticks regardless of
    /// subscribers.
    pub fn hot<T: Clone + 'static>(&self, script: Vec<Recorded<T>>) -> ScriptedSource<T> {
        let core = Rc::new(ScriptedCore {
            scheduler: self.sched.clone(),
            script,
            hot: true,
            observers: RefCell::new(Vec::new()),
            logs: RefCell::new(Vec::new()),
        });
        for recorded in &core.script {
            let notification = recorded.notification.clone();
            let c = core.clone();
            self.sched.schedule_at(
                recorded.time,
                Box::new(move || c.fire(&notification)),
            );
        }
        ScriptedSource { core }
    }

    /// Source that replays its script relative to each subscription.
    pub fn cold<T: Clone + 'static>(&self, script: Vec<Recorded<T>>) -> ScriptedSource<T> {
        ScriptedSource {
            core: Rc::new(ScriptedCore {
                scheduler: self.sched.clone(),
                script,
                hot: false,
                observers: RefCell::new(Vec::new()),
                logs: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Create at 100, subscribe at 200, dispose at 1000, run to
    /// exhaustion, and return everything the observer recorded.
    pub fn start<T: Clone + 'static>(
        &self,
        factory: impl FnOnce() -> SharedObservable<T> + 'static,
    ) -> Vec<Recorded<T>> {
        self.start_at(CREATE_AT, SUBSCRIBE_AT, DISPOSE_AT, factory)
    }

    pub fn start_at<T: Clone + 'static>(
        &self,
        create_at: u64,
        subscribe_at: u64,
        dispose_at: u64,
        factory: impl FnOnce() -> SharedObservable<T> + 'static,
    ) -> Vec<Recorded<T>> {
        let messages: Rc<RefCell<Vec<Recorded<T>>>> = Rc::new(RefCell::new(Vec::new()));
        let source: Rc<RefCell<Option<SharedObservable<T>>>> = Rc::new(RefCell::new(None));
        let subscription: Rc<RefCell<Option<Disposable>>> = Rc::new(RefCell::new(None));

        {
            let source = source.clone();
            self.sched
                .schedule_at(create_at, Box::new(move || *source.borrow_mut() = Some(factory())));
        }
        {
            let source = source.clone();
            let subscription = subscription.clone();
            let recorder = RecordingObserver {
                scheduler: self.sched.clone(),
                messages: messages.clone(),
            };
            self.sched.schedule_at(
                subscribe_at,
                Box::new(move || {
                    let target = source.borrow().clone();
                    if let Some(target) = target {
                        *subscription.borrow_mut() = Some(target.subscribe(Box::new(recorder)));
                    }
                }),
            );
        }
        {
            let subscription = subscription.clone();
            self.sched.schedule_at(
                dispose_at,
                Box::new(move || {
                    if let Some(handle) = subscription.borrow_mut().take() {
                        handle.dispose();
                    }
                }),
            );
        }

        self.sched.run();
        let result = messages.borrow().clone();
        result
    }
}

impl Default for TestScheduler {
    fn default() -> Self {
        Self::new()
    }
}
