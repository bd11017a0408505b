#![forbid(unsafe_code)]
//! rivulet: push-based observable sequences with ordering operators.
//!
//! The member crates do the work; this package stitches them together
//! and hosts the workspace-level integration tests and benches.

pub mod prelude {
    pub use rivulet_core::{
        sources, ArgumentError, Disposable, EngineConfig, FnObserver, Notification, Observable,
        Observer, SerialDisposable, SharedObservable, StreamError, SubscriptionId,
    };
    pub use rivulet_operators::{
        chunk, chunk_within, delay_off, delay_on, distinct_until_changed, pairwise, switch_first,
        take_until_canceled, CancelSource, CancelToken,
    };
    pub use rivulet_ordering::{
        api::{OrderedExt, OrderedObservable, OrderingExt, SharedOrdered},
        KeyLevel, LevelSpec,
    };
    pub use rivulet_sched::{ImmediateScheduler, Scheduler, SharedScheduler, VirtualScheduler};
}

pub use prelude::*;
