#![forbid(unsafe_code)]
//! rivulet-core: the push-stream contract (observers, observables, disposables).
//!
//! Responsibilities:
//! - Define the subscription/notification contract: zero or more `Next`
//!   values followed by exactly one terminal notification.
//! - Provide cancellation handles (`Disposable`, `SerialDisposable`).
//! - Hold the shared error taxonomy and engine configuration.
//!
//! Delivery is single-threaded and cooperative: notifications for one
//! subscription are never concurrent or reentrant. No scheduling and no
//! operators live here; those belong to `rivulet-sched` and the operator
//! crates.

pub mod config;
pub mod disposable;
pub mod error;
pub mod ids;
pub mod notification;
pub mod observable;
pub mod observer;
pub mod sources;

pub use config::EngineConfig;
pub use disposable::{Disposable, SerialDisposable};
pub use error::{ArgumentError, Result, StreamError};
pub use ids::SubscriptionId;
pub use notification::Notification;
pub use observable::{Observable, SharedObservable};
pub use observer::{FnObserver, Observer};
