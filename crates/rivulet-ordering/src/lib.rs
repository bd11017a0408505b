#![forbid(unsafe_code)]
//! rivulet-ordering: the engines behind `order_by` and `largest_by`.
//!
//! Responsibilities:
//! - `heap`: index heap with arrival-order tie-breaking.
//! - `chain`: multi-key projection chain (`then_by` composition).
//! - `replay`: scheduler-driven drain of an ordered result.
//! - `full`: buffer-everything stable ordering.
//! - `capped`: bounded top-K retention.
//! - `api`: the combinator surface.
//!
//! Both engines are single-subscriber state machines: all mutation runs
//! synchronously inside the source notification callback, so no locking
//! is needed anywhere.

pub mod api;
pub mod capped;
pub mod chain;
pub mod full;
pub mod heap;
pub mod replay;

pub use api::{OrderedExt, OrderedObservable, OrderingExt, SharedOrdered};
pub use chain::{KeyLevel, LevelSpec, SlotComparer};
pub use heap::IndexedHeap;
