#![forbid(unsafe_code)]
//! rivulet-sched: schedulers and the virtual-time test harness.
//!
//! Responsibilities:
//! - `Scheduler`: schedule-now / schedule-after, returning cancellation
//!   handles.
//! - `ImmediateScheduler`: synchronous trampoline on the caller's stack.
//! - `VirtualScheduler`: deterministic virtual-time queue.
//! - `testing`: scripted hot/cold sources, recorded observers, and the
//!   `TestScheduler` driver.
//!
//! Everything here is single-threaded; handing work to a scheduler only
//! decides *when* it runs, never on which thread.

pub mod scheduler;
pub mod testing;
pub mod virtual_time;

pub use scheduler::{ImmediateScheduler, Scheduler, SharedScheduler};
pub use virtual_time::VirtualScheduler;
