#![forbid(unsafe_code)]
//! rivulet-operators: thin operators composed over the stream contract.
//!
//! - `pairwise`: previous/current tuples.
//! - `chunk`: fixed-size and time-window chunking.
//! - `dedup`: duplicate suppression (`distinct_until_changed`).
//! - `edge`: `delay_on` / `delay_off` edge-delay debouncing.
//! - `switch_first`: first-wins inner-stream switching with one pending.
//! - `cancel`: cancellation tokens and `take_until_canceled`.
//!
//! The ordering engines live in `rivulet-ordering`; everything here is a
//! small state machine over one upstream subscription.

pub mod cancel;
pub mod chunk;
pub mod dedup;
pub mod edge;
pub mod pairwise;
pub mod switch_first;

pub use cancel::{take_until_canceled, CancelSource, CancelToken};
pub use chunk::{chunk, chunk_within};
pub use dedup::distinct_until_changed;
pub use edge::{delay_off, delay_on};
pub use pairwise::pairwise;
pub use switch_first::switch_first;
