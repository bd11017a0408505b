#![allow(dead_code)]
//! Shared scripts for the recorded operator tests.

use std::cmp::Ordering;

use rivulet_core::StreamError;
use rivulet_sched::testing::{on_completed, on_error, on_next, Recorded};

/// Scrambled integers with traffic after the terminal notification; the
/// in-window values are 6, 3, 7, 2, 5, 8, 4 and completion is at 400.
pub fn scrambled_ints() -> Vec<Recorded<i32>> {
    vec![
        on_next(180, 1),
        on_next(220, 6),
        on_next(230, 3),
        on_next(240, 7),
        on_next(250, 2),
        on_next(260, 5),
        on_next(270, 8),
        on_next(280, 4),
        on_completed(400),
        on_next(410, -1),
        on_completed(420),
        on_error(430, StreamError::source("past the end")),
    ]
}

/// Same shape, but the source fails at 400 instead of completing.
pub fn scrambled_ints_failing(error: StreamError) -> Vec<Recorded<i32>> {
    vec![
        on_next(180, 1),
        on_next(220, 6),
        on_next(230, 3),
        on_next(240, 7),
        on_next(250, 2),
        on_next(260, 5),
        on_next(270, 8),
        on_next(280, 4),
        on_error(400, error),
        on_next(410, -1),
        on_completed(420),
    ]
}

/// `(key, tag)` pairs with repeated keys; tags record arrival order
/// within each key group. In-window keys arrive as 2, 2, 1, 2, 1, 1, 2.
pub fn keyed_pairs() -> Vec<Recorded<(i32, i32)>> {
    vec![
        on_next(180, (1, 1)),
        on_next(220, (2, 2)),
        on_next(230, (2, 3)),
        on_next(240, (1, 4)),
        on_next(250, (2, 5)),
        on_next(260, (1, 6)),
        on_next(270, (1, 7)),
        on_next(280, (2, 8)),
        on_completed(400),
        on_next(410, (-1, 0)),
        on_completed(420),
    ]
}

/// Total order that runs opposite to the natural one.
pub fn inverse(a: &i32, b: &i32) -> Ordering {
    b.cmp(a)
}
