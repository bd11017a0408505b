//! Edge-delay debouncing: `delay_on` / `delay_off`.

mod support;

use rivulet_core::StreamError;
use rivulet_operators::{delay_off, delay_on};
use rivulet_sched::testing::{on_completed, on_error, on_next, TestScheduler};

#[test]
fn on_edge_is_delayed_and_off_edge_passes_through() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.hot(vec![
        on_next(180, false),
        on_next(220, false),
        on_next(230, true),
        on_next(240, false),
        on_next(250, false),
        on_completed(400),
    ]);

    let source = xs.observable();
    let sched = scheduler.scheduler();
    let res = scheduler.start(move || delay_on(&source, 2, sched));

    assert_eq!(
        res,
        vec![
            on_next(220, false),
            on_next(232, true),
            on_next(240, false),
            on_completed(400),
        ]
    );
}

#[test]
fn short_pulse_is_swallowed_by_a_long_delay() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.hot(vec![
        on_next(180, false),
        on_next(220, false),
        on_next(230, true),
        on_next(240, false),
        on_next(250, false),
        on_completed(400),
    ]);

    let source = xs.observable();
    let sched = scheduler.scheduler();
    let res = scheduler.start(move || delay_on(&source, 10, sched));

    // The false at 240 cancels the pending transition scheduled for 240;
    // the duplicate false never reaches the output.
    assert_eq!(res, vec![on_next(220, false), on_completed(400)]);
}

#[test]
fn completion_waits_for_a_pending_transition() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.hot(vec![
        on_next(220, false),
        on_next(399, true),
        on_completed(400),
    ]);

    let source = xs.observable();
    let sched = scheduler.scheduler();
    let res = scheduler.start(move || delay_on(&source, 2, sched));

    assert_eq!(
        res,
        vec![
            on_next(220, false),
            on_next(401, true),
            on_completed(401),
        ]
    );
}

#[test]
fn zero_delay_reduces_to_duplicate_suppression() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.hot(vec![
        on_next(220, false),
        on_next(230, true),
        on_next(240, true),
        on_next(250, false),
        on_completed(400),
    ]);

    let source = xs.observable();
    let sched = scheduler.scheduler();
    let res = scheduler.start(move || delay_on(&source, 0, sched));

    assert_eq!(
        res,
        vec![
            on_next(220, false),
            on_next(230, true),
            on_next(250, false),
            on_completed(400),
        ]
    );
}

#[test]
fn error_cancels_a_pending_transition() {
    let scheduler = TestScheduler::new();
    let error = StreamError::source("broken");
    let xs = scheduler.hot(vec![
        on_next(220, false),
        on_next(230, true),
        on_error(231, error.clone()),
    ]);

    let source = xs.observable();
    let sched = scheduler.scheduler();
    let res = scheduler.start(move || delay_on(&source, 10, sched));

    assert_eq!(res, vec![on_next(220, false), on_error(231, error)]);
}

#[test]
fn off_edge_is_delayed_in_the_mirror_operator() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.hot(vec![
        on_next(220, true),
        on_next(230, false),
        on_next(240, true),
        on_completed(400),
    ]);

    let source = xs.observable();
    let sched = scheduler.scheduler();
    let res = scheduler.start(move || delay_off(&source, 2, sched));

    assert_eq!(
        res,
        vec![
            on_next(220, true),
            on_next(232, false),
            on_next(240, true),
            on_completed(400),
        ]
    );
}

#[test]
fn off_pulse_shorter_than_the_delay_is_swallowed() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.hot(vec![
        on_next(220, true),
        on_next(230, false),
        on_next(232, true),
        on_completed(400),
    ]);

    let source = xs.observable();
    let sched = scheduler.scheduler();
    let res = scheduler.start(move || delay_off(&source, 5, sched));

    assert_eq!(res, vec![on_next(220, true), on_completed(400)]);
}
