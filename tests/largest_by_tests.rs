//! Bounded top-K selection: `largest_by`.

mod support;

use rivulet_core::StreamError;
use rivulet_ordering::api::{OrderedExt, OrderingExt};
use rivulet_sched::testing::{on_completed, on_error, on_next, subscription, TestScheduler};
use support::{inverse, keyed_pairs, scrambled_ints, scrambled_ints_failing};

#[test]
fn count_above_population_drains_everything_ascending() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.hot(scrambled_ints());

    let source = xs.observable();
    let sched = scheduler.scheduler();
    let res = scheduler.start(move || source.largest_by_on(|x| *x, 20, sched).observable());

    assert_eq!(
        res,
        vec![
            on_next(401, 2),
            on_next(402, 3),
            on_next(403, 4),
            on_next(404, 5),
            on_next(405, 6),
            on_next(406, 7),
            on_next(407, 8),
            on_completed(408),
        ]
    );
    assert_eq!(xs.subscriptions(), vec![subscription(200, 400)]);
}

#[test]
fn capped_count_keeps_the_best_five() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.hot(scrambled_ints());

    let source = xs.observable();
    let sched = scheduler.scheduler();
    let res = scheduler.start(move || source.largest_by_on(|x| *x, 5, sched).observable());

    assert_eq!(
        res,
        vec![
            on_next(401, 4),
            on_next(402, 5),
            on_next(403, 6),
            on_next(404, 7),
            on_next(405, 8),
            on_completed(406),
        ]
    );
    assert_eq!(xs.subscriptions(), vec![subscription(200, 400)]);
}

#[test]
fn zero_count_completes_empty() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.hot(scrambled_ints());

    let source = xs.observable();
    let sched = scheduler.scheduler();
    let res = scheduler.start(move || source.largest_by_on(|x| *x, 0, sched).observable());

    assert_eq!(res, vec![on_completed(401)]);
    assert_eq!(xs.subscriptions(), vec![subscription(200, 400)]);
}

#[test]
fn equal_keys_keep_arrival_order() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.hot(keyed_pairs());

    let source = xs.observable();
    let sched = scheduler.scheduler();
    let res = scheduler.start(move || source.largest_by_on(|p| p.0, 20, sched).observable());

    assert_eq!(
        res,
        vec![
            on_next(401, (1, 4)),
            on_next(402, (1, 6)),
            on_next(403, (1, 7)),
            on_next(404, (2, 2)),
            on_next(405, (2, 3)),
            on_next(406, (2, 5)),
            on_next(407, (2, 8)),
            on_completed(408),
        ]
    );
}

#[test]
fn inverse_comparer_flips_the_result_order() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.hot(scrambled_ints());

    let source = xs.observable();
    let sched = scheduler.scheduler();
    let res =
        scheduler.start(move || source.largest_by_with(|x| *x, 10, inverse, sched).observable());

    assert_eq!(
        res,
        vec![
            on_next(401, 8),
            on_next(402, 7),
            on_next(403, 6),
            on_next(404, 5),
            on_next(405, 4),
            on_next(406, 3),
            on_next(407, 2),
            on_completed(408),
        ]
    );
}

#[test]
fn inverse_comparer_capped_retains_the_smallest() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.hot(scrambled_ints());

    let source = xs.observable();
    let sched = scheduler.scheduler();
    let res =
        scheduler.start(move || source.largest_by_with(|x| *x, 5, inverse, sched).observable());

    assert_eq!(
        res,
        vec![
            on_next(401, 6),
            on_next(402, 5),
            on_next(403, 4),
            on_next(404, 3),
            on_next(405, 2),
            on_completed(406),
        ]
    );
}

#[test]
fn already_sorted_input_still_caps() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.hot(vec![
        on_next(180, 1),
        on_next(220, 2),
        on_next(230, 3),
        on_next(240, 4),
        on_next(250, 5),
        on_next(260, 6),
        on_next(270, 7),
        on_next(280, 8),
        on_completed(400),
    ]);

    let source = xs.observable();
    let sched = scheduler.scheduler();
    let res = scheduler.start(move || source.largest_by_on(|x| *x, 5, sched).observable());

    assert_eq!(
        res,
        vec![
            on_next(401, 4),
            on_next(402, 5),
            on_next(403, 6),
            on_next(404, 7),
            on_next(405, 8),
            on_completed(406),
        ]
    );
}

#[test]
fn empty_source_completes_after_one_tick() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.hot::<i32>(vec![on_completed(400)]);

    let source = xs.observable();
    let sched = scheduler.scheduler();
    let res = scheduler.start(move || source.largest_by_on(|x| *x, 10, sched).observable());

    assert_eq!(res, vec![on_completed(401)]);
}

#[test]
fn source_error_discards_the_retained_set() {
    let scheduler = TestScheduler::new();
    let error = StreamError::source("collapsed");
    let xs = scheduler.hot(scrambled_ints_failing(error.clone()));

    let source = xs.observable();
    let sched = scheduler.scheduler();
    let res = scheduler.start(move || source.largest_by_on(|x| *x, 20, sched).observable());

    assert_eq!(res, vec![on_error(400, error)]);
    assert_eq!(xs.subscriptions(), vec![subscription(200, 400)]);
}

#[test]
fn selector_fault_aborts_at_arrival() {
    use rivulet_core::{EngineConfig, Observable};
    use rivulet_ordering::capped::CappedStream;
    use rivulet_ordering::chain::KeyLevel;
    use std::rc::Rc;

    let scheduler = TestScheduler::new();
    let xs = scheduler.hot(scrambled_ints());

    let source = xs.observable();
    let sched = scheduler.scheduler();
    let res = scheduler.start(move || {
        let level = KeyLevel::fallible(
            |v: &i32| {
                if *v == 8 {
                    Err(StreamError::selector("unmappable value"))
                } else {
                    Ok(*v)
                }
            },
            false,
        );
        let stream: Rc<dyn Observable<i32>> =
            CappedStream::new(source.clone(), level, 5, sched, EngineConfig::default());
        stream
    });

    // The bounded engine projects on arrival, so the fault is reported
    // the moment the offending element shows up.
    assert_eq!(
        res,
        vec![on_error(270, StreamError::selector("unmappable value"))]
    );
    assert_eq!(xs.subscriptions(), vec![subscription(200, 270)]);
}

#[test]
fn disposal_mid_drain_stops_the_replay() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.hot(scrambled_ints());

    let source = xs.observable();
    let sched = scheduler.scheduler();
    let res = scheduler.start_at(100, 200, 404, move || {
        source.largest_by_on(|x| *x, 5, sched).observable()
    });

    // Elements after the disposal tick are never delivered, and neither
    // is the completion.
    assert_eq!(
        res,
        vec![on_next(401, 4), on_next(402, 5), on_next(403, 6)]
    );
}

#[test]
fn disposal_while_collecting_emits_nothing() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.hot(scrambled_ints());

    let source = xs.observable();
    let sched = scheduler.scheduler();
    let res = scheduler.start_at(100, 200, 250, move || {
        source.largest_by_on(|x| *x, 5, sched).observable()
    });

    assert_eq!(res, vec![]);
    assert_eq!(xs.subscriptions(), vec![subscription(200, 250)]);
}
