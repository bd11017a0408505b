//! Cancellation-token bridging.

mod support;

use rivulet_core::StreamError;
use rivulet_operators::{take_until_canceled, CancelSource};
use rivulet_sched::testing::{on_completed, on_error, on_next, subscription, TestScheduler};
use rivulet_sched::Scheduler;

#[test]
fn cancellation_completes_the_sequence() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.hot(vec![
        on_next(220, 1),
        on_next(230, 2),
        on_next(240, 3),
        on_completed(400),
    ]);

    let cancel = CancelSource::new();
    let token = cancel.token();
    scheduler
        .scheduler()
        .schedule_after(235, Box::new(move || cancel.cancel()));

    let source = xs.observable();
    let res = scheduler.start(move || take_until_canceled(&source, &token));

    assert_eq!(
        res,
        vec![on_next(220, 1), on_next(230, 2), on_completed(235)]
    );
    assert_eq!(xs.subscriptions(), vec![subscription(200, 235)]);
}

#[test]
fn already_canceled_token_yields_an_empty_sequence() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.hot(vec![on_next(220, 1), on_completed(400)]);

    let cancel = CancelSource::new();
    cancel.cancel();
    let token = cancel.token();

    let source = xs.observable();
    let res = scheduler.start(move || take_until_canceled(&source, &token));

    assert_eq!(res, vec![on_completed(200)]);
}

#[test]
fn uncanceled_token_is_transparent() {
    let scheduler = TestScheduler::new();
    let error = StreamError::source("broken");
    let xs = scheduler.hot(vec![
        on_next(220, 1),
        on_next(230, 2),
        on_error(300, error.clone()),
    ]);

    let cancel = CancelSource::new();
    let token = cancel.token();

    let source = xs.observable();
    let res = scheduler.start(move || take_until_canceled(&source, &token));

    assert_eq!(
        res,
        vec![on_next(220, 1), on_next(230, 2), on_error(300, error)]
    );
}

#[test]
fn cancellation_after_completion_is_a_no_op() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.hot(vec![on_next(220, 1), on_completed(250)]);

    let cancel = CancelSource::new();
    let token = cancel.token();
    scheduler
        .scheduler()
        .schedule_after(300, Box::new(move || cancel.cancel()));

    let source = xs.observable();
    let res = scheduler.start(move || take_until_canceled(&source, &token));

    assert_eq!(res, vec![on_next(220, 1), on_completed(250)]);
}
