//! End-to-end scenarios for the menu worker against the headless backend.
//!
//! These walk the whole report → popup → activate → stop path the way the
//! plugin's control surface drives it, and pin down the degraded paths:
//! initialization failure, popups outside the Running phase, and shutdown
//! timing.

use std::thread;
use std::time::{Duration, Instant};

use carta_menu::{HeadlessBackend, MenuWorker, Phase};

fn wait_until_running(worker: &MenuWorker) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !worker.is_running() {
        assert!(
            Instant::now() < deadline,
            "worker never reached Running (phase {:?})",
            worker.phase()
        );
        thread::sleep(Duration::from_millis(1));
    }
}

/// Wait until the probe satisfies `pred`; popup dispatch is asynchronous
/// relative to the requesting thread.
fn wait_for<F: Fn() -> bool>(pred: F, what: &str) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !pred() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn popup_anchors_at_last_reported_pointer() {
    // Scenario A: the display call receives the coordinates of the most
    // recent completed report and the three labels in order.
    let backend = HeadlessBackend::new();
    let probe = backend.probe();
    let mut worker = MenuWorker::new(backend);
    worker.start();
    wait_until_running(&worker);

    let handle = worker.handle();
    handle.report_pointer(7, 9);
    handle.report_pointer(120, 340);
    handle.request_popup();

    wait_for(|| !probe.popups().is_empty(), "popup display");
    let popups = probe.popups();
    assert_eq!(popups.len(), 1);
    assert_eq!(popups[0].anchor, (120, 340));
    assert_eq!(
        popups[0].labels,
        vec!["MenuItem 0", "MenuItem 1", "MenuItem 2"]
    );

    worker.stop(Some(Duration::from_secs(1))).unwrap();
}

#[test]
fn init_failure_degrades_silently() {
    // Scenario B: the toolkit cannot initialize; the feature is gone but
    // nothing faults and stop returns within its timeout.
    let backend = HeadlessBackend::failing();
    let probe = backend.probe();
    let mut worker = MenuWorker::new(backend);
    worker.start();

    wait_for(|| worker.phase() == Phase::Stopped, "failed-init exit");
    assert!(!worker.is_running());
    assert_eq!(probe.init_calls(), 1);

    let handle = worker.handle();
    handle.request_popup();
    handle.request_popup();
    assert!(probe.popups().is_empty());

    worker.stop(Some(Duration::from_secs(5))).unwrap();
    assert!(!worker.is_running());
}

#[test]
fn activation_reports_payload_once() {
    // Scenario C: selecting item index 1 invokes the activation path with
    // payload "MenuItem 1" exactly once.
    let backend = HeadlessBackend::new().auto_select(1);
    let probe = backend.probe();
    let mut worker = MenuWorker::new(backend);
    worker.start();
    wait_until_running(&worker);

    let handle = worker.handle();
    handle.report_pointer(50, 60);
    handle.request_popup();

    wait_for(|| !probe.activations().is_empty(), "activation");
    worker.stop(Some(Duration::from_secs(1))).unwrap();

    assert_eq!(probe.activations(), vec!["MenuItem 1"]);
}

#[test]
fn stop_after_failed_init_returns_promptly() {
    // A worker that never reaches Running must not wait out the timeout.
    let mut worker = MenuWorker::new(HeadlessBackend::failing());
    worker.start();
    wait_for(|| worker.phase() == Phase::Stopped, "failed-init exit");

    let began = Instant::now();
    worker.stop(Some(Duration::from_secs(5))).unwrap();
    assert!(
        began.elapsed() < Duration::from_millis(100),
        "stop took {:?}",
        began.elapsed()
    );
}

#[test]
fn stop_racing_initialization_never_deadlocks() {
    // stop() issued while the worker may still be initializing: whichever
    // side wins the race, the call must come back.
    for _ in 0..50 {
        let mut worker = MenuWorker::new(HeadlessBackend::new());
        worker.start();
        worker.stop(Some(Duration::from_secs(2))).unwrap();
        assert_eq!(worker.phase(), Phase::Stopped);
    }
}

#[test]
fn popup_requests_from_other_threads() {
    // report_pointer and request_popup are any-thread operations.
    let backend = HeadlessBackend::new();
    let probe = backend.probe();
    let mut worker = MenuWorker::new(backend);
    worker.start();
    wait_until_running(&worker);

    let handle = worker.handle();
    let mover = {
        let handle = handle.clone();
        thread::spawn(move || {
            for i in 0..100 {
                handle.report_pointer(i, i);
            }
        })
    };
    mover.join().unwrap();

    handle.report_pointer(42, 43);
    handle.request_popup();
    wait_for(|| !probe.popups().is_empty(), "popup display");

    worker.stop(Some(Duration::from_secs(1))).unwrap();
    assert_eq!(probe.popups()[0].anchor, (42, 43));

    // However many reports and popups happened, the toolkit was
    // initialized exactly once.
    assert_eq!(probe.init_calls(), 1);
}

#[test]
fn consecutive_popups_track_the_pointer() {
    let backend = HeadlessBackend::new();
    let probe = backend.probe();
    let mut worker = MenuWorker::new(backend);
    worker.start();
    wait_until_running(&worker);

    let handle = worker.handle();
    handle.report_pointer(1, 1);
    handle.request_popup();
    wait_for(|| probe.popups().len() == 1, "first popup");

    handle.report_pointer(200, 300);
    handle.request_popup();
    wait_for(|| probe.popups().len() == 2, "second popup");

    worker.stop(Some(Duration::from_secs(1))).unwrap();

    let popups = probe.popups();
    assert_eq!(popups[0].anchor, (1, 1));
    assert_eq!(popups[1].anchor, (200, 300));
}
