//! Contract Test: Change Detection
//!
//! This test verifies that records are updated exactly when the observed
//! public address changes.
//!
//! Constraints verified:
//! - The first successful observation always triggers an update
//! - Repeating the same address never triggers an update
//! - A different address triggers exactly one update batch with every name
//!
//! If this test fails, the loop is either missing changes or spamming the
//! provider with redundant updates.

mod common;

use common::*;
use dyndns_core::{CycleOutcome, ObservedAddress, PollingLoop, UpdateOutcome};

fn build(steps: Vec<Step>, pointers: &[&str]) -> (PollingLoop, ScriptedObserver, RecordingUpdater) {
    let observer = ScriptedObserver::new(steps);
    let updater = RecordingUpdater::new();

    let (polling_loop, _event_rx) = PollingLoop::new(
        Box::new(ScriptedObserver::sharing_counters_with(&observer)),
        Box::new(RecordingUpdater::sharing_counters_with(&updater)),
        &minimal_config(60, pointers),
    );

    (polling_loop, observer, updater)
}

#[tokio::test]
async fn same_address_twice_then_new_address() {
    let (mut polling_loop, _observer, updater) = build(
        vec![ok("1.2.3.4"), ok("1.2.3.4"), ok("5.6.7.8")],
        &POINTERS,
    );

    // Cycle 1: Unknown → Known(1.2.3.4), every name updated
    let outcome = polling_loop.poll_once().await;
    assert_eq!(
        outcome,
        CycleOutcome::Changed {
            previous: None,
            current: ip("1.2.3.4"),
            outcomes: POINTERS
                .iter()
                .map(|name| UpdateOutcome::success(*name, ip("1.2.3.4")))
                .collect(),
        }
    );
    assert_eq!(updater.batch_count(), 1);

    // Cycle 2: same address, no update
    let outcome = polling_loop.poll_once().await;
    assert_eq!(outcome, CycleOutcome::Unchanged { current: ip("1.2.3.4") });
    assert_eq!(updater.batch_count(), 1);

    // Cycle 3: new address, every name updated with it
    let outcome = polling_loop.poll_once().await;
    assert!(matches!(
        outcome,
        CycleOutcome::Changed { previous: Some(p), current: c, .. }
            if p == ip("1.2.3.4") && c == ip("5.6.7.8")
    ));
    assert_eq!(updater.batch_count(), 2);

    let expected: Vec<_> = POINTERS
        .iter()
        .map(|n| (n.to_string(), ip("1.2.3.4")))
        .chain(POINTERS.iter().map(|n| (n.to_string(), ip("5.6.7.8"))))
        .collect();
    assert_eq!(updater.calls(), expected);
    assert_eq!(polling_loop.last_known(), ObservedAddress::Known(ip("5.6.7.8")));
}

#[tokio::test]
async fn first_observation_always_counts_as_change() {
    let (mut polling_loop, _observer, updater) = build(vec![ok("10.0.0.1")], &["home.example.no"]);

    assert_eq!(polling_loop.last_known(), ObservedAddress::Unknown);

    let outcome = polling_loop.poll_once().await;

    assert!(matches!(outcome, CycleOutcome::Changed { previous: None, .. }));
    assert_eq!(updater.calls(), vec![("home.example.no".to_string(), ip("10.0.0.1"))]);
}

#[tokio::test]
async fn one_update_batch_per_change_over_a_sequence() {
    let sequence = [
        "1.1.1.1", "1.1.1.1", "2.2.2.2", "2.2.2.2", "2.2.2.2", "1.1.1.1", "3.3.3.3", "3.3.3.3",
    ];

    let (mut polling_loop, _observer, updater) =
        build(sequence.iter().map(|s| ok(s)).collect(), &POINTERS);

    let mut expected_batches = 0;
    let mut previous: Option<&str> = None;

    for address in sequence {
        if previous != Some(address) {
            expected_batches += 1;
        }
        previous = Some(address);

        polling_loop.poll_once().await;
        assert_eq!(
            updater.batch_count(),
            expected_batches,
            "after observing {}",
            address
        );
    }

    assert_eq!(expected_batches, 4);
    assert_eq!(updater.calls().len(), 4 * POINTERS.len());
}

#[tokio::test]
async fn empty_pointer_list_observes_but_updates_nothing() {
    let (mut polling_loop, observer, updater) = build(vec![ok("1.2.3.4"), ok("5.6.7.8")], &[]);

    let outcome = polling_loop.poll_once().await;
    assert_eq!(
        outcome,
        CycleOutcome::Changed {
            previous: None,
            current: ip("1.2.3.4"),
            outcomes: Vec::new(),
        }
    );

    polling_loop.poll_once().await;

    assert_eq!(observer.observe_call_count(), 2);
    assert!(updater.calls().is_empty());
    assert_eq!(polling_loop.last_known(), ObservedAddress::Known(ip("5.6.7.8")));
}

#[tokio::test]
async fn construction_only_applies_the_interval_floor() {
    // Validation happens at the daemon boundary; the loop takes what it is given
    let mut config = minimal_config(3, &["home.example.no"]);
    config.api.token = String::new();

    let (polling_loop, _event_rx) = PollingLoop::new(
        Box::new(ScriptedObserver::new(Vec::new())),
        Box::new(RecordingUpdater::new()),
        &config,
    );

    assert_eq!(polling_loop.schedule().interval(), std::time::Duration::from_secs(10));
    assert_eq!(polling_loop.schedule().remainder(), None);
    assert_eq!(polling_loop.last_known(), ObservedAddress::Unknown);
}
