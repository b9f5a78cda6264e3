// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn tick_fires_once_it_reaches_its_deadline() {
    let mut scheduler = Scheduler::new();
    let t0 = Instant::now();
    scheduler.register("reconcile", Duration::from_secs(2), t0);

    assert!(scheduler.due(t0).is_empty());
    assert!(scheduler.due(t0 + Duration::from_secs(1)).is_empty());
    assert_eq!(scheduler.due(t0 + Duration::from_secs(2)), vec!["reconcile"]);
}

#[test]
fn tick_rearms_relative_to_its_own_deadline() {
    let mut scheduler = Scheduler::new();
    let t0 = Instant::now();
    scheduler.register("reconcile", Duration::from_secs(2), t0);

    let first_fire = t0 + Duration::from_secs(2);
    assert_eq!(scheduler.due(first_fire), vec!["reconcile"]);
    assert!(scheduler.due(first_fire + Duration::from_millis(500)).is_empty());
    assert_eq!(
        scheduler.due(first_fire + Duration::from_secs(2)),
        vec!["reconcile"]
    );
}

#[test]
fn falling_behind_resyncs_instead_of_firing_a_backlog() {
    let mut scheduler = Scheduler::new();
    let t0 = Instant::now();
    scheduler.register("aging", Duration::from_secs(60), t0);

    let way_later = t0 + Duration::from_secs(600);
    assert_eq!(scheduler.due(way_later), vec!["aging"]);
    assert!(scheduler.due(way_later).is_empty(), "must not refire immediately after resync");
}

#[test]
fn independent_ticks_fire_independently() {
    let mut scheduler = Scheduler::new();
    let t0 = Instant::now();
    scheduler.register("reconcile", Duration::from_secs(2), t0);
    scheduler.register("aging", Duration::from_secs(60), t0);

    let mut fired = scheduler.due(t0 + Duration::from_secs(2));
    fired.sort();
    assert_eq!(fired, vec!["reconcile"]);

    let mut fired = scheduler.due(t0 + Duration::from_secs(60));
    fired.sort();
    assert_eq!(fired, vec!["aging", "reconcile"]);
}

#[test]
fn cancel_removes_a_tick() {
    let mut scheduler = Scheduler::new();
    let t0 = Instant::now();
    scheduler.register("reconcile", Duration::from_secs(2), t0);
    scheduler.cancel("reconcile");
    assert!(scheduler.due(t0 + Duration::from_secs(100)).is_empty());
}

#[test]
fn next_deadline_reports_the_earliest_tick() {
    let mut scheduler = Scheduler::new();
    let t0 = Instant::now();
    scheduler.register("aging", Duration::from_secs(60), t0);
    scheduler.register("reconcile", Duration::from_secs(2), t0);
    assert_eq!(scheduler.next_deadline(), Some(t0 + Duration::from_secs(2)));
}
