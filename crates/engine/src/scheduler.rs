// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic tick scheduling for the reconciliation and aging loops: the
//! 2s / 60s host-controller timers.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A single named recurring timer: unlike a one-shot timer, firing
/// re-arms it relative to the fire time rather than `now`, so a late poll
/// doesn't compound drift across ticks.
#[derive(Debug, Clone)]
struct Tick {
    period: Duration,
    fires_at: Instant,
}

/// Tracks the fixed set of recurring ticks the daemon drives: one per
/// periodic operation registered with the host controller.
#[derive(Debug, Default)]
pub struct Scheduler {
    ticks: HashMap<String, Tick>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a recurring tick under `name`, first firing one `period`
    /// from `now`.
    pub fn register(&mut self, name: impl Into<String>, period: Duration, now: Instant) {
        self.ticks.insert(
            name.into(),
            Tick {
                period,
                fires_at: now + period,
            },
        );
    }

    pub fn cancel(&mut self, name: &str) {
        self.ticks.remove(name);
    }

    /// Returns the names of every tick due at or before `now`, re-arming
    /// each relative to its previous `fires_at`.
    pub fn due(&mut self, now: Instant) -> Vec<String> {
        let mut fired = Vec::new();
        for (name, tick) in &mut self.ticks {
            if tick.fires_at <= now {
                fired.push(name.clone());
                tick.fires_at += tick.period;
                if tick.fires_at <= now {
                    // Fell behind by more than one period; resync instead
                    // of firing a backlog of catch-up ticks.
                    tick.fires_at = now + tick.period;
                }
            }
        }
        fired
    }

    /// The earliest upcoming fire time, for sizing a `tokio::select!`
    /// sleep.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.ticks.values().map(|t| t.fires_at).min()
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
