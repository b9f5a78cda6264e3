// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle / initialization: wires the watcher, binding tables,
//! reconciler, dynamic-binding manager, and resolver to the scheduler's
//! periodic ticks.

use crate::config::Config;
use crate::error::LifecycleError;
use slicectl_adapters::ControllerEffects;
use slicectl_engine::{Scheduler, SliceEngine};
use std::time::Instant;

pub const RECONCILE_TICK: &str = "reconcile";
pub const AGING_TICK: &str = "aging";

/// Everything the daemon's event loop drives: the engine plus the
/// scheduler that times its two periodic ticks.
pub struct Daemon {
    pub engine: SliceEngine,
    pub scheduler: Scheduler,
}

/// `init_slice(file_path, mode, controller)` + "run one synchronous
/// reconciliation pass" + "register two periodic callbacks", all in one
/// call since this driver has no separate controller to hand the
/// callbacks to.
pub fn start(
    config: &Config,
    effects: Box<dyn ControllerEffects>,
    now: Instant,
) -> Result<Daemon, LifecycleError> {
    let mut engine = SliceEngine::new();
    engine.init_slice(config.store_path.clone(), config.mode_bits, effects)?;
    engine.set_dynamic_binding_timeout(config.dynamic_binding_timeout);

    // Same failure semantics as every later tick: log and retry, don't
    // fail startup over a store that isn't populated yet.
    if let Err(error) = engine.reconcile(now) {
        tracing::warn!(%error, "initial reconciliation pass failed, will retry on next tick");
    }

    let mut scheduler = Scheduler::new();
    scheduler.register(RECONCILE_TICK, config.reconcile_interval, now);
    scheduler.register(AGING_TICK, config.aging_interval, now);

    Ok(Daemon { engine, scheduler })
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
