// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `slicectld`: a reference driver that exercises the slicing core
//! end-to-end. Not itself "the controller" — a real SDN controller
//! would implement `ControllerEffects` and drive the core the way this
//! binary does.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod config;
mod error;
mod lifecycle;

use config::Config;
use slicectl_adapters::{ControllerEffects, FileModificationWatcher, LoggingEffects};
use std::sync::Arc;
use std::time::Instant;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    install_logging();

    let config = Config::load();
    info!(?config, "starting slicectld");

    let effects: Box<dyn ControllerEffects> = Box::new(LoggingEffects);
    let now = Instant::now();
    let mut daemon = lifecycle::start(&config, effects, now)?;

    // Component A: re-read the definition file the moment it changes,
    // instead of waiting out the full reconcile tick.
    let (store_changed_tx, mut store_changed_rx) = mpsc::unbounded_channel::<()>();
    let mut watcher = FileModificationWatcher::new();
    let callback_tx = store_changed_tx.clone();
    if !watcher.add(
        config.store_path.clone(),
        Arc::new(move || {
            let _ = callback_tx.send(());
        }),
    ) {
        warn!(path = %config.store_path.display(), "failed to watch definition store path");
    }

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!("slicectld ready");

    loop {
        let deadline = match daemon.scheduler.next_deadline() {
            Some(deadline) => tokio::time::Instant::from_std(deadline),
            None => tokio::time::Instant::from_std(Instant::now() + config.reconcile_interval),
        };

        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => {
                run_due_ticks(&mut daemon);
            }

            event = watcher.next_event() => {
                match event {
                    Some(result) => watcher.handle_event(result),
                    None => warn!("file modification watcher channel closed"),
                }
            }

            _ = store_changed_rx.recv() => {
                if let Err(e) = daemon.engine.reconcile(Instant::now()) {
                    error!(error = %e, "reconciliation pass failed");
                }
            }

            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
                break;
            }

            _ = sigint.recv() => {
                info!("received SIGINT, shutting down");
                break;
            }
        }
    }

    daemon.engine.finalize_slice()?;
    info!("slicectld stopped");
    Ok(())
}

fn run_due_ticks(daemon: &mut lifecycle::Daemon) {
    let now = Instant::now();
    for tick in daemon.scheduler.due(now) {
        match tick.as_str() {
            lifecycle::RECONCILE_TICK => {
                if let Err(e) = daemon.engine.reconcile(now) {
                    error!(error = %e, "reconciliation pass failed");
                }
            }
            lifecycle::AGING_TICK => {
                daemon.engine.age_dynamic_bindings(now);
            }
            other => warn!(tick = other, "scheduler fired an unknown tick"),
        }
    }
}

fn install_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
