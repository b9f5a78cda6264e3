// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconciliation loop: polls the external definition store on a timer
//! and rebuilds the in-memory tables against it via mark-and-sweep.

use crate::error::ReconcileError;
use slicectl_adapters::{ControllerEffects, DefinitionStore, TeardownMatch};
use slicectl_core::BindingKind;
use slicectl_storage::SliceTable;
use std::time::{Instant, SystemTime};

/// Summary of one pass, for logging and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub ran: bool,
    pub slices_removed: usize,
    pub port_mac_removed: usize,
    pub mac_removed: usize,
    pub port_removed: usize,
}

/// Owns the one piece of state the reconciliation loop carries between
/// ticks: the definition file's last-observed mtime.
pub struct Reconciler {
    store: DefinitionStore,
    last_mtime: Option<SystemTime>,
}

impl Reconciler {
    pub fn new(store: DefinitionStore) -> Self {
        Self {
            store,
            last_mtime: None,
        }
    }

    pub fn store(&self) -> &DefinitionStore {
        &self.store
    }

    /// Runs one pass of step 1-6. Returns `Ok(outcome)` with `ran = false`
    /// if the mtime guard short-circuited the pass (step 1), or propagates
    /// a `ReconcileError` on any store failure — in which case the caller
    /// must not have observed any table mutation (step 6's failure
    /// semantics: abort, leave tables and mtime untouched, retry next tick).
    pub fn run(
        &mut self,
        table: &mut SliceTable,
        effects: &dyn ControllerEffects,
        now: Instant,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let mtime = self.store.mtime()?;
        if Some(mtime) == self.last_mtime {
            tracing::debug!("definition store unchanged, skipping reconciliation pass");
            return Ok(ReconcileOutcome::default());
        }

        tracing::info!("loading slice definitions");

        // Steps 3-4 run against freshly-read rows before any mutation, so a
        // query failure here still leaves `table` and `last_mtime` intact.
        let slices = self.store.load_slices()?;
        let bindings = self.store.load_bindings()?;
        tracing::debug!(
            slices = slices.len(),
            bindings = bindings.len(),
            "loaded rows from definition store"
        );

        table.clear_found_in_store();

        for row in &slices {
            table.load_slice(row.number, row.id.clone());
        }
        for row in &bindings {
            match row.kind {
                BindingKind::Port {
                    datapath_id,
                    port,
                    vid,
                } => {
                    table.load_port_binding(datapath_id, port, vid, row.slice_number, row.id.clone(), now);
                }
                BindingKind::Mac { mac } => {
                    table.load_mac_binding(mac, row.slice_number, row.id.clone(), now);
                }
                BindingKind::PortMac {
                    datapath_id,
                    port,
                    vid,
                    mac,
                } => {
                    table.load_port_mac_binding(
                        datapath_id,
                        port,
                        vid,
                        mac,
                        row.slice_number,
                        row.id.clone(),
                        now,
                    );
                }
            }
        }

        // Step 5.a
        let removed_port_mac = table.sweep_port_mac();
        for binding in &removed_port_mac {
            if let BindingKind::PortMac { mac, .. } = binding.kind {
                effects.teardown_path_by_match(TeardownMatch::DlSrc(mac));
                effects.teardown_path_by_match(TeardownMatch::DlDst(mac));
            }
        }

        // Step 5.b
        let removed_mac = table.sweep_mac();
        let mac_binding_deleted = !removed_mac.is_empty();
        for binding in &removed_mac {
            if let BindingKind::Mac { mac } = binding.kind {
                effects.teardown_path_by_match(TeardownMatch::DlSrc(mac));
                effects.teardown_path_by_match(TeardownMatch::DlDst(mac));
            }
        }

        // Step 5.c
        let removed_port = table.sweep_port(mac_binding_deleted);
        for (datapath_id, port) in &removed_port {
            effects.teardown_path_by_port(*datapath_id, *port);
        }

        // Step 5.d
        let slice_report = table.sweep_slices();

        self.last_mtime = Some(mtime);

        tracing::info!(
            slices_removed = slice_report.removed.len(),
            port_mac_removed = removed_port_mac.len(),
            mac_removed = removed_mac.len(),
            port_removed = removed_port.len(),
            "reconciliation pass complete"
        );

        Ok(ReconcileOutcome {
            ran: true,
            slices_removed: slice_report.removed.len(),
            port_mac_removed: removed_port_mac.len(),
            mac_removed: removed_mac.len(),
            port_removed: removed_port.len(),
        })
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
