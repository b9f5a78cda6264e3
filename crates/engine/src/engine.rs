// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `SliceEngine`: a value type consolidating what would otherwise be a
//! handful of process-wide globals. Owns the binding table, the
//! resolved policy mode, the reconciler, and the forwarding-layer
//! handle; exposes the public API consumers drive the slicing core
//! through.

use crate::error::ReconcileError;
use crate::reconcile::{ReconcileOutcome, Reconciler};
use crate::resolver;
use slicectl_adapters::{ControllerEffects, DefinitionStore};
use slicectl_core::{DatapathId, MacAddr, Mode, Port, SliceError, SliceNumber, Vid};
use slicectl_storage::SliceTable;
use std::time::{Duration, Instant};

/// Owns everything a running slicing core needs. Uninitialized until
/// [`SliceEngine::init_slice`] succeeds; every other operation but
/// `init_slice`/`finalize_slice` requires initialization.
pub struct SliceEngine {
    table: SliceTable,
    mode: Mode,
    reconciler: Option<Reconciler>,
    effects: Option<Box<dyn ControllerEffects>>,
    dynamic_binding_timeout: Duration,
}

impl Default for SliceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SliceEngine {
    pub fn new() -> Self {
        Self {
            table: SliceTable::new(),
            mode: Mode::default(),
            reconciler: None,
            effects: None,
            dynamic_binding_timeout: crate::dynamic::DYNAMIC_BINDING_TIMEOUT,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.reconciler.is_some()
    }

    /// Overrides the dynamic-binding aging timeout (default: 3600s).
    /// Takes effect on the next aging tick.
    pub fn set_dynamic_binding_timeout(&mut self, timeout: Duration) {
        self.dynamic_binding_timeout = timeout;
    }

    /// `init_slice(path, mode, controller)`. Refuses an empty path and a
    /// double init (both configuration errors).
    pub fn init_slice(
        &mut self,
        path: impl Into<std::path::PathBuf>,
        mode_bits: u32,
        effects: Box<dyn ControllerEffects>,
    ) -> Result<(), SliceError> {
        if self.is_initialized() {
            tracing::error!("init_slice called while already initialized");
            return Err(SliceError::AlreadyInitialized);
        }
        let path = path.into();
        if path.as_os_str().is_empty() {
            tracing::error!("init_slice called with an empty definition store path");
            return Err(SliceError::EmptyPath);
        }

        self.mode = Mode::new(mode_bits);
        self.reconciler = Some(Reconciler::new(DefinitionStore::new(path)));
        self.effects = Some(effects);
        Ok(())
    }

    /// `finalize_slice()`. Empties every index and drops the
    /// reconciler/effects handles.
    pub fn finalize_slice(&mut self) -> Result<(), SliceError> {
        if !self.is_initialized() {
            return Err(SliceError::NotInitialized);
        }
        self.table.clear();
        self.reconciler = None;
        self.effects = None;
        Ok(())
    }

    /// Runs one reconciliation pass. Errors rather than panics when
    /// called before `init_slice` — a caller bug, but one that must not
    /// unwind across the event-loop boundary.
    pub fn reconcile(&mut self, now: Instant) -> Result<ReconcileOutcome, ReconcileError> {
        let (Some(reconciler), Some(effects)) = (self.reconciler.as_mut(), self.effects.as_deref()) else {
            return Err(ReconcileError::Lifecycle(SliceError::NotInitialized));
        };
        reconciler.run(&mut self.table, effects, now)
    }

    pub fn lookup_slice(
        &mut self,
        datapath_id: DatapathId,
        port: Port,
        vid: Vid,
        mac: Option<MacAddr>,
        now: Instant,
    ) -> Option<SliceNumber> {
        resolver::lookup_slice(&mut self.table, self.mode, datapath_id, port, vid, mac, now)
    }

    pub fn lookup_slice_by_mac(&self, mac: MacAddr) -> Option<SliceNumber> {
        resolver::lookup_slice_by_mac(&self.table, mac)
    }

    pub fn get_port_vid(&self, slice_number: SliceNumber, datapath_id: DatapathId, port: Port) -> Option<Vid> {
        resolver::get_port_vid(&self.table, slice_number, datapath_id, port)
    }

    pub fn mac_slice_maps_exist(&self, slice_number: SliceNumber) -> bool {
        resolver::mac_slice_maps_exist(&self.table, slice_number)
    }

    /// `delete_dynamic_port_slice_bindings(dp, port)`: the explicit
    /// link-down purge.
    pub fn delete_dynamic_port_slice_bindings(&mut self, datapath_id: DatapathId, port: Port) -> usize {
        crate::dynamic::purge(&mut self.table, datapath_id, port)
    }

    /// The 60s aging tick.
    pub fn age_dynamic_bindings(&mut self, now: Instant) -> usize {
        crate::dynamic::age_with_timeout(&mut self.table, now, self.dynamic_binding_timeout)
    }

    pub fn loose_mac_based_slicing_enabled(&self) -> bool {
        self.mode.loose_mac_based_slicing()
    }

    pub fn restrict_hosts_on_port_enabled(&self) -> bool {
        self.mode.restrict_hosts_on_port()
    }

    pub fn table(&self) -> &SliceTable {
        &self.table
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
