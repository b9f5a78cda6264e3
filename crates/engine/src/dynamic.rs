// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dynamic-binding manager: create, refresh, age, and explicitly purge
//! port bindings the resolver synthesized from a MAC hit.

use slicectl_core::{DatapathId, Port, SliceNumber, Vid};
use slicectl_storage::SliceTable;
use std::time::{Duration, Instant};

/// Dynamic bindings older than this are aged out on the 60s tick.
pub const DYNAMIC_BINDING_TIMEOUT: Duration = Duration::from_secs(3600);

/// Called from the resolver when a MAC hit finds no matching port
/// binding. No flow-teardown happens here; consumers are responsible for
/// not rediscovering a torn-down path.
pub fn implicit_insert(
    table: &mut SliceTable,
    datapath_id: DatapathId,
    port: Port,
    vid: Vid,
    slice_number: SliceNumber,
    now: Instant,
) {
    tracing::debug!(%datapath_id, %port, %vid, %slice_number, "installing dynamic port binding");
    table.insert_dynamic_port_binding(datapath_id, port, vid, slice_number, now);
}

/// Called when an existing dynamic binding is re-hit and its slice
/// matches the MAC-resolved one.
pub fn refresh(
    table: &mut SliceTable,
    datapath_id: DatapathId,
    port: Port,
    vid: Vid,
    now: Instant,
) -> bool {
    table.refresh_port_binding(datapath_id, port, vid, now)
}

/// Deletes every dynamic port binding whose `updated_at + 3600s < now`.
/// Runs on the 60s host-controller tick.
pub fn age(table: &mut SliceTable, now: Instant) -> usize {
    age_with_timeout(table, now, DYNAMIC_BINDING_TIMEOUT)
}

/// As [`age`], but with a caller-supplied timeout — the daemon's
/// configuration layer may override the default above.
pub fn age_with_timeout(table: &mut SliceTable, now: Instant, timeout: Duration) -> usize {
    let removed = table.age_dynamic_port_bindings(now, timeout);
    if removed > 0 {
        tracing::info!(removed, "aged out dynamic port bindings");
    }
    removed
}

/// Explicit purge for the link-down path: removes every dynamic port
/// binding for `(datapath_id, port)` regardless of age.
pub fn purge(table: &mut SliceTable, datapath_id: DatapathId, port: Port) -> usize {
    let removed = table.delete_dynamic_port_bindings(datapath_id, port);
    if removed > 0 {
        tracing::info!(%datapath_id, %port, removed, "purged dynamic port bindings");
    }
    removed
}

#[cfg(test)]
#[path = "dynamic_tests.rs"]
mod tests;
