// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Slice resolver: the policy-driven lookup that classifies an ingress
//! tuple into a slice number, synthesizing dynamic port bindings along
//! the way.

use crate::dynamic;
use slicectl_core::{DatapathId, MacAddr, Mode, Port, SliceNumber, Vid};
use slicectl_storage::SliceTable;
use std::time::Instant;

/// `lookup_slice(datapath_id, port, vid, mac_opt) → slice_number | NOT_FOUND`.
///
/// Priority order: a MAC hit always wins and may install or refresh a
/// dynamic port binding; otherwise `RESTRICT_HOSTS_ON_PORT` gates whether
/// a pure port lookup (with or without a PORT_MAC fallback) is permitted.
pub fn lookup_slice(
    table: &mut SliceTable,
    mode: Mode,
    datapath_id: DatapathId,
    port: Port,
    vid: Vid,
    mac: Option<MacAddr>,
    now: Instant,
) -> Option<SliceNumber> {
    if let Some(mac) = mac {
        if let Some(mac_binding) = table.get_mac_binding(mac) {
            let slice_number = mac_binding.slice_number;
            tracing::debug!(%slice_number, "slice found in mac-slice map");
            if !mode.loose_mac_based_slicing() {
                promote_or_refresh(table, datapath_id, port, vid, slice_number, now);
            }
            return verify_slice_exists(table, slice_number);
        }

        if mode.restrict_hosts_on_port() {
            let found = table
                .get_port_mac_binding(datapath_id, port, vid, mac)
                .map(|b| b.slice_number);
            match found {
                Some(slice_number) => {
                    tracing::debug!(%slice_number, "slice found in port_mac-slice map");
                    return verify_slice_exists(table, slice_number);
                }
                None => {
                    tracing::debug!("no slice found");
                    return None;
                }
            }
        }
    } else if mode.restrict_hosts_on_port() {
        tracing::debug!("no slice found");
        return None;
    }

    // Reached only when restrict mode is off: either no MAC was supplied,
    // or one was and its mac_slice_map lookup missed.
    let found = table
        .get_port_binding(datapath_id, port, vid)
        .map(|b| b.slice_number);
    match found {
        Some(slice_number) => {
            tracing::debug!(%slice_number, "slice found in port-slice map");
            verify_slice_exists(table, slice_number)
        }
        None => {
            tracing::debug!("no slice found");
            None
        }
    }
}

fn promote_or_refresh(
    table: &mut SliceTable,
    datapath_id: DatapathId,
    port: Port,
    vid: Vid,
    slice_number: SliceNumber,
    now: Instant,
) {
    let matches_existing = table
        .get_port_binding(datapath_id, port, vid)
        .map(|b| b.slice_number == slice_number)
        .unwrap_or(false);

    if matches_existing {
        dynamic::refresh(table, datapath_id, port, vid, now);
    } else {
        dynamic::implicit_insert(table, datapath_id, port, vid, slice_number, now);
    }
}

/// Defends against a race with reconciliation: a hit against a slice
/// number no longer present in `slices` is reported as a miss.
fn verify_slice_exists(table: &SliceTable, number: SliceNumber) -> Option<SliceNumber> {
    table.slice_exists(number).then_some(number)
}

/// `lookup_slice_by_mac(mac) → slice_number | NOT_FOUND`. No dynamic-binding
/// side effects.
pub fn lookup_slice_by_mac(table: &SliceTable, mac: MacAddr) -> Option<SliceNumber> {
    table.get_mac_binding(mac).map(|b| b.slice_number)
}

/// `get_port_vid(slice_number, datapath_id, port) → vid | none`.
pub fn get_port_vid(
    table: &SliceTable,
    slice_number: SliceNumber,
    datapath_id: DatapathId,
    port: Port,
) -> Option<Vid> {
    table.get_port_vid(datapath_id, port, slice_number)
}

/// `mac_slice_maps_exist(slice_number) → bool`.
pub fn mac_slice_maps_exist(table: &SliceTable, slice_number: SliceNumber) -> bool {
    table.mac_slice_maps_exist(slice_number)
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
