// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `SliceTable`: the five indexes that make up the in-memory binding
//! tables, and the mark-and-sweep primitives the reconciliation loop and
//! dynamic-binding manager are built from.
//!
//! All mutation methods here are intentionally low-level and infallible —
//! the policy (when to mark, when to sweep, which effects to fire) lives
//! in `slicectl-engine`. This type only guarantees that its own five
//! indexes stay mutually consistent with each other.

use crate::keys::{PortKey, PortMacKey, PortSliceKey};
use slicectl_core::{Binding, BindingKind, DatapathId, MacAddr, Port, Slice, SliceNumber, TruncatedString, Vid};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Outcome of a slice sweep: which slice numbers were removed, and which
/// were retained despite a missing `found_in_store` flag because a
/// binding still references them (the referential-violation error path).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SliceSweepReport {
    pub removed: Vec<SliceNumber>,
    pub retained_with_live_refs: Vec<SliceNumber>,
}

#[derive(Debug, Default)]
pub struct SliceTable {
    slices: HashMap<SliceNumber, Slice>,
    port_slice_map: HashMap<PortKey, Binding>,
    port_slice_vid_map: HashMap<PortSliceKey, Vid>,
    mac_slice_map: HashMap<MacAddr, Binding>,
    port_mac_slice_map: HashMap<PortMacKey, Binding>,
}

impl SliceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties all five indexes (`finalize_slice`).
    pub fn clear(&mut self) {
        self.slices.clear();
        self.port_slice_map.clear();
        self.port_slice_vid_map.clear();
        self.mac_slice_map.clear();
        self.port_mac_slice_map.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
            && self.port_slice_map.is_empty()
            && self.port_slice_vid_map.is_empty()
            && self.mac_slice_map.is_empty()
            && self.port_mac_slice_map.is_empty()
    }

    // --- reconciliation: mark phase -------------------------------------

    /// Clears `found_in_store` on every primary record ahead of a reload.
    pub fn clear_found_in_store(&mut self) {
        for slice in self.slices.values_mut() {
            slice.found_in_store = false;
        }
        for binding in self.port_slice_map.values_mut() {
            binding.found_in_store = false;
        }
        for binding in self.mac_slice_map.values_mut() {
            binding.found_in_store = false;
        }
        for binding in self.port_mac_slice_map.values_mut() {
            binding.found_in_store = false;
        }
    }

    // --- reconciliation: load phase --------------------------------------
    //
    // Each `load_*` marks an existing match `found_in_store = true` without
    // touching any other field, or inserts a fresh record. Returns `true`
    // when a fresh record was inserted.

    pub fn load_slice(&mut self, number: SliceNumber, id: TruncatedString) -> bool {
        if let Some(slice) = self.slices.get_mut(&number) {
            slice.found_in_store = true;
            false
        } else {
            self.slices.insert(number, Slice::new(number, id));
            true
        }
    }

    pub fn load_port_binding(
        &mut self,
        datapath_id: DatapathId,
        port: Port,
        vid: Vid,
        slice_number: SliceNumber,
        id: TruncatedString,
        now: Instant,
    ) -> bool {
        let key = PortKey {
            datapath_id,
            port,
            vid,
        };
        if let Some(binding) = self.port_slice_map.get_mut(&key) {
            binding.found_in_store = true;
            false
        } else {
            let binding = Binding::new_static(
                BindingKind::Port {
                    datapath_id,
                    port,
                    vid,
                },
                slice_number,
                id,
                now,
            );
            self.port_slice_map.insert(key, binding);
            self.port_slice_vid_map.insert(
                PortSliceKey {
                    datapath_id,
                    port,
                    slice_number,
                },
                vid,
            );
            true
        }
    }

    pub fn load_mac_binding(
        &mut self,
        mac: MacAddr,
        slice_number: SliceNumber,
        id: TruncatedString,
        now: Instant,
    ) -> bool {
        if let Some(binding) = self.mac_slice_map.get_mut(&mac) {
            binding.found_in_store = true;
            false
        } else {
            let binding = Binding::new_static(BindingKind::Mac { mac }, slice_number, id, now);
            self.mac_slice_map.insert(mac, binding);
            if let Some(slice) = self.slices.get_mut(&slice_number) {
                slice.n_mac_slice_maps += 1;
            }
            true
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn load_port_mac_binding(
        &mut self,
        datapath_id: DatapathId,
        port: Port,
        vid: Vid,
        mac: MacAddr,
        slice_number: SliceNumber,
        id: TruncatedString,
        now: Instant,
    ) -> bool {
        let key = PortMacKey {
            datapath_id,
            port,
            vid,
            mac,
        };
        if let Some(binding) = self.port_mac_slice_map.get_mut(&key) {
            binding.found_in_store = true;
            false
        } else {
            let binding = Binding::new_static(
                BindingKind::PortMac {
                    datapath_id,
                    port,
                    vid,
                    mac,
                },
                slice_number,
                id,
                now,
            );
            self.port_mac_slice_map.insert(key, binding);
            true
        }
    }

    // --- reconciliation: sweep phase --------------------------------------

    /// Delete every `port_mac_slice_map` record not touched by this pass.
    /// Returns the removed bindings so the caller can fire
    /// `teardown_path_by_match` for each MAC.
    pub fn sweep_port_mac(&mut self) -> Vec<Binding> {
        let victims: Vec<PortMacKey> = self
            .port_mac_slice_map
            .iter()
            .filter(|(_, b)| !b.found_in_store)
            .map(|(k, _)| *k)
            .collect();
        victims
            .into_iter()
            .filter_map(|k| self.port_mac_slice_map.remove(&k))
            .collect()
    }

    /// Delete every `mac_slice_map` record not touched by this pass,
    /// decrementing the owning slice's `n_mac_slice_maps`. Returns the
    /// removed bindings for teardown.
    pub fn sweep_mac(&mut self) -> Vec<Binding> {
        let victims: Vec<MacAddr> = self
            .mac_slice_map
            .iter()
            .filter(|(_, b)| !b.found_in_store)
            .map(|(k, _)| *k)
            .collect();
        let mut removed = Vec::with_capacity(victims.len());
        for mac in victims {
            if let Some(binding) = self.mac_slice_map.remove(&mac) {
                if let Some(slice) = self.slices.get_mut(&binding.slice_number) {
                    slice.n_mac_slice_maps = slice.n_mac_slice_maps.saturating_sub(1);
                }
                removed.push(binding);
            }
        }
        removed
    }

    /// Delete a `port_slice_map` record if it's stale and static, or if
    /// it's dynamic and a MAC binding was deleted this pass (the
    /// cascade). Removes the parallel `port_slice_vid_map` entry for each
    /// deletion and returns the `(datapath_id, port)` pairs to tear down,
    /// one entry per deletion (duplicates included, matching one
    /// teardown call per removed record).
    pub fn sweep_port(&mut self, mac_binding_deleted: bool) -> Vec<(DatapathId, Port)> {
        let victims: Vec<PortKey> = self
            .port_slice_map
            .iter()
            .filter(|(_, b)| (!b.found_in_store && !b.dynamic) || (mac_binding_deleted && b.dynamic))
            .map(|(k, _)| *k)
            .collect();
        let mut teardown = Vec::with_capacity(victims.len());
        for key in victims {
            if let Some(binding) = self.port_slice_map.remove(&key) {
                self.port_slice_vid_map.remove(&PortSliceKey {
                    datapath_id: key.datapath_id,
                    port: key.port,
                    slice_number: binding.slice_number,
                });
                teardown.push((key.datapath_id, key.port));
            }
        }
        teardown
    }

    /// For each slice not touched this pass, delete it unless a binding
    /// still references it (the referential-guard path — caller logs
    /// `retained_with_live_refs`).
    pub fn sweep_slices(&mut self) -> SliceSweepReport {
        let candidates: Vec<SliceNumber> = self
            .slices
            .iter()
            .filter(|(_, s)| !s.found_in_store)
            .map(|(n, _)| *n)
            .collect();
        let mut report = SliceSweepReport::default();
        for number in candidates {
            let referenced = self.port_slice_map.values().any(|b| b.slice_number == number)
                || self.mac_slice_map.values().any(|b| b.slice_number == number)
                || self
                    .port_mac_slice_map
                    .values()
                    .any(|b| b.slice_number == number);
            if referenced {
                tracing::error!(slice_number = %number, "refusing to delete slice with live bindings");
                report.retained_with_live_refs.push(number);
            } else {
                self.slices.remove(&number);
                report.removed.push(number);
            }
        }
        report
    }

    // --- dynamic bindings --------------------------------------------------

    pub fn insert_dynamic_port_binding(
        &mut self,
        datapath_id: DatapathId,
        port: Port,
        vid: Vid,
        slice_number: SliceNumber,
        now: Instant,
    ) {
        let binding = Binding::new_dynamic_port(datapath_id, port, vid, slice_number, now);
        self.port_slice_map.insert(
            PortKey {
                datapath_id,
                port,
                vid,
            },
            binding,
        );
        self.port_slice_vid_map.insert(
            PortSliceKey {
                datapath_id,
                port,
                slice_number,
            },
            vid,
        );
    }

    /// Refreshes `updated_at` on an existing port binding. Returns `false`
    /// if no such binding exists.
    pub fn refresh_port_binding(
        &mut self,
        datapath_id: DatapathId,
        port: Port,
        vid: Vid,
        now: Instant,
    ) -> bool {
        match self.port_slice_map.get_mut(&PortKey {
            datapath_id,
            port,
            vid,
        }) {
            Some(binding) => {
                binding.updated_at = now;
                true
            }
            None => false,
        }
    }

    /// Deletes every dynamic port binding whose `updated_at + timeout` has
    /// elapsed. Returns the number removed.
    pub fn age_dynamic_port_bindings(&mut self, now: Instant, timeout: Duration) -> usize {
        let victims: Vec<PortKey> = self
            .port_slice_map
            .iter()
            .filter(|(_, b)| b.dynamic && b.updated_at + timeout < now)
            .map(|(k, _)| *k)
            .collect();
        self.remove_port_keys(&victims)
    }

    /// Deletes every dynamic port binding for `(datapath_id, port)`,
    /// regardless of VLAN — the link-down path.
    pub fn delete_dynamic_port_bindings(&mut self, datapath_id: DatapathId, port: Port) -> usize {
        let victims: Vec<PortKey> = self
            .port_slice_map
            .iter()
            .filter(|(k, b)| k.datapath_id == datapath_id && k.port == port && b.dynamic)
            .map(|(k, _)| *k)
            .collect();
        self.remove_port_keys(&victims)
    }

    fn remove_port_keys(&mut self, keys: &[PortKey]) -> usize {
        let mut removed = 0;
        for key in keys {
            if let Some(binding) = self.port_slice_map.remove(key) {
                self.port_slice_vid_map.remove(&PortSliceKey {
                    datapath_id: key.datapath_id,
                    port: key.port,
                    slice_number: binding.slice_number,
                });
                removed += 1;
            }
        }
        removed
    }

    // --- lookups -------------------------------------------------------------

    pub fn get_slice(&self, number: SliceNumber) -> Option<&Slice> {
        self.slices.get(&number)
    }

    pub fn slice_exists(&self, number: SliceNumber) -> bool {
        self.slices.contains_key(&number)
    }

    pub fn get_port_binding(&self, datapath_id: DatapathId, port: Port, vid: Vid) -> Option<&Binding> {
        self.port_slice_map.get(&PortKey {
            datapath_id,
            port,
            vid,
        })
    }

    pub fn get_mac_binding(&self, mac: MacAddr) -> Option<&Binding> {
        self.mac_slice_map.get(&mac)
    }

    pub fn get_port_mac_binding(
        &self,
        datapath_id: DatapathId,
        port: Port,
        vid: Vid,
        mac: MacAddr,
    ) -> Option<&Binding> {
        self.port_mac_slice_map.get(&PortMacKey {
            datapath_id,
            port,
            vid,
            mac,
        })
    }

    pub fn get_port_vid(
        &self,
        datapath_id: DatapathId,
        port: Port,
        slice_number: SliceNumber,
    ) -> Option<Vid> {
        self.port_slice_vid_map
            .get(&PortSliceKey {
                datapath_id,
                port,
                slice_number,
            })
            .copied()
    }

    pub fn mac_slice_maps_exist(&self, number: SliceNumber) -> bool {
        self.get_slice(number)
            .map(|s| s.n_mac_slice_maps > 0)
            .unwrap_or(false)
    }

    // --- iteration, for invariant checks and tests --------------------------

    pub fn slices(&self) -> impl Iterator<Item = &Slice> {
        self.slices.values()
    }

    pub fn port_bindings(&self) -> impl Iterator<Item = &Binding> {
        self.port_slice_map.values()
    }

    pub fn mac_bindings(&self) -> impl Iterator<Item = &Binding> {
        self.mac_slice_map.values()
    }

    pub fn port_mac_bindings(&self) -> impl Iterator<Item = &Binding> {
        self.port_mac_slice_map.values()
    }

    pub fn port_slice_vid_entries(&self) -> impl Iterator<Item = (&PortSliceKey, &Vid)> {
        self.port_slice_vid_map.iter()
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
