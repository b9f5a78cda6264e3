// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Slice` entity: a named logical partition of the network fabric.

use crate::id::SliceNumber;
use crate::truncated::TruncatedString;

/// A logical partition of the fabric, identified by a 16-bit number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice {
    pub number: SliceNumber,
    pub id: TruncatedString,
    /// How many MAC bindings currently reference this slice.
    pub n_mac_slice_maps: u32,
    /// Cleared before a reconciliation load, set on every record touched
    /// during it; anything still clear afterward is a sweep candidate.
    pub found_in_store: bool,
}

impl Slice {
    pub fn new(number: SliceNumber, id: impl Into<TruncatedString>) -> Self {
        Self {
            number,
            id: id.into(),
            n_mac_slice_maps: 0,
            found_in_store: true,
        }
    }
}
