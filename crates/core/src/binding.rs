// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Binding` entity and the three ingress-descriptor variants it can
//! take: a pure port binding, a pure MAC binding, or a combined one.

use crate::id::{DatapathId, MacAddr, Port, SliceNumber, Vid};
use crate::truncated::TruncatedString;
use std::time::Instant;

/// The ingress-descriptor half of a binding. A sum type in place of the
/// original's shared tagged struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Port {
        datapath_id: DatapathId,
        port: Port,
        vid: Vid,
    },
    Mac {
        mac: MacAddr,
    },
    PortMac {
        datapath_id: DatapathId,
        port: Port,
        vid: Vid,
        mac: MacAddr,
    },
}

impl BindingKind {
    pub fn is_port(&self) -> bool {
        matches!(self, BindingKind::Port { .. })
    }

    pub fn is_mac(&self) -> bool {
        matches!(self, BindingKind::Mac { .. })
    }

    pub fn is_port_mac(&self) -> bool {
        matches!(self, BindingKind::PortMac { .. })
    }
}

/// A binding record: an ingress descriptor mapped to a slice, plus the
/// metadata every variant shares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub kind: BindingKind,
    pub slice_number: SliceNumber,
    pub id: TruncatedString,
    /// True only for port bindings synthesized by the resolver from a
    /// MAC hit; a dynamic binding's `kind` is always `Port`.
    pub dynamic: bool,
    pub updated_at: Instant,
    pub found_in_store: bool,
}

impl Binding {
    pub fn new_static(
        kind: BindingKind,
        slice_number: SliceNumber,
        id: impl Into<TruncatedString>,
        now: Instant,
    ) -> Self {
        Self {
            kind,
            slice_number,
            id: id.into(),
            dynamic: false,
            updated_at: now,
            found_in_store: true,
        }
    }

    pub fn new_dynamic_port(
        datapath_id: DatapathId,
        port: Port,
        vid: Vid,
        slice_number: SliceNumber,
        now: Instant,
    ) -> Self {
        let id = format!("{datapath_id}:{port}:{vid}");
        Self {
            kind: BindingKind::Port {
                datapath_id,
                port,
                vid,
            },
            slice_number,
            id: TruncatedString::new(id),
            dynamic: true,
            updated_at: now,
            found_in_store: false,
        }
    }
}
