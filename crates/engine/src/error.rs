// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use slicectl_adapters::StoreError;
use slicectl_core::SliceError;

/// Errors surfaced by a reconciliation pass. Every variant here means the
/// pass was aborted with tables and the stored mtime left untouched.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("reading definition store: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Lifecycle(#[from] SliceError),
}
