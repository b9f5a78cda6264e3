// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use slicectl_core::SliceError;

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("engine initialization failed: {0}")]
    Init(#[from] SliceError),
}
