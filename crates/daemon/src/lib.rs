// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! slicectl daemon library: the configuration and lifecycle types the
//! `slicectld` binary wires together, exposed for anything that wants to
//! embed the same startup sequence without going through the binary.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod config;
pub mod error;
pub mod lifecycle;

pub use config::Config;
pub use error::LifecycleError;
pub use lifecycle::{Daemon, AGING_TICK, RECONCILE_TICK};
