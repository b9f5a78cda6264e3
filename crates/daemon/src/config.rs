// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.
//! No config file format — environment variables are the whole surface.

use std::path::PathBuf;
use std::time::Duration;

const ENV_STORE_PATH: &str = "SLICECTL_STORE_PATH";
const ENV_MODE: &str = "SLICECTL_MODE";
const ENV_RECONCILE_INTERVAL_MS: &str = "SLICECTL_RECONCILE_INTERVAL_MS";
const ENV_AGING_INTERVAL_MS: &str = "SLICECTL_AGING_INTERVAL_MS";
const ENV_DYNAMIC_BINDING_TIMEOUT_MS: &str = "SLICECTL_DYNAMIC_BINDING_TIMEOUT_MS";

/// Resolved daemon configuration. Every field has a sensible default so
/// an operator needs to set only [`ENV_STORE_PATH`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store_path: PathBuf,
    pub mode_bits: u32,
    pub reconcile_interval: Duration,
    pub aging_interval: Duration,
    pub dynamic_binding_timeout: Duration,
}

impl Config {
    /// Loads from the environment. `SLICECTL_STORE_PATH` defaults to
    /// `./slice.db` (the only variable an operator is likely to need to
    /// set for local testing).
    pub fn load() -> Self {
        Self {
            store_path: store_path(),
            mode_bits: mode_bits(),
            reconcile_interval: reconcile_interval(),
            aging_interval: aging_interval(),
            dynamic_binding_timeout: dynamic_binding_timeout(),
        }
    }
}

fn store_path() -> PathBuf {
    std::env::var(ENV_STORE_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./slice.db"))
}

fn mode_bits() -> u32 {
    std::env::var(ENV_MODE)
        .ok()
        .and_then(|s| parse_mode_bits(&s))
        .unwrap_or(0)
}

fn reconcile_interval() -> Duration {
    env_duration_ms(ENV_RECONCILE_INTERVAL_MS).unwrap_or(Duration::from_secs(2))
}

fn aging_interval() -> Duration {
    env_duration_ms(ENV_AGING_INTERVAL_MS).unwrap_or(Duration::from_secs(60))
}

fn dynamic_binding_timeout() -> Duration {
    env_duration_ms(ENV_DYNAMIC_BINDING_TIMEOUT_MS).unwrap_or(Duration::from_secs(3600))
}

fn env_duration_ms(name: &str) -> Option<Duration> {
    std::env::var(name).ok().and_then(|s| parse_duration_ms(&s))
}

fn parse_mode_bits(raw: &str) -> Option<u32> {
    raw.parse().ok()
}

fn parse_duration_ms(raw: &str) -> Option<Duration> {
    raw.parse::<u64>().ok().map(Duration::from_millis)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
