// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The forwarding layer's two outbound calls, modeled as a trait so the
//! engine never depends on a concrete controller.

use slicectl_core::{DatapathId, MacAddr, Port};

/// A teardown match: wildcards plus a source or destination MAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownMatch {
    DlSrc(MacAddr),
    DlDst(MacAddr),
}

/// Outbound side effects the forwarding layer exposes to the core.
/// Out of scope to implement for real here — `slicectl-daemon` logs them,
/// tests record them.
pub trait ControllerEffects: Send + Sync {
    fn teardown_path_by_match(&self, m: TeardownMatch);
    fn teardown_path_by_port(&self, datapath_id: DatapathId, port: Port);
}

/// Logs every call at `info` level. The reference driver's only real
/// implementation, since actual forwarding-table teardown is out of scope.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingEffects;

impl ControllerEffects for LoggingEffects {
    fn teardown_path_by_match(&self, m: TeardownMatch) {
        match m {
            TeardownMatch::DlSrc(mac) => {
                tracing::info!(dl_src = %mac, "teardown_path_by_match")
            }
            TeardownMatch::DlDst(mac) => {
                tracing::info!(dl_dst = %mac, "teardown_path_by_match")
            }
        }
    }

    fn teardown_path_by_port(&self, datapath_id: DatapathId, port: Port) {
        tracing::info!(%datapath_id, %port, "teardown_path_by_port");
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum RecordedCall {
        TeardownByMatch(TeardownMatch),
        TeardownByPort(DatapathId, Port),
    }

    /// Records every call instead of performing it, for assertions in tests.
    #[derive(Default)]
    pub struct FakeEffects {
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl FakeEffects {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().clone()
        }
    }

    impl ControllerEffects for FakeEffects {
        fn teardown_path_by_match(&self, m: TeardownMatch) {
            self.calls.lock().push(RecordedCall::TeardownByMatch(m));
        }

        fn teardown_path_by_port(&self, datapath_id: DatapathId, port: Port) {
            self.calls
                .lock()
                .push(RecordedCall::TeardownByPort(datapath_id, port));
        }
    }
}
