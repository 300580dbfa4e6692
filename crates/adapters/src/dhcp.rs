// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DHCP lease reclaim: the interface the HA service drives when a
//! Virtual MAC migrates between nodes, so the DHCP server's lease table
//! follows the MAC rather than staying bound to the node that used to
//! hold it. DHCP server internals are out of scope; only this lifecycle
//! contract is.

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;
use ward_core::{MacAddr, WardError};

#[derive(Debug, Error)]
pub enum DhcpError {
    #[error("no DHCP scope configured for interface {0}")]
    NoScope(String),

    #[error("lease reclaim failed: {0}")]
    ReclaimFailed(String),
}

impl From<DhcpError> for WardError {
    fn from(err: DhcpError) -> Self {
        WardError::KernelApplyFailed(err.to_string())
    }
}

/// Reclaims a DHCP lease binding onto a (possibly new) MAC address on
/// `interface`, called by the HA service before it applies a migrated
/// Virtual MAC.
#[async_trait]
pub trait DhcpReclaimer: Send + Sync {
    async fn reclaim_lease(&self, interface: &str, mac: MacAddr) -> Result<(), DhcpError>;
}

/// No-op reclaimer for platforms/tests with no DHCP server to drive;
/// records calls so a test can assert the HA service invoked it.
#[derive(Default)]
pub struct StubDhcpReclaimer {
    calls: Mutex<Vec<(String, MacAddr)>>,
}

impl StubDhcpReclaimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(String, MacAddr)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl DhcpReclaimer for StubDhcpReclaimer {
    async fn reclaim_lease(&self, interface: &str, mac: MacAddr) -> Result<(), DhcpError> {
        self.calls.lock().push((interface.to_string(), mac));
        Ok(())
    }
}

#[cfg(test)]
#[path = "dhcp_tests.rs"]
mod tests;
