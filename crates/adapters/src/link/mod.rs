// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Link Layer: query/mutate interfaces, bonds, VLANs, addresses, and VRF
//! enslavement.
//!
//! `LinkLayer` is the capability trait the Network Reconciler and HA
//! service depend on; `NetlinkLinkLayer` backs it on Linux, `StubLinkLayer`
//! everywhere else and in tests.

mod stub;

#[cfg(target_os = "linux")]
mod netlink;

pub use stub::StubLinkLayer;

#[cfg(target_os = "linux")]
pub use netlink::NetlinkLinkLayer;

use std::collections::HashSet;

use async_trait::async_trait;
use ipnet::Ipv4Net;
use thiserror::Error;
use ward_core::{Bond, MacAddr, Vlan, WardError};

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("interface not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("unsupported on this platform: {0}")]
    Unsupported(String),

    #[error("kernel link operation failed: {0}")]
    Kernel(String),
}

impl From<LinkError> for WardError {
    fn from(err: LinkError) -> Self {
        WardError::KernelApplyFailed(err.to_string())
    }
}

/// Link duplex setting, as reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duplex {
    Half,
    Full,
}

/// Coarse interface state, derived from [`derive_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceState {
    Up,
    Down,
    NoCarrier,
    Degraded,
}

/// Interface byte/packet counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_packets: u64,
    pub tx_packets: u64,
    pub rx_errors: u64,
    pub tx_errors: u64,
}

/// Snapshot of one interface's kernel-observed state.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkStatus {
    pub name: String,
    pub admin_up: bool,
    pub oper_up: bool,
    pub carrier: bool,
    pub is_ethernet: bool,
    pub mac: Option<MacAddr>,
    pub mtu: u32,
    pub addresses: Vec<Ipv4Net>,
    pub driver: Option<String>,
    pub speed_mbps: Option<u32>,
    pub duplex: Option<Duplex>,
    pub bond_members: Vec<String>,
    pub bond_active_members: Vec<String>,
    pub vlan_parent: Option<String>,
    pub vlan_id: Option<u16>,
    pub stats: LinkStats,
}

/// Query/mutate kernel link state. Add/delete operations are idempotent:
/// adding something that already exists, or deleting something already
/// absent, is success.
#[async_trait]
pub trait LinkLayer: Send + Sync {
    async fn query(&self, name: &str) -> Result<LinkStatus, LinkError>;
    async fn query_all(&self) -> Result<Vec<LinkStatus>, LinkError>;

    async fn ensure_vrf(&self, name: &str, table_id: u32) -> Result<(), LinkError>;
    async fn delete_vrf(&self, name: &str) -> Result<(), LinkError>;

    async fn create_bond(&self, name: &str, bond: &Bond) -> Result<(), LinkError>;
    async fn delete_bond(&self, name: &str) -> Result<(), LinkError>;

    async fn create_vlan(&self, parent: &str, vlan: &Vlan) -> Result<(), LinkError>;
    async fn delete_vlan(&self, parent: &str, vlan_id: u16) -> Result<(), LinkError>;

    async fn flush_addresses(&self, name: &str) -> Result<(), LinkError>;
    async fn set_addresses(&self, name: &str, addresses: &[Ipv4Net]) -> Result<(), LinkError>;

    /// Adds a single address without disturbing the interface's other
    /// addresses, used by the HA service to migrate a Virtual IP.
    async fn add_address(&self, name: &str, address: Ipv4Net) -> Result<(), LinkError>;
    /// Removes a single address, leaving the rest untouched.
    async fn remove_address(&self, name: &str, address: Ipv4Net) -> Result<(), LinkError>;

    async fn enslave_vrf(&self, name: &str, vrf: &str) -> Result<(), LinkError>;

    async fn set_mtu(&self, name: &str, mtu: u32) -> Result<(), LinkError>;
    async fn set_admin_state(&self, name: &str, up: bool) -> Result<(), LinkError>;
    async fn set_hw_address(&self, name: &str, mac: MacAddr) -> Result<(), LinkError>;
}

/// Derive the coarse [`InterfaceState`] from a raw [`LinkStatus`].
pub fn derive_status(link: &LinkStatus) -> InterfaceState {
    let base = if !link.admin_up {
        InterfaceState::Down
    } else if link.is_ethernet && !link.carrier {
        InterfaceState::NoCarrier
    } else if link.oper_up {
        InterfaceState::Up
    } else {
        InterfaceState::Down
    };

    if base == InterfaceState::Up && !link.bond_members.is_empty() {
        let configured: HashSet<&str> = link.bond_members.iter().map(String::as_str).collect();
        let active: HashSet<&str> = link.bond_active_members.iter().map(String::as_str).collect();
        if configured.difference(&active).next().is_some() {
            return InterfaceState::Degraded;
        }
    }

    base
}

/// Vendor-like bytes for the locally-administered MAC prefix, fixed so
/// generated virtual MACs are recognizable as ours.
const VIRTUAL_MAC_VENDOR: [u8; 2] = [0x1a, 0x2b];

/// Deterministically derive a virtual MAC for `interface_name` when one
/// isn't explicitly configured.
pub fn derive_virtual_mac(interface_name: &str) -> MacAddr {
    let mut hash: u32 = 0;
    for byte in interface_name.bytes() {
        hash = hash.wrapping_mul(31).wrapping_add(byte as u32);
    }
    let h = hash & 0x00ff_ffff;
    MacAddr::new([
        0x02,
        VIRTUAL_MAC_VENDOR[0],
        VIRTUAL_MAC_VENDOR[1],
        (h >> 16) as u8,
        (h >> 8) as u8,
        h as u8,
    ])
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
