// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interface, bond, and VLAN configuration.

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};

/// Bonding mode for a `bond` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BondMode {
    ActiveBackup,
    Balanced8023ad,
    BalanceXor,
    BroadcastBond,
}

/// `bond { mode, members }` block on an [`Interface`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    pub mode: BondMode,
    pub members: Vec<String>,
}

/// `vlans [{ id, zone, ipv4 }]` entry on an [`Interface`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vlan {
    pub id: u16,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub ipv4: Vec<Ipv4Net>,
}

impl Vlan {
    /// Child interface name, always `<parent>.<id>` per the naming invariant.
    pub fn child_name(&self, parent: &str) -> String {
        format!("{parent}.{}", self.id)
    }
}

/// A physical or logical network interface.
///
/// `name` is the unique key across the whole [`Config`](super::Config).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub mtu: Option<u32>,
    #[serde(default)]
    pub ipv4: Vec<Ipv4Net>,
    #[serde(default)]
    pub dhcp: bool,
    #[serde(default)]
    pub vrf: Option<String>,
    #[serde(default)]
    pub bond: Option<Bond>,
    #[serde(default)]
    pub vlans: Vec<Vlan>,
}

/// MTU range accepted by the loader.
pub const MTU_MIN: u32 = 68;
pub const MTU_MAX: u32 = 9216;

impl Interface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            zone: None,
            disabled: false,
            mtu: None,
            ipv4: Vec::new(),
            dhcp: false,
            vrf: None,
            bond: None,
            vlans: Vec::new(),
        }
    }

    /// Every VLAN child interface name this interface implies.
    pub fn vlan_child_names(&self) -> impl Iterator<Item = String> + '_ {
        self.vlans.iter().map(|v| v.child_name(&self.name))
    }
}

#[cfg(test)]
#[path = "interface_tests.rs"]
mod tests;
