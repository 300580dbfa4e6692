// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Virtual resources owned by the HA Primary role, migrated on failover.

use ipnet::IpNet;
use serde::{Deserialize, Serialize};

/// A MAC-48 address, stored as six bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Display for MacAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

/// A floating IP owned by whichever node is currently Primary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualIp {
    pub address: IpNet,
    pub interface: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// A floating MAC address owned by whichever node is currently Primary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualMac {
    pub interface: String,
    #[serde(default)]
    pub address: Option<MacAddr>,
    #[serde(default)]
    pub dhcp: bool,
}

/// A resource migrated atomically between HA peers on failover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VirtualResource {
    VirtualIp(VirtualIp),
    VirtualMac(VirtualMac),
}

#[cfg(test)]
#[path = "virtual_resource_tests.rs"]
mod tests;
