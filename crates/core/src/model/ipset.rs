// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named IP sets: static (from config) or dynamic (authorized at runtime).

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// A named set of IPs/CIDRs.
///
/// Static members are config-declared and never purged. Dynamic membership
/// (with per-element expiry) is maintained at runtime by the DNS Egress
/// Authorizer or explicit RPC and is not part of the declarative config tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpSet {
    pub name: String,
    #[serde(default)]
    pub dynamic: bool,
    #[serde(default)]
    pub static_members: Vec<IpNet>,
}

impl IpSet {
    pub fn new(name: impl Into<String>, dynamic: bool) -> Self {
        Self { name: name.into(), dynamic, static_members: Vec::new() }
    }

    pub fn contains_static(&self, ip: IpAddr) -> bool {
        self.static_members.iter().any(|net| net.contains(&ip))
    }
}

#[cfg(test)]
#[path = "ipset_tests.rs"]
mod tests;
